use pipedeck_core::{MIN_QUERY_CHARS, is_eligible};

use super::search_text;
use crate::cli::SuggestArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_suggestions;

pub(crate) async fn handle_suggest(ctx: &AppContext, args: SuggestArgs) -> CliResult<()> {
    let text = search_text(&args.words);
    if !is_eligible(&text) {
        return Err(CliError::validation(format!(
            "search text needs at least {MIN_QUERY_CHARS} non-whitespace characters"
        )));
    }

    let session = ctx.session();
    session.run_query(&text).await;

    let state = session.state();
    render_suggestions(
        &text,
        &state.suggestions,
        session.current_instance().as_ref(),
        ctx.output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pipedeck_config::ClientConfig;

    fn fake_context() -> AppContext {
        let config = ClientConfig {
            fake_data: true,
            fake_delay_ms: 0,
            ..ClientConfig::default()
        };
        AppContext::from_config(config, OutputFormat::Table).expect("context")
    }

    #[tokio::test]
    async fn short_text_is_a_validation_error() {
        let err = handle_suggest(
            &fake_context(),
            SuggestArgs {
                words: vec!["a".to_string(), "b".to_string()],
            },
        )
        .await
        .expect_err("short text should fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn fixture_suggestions_render() {
        handle_suggest(
            &fake_context(),
            SuggestArgs {
                words: vec!["home".to_string(), "lab".to_string()],
            },
        )
        .await
        .expect("suggestions should render");
    }
}
