use super::search_text;
use crate::cli::SearchArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_route;

pub(crate) fn handle_search(ctx: &AppContext, args: &SearchArgs) -> CliResult<()> {
    let text = search_text(&args.words);
    let session = ctx.session();
    session.input_changed(&text);
    let route = session
        .submit_current()
        .ok_or_else(|| CliError::validation("search text is too short to submit"))?;
    render_route(&route, ctx.output)
}
