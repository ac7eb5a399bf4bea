//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::search::handle_search;
use crate::commands::stream::handle_stream;
use crate::commands::suggest::handle_suggest;
use crate::commands::trending::handle_trending;

/// Parses CLI arguments, executes the requested command, and reports
/// failures on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();

    let ctx = match AppContext::from_cli(&cli, &trace_id) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let span = info_span!("command", command, trace_id = %trace_id);
    match dispatch(&ctx, cli.command).instrument(span).await {
        Ok(()) => {
            info!(command, trace_id = %trace_id, "command completed");
            0
        }
        Err(err) => {
            let message = err.display_message();
            warn!(command, trace_id = %trace_id, exit_code = err.exit_code(), "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(ctx: &AppContext, command: Command) -> CliResult<()> {
    match command {
        Command::Trending(args) => handle_trending(ctx, args).await,
        Command::Suggest(args) => handle_suggest(ctx, args).await,
        Command::Stream(args) => handle_stream(ctx, args).await,
        Command::Search(args) => handle_search(ctx, &args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pipedeck",
    about = "Browse trending videos and search suggestions across Pipedeck mirrors"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "PIPEDECK_CONFIG",
        help = "JSON configuration file layered over the built-in defaults"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Serve bundled fixture data instead of contacting mirrors"
    )]
    pub(crate) fake: bool,
    #[arg(long, global = true, help = "Two-letter region for trending videos")]
    pub(crate) region: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List trending videos for the configured region.
    Trending(TrendingArgs),
    /// Fetch autocomplete suggestions for search text.
    Suggest(SuggestArgs),
    /// Show stream metadata for a video id or watch URL.
    Stream(StreamArgs),
    /// Resolve the search route for search text.
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub(crate) struct TrendingArgs {
    #[arg(long, help = "Print at most this many videos")]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Args)]
pub(crate) struct SuggestArgs {
    #[arg(required = true, num_args = 1.., help = "Search text; words are joined with spaces")]
    pub(crate) words: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct StreamArgs {
    #[arg(help = "Video id, `/watch?v=` path, or full watch URL")]
    pub(crate) target: String,
}

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    #[arg(required = true, num_args = 1.., help = "Search text; words are joined with spaces")]
    pub(crate) words: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Trending(_) => "trending",
        Command::Suggest(_) => "suggest",
        Command::Stream(_) => "stream",
        Command::Search(_) => "search",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pipedeck", "suggest", "lofi", "hip", "hop", "--fake", "--region", "br", "--output",
            "json",
        ])
        .expect("arguments should parse");
        assert!(cli.fake);
        assert_eq!(cli.region.as_deref(), Some("br"));
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Command::Suggest(args) => assert_eq!(args.words, ["lofi", "hip", "hop"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_requires_text() {
        assert!(Cli::try_parse_from(["pipedeck", "search"]).is_err());
    }

    #[test]
    fn command_label_matches_variants() {
        assert_eq!(
            command_label(&Command::Trending(TrendingArgs { limit: None })),
            "trending"
        );
        assert_eq!(
            command_label(&Command::Stream(StreamArgs {
                target: "abc".to_string()
            })),
            "stream"
        );
    }
}
