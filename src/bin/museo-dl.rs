use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use museo_dl::config::{
    DEFAULT_DELAY_SECS, DEFAULT_END_ID, DEFAULT_OUTPUT_DIR, DEFAULT_START_ID, DEFAULT_TIMEOUT_SECS,
};
use museo_dl::logging::init_logging;
use museo_dl::{
    Driver, Fetcher, FetcherConfig, IdRange, RunOptions, RunStatistics, SetupError, SourceRegistry,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "museo-dl", version)]
#[command(about = "Download artwork images from museum collections", long_about = None)]
struct Cli {
    /// Source to extract from (see --list-sources)
    #[arg(short, long, env = "MUSEO_DL_SOURCE", default_value = "bellasartes")]
    source: String,

    /// First artwork ID to process
    #[arg(long, env = "MUSEO_DL_START", default_value_t = DEFAULT_START_ID, allow_negative_numbers = true)]
    start: i64,

    /// Last artwork ID to process (inclusive)
    #[arg(long, env = "MUSEO_DL_END", default_value_t = DEFAULT_END_ID, allow_negative_numbers = true)]
    end: i64,

    /// Seconds to wait between requests
    #[arg(long, env = "MUSEO_DL_DELAY", default_value_t = DEFAULT_DELAY_SECS, allow_negative_numbers = true)]
    delay: f64,

    /// Output directory for downloaded images
    #[arg(short, long, env = "MUSEO_DL_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Per-request network timeout in seconds
    #[arg(long, env = "MUSEO_DL_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: f64,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,

    /// List available sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Download even when the destination file already exists
    #[arg(long, env = "MUSEO_DL_NO_CHECK_FILES")]
    no_check_files: bool,

    /// Also write the run summary as JSON to this file
    #[arg(long, env = "MUSEO_DL_SUMMARY_JSON")]
    summary_json: Option<PathBuf>,
}

#[derive(Serialize)]
struct SummaryFile<'a> {
    source: &'a str,
    start: u64,
    end: u64,
    #[serde(flatten)]
    statistics: &'a RunStatistics,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return parse_exit_code(&err);
        }
    };

    init_logging(cli.verbose);

    execute(&cli, &SourceRegistry::builtin()).await
}

/// `--help` and `--version` also arrive as errors; only real usage errors fail.
fn parse_exit_code(err: &clap::Error) -> ExitCode {
    if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn execute(cli: &Cli, registry: &SourceRegistry) -> ExitCode {
    if cli.list_sources {
        print!("{}", render_sources(registry));
        return ExitCode::SUCCESS;
    }
    run_exit_code(run(cli, registry).await)
}

/// A run that started always succeeds; setup errors fail.
fn run_exit_code(result: Result<(), SetupError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if matches!(e, SetupError::UnknownSource { .. }) {
                info!("Use --list-sources to see available sources");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, registry: &SourceRegistry) -> Result<(), SetupError> {
    let range = IdRange::new(cli.start, cli.end)?;
    let options = RunOptions::new(&cli.output)
        .with_delay_secs(cli.delay)?
        .with_check_existing_files(!cli.no_check_files);
    let fetcher = Fetcher::new(&FetcherConfig::with_timeout_secs(cli.timeout)?)?;
    let source = registry.build(&cli.source, fetcher.clone())?;

    info!("Using source: {}", source.name());
    if cli.no_check_files {
        info!("Existing files will be downloaded again");
    }

    let cancel = CancellationToken::new();
    let listener = tokio::spawn(watch_interrupt(cancel.clone()));

    let mut driver = Driver::new(source.as_ref(), fetcher, options).with_cancellation(cancel);
    let result = driver.run(range).await;
    listener.abort();
    let stats = result?;

    println!("{}", stats);

    if let Some(path) = &cli.summary_json {
        let summary = SummaryFile {
            source: source.name(),
            start: range.start(),
            end: range.end(),
            statistics: &stats,
        };
        match write_summary(path, &summary) {
            Ok(()) => info!("Summary written to {}", path.display()),
            Err(e) => warn!("Could not write summary to {}: {}", path.display(), e),
        }
    }

    Ok(())
}

/// First Ctrl-C finishes the current item and stops; a second one exits at once.
async fn watch_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("Interrupted, finishing current item...");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}

fn write_summary(path: &Path, summary: &SummaryFile<'_>) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
}

fn render_sources(registry: &SourceRegistry) -> String {
    let mut out = String::from("\nAvailable sources:\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');
    for entry in registry.entries() {
        out.push_str(&format!("  {:20} - {}\n", entry.name, entry.description));
        if !entry.aliases.is_empty() {
            out.push_str(&format!("  {:20}   aliases: {}\n", "", entry.aliases.join(", ")));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exit(actual: ExitCode, expected: ExitCode) {
        assert_eq!(format!("{:?}", actual), format!("{:?}", expected));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["museo-dl"]).unwrap();
        assert_eq!(cli.source, "bellasartes");
        assert_eq!(cli.start, DEFAULT_START_ID);
        assert_eq!(cli.end, DEFAULT_END_ID);
        assert_eq!(cli.delay, DEFAULT_DELAY_SECS);
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(!cli.verbose);
        assert!(!cli.no_check_files);
    }

    #[test]
    fn test_cli_negative_values_reach_validation() {
        let cli = Cli::try_parse_from(["museo-dl", "--delay", "-1", "--start", "-3"]).unwrap();
        assert_eq!(cli.delay, -1.0);
        assert_eq!(cli.start, -3);
    }

    #[tokio::test]
    async fn test_invalid_range_is_setup_error() {
        let cli = Cli::try_parse_from(["museo-dl", "--start", "5", "--end", "3"]).unwrap();
        let err = run(&cli, &SourceRegistry::builtin()).await.unwrap_err();
        assert!(matches!(err, SetupError::InvalidRange { start: 5, end: 3 }));
    }

    #[tokio::test]
    async fn test_unknown_source_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "museo-dl",
            "--source",
            "louvre",
            "--output",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let err = run(&cli, &SourceRegistry::builtin()).await.unwrap_err();
        assert!(matches!(err, SetupError::UnknownSource { .. }));
    }

    #[tokio::test]
    async fn test_negative_delay_is_setup_error() {
        let cli = Cli::try_parse_from(["museo-dl", "--delay", "-0.5"]).unwrap();
        let err = run(&cli, &SourceRegistry::builtin()).await.unwrap_err();
        assert!(matches!(err, SetupError::InvalidDelay(_)));
    }

    #[test]
    fn test_summary_file_shape() {
        let mut stats = RunStatistics::new();
        stats.record_failure("4", "HTTP 500");
        let summary = SummaryFile {
            source: "bellasartes",
            start: 1,
            end: 4,
            statistics: &stats,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["source"], "bellasartes");
        assert_eq!(json["attempted"], 1);
        assert_eq!(json["failures"][0]["identifier"], "4");
    }

    #[test]
    fn test_parse_errors_exit_with_failure() {
        let err = Cli::try_parse_from(["museo-dl", "--start", "abc"]).err().unwrap();
        assert_exit(parse_exit_code(&err), ExitCode::FAILURE);

        let err = Cli::try_parse_from(["museo-dl", "--no-such-flag"]).err().unwrap();
        assert_exit(parse_exit_code(&err), ExitCode::FAILURE);
    }

    #[test]
    fn test_help_and_version_exit_with_success() {
        let err = Cli::try_parse_from(["museo-dl", "--help"]).err().unwrap();
        assert_exit(parse_exit_code(&err), ExitCode::SUCCESS);

        let err = Cli::try_parse_from(["museo-dl", "--version"]).err().unwrap();
        assert_exit(parse_exit_code(&err), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_list_sources_exits_with_success() {
        let cli = Cli::try_parse_from(["museo-dl", "--list-sources", "--start", "9", "--end", "1"])
            .unwrap();
        assert_exit(execute(&cli, &SourceRegistry::builtin()).await, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_setup_errors_exit_with_failure() {
        let registry = SourceRegistry::builtin();

        let cli = Cli::try_parse_from(["museo-dl", "--start", "5", "--end", "3"]).unwrap();
        assert_exit(execute(&cli, &registry).await, ExitCode::FAILURE);

        let cli = Cli::try_parse_from(["museo-dl", "--delay", "1e30"]).unwrap();
        assert_exit(execute(&cli, &registry).await, ExitCode::FAILURE);

        let cli = Cli::try_parse_from(["museo-dl", "--timeout", "1e30"]).unwrap();
        assert_exit(execute(&cli, &registry).await, ExitCode::FAILURE);
    }

    #[test]
    fn test_run_exit_code() {
        assert_exit(run_exit_code(Ok(())), ExitCode::SUCCESS);
        let err = SetupError::UnknownSource {
            name: "louvre".to_string(),
            available: "bellasartes, met".to_string(),
        };
        assert_exit(run_exit_code(Err(err)), ExitCode::FAILURE);
    }

    #[test]
    fn test_render_sources() {
        let listing = render_sources(&SourceRegistry::builtin());
        assert!(listing.contains("Available sources:"));
        assert!(listing.contains("bellasartes"));
        assert!(listing.contains("aliases: bellas-artes, museo-bellas-artes, mnba"));
        assert!(listing.contains("met"));
        assert!(listing.contains("aliases: metmuseum"));
    }
}
