//! ghes-owners CLI - report every organization owner on a GitHub Enterprise
//! Server instance.

mod config;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use console::{Term, style};
use ghes_owners::{
    CsvReportSink, EnterpriseClient, HttpError, ReportError, ReportOptions, RunSummary,
    run_report, short_error_message,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, Overrides, Settings, ValidatedSettings};
use crate::progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "ghes-owners")]
#[command(version)]
#[command(about = "Report the owners of every organization on a GitHub Enterprise Server instance")]
#[command(
    long_about = "ghes-owners checks that the instance is new enough, lists every organization \
through the GraphQL API and writes one CSV row per organization owner. Organizations without \
owners get a single row with empty owner fields."
)]
#[command(after_long_help = r#"EXAMPLES
    Write the report to ./dist/ghes-owners.csv:
        $ ghes-owners -H github.example.com -t ghp_...

    Write the report somewhere else:
        $ ghes-owners -H github.example.com -o owners.csv

CONFIGURATION
    ghes-owners reads configuration from:
      1. ~/.config/ghes-owners/config.toml (or $XDG_CONFIG_HOME/ghes-owners/config.toml)
      2. ./ghes-owners.toml
      3. Environment variables (GHES_OWNERS_* prefix, e.g., GHES_OWNERS_ENTERPRISE__TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GHES_OWNERS_ENTERPRISE__HOST     Instance host name
    GHES_OWNERS_ENTERPRISE__TOKEN    Personal access token (admin:enterprise, read:org)
    GHES_OWNERS_ENTERPRISE__SLUG     Enterprise account slug (default: github)
    GHES_OWNERS_REPORT__OUTPUT       Report path (default: dist/ghes-owners.csv)
    GHES_OWNERS_REPORT__MIN_VERSION  Oldest accepted instance version (default: 2.19.0)
    GHES_OWNERS_HTTP__TIMEOUT_SECS   Per-request timeout (default: 30)
"#)]
struct Cli {
    /// Instance host name, e.g. github.example.com
    #[arg(short = 'H', long)]
    hostname: Option<String>,

    /// Personal access token
    #[arg(short, long)]
    token: Option<String>,

    /// CSV file to write (replaced if it exists)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Oldest instance version to accept
    #[arg(long)]
    min_version: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enterprise account slug
    #[arg(long)]
    enterprise_slug: Option<String>,
}

impl Cli {
    fn overrides(self) -> Overrides {
        Overrides {
            host: self.hostname,
            token: self.token,
            output: self.output,
            min_version: self.min_version,
            timeout_secs: self.timeout_secs,
            enterprise_slug: self.enterprise_slug,
        }
    }
}

/// Anything that ends a run with a non-zero exit code.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] HttpError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl CliError {
    /// One-line form for log output.
    fn short_message(&self) -> String {
        match self {
            Self::Report(e) => short_error_message(e),
            other => other.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Structured logging only when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("ghes_owners=info,ghes_owners_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e.short_message(), "Report failed");
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = Settings::load();
    settings.apply(cli.overrides());
    let settings = settings.validate()?;

    let client = EnterpriseClient::new(&settings.host, &settings.token, settings.timeout)?;
    let options = ReportOptions {
        minimum_version: settings.minimum_version.clone(),
        enterprise_slug: settings.enterprise_slug.clone(),
    };

    let reporter = Arc::new(ProgressReporter::new(&settings.host));
    let callback = reporter.as_callback();

    let result = run_report(
        &client,
        &options,
        || CsvReportSink::create(&settings.output),
        Some(&callback),
    )
    .await;
    reporter.finish();

    print_summary(&settings, &result?);
    Ok(())
}

fn print_summary(settings: &ValidatedSettings, summary: &RunSummary) {
    println!(
        "{} Saved {} rows to {}",
        style("✓").green().bold(),
        summary.rows,
        style(settings.output.display()).cyan()
    );
    println!(
        "  {} organizations, {} skipped, took {}",
        summary.organizations,
        summary.skipped,
        format_elapsed(summary.elapsed)
    );
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "ghes-owners",
            "-H",
            "github.example.com",
            "-t",
            "t0ken",
            "-o",
            "out.csv",
            "--min-version",
            "2.21.0",
            "--timeout-secs",
            "5",
            "--enterprise-slug",
            "acme",
        ])
        .expect("valid arguments");

        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("github.example.com"));
        assert_eq!(overrides.token.as_deref(), Some("t0ken"));
        assert_eq!(overrides.output, Some(PathBuf::from("out.csv")));
        assert_eq!(overrides.min_version.as_deref(), Some("2.21.0"));
        assert_eq!(overrides.timeout_secs, Some(5));
        assert_eq!(overrides.enterprise_slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let cli = Cli::try_parse_from(["ghes-owners"]).expect("no arguments needed");
        let overrides = cli.overrides();
        assert!(overrides.host.is_none());
        assert!(overrides.token.is_none());
        assert!(overrides.output.is_none());
    }

    #[test]
    fn test_excess_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["ghes-owners", "extra"]).is_err());
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_config_error_message() {
        let err: CliError = ConfigError::MissingHost.into();
        assert_eq!(
            err.to_string(),
            "hostname missing (use --hostname or set [enterprise] host)"
        );
    }
}
