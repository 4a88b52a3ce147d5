use chrono::NaiveDate;
use clap::{Parser, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use seqera_io_usage::cli::{self, DEFAULT_OUTPUT, RunOptions};
use seqera_io_usage::logging::{self, DEFAULT_LOG_FILE};
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Collect IO metrics from the Seqera/Tower API for workflows within a date range
#[derive(Parser)]
#[command(name = "seqera-io", version, styles = STYLES)]
struct Cli {
    /// Earliest date to consider (inclusive) in YYYY-MM-DD format
    #[arg(long = "from", value_name = "YYYY-MM-DD")]
    from: NaiveDate,

    /// Last date to consider (inclusive) in YYYY-MM-DD format [default: today]
    #[arg(long = "to", value_name = "YYYY-MM-DD")]
    to: Option<NaiveDate>,

    /// Output CSV file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Specific workspace ID to analyze
    #[arg(short, long)]
    workspace_id: Option<String>,

    /// Filter workflows by user
    #[arg(short, long)]
    user: Option<String>,

    /// Filter workflows by status (SUCCEEDED, FAILED, etc.); empty for any
    #[arg(short, long, default_value = "SUCCEEDED")]
    status: String,

    /// API endpoint URL (defaults to TOWER_API_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// The dotenv file to source credentials from
    #[arg(long, default_value = ".env")]
    env: String,

    /// File to append run logs to, in addition to stderr
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// More verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    logging::init(cli.debug, Some(cli.log_file.as_path()));

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) => log::debug!("No dotenv file loaded from {}: {}", cli.env, e),
    }

    let options = RunOptions {
        from: cli.from,
        to: cli.to,
        output: cli.output,
        workspace_id: cli.workspace_id,
        user: cli.user,
        status: Some(cli.status),
        endpoint: cli.endpoint,
    };

    match cli::run(&options).await {
        Ok(count) => {
            log::debug!("Finished with {} workflow(s)", count.cyan());
            Ok(())
        }
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
