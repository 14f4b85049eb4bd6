use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod batcher;
mod config;
mod driver;
mod error;
mod explorer;
mod llm;
mod summarizer;

use config::{GenerationConfig, RunConfig};
use driver::RunReport;
use llm::GeminiClient;

#[derive(Parser, Debug)]
#[command(
    name = "docgen",
    version,
    about = "Generate Markdown documentation for a file or project with the Gemini API",
    long_about = "Walks a file or directory, sends the contents in batches to the Gemini API \
    and writes the generated Markdown to DOCUMENTATION.md beside the target.\n\n\
    The API key is read from API_KEY (or GEMINI_API_KEY), optionally via a .env file."
)]
struct Cli {
    /// File or directory to document
    #[arg(short, long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Number of files sent per request
    #[arg(short, long, default_value = "5", value_name = "NUMBER", allow_negative_numbers = true)]
    batch_size: String,

    /// Pause between batches, in milliseconds
    #[arg(short, long, default_value = "10000", value_name = "MILLISECONDS", allow_negative_numbers = true)]
    wait_time: String,

    /// Gemini model used for generation
    #[arg(short, long, env = "GEMINI_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Everything a run needs once the arguments check out.
struct Prepared {
    api_key: SecretString,
    run: RunConfig,
    generation: GenerationConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = parse_cli(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

    if let Err(e) = setup_tracing(cli.verbose) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match document(cli).await {
        Ok(report) => {
            debug!(
                "{} file(s) in {} batch(es): {} succeeded, {} failed, {} wait(s)",
                report.files, report.batches, report.succeeded, report.failed, report.waits
            );
            if report.written {
                info!("Documentation generated successfully: {}", report.output_path.display());
            } else {
                warn!(
                    "No documentation was generated; {} left untouched",
                    report.output_path.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            exit_code(&e)
        }
    }
}

/// Loads `.env` (or `env_file`) first so clap's `env` fallbacks can see it.
fn parse_cli<I, T>(env_file: Option<&Path>, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match env_file {
        Some(path) => dotenv::from_path(path).ok(),
        None => dotenv::dotenv().ok().map(|_| ()),
    };
    Cli::try_parse_from(args)
}

fn prepare(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> error::Result<Prepared> {
    let target = cli.path.ok_or(error::Error::MissingTarget)?;
    let api_key = config::load_api_key(lookup)?;
    let run = RunConfig::from_args(target, &cli.batch_size, &cli.wait_time)?;
    Ok(Prepared {
        api_key,
        run,
        generation: GenerationConfig::for_model(cli.model),
    })
}

async fn document(cli: Cli) -> anyhow::Result<RunReport> {
    let prepared = prepare(cli, |var| std::env::var(var).ok())?;
    let client = GeminiClient::new(prepared.api_key, prepared.generation);
    let target = prepared.run.target.display().to_string();

    let report = driver::run(&prepared.run, &client)
        .await
        .with_context(|| format!("Failed to document '{target}'"))?;
    Ok(report)
}

// Only usage errors change the exit code; run failures are reported.
fn is_usage_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<error::Error>()
        .is_some_and(error::Error::is_usage)
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    if is_usage_error(err) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "docgen=info",
        1 => "docgen=debug",
        _ => "docgen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}
