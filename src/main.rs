use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use docgate::config::DocgateConfig;
use docgate::document::Document;
use docgate::SubmissionClient;

#[derive(Parser, Debug)]
#[command(name = "docgate", version, about = "Rate-limited document submission client")]
struct Cli {
    /// YAML configuration file (environment variables DOCGATE__* override it)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a document, optionally several copies concurrently
    Submit {
        /// JSON file containing the document
        #[arg(long, short)]
        document: PathBuf,

        /// Detached signature of the document
        #[arg(long, short)]
        signature: String,

        /// Number of concurrent submissions sharing one rate limit
        #[arg(long, default_value_t = 1)]
        copies: usize,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .init();
    }

    let config = DocgateConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::ShowConfig => {
            print!("{}", config.to_yaml()?);
        }
        Command::Submit {
            document,
            signature,
            copies,
        } => {
            info!("Version: {}", env!("CARGO_PKG_VERSION"));
            let quota = config.rate_limiting.quota()?;
            info!(
                endpoint = %config.api.endpoint,
                quota = %quota,
                "Configuration loaded"
            );

            let document = Document::from_file(&document)?;
            let client = SubmissionClient::from_config(&config)?;

            let handles: Vec<_> = (0..copies)
                .map(|copy| {
                    let client = client.clone();
                    let document = document.clone();
                    let signature = signature.clone();
                    tokio::spawn(async move {
                        (copy, client.create_document(&document, &signature).await)
                    })
                })
                .collect();

            let mut failures = 0;
            for handle in futures::future::join_all(handles).await {
                match handle? {
                    (copy, Ok(response)) => {
                        info!(copy, status = response.status, "Response status code");
                        info!(copy, body = %response.body, "Response body");
                    }
                    (copy, Err(e)) => {
                        failures += 1;
                        error!(copy, error = %e, "Submission failed");
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} of {} submissions failed", failures, copies);
            }
        }
    }

    Ok(())
}
