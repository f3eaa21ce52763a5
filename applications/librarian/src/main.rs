/// Soul Librarian - import, identify and sort a music library
use clap::{Parser, Subcommand};
use soul_librarian::{report, Librarian, LibrarianConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "soul_librarian=info,soul_tasks=info,soul_library=info";

#[derive(Parser)]
#[command(name = "soul-librarian")]
#[command(about = "Imports, identifies and sorts a music library", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print task reports as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import files or folders into the library
    Import {
        /// Files or folders to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Look up and complete the tags of every song in the library
    Identify,
    /// Move every song to its place in the folder layout
    Sort,
    /// Import audio files dropped into the configured folders until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = LibrarianConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let librarian = Librarian::open(&config)?;

    let reports = match cli.command {
        Commands::Import { paths } => librarian.import(&paths).await,
        Commands::Identify => librarian.identify().await,
        Commands::Sort => librarian.sort().await,
        Commands::Watch => {
            let json = cli.json;
            let result = librarian
                .watch(
                    &config,
                    async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            tracing::error!("Cannot listen for Ctrl-C: {}", e);
                        }
                    },
                    |report| {
                        if let Err(e) = report::print_report(report, json) {
                            tracing::error!("Cannot print report: {}", e);
                        }
                    },
                )
                .await;
            librarian.shutdown().await;
            result?;
            return Ok(());
        }
    };
    librarian.shutdown().await;

    let reports = reports?;
    report::print_reports(&reports, cli.json)?;

    let summary = report::RunSummary::of(&reports);
    if summary.failed_tasks > 0 {
        anyhow::bail!("{} of {} tasks failed", summary.failed_tasks, summary.tasks);
    }
    Ok(())
}
