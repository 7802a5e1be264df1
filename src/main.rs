use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pricewatch::runner::Runner;
use pricewatch::AppConfig;

#[derive(Parser)]
#[command(name = "pricewatch", about = "Price/stock listing watcher with snapshot diff alerts")]
struct Cli {
    /// Extra config file layered over config/default.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env(cli.config.as_deref())?;

    // Log to stderr and a daily-rolling file; the guard must outlive the run
    let file_appender = tracing_appender::rolling::daily(&config.storage.log_dir, "pricewatch.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pricewatch=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    info!("starting pricewatch");
    let runner = Runner::new(config)?;
    runner.run().await?;
    info!("pricewatch finished");

    Ok(())
}
