//! Acima CLI binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use acima::cli::{commands, Cli};
use acima::error::ApiError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("acima=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {e}");
        if let Some(api_error) = e.downcast_ref::<ApiError>() {
            eprintln!("Hint: {}", commands::recovery_hint(api_error));
        }
        std::process::exit(1);
    }
}
