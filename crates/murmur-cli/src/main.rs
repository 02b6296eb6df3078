//! murmur: terminal front end for the voice-session manager.
//!
//! Reads commands from stdin, drives a `SessionManager` over the loopback
//! transport and prints status lines and session events.

mod cli;
mod logging;
mod repl;
mod settings;
mod status;

use std::sync::Arc;

use murmur_common::MurmurError;
use murmur_session::SessionManager;
use tracing::info;

use crate::repl::Repl;

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(e) = run(args).await {
        eprintln!("murmur: {e}");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args) -> Result<(), MurmurError> {
    let config = murmur_config::load_config(args.config.as_deref())?;
    logging::init(args.log_level.as_deref(), &config.logging.level);
    info!(version = env!("CARGO_PKG_VERSION"), "murmur starting");

    let echo = Arc::new(settings::echo_transport(&config.echo));
    let manager = Arc::new(SessionManager::new(
        echo.clone(),
        settings::session_config(&config),
    ));
    let repl = Repl::new(
        manager,
        echo,
        settings::identity(&config, &args),
        settings::retry_policy(&config.retry),
        settings::operation_timeout(&config.cli),
    );

    repl.run().await?;
    info!("murmur exiting");
    Ok(())
}
