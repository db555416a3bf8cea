use anyhow::{Context, Result};
use mathscribe_server::{config, server};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Builds the log filter from either a bare level (`debug`) or a directive
/// list (`mathscribe_server=debug,tower_http=info`).
fn env_filter(directives: &str) -> Result<EnvFilter> {
    let directives = directives.trim();

    // A bare word would otherwise be accepted as a target name.
    if !directives.contains(['=', ',']) {
        directives.parse::<LevelFilter>().with_context(|| {
            format!(
                "Invalid log level: '{directives}'. Valid levels: off, error, warn, info, debug, trace"
            )
        })?;
    }

    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter: '{directives}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()
        .await
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&directives)?)
        .json()
        .init();

    info!(
        "Starting MathScribe on {}:{} (log filter: {})",
        config.server.host, config.server.port, directives
    );

    server::run(config).await?;

    Ok(())
}
