//! safe-rm-mcp: MCP server for safe file deletion via the safe-rm tool
//!
//! Bridges an AI-agent host to the external safe-rm binary over
//! Content-Length framed JSON-RPC on stdin/stdout. Stdout carries only
//! protocol frames; diagnostics go to stderr.

use safe_rm_mcp::config::Config;
use safe_rm_mcp::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting safe-rm-mcp server");

    let config = Config::from_env();
    tracing::debug!(
        tool = %config.safe_rm_path.display(),
        trash = %config.trash_dir.display(),
        "resolved configuration"
    );
    server::run(config).await?;

    tracing::info!("safe-rm-mcp server stopped");
    Ok(())
}
