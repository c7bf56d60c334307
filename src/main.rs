//! PowerPoint MCP Server entry point.
//!
//! This binary starts the MCP server using STDIO transport.

use powerpoint_mcp_server::PowerPointServer;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (important for STDIO transport)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "powerpoint_mcp_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        "Starting PowerPoint MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let server = PowerPointServer::default();

    // Best effort: operations retry directory creation per call.
    if let Err(e) = server.store().ensure_root() {
        tracing::warn!("Could not create storage directory: {}", e);
    }

    // Serve over STDIO
    let service = server.serve(rmcp::transport::stdio()).await?;

    // Wait for the service to complete
    service.waiting().await?;

    tracing::info!("PowerPoint MCP Server stopped");
    Ok(())
}
