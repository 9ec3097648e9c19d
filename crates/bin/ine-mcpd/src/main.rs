//! Daemon entry point for the INE MCP server.
//!
//! Loads configuration from arguments and the environment, builds the HTTP
//! upstream, and serves the MCP protocol over stdio and/or streamable HTTP.

mod config;

use ine_core::{HttpUpstream, IneControlPlane};
use ine_mcp::server::{serve_stdio, serve_streamable_http};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::IneConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = IneConfig::from_args()?;
    init_tracing(config.log_filter.as_deref());

    let upstream = HttpUpstream::new(config.client.clone())?;
    let control = IneControlPlane::new(upstream).with_options(config.control);
    tracing::info!(
        base_url = %config.client.base_url,
        language = %config.client.language,
        stdio = config.enable_stdio,
        http = config.mcp_serve,
        "starting ine-mcpd"
    );

    let http = config
        .mcp_serve
        .then(|| tokio::spawn(serve_streamable_http(control.clone(), config.http.clone())));

    if config.enable_stdio {
        serve_stdio(control).await?;
        if let Some(handle) = http {
            handle.abort();
        }
        return Ok(());
    }

    if let Some(handle) = http {
        handle.await??;
    }
    Ok(())
}

/// Logs go to stderr; stdout is the stdio transport.
fn init_tracing(filter: Option<&str>) {
    let filter = filter.map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        |directives| EnvFilter::new(directives),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
