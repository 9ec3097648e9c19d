//! MCP server runners for ine-mcp.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use ine_core::{IneControlPlane, Upstream};
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};

use crate::IneMcp;

/// Listener and session settings for the streamable HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    /// Keep per-client sessions; stateless mode answers each POST on its own.
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }
}

/// Serves the MCP server over stdio.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<U: Upstream>(
    control: IneControlPlane<U>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = IneMcp::new(control);
    let (stdin, stdout) = stdio();
    tracing::info!("serving MCP over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let _ = running.waiting().await?;
    Ok(())
}

/// Builds the HTTP app: `/mcp` carries the protocol and `/health` answers `ok`.
#[must_use]
pub fn http_router<U: Upstream>(
    control: IneControlPlane<U>,
    config: &McpHttpServerConfig,
) -> Router {
    let service: StreamableHttpService<IneMcp<U>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(IneMcp::new(control.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<U: Upstream>(
    control: IneControlPlane<U>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = http_router(control, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %config.addr,
        stateful = config.stateful_mode,
        "serving MCP over streamable HTTP"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedUpstream;

    #[test]
    fn new_config_keeps_sessions_and_keep_alive() {
        let addr: SocketAddr = "127.0.0.1:4030".parse().unwrap();
        let config = McpHttpServerConfig::new(addr);
        assert!(config.stateful_mode);
        assert_eq!(config.sse_keep_alive, Some(Duration::from_secs(15)));

        let stateless = config.with_stateful_mode(false).with_sse_keep_alive(None);
        assert!(!stateless.stateful_mode);
        assert_eq!(stateless.sse_keep_alive, None);
    }

    #[tokio::test]
    async fn router_answers_health_checks() {
        let control = IneControlPlane::new(FixedUpstream::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = McpHttpServerConfig::new(addr).with_stateful_mode(false);
        let app = http_router(control, &config);
        let server = tokio::spawn(async move { axum::serve(listener, app).await });

        let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "ok");

        let missing = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
        assert_eq!(missing.status(), 404);
        server.abort();
    }
}
