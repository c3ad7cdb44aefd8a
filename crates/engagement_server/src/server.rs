//! # HTTP Server
//!
//! Binds the engagement router and serves it until shutdown.

use std::net::SocketAddr;

use axum::Router;
use log::info;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes::engagement_routes;
use crate::store::Store;

/// HTTP server for the engagement API
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over an opened store
    pub fn new(config: ServerConfig, store: Store) -> Self {
        let router = engagement_routes(store);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C. In-flight requests finish before returning.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address `{}`: {err}", self.config.socket_addr()),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            "event=server_start module=server status=ok addr={} version={}",
            addr,
            engagement_core::core_version()
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("event=server_stop module=server status=ok");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
