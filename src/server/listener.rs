//! Viewer HTTP server
//!
//! Serves the viewer page on `/` and the live stream on `/ws`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::tee::Tee;

use super::page;
use super::viewer::run_viewer;

/// Shared state passed to request handlers
#[derive(Clone)]
struct AppState {
    tee: Arc<Tee>,
    next_viewer_id: Arc<AtomicU64>,
}

/// HTTP + WebSocket server for viewers
pub struct ViewerServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    tee: Arc<Tee>,
}

impl ViewerServer {
    /// Bind the listening socket
    ///
    /// Binding happens up front so the real address (with the port chosen
    /// by the OS for port 0) is known before serving starts.
    pub async fn bind(addr: SocketAddr, tee: Arc<Tee>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!(addr = %local_addr, "Viewer server listening");

        Ok(Self {
            listener,
            local_addr,
            tee,
        })
    }

    /// Get the bound address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL a browser should open
    pub fn url(&self) -> String {
        if self.local_addr.ip().is_unspecified() {
            format!("http://localhost:{}/", self.local_addr.port())
        } else {
            format!("http://{}/", self.local_addr)
        }
    }

    /// Build the router
    pub fn router(tee: Arc<Tee>) -> Router {
        let state = AppState {
            tee,
            next_viewer_id: Arc::new(AtomicU64::new(1)),
        };

        Router::new()
            .route("/", get(page::index))
            .route("/ws", get(handle_ws))
            .with_state(state)
    }

    /// Serve until `shutdown` completes
    ///
    /// Viewer sessions already upgraded to WebSocket keep running until the
    /// tee closes or the viewer leaves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Self::router(self.tee);

        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("Viewer server stopped");
        Ok(())
    }
}

/// Handles WebSocket upgrade requests to `/ws`
async fn handle_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
) -> Response {
    let viewer_id = state.next_viewer_id.fetch_add(1, Ordering::Relaxed);
    let tee = state.tee;

    ws.on_upgrade(move |socket| async move {
        let exit = run_viewer(socket, tee, viewer_id, peer_addr).await;
        tracing::debug!(viewer_id = viewer_id, exit = ?exit, "Viewer task finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let tee = Arc::new(Tee::new());
        let server = ViewerServer::bind("127.0.0.1:0".parse().unwrap(), tee)
            .await
            .unwrap();

        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(
            server.url(),
            format!("http://127.0.0.1:{}/", server.local_addr().port())
        );
    }

    #[tokio::test]
    async fn test_url_for_unspecified_addr() {
        let tee = Arc::new(Tee::new());
        let server = ViewerServer::bind("0.0.0.0:0".parse().unwrap(), tee)
            .await
            .unwrap();

        assert!(server.url().starts_with("http://localhost:"));
    }
}
