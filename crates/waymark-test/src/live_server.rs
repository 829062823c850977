//! A live server for tests that need a real socket.
//!
//! [`LiveServer`] binds a [`FrozenRouter`] to a random local port and serves
//! it in a background task until stopped.
//!
//! ## Example
//!
//! ```rust,no_run
//! use waymark_http::{RequestContext, Router};
//! use waymark_test::live_server::LiveServer;
//!
//! async fn example() {
//!     let mut router = Router::new();
//!     router.get("home", "/", |_ctx: RequestContext| async { "Hello" });
//!
//!     let server = LiveServer::start(router.build().unwrap()).await;
//!     println!("Server running at {}", server.url());
//!     server.stop().await;
//! }
//! ```

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use waymark_core::WaymarkResult;
use waymark_http::FrozenRouter;

/// A frozen router served on `127.0.0.1` at a random port.
pub struct LiveServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<JoinHandle<WaymarkResult<()>>>,
}

impl LiveServer {
    /// Starts serving `router` in a background task.
    ///
    /// # Panics
    ///
    /// Panics if the TCP listener cannot be bound.
    pub async fn start(router: FrozenRouter) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Failed to get local address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(router.serve_with_shutdown(listener, async {
            shutdown_rx.await.ok();
        }));

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        }
    }

    /// Returns the base URL of the server (e.g., `http://127.0.0.1:43210`).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Shuts down the server gracefully and waits for it to finish.
    ///
    /// Returns the server's own result.
    pub async fn stop(mut self) -> WaymarkResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.server_handle.take() {
            Some(handle) => handle.await.unwrap_or(Ok(())),
            None => Ok(()),
        }
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        // The task ends on its own once it sees the signal.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
