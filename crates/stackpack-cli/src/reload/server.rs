//! HTTP endpoint for reload events.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::net::TcpListener;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

use super::hub::ReloadHub;
use crate::error::{CliError, Result};

/// Address used when only a port is configured.
pub const DEFAULT_ADDR: [u8; 4] = [127, 0, 0, 1];

const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Serves the hub's events on every path as `text/event-stream`.
pub struct ReloadServer {
    listener: TcpListener,
    hub: ReloadHub,
}

impl ReloadServer {
    /// Bind `addr`. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr, hub: ReloadHub) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        Ok(Self { listener, hub })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the task is dropped.
    pub async fn serve(self) -> Result<()> {
        let port = self.local_addr()?.port();
        tracing::info!("Sending messages at http://localhost:{}", port);

        axum::serve(self.listener, router(self.hub))
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

fn router(hub: ReloadHub) -> Router {
    Router::new()
        .fallback(handle_events)
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(hub)
}

async fn handle_events(
    State(hub): State<ReloadHub>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = hub.subscribe();
    tracing::info!("Dev client connected!");
    tracing::debug!("Client {} registered", stream.id());

    Sse::new(stream.map(|json| Ok(Event::default().data(json))))
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE))
}
