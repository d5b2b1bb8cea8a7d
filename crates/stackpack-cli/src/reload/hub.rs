//! Connected reload clients and broadcasting to them.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use stackpack_bundler::BuildOutcome;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;

use super::message::ReloadMessage;

/// Events buffered per client before it counts as lagging.
const CLIENT_BUFFER: usize = 16;

/// What happens to clients after a successful rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientRetention {
    /// Close every stream; the browser reloads and connects again.
    #[default]
    ClearOnSuccess,
    /// Keep streams open across rebuilds.
    Keep,
}

/// Registry of connected clients. Cloning shares the registry.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    inner: Arc<HubInner>,
}

#[derive(Debug)]
struct HubInner {
    clients: RwLock<HashMap<usize, mpsc::Sender<String>>>,
    next_id: AtomicUsize,
    retention: ClientRetention,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new(ClientRetention::default())
    }
}

impl ReloadHub {
    pub fn new(retention: ClientRetention) -> Self {
        Self {
            inner: Arc::new(HubInner {
                clients: RwLock::new(HashMap::new()),
                next_id: AtomicUsize::new(0),
                retention,
            }),
        }
    }

    pub fn retention(&self) -> ClientRetention {
        self.inner.retention
    }

    /// Add a client. Each broadcast arrives on the receiver as a JSON string.
    pub fn register(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.inner.clients.write().insert(id, tx);
        (id, rx)
    }

    /// Register a client as a stream that unregisters itself when dropped.
    pub fn subscribe(&self) -> ClientStream {
        let (id, rx) = self.register();
        ClientStream {
            id,
            receiver: ReceiverStream::new(rx),
            hub: self.clone(),
        }
    }

    /// Remove a client. Returns `false` if it was already gone.
    pub fn unregister(&self, id: usize) -> bool {
        self.inner.clients.write().remove(&id).is_some()
    }

    pub fn client_count(&self) -> usize {
        self.inner.clients.read().len()
    }

    /// Send the outcome of a build to every client.
    ///
    /// Clients whose receiver is gone are dropped. After a successful build
    /// the clients that were sent to are released unless the retention is
    /// [`ClientRetention::Keep`]. Returns the number of clients reached.
    ///
    /// The registry stays locked for the whole send, so a client that
    /// connects meanwhile waits for the next broadcast instead of being
    /// released unnotified.
    pub fn broadcast(&self, outcome: &BuildOutcome) -> usize {
        let json = ReloadMessage::from(outcome).to_json();
        let release = outcome.success && self.inner.retention == ClientRetention::ClearOnSuccess;

        let mut delivered = 0;
        {
            let mut clients = self.inner.clients.write();

            tracing::info!(
                "Changes detected, sending reload signal to {} clients",
                clients.len()
            );

            clients.retain(|id, tx| match tx.try_send(json.clone()) {
                Ok(()) => {
                    delivered += 1;
                    !release
                }
                Err(TrySendError::Closed(_)) => false,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Client {} is lagging, event skipped", id);
                    !release
                }
            });
        }

        if !outcome.success {
            for error in &outcome.errors {
                tracing::error!("{}", error.text);
            }
        }

        delivered
    }
}

/// A registered client's events.
///
/// Ends once the hub releases the client. Dropping it while still
/// registered means the connection went away on its own.
#[derive(Debug)]
pub struct ClientStream {
    id: usize,
    receiver: ReceiverStream<String>,
    hub: ReloadHub,
}

impl ClientStream {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Stream for ClientStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl Drop for ClientStream {
    fn drop(&mut self) {
        if self.hub.unregister(self.id) {
            tracing::warn!("Dev client disconnected unexpectedly.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackpack_bundler::BuildMessage;
    use tokio_stream::StreamExt;

    fn success() -> BuildOutcome {
        BuildOutcome {
            success: true,
            ..Default::default()
        }
    }

    fn failure() -> BuildOutcome {
        BuildOutcome {
            success: false,
            errors: vec![BuildMessage::new("Could not resolve 'x'")],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_register_and_unregister() {
        let hub = ReloadHub::default();
        let (a, _rx_a) = hub.register();
        let (b, _rx_b) = hub.register();

        assert_ne!(a, b);
        assert_eq!(hub.client_count(), 2);
        assert!(hub.unregister(a));
        assert!(!hub.unregister(a));
        assert_eq!(hub.client_count(), 1);
    }

    #[test]
    fn test_success_clears_clients() {
        let hub = ReloadHub::new(ClientRetention::ClearOnSuccess);
        let (_, mut rx) = hub.register();

        assert_eq!(hub.broadcast(&success()), 1);
        assert_eq!(hub.client_count(), 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            r#"{"success":true,"errors":[],"warnings":[]}"#
        );
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_keep_retention() {
        let hub = ReloadHub::new(ClientRetention::Keep);
        let (_, mut rx) = hub.register();

        hub.broadcast(&success());
        hub.broadcast(&success());

        assert_eq!(hub.client_count(), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_failure_keeps_clients() {
        let hub = ReloadHub::default();
        let (_, mut rx) = hub.register();

        assert_eq!(hub.broadcast(&failure()), 1);
        assert_eq!(hub.client_count(), 1);
        assert!(rx.try_recv().unwrap().contains(r#""success":false"#));
    }

    #[test]
    fn test_closed_clients_dropped() {
        let hub = ReloadHub::new(ClientRetention::Keep);
        let (_, rx) = hub.register();
        let (_, _alive) = hub.register();
        drop(rx);

        assert_eq!(hub.broadcast(&failure()), 1);
        assert_eq!(hub.client_count(), 1);
    }

    #[test]
    fn test_broadcast_without_clients() {
        let hub = ReloadHub::default();
        assert_eq!(hub.broadcast(&success()), 0);
    }

    #[test]
    fn test_clients_registered_during_broadcasts_are_never_released_silently() {
        use std::sync::atomic::AtomicBool;

        let hub = ReloadHub::new(ClientRetention::ClearOnSuccess);
        let stop = Arc::new(AtomicBool::new(false));

        let broadcaster = {
            let hub = hub.clone();
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    hub.broadcast(&success());
                }
            })
        };

        let clients: Vec<_> = (0..5_000).map(|_| hub.register()).collect();

        stop.store(true, Ordering::Relaxed);
        broadcaster.join().unwrap();

        for (id, mut rx) in clients {
            let notified = rx.try_recv().is_ok();
            let still_registered = hub.unregister(id);
            assert!(
                notified || still_registered,
                "client {id} was released without a message"
            );
        }
    }

    #[tokio::test]
    async fn test_client_stream_lifecycle() {
        let hub = ReloadHub::default();

        let stream = hub.subscribe();
        assert_eq!(hub.client_count(), 1);
        drop(stream);
        assert_eq!(hub.client_count(), 0);

        let mut stream = hub.subscribe();
        hub.broadcast(&success());
        assert!(stream.next().await.unwrap().contains("true"));
        assert!(stream.next().await.is_none());
    }
}
