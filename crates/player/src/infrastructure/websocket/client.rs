//! Room socket client using tokio-tungstenite

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use gemduel_shared::ClientMessage;

use super::shared::{
    encode_client_message, parse_server_message, CLOSE_TIMEOUT_MS, OUTBOUND_QUEUE_CAPACITY,
};
use crate::ports::outbound::{
    ConnectionError, ConnectionHandlers, ConnectionState, GameConnectionPort,
};

/// The live socket: its writer queue, its two tasks and the handlers it reports to
struct ActiveSocket {
    tx: mpsc::Sender<Message>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    handlers: ConnectionHandlers,
}

/// WebSocket client for the room socket
///
/// Each `connect` bumps a generation counter; a reader task only reports the
/// close of its own socket, so replacing a socket never marks the new one
/// disconnected.
#[derive(Clone, Default)]
pub struct RoomSocketClient {
    state: Arc<AtomicU8>,
    generation: Arc<AtomicU64>,
    active: Arc<Mutex<Option<ActiveSocket>>>,
    /// Serializes concurrent `connect` calls
    connecting: Arc<Mutex<()>>,
}

impl RoomSocketClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_state(&self, handlers: &ConnectionHandlers, new_state: ConnectionState) {
        self.state.store(new_state.to_u8(), Ordering::SeqCst);
        (handlers.on_state_change)(new_state);
    }

    /// Tear down the current socket, returning the handlers it reported to
    async fn close_active(&self) -> Option<ConnectionHandlers> {
        let active = self.active.lock().await.take()?;

        // Retire the generation first so the reader's exit is not reported
        self.generation.fetch_add(1, Ordering::SeqCst);

        let ActiveSocket {
            tx,
            reader,
            mut writer,
            handlers,
        } = active;

        // No frame is dispatched once this returns
        reader.abort();
        if let Err(e) = reader.await {
            if !e.is_cancelled() {
                tracing::warn!("Room socket reader failed: {}", e);
            }
        }

        // Dropping the last sender lets the writer send a close frame and exit
        drop(tx);
        let flush = tokio::time::timeout(Duration::from_millis(CLOSE_TIMEOUT_MS), &mut writer);
        if flush.await.is_err() {
            tracing::warn!("Timed out closing room socket, aborting writer");
            writer.abort();
        }

        Some(handlers)
    }
}

#[async_trait::async_trait]
impl GameConnectionPort for RoomSocketClient {
    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    async fn connect(
        &self,
        url: &str,
        handlers: ConnectionHandlers,
    ) -> Result<(), ConnectionError> {
        let _connecting = self.connecting.lock().await;

        if let Some(previous) = self.close_active().await {
            tracing::info!("Replacing open room socket");
            self.state
                .store(ConnectionState::Disconnected.to_u8(), Ordering::SeqCst);
            (previous.on_state_change)(ConnectionState::Disconnected);
        }

        self.set_state(&handlers, ConnectionState::Connecting);

        let ws_stream = match connect_async(url).await {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                tracing::error!("Failed to connect to {}: {}", url, e);
                self.set_state(&handlers, ConnectionState::Failed);
                return Err(ConnectionError::Handshake {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        tracing::info!("Connected to room socket at {}", url);
        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE_CAPACITY);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Report Connected before the reader can observe a close
        self.set_state(&handlers, ConnectionState::Connected);

        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = write.send(frame).await {
                    tracing::error!("Failed to send message: {}", e);
                    return;
                }
            }
            if let Err(e) = write.close().await {
                tracing::debug!("Close frame not delivered: {}", e);
            }
        });

        let state = Arc::clone(&self.state);
        let current_generation = Arc::clone(&self.generation);
        let reader_handlers = handlers.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                if current_generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                match frame {
                    Ok(Message::Text(text)) => match parse_server_message(&text) {
                        Ok(message) => (reader_handlers.on_message)(message),
                        Err(e) => tracing::warn!("Failed to parse server message: {}", e),
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                }
            }

            if current_generation.load(Ordering::SeqCst) == generation {
                state.store(ConnectionState::Disconnected.to_u8(), Ordering::SeqCst);
                (reader_handlers.on_state_change)(ConnectionState::Disconnected);
            }
        });

        *self.active.lock().await = Some(ActiveSocket {
            tx,
            reader,
            writer,
            handlers,
        });

        Ok(())
    }

    async fn send(&self, message: ClientMessage) -> Result<(), ConnectionError> {
        if !self.state().is_connected() {
            return Err(ConnectionError::NotConnected);
        }

        let frame = encode_client_message(&message)?;

        // Clone the sender to avoid holding the lock across await
        let tx = {
            let active = self.active.lock().await;
            active.as_ref().map(|a| a.tx.clone())
        };
        let Some(tx) = tx else {
            return Err(ConnectionError::NotConnected);
        };

        tx.send(Message::Text(frame))
            .await
            .map_err(|_| ConnectionError::ChannelClosed)
    }

    async fn disconnect(&self) {
        let handlers = self.close_active().await;
        self.state
            .store(ConnectionState::Disconnected.to_u8(), Ordering::SeqCst);

        if let Some(handlers) = handlers {
            tracing::info!("Disconnected from room socket");
            (handlers.on_state_change)(ConnectionState::Disconnected);
        }
    }
}
