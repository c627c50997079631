//! Recording implementation of GameConnectionPort for testing
//!
//! Lets tests drive connection state and inbound messages, and assert on
//! outbound frames.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gemduel_shared::{ClientMessage, ServerMessage};

use crate::ports::outbound::game_connection_port::{
    ConnectionError, ConnectionHandlers, ConnectionState, GameConnectionPort,
};

#[derive(Default)]
struct State {
    conn_state: ConnectionState,
    urls: Vec<String>,
    sent: Vec<ClientMessage>,
    handlers: Option<ConnectionHandlers>,
    fail_next_connect: bool,
    disconnects: usize,
}

/// Test double for `GameConnectionPort`.
///
/// `connect` succeeds immediately (unless `fail_next_connect` was called) and
/// reports `Connected` through the installed handlers. Handlers of a replaced
/// connection see `Disconnected` first.
#[derive(Clone, Default)]
pub struct RecordingConnection {
    state: Arc<Mutex<State>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `connect` fail with a handshake error
    pub fn fail_next_connect(&self) {
        self.lock().fail_next_connect = true;
    }

    /// Deliver an inbound message as if it arrived on the socket
    pub fn emit_message(&self, message: ServerMessage) {
        let handlers = self.lock().handlers.clone();
        if let Some(handlers) = handlers {
            (handlers.on_message)(message);
        }
    }

    /// Simulate the server closing the socket
    pub fn drop_connection(&self) {
        let handlers = {
            let mut s = self.lock();
            s.conn_state = ConnectionState::Disconnected;
            s.handlers.clone()
        };
        if let Some(handlers) = handlers {
            (handlers.on_state_change)(ConnectionState::Disconnected);
        }
    }

    /// Every frame sent so far, in order
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.lock().sent.clone()
    }

    /// Every URL passed to `connect`, in order
    pub fn urls(&self) -> Vec<String> {
        self.lock().urls.clone()
    }

    pub fn disconnect_count(&self) -> usize {
        self.lock().disconnects
    }
}

#[async_trait::async_trait]
impl GameConnectionPort for RecordingConnection {
    fn state(&self) -> ConnectionState {
        self.lock().conn_state
    }

    async fn connect(
        &self,
        url: &str,
        handlers: ConnectionHandlers,
    ) -> Result<(), ConnectionError> {
        let (failed, previous) = {
            let mut s = self.lock();
            s.urls.push(url.to_string());
            s.conn_state = ConnectionState::Disconnected;
            (std::mem::take(&mut s.fail_next_connect), s.handlers.take())
        };
        if let Some(previous) = previous {
            (previous.on_state_change)(ConnectionState::Disconnected);
        }

        if failed {
            self.lock().conn_state = ConnectionState::Failed;
            (handlers.on_state_change)(ConnectionState::Failed);
            return Err(ConnectionError::Handshake {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        {
            let mut s = self.lock();
            s.conn_state = ConnectionState::Connected;
            s.handlers = Some(handlers.clone());
        }
        (handlers.on_state_change)(ConnectionState::Connected);
        Ok(())
    }

    async fn send(&self, message: ClientMessage) -> Result<(), ConnectionError> {
        let mut s = self.lock();
        if s.conn_state != ConnectionState::Connected {
            return Err(ConnectionError::NotConnected);
        }
        s.sent.push(message);
        Ok(())
    }

    async fn disconnect(&self) {
        let handlers = {
            let mut s = self.lock();
            s.disconnects += 1;
            s.conn_state = ConnectionState::Disconnected;
            s.handlers.take()
        };
        if let Some(handlers) = handlers {
            (handlers.on_state_change)(ConnectionState::Disconnected);
        }
    }
}
