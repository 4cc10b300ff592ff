//! Handshake state
//!
//! `Uninitialized` until the client's `initialized` notification arrives,
//! then `Initialized` for the rest of the process. There is no way back.

use {
    crate::types::Implementation,
    tokio::sync::RwLock,
    tracing::info,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
}

#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
    client_info: RwLock<Option<Implementation>>,
    client_protocol_version: RwLock<Option<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: RwLock::new(SessionState::Uninitialized),
            client_info: RwLock::new(None),
            client_protocol_version: RwLock::new(None),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn is_initialized(&self) -> bool {
        self.state().await == SessionState::Initialized
    }

    /// Remember who is talking to us. Does not change the state.
    pub async fn record_client(&self, client_info: Option<Implementation>, protocol_version: String) {
        *self.client_info.write().await = client_info;
        *self.client_protocol_version.write().await = Some(protocol_version);
    }

    pub async fn client_info(&self) -> Option<Implementation> {
        self.client_info.read().await.clone()
    }

    pub async fn client_protocol_version(&self) -> Option<String> {
        self.client_protocol_version.read().await.clone()
    }

    /// Flip to `Initialized`. Returns `false` if it already was.
    pub async fn mark_initialized(&self) -> bool {
        let mut state = self.state.write().await;
        if *state == SessionState::Initialized {
            return false;
        }
        *state = SessionState::Initialized;
        info!(event = "session_initialized", "Client completed the handshake");
        true
    }
}
