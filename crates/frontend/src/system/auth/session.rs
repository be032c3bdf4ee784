use std::sync::{Arc, RwLock};

use super::storage;

/// Authentication state handed to `ApiClient::new`.
///
/// The token is read from browser storage once, when the session is
/// restored. Clones share the same state, so clearing one clears all.
#[derive(Clone, Debug, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
    persistent: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
}

impl Session {
    /// Session without a token and without browser storage
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// In-memory session with a known token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState {
                access_token: Some(token.into()),
            })),
            persistent: false,
        }
    }

    /// Session restored from the token the login page stored
    pub fn restore() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState {
                access_token: storage::read_access_token(),
            })),
            persistent: true,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|state| state.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {}", token))
    }

    /// Forget the token; a restored session also wipes browser storage
    pub fn clear(&self) {
        if let Ok(mut state) = self.inner.write() {
            state.access_token = None;
        }
        if self.persistent {
            storage::clear_tokens();
        }
    }
}
