//! Session credential context.
//!
//! # Responsibility
//! - Hold the bearer credential set at login and cleared at logout.
//! - Share one credential between the shell and the board.
//!
//! # Invariants
//! - The credential is read at call time, never cached by callers.
//! - A blank token is treated the same as no token.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, RwLock};

/// Bearer token read from the session for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(token))
    }

    pub fn token(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Cloneable handle to the process session.
///
/// Clones share state: a logout through one handle is visible through all.
#[derive(Clone, Default)]
pub struct Session {
    credential: Arc<RwLock<Option<Credential>>>,
}

impl Session {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session signed in with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    /// Stores the credential issued at login. Blank tokens sign out.
    pub fn login(&self, token: impl Into<String>) {
        let mut guard = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Credential::new(token);
    }

    /// Forgets the credential.
    pub fn clear(&self) {
        let mut guard = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    /// Returns the current credential, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.credential().is_some()
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}
