//! Bearer-token authentication.
//!
//! Credentials are seeded from the environment at startup; login exchanges
//! them for an opaque token held in an in-memory session store. Handlers
//! opt in by taking an [`Authenticated`] extractor.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The credential pair logins are checked against.
#[derive(Debug)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    password_digest: String,
}

impl Credentials {
    /// Seeds credentials, storing only the password digest.
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password_digest: digest(password),
        }
    }

    /// Checks a login attempt.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password_digest == digest(password)
    }
}

fn digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// In-memory session store mapping bearer tokens to usernames.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for a logged-in user.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn issue(&self, username: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens
            .write()
            .unwrap()
            .insert(token.clone(), username.to_owned());
        token
    }

    /// Resolves a token to its username, if the session exists.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<String> {
        self.tokens.read().unwrap().get(token).cloned()
    }
}

/// Extractor that rejects requests without a valid bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The user the token belongs to.
    pub username: String,
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token.and_then(|t| state.sessions.validate(t)) {
            Some(username) => Ok(Authenticated { username }),
            None => Err(ApiError::Unauthorized(
                "missing or invalid bearer token".to_owned(),
            )),
        }
    }
}
