//! Hello Sessions
//!
//! A small HTTP service that keeps per-client session state (`hello`,
//! `goodnight`, `count`) behind a signed cookie and echoes it back as JSON.
//!
//! # Modules
//!
//! - [`api`]: the `GET /sessions/{key}` route and its response shapes
//! - [`config`]: layered configuration and signing-key resolution
//! - [`error`]: request and startup error types
//! - [`server`]: router assembly and the HTTP server
//! - [`session`]: session records and the in-memory store
//! - [`telemetry`]: structured logging setup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod telemetry;

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::config::AppConfig;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session store for per-client state.
    pub sessions: SessionStore,
    /// Key signing the session cookie.
    pub key: Key,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state with a fresh session store sized from `config`.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, key: Key) -> Self {
        let sessions = SessionStore::new(config.session.idle_timeout());
        Self {
            sessions,
            key,
            config,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
