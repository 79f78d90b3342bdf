//! Application state shared across handlers.
//!
//! The store is the only process-wide mutable resource. It is opened once
//! at startup and shared behind a Mutex; handlers hold the lock only for
//! the duration of a single database operation.

use std::sync::Arc;

use stridelog_store::Store;
use tokio::sync::{Mutex, RwLock};

use crate::auth::TokenIssuer;
use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration (RwLock for runtime reads from handlers).
    pub config: RwLock<Config>,
    /// Token issuer built from the auth config at startup.
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        let tokens = TokenIssuer::new(&config.auth.secret, config.auth.token_ttl_secs);
        Arc::new(Self {
            store: Mutex::new(store),
            config: RwLock::new(config),
            tokens,
        })
    }
}
