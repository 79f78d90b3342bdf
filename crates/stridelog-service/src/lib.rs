//! HTTP REST API for tracking daily step counts.
//!
//! This crate provides a service that:
//! - Registers users and issues JWT bearer tokens
//! - Records one step count per user per calendar day (idempotent upsert)
//! - Serves the trailing week of records for the authenticated user
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check (no auth required)
//! - `POST /api/auth/register` - Create an account, returns a token
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `GET /api/steps/weekly` - Records for the trailing 7 days (auth)
//! - `POST /api/steps/daily` - Record today's count (auth)
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/stridelog/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [storage]
//! path = "~/.local/share/stridelog/data.db"
//!
//! [steps]
//! # Offset applied before truncating "today" to midnight
//! utc_offset_hours = 0
//!
//! [auth]
//! secret = "your-secure-random-key-at-least-16-chars"
//! token_ttl_secs = 604800
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod day;
pub mod middleware;
pub mod state;

pub use config::{AuthConfig, Config, ConfigError, ServerConfig, StepsConfig, StorageConfig};
pub use state::AppState;
