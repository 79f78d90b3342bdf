//! Local data persistence for stridelog users and daily step records.
//!
//! This crate provides SQLite-based storage with one record per user per
//! calendar day. Writing a count for a day the user already has a record
//! for overwrites the old value; the `UNIQUE(user_id, recorded_for)`
//! constraint guarantees a second write can never produce a duplicate row.
//!
//! # Example
//!
//! ```no_run
//! use stridelog_store::Store;
//! use time::{OffsetDateTime, Time};
//!
//! let store = Store::open_default()?;
//!
//! let today = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
//! let record = store.upsert_steps("user-id", today, 8250)?;
//! assert_eq!(record.steps, 8250);
//! # Ok::<(), stridelog_store::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{StepRecord, StoredUser};
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/stridelog/data.db`
/// - macOS: `~/Library/Application Support/stridelog/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\stridelog\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("stridelog")
        .join("data.db")
}
