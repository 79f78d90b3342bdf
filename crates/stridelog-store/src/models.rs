//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A registered user.
///
/// The password hash is never serialized; API-facing views are built
/// from the other fields.
#[derive(Debug, Clone, Serialize)]
pub struct StoredUser {
    /// User identifier (UUID v4).
    pub id: String,
    /// Email address (unique, stored lowercased).
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A per-user, per-day step count.
///
/// At most one record exists for a given `(user_id, recorded_for)` pair;
/// see [`Store::upsert_steps`](crate::Store::upsert_steps).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Database row ID.
    pub id: i64,
    /// Owning user.
    pub user_id: String,
    /// Midnight boundary of the calendar day this count belongs to.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_for: OffsetDateTime,
    /// Step count for the day (non-negative).
    pub steps: i64,
    /// When this record was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
