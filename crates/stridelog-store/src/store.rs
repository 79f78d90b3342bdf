//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use time::{OffsetDateTime, Time};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{StepRecord, StoredUser};
use crate::schema;

/// SQLite-based store for stridelog data.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better performance
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        // Initialize schema
        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// User operations
impl Store {
    /// Create a user. The caller supplies an already-hashed password.
    ///
    /// Fails with [`Error::EmailTaken`] if the email is already registered;
    /// the `UNIQUE` constraint on `users.email` is the arbiter, not a
    /// read-then-write check.
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<StoredUser> {
        if email.trim().is_empty() {
            return Err(Error::validation("email", "cannot be empty"));
        }
        if password_hash.is_empty() {
            return Err(Error::validation("password_hash", "cannot be empty"));
        }

        let id = Uuid::new_v4().to_string();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let result = self.conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, email, password_hash, now],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::EmailTaken(email.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Created user {} for {}", id, email);

        self.get_user(&id)?.ok_or(Error::UserNotFound(id))
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &str) -> Result<Option<StoredUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )?;

        let user = stmt
            .query_row([id], |row| {
                Ok(StoredUser {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: OffsetDateTime::from_unix_timestamp(row.get(3)?).unwrap(),
                })
            })
            .optional()?;

        Ok(user)
    }

    /// Get a user by email address.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )?;

        let user = stmt
            .query_row([email], |row| {
                Ok(StoredUser {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: OffsetDateTime::from_unix_timestamp(row.get(3)?).unwrap(),
                })
            })
            .optional()?;

        Ok(user)
    }
}

// Step record operations
impl Store {
    /// Write or overwrite the step count for `(user_id, day_start)`.
    ///
    /// `day_start` must already be truncated to a day boundary (time-of-day
    /// zeroed); the service layer owns that normalization. The write is a
    /// single `INSERT ... ON CONFLICT DO UPDATE` statement, so concurrent
    /// writes for the same key cannot produce two rows; the last writer
    /// wins. Returns the post-write record.
    pub fn upsert_steps(
        &self,
        user_id: &str,
        day_start: OffsetDateTime,
        steps: i64,
    ) -> Result<StepRecord> {
        if user_id.trim().is_empty() {
            return Err(Error::validation("user_id", "cannot be empty"));
        }
        if steps < 0 {
            return Err(Error::validation(
                "steps",
                format!("cannot be negative (got {})", steps),
            ));
        }
        if day_start.time() != Time::MIDNIGHT {
            return Err(Error::validation(
                "date",
                format!("must be truncated to a day boundary (got {})", day_start),
            ));
        }

        let day = day_start.unix_timestamp();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        self.conn.execute(
            "INSERT INTO steps (user_id, recorded_for, steps, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, recorded_for) DO UPDATE SET
                steps = excluded.steps,
                updated_at = excluded.updated_at",
            rusqlite::params![user_id, day, steps, now],
        )?;

        debug!("Recorded {} steps for {} on {}", steps, user_id, day_start);

        self.get_steps_for_day(user_id, day_start)?
            .ok_or_else(|| rusqlite::Error::QueryReturnedNoRows.into())
    }

    /// Get the record for a single day, if one exists.
    pub fn get_steps_for_day(
        &self,
        user_id: &str,
        day_start: OffsetDateTime,
    ) -> Result<Option<StepRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, recorded_for, steps, updated_at
             FROM steps WHERE user_id = ?1 AND recorded_for = ?2",
        )?;

        let record = stmt
            .query_row(
                rusqlite::params![user_id, day_start.unix_timestamp()],
                row_to_step_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Query a user's records with `recorded_for` in `[since, until]`,
    /// inclusive on both ends, ascending by day.
    ///
    /// An empty result is a successful outcome, not an error.
    pub fn steps_between(
        &self,
        user_id: &str,
        since: OffsetDateTime,
        until: OffsetDateTime,
    ) -> Result<Vec<StepRecord>> {
        if user_id.trim().is_empty() {
            return Err(Error::validation("user_id", "cannot be empty"));
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, recorded_for, steps, updated_at
             FROM steps
             WHERE user_id = ?1 AND recorded_for >= ?2 AND recorded_for <= ?3
             ORDER BY recorded_for ASC",
        )?;

        let records = stmt
            .query_map(
                rusqlite::params![user_id, since.unix_timestamp(), until.unix_timestamp()],
                row_to_step_record,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count step records for a user.
    pub fn count_steps(&self, user_id: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM steps WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }
}

fn row_to_step_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<StepRecord> {
    Ok(StepRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        recorded_for: OffsetDateTime::from_unix_timestamp(row.get(2)?).unwrap(),
        steps: row.get(3)?,
        updated_at: OffsetDateTime::from_unix_timestamp(row.get(4)?).unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;

    fn test_store_with_user() -> (Store, String) {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user("walker@example.com", "argon2-hash").unwrap();
        (store, user.id)
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_user("nobody").unwrap().is_none());
    }

    #[test]
    fn test_create_and_get_user() {
        let store = Store::open_in_memory().unwrap();

        let user = store.create_user("walker@example.com", "hash").unwrap();
        assert_eq!(user.email, "walker@example.com");
        assert!(!user.id.is_empty());

        let by_id = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, user.email);

        let by_email = store.get_user_by_email("walker@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn test_create_user_duplicate_email() {
        let store = Store::open_in_memory().unwrap();

        store.create_user("walker@example.com", "hash-1").unwrap();
        let result = store.create_user("walker@example.com", "hash-2");

        assert!(matches!(result, Err(Error::EmailTaken(_))));
    }

    #[test]
    fn test_create_user_empty_email() {
        let store = Store::open_in_memory().unwrap();
        let result = store.create_user("  ", "hash");
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_upsert_creates_record() {
        let (store, user_id) = test_store_with_user();
        let day = datetime!(2026-08-20 00:00:00 UTC);

        let record = store.upsert_steps(&user_id, day, 5000).unwrap();

        assert_eq!(record.user_id, user_id);
        assert_eq!(record.recorded_for, day);
        assert_eq!(record.steps, 5000);
    }

    #[test]
    fn test_upsert_same_day_overwrites() {
        let (store, user_id) = test_store_with_user();
        let day = datetime!(2026-08-20 00:00:00 UTC);

        store.upsert_steps(&user_id, day, 5000).unwrap();
        let record = store.upsert_steps(&user_id, day, 7000).unwrap();

        // Last writer wins, and exactly one row exists
        assert_eq!(record.steps, 7000);
        assert_eq!(store.count_steps(&user_id).unwrap(), 1);
    }

    #[test]
    fn test_upsert_negative_steps_rejected_without_mutation() {
        let (store, user_id) = test_store_with_user();
        let day = datetime!(2026-08-20 00:00:00 UTC);

        let result = store.upsert_steps(&user_id, day, -1);

        assert!(matches!(result, Err(Error::Validation { field: "steps", .. })));
        assert_eq!(store.count_steps(&user_id).unwrap(), 0);
    }

    #[test]
    fn test_upsert_rejects_non_midnight_date() {
        let (store, user_id) = test_store_with_user();
        let not_midnight = datetime!(2026-08-20 08:15:00 UTC);

        let result = store.upsert_steps(&user_id, not_midnight, 100);

        assert!(matches!(result, Err(Error::Validation { field: "date", .. })));
    }

    #[test]
    fn test_upsert_rejects_empty_user_id() {
        let store = Store::open_in_memory().unwrap();
        let day = datetime!(2026-08-20 00:00:00 UTC);

        let result = store.upsert_steps("", day, 100);

        assert!(matches!(result, Err(Error::Validation { field: "user_id", .. })));
    }

    #[test]
    fn test_steps_between_empty_range_is_ok() {
        let (store, user_id) = test_store_with_user();

        let records = store
            .steps_between(
                &user_id,
                datetime!(2026-01-01 00:00:00 UTC),
                datetime!(2026-01-31 00:00:00 UTC),
            )
            .unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn test_steps_between_ascending_and_inclusive() {
        let (store, user_id) = test_store_with_user();
        let base = datetime!(2026-08-10 00:00:00 UTC);

        // Insert out of order
        store.upsert_steps(&user_id, base + Duration::days(2), 3000).unwrap();
        store.upsert_steps(&user_id, base, 1000).unwrap();
        store.upsert_steps(&user_id, base + Duration::days(1), 2000).unwrap();

        // Bounds land exactly on the first and last day
        let records = store
            .steps_between(&user_id, base, base + Duration::days(2))
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].steps, 1000);
        assert_eq!(records[1].steps, 2000);
        assert_eq!(records[2].steps, 3000);
        assert!(records.windows(2).all(|w| w[0].recorded_for < w[1].recorded_for));
    }

    #[test]
    fn test_steps_between_excludes_outside_range() {
        let (store, user_id) = test_store_with_user();
        let base = datetime!(2026-08-10 00:00:00 UTC);

        store.upsert_steps(&user_id, base, 1000).unwrap();
        store.upsert_steps(&user_id, base + Duration::days(10), 9000).unwrap();

        let records = store
            .steps_between(&user_id, base - Duration::days(1), base + Duration::days(5))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].steps, 1000);
    }

    #[test]
    fn test_steps_are_scoped_per_user() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_user("alice@example.com", "hash").unwrap();
        let bob = store.create_user("bob@example.com", "hash").unwrap();
        let day = datetime!(2026-08-20 00:00:00 UTC);

        store.upsert_steps(&alice.id, day, 1234).unwrap();
        store.upsert_steps(&bob.id, day, 9876).unwrap();

        let for_alice = store
            .steps_between(&alice.id, day, day)
            .unwrap();

        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].steps, 1234);
    }

    #[test]
    fn test_repeated_upserts_keep_last_value() {
        let (store, user_id) = test_store_with_user();
        let day = datetime!(2026-08-20 00:00:00 UTC);

        for steps in [100, 0, 42, 15000] {
            store.upsert_steps(&user_id, day, steps).unwrap();
        }

        let record = store.get_steps_for_day(&user_id, day).unwrap().unwrap();
        assert_eq!(record.steps, 15000);
        assert_eq!(store.count_steps(&user_id).unwrap(), 1);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");

        let store = Store::open(&path).unwrap();
        let user = store.create_user("disk@example.com", "hash").unwrap();
        drop(store);

        // Reopen and verify persistence
        let store = Store::open(&path).unwrap();
        let loaded = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(loaded.email, "disk@example.com");
    }
}
