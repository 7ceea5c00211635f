//! SQLite-backed local profile store.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;

use super::{PersistError, PersistResult, ProfileSink};

/// Version number for serialized [`ProfileEnvelope`] payloads.
pub const PROFILE_FORMAT_VERSION: u16 = 1;

const CURRENT_SLOT: &str = "current";

/// Versioned wrapper for stable on-disk payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Wrapped profile.
    pub profile: UserProfile,
}

/// SQLite implementation of [`crate::persist::ProfileSink`].
pub struct SqliteProfileStore {
    conn: Connection,
}

impl SqliteProfileStore {
    /// Opens or creates a SQLite-backed store at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite store.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Caller-supplied instant of the last save, if a profile is stored.
    pub fn saved_at(&self) -> PersistResult<Option<DateTime<Utc>>> {
        let ts: Option<i64> = self
            .conn
            .query_row(
                "SELECT ts_ms FROM profiles WHERE slot = ?1",
                params![CURRENT_SLOT],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts.and_then(DateTime::from_timestamp_millis))
    }
}

impl ProfileSink for SqliteProfileStore {
    fn save_profile(&mut self, profile: &UserProfile, saved_at: DateTime<Utc>) -> PersistResult<()> {
        let payload = serde_json::to_vec(&ProfileEnvelope {
            format_version: PROFILE_FORMAT_VERSION,
            profile: profile.clone(),
        })?;
        self.conn.execute(
            "INSERT INTO profiles(slot, user_id, ts_ms, payload) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(slot) DO UPDATE SET
                user_id = excluded.user_id,
                ts_ms = excluded.ts_ms,
                payload = excluded.payload",
            params![CURRENT_SLOT, profile.uid, saved_at.timestamp_millis(), payload],
        )?;
        Ok(())
    }

    fn load_profile(&self) -> PersistResult<Option<UserProfile>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT payload FROM profiles WHERE slot = ?1",
                params![CURRENT_SLOT],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        decode_profile_payload(&payload)
            .map(Some)
            .map_err(PersistError::Message)
    }

    fn clear_profile(&mut self) -> PersistResult<()> {
        self.conn
            .execute("DELETE FROM profiles WHERE slot = ?1", params![CURRENT_SLOT])?;
        Ok(())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn decode_profile_payload(payload: &[u8]) -> Result<UserProfile, String> {
    if let Ok(envelope) = serde_json::from_slice::<ProfileEnvelope>(payload) {
        if envelope.format_version != PROFILE_FORMAT_VERSION {
            return Err(format!(
                "unsupported profile format version: {}",
                envelope.format_version
            ));
        }
        return Ok(envelope.profile);
    }

    // Raw profile records written before the envelope existed.
    serde_json::from_slice::<UserProfile>(payload)
        .map_err(|e| format!("profile payload decode failed: {e}"))
}
