/// SQLite-backed [`ProfileSink`].
pub mod sqlite;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::profile::UserProfile;

/// Local persistence failure.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite backend error.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Payload (de)serialization error.
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    /// The blocking persistence task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// Any other storage failure, such as an unreadable payload.
    #[error("{0}")]
    Message(String),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Local durable store for the signed-in profile.
///
/// Implementations are blocking; the sync layer drives them from
/// `spawn_blocking`.
pub trait ProfileSink: Send {
    /// Replaces the stored profile; `saved_at` is the caller's clock reading.
    fn save_profile(&mut self, profile: &UserProfile, saved_at: DateTime<Utc>) -> PersistResult<()>;
    /// Returns the stored profile, if any.
    fn load_profile(&self) -> PersistResult<Option<UserProfile>>;
    /// Removes the stored profile.
    fn clear_profile(&mut self) -> PersistResult<()>;
    /// Flushes buffered writes to durable storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}
