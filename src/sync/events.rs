//! Sync event stream payloads.

use chrono::NaiveDate;

use crate::types::UserId;

/// Events emitted as profiles are persisted and mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The profile reached local durable storage.
    Persisted {
        /// Owner of the saved profile.
        user_id: UserId,
    },
    /// A progress delta was accepted by the remote store.
    Mirrored {
        /// Owner captured at dispatch time.
        user_id: UserId,
        /// Day document that was merged.
        date: NaiveDate,
    },
    /// A whole-profile merge was accepted by the remote store.
    ProfileMerged {
        /// Owner captured at dispatch time.
        user_id: UserId,
    },
    /// A remote write failed or timed out; local state is unaffected.
    MirrorFailed {
        /// Owner captured at dispatch time.
        user_id: UserId,
        /// Rendered remote error.
        reason: String,
    },
}
