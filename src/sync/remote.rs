//! Remote progress mirror port and an in-memory implementation.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hashbrown::HashMap;
use thiserror::Error;

use crate::{
    activity::{DeltaEntry, ProgressDelta},
    profile::UserProfile,
    types::{LessonId, UserId, Xp},
};

/// Remote store failure. Never rolls back local state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The call did not finish within the configured timeout.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),
    /// The remote store could not be reached.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    /// The remote store refused the request.
    #[error("remote store rejected request: {0}")]
    Rejected(String),
}

/// Remote store the sync coordinator mirrors progress into and refreshes
/// member profiles from.
///
/// Writes are merge-style: they never replace fields they do not carry.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Merges one activity into the owner's per-day document.
    async fn mirror(&self, delta: ProgressDelta) -> Result<(), RemoteError>;

    /// Merges the whole profile into the owner's user document.
    async fn merge_profile(&self, user_id: UserId, profile: UserProfile) -> Result<(), RemoteError>;

    /// Reads the owner's user document; `None` when it does not exist.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RemoteError>;
}

/// Quiz log entry inside a [`DayDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizEntry {
    /// Quiz that was taken.
    pub quiz_id: String,
    /// Score in percent.
    pub score: u32,
    /// Whether the attempt passed.
    pub passed: bool,
    /// Attempt instant.
    pub timestamp: DateTime<Utc>,
}

/// Merged per-user, per-day progress document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayDocument {
    /// XP earned that day.
    pub xp_earned: Xp,
    /// Lessons finished that day, without repeats.
    pub lessons_completed: Vec<LessonId>,
    /// Every quiz attempt that day.
    pub quizzes_taken: Vec<QuizEntry>,
    /// Instant of the last merged delta.
    pub updated_at: Option<DateTime<Utc>>,
}

impl DayDocument {
    fn merge(&mut self, delta: &ProgressDelta) {
        self.xp_earned = self.xp_earned.saturating_add(delta.xp_earned);
        self.updated_at = Some(delta.updated_at);
        match &delta.entry {
            DeltaEntry::Lesson { lesson_id } => {
                if !self.lessons_completed.contains(lesson_id) {
                    self.lessons_completed.push(lesson_id.clone());
                }
            }
            DeltaEntry::Quiz {
                quiz_id,
                score,
                passed,
                timestamp,
            } => self.quizzes_taken.push(QuizEntry {
                quiz_id: quiz_id.clone(),
                score: *score,
                passed: *passed,
                timestamp: *timestamp,
            }),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    days: HashMap<(UserId, NaiveDate), DayDocument>,
    users: HashMap<UserId, UserProfile>,
    writes: usize,
}

/// In-process [`RemoteMirror`] keeping merged documents in memory.
#[derive(Default)]
pub struct MemoryMirror {
    state: Mutex<MemoryState>,
}

impl MemoryMirror {
    /// Empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user document, as if written by another device.
    pub fn insert_user(&self, profile: UserProfile) {
        self.lock().users.insert(profile.uid.clone(), profile);
    }

    /// Merged day document for `user_id` on `date`.
    pub fn day(&self, user_id: &str, date: NaiveDate) -> Option<DayDocument> {
        self.lock().days.get(&(user_id.to_string(), date)).cloned()
    }

    /// Stored user document for `user_id`.
    pub fn user(&self, user_id: &str) -> Option<UserProfile> {
        self.lock().users.get(user_id).cloned()
    }

    /// Number of accepted writes of either kind.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panicked writer leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RemoteMirror for MemoryMirror {
    async fn mirror(&self, delta: ProgressDelta) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state
            .days
            .entry((delta.user_id.clone(), delta.date))
            .or_default()
            .merge(&delta);
        state.writes += 1;
        Ok(())
    }

    async fn merge_profile(&self, user_id: UserId, profile: UserProfile) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.users.insert(user_id, profile);
        state.writes += 1;
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RemoteError> {
        Ok(self.user(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::DELTA_FORMAT_VERSION;

    fn delta(entry: DeltaEntry, xp: Xp) -> ProgressDelta {
        ProgressDelta {
            format_version: DELTA_FORMAT_VERSION,
            user_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            xp_earned: xp,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            entry,
        }
    }

    #[tokio::test]
    async fn merges_accumulate_xp_union_lessons_and_append_quizzes() {
        let remote = MemoryMirror::new();
        let lesson = DeltaEntry::Lesson {
            lesson_id: "vowels-1".to_string(),
        };
        let quiz = DeltaEntry::Quiz {
            quiz_id: "vq".to_string(),
            score: 80,
            passed: true,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        };

        remote.mirror(delta(lesson.clone(), 25)).await.unwrap();
        remote.mirror(delta(lesson, 0)).await.unwrap();
        remote.mirror(delta(quiz.clone(), 80)).await.unwrap();
        remote.mirror(delta(quiz, 80)).await.unwrap();

        let doc = remote
            .day("u1", NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
            .unwrap();
        assert_eq!(doc.xp_earned, 185);
        assert_eq!(doc.lessons_completed, vec!["vowels-1".to_string()]);
        assert_eq!(doc.quizzes_taken.len(), 2);
        assert_eq!(remote.write_count(), 4);
    }

    #[tokio::test]
    async fn fetch_returns_latest_merged_profile() {
        let remote = MemoryMirror::new();
        assert_eq!(remote.fetch_profile("u1").await, Ok(None));

        let mut p = UserProfile::member("u1", "u1@example.com", "en", DateTime::<Utc>::UNIX_EPOCH);
        remote.merge_profile("u1".to_string(), p.clone()).await.unwrap();
        p.total_xp = 40;
        remote.insert_user(p.clone());

        assert_eq!(remote.fetch_profile("u1").await, Ok(Some(p)));
        assert_eq!(remote.write_count(), 1);
    }
}
