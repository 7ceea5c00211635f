//! Session-level progress tracking.
//!
//! [`ProgressTracker`] holds the signed-in profile and sequences every learning
//! event as ledger update, streak update, local save, and background mirror.
//! The in-memory profile only changes after the local save succeeds.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    activity::{Activity, QuizCompletion},
    clock::Clock,
    config::ProgressConfig,
    core::{
        ledger::{ProgressStats, complete_lesson, complete_quiz},
        streak::record_study,
    },
    persist::PersistError,
    profile::{SettingsPatch, UserProfile},
    sync::{
        coordinator::{Dispatch, SyncCoordinator},
        events::SyncEvent,
        remote::RemoteError,
    },
    types::{LessonId, UserId},
};

/// Failure of a tracker operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation needs a signed-in profile.
    #[error("no profile is signed in")]
    NotSignedIn,
    /// The local save failed; the in-memory profile is unchanged.
    #[error("local persistence failed: {0}")]
    Persist(#[from] PersistError),
    /// Sign-in could not read the remote user document.
    #[error("remote profile lookup failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Owns the current learner session.
///
/// Every mutating call takes `&mut self`, so one tracker is the single writer
/// of its profile.
pub struct ProgressTracker<C: Clock> {
    profile: Option<UserProfile>,
    sync: SyncCoordinator,
    config: ProgressConfig,
    clock: C,
}

impl<C: Clock> ProgressTracker<C> {
    /// Tracker with no signed-in profile.
    pub fn new(sync: SyncCoordinator, config: ProgressConfig, clock: C) -> Self {
        Self {
            profile: None,
            sync,
            config,
            clock,
        }
    }

    /// Signed-in profile, if any.
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Derived stats for the signed-in profile.
    pub fn stats(&self) -> Option<ProgressStats> {
        self.profile
            .as_ref()
            .map(|p| ProgressStats::from_profile(p, &self.config))
    }

    /// Reward and scoring rules in use.
    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Subscribes to the coordinator's sync events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SyncEvent> {
        self.sync.subscribe()
    }

    /// Reloads whatever profile the local store holds.
    pub async fn restore(&mut self) -> Result<Option<&UserProfile>, SessionError> {
        self.profile = self.sync.load().await?;
        Ok(self.profile.as_ref())
    }

    /// Re-reads the signed-in profile from its source of truth.
    ///
    /// Guests reload from the local store. Members pull their user document
    /// from the remote store and cache it locally; when the remote read fails
    /// or finds nothing, the current profile is kept.
    pub async fn refresh(&mut self) -> Result<&UserProfile, SessionError> {
        let current = self.profile.as_ref().ok_or(SessionError::NotSignedIn)?;

        if current.is_guest {
            if let Some(local) = self.sync.load().await? {
                self.profile = Some(local);
            }
        } else {
            match self.sync.fetch_remote(&current.uid).await {
                Ok(Some(fresh)) => {
                    self.sync.persist(&fresh, self.clock.now()).await?;
                    self.profile = Some(fresh);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(user_id = %current.uid, error = %err, "profile refresh failed; keeping local copy");
                }
            }
        }

        self.profile.as_ref().ok_or(SessionError::NotSignedIn)
    }

    /// Starts a local-only guest session.
    pub async fn start_guest(&mut self, language: &str) -> Result<&UserProfile, SessionError> {
        let profile = UserProfile::guest(language, self.clock.now());
        info!(user_id = %profile.uid, "guest session started");
        self.sync.persist(&profile, self.clock.now()).await?;
        Ok(&*self.profile.insert(profile))
    }

    /// Creates a signed-up profile and seeds the remote user document.
    pub async fn start_member(
        &mut self,
        uid: impl Into<UserId>,
        email: &str,
        language: &str,
    ) -> Result<&UserProfile, SessionError> {
        let profile = UserProfile::member(uid, email, language, self.clock.now());
        info!(user_id = %profile.uid, "member session started");
        self.sync
            .persist_and_merge_profile(&profile, self.clock.now())
            .await?;
        Ok(&*self.profile.insert(profile))
    }

    /// Signs a member in: adopts the remote user document when one exists,
    /// otherwise starts a fresh member profile.
    ///
    /// A failed remote read aborts the sign-in and leaves the session as it was.
    pub async fn sign_in(
        &mut self,
        uid: impl Into<UserId>,
        email: &str,
        language: &str,
    ) -> Result<&UserProfile, SessionError> {
        let uid = uid.into();
        match self.sync.fetch_remote(&uid).await? {
            Some(existing) => self.adopt(existing).await,
            None => self.start_member(uid, email, language).await,
        }
    }

    /// Takes over a profile fetched from the remote store at sign-in.
    pub async fn adopt(&mut self, profile: UserProfile) -> Result<&UserProfile, SessionError> {
        info!(user_id = %profile.uid, "session adopted existing profile");
        self.sync.persist(&profile, self.clock.now()).await?;
        Ok(&*self.profile.insert(profile))
    }

    /// Records a finished lesson for today and syncs it.
    pub async fn finish_lesson(
        &mut self,
        lesson_id: impl Into<LessonId>,
    ) -> Result<Dispatch, SessionError> {
        let current = self.profile.as_ref().ok_or(SessionError::NotSignedIn)?;
        let lesson_id = lesson_id.into();
        let (today, now) = (self.clock.today(), self.clock.now());

        let updated = complete_lesson(current.clone(), lesson_id.clone(), &self.config);
        let updated = record_study(updated, today);
        let xp = updated.total_xp.saturating_sub(current.total_xp);

        let activity = Activity::Lesson { lesson_id };
        let dispatch = self
            .sync
            .persist_and_sync(&updated, &activity, xp, today, now)
            .await?;
        self.profile = Some(updated);
        Ok(dispatch)
    }

    /// Records a finished quiz for today and syncs it.
    pub async fn finish_quiz(&mut self, completion: QuizCompletion) -> Result<Dispatch, SessionError> {
        let current = self.profile.as_ref().ok_or(SessionError::NotSignedIn)?;
        let (today, now) = (self.clock.today(), self.clock.now());

        let updated = complete_quiz(current.clone(), &completion, now);
        let updated = record_study(updated, today);
        let xp = updated.total_xp.saturating_sub(current.total_xp);

        let activity = Activity::Quiz { completion };
        let dispatch = self
            .sync
            .persist_and_sync(&updated, &activity, xp, today, now)
            .await?;
        self.profile = Some(updated);
        Ok(dispatch)
    }

    /// Applies a settings patch and merges the profile remotely.
    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Result<Dispatch, SessionError> {
        let current = self.profile.as_ref().ok_or(SessionError::NotSignedIn)?;
        let mut updated = current.clone();
        patch.apply_to(&mut updated.settings);

        let dispatch = self
            .sync
            .persist_and_merge_profile(&updated, self.clock.now())
            .await?;
        self.profile = Some(updated);
        Ok(dispatch)
    }

    /// Clears the local store and ends the session. In-flight remote writes
    /// keep the user id they were dispatched with.
    pub async fn sign_out(&mut self) -> Result<(), SessionError> {
        self.sync.clear().await?;
        if let Some(profile) = self.profile.take() {
            info!(user_id = %profile.uid, "signed out");
        }
        Ok(())
    }
}
