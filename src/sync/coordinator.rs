use std::{future::Future, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::{
    sync::{Mutex, broadcast},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    activity::{Activity, ProgressDelta},
    config::SyncConfig,
    persist::{PersistResult, ProfileSink},
    profile::UserProfile,
    types::{UserId, Xp},
};

use super::{
    events::SyncEvent,
    remote::{RemoteError, RemoteMirror},
};

/// Why no remote write was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Guest profiles have no remote identity.
    Guest,
    /// The coordinator was built without a remote mirror.
    NoRemote,
}

/// Outcome of the remote half of a sync call.
///
/// Dropping a `Spawned` handle detaches the task; it still runs to completion.
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing was sent remotely.
    Skipped(SkipReason),
    /// A background remote write is running.
    Spawned(JoinHandle<()>),
}

impl Dispatch {
    /// True when a background remote write was started.
    pub fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned(_))
    }

    /// Waits for a spawned remote write to finish.
    ///
    /// Returns false only when the task panicked or was aborted. Remote errors
    /// are already logged and broadcast by the task itself.
    pub async fn settled(self) -> bool {
        let Self::Spawned(handle) = self else {
            return true;
        };
        match handle.await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "remote sync task did not complete");
                false
            }
        }
    }
}

/// Orders local persistence strictly before best-effort remote mirroring.
#[derive(Clone)]
pub struct SyncCoordinator {
    local: Arc<Mutex<Box<dyn ProfileSink>>>,
    remote: Option<Arc<dyn RemoteMirror>>,
    events_tx: broadcast::Sender<SyncEvent>,
    config: SyncConfig,
}

impl SyncCoordinator {
    /// Wraps a local sink and an optional remote mirror.
    pub fn new(
        local: Box<dyn ProfileSink>,
        remote: Option<Arc<dyn RemoteMirror>>,
        config: SyncConfig,
    ) -> Self {
        let (events_tx, _) = broadcast::channel::<SyncEvent>(config.event_capacity.max(1));
        Self {
            local: Arc::new(Mutex::new(local)),
            remote,
            events_tx,
            config,
        }
    }

    /// Subscribes to persistence and mirroring events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events_tx.subscribe()
    }

    /// Writes the full profile to the local sink and waits for it.
    pub async fn persist(&self, profile: &UserProfile, saved_at: DateTime<Utc>) -> PersistResult<()> {
        let snapshot = profile.clone();
        let sink_ref = Arc::clone(&self.local);
        tokio::task::spawn_blocking(move || {
            let mut sink = sink_ref.blocking_lock();
            sink.save_profile(&snapshot, saved_at)?;
            sink.flush()
        })
        .await??;

        debug!(user_id = %profile.uid, "profile persisted locally");
        let _ = self.events_tx.send(SyncEvent::Persisted {
            user_id: profile.uid.clone(),
        });
        Ok(())
    }

    /// Reads the locally stored profile.
    pub async fn load(&self) -> PersistResult<Option<UserProfile>> {
        let sink_ref = Arc::clone(&self.local);
        tokio::task::spawn_blocking(move || sink_ref.blocking_lock().load_profile()).await?
    }

    /// Removes the locally stored profile.
    pub async fn clear(&self) -> PersistResult<()> {
        let sink_ref = Arc::clone(&self.local);
        tokio::task::spawn_blocking(move || {
            let mut sink = sink_ref.blocking_lock();
            sink.clear_profile()?;
            sink.flush()
        })
        .await?
    }

    /// Persists `profile` locally, then mirrors `activity` into the day
    /// document and merges the whole profile into the user document, in one
    /// background task, unless the profile is a guest.
    ///
    /// Only the local write can fail this call. `xp_earned` is what the ledger
    /// granted for `activity`; `today` keys the remote day document.
    pub async fn persist_and_sync(
        &self,
        profile: &UserProfile,
        activity: &Activity,
        xp_earned: Xp,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> PersistResult<Dispatch> {
        self.persist(profile, now).await?;

        let remote = match self.remote_for(profile) {
            Ok(remote) => remote,
            Err(reason) => return Ok(Dispatch::Skipped(reason)),
        };

        let delta = ProgressDelta::new(profile.uid.clone(), activity, xp_earned, today, now);
        let user_id = delta.user_id.clone();
        let snapshot = profile.clone();
        let done = SyncEvent::Mirrored {
            user_id: user_id.clone(),
            date: today,
        };
        let owner = user_id.clone();
        let handle = self.spawn_remote(user_id, done, async move {
            remote.mirror(delta).await?;
            remote.merge_profile(owner, snapshot).await
        });
        Ok(Dispatch::Spawned(handle))
    }

    /// Persists `profile` locally, then merges the whole record remotely in the
    /// background unless the profile is a guest.
    pub async fn persist_and_merge_profile(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> PersistResult<Dispatch> {
        self.persist(profile, now).await?;

        let remote = match self.remote_for(profile) {
            Ok(remote) => remote,
            Err(reason) => return Ok(Dispatch::Skipped(reason)),
        };

        let user_id = profile.uid.clone();
        let snapshot = profile.clone();
        let done = SyncEvent::ProfileMerged {
            user_id: user_id.clone(),
        };
        let owner = user_id.clone();
        let handle = self.spawn_remote(user_id, done, async move {
            remote.merge_profile(owner, snapshot).await
        });
        Ok(Dispatch::Spawned(handle))
    }

    /// Reads `user_id`'s profile from the remote store under the remote
    /// timeout. Without a configured mirror there is nothing to read.
    pub async fn fetch_remote(&self, user_id: &str) -> Result<Option<UserProfile>, RemoteError> {
        let Some(remote) = self.remote.as_ref() else {
            return Ok(None);
        };
        let timeout = self.config.remote_timeout();
        match tokio::time::timeout(timeout, remote.fetch_profile(user_id)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(timeout)),
        }
    }

    fn remote_for(&self, profile: &UserProfile) -> Result<Arc<dyn RemoteMirror>, SkipReason> {
        if profile.is_guest {
            return Err(SkipReason::Guest);
        }
        self.remote.clone().ok_or(SkipReason::NoRemote)
    }

    fn spawn_remote<Fut>(&self, user_id: UserId, done: SyncEvent, write: Fut) -> JoinHandle<()>
    where
        Fut: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        let events_tx = self.events_tx.clone();
        let timeout = self.config.remote_timeout();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, write).await {
                Ok(inner) => inner,
                Err(_) => Err(RemoteError::Timeout(timeout)),
            };
            match result {
                Ok(()) => {
                    debug!(user_id = %user_id, "remote sync applied");
                    let _ = events_tx.send(done);
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "remote sync failed");
                    let _ = events_tx.send(SyncEvent::MirrorFailed {
                        user_id,
                        reason: err.to_string(),
                    });
                }
            }
        })
    }
}
