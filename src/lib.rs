//! Learner progress and streak bookkeeping with SQLite-backed local
//! persistence and best-effort remote mirroring.
//!
//! # Examples
//!
//! Pure ledger usage with [`core::ledger`] and [`core::streak`]:
//! ```
//! use chrono::{DateTime, NaiveDate, Utc};
//! use studylog::{
//!     config::ProgressConfig,
//!     core::{ledger::{complete_lesson, level_progress}, streak::record_study},
//!     profile::UserProfile,
//! };
//!
//! let cfg = ProgressConfig::default();
//! let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let profile = UserProfile::guest("en", DateTime::<Utc>::UNIX_EPOCH);
//! let profile = record_study(complete_lesson(profile, "vowels-1", &cfg), today);
//! assert_eq!(profile.total_xp, 25);
//! assert_eq!(profile.current_streak, 1);
//! assert_eq!(level_progress(&profile, &cfg.levels), 10);
//! ```
//!
//! Session usage with a SQLite store and a remote mirror:
//! ```no_run
//! use std::sync::Arc;
//!
//! use studylog::{
//!     clock::UtcClock,
//!     config::{ProgressConfig, SyncConfig},
//!     persist::sqlite::SqliteProfileStore,
//!     sync::{coordinator::SyncCoordinator, remote::MemoryMirror},
//!     tracker::ProgressTracker,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = SqliteProfileStore::open("studylog.db").expect("open sqlite");
//! let sync = SyncCoordinator::new(
//!     Box::new(store),
//!     Some(Arc::new(MemoryMirror::new())),
//!     SyncConfig::default(),
//! );
//! let mut tracker = ProgressTracker::new(sync, ProgressConfig::default(), UtcClock);
//! if tracker.restore().await.expect("restore").is_none() {
//!     tracker.start_member("uid-1", "minji@example.com", "en").await.expect("start");
//! }
//! let _mirror = tracker.finish_lesson("vowels-1").await.expect("lesson");
//! # }
//! ```
#![deny(missing_docs)]

/// Learning activities and remote progress deltas.
pub mod activity;
/// Injected time source.
pub mod clock;
/// Reward, level, and sync tuning.
pub mod config;
/// Pure streak and ledger transformations.
pub mod core;
/// Local persistence abstraction and SQLite implementation.
pub mod persist;
/// Learner profile record and settings.
pub mod profile;
/// Local-then-remote synchronization.
pub mod sync;
/// Session-level progress tracker.
pub mod tracker;
/// Shared primitive types and date helpers.
pub mod types;
