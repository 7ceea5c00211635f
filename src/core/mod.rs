//! Pure progress transformations over [`crate::profile::UserProfile`].

/// Lesson/quiz recording and derived statistics.
pub mod ledger;
/// Study-day streak bookkeeping.
pub mod streak;
