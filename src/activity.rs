//! Learning activities and the remote progress deltas built from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::ProgressConfig,
    types::{InputError, LessonId, QuizId, Score, UserId, Xp},
};

/// Version number for serialized [`ProgressDelta`] payloads.
pub const DELTA_FORMAT_VERSION: u16 = 1;

/// Outcome of a finished quiz as reported by the quiz screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCompletion {
    /// Quiz that was taken.
    pub quiz_id: QuizId,
    /// Score in percent.
    pub score: Score,
    /// Whether the score met the passing mark.
    pub passed: bool,
    /// XP granted for this attempt.
    pub xp_earned: Xp,
}

impl QuizCompletion {
    /// Builds a completion, rejecting scores above 100.
    pub fn new(
        quiz_id: impl Into<QuizId>,
        score: Score,
        passed: bool,
        xp_earned: Xp,
    ) -> Result<Self, InputError> {
        if score > 100 {
            return Err(InputError::ScoreOutOfRange(score));
        }
        Ok(Self {
            quiz_id: quiz_id.into(),
            score,
            passed,
            xp_earned,
        })
    }

    /// Scores a quiz from its answer tally.
    ///
    /// An empty quiz scores 0. XP is granted per correct answer regardless of
    /// whether the attempt passed.
    pub fn from_answers(
        quiz_id: impl Into<QuizId>,
        correct: u32,
        total: u32,
        config: &ProgressConfig,
    ) -> Self {
        let correct = correct.min(total);
        let score = if total == 0 {
            0
        } else {
            let (c, t) = (u64::from(correct), u64::from(total));
            ((200 * c + t) / (2 * t)) as Score
        };
        Self {
            quiz_id: quiz_id.into(),
            score,
            passed: score >= config.passing_score,
            xp_earned: correct.saturating_mul(config.quiz_xp_per_correct),
        }
    }
}

/// A learning event handed to the sync layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Activity {
    /// A lesson was finished.
    Lesson {
        /// Finished lesson.
        lesson_id: LessonId,
    },
    /// A quiz was finished.
    Quiz {
        /// Quiz outcome.
        completion: QuizCompletion,
    },
}

/// History entry carried by a [`ProgressDelta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DeltaEntry {
    /// Lesson id to union into the day's completed set.
    Lesson {
        /// Finished lesson.
        lesson_id: LessonId,
    },
    /// Quiz attempt to append to the day's log.
    Quiz {
        /// Quiz that was taken.
        quiz_id: QuizId,
        /// Score in percent.
        score: Score,
        /// Whether the attempt passed.
        passed: bool,
        /// Attempt instant.
        timestamp: DateTime<Utc>,
    },
}

/// Incremental, merge-style update for one user's per-day remote document.
///
/// The user id and date are captured when the delta is built so a sign-out
/// racing the upload cannot redirect it to another account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDelta {
    /// Payload format version.
    pub format_version: u16,
    /// Owner of the document.
    pub user_id: UserId,
    /// Document day key.
    pub date: NaiveDate,
    /// XP to add to the day's total.
    pub xp_earned: Xp,
    /// Upload instant.
    pub updated_at: DateTime<Utc>,
    /// History entry to merge.
    pub entry: DeltaEntry,
}

impl ProgressDelta {
    /// Builds the delta for `activity` on behalf of `user_id`.
    ///
    /// `xp_earned` is the XP the local ledger actually granted, so a repeated
    /// lesson mirrors 0 XP.
    pub fn new(
        user_id: UserId,
        activity: &Activity,
        xp_earned: Xp,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        let entry = match activity {
            Activity::Lesson { lesson_id } => DeltaEntry::Lesson {
                lesson_id: lesson_id.clone(),
            },
            Activity::Quiz { completion } => DeltaEntry::Quiz {
                quiz_id: completion.quiz_id.clone(),
                score: completion.score,
                passed: completion.passed,
                timestamp: now,
            },
        };
        Self {
            format_version: DELTA_FORMAT_VERSION,
            user_id,
            date,
            xp_earned,
            updated_at: now,
            entry,
        }
    }
}
