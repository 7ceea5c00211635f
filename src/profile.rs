//! Learner profile record, settings, and sparse settings patch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LessonId, QuizId, Score, UserId, Xp};

/// Display name given to guest profiles.
pub const GUEST_DISPLAY_NAME: &str = "Guest";

/// One recorded quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Quiz that was taken.
    pub quiz_id: QuizId,
    /// Score in percent.
    pub score: Score,
    /// Completion instant.
    pub completed_at: DateTime<Utc>,
}

/// Per-user app preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Daily reminder notifications enabled.
    pub notifications: bool,
    /// Reminder time as `HH:MM`.
    pub reminder_time: String,
    /// Sound effects enabled.
    pub sound_enabled: bool,
    /// Pronunciation audio plays automatically.
    pub auto_play_audio: bool,
    /// Dark theme enabled.
    pub dark_mode: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            reminder_time: "18:00".to_string(),
            sound_enabled: true,
            auto_play_audio: true,
            dark_mode: false,
        }
    }
}

/// Canonical learner progress record.
///
/// Ledger and streak functions take this by value and hand back the updated
/// copy; whoever holds the session owns persisting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth uid, or `guest_<uuid>` for guests.
    pub uid: UserId,
    /// Account email; empty for guests.
    pub email: String,
    /// Name shown in the UI.
    pub display_name: String,
    /// Language the learner reads instructions in.
    pub native_language: String,
    /// Guest profiles never sync remotely.
    pub is_guest: bool,

    /// Current content level, starting at 1.
    pub current_level: u32,
    /// Consecutive study days ending at `last_study_date`.
    pub current_streak: u32,
    /// Best streak ever reached.
    pub longest_streak: u32,
    /// Distinct days with at least one study event.
    pub total_study_days: u32,
    /// Accumulated experience.
    #[serde(rename = "totalXP")]
    pub total_xp: Xp,

    /// Last study day; `None` when the learner never studied.
    #[serde(with = "crate::types::study_date", default)]
    pub last_study_date: Option<NaiveDate>,
    /// Completed lessons, each id at most once.
    pub lessons_completed: Vec<LessonId>,
    /// Every quiz attempt in completion order.
    pub quiz_results: Vec<QuizResult>,

    /// Profile creation instant.
    pub created_at: DateTime<Utc>,
    /// App preferences.
    pub settings: UserSettings,
}

impl UserProfile {
    /// Fresh guest profile with zeroed counters.
    pub fn guest(language: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            uid: format!("guest_{}", uuid::Uuid::new_v4().simple()),
            email: String::new(),
            display_name: GUEST_DISPLAY_NAME.to_string(),
            native_language: language.into(),
            is_guest: true,
            current_level: 1,
            current_streak: 0,
            longest_streak: 0,
            total_study_days: 0,
            total_xp: 0,
            last_study_date: None,
            lessons_completed: Vec::new(),
            quiz_results: Vec::new(),
            created_at,
            settings: UserSettings::default(),
        }
    }

    /// Fresh signed-up profile; the display name is the email's local part.
    pub fn member(
        uid: impl Into<UserId>,
        email: impl Into<String>,
        language: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let email = email.into();
        let display_name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            uid: uid.into(),
            display_name,
            email,
            is_guest: false,
            ..Self::guest(language, created_at)
        }
    }

    /// True when `lesson_id` was already completed.
    pub fn has_completed(&self, lesson_id: &str) -> bool {
        self.lessons_completed.iter().any(|id| id == lesson_id)
    }
}

/// Sparse settings update where each `Some` field overwrites the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    /// Optional replacement for the notifications toggle.
    pub notifications: Option<bool>,
    /// Optional replacement for the reminder time.
    pub reminder_time: Option<String>,
    /// Optional replacement for the sound toggle.
    pub sound_enabled: Option<bool>,
    /// Optional replacement for the autoplay toggle.
    pub auto_play_audio: Option<bool>,
    /// Optional replacement for the dark-mode toggle.
    pub dark_mode: Option<bool>,
}

impl SettingsPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `settings`.
    pub fn apply_to(&self, settings: &mut UserSettings) {
        if let Some(v) = self.notifications {
            settings.notifications = v;
        }
        if let Some(v) = &self.reminder_time {
            settings.reminder_time = v.clone();
        }
        if let Some(v) = self.sound_enabled {
            settings.sound_enabled = v;
        }
        if let Some(v) = self.auto_play_audio {
            settings.auto_play_audio = v;
        }
        if let Some(v) = self.dark_mode {
            settings.dark_mode = v;
        }
    }
}
