use chrono::{DateTime, Utc};

use crate::{
    activity::QuizCompletion,
    config::{LevelThresholds, ProgressConfig},
    profile::{QuizResult, UserProfile},
    types::{LessonId, Score, Xp},
};

/// Marks `lesson_id` completed and grants the lesson reward once.
///
/// Repeats are no-ops. Streak and study-day counters are left to
/// [`crate::core::streak::record_study`], which callers run afterwards.
pub fn complete_lesson(
    mut profile: UserProfile,
    lesson_id: impl Into<LessonId>,
    config: &ProgressConfig,
) -> UserProfile {
    let lesson_id = lesson_id.into();
    if profile.has_completed(&lesson_id) {
        return profile;
    }
    profile.lessons_completed.push(lesson_id);
    profile.total_xp = profile.total_xp.saturating_add(config.lesson_xp);
    profile
}

/// Appends a quiz attempt and grants its XP. Every attempt is kept.
pub fn complete_quiz(
    mut profile: UserProfile,
    completion: &QuizCompletion,
    completed_at: DateTime<Utc>,
) -> UserProfile {
    profile.quiz_results.push(QuizResult {
        quiz_id: completion.quiz_id.clone(),
        score: completion.score,
        completed_at,
    });
    profile.total_xp = profile.total_xp.saturating_add(completion.xp_earned);
    profile
}

/// Mean quiz score rounded half-up; 0 when no quiz was taken.
pub fn quiz_accuracy(profile: &UserProfile) -> u32 {
    let n = profile.quiz_results.len() as u64;
    if n == 0 {
        return 0;
    }
    let sum: u64 = profile.quiz_results.iter().map(|r| u64::from(r.score)).sum();
    ((2 * sum + n) / (2 * n)) as u32
}

/// Percent of the current level's interaction threshold reached, capped at 100.
pub fn level_progress(profile: &UserProfile, levels: &LevelThresholds) -> u32 {
    let interactions = (profile.lessons_completed.len() + profile.quiz_results.len()) as u64;
    let threshold = u64::from(levels.for_level(profile.current_level));
    let pct = (200 * interactions + threshold) / (2 * threshold);
    pct.min(100) as u32
}

/// Read-side summary for stats and profile screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStats {
    /// Name shown in the UI.
    pub display_name: String,
    /// Current content level.
    pub current_level: u32,
    /// Active streak in days.
    pub current_streak: u32,
    /// Best streak ever reached.
    pub longest_streak: u32,
    /// Distinct study days.
    pub total_study_days: u32,
    /// Accumulated experience.
    pub total_xp: Xp,
    /// Number of distinct completed lessons.
    pub lessons_completed: usize,
    /// Number of quiz attempts.
    pub quizzes_taken: usize,
    /// Mean quiz score in percent.
    pub quiz_accuracy: u32,
    /// Percent of the current level filled.
    pub level_progress: u32,
}

impl ProgressStats {
    /// Derives the summary; nothing here is stored on the profile.
    pub fn from_profile(profile: &UserProfile, config: &ProgressConfig) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            current_level: profile.current_level,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            total_study_days: profile.total_study_days,
            total_xp: profile.total_xp,
            lessons_completed: profile.lessons_completed.len(),
            quizzes_taken: profile.quiz_results.len(),
            quiz_accuracy: quiz_accuracy(profile),
            level_progress: level_progress(profile, &config.levels),
        }
    }
}

/// Result-screen bucket for a quiz score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizGrade {
    /// 100.
    Perfect,
    /// 90 to 99.
    Excellent,
    /// 80 to 89.
    Great,
    /// 70 to 79.
    Good,
    /// 50 to 69.
    NotBad,
    /// Below 50.
    KeepTrying,
}

impl QuizGrade {
    /// Buckets `score`.
    pub fn for_score(score: Score) -> Self {
        match score {
            100..=Score::MAX => Self::Perfect,
            90..=99 => Self::Excellent,
            80..=89 => Self::Great,
            70..=79 => Self::Good,
            50..=69 => Self::NotBad,
            _ => Self::KeepTrying,
        }
    }
}
