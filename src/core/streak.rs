use chrono::NaiveDate;

use crate::profile::UserProfile;

/// Calendar day before `today`, or `None` at the start of the calendar.
pub fn yesterday(today: NaiveDate) -> Option<NaiveDate> {
    today.pred_opt()
}

/// Records that the learner studied on `today`.
///
/// A second call for the same day is a no-op. Studying the day after the last
/// study day extends the streak; any other gap (or a first-ever session)
/// restarts it at 1.
pub fn record_study(mut profile: UserProfile, today: NaiveDate) -> UserProfile {
    if profile.last_study_date == Some(today) {
        return profile;
    }

    if profile.last_study_date.is_some() && profile.last_study_date == yesterday(today) {
        profile.current_streak = profile.current_streak.saturating_add(1);
    } else {
        profile.current_streak = 1;
    }

    profile.longest_streak = profile.longest_streak.max(profile.current_streak);
    profile.last_study_date = Some(today);
    profile.total_study_days = profile.total_study_days.saturating_add(1);
    profile
}

/// Badge bucket for a streak length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreakTier {
    /// No active streak.
    Dormant,
    /// 1 to 6 days.
    Spark,
    /// 7 to 29 days.
    Fire,
    /// 30 to 99 days.
    Star,
    /// 100 days or more.
    Trophy,
}

impl StreakTier {
    /// Buckets `streak`.
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            0 => Self::Dormant,
            1..=6 => Self::Spark,
            7..=29 => Self::Fire,
            30..=99 => Self::Star,
            _ => Self::Trophy,
        }
    }
}
