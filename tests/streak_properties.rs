use chrono::{DateTime, Days, NaiveDate, Utc};
use proptest::prelude::*;

use studylog::{
    activity::QuizCompletion,
    config::ProgressConfig,
    core::{
        ledger::{complete_lesson, complete_quiz, level_progress, quiz_accuracy},
        streak::{record_study, yesterday},
    },
    profile::UserProfile,
};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: u16) -> NaiveDate {
    base_date() + Days::new(u64::from(offset))
}

fn fresh() -> UserProfile {
    UserProfile::guest("en", DateTime::<Utc>::UNIX_EPOCH)
}

fn profile_strategy() -> impl Strategy<Value = UserProfile> {
    (
        proptest::option::of(0u16..400),
        0u32..50,
        0u32..50,
        0u32..300,
        0u32..10_000,
    )
        .prop_map(|(last, current, extra, days, xp)| {
            let mut p = fresh();
            p.last_study_date = last.map(day);
            p.current_streak = current;
            p.longest_streak = current + extra;
            p.total_study_days = days;
            p.total_xp = xp;
            p
        })
}

#[derive(Debug, Clone)]
enum Action {
    Study { gap: u8 },
    Lesson { idx: u8 },
    Quiz { score: u8, xp: u8 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..4).prop_map(|gap| Action::Study { gap }),
        (0u8..12).prop_map(|idx| Action::Lesson { idx }),
        (0u8..=100, 0u8..100).prop_map(|(score, xp)| Action::Quiz { score, xp }),
    ]
}

proptest! {
    #[test]
    fn same_day_study_is_idempotent(p in profile_strategy(), d in 0u16..400) {
        let today = day(d);
        let once = record_study(p.clone(), today);
        let twice = record_study(once.clone(), today);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn studying_the_next_day_extends_streak(p in profile_strategy(), d in 1u16..400) {
        let today = day(d);
        let mut p = p;
        p.last_study_date = yesterday(today);
        let after = record_study(p.clone(), today);
        prop_assert_eq!(after.current_streak, p.current_streak + 1);
        prop_assert_eq!(after.total_study_days, p.total_study_days + 1);
    }

    #[test]
    fn any_other_gap_resets_streak_to_one(p in profile_strategy(), d in 0u16..400) {
        let today = day(d);
        prop_assume!(p.last_study_date != Some(today));
        prop_assume!(p.last_study_date != yesterday(today));
        let after = record_study(p.clone(), today);
        prop_assert_eq!(after.current_streak, 1);
        prop_assert_eq!(after.last_study_date, Some(today));
        prop_assert!(after.longest_streak >= p.longest_streak);
    }

    #[test]
    fn random_sessions_preserve_counter_invariants(actions in prop::collection::vec(action_strategy(), 1..150)) {
        let cfg = ProgressConfig::default();
        let mut p = fresh();
        let mut today = base_date();
        let mut study_days = std::collections::BTreeSet::new();

        for action in actions {
            let before = p.clone();
            match action {
                Action::Study { gap } => {
                    today = today + Days::new(u64::from(gap));
                    p = record_study(p, today);
                    study_days.insert(today);
                }
                Action::Lesson { idx } => {
                    p = complete_lesson(p, format!("lesson-{idx}"), &cfg);
                }
                Action::Quiz { score, xp } => {
                    let completion = QuizCompletion::new("q", u32::from(score), score >= 60, u32::from(xp)).unwrap();
                    p = complete_quiz(p, &completion, DateTime::<Utc>::UNIX_EPOCH);
                }
            }

            prop_assert!(p.longest_streak >= p.current_streak);
            prop_assert!(p.longest_streak >= before.longest_streak);
            prop_assert!(p.total_xp >= before.total_xp);
            prop_assert_eq!(p.total_study_days as usize, study_days.len());

            let mut ids = p.lessons_completed.clone();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), p.lessons_completed.len());

            prop_assert!(level_progress(&p, &cfg.levels) <= 100);
            prop_assert!(quiz_accuracy(&p) <= 100);
        }
    }

    #[test]
    fn repeated_lesson_never_double_awards(p in profile_strategy(), idx in 0u8..20) {
        let cfg = ProgressConfig::default();
        let once = complete_lesson(p, format!("lesson-{idx}"), &cfg);
        let twice = complete_lesson(once.clone(), format!("lesson-{idx}"), &cfg);
        prop_assert_eq!(twice.total_xp, once.total_xp);
        prop_assert_eq!(twice.lessons_completed, once.lessons_completed);
    }
}
