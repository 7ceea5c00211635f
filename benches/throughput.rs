use chrono::{DateTime, Days, NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use studylog::{
    activity::QuizCompletion,
    config::ProgressConfig,
    core::{
        ledger::{complete_lesson, complete_quiz, level_progress, quiz_accuracy},
        streak::record_study,
    },
    profile::UserProfile,
};

fn fresh() -> UserProfile {
    UserProfile::guest("en", DateTime::<Utc>::UNIX_EPOCH)
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn bench_daily_study(c: &mut Criterion) {
    c.bench_function("record_study_3650_days", |b| {
        b.iter(|| {
            let mut p = fresh();
            for d in 0..3_650u64 {
                p = record_study(p, start() + Days::new(d));
            }
            p
        });
    });
}

fn bench_lessons(c: &mut Criterion) {
    let cfg = ProgressConfig::default();
    c.bench_function("complete_lesson_2k", |b| {
        b.iter(|| {
            let mut p = fresh();
            for i in 0..2_000u32 {
                p = complete_lesson(p, format!("lesson-{}", i % 500), &cfg);
            }
            p
        });
    });
}

fn bench_read_side(c: &mut Criterion) {
    let cfg = ProgressConfig::default();
    let mut group = c.benchmark_group("read_side");

    for n in [10usize, 100usize, 1000usize] {
        let mut p = fresh();
        for i in 0..n {
            let q = QuizCompletion::from_answers(format!("quiz-{i}"), (i % 11) as u32, 10, &cfg);
            p = complete_quiz(p, &q, DateTime::<Utc>::UNIX_EPOCH);
        }
        group.bench_with_input(BenchmarkId::new("quiz_accuracy", n), &p, |b, p| {
            b.iter(|| quiz_accuracy(p));
        });
        group.bench_with_input(BenchmarkId::new("level_progress", n), &p, |b, p| {
            b.iter(|| level_progress(p, &cfg.levels));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_daily_study, bench_lessons, bench_read_side);
criterion_main!(benches);
