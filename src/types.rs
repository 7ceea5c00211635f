//! Shared primitive IDs, counters, and calendar-date helpers.

use chrono::NaiveDate;
use thiserror::Error;

/// Opaque user identifier (auth provider uid or `guest_<uuid>`).
pub type UserId = String;
/// Lesson identifier supplied by the content layer.
pub type LessonId = String;
/// Quiz identifier supplied by the content layer.
pub type QuizId = String;
/// Experience points.
pub type Xp = u32;
/// Quiz score in percent, `0..=100`.
pub type Score = u32;

/// Wire format of study dates.
pub const STUDY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Caller contract violations caught at the parsing boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Date string not in `YYYY-MM-DD` form.
    #[error("malformed study date: {0:?}")]
    MalformedDate(String),
    /// Score outside `0..=100`.
    #[error("score {0} outside 0..=100")]
    ScoreOutOfRange(u32),
}

/// Parses a `YYYY-MM-DD` string handed over by a clock or storage collaborator.
pub fn parse_study_date(raw: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(raw, STUDY_DATE_FORMAT)
        .map_err(|_| InputError::MalformedDate(raw.to_string()))
}

/// Formats a date the way it is persisted and keyed remotely.
pub fn format_study_date(date: NaiveDate) -> String {
    date.format(STUDY_DATE_FORMAT).to_string()
}

/// Serde adapter for `Option<NaiveDate>` using `""` as the never-studied sentinel.
pub mod study_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Serializes `None` as `""` and `Some(d)` as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&super::format_study_date(*date)),
            None => s.serialize_str(""),
        }
    }

    /// Accepts `""` (or a missing/null value) as `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.is_empty() {
            return Ok(None);
        }
        super::parse_study_date(&raw)
            .map(Some)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_iso_dates() {
        let d = parse_study_date("2024-01-10").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(format_study_date(d), "2024-01-10");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(
            parse_study_date("10/01/2024"),
            Err(InputError::MalformedDate("10/01/2024".to_string()))
        );
        assert!(parse_study_date("").is_err());
    }
}
