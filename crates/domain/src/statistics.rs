use std::collections::BTreeSet;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{Exercise, TrainingSession};

/// Number of distinct calendar days in the local time zone on which a session took place.
#[must_use]
pub fn total_training_days(sessions: &[TrainingSession]) -> usize {
    total_training_days_in(sessions, &Local)
}

/// Number of distinct calendar days in the given time zone on which a session took place.
#[must_use]
pub fn total_training_days_in<Tz: TimeZone>(sessions: &[TrainingSession], tz: &Tz) -> usize {
    sessions
        .iter()
        .map(|s| s.date.with_timezone(tz).date_naive())
        .collect::<BTreeSet<_>>()
        .len()
}

#[must_use]
pub fn session_count(sessions: &[TrainingSession]) -> usize {
    sessions.len()
}

#[must_use]
pub fn total_exercise_count(sessions: &[TrainingSession]) -> usize {
    sessions.iter().map(|s| s.exercises.len()).sum()
}

/// Total training time in minutes.
#[must_use]
pub fn total_duration(sessions: &[TrainingSession]) -> u64 {
    sessions.iter().map(|s| u64::from(s.duration)).sum()
}

/// Calculate the volume of every session for the given body part.
///
/// Each matching session results in exactly one point, also if its volume is zero. Sessions on
/// the same date are not merged. The result is ordered by date, oldest first.
#[must_use]
pub fn volume_over_time_for_body_part(
    sessions: &[TrainingSession],
    body_part: &str,
) -> Vec<(DateTime<Utc>, f64)> {
    let mut result = sessions
        .iter()
        .filter(|s| s.body_part == body_part)
        .map(|s| (s.date, s.volume()))
        .collect::<Vec<_>>();
    result.sort_by_key(|(date, _)| *date);
    result
}

/// Calculate the volume of the given exercise in every session.
///
/// The volume of all exercises with exactly the given name is summed up per session. Sessions
/// in which this volume is zero are omitted. The result is ordered by date, oldest first.
#[must_use]
pub fn volume_over_time_for_exercise(
    sessions: &[TrainingSession],
    exercise_name: &str,
) -> Vec<(DateTime<Utc>, f64)> {
    let mut result = sessions
        .iter()
        .filter_map(|s| {
            let volume = s
                .exercises
                .iter()
                .filter(|e| e.name == exercise_name)
                .map(Exercise::volume)
                .sum::<f64>();
            if volume > 0.0 {
                Some((s.date, volume))
            } else {
                None
            }
        })
        .collect::<Vec<_>>();
    result.sort_by_key(|(date, _)| *date);
    result
}
