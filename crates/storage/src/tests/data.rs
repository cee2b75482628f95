use chrono::{DateTime, TimeZone, Utc};
use fitlog_domain as domain;

pub static TRAINING_SESSIONS: std::sync::LazyLock<Vec<domain::TrainingSession>> =
    std::sync::LazyLock::new(|| vec![TRAINING_SESSION.clone(), TRAINING_SESSION_2.clone()]);

pub static TRAINING_SESSION: std::sync::LazyLock<domain::TrainingSession> =
    std::sync::LazyLock::new(|| domain::TrainingSession {
        id: 1.into(),
        date: date(2024, 3, 4, 17),
        body_part: String::from("Legs"),
        duration: 45,
        start_time: Some(date(2024, 3, 4, 17)),
        exercises: vec![
            exercise(1, 1, "Squat", &[(1, 80.0, 5), (2, 90.0, 3), (3, 100.0, 1)]),
            exercise(2, 1, "Lunge", &[(4, 20.5, 12)]),
        ],
    });

pub static TRAINING_SESSION_2: std::sync::LazyLock<domain::TrainingSession> =
    std::sync::LazyLock::new(|| domain::TrainingSession {
        id: 2.into(),
        date: date(2024, 3, 6, 7),
        body_part: String::from("Chest"),
        duration: 0,
        start_time: None,
        exercises: vec![exercise(3, 2, "Bench Press", &[(5, 60.0, 8)])],
    });

fn date(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 30, 0).unwrap()
}

fn exercise(id: u128, session_id: u128, name: &str, sets: &[(u128, f64, u32)]) -> domain::Exercise {
    domain::Exercise {
        id: id.into(),
        session_id: session_id.into(),
        name: name.to_string(),
        sets: sets
            .iter()
            .map(|(set_id, weight, reps)| domain::ExerciseSet {
                id: (*set_id).into(),
                exercise_id: id.into(),
                weight: domain::Weight::new(*weight).unwrap(),
                reps: domain::Reps::new(*reps),
            })
            .collect(),
    }
}
