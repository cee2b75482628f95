use chrono::{DateTime, Utc};

use crate::{CreateError, DeleteError, Exercise, ExerciseID, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait TrainingSessionRepository {
    async fn read_training_sessions(&self) -> Result<Vec<TrainingSession>, ReadError>;
    async fn create_training_session(
        &self,
        training_session: &TrainingSession,
    ) -> Result<(), CreateError>;
    async fn replace_training_session(
        &self,
        training_session: &TrainingSession,
    ) -> Result<(), UpdateError>;
    async fn delete_training_session(
        &self,
        id: TrainingSessionID,
    ) -> Result<TrainingSessionID, DeleteError>;
}

uuid_id!(TrainingSessionID);

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSession {
    pub id: TrainingSessionID,
    pub date: DateTime<Utc>,
    pub body_part: String,
    /// Minutes spent training.
    pub duration: u32,
    /// Last checkpoint from which further training time is accumulated.
    pub start_time: Option<DateTime<Utc>>,
    pub exercises: Vec<Exercise>,
}

impl TrainingSession {
    #[must_use]
    pub fn new(date: DateTime<Utc>, body_part: &str) -> Self {
        Self {
            id: TrainingSessionID::random(),
            date,
            body_part: body_part.to_string(),
            duration: 0,
            start_time: Some(date),
            exercises: vec![],
        }
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::volume).sum()
    }

    /// Set the duration in minutes, clamping negative values to zero.
    pub fn set_duration(&mut self, minutes: i64) {
        self.duration = u32::try_from(minutes.max(0)).unwrap_or(u32::MAX);
    }

    /// Add the whole minutes elapsed since the last checkpoint and start a new checkpoint at `now`.
    pub fn accumulate_duration(&mut self, now: DateTime<Utc>) {
        if let Some(start_time) = self.start_time {
            let elapsed = (now - start_time).num_minutes().max(0);
            self.set_duration(i64::from(self.duration) + elapsed);
        }
        self.start_time = Some(now);
    }

    pub fn reset_duration(&mut self) {
        self.duration = 0;
        self.start_time = Some(self.date);
    }

    pub fn add_exercise(&mut self, name: &str) -> ExerciseID {
        let exercise = Exercise::new(self.id, name);
        let id = exercise.id;
        self.exercises.push(exercise);
        id
    }

    pub fn remove_exercise(&mut self, id: ExerciseID) -> Option<Exercise> {
        let index = self.exercises.iter().position(|e| e.id == id)?;
        Some(self.exercises.remove(index))
    }

    #[must_use]
    pub fn exercise(&self, id: ExerciseID) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn exercise_mut(&mut self, id: ExerciseID) -> Option<&mut Exercise> {
        self.exercises.iter_mut().find(|e| e.id == id)
    }

    /// Point the back-references of all nested exercises and sets at their actual owners.
    pub(crate) fn relink(&mut self) {
        for exercise in &mut self.exercises {
            exercise.relink(self.id);
        }
    }
}
