use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use tokio::sync::watch;

use crate::{
    CreateError, DeleteError, Exercise, ExerciseID, Reps, SetID, TrainingSession,
    TrainingSessionID, TrainingSessionRepository, UpdateError, Weight, WeightRange, statistics,
};

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            error!("failed to {} {}: {err}", $action, $entity);
        }
        result
    }};
}

/// The training sessions of the user, kept in memory and synchronized with a repository.
///
/// Sessions are always ordered by date, newest first. Every command changes the in-memory
/// collection first and persists the change afterwards. A failed write is logged and returned,
/// but the in-memory change is kept.
pub struct TrainingLog<R> {
    repository: R,
    sessions: Vec<TrainingSession>,
    snapshot: watch::Sender<Vec<TrainingSession>>,
}

impl<R: TrainingSessionRepository> TrainingLog<R> {
    /// Load all sessions from the repository.
    ///
    /// If the sessions cannot be read, the log starts empty.
    pub async fn load(repository: R) -> Self {
        let sessions = match repository.read_training_sessions().await {
            Ok(sessions) => sessions,
            Err(err) => {
                error!("failed to read training sessions: {err}");
                vec![]
            }
        };
        let (snapshot, _) = watch::channel(vec![]);
        let mut training_log = Self {
            repository,
            sessions,
            snapshot,
        };
        for session in &mut training_log.sessions {
            session.relink();
        }
        training_log.sort_and_publish();
        training_log
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub fn sessions(&self) -> &[TrainingSession] {
        &self.sessions
    }

    #[must_use]
    pub fn session(&self, id: TrainingSessionID) -> Option<&TrainingSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Observe the session list. The receiver always holds the state after the latest command.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<TrainingSession>> {
        self.snapshot.subscribe()
    }

    /// Add a new session.
    ///
    /// A session whose ID is already present is rejected with `CreateError::Conflict` and the log
    /// stays unchanged.
    pub async fn add_session(&mut self, mut session: TrainingSession) -> Result<(), CreateError> {
        if self.session(session.id).is_some() {
            warn!("failed to create training session {}: already exists", session.id);
            return Err(CreateError::Conflict);
        }
        session.relink();
        self.sessions.push(session.clone());
        self.sort_and_publish();
        log_on_error!(
            self.repository.create_training_session(&session),
            "create",
            "training session"
        )
    }

    /// Replace the stored session with the same ID.
    ///
    /// Nothing happens if no such session exists.
    pub async fn update_session(
        &mut self,
        mut session: TrainingSession,
    ) -> Result<(), UpdateError> {
        let Some(entry) = self.sessions.iter_mut().find(|s| s.id == session.id) else {
            warn!("failed to replace training session {}: not found", session.id);
            return Ok(());
        };
        session.relink();
        entry.clone_from(&session);
        self.sort_and_publish();
        log_on_error!(
            self.repository.replace_training_session(&session),
            "replace",
            "training session"
        )
    }

    /// Remove the session with all its exercises and sets.
    ///
    /// Nothing happens if no such session exists.
    pub async fn delete_session(&mut self, id: TrainingSessionID) -> Result<(), DeleteError> {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            debug!("training session {id} already deleted");
            return Ok(());
        };
        self.sessions.remove(index);
        self.publish();
        let result = log_on_error!(
            self.repository.delete_training_session(id),
            "delete",
            "training session"
        );
        result.map(|_| ())
    }

    pub async fn add_exercise(
        &mut self,
        session_id: TrainingSessionID,
        name: &str,
    ) -> Result<Option<ExerciseID>, UpdateError> {
        self.modify_session(session_id, |s| Some(s.add_exercise(name)))
            .await
    }

    pub async fn remove_exercise(
        &mut self,
        session_id: TrainingSessionID,
        exercise_id: ExerciseID,
    ) -> Result<Option<Exercise>, UpdateError> {
        self.modify_session(session_id, |s| s.remove_exercise(exercise_id))
            .await
    }

    pub async fn rename_exercise(
        &mut self,
        session_id: TrainingSessionID,
        exercise_id: ExerciseID,
        name: &str,
    ) -> Result<Option<()>, UpdateError> {
        self.modify_session(session_id, |s| {
            s.exercise_mut(exercise_id).map(|e| e.rename(name))
        })
        .await
    }

    pub async fn add_set(
        &mut self,
        session_id: TrainingSessionID,
        exercise_id: ExerciseID,
        weight: Weight,
        reps: Reps,
    ) -> Result<Option<SetID>, UpdateError> {
        self.modify_session(session_id, |s| {
            s.exercise_mut(exercise_id).map(|e| e.add_set(weight, reps))
        })
        .await
    }

    pub async fn remove_set(
        &mut self,
        session_id: TrainingSessionID,
        exercise_id: ExerciseID,
        set_id: SetID,
    ) -> Result<Option<()>, UpdateError> {
        self.modify_session(session_id, |s| {
            s.exercise_mut(exercise_id)
                .and_then(|e| e.remove_set(set_id))
                .map(|_| ())
        })
        .await
    }

    /// Add the time spent since the last checkpoint to the duration of the session.
    ///
    /// Returns the new duration in minutes.
    pub async fn finish_exercise(
        &mut self,
        session_id: TrainingSessionID,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, UpdateError> {
        self.modify_session(session_id, |s| {
            s.accumulate_duration(now);
            Some(s.duration)
        })
        .await
    }

    /// Apply `change` to a copy of the session and store the result.
    ///
    /// If the session does not exist or `change` returns `None`, nothing is stored.
    async fn modify_session<T>(
        &mut self,
        id: TrainingSessionID,
        change: impl FnOnce(&mut TrainingSession) -> Option<T>,
    ) -> Result<Option<T>, UpdateError> {
        let Some(mut session) = self.session(id).cloned() else {
            warn!("failed to modify training session {id}: not found");
            return Ok(None);
        };
        let Some(result) = change(&mut session) else {
            return Ok(None);
        };
        self.update_session(session).await?;
        Ok(Some(result))
    }

    /// Distinct body parts of all sessions in lexicographical order.
    #[must_use]
    pub fn history_body_parts(&self) -> Vec<String> {
        self.sessions
            .iter()
            .map(|s| s.body_part.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct names of the exercises performed in sessions for the given body part.
    #[must_use]
    pub fn history_exercise_names(&self, body_part: &str) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|s| s.body_part == body_part)
            .flat_map(|s| s.exercises.iter().map(|e| e.name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Weight range of the most recent performance of the given exercise with at least one set.
    #[must_use]
    pub fn last_weight_range(&self, exercise_name: &str) -> Option<WeightRange> {
        self.sessions.iter().find_map(|s| {
            s.exercises
                .iter()
                .filter(|e| e.name == exercise_name)
                .find_map(Exercise::weight_range)
        })
    }

    #[must_use]
    pub fn total_training_days(&self) -> usize {
        statistics::total_training_days(&self.sessions)
    }

    #[must_use]
    pub fn total_exercise_count(&self) -> usize {
        statistics::total_exercise_count(&self.sessions)
    }

    #[must_use]
    pub fn total_duration(&self) -> u64 {
        statistics::total_duration(&self.sessions)
    }

    #[must_use]
    pub fn volume_over_time_for_body_part(&self, body_part: &str) -> Vec<(DateTime<Utc>, f64)> {
        statistics::volume_over_time_for_body_part(&self.sessions, body_part)
    }

    #[must_use]
    pub fn volume_over_time_for_exercise(
        &self,
        exercise_name: &str,
    ) -> Vec<(DateTime<Utc>, f64)> {
        statistics::volume_over_time_for_exercise(&self.sessions, exercise_name)
    }

    fn sort_and_publish(&mut self) {
        self.sessions.sort_by(|a, b| b.date.cmp(&a.date));
        self.publish();
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.sessions.clone());
    }
}
