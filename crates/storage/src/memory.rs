use std::{cell::RefCell, collections::BTreeMap};

use fitlog_domain as domain;

/// Training sessions kept in memory only, for previews and tests.
#[derive(Default)]
pub struct MemoryRepository {
    training_sessions: RefCell<BTreeMap<domain::TrainingSessionID, domain::TrainingSession>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new(training_sessions: &[domain::TrainingSession]) -> Self {
        Self {
            training_sessions: RefCell::new(
                training_sessions
                    .iter()
                    .map(|s| (s.id, s.clone()))
                    .collect(),
            ),
        }
    }
}

impl domain::TrainingSessionRepository for MemoryRepository {
    async fn read_training_sessions(
        &self,
    ) -> Result<Vec<domain::TrainingSession>, domain::ReadError> {
        let mut training_sessions = self
            .training_sessions
            .borrow()
            .values()
            .cloned()
            .collect::<Vec<_>>();
        training_sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(training_sessions)
    }

    async fn create_training_session(
        &self,
        training_session: &domain::TrainingSession,
    ) -> Result<(), domain::CreateError> {
        let mut training_sessions = self.training_sessions.borrow_mut();
        if training_sessions.contains_key(&training_session.id) {
            return Err(domain::CreateError::Conflict);
        }
        training_sessions.insert(training_session.id, training_session.clone());
        Ok(())
    }

    async fn replace_training_session(
        &self,
        training_session: &domain::TrainingSession,
    ) -> Result<(), domain::UpdateError> {
        self.training_sessions
            .borrow_mut()
            .insert(training_session.id, training_session.clone());
        Ok(())
    }

    async fn delete_training_session(
        &self,
        id: domain::TrainingSessionID,
    ) -> Result<domain::TrainingSessionID, domain::DeleteError> {
        self.training_sessions.borrow_mut().remove(&id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use domain::TrainingSessionRepository;
    use pretty_assertions::assert_eq;

    use crate::tests::data::{TRAINING_SESSION, TRAINING_SESSION_2, TRAINING_SESSIONS};

    use super::*;

    #[tokio::test]
    async fn test_read_training_sessions() {
        let repository = MemoryRepository::new(&TRAINING_SESSIONS);

        assert_eq!(
            repository.read_training_sessions().await.unwrap(),
            vec![TRAINING_SESSION_2.clone(), TRAINING_SESSION.clone()]
        );
    }

    #[tokio::test]
    async fn test_create_training_session() {
        let repository = MemoryRepository::default();

        repository
            .create_training_session(&TRAINING_SESSION)
            .await
            .unwrap();

        assert_eq!(
            repository.read_training_sessions().await.unwrap(),
            vec![TRAINING_SESSION.clone()]
        );
        assert!(matches!(
            repository.create_training_session(&TRAINING_SESSION).await,
            Err(domain::CreateError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_replace_training_session() {
        let repository = MemoryRepository::new(&TRAINING_SESSIONS);
        let mut session = TRAINING_SESSION.clone();
        session.body_part = String::from("Back");

        repository.replace_training_session(&session).await.unwrap();

        assert_eq!(
            repository.read_training_sessions().await.unwrap(),
            vec![TRAINING_SESSION_2.clone(), session]
        );
    }

    #[tokio::test]
    async fn test_delete_training_session() {
        let repository = MemoryRepository::new(&TRAINING_SESSIONS);

        assert_eq!(
            repository
                .delete_training_session(TRAINING_SESSION_2.id)
                .await
                .unwrap(),
            TRAINING_SESSION_2.id
        );
        assert_eq!(
            repository.read_training_sessions().await.unwrap(),
            vec![TRAINING_SESSION.clone()]
        );
    }
}
