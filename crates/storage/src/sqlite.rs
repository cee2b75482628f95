use std::{collections::HashMap, path::Path, str::FromStr};

use chrono::{DateTime, Utc};
use fitlog_domain as domain;
use log::debug;
use sqlx::{
    SqliteConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use uuid::Uuid;

/// Training sessions stored in an embedded SQLite database.
///
/// Sessions, exercises and sets are kept in separate tables linked by foreign keys. Deleting a
/// session cascades to its exercises and their sets.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open the database file at `path`, creating it and its tables if necessary.
    pub async fn open(path: &Path) -> Result<Self, domain::StorageError> {
        debug!("opening database {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SqliteError::from)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        Ok(Self::connect(options, 4).await?)
    }

    /// Open a database which only lives as long as the repository.
    pub async fn in_memory() -> Result<Self, domain::StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(SqliteError::from)?
            .foreign_keys(true);

        // Every connection to an in-memory database sees its own database.
        Ok(Self::connect(options, 1).await?)
    }

    async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, SqliteError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.initialize_tables().await?;

        Ok(repository)
    }

    async fn initialize_tables(&self) -> Result<(), SqliteError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_sessions (
                id TEXT PRIMARY KEY NOT NULL,
                date TEXT NOT NULL,
                body_part TEXT NOT NULL,
                duration INTEGER NOT NULL,
                start_time TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY NOT NULL,
                session_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES training_sessions(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercise_sets (
                id TEXT PRIMARY KEY NOT NULL,
                exercise_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                FOREIGN KEY (exercise_id) REFERENCES exercises(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_exercises_session_id ON exercises(session_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exercise_sets_exercise_id ON exercise_sets(exercise_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<domain::TrainingSession>, SqliteError> {
        let session_rows: Vec<TrainingSessionRow> = sqlx::query_as(
            "SELECT id, date, body_part, duration, start_time FROM training_sessions ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        let exercise_rows: Vec<ExerciseRow> = sqlx::query_as(
            "SELECT id, session_id, name FROM exercises ORDER BY session_id, position",
        )
        .fetch_all(&self.pool)
        .await?;
        let set_rows: Vec<ExerciseSetRow> = sqlx::query_as(
            "SELECT id, exercise_id, weight, reps FROM exercise_sets ORDER BY exercise_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sets: HashMap<domain::ExerciseID, Vec<domain::ExerciseSet>> = HashMap::new();
        for row in set_rows {
            let set = domain::ExerciseSet::try_from(row)?;
            sets.entry(set.exercise_id).or_default().push(set);
        }

        let mut exercises: HashMap<domain::TrainingSessionID, Vec<domain::Exercise>> =
            HashMap::new();
        for row in exercise_rows {
            let mut exercise = domain::Exercise::try_from(row)?;
            exercise.sets = sets.remove(&exercise.id).unwrap_or_default();
            exercises
                .entry(exercise.session_id)
                .or_default()
                .push(exercise);
        }

        session_rows
            .into_iter()
            .map(|row| {
                let mut session = domain::TrainingSession::try_from(row)?;
                session.exercises = exercises.remove(&session.id).unwrap_or_default();
                Ok(session)
            })
            .collect()
    }

    async fn exists(
        connection: &mut SqliteConnection,
        id: domain::TrainingSessionID,
    ) -> Result<bool, SqliteError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM training_sessions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *connection)
            .await?;
        Ok(row.is_some())
    }

    async fn insert(
        connection: &mut SqliteConnection,
        session: &domain::TrainingSession,
    ) -> Result<(), SqliteError> {
        sqlx::query(
            r"
            INSERT INTO training_sessions (id, date, body_part, duration, start_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(session.id.to_string())
        .bind(session.date)
        .bind(&session.body_part)
        .bind(i64::from(session.duration))
        .bind(session.start_time)
        .execute(&mut *connection)
        .await?;

        for (position, exercise) in (0_i64..).zip(&session.exercises) {
            sqlx::query(
                r"
                INSERT INTO exercises (id, session_id, position, name)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(exercise.id.to_string())
            .bind(session.id.to_string())
            .bind(position)
            .bind(&exercise.name)
            .execute(&mut *connection)
            .await?;

            for (position, set) in (0_i64..).zip(&exercise.sets) {
                sqlx::query(
                    r"
                    INSERT INTO exercise_sets (id, exercise_id, position, weight, reps)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ",
                )
                .bind(set.id.to_string())
                .bind(exercise.id.to_string())
                .bind(position)
                .bind(f64::from(set.weight))
                .bind(i64::from(u32::from(set.reps)))
                .execute(&mut *connection)
                .await?;
            }
        }

        Ok(())
    }

    async fn delete(
        connection: &mut SqliteConnection,
        id: domain::TrainingSessionID,
    ) -> Result<(), SqliteError> {
        sqlx::query("DELETE FROM training_sessions WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *connection)
            .await?;
        Ok(())
    }

    async fn create(&self, session: &domain::TrainingSession) -> Result<bool, SqliteError> {
        let mut transaction = self.pool.begin().await?;
        if Self::exists(&mut transaction, session.id).await? {
            return Ok(false);
        }
        Self::insert(&mut transaction, session).await?;
        transaction.commit().await?;
        Ok(true)
    }

    async fn replace(&self, session: &domain::TrainingSession) -> Result<(), SqliteError> {
        let mut transaction = self.pool.begin().await?;
        Self::delete(&mut transaction, session.id).await?;
        Self::insert(&mut transaction, session).await?;
        transaction.commit().await?;
        Ok(())
    }
}

impl domain::TrainingSessionRepository for SqliteRepository {
    async fn read_training_sessions(
        &self,
    ) -> Result<Vec<domain::TrainingSession>, domain::ReadError> {
        Ok(self.read_all().await.map_err(domain::StorageError::from)?)
    }

    async fn create_training_session(
        &self,
        training_session: &domain::TrainingSession,
    ) -> Result<(), domain::CreateError> {
        if self
            .create(training_session)
            .await
            .map_err(domain::StorageError::from)?
        {
            Ok(())
        } else {
            Err(domain::CreateError::Conflict)
        }
    }

    async fn replace_training_session(
        &self,
        training_session: &domain::TrainingSession,
    ) -> Result<(), domain::UpdateError> {
        Ok(self
            .replace(training_session)
            .await
            .map_err(domain::StorageError::from)?)
    }

    async fn delete_training_session(
        &self,
        id: domain::TrainingSessionID,
    ) -> Result<domain::TrainingSessionID, domain::DeleteError> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|err| domain::StorageError::from(SqliteError::from(err)))?;
        Self::delete(&mut connection, id)
            .await
            .map_err(domain::StorageError::from)?;
        Ok(id)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SqliteError {
    #[error("invalid {0}")]
    InvalidData(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<SqliteError> for domain::StorageError {
    fn from(value: SqliteError) -> Self {
        match value {
            SqliteError::InvalidData(message) => domain::StorageError::InvalidData(message),
            err => domain::StorageError::Other(Box::new(err)),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
struct TrainingSessionRow {
    id: String,
    date: DateTime<Utc>,
    body_part: String,
    duration: i64,
    start_time: Option<DateTime<Utc>>,
}

impl TryFrom<TrainingSessionRow> for domain::TrainingSession {
    type Error = SqliteError;

    fn try_from(value: TrainingSessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?.into(),
            date: value.date,
            body_part: value.body_part,
            duration: u32::try_from(value.duration)
                .map_err(|_| SqliteError::InvalidData(format!("duration {}", value.duration)))?,
            start_time: value.start_time,
            exercises: vec![],
        })
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
struct ExerciseRow {
    id: String,
    session_id: String,
    name: String,
}

impl TryFrom<ExerciseRow> for domain::Exercise {
    type Error = SqliteError;

    fn try_from(value: ExerciseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?.into(),
            session_id: parse_id(&value.session_id)?.into(),
            name: value.name,
            sets: vec![],
        })
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
struct ExerciseSetRow {
    id: String,
    exercise_id: String,
    weight: f64,
    reps: i64,
}

impl TryFrom<ExerciseSetRow> for domain::ExerciseSet {
    type Error = SqliteError;

    fn try_from(value: ExerciseSetRow) -> Result<Self, Self::Error> {
        let reps = u32::try_from(value.reps)
            .map(domain::Reps::from)
            .map_err(|_| SqliteError::InvalidData(format!("reps {}", value.reps)))?;
        Ok(Self {
            id: parse_id(&value.id)?.into(),
            exercise_id: parse_id(&value.exercise_id)?.into(),
            weight: domain::Weight::new(value.weight)
                .map_err(|err| SqliteError::InvalidData(format!("weight {}: {err}", value.weight)))?,
            reps,
        })
    }
}

fn parse_id(value: &str) -> Result<Uuid, SqliteError> {
    Uuid::parse_str(value).map_err(|err| SqliteError::InvalidData(format!("id {value}: {err}")))
}
