use derive_more::{Display, Into};
use thiserror::Error;

use crate::TrainingSessionID;

uuid_id!(ExerciseID);
uuid_id!(SetID);

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub session_id: TrainingSessionID,
    pub name: String,
    pub sets: Vec<ExerciseSet>,
}

impl Exercise {
    #[must_use]
    pub fn new(session_id: TrainingSessionID, name: &str) -> Self {
        Self {
            id: ExerciseID::random(),
            session_id,
            name: name.to_string(),
            sets: vec![],
        }
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(ExerciseSet::volume).sum()
    }

    /// Lightest and heaviest weight of all sets, or `None` if no set has been recorded yet.
    #[must_use]
    pub fn weight_range(&self) -> Option<WeightRange> {
        let mut weights = self.sets.iter().map(|s| s.weight);
        let first = weights.next()?;
        Some(weights.fold(
            WeightRange {
                min: first,
                max: first,
            },
            |range, weight| WeightRange {
                min: if weight < range.min { weight } else { range.min },
                max: if weight > range.max { weight } else { range.max },
            },
        ))
    }

    pub fn add_set(&mut self, weight: Weight, reps: Reps) -> SetID {
        let set = ExerciseSet {
            id: SetID::random(),
            exercise_id: self.id,
            weight,
            reps,
        };
        let id = set.id;
        self.sets.push(set);
        id
    }

    pub fn remove_set(&mut self, id: SetID) -> Option<ExerciseSet> {
        let index = self.sets.iter().position(|s| s.id == id)?;
        Some(self.sets.remove(index))
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn relink(&mut self, session_id: TrainingSessionID) {
        self.session_id = session_id;
        for set in &mut self.sets {
            set.exercise_id = self.id;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseSet {
    pub id: SetID,
    pub exercise_id: ExerciseID,
    pub weight: Weight,
    pub reps: Reps,
}

impl ExerciseSet {
    #[must_use]
    pub fn volume(&self) -> f64 {
        f64::from(self.weight) * f64::from(u32::from(self.reps))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightRange {
    pub min: Weight,
    pub max: Weight,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    pub fn new(value: f64) -> Result<Self, WeightError> {
        if !value.is_finite() {
            return Err(WeightError::NotFinite);
        }

        if value < 0.0 {
            return Err(WeightError::Negative);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f64>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must not be negative")]
    Negative,
    #[error("Weight must be a finite number")]
    NotFinite,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl From<u32> for Reps {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Ok(Reps::new(parsed_value)),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be an integer")]
    ParseError,
}
