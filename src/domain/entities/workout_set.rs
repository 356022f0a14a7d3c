use crate::domain::value_objects::RecordId;
use serde::{Deserialize, Serialize};

/// One performed (or planned) set inside a workout log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: RecordId,
    pub workout_id: RecordId,
    pub position: u32,
    pub exercise: String,
    pub reps: u32,
    pub weight: Option<f64>,
    pub completed: bool,
}

impl WorkoutSet {
    pub fn new(
        workout_id: RecordId,
        position: u32,
        exercise: impl Into<String>,
        reps: u32,
        weight: Option<f64>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            workout_id,
            position,
            exercise: exercise.into(),
            reps,
            weight,
            completed: false,
        }
    }
}
