use crate::domain::value_objects::EntityKind;
use serde::{Deserialize, Serialize};

/// Per-kind record counts for a single owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub workouts: u64,
    pub templates: u64,
    pub programs: u64,
    pub personal_records: u64,
}

impl MigrationSummary {
    pub fn add(&mut self, kind: EntityKind, count: u64) {
        match kind {
            EntityKind::Workout => self.workouts += count,
            EntityKind::Template => self.templates += count,
            EntityKind::Program => self.programs += count,
            EntityKind::PersonalRecord => self.personal_records += count,
        }
    }

    pub fn get(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Workout => self.workouts,
            EntityKind::Template => self.templates,
            EntityKind::Program => self.programs,
            EntityKind::PersonalRecord => self.personal_records,
        }
    }

    pub fn total(&self) -> u64 {
        self.workouts + self.templates + self.programs + self.personal_records
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
