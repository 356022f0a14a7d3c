use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Workout,
    Template,
    Program,
    PersonalRecord,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Workout,
        EntityKind::Template,
        EntityKind::Program,
        EntityKind::PersonalRecord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Workout => "workout",
            EntityKind::Template => "template",
            EntityKind::Program => "program",
            EntityKind::PersonalRecord => "personalRecord",
        }
    }

    /// Local table holding records of this kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Workout => "workout_logs",
            EntityKind::Template => "workout_templates",
            EntityKind::Program => "programs",
            EntityKind::PersonalRecord => "personal_records",
        }
    }

    /// Personal records are derived remotely from workouts and never pushed.
    pub fn is_remote_derived(&self) -> bool {
        matches!(self, EntityKind::PersonalRecord)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "workout" => Ok(EntityKind::Workout),
            "template" => Ok(EntityKind::Template),
            "program" => Ok(EntityKind::Program),
            "personalRecord" | "pr" => Ok(EntityKind::PersonalRecord),
            other => Err(AppError::UnknownEntityKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_and_pr_alias() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!(
            "pr".parse::<EntityKind>().unwrap(),
            EntityKind::PersonalRecord
        );
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = "exercise".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, AppError::UnknownEntityKind(kind) if kind == "exercise"));
    }
}
