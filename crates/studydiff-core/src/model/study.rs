use serde::{Deserialize, Serialize};
use std::str::FromStr;
use studydiff_core_types::StudyId;

/// Lifecycle status of a study version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyStatus {
    Draft,
    ReadyForScripting,
    Completed,
    Abandoned,
}

impl StudyStatus {
    /// Stable text code used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyStatus::Draft => "draft",
            StudyStatus::ReadyForScripting => "ready_for_scripting",
            StudyStatus::Completed => "completed",
            StudyStatus::Abandoned => "abandoned",
        }
    }
}

impl FromStr for StudyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(StudyStatus::Draft),
            "ready_for_scripting" => Ok(StudyStatus::ReadyForScripting),
            "completed" => Ok(StudyStatus::Completed),
            "abandoned" => Ok(StudyStatus::Abandoned),
            other => Err(format!("unknown study status '{}'", other)),
        }
    }
}

/// One version in a study's linear version chain
///
/// Version 1 has no parent. Every later version points at the version it was
/// copied from (`parent_study_id`) and at the root of the chain
/// (`master_study_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    pub id: StudyId,
    pub version: u32,
    pub status: StudyStatus,
    pub parent_study_id: Option<StudyId>,
    pub master_study_id: Option<StudyId>,
    /// Set once the snapshot batch for this version has been materialised
    pub is_snapshot_created: bool,
}

impl Study {
    /// Create version 1 of a new study chain
    pub fn first_version(id: StudyId) -> Self {
        Self {
            id,
            version: 1,
            status: StudyStatus::Draft,
            parent_study_id: None,
            master_study_id: None,
            is_snapshot_created: false,
        }
    }

    /// Create the version that follows `self`
    pub fn next_version(&self, id: StudyId) -> Self {
        Self {
            id,
            version: self.version + 1,
            status: StudyStatus::Draft,
            parent_study_id: Some(self.id),
            master_study_id: Some(self.master_study_id.unwrap_or(self.id)),
            is_snapshot_created: false,
        }
    }

    pub fn is_first_version(&self) -> bool {
        self.parent_study_id.is_none()
    }
}
