//! Department and objective records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DepartmentId = Uuid;
pub type ObjectiveId = Uuid;

/// Team that owns objectives and projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub uuid: DepartmentId,
    pub name: String,
}

/// Qualitative goal owned by one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub uuid: ObjectiveId,
    pub department_uuid: DepartmentId,
    pub title: String,
}
