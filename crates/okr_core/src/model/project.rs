//! Project and task records.
//!
//! # Invariants
//! - `end_date` is never earlier than `start_date` when both are set.
//! - `display_order` is scoped to the parent department (projects) or parent
//!   project (tasks).

use crate::model::org::{DepartmentId, ObjectiveId};
use crate::timeline::TimelineItem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProjectId = Uuid;
pub type TaskId = Uuid;

/// Validation errors for project/task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    BlankName,
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl Display for ScheduleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "end date {end} is earlier than start date {start}")
            }
        }
    }
}

impl Error for ScheduleValidationError {}

/// Creation input shared by projects and tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleInput {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ScheduleInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Returns the trimmed name once the input passes validation.
    pub fn validate(&self) -> Result<String, ScheduleValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ScheduleValidationError::BlankName);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ScheduleValidationError::EndBeforeStart { start, end });
            }
        }
        Ok(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub uuid: ProjectId,
    pub department_uuid: DepartmentId,
    pub objective_uuid: Option<ObjectiveId>,
    pub name: String,
    /// Directly responsible individual.
    pub dri: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub display_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub project_uuid: ProjectId,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub display_order: i64,
}

/// A project joined with its ordered tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectWithTasks {
    pub project: Project,
    pub tasks: Vec<Task>,
}

impl ProjectWithTasks {
    /// Groups tasks under their projects, keeping the input order of both.
    ///
    /// Tasks whose project is not in `projects` are dropped.
    pub fn assemble(projects: Vec<Project>, tasks: Vec<Task>) -> Vec<Self> {
        let mut joined: Vec<Self> = projects
            .into_iter()
            .map(|project| Self {
                project,
                tasks: Vec::new(),
            })
            .collect();
        for task in tasks {
            if let Some(slot) = joined
                .iter_mut()
                .find(|entry| entry.project.uuid == task.project_uuid)
            {
                slot.tasks.push(task);
            }
        }
        joined
    }

    pub fn timeline_item(&self) -> TimelineItem {
        TimelineItem {
            start_date: self.project.start_date,
            end_date: self.project.end_date,
            children: self
                .tasks
                .iter()
                .map(|task| TimelineItem::new(task.start_date, task.end_date))
                .collect(),
        }
    }
}
