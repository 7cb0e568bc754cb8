//! Gantt timeline use-case service.
//!
//! Loads projects with their tasks once, computes the month window over the
//! whole snapshot, and attaches bar geometry to every row.

use crate::model::org::DepartmentId;
use crate::model::project::ProjectWithTasks;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;
use crate::timeline::{compute_range, BarPosition, TimelineConfig, TimelineItem, TimelineRange};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use uuid::Uuid;

/// One project or task row on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub id: Uuid,
    pub label: String,
    /// `None` when the row lacks a start or end date.
    pub bar: Option<BarPosition>,
    pub children: Vec<TimelineRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub range: TimelineRange,
    pub today_marker: Option<f64>,
    pub rows: Vec<TimelineRow>,
}

pub struct TimelineService<R: ProjectRepository> {
    repo: R,
    config: TimelineConfig,
}

impl<R: ProjectRepository> TimelineService<R> {
    pub fn new(repo: R, config: TimelineConfig) -> Self {
        Self { repo, config }
    }

    /// Builds the timeline for one department, or all of them when `None`.
    pub fn build(
        &self,
        department_uuid: Option<DepartmentId>,
        today: NaiveDate,
    ) -> RepoResult<TimelineView> {
        let projects = self.repo.list_projects_with_tasks(department_uuid)?;
        let view = layout(&projects, today, &self.config);
        debug!(
            "event=timeline_build module=timeline status=ok projects={} months={} start={} end={}",
            view.rows.len(),
            view.range.months.len(),
            view.range.start,
            view.range.end
        );
        Ok(view)
    }
}

/// Pure layout step over an already loaded snapshot.
pub fn layout(
    projects: &[ProjectWithTasks],
    today: NaiveDate,
    config: &TimelineConfig,
) -> TimelineView {
    let items: Vec<TimelineItem> = projects.iter().map(ProjectWithTasks::timeline_item).collect();
    let range = compute_range(&items, today, config);

    let rows = projects
        .iter()
        .map(|entry| TimelineRow {
            id: entry.project.uuid,
            label: entry.project.name.clone(),
            bar: range.bar(entry.project.start_date, entry.project.end_date),
            children: entry
                .tasks
                .iter()
                .map(|task| TimelineRow {
                    id: task.uuid,
                    label: task.title.clone(),
                    bar: range.bar(task.start_date, task.end_date),
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect();

    TimelineView {
        today_marker: range.today_marker(today),
        range,
        rows,
    }
}
