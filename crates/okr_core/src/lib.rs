//! Core domain logic for the OKR tracker.
//!
//! Key result progress, value formatting, sibling ordering and timeline
//! bucketing, plus the SQLite repositories and services that feed them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod progress;
pub mod repo;
pub mod service;
pub mod timeline;

pub use config::{ConfigError, CoreConfig, LoggingConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::key_result::{
    Direction, KeyResult, KeyResultId, KeyResultValidationError, KeyResultView, UnitType,
};
pub use model::order::{
    next_display_order, validate_reorder_batch, MoveDirection, MoveOutcome, OrderEntry,
    OrderScope, ReorderValidationError,
};
pub use model::org::{Department, DepartmentId, Objective, ObjectiveId};
pub use model::project::{
    Project, ProjectId, ProjectWithTasks, ScheduleInput, ScheduleValidationError, Task, TaskId,
};
pub use progress::{format_value, mean_progress, progress, FormatConfig};
pub use repo::key_result_repo::{KeyResultRepository, SqliteKeyResultRepository};
pub use repo::order_repo::{OrderRepoError, OrderRepoResult, OrderRepository, SqliteOrderRepository};
pub use repo::org_repo::{OrgRepository, SqliteOrgRepository};
pub use repo::project_repo::{NewProject, ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::key_result_service::KeyResultService;
pub use service::order_service::{OrderService, OrderServiceError};
pub use service::timeline_service::{TimelineRow, TimelineService, TimelineView};
pub use timeline::{
    bar_position, compute_range, today_marker, BarPosition, MonthBucket, TimelineConfig,
    TimelineItem, TimelineRange, MIN_BAR_WIDTH_PERCENT,
};

/// Minimal health-check probe.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
