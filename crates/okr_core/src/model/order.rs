//! Sibling ordering primitives.
//!
//! # Responsibility
//! - Name the scopes inside which `display_order` is meaningful.
//! - Compute append positions and validate batch rewrites before any write.
//!
//! # Invariants
//! - `display_order` values are unique within a scope; gaps are allowed.
//! - A reorder batch is rejected as a whole; it is never partially applied.
//! - A batch may not leave two records of the scope on the same order,
//!   including records the batch does not list.

use crate::model::org::DepartmentId;
use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Parent scope of an orderable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// Projects owned by one department.
    Department(DepartmentId),
    /// Tasks owned by one project.
    Project(ProjectId),
}

impl OrderScope {
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Department(_) => "projects",
            Self::Project(_) => "tasks",
        }
    }

    pub(crate) fn parent_column(self) -> &'static str {
        match self {
            Self::Department(_) => "department_uuid",
            Self::Project(_) => "project_uuid",
        }
    }

    pub fn parent_uuid(self) -> Uuid {
        match self {
            Self::Department(id) | Self::Project(id) => id,
        }
    }
}

impl Display for OrderScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Department(id) => write!(f, "department:{id}"),
            Self::Project(id) => write!(f, "project:{id}"),
        }
    }
}

/// Step direction for single-position moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Towards lower `display_order`.
    Up,
    /// Towards higher `display_order`.
    Down,
}

impl MoveDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Result of a step move that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Orders of the record and its neighbor were exchanged.
    Swapped { neighbor: Uuid },
    /// Record already sits at the first/last position; nothing changed.
    AtBoundary,
}

/// One `(id, display_order)` pair, read or to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: Uuid,
    pub display_order: i64,
}

impl OrderEntry {
    pub fn new(id: Uuid, display_order: i64) -> Self {
        Self { id, display_order }
    }
}

/// Reasons a reorder batch is refused before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderValidationError {
    EmptyBatch,
    DuplicateId(Uuid),
    NegativeOrder { id: Uuid, display_order: i64 },
    UnknownId(Uuid),
    /// Applying the batch would leave two records on the same order.
    OrderCollision {
        id: Uuid,
        other: Uuid,
        display_order: i64,
    },
}

impl Display for ReorderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "reorder batch must not be empty"),
            Self::DuplicateId(id) => write!(f, "reorder batch lists {id} more than once"),
            Self::NegativeOrder { id, display_order } => write!(
                f,
                "reorder batch assigns negative order {display_order} to {id}"
            ),
            Self::UnknownId(id) => write!(f, "reorder batch references unknown record {id}"),
            Self::OrderCollision {
                id,
                other,
                display_order,
            } => write!(
                f,
                "reorder batch puts {id} and {other} on the same order {display_order}"
            ),
        }
    }
}

impl Error for ReorderValidationError {}

/// Order for a record appended to a scope: `max + 1`, or `0` when empty.
pub fn next_display_order(existing: impl IntoIterator<Item = i64>) -> i64 {
    existing.into_iter().max().map_or(0, |max| max + 1)
}

/// Checks a batch against the current `(id, display_order)` listing of its scope.
///
/// Records not listed in the batch keep their current order, and every
/// resulting order must be unique within the scope.
pub fn validate_reorder_batch(
    entries: &[OrderEntry],
    current: &[OrderEntry],
) -> Result<(), ReorderValidationError> {
    if entries.is_empty() {
        return Err(ReorderValidationError::EmptyBatch);
    }

    let mut planned: HashMap<Uuid, i64> = current
        .iter()
        .map(|entry| (entry.id, entry.display_order))
        .collect();
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.id) {
            return Err(ReorderValidationError::DuplicateId(entry.id));
        }
        if entry.display_order < 0 {
            return Err(ReorderValidationError::NegativeOrder {
                id: entry.id,
                display_order: entry.display_order,
            });
        }
        match planned.get_mut(&entry.id) {
            Some(order) => *order = entry.display_order,
            None => return Err(ReorderValidationError::UnknownId(entry.id)),
        }
    }

    // Walk in listing order so collisions are reported deterministically.
    let mut holders: HashMap<i64, Uuid> = HashMap::with_capacity(current.len());
    for entry in current {
        let display_order = planned
            .get(&entry.id)
            .copied()
            .unwrap_or(entry.display_order);
        if let Some(&other) = holders.get(&display_order) {
            return Err(ReorderValidationError::OrderCollision {
                id: entry.id,
                other,
                display_order,
            });
        }
        holders.insert(display_order, entry.id);
    }
    Ok(())
}
