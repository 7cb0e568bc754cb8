//! Domain value objects for departments, OKRs, projects and tasks.
//!
//! # Responsibility
//! - Define the typed records the repositories read and write.
//! - Keep derived values (progress, order plans) out of persisted state.
//!
//! # Invariants
//! - Every record is identified by a stable v4 `Uuid`.
//! - `display_order` is only ever assigned by the ordering helpers in [`order`].

pub mod key_result;
pub mod order;
pub mod org;
pub mod project;
