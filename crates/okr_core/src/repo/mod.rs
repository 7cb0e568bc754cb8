//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL details behind use-case oriented traits.
//! - Map raw rows into typed records in one dedicated step per table.
//!
//! # Invariants
//! - Repositories only accept fully migrated connections.
//! - Write paths validate input before any SQL mutation.
//! - Multi-row writes run inside one `IMMEDIATE` transaction.

mod common;
pub mod key_result_repo;
pub mod order_repo;
pub mod org_repo;
pub mod project_repo;

pub use common::{RepoError, RepoResult};
