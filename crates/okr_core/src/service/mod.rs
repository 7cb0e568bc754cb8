//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Log every write with stable `event=... status=...` fields.

pub mod key_result_service;
pub mod order_service;
pub mod timeline_service;
