//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and reminder calls into use-case level APIs.
//! - Keep FFI/CLI layers decoupled from storage and scheduling details.

pub mod task_service;
