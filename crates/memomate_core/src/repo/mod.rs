//! Persistence layer.
//!
//! # Responsibility
//! - Define the preference storage seam and its implementations.
//! - Keep task list serialization out of service orchestration.
//!
//! # Invariants
//! - Write failures surface as `StoreError`; read failures degrade to
//!   empty data.

pub mod pref_store;
pub mod task_store;
