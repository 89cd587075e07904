//! Domain model for the children's ministry roster and attendance.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Hold the pure classroom classifier shared by services and reports.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - Children and servants are deactivated, never hard-deleted.

pub mod attendance;
pub mod child;
pub mod classroom;
pub mod servant;
pub mod service;
