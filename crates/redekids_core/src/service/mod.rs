//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Validate caller input before any store interaction.
//! - Keep presentation layers decoupled from storage details.

pub mod attendance_service;
pub mod child_service;
pub mod servant_service;
pub mod service_resolver;
pub mod summary_service;
