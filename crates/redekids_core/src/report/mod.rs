//! Report building and document export.
//!
//! # Responsibility
//! - Group enriched attendance for presentation (date, time slot, classroom).
//! - Render roster and attendance rows into downloadable documents.
//!
//! # Invariants
//! - Exporters are pure consumers of already computed rows; they never
//!   touch the store.

pub mod export;
pub mod grouping;
