//! Domain model for people, projects, contests and their time spans.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the half-year algebra free of I/O.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - Optional values (`until`) are `Option`, never sentinel zeros.

pub mod duration;
pub mod entity;
