//! costgrade-core — Grading engine, data model, and store traits.
//!
//! This crate holds everything that does not touch a database: the data
//! model, the tolerance grader, the grade-and-record workflow, and the traits
//! a store must implement.

pub mod error;
pub mod feedback;
pub mod grader;
pub mod model;
pub mod roster;
pub mod summary;
pub mod traits;
pub mod workflow;
