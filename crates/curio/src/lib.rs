//! Curio - Learning Goal Advisor
//!
//! Turns a free-text learning goal into semantically matched courses, faculty
//! and campus events, each with a generated rationale, plus a short advisor
//! narrative tying them together.
//!
//! The pipeline refines the goal into a keyword query, searches the three
//! embedded corpora independently, explains every match concurrently and
//! finally synthesizes one narrative answer.

pub mod cli;
pub mod config;
pub mod error;
pub mod indexing;
pub mod models;
pub mod pipeline;
pub mod services;

pub use error::{PipelineError, Result};
