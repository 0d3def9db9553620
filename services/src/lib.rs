//! Submission aggregation, grade ledger and grading rules.
//!
//! Quiz attempts and assignment uploads live in different tables with
//! different shapes. Everything in this crate works on the
//! [`CanonicalSubmission`](submission::CanonicalSubmission) both are mapped
//! into, and reaches storage only through the
//! [`GradebookStore`](store::GradebookStore) seam.

pub mod adapters;
pub mod aggregation;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod grade_book;
pub mod gradebook_service;
pub mod grading;
pub mod store;
pub mod submission;

pub use error::{GradebookError, GradebookResult};
pub use gradebook_service::GradebookService;
