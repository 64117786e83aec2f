//! Pipeline orchestration for RosterScout.
//!
//! This crate ties together roster retrieval and profile lookup into the
//! end-to-end `build_report` workflow.

pub mod pipeline;
pub mod report;
