//! Shared types, error model, and configuration for RosterScout.
//!
//! This crate is the foundation depended on by all other RosterScout crates.
//! It provides:
//! - [`RosterScoutError`]: the unified error type
//! - Domain types ([`RosterEntry`], [`ResultRow`], [`LookupOutcome`], [`PersonRecord`], [`Report`])
//! - Configuration ([`AppConfig`], [`LookupConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Database, LookupConfig, LookupSection, RosterSection, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, RosterScoutError};
pub use types::{
    BENCH_KEY, DEADLIFT_KEY, LookupOutcome, PersonRecord, Report, ResultRow, RosterEntry, RunId,
    SQUAT_KEY,
};
