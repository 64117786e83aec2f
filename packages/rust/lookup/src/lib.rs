//! Athlete profile lookup against a public results database.
//!
//! This crate provides:
//! - [`names`]: display-name cleanup and profile-identifier guessing
//! - [`ProfileFetcher`]: fetches a profile page over a shared HTTP client and parses its results table
//! - [`resolve`]: tries each guessed identifier in order until one resolves

pub mod fetcher;
pub mod names;
pub mod resolver;

pub use fetcher::{FetchError, ProfileFetcher, extract_attempts, parse_history};
pub use names::{candidate_identifiers, clean_name};
pub use resolver::resolve;
