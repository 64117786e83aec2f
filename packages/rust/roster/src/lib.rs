//! Roster retrieval for RosterScout.
//!
//! This crate provides:
//! - [`normalize_roster_url`] / [`meet_id`]: canonicalise any meet URL to its roster page
//! - [`RosterSource`]: fetch or load a roster page and extract `(label, link)` pairs
//!
//! Live roster pages are rendered client-side, so [`RosterSource::fetch`] only
//! yields entries when the server delivers pre-rendered markup. Saved pages are
//! handled by [`RosterSource::load_file`].

mod normalize;
mod source;

pub use normalize::{ROSTER_HOST, meet_id, normalize_roster_url};
pub use source::{LIFTER_LINK_SELECTOR, RosterSource, parse_roster};
