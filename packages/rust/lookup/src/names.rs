//! Roster label cleanup and profile identifier guessing.

/// Separator between the bib number and the name in a roster label.
const LABEL_SEPARATOR: &str = " - ";

/// Strip a leading `"<bib> - "` from a roster label.
///
/// `"105 - Anthony Hill"` becomes `"Anthony Hill"`; labels without the
/// separator are only trimmed.
pub fn clean_name(raw_label: &str) -> String {
    match raw_label.split_once(LABEL_SEPARATOR) {
        Some((_, name)) => name.trim().to_string(),
        None => raw_label.trim().to_string(),
    }
}

/// Guess profile identifiers for a display name, most likely first.
///
/// Order: spaces and hyphens removed, spaces removed, spaces as hyphens.
/// Duplicates are dropped keeping the first occurrence.
pub fn candidate_identifiers(display_name: &str) -> Vec<String> {
    let base = display_name.to_lowercase();

    let no_space = base.replace(' ', "");
    let no_dash = no_space.replace('-', "");
    let with_dashes = base.replace(' ', "-");

    let mut ordered: Vec<String> = Vec::with_capacity(3);
    for guess in [no_dash, no_space, with_dashes] {
        if !ordered.contains(&guess) {
            ordered.push(guess);
        }
    }
    ordered
}
