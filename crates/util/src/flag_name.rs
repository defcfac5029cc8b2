use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid flag-name pattern"));

/// Derive a command-line flag identifier from a provider display name.
///
/// Lowercases the name, collapses every run of non-alphanumeric characters
/// into a single `-`, and trims hyphens from both ends.
pub fn derive_flag_name(display_name: &str) -> String {
    let lowered = display_name.to_lowercase();
    NON_ALPHANUMERIC.replace_all(&lowered, "-").trim_matches('-').to_string()
}
