use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    if let Some(rest) = p.strip_prefix("~\\") {
        // Windows-style
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Directory holding dlookup's config and log files.
///
/// macOS uses `~/.config` rather than `~/Library/Application Support` so the
/// file sits where terminal users expect it.
pub fn app_config_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        home_dir().map(|home| home.join(".config"))
    } else {
        dirs_next::config_dir()
    };
    base.map(|dir| dir.join("dlookup"))
}
