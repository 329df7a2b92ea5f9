use std::path::PathBuf;

use dirs_next::home_dir;

/// Expands a leading `~` to the user's home directory. `~user` forms and
/// paths without a known home directory are returned as written.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home_relative = match trimmed.strip_prefix('~') {
        Some("") => Some(""),
        Some(rest) => rest.strip_prefix(['/', '\\']),
        None => None,
    };
    match (home_relative, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(trimmed),
    }
}
