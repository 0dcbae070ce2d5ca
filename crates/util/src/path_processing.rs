use std::{env, path::PathBuf};

use dirs_next::{config_dir, home_dir};

/// Environment variable overriding where the identities file is looked up.
pub const IDENTITIES_PATH_ENV: &str = "LOCALNET_IDENTITIES_PATH";

/// Expands a leading `~` to the user's home directory.
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

/// Returns the default location of the identities file.
///
/// `LOCALNET_IDENTITIES_PATH` wins when set and non-empty; otherwise
/// `<config dir>/localnet/identities.yaml`. The file may not exist.
pub fn default_identities_path() -> PathBuf {
    if let Ok(path) = env::var(IDENTITIES_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("localnet")
        .join("identities.yaml")
}
