use std::env;
use std::fs;
use std::path::PathBuf;

/// Returns the per-user directory holding launcher UI state.
pub fn default_app_dir() -> PathBuf {
    let base = match env::consts::OS {
        "windows" => env::var_os("LOCALAPPDATA")
            .or_else(|| env::var_os("APPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".local").join("share")),
    }
    .unwrap_or_else(|| PathBuf::from("."));

    base.join("falcon-launcher")
}

pub fn preferences_path() -> PathBuf {
    default_app_dir().join("preferences.json")
}

/// Directory searched for `<locale>.xml` when no asset location is configured.
pub fn bundled_locales_dir() -> PathBuf {
    PathBuf::from("assets").join("locales")
}

pub fn ensure_app_dir() -> std::io::Result<()> {
    fs::create_dir_all(default_app_dir())
}
