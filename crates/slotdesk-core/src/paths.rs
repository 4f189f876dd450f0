use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "slotdesk.yaml";
pub const DATA_DIR: &str = ".slotdesk";
pub const DEFAULT_DB_FILE: &str = ".slotdesk/slots.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

/// Resolve a configured storage path. Relative paths are taken from `root`.
pub fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
