use slotdesk_core::paths::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Resolve the slotdesk root directory.
///
/// Priority:
/// 1. `--root` flag / `SLOTDESK_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` holding `slotdesk.yaml`
/// 3. Nearest ancestor of `cwd` holding `.git/`
/// 4. `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_root_from(&cwd)
}

fn find_root_from(start: &Path) -> PathBuf {
    nearest_ancestor(start, |dir| dir.join(CONFIG_FILE).is_file())
        .or_else(|| nearest_ancestor(start, |dir| dir.join(".git").is_dir()))
        .unwrap_or_else(|| start.to_path_buf())
}

fn nearest_ancestor(start: &Path, matches: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| matches(dir)).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "version: 1\n").unwrap();
        let deep = dir.path().join("notes/deep");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_root_from(&deep), dir.path());
    }

    #[test]
    fn config_beats_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("site");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(inner.join(CONFIG_FILE), "version: 1\n").unwrap();
        assert_eq!(find_root_from(&inner), inner);
    }

    #[test]
    fn falls_back_to_start() {
        let dir = TempDir::new().unwrap();
        let start = dir.path().join("empty");
        std::fs::create_dir_all(&start).unwrap();
        let found = find_root_from(&start);
        // An enclosing checkout may exist above the temp dir; either way the
        // result is `start` or one of its ancestors.
        assert!(start.starts_with(&found));
    }
}
