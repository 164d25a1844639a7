use std::path::{Path, PathBuf};

/// Environment variable that overrides the store location.
pub const STORE_ENV: &str = "TODOEY_STORE";

/// Default store location: `<data dir>/todoey/store.json`, falling back to
/// the working directory when the platform has no data dir.
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todoey")
        .join("store.json")
}

/// Picks the store path: an explicit `--store`/`TODOEY_STORE` value wins
/// over the default.
pub fn resolve_store_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_store_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_store_path(Some(Path::new("/srv/todo.json")));
        assert_eq!(path, PathBuf::from("/srv/todo.json"));
    }

    #[test]
    fn test_default_path_ends_with_store_file() {
        let path = resolve_store_path(None);
        assert!(path.ends_with("todoey/store.json"));
    }
}
