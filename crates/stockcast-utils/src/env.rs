//! Environment file loading

use std::path::Path;

/// Load variables from a `.env` file into the process environment.
///
/// Looks in the current directory and its parents when `path` is `None`.
/// Variables already set in the environment are never overwritten. Returns
/// the path that was loaded, if any; a missing file is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Option<std::path::PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(path) => {
            tracing::debug!("loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("failed to load .env file: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_dotenv(Some(&dir.path().join("absent.env"))).is_none());
    }

    #[test]
    fn test_loads_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.env");
        std::fs::write(&path, "STOCKCAST_UTILS_TEST_VAR=loaded\n").unwrap();

        let loaded = load_dotenv(Some(&path));
        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(std::env::var("STOCKCAST_UTILS_TEST_VAR").unwrap(), "loaded");
    }
}
