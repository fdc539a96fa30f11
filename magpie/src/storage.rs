use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// Resolves a record's relative storage path to raw bytes.
///
/// The index never performs this I/O; a store is consulted only after a page
/// of results has been chosen for delivery.
pub trait MediaStore {
    fn fetch(&self, relative_path: &str) -> Result<Vec<u8>>;
}

/// Media files sitting under a local directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl MediaStore for LocalStore {
    fn fetch(&self, relative_path: &str) -> Result<Vec<u8>> {
        let path = self.root.join(relative_path);
        fs::read(&path).with_context(|| format!("failed to read {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn fetches_bytes_below_the_root() {
        let dir = TempDir::new("magpie_local_store").unwrap();
        fs::create_dir_all(dir.path().join("2022/June")).unwrap();
        fs::write(dir.path().join("2022/June/a.jpg"), b"bytes").unwrap();

        let store = LocalStore::new(dir.path().to_path_buf());
        assert_eq!(store.fetch("2022/June/a.jpg").unwrap(), b"bytes");
        assert!(store.fetch("2022/June/missing.jpg").is_err());
    }
}
