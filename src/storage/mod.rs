use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

const DEFAULT_STAGING_SUBDIR: &str = "tdroiddesk";
const STAGING_SUFFIX: &str = ".staging";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("theme name is empty")]
    MissingThemeName,
    #[error("staging io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Root directory under which each conversion gets its own staging folder.
#[derive(Debug, Clone)]
pub struct StorageService {
    staging_root: PathBuf,
}

impl StorageService {
    pub const fn with_root(staging_root: PathBuf) -> Self {
        Self { staging_root }
    }

    pub fn with_default_root() -> Self {
        Self::with_root(std::env::temp_dir().join(DEFAULT_STAGING_SUBDIR))
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    fn validate_theme_name(theme_name: &str) -> StorageResult<()> {
        if theme_name.is_empty() {
            return Err(StorageError::MissingThemeName);
        }
        Ok(())
    }

    /// Creates a fresh staging folder named `<theme>.<random>.staging`.
    ///
    /// Every call gets its own folder, so conversions of same-named themes
    /// never share staged files.
    pub fn prepare(&self, theme_name: &str) -> StorageResult<StagingArea> {
        Self::validate_theme_name(theme_name)?;
        let io_error = |source| StorageError::Io {
            path: self.staging_root.clone(),
            source,
        };

        fs::create_dir_all(&self.staging_root).map_err(io_error)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{theme_name}."))
            .suffix(STAGING_SUFFIX)
            .tempdir_in(&self.staging_root)
            .map_err(io_error)?;
        Ok(StagingArea { dir })
    }
}

impl Default for StorageService {
    fn default() -> Self {
        Self::with_default_root()
    }
}

/// Staging folder removed on [`StagingArea::discard`] or on drop.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> StorageResult<PathBuf> {
        let path = self.file(name);
        fs::write(&path, contents).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn discard(self) -> StorageResult<()> {
        let path = self.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_folder_is_named_after_theme_under_root() {
        let root = tempfile::tempdir().unwrap();
        let service = StorageService::with_root(root.path().join("staging"));

        let staging = service.prepare("night").unwrap();
        assert_eq!(staging.path().parent(), Some(service.staging_root()));
        let name = staging.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("night."));
        assert!(name.ends_with(".staging"));
    }

    #[test]
    fn empty_theme_name_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let service = StorageService::with_root(root.path().to_path_buf());
        assert!(matches!(
            service.prepare(""),
            Err(StorageError::MissingThemeName)
        ));
    }

    #[test]
    fn same_theme_name_gets_separate_folders() {
        let root = tempfile::tempdir().unwrap();
        let service = StorageService::with_root(root.path().to_path_buf());

        let first = service.prepare("night").unwrap();
        let first_colors = first
            .write("colors.tdesktop-theme", b"first theme colors\n")
            .unwrap();
        let second = service.prepare("night").unwrap();
        second
            .write("colors.tdesktop-theme", b"second theme colors\n")
            .unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(fs::read(&first_colors).unwrap(), b"first theme colors\n");

        drop(second);
        assert!(first_colors.exists());
    }

    #[test]
    fn discard_and_drop_both_remove_the_folder() {
        let root = tempfile::tempdir().unwrap();
        let service = StorageService::with_root(root.path().to_path_buf());

        let staging = service.prepare("a").unwrap();
        let written = staging.write("colors.tdesktop-theme", b"x").unwrap();
        assert_eq!(fs::read(&written).unwrap(), b"x");
        let path = staging.path().to_path_buf();
        staging.discard().unwrap();
        assert!(!path.exists());

        let staging = service.prepare("b").unwrap();
        let path = staging.path().to_path_buf();
        drop(staging);
        assert!(!path.exists());
    }
}
