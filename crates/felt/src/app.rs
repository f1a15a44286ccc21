//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use felt::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let fibers = app.storage().list().await?;
//!     println!("{} fibers", fibers.len());
//!     Ok(())
//! }
//! ```

use crate::commands::init::{CONFIG_FILE_NAME, FELT_DIR_NAME, FeltConfig, find_felt_root};
use crate::error::{Error, Result};
use crate::storage::{FiberStorage, MarkdownStorage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application context for CLI operations.
///
/// Holds the storage backend for the repository found at or above the
/// working directory, together with its configuration.
pub struct App {
    /// The storage backend (trait object for polymorphism)
    storage: Box<dyn FiberStorage>,

    /// Path to the felt directory (.felt)
    felt_dir: PathBuf,

    /// Repository configuration
    config: FeltConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("felt_dir", &self.felt_dir)
            .field("config", &self.config)
            .field("storage", &"<dyn FiberStorage>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for a `.felt/` directory and loads its
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if no repository is found, or a
    /// configuration error if `config.yaml` is invalid.
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_felt_root(working_dir).ok_or(Error::NotInitialized)?;
        let felt_dir = root_dir.join(FELT_DIR_NAME);

        let config = FeltConfig::load(&felt_dir.join(CONFIG_FILE_NAME)).await?;
        debug!(dir = %felt_dir.display(), ?config, "Opened felt repository");

        Ok(Self {
            storage: Box::new(MarkdownStorage::new(&felt_dir)),
            felt_dir,
            config,
        })
    }

    /// Get a mutable reference to the storage.
    pub fn storage_mut(&mut self) -> &mut dyn FiberStorage {
        self.storage.as_mut()
    }

    /// Get an immutable reference to the storage.
    pub fn storage(&self) -> &dyn FiberStorage {
        self.storage.as_ref()
    }

    /// Repository configuration.
    pub fn config(&self) -> &FeltConfig {
        &self.config
    }

    /// Get the path to the felt directory.
    pub fn felt_dir(&self) -> &Path {
        &self.felt_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_from_initialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();

        assert!(app.felt_dir().ends_with(".felt"));
        assert_eq!(app.config(), &FeltConfig::default());
        assert!(app.storage().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();
        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert_eq!(app.felt_dir(), temp_dir.path().join(".felt"));
    }

    #[tokio::test]
    async fn test_app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a felt repository"));
    }
}
