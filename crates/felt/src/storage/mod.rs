//! Storage abstraction layer for felt.
//!
//! Fibers live as one markdown file each in the `.felt/` directory. The
//! [`FiberStorage`] trait hides the file layout from the command layer so
//! commands only deal in [`Fiber`] values.
//!
//! # Example
//!
//! ```no_run
//! use felt::storage::{FiberStorage, MarkdownStorage};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = MarkdownStorage::new(".felt");
//!     for fiber in storage.list().await? {
//!         println!("{} {}", fiber.id, fiber.title);
//!     }
//!     Ok(())
//! }
//! ```

mod markdown;

pub use markdown::{FILE_EXTENSION, MarkdownStorage};

use crate::domain::{self, Fiber};
use crate::error::Result;
use crate::id_generation::validate_id;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// A file that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The file could not be read (permissions, invalid UTF-8)
    ///
    /// **Effect**: The file is skipped; no fiber is created from it.
    Unreadable {
        /// Path of the skipped file
        path: PathBuf,
        /// Underlying error message
        error: String,
    },

    /// The file was read but is not a valid fiber
    ///
    /// **Effect**: The file is skipped; no fiber is created from it.
    /// **Common causes**: Manual editing errors, missing `---` delimiters,
    /// an unknown status value.
    Malformed {
        /// Path of the skipped file
        path: PathBuf,
        /// Parse error message
        error: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, error } => {
                write!(f, "failed to read {}: {error}", path.display())
            }
            Self::Malformed { path, error } => {
                write!(f, "failed to parse {}: {error}", path.display())
            }
        }
    }
}

/// Core storage trait for fibers.
///
/// Implementations must be `Send + Sync` so an [`App`](crate::app::App) can
/// hold one behind a trait object.
#[async_trait]
pub trait FiberStorage: Send + Sync {
    /// Load every fiber, collecting skipped files as warnings.
    ///
    /// Fibers are returned sorted by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the storage location itself cannot be read.
    /// Individual bad files never fail the call.
    async fn load_all(&self) -> Result<(Vec<Fiber>, Vec<LoadWarning>)>;

    /// Get a fiber by exact id.
    ///
    /// Returns `None` if no such fiber exists.
    async fn get(&self, id: &str) -> Result<Option<Fiber>>;

    /// Write a fiber, replacing any previous version.
    async fn save(&mut self, fiber: &Fiber) -> Result<()>;

    /// Delete a fiber.
    ///
    /// # Errors
    ///
    /// Returns `Error::FiberNotFound` if the fiber doesn't exist.
    async fn delete(&mut self, id: &str) -> Result<()>;

    /// Location of the fiber's backing file.
    fn path(&self, id: &str) -> PathBuf;

    /// Every loadable fiber. Skipped files have already been logged.
    async fn list(&self) -> Result<Vec<Fiber>> {
        let (fibers, _warnings) = self.load_all().await?;
        Ok(fibers)
    }

    /// Resolve an id query to a single fiber.
    ///
    /// # Errors
    ///
    /// See [`domain::resolve`].
    async fn resolve(&self, query: &str) -> Result<Fiber> {
        // A full id names one file, so skip the directory scan when it loads.
        if validate_id(query) {
            match self.get(query).await {
                Ok(Some(fiber)) => return Ok(fiber),
                Ok(None) => {}
                Err(e) => debug!(query, error = %e, "Exact id lookup failed, scanning all fibers"),
            }
        }

        let fibers = self.list().await?;
        domain::resolve(&fibers, query).cloned()
    }
}
