//! Markdown file backend: one `<id>.md` file per fiber.

use super::{FiberStorage, LoadWarning};
use crate::domain::{self, Fiber};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Extension of fiber files
pub const FILE_EXTENSION: &str = "md";

/// Storage over a directory of markdown files.
#[derive(Debug, Clone)]
pub struct MarkdownStorage {
    dir: PathBuf,
}

impl MarkdownStorage {
    /// Storage rooted at `dir` (normally `.felt/`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn load_file(path: &Path, id: &str) -> std::result::Result<Fiber, LoadWarning> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LoadWarning::Unreadable {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut fiber = domain::parse(id, &content).map_err(|e| LoadWarning::Malformed {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        fiber.modified_at = modified_at(path).await;
        Ok(fiber)
    }
}

async fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).await.and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Id encoded in a fiber file name, `None` for anything else.
fn fiber_id(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

#[async_trait]
impl FiberStorage for MarkdownStorage {
    async fn load_all(&self) -> Result<(Vec<Fiber>, Vec<LoadWarning>)> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut fibers = Vec::new();
        let mut warnings = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            let path = entry.path();
            let Some(id) = fiber_id(&path) else {
                continue;
            };

            match Self::load_file(&path, id).await {
                Ok(fiber) => fibers.push(fiber),
                Err(warning) => {
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        fibers.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(
            fibers = fibers.len(),
            skipped = warnings.len(),
            dir = %self.dir.display(),
            "Loaded fibers"
        );
        Ok((fibers, warnings))
    }

    async fn get(&self, id: &str) -> Result<Option<Fiber>> {
        let path = self.path(id);
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let mut fiber = domain::parse(id, &content)?;
                fiber.modified_at = modified_at(&path).await;
                Ok(Some(fiber))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&mut self, fiber: &Fiber) -> Result<()> {
        let content = domain::render(fiber)?;
        let path = self.path(&fiber.id);

        // Write to a sibling file first so a crash never leaves half a fiber
        let staging = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        let written = match fs::write(&staging, content).await {
            Ok(()) => fs::rename(&staging, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging file");
            }
            return Err(e.into());
        }

        debug!(id = %fiber.id, path = %path.display(), "Saved fiber");
        Ok(())
    }

    async fn delete(&mut self, id: &str) -> Result<()> {
        match fs::remove_file(self.path(id)).await {
            Ok(()) => {
                debug!(id, "Deleted fiber");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::FiberNotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{FILE_EXTENSION}"))
    }
}
