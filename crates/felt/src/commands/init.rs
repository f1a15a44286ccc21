//! Implementation of the `init` command and repository configuration.
//!
//! A felt repository is any directory containing a `.felt/` directory. The
//! fibers live directly inside it, next to `config.yaml`.

use crate::domain::{DEFAULT_KIND, DEFAULT_PRIORITY, MAX_PRIORITY};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the felt directory
pub const FELT_DIR_NAME: &str = ".felt";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Maximum directory depth to traverse when searching for the felt root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Repository configuration stored in `.felt/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct FeltConfig {
    /// Kind given to new fibers when `add` is not told otherwise
    pub default_kind: String,

    /// Priority given to new fibers when `add` is not told otherwise
    pub default_priority: u8,
}

impl Default for FeltConfig {
    fn default() -> Self {
        Self {
            default_kind: DEFAULT_KIND.to_string(),
            default_priority: DEFAULT_PRIORITY,
        }
    }
}

impl FeltConfig {
    /// Load configuration from a file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for unparsable or out-of-range values.
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.default_priority > MAX_PRIORITY {
            return Err(Error::Config(format!(
                "default-priority must be between 0 and {MAX_PRIORITY}, got {}",
                self.default_priority
            )));
        }
        if self.default_kind.trim().is_empty() {
            return Err(Error::Config("default-kind cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created felt directory
    pub felt_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
}

/// Initialize a new felt repository in the given directory.
///
/// # Errors
///
/// Returns `Error::AlreadyInitialized` if `.felt/` already exists, or an IO
/// error if it cannot be created.
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let felt_dir = base_dir.join(FELT_DIR_NAME);

    if fs::try_exists(&felt_dir).await? {
        return Err(Error::AlreadyInitialized);
    }

    fs::create_dir_all(&felt_dir).await?;

    let config_file = felt_dir.join(CONFIG_FILE_NAME);
    FeltConfig::default().save(&config_file).await?;

    debug!(dir = %felt_dir.display(), "Initialized felt repository");
    Ok(InitResult {
        felt_dir,
        config_file,
    })
}

/// Check if a directory has been initialized with felt.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(FELT_DIR_NAME).is_dir()
}

/// Find the felt root directory by searching up the directory tree.
///
/// Returns the directory containing `.felt/`, or `None` if none is found
/// within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_felt_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if is_initialized(&current) {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
