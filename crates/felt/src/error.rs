//! Error types for felt operations.

use std::io;
use thiserror::Error;

/// The error type for felt operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML could not be read or written.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A fiber file is not valid markdown with YAML frontmatter.
    #[error("Malformed fiber file: {0}")]
    Frontmatter(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No `.felt/` directory was found.
    #[error("Not a felt repository (run 'felt init' first)")]
    NotInitialized,

    /// `init` was run where a `.felt/` directory already exists.
    #[error(".felt directory already exists")]
    AlreadyInitialized,

    /// No fiber matches an id query.
    #[error("no felt found matching {0:?}")]
    FiberNotFound(String),

    /// An id query matches more than one fiber.
    #[error("ambiguous ID {query:?} matches: {}", .matches.join(", "))]
    AmbiguousId {
        /// The query as typed
        query: String,
        /// Every id it matched, sorted
        matches: Vec<String>,
    },

    /// Adding the dependency would close a loop in the graph.
    #[error("adding dependency on {0} would create a cycle")]
    CircularDependency(String),

    /// The dependency is already recorded.
    #[error("{fiber} already depends on {dependency}")]
    DuplicateDependency {
        /// Fiber holding the dependency list
        fiber: String,
        /// Dependency that was requested again
        dependency: String,
    },

    /// The dependency to remove is not recorded.
    #[error("{fiber} does not depend on {dependency}")]
    DependencyNotFound {
        /// Fiber holding the dependency list
        fiber: String,
        /// Dependency that was requested
        dependency: String,
    },

    /// A fiber cannot be deleted while others depend on it.
    #[error("cannot delete: {} depends on this felt", .dependents.join(", "))]
    HasDependents {
        /// Fiber that was to be deleted
        id: String,
        /// Fibers depending on it
        dependents: Vec<String>,
    },

    /// A status change that is not allowed from the current status.
    #[error("{0}")]
    InvalidTransition(String),

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Every nonce produced an id that is already taken.
    #[error("Unable to generate unique ID after {attempts} attempts")]
    IdGeneration {
        /// Number of nonces tried
        attempts: u32,
    },
}

/// A specialized Result type for felt operations.
pub type Result<T> = std::result::Result<T, Error>;
