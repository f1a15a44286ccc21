//! Dependency graph engine for felt fibers.
//!
//! A [`Graph`] is built from a flat collection of records implementing
//! [`FiberRecord`] and answers read-only queries over it:
//!
//! - transitive traversal: [`Graph::ancestors_of`], [`Graph::descendants_of`]
//! - readiness: [`Graph::ready`]
//! - cycle prevention and detection: [`Graph::would_create_cycle`],
//!   [`Graph::find_cycles`]
//! - integrity: [`Graph::validate_dependencies`]
//! - shortest dependency path: [`Graph::find_path`]
//!
//! The engine performs no I/O and never fails. Cycles and dangling references
//! are reported as data.
//!
//! # Example
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use felt_graph::{Dependency, FiberRecord, Graph, Status};
//!
//! struct Task {
//!     id: String,
//!     status: Status,
//!     deps: Vec<Dependency>,
//! }
//!
//! impl FiberRecord for Task {
//!     fn id(&self) -> &str { &self.id }
//!     fn status(&self) -> Option<Status> { Some(self.status) }
//!     fn dependencies(&self) -> &[Dependency] { &self.deps }
//!     fn created_at(&self) -> DateTime<Utc> { DateTime::<Utc>::UNIX_EPOCH }
//! }
//!
//! let tasks = vec![
//!     Task { id: "design".into(), status: Status::Closed, deps: vec![] },
//!     Task { id: "build".into(), status: Status::Open, deps: vec![Dependency::new("design")] },
//! ];
//!
//! let graph = Graph::build(&tasks);
//! assert_eq!(graph.ancestors_of("build", None), vec!["design"]);
//! assert_eq!(graph.ready().len(), 1);
//! assert!(graph.would_create_cycle("design", "build"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cycles;
mod graph;
mod integrity;
mod ready;
mod traversal;
mod types;

#[cfg(test)]
mod test_support;

pub use cycles::Cycle;
pub use graph::{Dependent, Graph};
pub use integrity::DanglingDependency;
pub use types::{Dependency, FiberRecord, Status};
