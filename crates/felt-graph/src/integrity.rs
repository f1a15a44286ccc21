//! Referential integrity checks.

use crate::graph::Graph;
use crate::types::FiberRecord;
use std::fmt;

/// A dependency naming a fiber that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependency {
    /// Fiber holding the reference
    pub fiber: String,
    /// Id that could not be resolved
    pub missing: String,
}

impl fmt::Display for DanglingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} depends on non-existent {}", self.fiber, self.missing)
    }
}

impl<F: FiberRecord> Graph<'_, F> {
    /// One entry per dependency whose target is not in the graph.
    ///
    /// Ordered by source id, then by position in its dependency list.
    pub fn validate_dependencies(&self) -> Vec<DanglingDependency> {
        self.sorted_ids()
            .into_iter()
            .flat_map(|id| {
                self.upstream(id)
                    .iter()
                    .filter(move |dep| !self.contains(dep.id()))
                    .map(move |dep| DanglingDependency {
                        fiber: id.to_string(),
                        missing: dep.id().to_string(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{chain, fiber};
    use crate::{Graph, Status};

    #[test]
    fn test_valid_graph_has_no_errors() {
        let fibers = chain(&["a", "b", "c"]);
        let graph = Graph::build(&fibers);

        assert!(graph.validate_dependencies().is_empty());
    }

    #[test]
    fn test_reports_each_missing_reference() {
        let fibers = vec![
            fiber("b", Status::Open, &["ghost", "a"]),
            fiber("a", Status::Open, &["phantom"]),
        ];
        let graph = Graph::build(&fibers);

        let errors: Vec<String> = graph
            .validate_dependencies()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            errors,
            vec![
                "a depends on non-existent phantom",
                "b depends on non-existent ghost",
            ]
        );
    }
}
