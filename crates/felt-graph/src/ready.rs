//! Readiness: open fibers whose dependencies are all closed.

use crate::graph::Graph;
use crate::types::{FiberRecord, Status};

impl<'a, F: FiberRecord> Graph<'a, F> {
    /// Fibers that could be started right now.
    ///
    /// A fiber is ready when its status is exactly [`Status::Open`] and every
    /// dependency resolves to a [`Status::Closed`] fiber. A dependency on a
    /// missing fiber counts as unresolved. Active fibers are never ready.
    ///
    /// Sorted by creation time, earliest first, ties broken by id.
    pub fn ready(&self) -> Vec<&'a F> {
        let mut ready: Vec<&'a F> = self
            .nodes()
            .filter(|fiber| fiber.status() == Some(Status::Open))
            .filter(|fiber| self.dependencies_closed(fiber.id()))
            .collect();

        ready.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        ready
    }

    fn dependencies_closed(&self, id: &str) -> bool {
        self.upstream(id).iter().all(|dep| {
            self.node(dep.id())
                .is_some_and(|upstream| upstream.status() == Some(Status::Closed))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestFiber, fiber, untracked};
    use crate::{Graph, Status};

    fn ready_ids<'a>(graph: &Graph<'a, TestFiber>) -> Vec<&'a str> {
        graph.ready().into_iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_ready_excludes_active_and_blocked() {
        let fibers = vec![
            fiber("a", Status::Closed, &[]),
            fiber("b", Status::Open, &["a"]),
            fiber("c", Status::Active, &[]),
        ];
        let graph = Graph::build(&fibers);

        assert_eq!(ready_ids(&graph), vec!["b"]);
    }

    #[test]
    fn test_ready_requires_all_dependencies_closed() {
        let fibers = vec![
            fiber("a", Status::Closed, &[]),
            fiber("b", Status::Active, &[]),
            fiber("c", Status::Open, &["a", "b"]),
        ];
        let graph = Graph::build(&fibers);

        assert!(!ready_ids(&graph).contains(&"c"));
    }

    #[test]
    fn test_missing_dependency_is_never_ready() {
        let fibers = vec![fiber("a", Status::Open, &["ghost"])];
        let graph = Graph::build(&fibers);

        assert!(graph.ready().is_empty());
    }

    #[test]
    fn test_untracked_fibers_are_not_ready() {
        let fibers = vec![untracked("note", &[]), fiber("task", Status::Open, &[])];
        let graph = Graph::build(&fibers);

        assert_eq!(ready_ids(&graph), vec!["task"]);
    }

    #[test]
    fn test_untracked_dependency_blocks() {
        let fibers = vec![untracked("note", &[]), fiber("task", Status::Open, &["note"])];
        let graph = Graph::build(&fibers);

        assert!(graph.ready().is_empty());
    }

    #[test]
    fn test_ready_sorted_by_creation_time() {
        // Supplied out of creation order
        let first = fiber("zzz", Status::Open, &[]);
        let second = fiber("aaa", Status::Open, &[]);
        let fibers = vec![second, first];
        let graph = Graph::build(&fibers);

        assert_eq!(ready_ids(&graph), vec!["zzz", "aaa"]);
    }
}
