//! Breadth-first traversal: transitive ancestors, descendants and shortest
//! dependency paths.

use crate::graph::Graph;
use crate::types::{Dependency, FiberRecord};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy)]
enum Direction {
    /// Follow what a fiber depends on
    Upstream,
    /// Follow what depends on a fiber
    Downstream,
}

impl<'a, F: FiberRecord> Graph<'a, F> {
    fn neighbours(&self, id: &str, direction: Direction) -> Vec<&'a str> {
        match direction {
            Direction::Upstream => self.upstream(id).iter().map(Dependency::id).collect(),
            Direction::Downstream => self.downstream(id).iter().map(|d| d.id).collect(),
        }
    }

    /// Level-order walk from `start`. The start itself is never part of the
    /// result. `None` and `Some(0)` both mean unbounded.
    fn bfs(&self, start: &str, direction: Direction, max_depth: Option<usize>) -> Vec<&'a str> {
        let limit = max_depth.filter(|&depth| depth > 0);

        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start);
        let mut queue: VecDeque<(&'a str, usize)> = VecDeque::new();

        // Start BFS from direct neighbours (depth 1)
        for next in self.neighbours(start, direction) {
            if visited.insert(next) {
                queue.push_back((next, 1));
                result.push(next);
            }
        }

        while let Some((current, depth)) = queue.pop_front() {
            if limit.is_some_and(|max| depth >= max) {
                continue;
            }

            for next in self.neighbours(current, direction) {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                    result.push(next);
                }
            }
        }

        result
    }

    /// Everything `id` depends on, transitively, in BFS discovery order.
    ///
    /// `depth` limits how far the walk expands: `Some(1)` yields direct
    /// dependencies only, `None` or `Some(0)` the full closure. Unknown ids
    /// yield an empty result. Dangling references are included even though
    /// no fiber exists for them.
    pub fn ancestors_of(&self, id: &str, depth: Option<usize>) -> Vec<&'a str> {
        self.bfs(id, Direction::Upstream, depth)
    }

    /// Everything that depends on `id`, transitively, in BFS discovery order.
    ///
    /// Depth semantics match [`Graph::ancestors_of`].
    pub fn descendants_of(&self, id: &str, depth: Option<usize>) -> Vec<&'a str> {
        self.bfs(id, Direction::Downstream, depth)
    }

    /// Shortest chain of dependencies leading from `from` to `to`.
    ///
    /// Only upstream edges are followed, so a path exists iff `from`
    /// transitively depends on `to`. The result starts with `from` and ends
    /// with `to`; `from == to` yields the single-element path.
    pub fn find_path<'s>(&'s self, from: &'s str, to: &str) -> Option<Vec<&'s str>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut parent: HashMap<&'s str, &'s str> = HashMap::new();
        let mut visited: HashSet<&'s str> = HashSet::new();
        visited.insert(from);
        let mut queue: VecDeque<&'s str> = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for dep in self.upstream(current) {
                let next = dep.id();
                if !visited.insert(next) {
                    continue;
                }
                parent.insert(next, current);

                if next == to {
                    let mut path = vec![next];
                    let mut cursor = next;
                    while let Some(&prev) = parent.get(cursor) {
                        path.push(prev);
                        cursor = prev;
                    }
                    path.reverse();
                    return Some(path);
                }

                queue.push_back(next);
            }
        }

        None
    }
}
