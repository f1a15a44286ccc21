//! Cycle detection.
//!
//! Two checks serve different purposes:
//!
//! - [`Graph::would_create_cycle`] guards a single new edge before it is
//!   persisted. It only looks at edges that already exist.
//! - [`Graph::find_cycles`] audits the whole graph and reports every cycle it
//!   meets. It never blocks anything on its own.

use crate::graph::Graph;
use crate::types::FiberRecord;
use std::collections::HashMap;
use std::fmt;

/// A dependency cycle, listed in traversal order with the first id repeated
/// at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    path: Vec<String>,
}

impl Cycle {
    /// Ids along the cycle. The first and last entries are the same fiber.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Whether `id` takes part in the cycle.
    pub fn contains(&self, id: &str) -> bool {
        self.path.iter().any(|member| member == id)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle: {}", self.path.join(" -> "))
    }
}

impl<'a, F: FiberRecord> Graph<'a, F> {
    /// Whether recording "`from` depends on `to`" would close a loop.
    ///
    /// True when `from == to`, or when `to` already reaches `from` through
    /// existing upstream edges. Call this before adding the edge.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        from == to || self.ancestors_of(to, None).iter().any(|&id| id == from)
    }

    /// Every cycle reachable by a depth-first walk over upstream edges.
    ///
    /// Roots are visited in sorted id order so output is stable. References
    /// to missing fibers are not followed. An acyclic graph yields an empty
    /// list.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut search = CycleSearch {
            graph: self,
            marks: HashMap::new(),
            path: Vec::new(),
            cycles: Vec::new(),
        };

        for id in self.sorted_ids() {
            if !search.marks.contains_key(id) {
                search.visit(id);
            }
        }

        search.cycles
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct CycleSearch<'g, 'a, F> {
    graph: &'g Graph<'a, F>,
    marks: HashMap<&'a str, Mark>,
    path: Vec<&'a str>,
    cycles: Vec<Cycle>,
}

impl<'a, F: FiberRecord> CycleSearch<'_, 'a, F> {
    /// Depth-first walk from `root` with an explicit frame stack, so chain
    /// length is bounded by the heap rather than the thread stack.
    fn visit(&mut self, root: &'a str) {
        // (fiber on the current path, index of its next dependency)
        let mut frames: Vec<(&'a str, usize)> = Vec::new();
        self.enter(root, &mut frames);

        while let Some(frame) = frames.last_mut() {
            let (id, next) = *frame;
            let Some(dep) = self.graph.upstream(id).get(next) else {
                frames.pop();
                self.path.pop();
                self.marks.insert(id, Mark::Done);
                continue;
            };
            frame.1 += 1;

            let dep_id = dep.id();
            if !self.graph.contains(dep_id) {
                continue;
            }
            match self.marks.get(dep_id).copied() {
                Some(Mark::Done) => {}
                Some(Mark::InProgress) => self.record_cycle(dep_id),
                None => self.enter(dep_id, &mut frames),
            }
        }
    }

    fn enter(&mut self, id: &'a str, frames: &mut Vec<(&'a str, usize)>) {
        self.marks.insert(id, Mark::InProgress);
        self.path.push(id);
        frames.push((id, 0));
    }

    /// The cycle is the path suffix from the first occurrence of `id`.
    fn record_cycle(&mut self, id: &str) {
        if let Some(start) = self.path.iter().position(|&p| p == id) {
            let mut path: Vec<String> =
                self.path[start..].iter().map(|p| (*p).to_string()).collect();
            path.push(id.to_string());
            self.cycles.push(Cycle { path });
        }
    }
}
