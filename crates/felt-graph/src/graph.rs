//! Graph construction and adjacency lookups.
//!
//! # Edge Direction Convention
//!
//! - **Upstream**: what a fiber depends on. `upstream(b)` containing `a`
//!   means "b depends on a".
//! - **Downstream**: the computed inverse. `downstream(a)` then contains `b`
//!   with the same label.
//!
//! Ids referenced by a dependency but absent from the node set still get a
//! `downstream` entry. Nothing is validated at build time; see
//! [`Graph::validate_dependencies`] and [`Graph::find_cycles`].

use crate::types::{Dependency, FiberRecord};
use std::collections::HashMap;
use tracing::debug;

/// A downstream entry: the fiber `id` depends on the fiber the entry is
/// filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependent<'a> {
    /// Id of the dependent fiber
    pub id: &'a str,
    /// Label carried over from the dependent's upstream edge
    pub label: Option<&'a str>,
}

/// Dependency graph over a borrowed set of fibers.
///
/// Built fresh for each logical operation with [`Graph::build`] and discarded
/// afterwards. All queries are read-only.
#[derive(Debug)]
pub struct Graph<'a, F> {
    nodes: HashMap<&'a str, &'a F>,
    /// Node ids in first-seen input order.
    order: Vec<&'a str>,
    upstream: HashMap<&'a str, &'a [Dependency]>,
    downstream: HashMap<&'a str, Vec<Dependent<'a>>>,
}

impl<'a, F: FiberRecord> Graph<'a, F> {
    /// Build a graph from any collection of fibers.
    ///
    /// A fiber whose id was already seen replaces the earlier one.
    pub fn build<I>(fibers: I) -> Self
    where
        I: IntoIterator<Item = &'a F>,
    {
        let mut nodes = HashMap::new();
        let mut order = Vec::new();
        let mut upstream = HashMap::new();

        // First pass: index all nodes
        for fiber in fibers {
            let id = fiber.id();
            if nodes.insert(id, fiber).is_none() {
                order.push(id);
            }
            upstream.insert(id, fiber.dependencies());
        }

        // Second pass: compute downstream (reverse edges)
        let mut downstream: HashMap<&'a str, Vec<Dependent<'a>>> = HashMap::new();
        let mut edge_count = 0;
        for &id in &order {
            let deps: &'a [Dependency] = upstream.get(id).copied().unwrap_or_default();
            for dep in deps {
                downstream.entry(dep.id()).or_default().push(Dependent {
                    id,
                    label: dep.label(),
                });
                edge_count += 1;
            }
        }

        debug!(nodes = order.len(), edges = edge_count, "Built dependency graph");

        Self {
            nodes,
            order,
            upstream,
            downstream,
        }
    }

    /// Look up a fiber by exact id.
    pub fn node(&self, id: &str) -> Option<&'a F> {
        self.nodes.get(id).copied()
    }

    /// Whether a fiber with this id is part of the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All fibers, in the order they were first supplied.
    pub fn nodes(&self) -> impl Iterator<Item = &'a F> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id).copied())
    }

    /// All node ids sorted lexicographically.
    pub fn sorted_ids(&self) -> Vec<&'a str> {
        let mut ids = self.order.clone();
        ids.sort_unstable();
        ids
    }

    /// Number of fibers in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no fibers.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Direct dependencies of `id`. Empty for unknown ids.
    pub fn upstream(&self, id: &str) -> &'a [Dependency] {
        self.upstream.get(id).copied().unwrap_or_default()
    }

    /// Direct dependents of `id`. Empty for ids nothing depends on.
    pub fn downstream(&self, id: &str) -> &[Dependent<'a>] {
        self.downstream.get(id).map_or(&[], Vec::as_slice)
    }

    /// Label on the edge "`dependent_id` depends on `dependency_id`", if
    /// such an edge exists and carries one.
    pub fn edge_label(&self, dependency_id: &str, dependent_id: &str) -> Option<&'a str> {
        self.upstream(dependent_id)
            .iter()
            .find(|dep| dep.id() == dependency_id)
            .and_then(Dependency::label)
    }

    /// Fibers with no dependencies, sorted by creation time.
    pub fn roots(&self) -> Vec<&'a F> {
        let mut roots: Vec<&'a F> = self
            .nodes()
            .filter(|fiber| self.upstream(fiber.id()).is_empty())
            .collect();
        roots.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        roots
    }
}
