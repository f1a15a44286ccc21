//! Dependency tree rendering for `felt tree` and `felt graph -f text`.
//!
//! Trees grow downstream: a root is a fiber with no dependencies and its
//! children are the fibers that depend on it.

use std::collections::HashSet;
use std::io::{self, Write};

use felt_graph::Graph;
use serde::Serialize;

use super::color::{colored_status_icon, colorize_id, dimmed};
use super::{OutputConfig, OutputMode};
use crate::domain::Fiber;

/// Slugs longer than this are shortened in tree lines.
const SHORT_SLUG_LEN: usize = 16;

/// A fiber with its downstream subtree, for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<'a> {
    /// The fiber at this node
    #[serde(flatten)]
    pub fiber: &'a Fiber,
    /// Fibers depending on it that were not already placed elsewhere
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode<'a>>,
}

impl Drop for TreeNode<'_> {
    // Flatten before dropping so deep trees do not recurse.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Print the tree under `root`, or the whole forest when `root` is `None`.
pub fn print_tree(graph: &Graph<'_, Fiber>, root: Option<&str>, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match (mode, root) {
        (OutputMode::Text, Some(id)) => write_tree(&mut handle, graph, id, &config),
        (OutputMode::Text, None) => write_forest(&mut handle, graph, &config),
        (OutputMode::Json, Some(id)) => {
            let node = build_tree(graph, id, &mut HashSet::new());
            super::write_json(&mut handle, &node)
        }
        (OutputMode::Json, None) => super::write_json(&mut handle, &build_forest(graph)),
    }
}

/// Build the subtree under `id`, skipping fibers already in `visited`.
///
/// Children are placed in the same pre-order a recursive walk would use,
/// but the walk keeps its own stack so chain depth is not limited by the
/// thread stack.
pub fn build_tree<'a>(
    graph: &Graph<'a, Fiber>,
    id: &str,
    visited: &mut HashSet<&'a str>,
) -> Option<TreeNode<'a>> {
    let root = graph.node(id)?;
    if !visited.insert(root.id.as_str()) {
        return None;
    }

    // Nodes in visit order; a parent always precedes its children.
    let mut nodes = vec![TreeNode { fiber: root, children: Vec::new() }];
    let mut parents: Vec<usize> = vec![0];
    let mut pending: Vec<(&'a str, usize)> = sorted_children(graph, root)
        .into_iter()
        .rev()
        .map(|child| (child, 0))
        .collect();

    while let Some((child_id, parent)) = pending.pop() {
        let Some(fiber) = graph.node(child_id) else {
            continue;
        };
        if !visited.insert(fiber.id.as_str()) {
            continue;
        }
        let index = nodes.len();
        nodes.push(TreeNode { fiber, children: Vec::new() });
        parents.push(parent);
        pending.extend(sorted_children(graph, fiber).into_iter().rev().map(|c| (c, index)));
    }

    // Attach bottom-up; each node's children are complete once it is popped.
    while nodes.len() > 1 {
        let mut node = nodes.pop()?;
        node.children.reverse();
        let parent = parents[nodes.len()];
        nodes[parent].children.push(node);
    }
    let mut root = nodes.pop()?;
    root.children.reverse();
    Some(root)
}

fn sorted_children<'a>(graph: &Graph<'a, Fiber>, fiber: &Fiber) -> Vec<&'a str> {
    let mut children: Vec<&'a str> = graph.downstream(&fiber.id).iter().map(|d| d.id).collect();
    children.sort_unstable();
    children
}

/// Build one tree per root, then one per fiber no root reaches.
pub fn build_forest<'a>(graph: &Graph<'a, Fiber>) -> Vec<TreeNode<'a>> {
    let mut visited = HashSet::new();
    let mut forest: Vec<TreeNode<'a>> = graph
        .roots()
        .into_iter()
        .filter_map(|root| build_tree(graph, &root.id, &mut visited))
        .collect();

    for id in graph.sorted_ids() {
        if let Some(node) = build_tree(graph, id, &mut visited) {
            forest.push(node);
        }
    }
    forest
}

/// Render the tree under `root_id`.
///
/// ```text
/// ○ design-11111111  Design it
///     ├── ◐ build-22222222  Build it
///     │   └── ○ ship-33333333 [after]  Ship it
///     └── ○ docs-44444444  Write docs
/// ```
pub fn write_tree<W: Write>(
    w: &mut W,
    graph: &Graph<'_, Fiber>,
    root_id: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    let mut visited = HashSet::new();
    write_subtree(w, graph, root_id, &mut visited, config)
}

/// Render every root in creation order, then any fiber left unreached
/// (members of cycles have no root above them).
pub fn write_forest<W: Write>(
    w: &mut W,
    graph: &Graph<'_, Fiber>,
    config: &OutputConfig,
) -> io::Result<()> {
    let mut visited = HashSet::new();
    for root in graph.roots() {
        write_subtree(w, graph, &root.id, &mut visited, config)?;
    }

    for id in graph.sorted_ids() {
        if !visited.contains(id) {
            write_subtree(w, graph, id, &mut visited, config)?;
        }
    }
    Ok(())
}

/// A line still to be written.
struct Pending<'a> {
    id: &'a str,
    label: Option<&'a str>,
    prefix: String,
    last: bool,
}

fn write_subtree<'a, W: Write>(
    w: &mut W,
    graph: &Graph<'a, Fiber>,
    root_id: &str,
    visited: &mut HashSet<&'a str>,
    config: &OutputConfig,
) -> io::Result<()> {
    let Some(root) = graph.node(root_id) else {
        return Ok(());
    };

    let (branch, corner, pipe) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ")
    } else {
        ("├── ", "└── ", "│   ")
    };

    let mut pending = vec![Pending {
        id: root.id.as_str(),
        label: None,
        prefix: String::new(),
        last: true,
    }];

    while let Some(Pending { id, label, prefix, last }) = pending.pop() {
        let Some(fiber) = graph.node(id) else {
            continue;
        };

        let connector = match (prefix.is_empty(), last) {
            (true, _) => "",
            (false, true) => corner,
            (false, false) => branch,
        };
        let label = label.map(|l| format!(" [{l}]")).unwrap_or_default();

        write!(
            w,
            "{}{}{} {}{label}  {}",
            dimmed(&prefix, config),
            dimmed(connector, config),
            colored_status_icon(fiber.status, config),
            colorize_id(&short_id(&fiber.id), config),
            fiber.title
        )?;

        if !visited.insert(fiber.id.as_str()) {
            writeln!(w, " {}", dimmed("(see above)", config))?;
            continue;
        }
        writeln!(w)?;

        let child_prefix = match (prefix.is_empty(), last) {
            (true, _) => "    ".to_string(),
            (false, true) => format!("{prefix}    "),
            (false, false) => format!("{prefix}{pipe}"),
        };

        let mut children = graph.downstream(id).to_vec();
        children.sort_unstable_by(|a, b| a.id.cmp(b.id));
        let count = children.len();
        // Reversed, so the first child is popped next.
        for (i, child) in children.into_iter().enumerate().rev() {
            pending.push(Pending {
                id: child.id,
                label: child.label,
                prefix: child_prefix.clone(),
                last: i + 1 == count,
            });
        }
    }
    Ok(())
}

/// Shorten long slugs, keeping the hex suffix intact.
pub(crate) fn short_id(id: &str) -> String {
    let Some((slug, hex)) = id.rsplit_once('-') else {
        return id.to_string();
    };
    if slug.chars().count() <= SHORT_SLUG_LEN {
        return id.to_string();
    }
    let head: String = slug.chars().take(SHORT_SLUG_LEN).collect();
    format!("{head}...-{hex}")
}
