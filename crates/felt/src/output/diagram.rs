//! Mermaid and Graphviz DOT export for `felt graph`.
//!
//! Edges point from dependency to dependent, so a diagram reads in the
//! order work has to happen. Nodes and edges are emitted in id order.

use felt_graph::{Graph, Status};

use crate::domain::Fiber;

/// Mermaid class names paired with the status they group.
const MERMAID_CLASSES: [(Option<Status>, &str); 4] = [
    (None, "untracked"),
    (Some(Status::Open), "open"),
    (Some(Status::Active), "active"),
    (Some(Status::Closed), "closed"),
];

const MERMAID_CLASS_DEFS: &str = "\n    classDef untracked fill:#f5f5f5,stroke:#999\n    classDef open fill:#fff,stroke:#333\n    classDef active fill:#ffd,stroke:#333\n    classDef closed fill:#dfd,stroke:#333\n";

/// Render the graph as a Mermaid flowchart.
pub fn to_mermaid(graph: &Graph<'_, Fiber>) -> String {
    let ids = graph.sorted_ids();
    let mut out = String::from("graph TD\n");

    for &id in &ids {
        if let Some(fiber) = graph.node(id) {
            out.push_str(&format!(
                "    {}[\"{}\"]\n",
                mermaid_id(id),
                escape_mermaid(&fiber.title)
            ));
        }
    }

    out.push('\n');
    for &id in &ids {
        for dep in graph.upstream(id) {
            let edge = match dep.label() {
                Some(label) => format!(
                    "    {} -->|{}| {}\n",
                    mermaid_id(dep.id()),
                    escape_mermaid(label),
                    mermaid_id(id)
                ),
                None => format!("    {} --> {}\n", mermaid_id(dep.id()), mermaid_id(id)),
            };
            out.push_str(&edge);
        }
    }

    out.push('\n');
    for (status, class) in MERMAID_CLASSES {
        let members: Vec<String> = ids
            .iter()
            .filter(|&&id| graph.node(id).is_some_and(|f| f.status == status))
            .map(|id| mermaid_id(id))
            .collect();
        if !members.is_empty() {
            out.push_str(&format!("    class {} {class}\n", members.join(",")));
        }
    }

    out.push_str(MERMAID_CLASS_DEFS);
    out
}

/// Render the graph in Graphviz DOT format.
pub fn to_dot(graph: &Graph<'_, Fiber>) -> String {
    let ids = graph.sorted_ids();
    let mut out = String::from("digraph felt {\n    rankdir=BT;\n    node [shape=box];\n\n");

    for &id in &ids {
        let Some(fiber) = graph.node(id) else {
            continue;
        };
        let fill = match fiber.status {
            Some(Status::Active) => ",style=filled,fillcolor=lightyellow",
            Some(Status::Closed) => ",style=filled,fillcolor=lightgreen",
            None => ",style=filled,fillcolor=whitesmoke",
            Some(Status::Open) => "",
        };
        out.push_str(&format!(
            "    \"{}\" [label=\"{}\"{fill}];\n",
            escape_dot(id),
            escape_dot(&fiber.title)
        ));
    }

    out.push('\n');
    for &id in &ids {
        for dep in graph.upstream(id) {
            let edge = match dep.label() {
                Some(label) => format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    escape_dot(dep.id()),
                    escape_dot(id),
                    escape_dot(label)
                ),
                None => format!("    \"{}\" -> \"{}\";\n", escape_dot(dep.id()), escape_dot(id)),
            };
            out.push_str(&edge);
        }
    }

    out.push_str("}\n");
    out
}

/// Mermaid node ids cannot contain `-`.
fn mermaid_id(id: &str) -> String {
    id.replace('-', "_")
}

fn escape_mermaid(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
