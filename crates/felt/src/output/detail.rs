//! Progressive-disclosure rendering for `upstream` / `downstream`.
//!
//! Each [`DetailLevel`] shows strictly more than the one before it:
//! `title` is one line, `compact` adds the header block and dependency ids,
//! `summary` adds dependency titles and the opening paragraph of the body,
//! `full` prints everything.

use crate::cli::DetailLevel;
use crate::domain::Fiber;
use felt_graph::{Dependency, Dependent, Graph};
use std::io::{self, Write};

/// Dependency titles are cut to this many characters in listings.
const DEP_TITLE_WIDTH: usize = 30;

/// Timestamp layout used by `show` and the `full` level.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Either end of an edge, with the label it carries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeRef<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
}

impl<'a> From<&'a Dependency> for EdgeRef<'a> {
    fn from(dep: &'a Dependency) -> Self {
        Self {
            id: dep.id(),
            label: dep.label(),
        }
    }
}

impl<'a> From<&Dependent<'a>> for EdgeRef<'a> {
    fn from(dep: &Dependent<'a>) -> Self {
        Self {
            id: dep.id,
            label: dep.label,
        }
    }
}

/// Write each fiber at `level`, separating multi-line entries with a blank
/// line.
pub fn write_fibers_at_level<W: Write>(
    w: &mut W,
    fibers: &[&Fiber],
    graph: &Graph<'_, Fiber>,
    level: DetailLevel,
) -> io::Result<()> {
    for (i, fiber) in fibers.iter().enumerate() {
        write_at_level(w, fiber, graph, level)?;
        if level != DetailLevel::Title && i + 1 < fibers.len() {
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Write a single fiber at `level`.
pub fn write_at_level<W: Write>(
    w: &mut W,
    fiber: &Fiber,
    graph: &Graph<'_, Fiber>,
    level: DetailLevel,
) -> io::Result<()> {
    match level {
        DetailLevel::Title => {
            if fiber.tags.is_empty() {
                writeln!(w, "{}", fiber.title)
            } else {
                writeln!(w, "{} ({})", fiber.title, fiber.tags.join(", "))
            }
        }
        DetailLevel::Compact => {
            write_header(w, fiber)?;
            if !fiber.outcome.is_empty() {
                writeln!(w, "Outcome:  {}", fiber.outcome)?;
            }
            write_deps(w, fiber, graph, false)
        }
        DetailLevel::Summary => {
            write_header(w, fiber)?;
            if let Some(due) = fiber.due {
                writeln!(w, "Due:      {due}")?;
            }
            if !fiber.outcome.is_empty() {
                writeln!(w, "Outcome:  {}", fiber.outcome)?;
            }
            write_deps(w, fiber, graph, true)?;
            if !fiber.body.is_empty() {
                let lede = extract_lede(&fiber.body);
                writeln!(w, "\n{lede}")?;
                let remaining = fiber.body.len().saturating_sub(lede.len());
                if remaining > 0 {
                    writeln!(w, "[... {remaining} more chars]")?;
                }
            }
            Ok(())
        }
        DetailLevel::Full => {
            write_header(w, fiber)?;
            write_deps(w, fiber, graph, true)?;
            if let Some(due) = fiber.due {
                writeln!(w, "Due:      {due}")?;
            }
            writeln!(
                w,
                "Created:  {}",
                fiber.created_at.with_timezone(&chrono::Local).format(TIMESTAMP_FORMAT)
            )?;
            if let Some(closed_at) = fiber.closed_at {
                writeln!(
                    w,
                    "Closed:   {}",
                    closed_at.with_timezone(&chrono::Local).format(TIMESTAMP_FORMAT)
                )?;
            }
            if !fiber.outcome.is_empty() {
                writeln!(w, "Outcome:  {}", fiber.outcome)?;
            }
            if !fiber.body.is_empty() {
                writeln!(w, "\n{}", fiber.body)?;
            }
            Ok(())
        }
    }
}

fn write_header<W: Write>(w: &mut W, fiber: &Fiber) -> io::Result<()> {
    writeln!(w, "ID:       {}", fiber.id)?;
    writeln!(w, "Title:    {}", fiber.title)?;
    if let Some(status) = fiber.status {
        writeln!(w, "Status:   {status}")?;
    }
    if !fiber.tags.is_empty() {
        writeln!(w, "Tags:     {}", fiber.tags.join(", "))?;
    }
    Ok(())
}

fn write_deps<W: Write>(
    w: &mut W,
    fiber: &Fiber,
    graph: &Graph<'_, Fiber>,
    with_titles: bool,
) -> io::Result<()> {
    let titles = with_titles.then_some(graph);
    if !fiber.depends_on.is_empty() {
        let upstream: Vec<EdgeRef<'_>> = fiber.depends_on.iter().map(EdgeRef::from).collect();
        writeln!(w, "Upstream: {}", format_deps(&upstream, titles))?;
    }
    let downstream: Vec<EdgeRef<'_>> = graph.downstream(&fiber.id).iter().map(EdgeRef::from).collect();
    if !downstream.is_empty() {
        writeln!(w, "Downstream: {}", format_deps(&downstream, titles))?;
    }
    Ok(())
}

/// One dependency inline, several as an indented bullet list. Titles are
/// looked up in `titles` when given.
pub(crate) fn format_deps(deps: &[EdgeRef<'_>], titles: Option<&Graph<'_, Fiber>>) -> String {
    let format_one = |dep: &EdgeRef<'_>| {
        let label = dep.label.map(|l| format!(" [{l}]")).unwrap_or_default();
        match titles.and_then(|g| g.node(dep.id)) {
            Some(fiber) => format!(
                "{}{label} ({})",
                dep.id,
                truncate_title(&fiber.title, DEP_TITLE_WIDTH)
            ),
            None => format!("{}{label}", dep.id),
        }
    };

    match deps {
        [] => String::new(),
        [single] => format_one(single),
        many => many
            .iter()
            .map(|dep| format!("\n  - {}", format_one(dep)))
            .collect(),
    }
}

/// Cut `title` to `max` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// First substantive paragraph of a body.
///
/// A leading `# ` heading repeats the title and is skipped; the first section
/// heading, if any, is kept together with the paragraph under it.
pub(crate) fn extract_lede(body: &str) -> String {
    let mut lede: Vec<&str> = Vec::new();
    let mut in_paragraph = false;

    for line in body.lines() {
        let trimmed = line.trim();

        if lede.is_empty() && trimmed.is_empty() {
            continue;
        }
        if lede.is_empty() && trimmed.starts_with("# ") {
            continue;
        }
        if trimmed.starts_with('#') {
            if in_paragraph {
                break;
            }
            lede.push(line);
            continue;
        }
        if trimmed.is_empty() {
            if in_paragraph {
                break;
            }
            continue;
        }

        in_paragraph = true;
        lede.push(line);
    }

    lede.join("\n")
}
