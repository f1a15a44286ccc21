//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or, with `--json`, pretty
//! JSON for scripting.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, status icons)
//! - [`detail`]: Progressive detail levels for neighbour listings
//! - [`diagram`]: Mermaid and Graphviz DOT export
//! - [`tree`]: Downstream tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod detail;
pub mod diagram;
pub mod tree;

use crate::cli::DetailLevel;
use crate::domain::{DEFAULT_KIND, Fiber};
use chrono::Local;
use felt_graph::Graph;
use serde::Serialize;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use tree::{TreeNode, print_tree};

use color::{colored_status_icon, colorize_id, colorize_status, colorize_tags, dimmed};
use detail::{EdgeRef, TIMESTAMP_FORMAT, format_deps};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons and connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` from environment variables.
    ///
    /// Reads:
    /// - `FELT_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `FELT_ASCII`: Set to "1" or "true" for ASCII-only output (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `FELT_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`OutputConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_width = match lookup("FELT_MAX_WIDTH") {
            Some(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "FELT_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("FELT_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "FELT_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/ first, FELT_COLOR for explicit control
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("FELT_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| w.0)
        .into()
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{json}")
}

/// Print fibers in two-line list form, or `empty` when there are none.
pub fn print_fibers(fibers: &[&Fiber], empty: &str, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Json => write_json(&mut handle, fibers),
        OutputMode::Text if fibers.is_empty() => writeln!(handle, "{empty}"),
        OutputMode::Text => write_fiber_list(&mut handle, fibers, &config),
    }
}

/// Print everything known about one fiber (the `show` command).
pub fn print_fiber_details(
    fiber: &Fiber,
    graph: &Graph<'_, Fiber>,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Json => write_json(&mut handle, fiber),
        OutputMode::Text => {
            let width = get_terminal_width().min(config.max_width);
            write_fiber_details(&mut handle, fiber, graph, width, &config)
        }
    }
}

/// Print upstream or downstream neighbours of a fiber.
///
/// Each entry carries the label of the edge that connects it, if any. With
/// `level` set, entries render through [`detail::write_fibers_at_level`].
pub fn print_neighbours(
    related: &[(&Fiber, Option<&str>)],
    graph: &Graph<'_, Fiber>,
    level: Option<DetailLevel>,
    empty: &str,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    if mode == OutputMode::Json {
        let fibers: Vec<&Fiber> = related.iter().map(|(f, _)| *f).collect();
        return write_json(&mut handle, &fibers);
    }
    if related.is_empty() {
        return writeln!(handle, "{empty}");
    }

    match level {
        Some(level) => {
            let fibers: Vec<&Fiber> = related.iter().map(|(f, _)| *f).collect();
            detail::write_fibers_at_level(&mut handle, &fibers, graph, level)
        }
        None => write_neighbour_lines(&mut handle, related, &config),
    }
}

/// Print a dependency path, marking its starting fiber.
pub fn print_path(path: &[&Fiber], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Json => {
            let ids: Vec<&str> = path.iter().map(|f| f.id.as_str()).collect();
            write_json(&mut handle, &ids)
        }
        OutputMode::Text => write_path(&mut handle, path, &config),
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

/// Two lines per fiber: icon and id, then the indented title with tags and
/// dependency count.
fn write_fiber_list<W: Write>(w: &mut W, fibers: &[&Fiber], config: &OutputConfig) -> io::Result<()> {
    for fiber in fibers {
        writeln!(
            w,
            "{} {}",
            colored_status_icon(fiber.status, config),
            colorize_id(&fiber.id, config)
        )?;

        let mut meta = Vec::new();
        if !fiber.tags.is_empty() {
            meta.push(colorize_tags(&fiber.tags, config));
        }
        if !fiber.depends_on.is_empty() {
            meta.push(format!("{} deps", fiber.depends_on.len()));
        }
        if meta.is_empty() {
            writeln!(w, "    {}", fiber.title)?;
        } else {
            writeln!(w, "    {} ({})", fiber.title, meta.join(", "))?;
        }
    }
    Ok(())
}

fn write_fiber_details<W: Write>(
    w: &mut W,
    fiber: &Fiber,
    graph: &Graph<'_, Fiber>,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    let mut field = |label: &str, value: &str| write_field(w, label, value, config);

    field("ID:", &colorize_id(&fiber.id, config))?;
    field("Title:", &fiber.title)?;
    field("Status:", &colorize_status(fiber.status, config))?;
    if fiber.kind != DEFAULT_KIND {
        field("Kind:", &fiber.kind)?;
    }
    if !fiber.tags.is_empty() {
        field("Tags:", &colorize_tags(&fiber.tags, config))?;
    }
    field("Priority:", &fiber.priority.to_string())?;

    if !fiber.depends_on.is_empty() {
        let upstream: Vec<EdgeRef<'_>> = fiber.depends_on.iter().map(EdgeRef::from).collect();
        field("Upstream:", &format_deps(&upstream, Some(graph)))?;
    }
    let downstream: Vec<EdgeRef<'_>> = graph.downstream(&fiber.id).iter().map(EdgeRef::from).collect();
    if !downstream.is_empty() {
        field("Downstream:", &format_deps(&downstream, Some(graph)))?;
    }

    if let Some(due) = fiber.due {
        field("Due:", &due.to_string())?;
    }
    field(
        "Created:",
        &fiber.created_at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    )?;
    if let Some(closed_at) = fiber.closed_at {
        field(
            "Closed:",
            &closed_at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        )?;
    }
    if !fiber.close_reason.is_empty() {
        field("Reason:", &fiber.close_reason)?;
    }
    if !fiber.outcome.is_empty() {
        field("Outcome:", &fiber.outcome)?;
    }

    if !fiber.body.is_empty() {
        writeln!(w)?;
        for line in wrap_text(&fiber.body, width) {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

/// `label` padded so values line up, dimmed like the other field names.
fn write_field<W: Write>(w: &mut W, label: &str, value: &str, config: &OutputConfig) -> io::Result<()> {
    writeln!(w, "{}{value}", dimmed(&format!("{label:<9} "), config))
}

fn write_neighbour_lines<W: Write>(
    w: &mut W,
    related: &[(&Fiber, Option<&str>)],
    config: &OutputConfig,
) -> io::Result<()> {
    for (fiber, label) in related {
        let label = label.map(|l| format!(" [{l}]")).unwrap_or_default();
        writeln!(
            w,
            "{} {}  {}{}",
            colored_status_icon(fiber.status, config),
            colorize_id(&fiber.id, config),
            fiber.title,
            dimmed(&label, config)
        )?;
    }
    Ok(())
}

fn write_path<W: Write>(w: &mut W, path: &[&Fiber], config: &OutputConfig) -> io::Result<()> {
    for (i, fiber) in path.iter().enumerate() {
        let marker = if i == 0 { "→ " } else { "  " };
        writeln!(
            w,
            "{marker}{} {}  {}",
            colored_status_icon(fiber.status, config),
            colorize_id(&fiber.id, config),
            fiber.title
        )?;
    }
    Ok(())
}

/// Wrap text to fit within a given width, preserving existing line breaks.
/// Uses textwrap to handle edge cases like long words (URLs, file paths).
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{fiber, fiber_with_deps};
    use colored::control::set_override;
    use felt_graph::{Dependency, Status};
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    // colored's set_override() is process-global
    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    /// RAII guard that enables colors via `set_override` and resets on drop.
    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false, false)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    // ========== OutputConfig Tests ==========

    #[test]
    fn test_output_config_defaults() {
        let config = OutputConfig::from_lookup(env(&[]));
        assert_eq!(config, OutputConfig::default());
    }

    #[test]
    fn test_output_config_from_lookup() {
        let config = OutputConfig::from_lookup(env(&[("FELT_MAX_WIDTH", "120"), ("FELT_ASCII", "1")]));
        assert_eq!(config.max_width, 120);
        assert!(config.use_ascii);
        assert!(config.use_colors);

        let config =
            OutputConfig::from_lookup(env(&[("FELT_MAX_WIDTH", "invalid"), ("FELT_ASCII", "maybe")]));
        assert_eq!(config.max_width, DEFAULT_MAX_CONTENT_WIDTH);
        assert!(!config.use_ascii);
    }

    #[test]
    fn test_output_config_color_switches() {
        assert!(!OutputConfig::from_lookup(env(&[("NO_COLOR", "")])).use_colors);
        assert!(!OutputConfig::from_lookup(env(&[("FELT_COLOR", "0")])).use_colors);
        assert!(!OutputConfig::from_lookup(env(&[("FELT_COLOR", "FALSE")])).use_colors);
        assert!(OutputConfig::from_lookup(env(&[("FELT_COLOR", "1")])).use_colors);
    }

    // ========== Wrapping Tests ==========

    #[test]
    fn test_wrap_text() {
        let wrapped = wrap_text("This is a test of text wrapping functionality", 20);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|line| line.len() <= 20));
    }

    #[test]
    fn test_wrap_text_preserves_blank_lines() {
        let wrapped = wrap_text("Para one\n\nPara two", 50);
        assert_eq!(wrapped, vec!["Para one", "", "Para two"]);
    }

    // ========== List Tests ==========

    #[test]
    fn test_fiber_list_two_line_format() {
        let mut a = fiber("a-11111111", "Write docs", Some(Status::Open), 0);
        a.tags = vec!["docs".to_string()];
        let b = fiber_with_deps("b-22222222", Some(Status::Active), 1, &["a-11111111", "c"]);
        let c = fiber("c-33333333", "Plain", None, 2);

        let mut buf = Vec::new();
        write_fiber_list(&mut buf, &[&a, &b, &c], &plain()).unwrap();

        assert_eq!(
            to_string(buf),
            "○ a-11111111\n    Write docs (docs)\n\
             ◐ b-22222222\n    Title of b-22222222 (2 deps)\n\
             · c-33333333\n    Plain\n"
        );
    }

    #[test]
    fn test_fiber_list_with_colors() {
        let _guard = ColorGuard::new();
        let a = fiber("a-11111111", "Write docs", Some(Status::Closed), 0);

        let mut buf = Vec::new();
        write_fiber_list(&mut buf, &[&a], &OutputConfig::default()).unwrap();

        let out = to_string(buf);
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("Write docs"));
    }

    // ========== Details Tests ==========

    #[test]
    fn test_fiber_details() {
        let upstream = fiber("design-11111111", "Design", Some(Status::Closed), 0);
        let mut target = fiber("build-22222222", "Build", Some(Status::Closed), 1);
        target.depends_on.push(Dependency::with_label("design-11111111", "spec"));
        target.kind = "spec".to_string();
        target.close_reason = "done".to_string();
        target.closed_at = Some(target.created_at);
        target.body = "Body line".to_string();
        let downstream = fiber_with_deps("ship-33333333", Some(Status::Open), 2, &["build-22222222"]);
        let fibers = vec![upstream, target.clone(), downstream];
        let graph = Graph::build(&fibers);

        let mut buf = Vec::new();
        write_fiber_details(&mut buf, &target, &graph, 80, &plain()).unwrap();
        let out = to_string(buf);

        assert!(out.starts_with("ID:       build-22222222\nTitle:    Build\nStatus:   closed\nKind:     spec\nPriority: 2\n"));
        assert!(out.contains("Upstream: design-11111111 [spec] (Design)\n"));
        assert!(out.contains("Downstream: ship-33333333 (Title of ship-33333333)\n"));
        assert!(out.contains("Closed:   "));
        assert!(out.contains("Reason:   done\n"));
        assert!(out.ends_with("\nBody line\n"));
    }

    #[test]
    fn test_fiber_details_untracked_default_kind() {
        let f = fiber("note-11111111", "Note", None, 0);
        let fibers = vec![f.clone()];
        let graph = Graph::build(&fibers);

        let mut buf = Vec::new();
        write_fiber_details(&mut buf, &f, &graph, 80, &plain()).unwrap();
        let out = to_string(buf);

        assert!(out.contains("Status:   untracked\n"));
        assert!(!out.contains("Kind:"));
        assert!(!out.contains("Upstream:"));
    }

    // ========== Neighbour / Path Tests ==========

    #[test]
    fn test_neighbour_lines_show_labels() {
        let a = fiber("a-11111111", "A", Some(Status::Open), 0);
        let b = fiber("b-22222222", "B", Some(Status::Closed), 1);

        let mut buf = Vec::new();
        write_neighbour_lines(&mut buf, &[(&a, Some("needs")), (&b, None)], &plain()).unwrap();

        assert_eq!(to_string(buf), "○ a-11111111  A [needs]\n● b-22222222  B\n");
    }

    #[test]
    fn test_path_marks_start() {
        let a = fiber("a", "A", Some(Status::Open), 0);
        let b = fiber("b", "B", Some(Status::Active), 1);

        let mut buf = Vec::new();
        write_path(&mut buf, &[&a, &b], &OutputConfig::new(80, true, false)).unwrap();

        assert_eq!(to_string(buf), "→ o a  A\n  > b  B\n");
    }
}
