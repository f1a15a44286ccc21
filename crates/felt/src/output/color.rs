//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Closed: green   (closed status, `Graph OK`)
//!   - Active:         yellow  (active status)
//!   - Error:          red     (`ERROR:` lines)
//!   - Reference:      cyan    (fiber IDs)
//!   - Accent:         magenta (tags)
//!   - Muted:          dimmed  (field labels, connectors, untracked)

use colored::Colorize;
use felt_graph::Status;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Status icon, with ASCII fallback.
pub fn status_icon(status: Option<Status>, config: &OutputConfig) -> &'static str {
    match (status, config.use_ascii) {
        (Some(Status::Open), false) => "○",
        (Some(Status::Active), false) => "◐",
        (Some(Status::Closed), false) => "●",
        (None, false) => "·",
        (Some(Status::Open), true) => "o",
        (Some(Status::Active), true) => ">",
        (Some(Status::Closed), true) => "+",
        (None, true) => ".",
    }
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: Option<Status>, config: &OutputConfig) -> String {
    let icon = status_icon(status, config);
    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        Some(Status::Open) => icon.white().to_string(),
        Some(Status::Active) => icon.yellow().to_string(),
        Some(Status::Closed) => icon.green().to_string(),
        None => icon.dimmed().to_string(),
    }
}

/// Status name, `untracked` when absent.
pub(crate) fn colorize_status(status: Option<Status>, config: &OutputConfig) -> String {
    let text = status.map_or("untracked", Status::as_str);
    if !config.use_colors {
        return text.to_string();
    }
    match status {
        Some(Status::Open) => text.white().to_string(),
        Some(Status::Active) => text.yellow().to_string(),
        Some(Status::Closed) => text.green().to_string(),
        None => text.dimmed().to_string(),
    }
}

/// Colorize a fiber ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize tags (magenta).
pub(crate) fn colorize_tags(tags: &[String], config: &OutputConfig) -> String {
    let text = tags.join(", ");
    if !config.use_colors || text.is_empty() {
        return text;
    }
    text.magenta().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}
