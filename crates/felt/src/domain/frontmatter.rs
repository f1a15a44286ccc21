//! Markdown-with-frontmatter codec for fiber files.
//!
//! ```text
//! ---
//! title: Fix login
//! status: open
//! kind: task
//! priority: 2
//! depends-on:
//! - design-3fa85f64
//! - id: schema-0badf00d
//!   label: needs the new table
//! created-at: 2025-01-15T10:30:00Z
//! ---
//!
//! Body text.
//! ```

use super::{DEFAULT_KIND, DEFAULT_PRIORITY, Fiber};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use felt_graph::{Dependency, Status};
use serde::{Deserialize, Deserializer, Serialize};

const DELIMITER: &str = "---";

/// Field order here is the order written to disk.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Frontmatter {
    #[serde(default)]
    title: String,

    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    status: Option<Status>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,

    #[serde(default = "default_priority")]
    priority: u8,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<Dependency>,

    #[serde(default)]
    created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    close_reason: String,

    #[serde(
        default,
        deserialize_with = "deserialize_due",
        skip_serializing_if = "Option::is_none"
    )]
    due: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    outcome: String,
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

/// An empty or missing status means untracked.
fn deserialize_status<'de, D>(deserializer: D) -> std::result::Result<Option<Status>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("open") => Ok(Some(Status::Open)),
        Some("active") => Ok(Some(Status::Active)),
        Some("closed") => Ok(Some(Status::Closed)),
        Some(other) => Err(serde::de::Error::unknown_variant(
            other,
            &["open", "active", "closed"],
        )),
    }
}

/// Accepts a plain date or a full RFC 3339 timestamp.
fn deserialize_due<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Split file content into the frontmatter block and the trimmed body.
fn split(content: &str) -> Result<(String, String)> {
    let mut lines = content.lines();

    let Some(first) = lines.next() else {
        return Err(Error::Frontmatter("empty file".to_string()));
    };
    if first.trim() != DELIMITER {
        return Err(Error::Frontmatter("file must start with ---".to_string()));
    }

    let mut yaml = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim() == DELIMITER {
            closed = true;
            break;
        }
        yaml.push_str(line);
        yaml.push('\n');
    }

    if !closed {
        return Err(Error::Frontmatter(
            "unclosed frontmatter (missing closing ---)".to_string(),
        ));
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    Ok((yaml, body.trim().to_string()))
}

/// Parse a fiber file. `id` comes from the file name.
///
/// # Errors
///
/// Returns [`Error::Frontmatter`] when the delimiters are missing or the
/// YAML does not describe a fiber.
pub fn parse(id: &str, content: &str) -> Result<Fiber> {
    let (yaml, body) = split(content)?;
    let yaml = if yaml.trim().is_empty() { "{}" } else { yaml.as_str() };

    let fm: Frontmatter = serde_yaml::from_str(yaml)
        .map_err(|e| Error::Frontmatter(format!("parsing YAML frontmatter: {e}")))?;

    Ok(Fiber {
        id: id.to_string(),
        title: fm.title,
        status: fm.status,
        kind: if fm.kind.is_empty() {
            DEFAULT_KIND.to_string()
        } else {
            fm.kind
        },
        tags: fm.tags,
        priority: fm.priority,
        depends_on: fm.depends_on,
        created_at: fm.created_at,
        closed_at: fm.closed_at,
        close_reason: fm.close_reason,
        due: fm.due,
        outcome: fm.outcome,
        body,
        modified_at: None,
    })
}

/// Serialize a fiber to file content.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if serialization fails.
pub fn render(fiber: &Fiber) -> Result<String> {
    let fm = Frontmatter {
        title: fiber.title.clone(),
        status: fiber.status,
        kind: fiber.kind.clone(),
        tags: fiber.tags.clone(),
        priority: fiber.priority,
        depends_on: fiber.depends_on.clone(),
        created_at: fiber.created_at,
        closed_at: fiber.closed_at,
        close_reason: fiber.close_reason.clone(),
        due: fiber.due,
        outcome: fiber.outcome.clone(),
    };

    let yaml = serde_yaml::to_string(&fm)?;
    let mut out = format!("{DELIMITER}\n{yaml}{DELIMITER}\n");
    if !fiber.body.is_empty() {
        out.push('\n');
        out.push_str(&fiber.body);
        out.push('\n');
    }
    Ok(out)
}
