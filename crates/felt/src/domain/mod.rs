//! Domain types for fibers.
//!
//! A [`Fiber`] is one markdown file under `.felt/`: YAML frontmatter with the
//! structured fields, then a free-form markdown body. The graph engine only
//! sees it through [`FiberRecord`].

mod filter;
mod frontmatter;

pub use filter::{FiberFilter, StatusGate, TextMatch};
pub use frontmatter::{parse, render};

use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use felt_graph::{Dependency, FiberRecord, Status};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Kind assigned when none is given
pub const DEFAULT_KIND: &str = "task";

/// Priority assigned when none is given (0 = most urgent, 4 = least)
pub const DEFAULT_PRIORITY: u8 = 2;

/// Highest accepted priority value
pub const MAX_PRIORITY: u8 = 4;

/// Heading under which comments are collected
pub const COMMENTS_HEADING: &str = "## Comments";

static LEADING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+)\]\s*").unwrap_or_else(|e| unreachable!("{e}"))
});

/// A single tracked item: a task, a note, a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fiber {
    /// Unique identifier, taken from the file name
    pub id: String,

    /// One-line title
    pub title: String,

    /// Lifecycle status; `None` means untracked
    pub status: Option<Status>,

    /// Free-form kind such as `task`, `spec` or `decision`
    pub kind: String,

    /// Tags in insertion order, no duplicates
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Priority level (0 = highest, 4 = lowest)
    pub priority: u8,

    /// Upstream dependencies in insertion order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Dependency>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// When the fiber was closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Why the fiber was closed
    #[serde(skip_serializing_if = "String::is_empty")]
    pub close_reason: String,

    /// Due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,

    /// The conclusion reached, once there is one
    #[serde(skip_serializing_if = "String::is_empty")]
    pub outcome: String,

    /// Markdown body
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// Last modification time of the backing file
    #[serde(skip)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Fiber {
    /// Create an open fiber with default kind and priority.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the trimmed title is empty.
    pub fn new(id: impl Into<String>, title: &str, created_at: DateTime<Utc>) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }

        Ok(Self {
            id: id.into(),
            title: title.to_string(),
            status: Some(Status::Open),
            kind: DEFAULT_KIND.to_string(),
            tags: Vec::new(),
            priority: DEFAULT_PRIORITY,
            depends_on: Vec::new(),
            created_at,
            closed_at: None,
            close_reason: String::new(),
            due: None,
            outcome: String::new(),
            body: String::new(),
            modified_at: None,
        })
    }

    /// Whether the fiber is closed.
    pub fn is_closed(&self) -> bool {
        self.status == Some(Status::Closed)
    }

    /// Whether the fiber carries exactly `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Tag filter semantics: a pattern ending in `:` matches any tag that
    /// starts with it, anything else must match exactly.
    pub fn matches_tag(&self, pattern: &str) -> bool {
        if pattern.ends_with(':') {
            self.tags.iter().any(|t| t.starts_with(pattern))
        } else {
            self.has_tag(pattern)
        }
    }

    /// Add `tag` unless present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove `tag` if present. Returns whether it was removed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Whether a dependency on `id` is already recorded.
    pub fn depends_on_id(&self, id: &str) -> bool {
        self.depends_on.iter().any(|dep| dep.id() == id)
    }

    /// Whether `query` identifies this fiber: exact id, id prefix, or a
    /// prefix of the hex suffix after the last `-`.
    pub fn matches_id(&self, query: &str) -> bool {
        if self.id.starts_with(query) {
            return true;
        }

        self.id
            .rsplit_once('-')
            .is_some_and(|(_, suffix)| suffix.starts_with(query))
    }

    /// Append a timestamped entry under the comments heading, creating the
    /// heading on first use.
    pub fn append_comment(&mut self, text: &str, at: DateTime<Local>) {
        if !self.body.contains(COMMENTS_HEADING) {
            if !self.body.is_empty() {
                self.body.push('\n');
            }
            self.body.push('\n');
            self.body.push_str(COMMENTS_HEADING);
        }

        let timestamp = at.format("%Y-%m-%d %H:%M");
        self.body.push_str(&format!("\n**{timestamp}** — {text}\n"));
    }
}

impl FiberRecord for Fiber {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Option<Status> {
        self.status
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.depends_on
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Split leading `[tag]` groups off a title.
///
/// `"[auth] [urgent] Fix login"` gives `(["auth", "urgent"], "Fix login")`.
/// Brackets after the first plain word are left in the title.
pub fn extract_tags(title: &str) -> (Vec<String>, String) {
    let mut tags = Vec::new();
    let mut remaining = title;

    while let Some(captures) = LEADING_TAG.captures(remaining) {
        let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        tags.push(tag.as_str().to_string());
        remaining = &remaining[whole.end()..];
    }

    (tags, remaining.trim().to_string())
}

/// Resolve an id query against `fibers`.
///
/// An exact id always wins. Otherwise the query must match exactly one fiber
/// by [`Fiber::matches_id`].
///
/// # Errors
///
/// [`Error::FiberNotFound`] when nothing matches, [`Error::AmbiguousId`] when
/// several fibers do.
pub fn resolve<'a>(fibers: &'a [Fiber], query: &str) -> Result<&'a Fiber> {
    if let Some(exact) = fibers.iter().find(|f| f.id == query) {
        return Ok(exact);
    }

    let matches: Vec<&Fiber> = fibers.iter().filter(|f| f.matches_id(query)).collect();
    match matches.as_slice() {
        [] => Err(Error::FiberNotFound(query.to_string())),
        [only] => Ok(only),
        _ => {
            let mut ids: Vec<String> = matches.iter().map(|f| f.id.clone()).collect();
            ids.sort();
            Err(Error::AmbiguousId {
                query: query.to_string(),
                matches: ids,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Fiber;
    use chrono::{DateTime, Duration, Utc};
    use felt_graph::{Dependency, Status};

    /// A fiber created `minutes` after the epoch.
    pub fn fiber(id: &str, title: &str, status: Option<Status>, minutes: i64) -> Fiber {
        let mut fiber = Fiber::new(id, title, DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minutes))
            .unwrap();
        fiber.status = status;
        fiber
    }

    /// Same as [`fiber`], with unlabelled dependencies.
    pub fn fiber_with_deps(id: &str, status: Option<Status>, minutes: i64, deps: &[&str]) -> Fiber {
        let mut fiber = fiber(id, &format!("Title of {id}"), status, minutes);
        fiber.depends_on = deps.iter().map(|d| Dependency::new(*d)).collect();
        fiber
    }
}
