//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use chrono::NaiveDate;
use clap::Parser;

use super::types::{DetailLevel, DueChange, GraphFormat, StatusArg, StatusFilter};
use super::validators::{parse_due_change, parse_due_date, validate_tag, validate_title};
use crate::domain::MAX_PRIORITY;

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Fiber title. Leading `[tag]` groups become tags
    #[arg(value_parser = validate_title)]
    pub title: String,

    /// Body text (read from stdin when piped and not given)
    #[arg(short, long)]
    pub body: Option<String>,

    /// Initial status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Kind (task, spec, decision, ...). Defaults to the repository setting
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Priority level (0 = most urgent, 4 = least). Defaults to the repository setting
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_PRIORITY)))]
    pub priority: Option<u8>,

    /// Id of a fiber this one depends on (repeatable)
    #[arg(short = 'a', long = "depends-on")]
    pub depends_on: Vec<String>,

    /// Tag (repeatable)
    #[arg(short, long = "tag", value_parser = validate_tag)]
    pub tags: Vec<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(short = 'D', long, value_parser = parse_due_date)]
    pub due: Option<NaiveDate>,

    /// Outcome: the conclusion reached
    #[arg(short, long)]
    pub outcome: Option<String>,
}

/// Arguments for the `edit` command
#[derive(Parser, Debug, Clone)]
pub struct EditArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// New title
    #[arg(short, long, value_parser = validate_title)]
    pub title: Option<String>,

    /// New body text
    #[arg(short, long)]
    pub body: Option<String>,

    /// New outcome
    #[arg(short, long)]
    pub outcome: Option<String>,

    /// New priority (0-4, lower = more urgent)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_PRIORITY)))]
    pub priority: Option<u8>,

    /// New kind
    #[arg(short, long)]
    pub kind: Option<String>,

    /// New due date (YYYY-MM-DD, empty to clear)
    #[arg(short = 'D', long, value_parser = parse_due_change)]
    pub due: Option<DueChange>,

    /// Add a dependency (repeatable)
    #[arg(short = 'a', long = "depends-on")]
    pub depends_on: Vec<String>,
}

impl EditArgs {
    /// Whether any modification flag was given. Without one, `edit` opens
    /// the file in `$EDITOR`.
    pub fn has_modifications(&self) -> bool {
        self.title.is_some()
            || self.body.is_some()
            || self.outcome.is_some()
            || self.priority.is_some()
            || self.kind.is_some()
            || self.due.is_some()
            || !self.depends_on.is_empty()
    }
}

/// Arguments for the `comment` command
#[derive(Parser, Debug, Clone)]
pub struct CommentArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// Comment text
    pub text: String,
}

/// Arguments for the `link` command
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// The dependent fiber
    pub id: String,

    /// The fiber it depends on
    pub depends_on: String,

    /// Label describing the relationship
    #[arg(short, long)]
    pub label: Option<String>,
}

/// Arguments for the `unlink` command
#[derive(Parser, Debug, Clone)]
pub struct UnlinkArgs {
    /// The dependent fiber
    pub id: String,

    /// The fiber it no longer depends on
    pub depends_on: String,
}

/// Arguments for the `ls` command
#[derive(Parser, Debug, Clone)]
pub struct LsArgs {
    /// Search title, body and outcome
    pub query: Option<String>,

    /// Status filter (default: open and active, or all when searching)
    #[arg(short, long, value_enum)]
    pub status: Option<StatusFilter>,

    /// Tag filter (repeatable, AND logic; trailing `:` matches a prefix)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Show the N most recent (by closed-at or created-at)
    #[arg(short = 'n', long)]
    pub recent: Option<usize>,

    /// Only fibers whose title equals the query
    #[arg(short, long)]
    pub exact: bool,

    /// Treat the query as a case-insensitive regular expression
    #[arg(short, long)]
    pub regex: bool,

    /// Include the body in JSON output
    #[arg(long)]
    pub body: bool,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone)]
pub struct ReadyArgs {
    /// Tag filter (repeatable, AND logic; trailing `:` matches a prefix)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Root fiber; every root when omitted
    pub id: Option<String>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// Print only the body, for piping
    #[arg(long)]
    pub body: bool,
}

/// Arguments for the `on` command
#[derive(Parser, Debug, Clone)]
pub struct OnArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// Reactivate a closed fiber, clearing its closure data
    #[arg(long)]
    pub reopen: bool,
}

/// Arguments for the `off` command
#[derive(Parser, Debug, Clone)]
pub struct OffArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// Reason for closing
    #[arg(short, long)]
    pub reason: Option<String>,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug, Clone)]
pub struct RmArgs {
    /// Fiber id (or unique prefix)
    pub id: String,
}

/// Arguments for the `tag` and `untag` commands
#[derive(Parser, Debug, Clone)]
pub struct TagArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// Comma-separated tags
    pub tags: String,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = GraphFormat::Mermaid)]
    pub format: GraphFormat,
}

/// Arguments for the `upstream` and `downstream` commands
#[derive(Parser, Debug, Clone)]
pub struct TraversalArgs {
    /// Fiber id (or unique prefix)
    pub id: String,

    /// Follow edges transitively instead of listing direct neighbours
    #[arg(long)]
    pub all: bool,

    /// Detail level for each listed fiber
    #[arg(short = 'd', long = "detail", value_enum)]
    pub detail: Option<DetailLevel>,
}

/// Arguments for the `path` command
#[derive(Parser, Debug, Clone)]
pub struct PathArgs {
    /// Starting fiber (the dependent)
    pub from: String,

    /// Target fiber (the dependency)
    pub to: String,
}
