//! CLI value enums and domain type conversions.

use chrono::NaiveDate;
use clap::ValueEnum;
use felt_graph::Status;

// ============================================================================
// Value Enums
// ============================================================================

/// Status that can be set on a fiber
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    /// Not started
    Open,
    /// Being worked on
    Active,
    /// Done
    Closed,
}

impl std::fmt::Display for StatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Status selector for `ls`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Open fibers only
    Open,
    /// Active fibers only
    Active,
    /// Closed fibers only
    Closed,
    /// Fibers without a status
    Untracked,
    /// Every fiber
    All,
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
            Self::Untracked => write!(f, "untracked"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Output format for `graph`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormat {
    /// Mermaid flowchart
    #[default]
    Mermaid,
    /// Graphviz DOT
    Dot,
    /// Indented text tree
    Text,
}

impl std::fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mermaid => write!(f, "mermaid"),
            Self::Dot => write!(f, "dot"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// How much of each fiber `upstream` / `downstream` print
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Title and tags only
    Title,
    /// Header fields and dependency ids
    Compact,
    /// Adds dependency titles and the opening paragraph
    Summary,
    /// Everything, including the body
    Full,
}

impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Compact => write!(f, "compact"),
            Self::Summary => write!(f, "summary"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Requested change to a fiber's due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueChange {
    /// Remove the due date
    Clear,
    /// Set a new due date
    Set(NaiveDate),
}

// ============================================================================
// Domain Type Conversions
// ============================================================================

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => Status::Open,
            StatusArg::Active => Status::Active,
            StatusArg::Closed => Status::Closed,
        }
    }
}

impl From<Status> for StatusArg {
    fn from(status: Status) -> Self {
        match status {
            Status::Open => StatusArg::Open,
            Status::Active => StatusArg::Active,
            Status::Closed => StatusArg::Closed,
        }
    }
}

impl StatusFilter {
    /// The status this filter selects, `None` for `untracked` and `all`.
    pub fn status(self) -> Option<Status> {
        match self {
            Self::Open => Some(Status::Open),
            Self::Active => Some(Status::Active),
            Self::Closed => Some(Status::Closed),
            Self::Untracked | Self::All => None,
        }
    }
}
