//! Filtering and ordering for fiber listings.

use super::Fiber;
use felt_graph::Status;
use regex::Regex;

/// Which statuses pass the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusGate {
    /// Open and active fibers only; untracked fibers are excluded
    #[default]
    Actionable,
    /// Exactly this status, `None` selecting untracked fibers
    Only(Option<Status>),
    /// Everything
    All,
}

impl StatusGate {
    fn admits(self, status: Option<Status>) -> bool {
        match self {
            Self::Actionable => matches!(status, Some(Status::Open | Status::Active)),
            Self::Only(wanted) => status == wanted,
            Self::All => true,
        }
    }
}

/// How a text query is matched.
#[derive(Debug, Clone)]
pub enum TextMatch {
    /// Case-insensitive substring of title, body or outcome
    Substring(String),
    /// Case-insensitive equality with the title
    ExactTitle(String),
    /// Regular expression over title, body or outcome
    Pattern(Regex),
}

/// Criteria for `ls`-style listings.
#[derive(Debug, Clone, Default)]
pub struct FiberFilter {
    /// Status gate
    pub status: StatusGate,
    /// Every pattern must match a tag (see [`Fiber::matches_tag`])
    pub tags: Vec<String>,
    /// Optional text query
    pub text: Option<TextMatch>,
    /// Keep only the N most recently touched fibers
    pub recent: Option<usize>,
}

impl FiberFilter {
    /// Select and order matching fibers.
    ///
    /// Case-insensitive exact title matches come first. With `recent` the
    /// result is ordered newest first by close time (or creation time) and
    /// truncated. Without a text query it is ordered by creation time.
    pub fn apply<'a>(&self, fibers: &'a [Fiber]) -> Vec<&'a Fiber> {
        let mut exact = Vec::new();
        let mut rest = Vec::new();

        for fiber in fibers {
            if !self.status.admits(fiber.status) {
                continue;
            }
            if !self.tags.iter().all(|tag| fiber.matches_tag(tag)) {
                continue;
            }

            match &self.text {
                None => rest.push(fiber),
                Some(text) => match text_rank(fiber, text) {
                    Some(Rank::Exact) => exact.push(fiber),
                    Some(Rank::Partial) => rest.push(fiber),
                    None => {}
                },
            }
        }

        exact.append(&mut rest);
        let mut selected = exact;

        if let Some(limit) = self.recent.filter(|&n| n > 0) {
            selected.sort_by(|a, b| last_touched(b).cmp(&last_touched(a)));
            selected.truncate(limit);
        } else if self.text.is_none() {
            selected.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }

        selected
    }
}

enum Rank {
    Exact,
    Partial,
}

fn text_rank(fiber: &Fiber, text: &TextMatch) -> Option<Rank> {
    match text {
        TextMatch::Pattern(re) => (re.is_match(&fiber.title)
            || re.is_match(&fiber.body)
            || re.is_match(&fiber.outcome))
        .then_some(Rank::Partial),
        TextMatch::ExactTitle(query) => {
            (fiber.title.to_lowercase() == query.to_lowercase()).then_some(Rank::Exact)
        }
        TextMatch::Substring(query) => {
            let query = query.to_lowercase();
            let title = fiber.title.to_lowercase();
            if title == query {
                Some(Rank::Exact)
            } else if title.contains(&query)
                || fiber.body.to_lowercase().contains(&query)
                || fiber.outcome.to_lowercase().contains(&query)
            {
                Some(Rank::Partial)
            } else {
                None
            }
        }
    }
}

fn last_touched(fiber: &Fiber) -> chrono::DateTime<chrono::Utc> {
    fiber.closed_at.unwrap_or(fiber.created_at)
}
