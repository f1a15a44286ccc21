//! Core record types consumed by the graph engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a fiber.
///
/// A fiber without a status is "untracked"; the engine models that as
/// `Option::<Status>::None` rather than a fourth variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not started yet
    Open,

    /// Currently being worked on
    Active,

    /// Finished
    Closed,
}

impl Status {
    /// Lowercase name as written in frontmatter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency edge: the fiber holding it depends on the fiber named by `id`.
///
/// Serialized as a bare id string when unlabelled, or as an `{id, label}`
/// mapping when a label is present. Both forms are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "DependencyRepr", into = "DependencyRepr")]
pub struct Dependency {
    id: String,
    label: Option<String>,
}

impl Dependency {
    /// Create an unlabelled dependency on `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Create a dependency on `id` carrying a label. An empty label is
    /// treated as no label.
    pub fn with_label(id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            label: (!label.is_empty()).then_some(label),
        }
    }

    /// Id of the upstream fiber.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Optional label explaining the edge.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DependencyRepr {
    Bare(String),
    Labelled {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl From<DependencyRepr> for Dependency {
    fn from(repr: DependencyRepr) -> Self {
        match repr {
            DependencyRepr::Bare(id) => Self::new(id),
            DependencyRepr::Labelled { id, label } => match label {
                Some(label) => Self::with_label(id, label),
                None => Self::new(id),
            },
        }
    }
}

impl From<Dependency> for DependencyRepr {
    fn from(dep: Dependency) -> Self {
        match dep.label {
            None => Self::Bare(dep.id),
            label @ Some(_) => Self::Labelled { id: dep.id, label },
        }
    }
}

/// The input contract of the graph engine.
///
/// Anything that can report an id, a status, an ordered dependency list and a
/// creation time can be placed in a [`Graph`](crate::Graph).
pub trait FiberRecord {
    /// Unique identifier.
    fn id(&self) -> &str;

    /// Current status, `None` when untracked.
    fn status(&self) -> Option<Status>;

    /// Upstream dependencies in insertion order.
    fn dependencies(&self) -> &[Dependency];

    /// Creation time, used to order [`Graph::ready`](crate::Graph::ready).
    fn created_at(&self) -> DateTime<Utc>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_with_empty_label_is_unlabelled() {
        let dep = Dependency::with_label("a-11111111", "");
        assert_eq!(dep.label(), None);
        assert_eq!(dep, Dependency::new("a-11111111"));
    }

    #[rstest]
    #[case::bare(r#""a-11111111""#, None)]
    #[case::mapping(r#"{"id":"a-11111111","label":"needs data"}"#, Some("needs data"))]
    #[case::mapping_without_label(r#"{"id":"a-11111111"}"#, None)]
    #[case::mapping_empty_label(r#"{"id":"a-11111111","label":""}"#, None)]
    fn test_dependency_accepts_both_forms(#[case] input: &str, #[case] label: Option<&str>) {
        let dep: Dependency = serde_json::from_str(input).unwrap();
        assert_eq!(dep.id(), "a-11111111");
        assert_eq!(dep.label(), label);
    }

    #[test]
    fn test_unlabelled_dependency_serializes_as_string() {
        let json = serde_json::to_string(&Dependency::new("a-11111111")).unwrap();
        assert_eq!(json, r#""a-11111111""#);
    }

    #[test]
    fn test_labelled_dependency_serializes_as_mapping() {
        let json = serde_json::to_string(&Dependency::with_label("a-11111111", "blocks")).unwrap();
        assert_eq!(json, r#"{"id":"a-11111111","label":"blocks"}"#);
    }

    #[rstest]
    #[case(Status::Open, "open")]
    #[case(Status::Active, "active")]
    #[case(Status::Closed, "closed")]
    fn test_status_names(#[case] status: Status, #[case] name: &str) {
        assert_eq!(status.to_string(), name);
        assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{name}\""));
    }
}
