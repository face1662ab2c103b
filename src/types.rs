use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GhxError;

/// Placeholder for optional attributes the entity does not carry.
/// Keeps every row of a kind at the same column count.
pub const EMPTY_FIELD: &str = "-";

/// The fixed set of remote resources ghx knows how to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Issue,
    PullRequest,
    Repository,
    User,
    Notification,
    TrendingRepo,
    FeedEvent,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Issue,
        EntityKind::PullRequest,
        EntityKind::Repository,
        EntityKind::User,
        EntityKind::Notification,
        EntityKind::TrendingRepo,
        EntityKind::FeedEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Issue => "issue",
            EntityKind::PullRequest => "pull_request",
            EntityKind::Repository => "repository",
            EntityKind::User => "user",
            EntityKind::Notification => "notification",
            EntityKind::TrendingRepo => "trending_repo",
            EntityKind::FeedEvent => "feed_event",
        }
    }

    /// Column labels, in display order. Every row of this kind has exactly these.
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Issue => &["#", "title", "state", "comments", "updated"],
            EntityKind::PullRequest => &["#", "title", "state", "author", "updated"],
            EntityKind::Repository => &["name", "owner", "stars", "language", "description"],
            EntityKind::User => &["login", "name", "company", "location", "followers"],
            EntityKind::Notification => &["repo", "type", "title", "reason", "updated"],
            EntityKind::TrendingRepo => &["name", "stars", "language", "description"],
            EntityKind::FeedEvent => &["actor", "action", "target", "created"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Issue => write!(f, "issue"),
            EntityKind::PullRequest => write!(f, "pull request"),
            EntityKind::Repository => write!(f, "repository"),
            EntityKind::User => write!(f, "user"),
            EntityKind::Notification => write!(f, "notification"),
            EntityKind::TrendingRepo => write!(f, "trending repository"),
            EntityKind::FeedEvent => write!(f, "feed event"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = GhxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GhxError::UnsupportedKind(s.to_string()))
    }
}

/// Lifecycle state of an issue or pull request, one color each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateClass {
    Open,
    Closed,
    Merged,
    Draft,
}

impl fmt::Display for StateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateClass::Open => write!(f, "open"),
            StateClass::Closed => write!(f, "closed"),
            StateClass::Merged => write!(f, "merged"),
            StateClass::Draft => write!(f, "draft"),
        }
    }
}

/// How a cell should be colored; resolved to a concrete color by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    Plain,
    Accent,
    Muted,
    State(StateClass),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub class: ColorClass,
}

/// One remote entity, normalized for tabular rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based display position; 0 until the row is placed in a listing.
    pub position: usize,
    pub kind: EntityKind,
    pub url: String,
    pub fields: Vec<Field>,
    pub body: Option<String>,
}

impl Row {
    pub fn labels(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.label).collect()
    }

    #[cfg(test)]
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}
