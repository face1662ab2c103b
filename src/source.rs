use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

/// Window for trending repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Period {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl Period {
    pub fn days(&self) -> i64 {
        match self {
            Period::Daily => 1,
            Period::Weekly => 7,
            Period::Monthly => 30,
        }
    }
}

/// One listing request. `None` for a user means the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Repos { user: Option<String> },
    Starred { user: Option<String> },
    Issues { repo: Option<String>, state: StateFilter },
    PullRequests { repo: Option<String>, state: StateFilter },
    Notifications { all: bool },
    Feed { user: Option<String> },
    Followers { user: Option<String> },
    Following { user: Option<String> },
    User { login: String },
    SearchRepos { query: String },
    SearchIssues { query: String },
    Trending { language: Option<String>, period: Period },
}

impl Query {
    /// The entity kind every item of this listing is adapted as.
    pub fn kind(&self) -> EntityKind {
        match self {
            Query::Repos { .. } | Query::Starred { .. } | Query::SearchRepos { .. } => {
                EntityKind::Repository
            }
            Query::Issues { .. } | Query::SearchIssues { .. } => EntityKind::Issue,
            Query::PullRequests { .. } => EntityKind::PullRequest,
            Query::Notifications { .. } => EntityKind::Notification,
            Query::Feed { .. } => EntityKind::FeedEvent,
            Query::Followers { .. } | Query::Following { .. } | Query::User { .. } => {
                EntityKind::User
            }
            Query::Trending { .. } => EntityKind::TrendingRepo,
        }
    }
}

/// A single resource re-fetched for a detail view.
#[derive(Debug, Clone)]
pub struct Detail {
    pub entity: Value,
    /// What the fetched resource actually is; a feed event resolves to its issue, repo, etc.
    pub kind: EntityKind,
    pub comments: Vec<Value>,
}

/// The remote side: everything that talks to the network lives behind this.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn list(&self, query: &Query, limit: usize) -> Result<Vec<Value>>;

    async fn fetch(&self, url: &str, kind: EntityKind) -> Result<Detail>;
}
