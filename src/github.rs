use async_trait::async_trait;
use chrono::Utc;
use octocrab::Octocrab;
use serde_json::Value;

use crate::config::GitHubConfig;
use crate::error::{GhxError, Result};
use crate::source::{Detail, Period, Query, Source};
use crate::types::EntityKind;

const MAX_PER_PAGE: usize = 100;

pub struct GitHub {
    client: Octocrab,
    /// Web root, e.g. `https://github.com`; html URLs are mapped back to API routes against it.
    web_base: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("web_base", &self.web_base)
            .finish_non_exhaustive()
    }
}

impl From<octocrab::Error> for GhxError {
    fn from(err: octocrab::Error) -> Self {
        GhxError::Api(err.to_string())
    }
}

impl GitHub {
    pub fn new(token: String, config: &GitHubConfig) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .base_uri(config.api_base())
            .map_err(|e| GhxError::Config(e.to_string()))?
            .build()
            .map_err(|e| GhxError::Auth(e.to_string()))?;

        Ok(Self {
            client,
            web_base: format!("https://{}", config.host.trim_end_matches('/')),
        })
    }

    async fn get_json(&self, route: &str) -> Result<Value> {
        tracing::debug!(route, "GET");
        let value: Value = self.client.get(route, None::<&()>).await?;
        Ok(value)
    }

    async fn current_login(&self) -> Result<String> {
        let user = self.client.current().user().await?;
        Ok(user.login)
    }

    /// Follows `page=` until `limit` items are collected or a short page ends the list.
    /// Search endpoints wrap their results in `items`.
    async fn collect_pages(&self, route: &str, limit: usize) -> Result<Vec<Value>> {
        let per_page = limit.clamp(1, MAX_PER_PAGE);
        let sep = if route.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1;

        while items.len() < limit {
            let url = format!("{}{}per_page={}&page={}", route, sep, per_page, page);
            let batch = match self.get_json(&url).await? {
                Value::Array(batch) => batch,
                other => other
                    .get("items")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            };
            let done = batch.len() < per_page;
            items.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        items.truncate(limit);
        Ok(items)
    }

    async fn route_for_query(&self, query: &Query) -> Result<String> {
        let route = match query {
            Query::Repos { user: None } => "/user/repos?sort=updated".to_string(),
            Query::Repos { user: Some(u) } => format!("/users/{}/repos?sort=updated", u),
            Query::Starred { user: None } => "/user/starred".to_string(),
            Query::Starred { user: Some(u) } => format!("/users/{}/starred", u),
            Query::Issues { repo: Some(r), state } => {
                format!("/repos/{}/issues?state={}", r, state.as_api_str())
            }
            Query::Issues { repo: None, state } => {
                format!("/issues?filter=subscribed&state={}", state.as_api_str())
            }
            Query::PullRequests { repo: Some(r), state } => {
                format!("/repos/{}/pulls?state={}", r, state.as_api_str())
            }
            Query::PullRequests { repo: None, state } => {
                let mut q = "is:pr author:@me".to_string();
                if *state != crate::source::StateFilter::All {
                    q.push_str(&format!(" state:{}", state.as_api_str()));
                }
                format!("/search/issues?q={}", urlencoding::encode(&q))
            }
            Query::Notifications { all } => format!("/notifications?all={}", all),
            Query::Feed { user: None } => {
                format!("/users/{}/received_events", self.current_login().await?)
            }
            Query::Feed { user: Some(u) } => format!("/users/{}/events/public", u),
            Query::Followers { user: None } => "/user/followers".to_string(),
            Query::Followers { user: Some(u) } => format!("/users/{}/followers", u),
            Query::Following { user: None } => "/user/following".to_string(),
            Query::Following { user: Some(u) } => format!("/users/{}/following", u),
            Query::User { login } => format!("/users/{}", login),
            Query::SearchRepos { query } => format!(
                "/search/repositories?q={}&sort=stars&order=desc",
                urlencoding::encode(query)
            ),
            Query::SearchIssues { query } => {
                format!("/search/issues?q={}", urlencoding::encode(query))
            }
            Query::Trending { language, period } => trending_route(language.as_deref(), *period),
        };
        Ok(route)
    }
}

/// GitHub has no trending API; approximate it with the most starred
/// repositories created inside the window.
fn trending_route(language: Option<&str>, period: Period) -> String {
    let since = (Utc::now() - chrono::Duration::days(period.days())).format("%Y-%m-%d");
    let mut q = format!("created:>{}", since);
    if let Some(language) = language {
        q.push_str(&format!(" language:{}", language));
    }
    format!(
        "/search/repositories?q={}&sort=stars&order=desc",
        urlencoding::encode(&q)
    )
}

/// The issues endpoints also return pull requests, marked by a `pull_request` key.
fn drop_pull_requests(query: &Query, items: &mut Vec<Value>) {
    if let Query::Issues { .. } = query {
        items.retain(|item| item.get("pull_request").is_none());
    }
}

/// Maps a web URL back to the API route that serves it, and what it is.
fn route_for_url(web_base: &str, url: &str) -> Option<(String, EntityKind)> {
    let path = url.strip_prefix(web_base)?;
    let path = path.split(['#', '?']).next().unwrap_or_default();
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    match parts.as_slice() {
        [user] => Some((format!("/users/{}", user), EntityKind::User)),
        [owner, repo] => Some((format!("/repos/{}/{}", owner, repo), EntityKind::Repository)),
        [owner, repo, "issues", number, ..] if number.parse::<u64>().is_ok() => Some((
            format!("/repos/{}/{}/issues/{}", owner, repo, number),
            EntityKind::Issue,
        )),
        [owner, repo, "pull", number, ..] if number.parse::<u64>().is_ok() => Some((
            format!("/repos/{}/{}/pulls/{}", owner, repo, number),
            EntityKind::PullRequest,
        )),
        _ => None,
    }
}

#[async_trait]
impl Source for GitHub {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn list(&self, query: &Query, limit: usize) -> Result<Vec<Value>> {
        let route = self.route_for_query(query).await?;

        if let Query::User { .. } = query {
            return Ok(vec![self.get_json(&route).await?]);
        }

        let mut items = self.collect_pages(&route, limit).await?;
        drop_pull_requests(query, &mut items);
        Ok(items)
    }

    async fn fetch(&self, url: &str, kind: EntityKind) -> Result<Detail> {
        let (route, kind) = route_for_url(&self.web_base, url).ok_or_else(|| {
            GhxError::Api(format!(
                "cannot show {} ({}) in the terminal, try --browser",
                url, kind
            ))
        })?;

        let entity = self.get_json(&route).await?;

        let comments = match kind {
            EntityKind::Issue | EntityKind::PullRequest => {
                let number = route.rsplit('/').next().unwrap_or_default();
                let repo_route = route
                    .rsplit_once(if kind == EntityKind::Issue { "/issues/" } else { "/pulls/" })
                    .map(|(repo, _)| repo)
                    .unwrap_or_default();
                let comments_route = format!("{}/issues/{}/comments", repo_route, number);
                self.collect_pages(&comments_route, MAX_PER_PAGE).await?
            }
            _ => Vec::new(),
        };

        Ok(Detail {
            entity,
            kind,
            comments,
        })
    }
}
