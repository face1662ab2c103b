//! Normalizes raw GitHub API objects into [`Row`]s.
//!
//! Each kind has its own adapter function with a fixed field schema
//! (see [`EntityKind::schema`]). Required attributes missing from the
//! payload are a contract violation and surface as
//! [`GhxError::MalformedEntity`]; optional ones become [`EMPTY_FIELD`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{GhxError, Result};
use crate::types::{ColorClass, EntityKind, Field, Row, StateClass, EMPTY_FIELD};

/// Normalizes one raw entity. Relative times are computed against `now`.
pub fn adapt(raw: &Value, kind: EntityKind, now: DateTime<Utc>) -> Result<Row> {
    let row = match kind {
        EntityKind::Issue => adapt_issue(raw, now),
        EntityKind::PullRequest => adapt_pull_request(raw, now),
        EntityKind::Repository => adapt_repository(raw),
        EntityKind::User => adapt_user(raw),
        EntityKind::Notification => adapt_notification(raw, now),
        EntityKind::TrendingRepo => adapt_trending(raw),
        EntityKind::FeedEvent => adapt_event(raw, now),
    }?;
    debug_assert_eq!(row.labels(), kind.schema());
    Ok(row)
}

fn adapt_issue(raw: &Value, now: DateTime<Utc>) -> Result<Row> {
    let kind = EntityKind::Issue;
    let number = required_u64(raw, kind, "number")?;
    let title = required_str(raw, kind, "title")?;
    let state = required_str(raw, kind, "state")?;
    let url = required_str(raw, kind, "html_url")?;
    let state = state_class(raw, state);

    Ok(Row {
        position: 0,
        kind,
        url: url.to_string(),
        fields: vec![
            field("#", number.to_string(), ColorClass::Accent),
            field("title", clean_cell(title), ColorClass::Plain),
            field("state", state.to_string(), ColorClass::State(state)),
            field("comments", optional_count(raw, "comments"), ColorClass::Plain),
            field("updated", relative_time(raw, "updated_at", now), ColorClass::Muted),
        ],
        body: body_of(raw, "body"),
    })
}

fn adapt_pull_request(raw: &Value, now: DateTime<Utc>) -> Result<Row> {
    let kind = EntityKind::PullRequest;
    let number = required_u64(raw, kind, "number")?;
    let title = required_str(raw, kind, "title")?;
    let state = required_str(raw, kind, "state")?;
    let url = required_str(raw, kind, "html_url")?;
    let state = state_class(raw, state);

    Ok(Row {
        position: 0,
        kind,
        url: url.to_string(),
        fields: vec![
            field("#", number.to_string(), ColorClass::Accent),
            field("title", clean_cell(title), ColorClass::Plain),
            field("state", state.to_string(), ColorClass::State(state)),
            field("author", optional_str(raw, "user.login"), ColorClass::Accent),
            field("updated", relative_time(raw, "updated_at", now), ColorClass::Muted),
        ],
        body: body_of(raw, "body"),
    })
}

fn adapt_repository(raw: &Value) -> Result<Row> {
    let kind = EntityKind::Repository;
    let name = required_str(raw, kind, "name")?;
    let owner = required_str(raw, kind, "owner.login")?;
    let url = required_str(raw, kind, "html_url")?;

    Ok(Row {
        position: 0,
        kind,
        url: url.to_string(),
        fields: vec![
            field("name", clean_cell(name), ColorClass::Accent),
            field("owner", clean_cell(owner), ColorClass::Plain),
            field("stars", optional_count(raw, "stargazers_count"), ColorClass::Muted),
            field("language", optional_str(raw, "language"), ColorClass::Plain),
            field("description", optional_str(raw, "description"), ColorClass::Plain),
        ],
        body: None,
    })
}

fn adapt_user(raw: &Value) -> Result<Row> {
    let kind = EntityKind::User;
    let login = required_str(raw, kind, "login")?;
    let url = required_str(raw, kind, "html_url")?;

    Ok(Row {
        position: 0,
        kind,
        url: url.to_string(),
        fields: vec![
            field("login", clean_cell(login), ColorClass::Accent),
            field("name", optional_str(raw, "name"), ColorClass::Plain),
            field("company", optional_str(raw, "company"), ColorClass::Plain),
            field("location", optional_str(raw, "location"), ColorClass::Plain),
            field("followers", optional_count(raw, "followers"), ColorClass::Muted),
        ],
        body: body_of(raw, "bio"),
    })
}

fn adapt_notification(raw: &Value, now: DateTime<Utc>) -> Result<Row> {
    let kind = EntityKind::Notification;
    let repo = required_str(raw, kind, "repository.full_name")?;
    let title = required_str(raw, kind, "subject.title")?;
    let subject_type = required_str(raw, kind, "subject.type")?;

    // Discussions and check suites carry no subject url.
    let url = lookup_str(raw, "subject.url")
        .and_then(html_url_from_api)
        .or_else(|| lookup_str(raw, "repository.html_url").map(str::to_string))
        .unwrap_or_else(|| format!("https://github.com/{}", repo));

    Ok(Row {
        position: 0,
        kind,
        url,
        fields: vec![
            field("repo", clean_cell(repo), ColorClass::Accent),
            field("type", clean_cell(subject_type), ColorClass::Plain),
            field("title", clean_cell(title), ColorClass::Plain),
            field("reason", optional_str(raw, "reason"), ColorClass::Plain),
            field("updated", relative_time(raw, "updated_at", now), ColorClass::Muted),
        ],
        body: None,
    })
}

fn adapt_trending(raw: &Value) -> Result<Row> {
    let kind = EntityKind::TrendingRepo;
    let name = required_str(raw, kind, "full_name")?;
    let url = required_str(raw, kind, "html_url")?;

    Ok(Row {
        position: 0,
        kind,
        url: url.to_string(),
        fields: vec![
            field("name", clean_cell(name), ColorClass::Accent),
            field("stars", optional_count(raw, "stargazers_count"), ColorClass::Muted),
            field("language", optional_str(raw, "language"), ColorClass::Plain),
            field("description", optional_str(raw, "description"), ColorClass::Plain),
        ],
        body: None,
    })
}

fn adapt_event(raw: &Value, now: DateTime<Utc>) -> Result<Row> {
    let kind = EntityKind::FeedEvent;
    let event_type = required_str(raw, kind, "type")?;
    let actor = required_str(raw, kind, "actor.login")?;
    let repo = required_str(raw, kind, "repo.name")?;

    let described = describe_event(raw, event_type, repo);
    let url = described
        .url
        .or_else(|| lookup_str(raw, "repo.url").and_then(html_url_from_api))
        .unwrap_or_else(|| format!("https://github.com/{}", repo));

    Ok(Row {
        position: 0,
        kind,
        url,
        fields: vec![
            field("actor", clean_cell(actor), ColorClass::Plain),
            field("action", clean_cell(&described.action), ColorClass::State(StateClass::Open)),
            field("target", clean_cell(&described.target), ColorClass::Accent),
            field("created", relative_time(raw, "created_at", now), ColorClass::Muted),
        ],
        body: ["payload.comment.body", "payload.issue.body", "payload.pull_request.body", "payload.release.body"]
            .into_iter()
            .find_map(|path| body_of(raw, path)),
    })
}

struct EventDescription {
    action: String,
    target: String,
    url: Option<String>,
}

fn describe_event(raw: &Value, event_type: &str, repo: &str) -> EventDescription {
    let payload_str = |path: &str| lookup_str(raw, &format!("payload.{}", path));
    let payload_url = |path: &str| payload_str(path).map(str::to_string);
    let numbered = |path: &str| match lookup(raw, &format!("payload.{}.number", path)).and_then(Value::as_u64) {
        Some(n) => format!("{}#{}", repo, n),
        None => repo.to_string(),
    };

    let (action, target, url) = match event_type {
        "CommitCommentEvent" => {
            let sha = payload_str("comment.commit_id").unwrap_or_default();
            let short = sha.get(..7).unwrap_or(sha);
            (
                "commented on commit".to_string(),
                if short.is_empty() { repo.to_string() } else { format!("{}@{}", repo, short) },
                payload_url("comment.html_url"),
            )
        }
        "CreateEvent" | "DeleteEvent" => {
            let verb = if event_type == "CreateEvent" { "created" } else { "deleted" };
            let ref_type = payload_str("ref_type").unwrap_or("repository");
            let action = match payload_str("ref") {
                Some(name) if ref_type != "repository" => format!("{} {} {}", verb, ref_type, name),
                _ => format!("{} {}", verb, ref_type),
            };
            (action, repo.to_string(), None)
        }
        "FollowEvent" => (
            "followed".to_string(),
            payload_str("target.login").unwrap_or(repo).to_string(),
            payload_url("target.html_url"),
        ),
        "ForkEvent" => (
            "forked".to_string(),
            repo.to_string(),
            payload_url("forkee.html_url"),
        ),
        "GollumEvent" => ("updated wiki".to_string(), repo.to_string(), None),
        "IssueCommentEvent" => {
            let on = if lookup(raw, "payload.issue.pull_request").is_some() {
                "pull request"
            } else {
                "issue"
            };
            (
                format!("commented on {}", on),
                numbered("issue"),
                payload_url("comment.html_url").or_else(|| payload_url("issue.html_url")),
            )
        }
        "IssuesEvent" => (
            format!("{} issue", payload_str("action").unwrap_or("updated")),
            numbered("issue"),
            payload_url("issue.html_url"),
        ),
        "PullRequestEvent" => {
            let merged = lookup(raw, "payload.pull_request.merged").and_then(Value::as_bool) == Some(true);
            let verb = match payload_str("action") {
                Some("closed") if merged => "merged",
                Some(verb) => verb,
                None => "updated",
            };
            (
                format!("{} pull request", verb),
                numbered("pull_request"),
                payload_url("pull_request.html_url"),
            )
        }
        "PullRequestReviewEvent" => (
            "reviewed pull request".to_string(),
            numbered("pull_request"),
            payload_url("review.html_url").or_else(|| payload_url("pull_request.html_url")),
        ),
        "PullRequestReviewCommentEvent" => (
            "commented on pull request".to_string(),
            numbered("pull_request"),
            payload_url("comment.html_url").or_else(|| payload_url("pull_request.html_url")),
        ),
        "MemberEvent" => {
            let action = match payload_str("member.login") {
                Some(member) => format!("added collaborator {}", member),
                None => "added collaborator".to_string(),
            };
            (action, repo.to_string(), None)
        }
        "PublicEvent" => ("open sourced".to_string(), repo.to_string(), None),
        "PushEvent" => {
            let action = match payload_str("ref") {
                Some(r) => format!("pushed to {}", r.trim_start_matches("refs/heads/")),
                None => "pushed to".to_string(),
            };
            (action, repo.to_string(), None)
        }
        "ReleaseEvent" => {
            let action = match payload_str("release.tag_name") {
                Some(tag) => format!("released {}", tag),
                None => "released".to_string(),
            };
            (action, repo.to_string(), payload_url("release.html_url"))
        }
        "WatchEvent" => ("starred".to_string(), repo.to_string(), None),
        other => (other.to_string(), repo.to_string(), None),
    };

    EventDescription { action, target, url }
}

/// Issue/PR state; merged and draft only apply to pull requests.
fn state_class(raw: &Value, state: &str) -> StateClass {
    let merged = lookup(raw, "merged_at").is_some()
        || lookup(raw, "pull_request.merged_at").is_some()
        || lookup(raw, "merged").and_then(Value::as_bool) == Some(true);
    if merged {
        return StateClass::Merged;
    }
    if state.eq_ignore_ascii_case("closed") {
        return StateClass::Closed;
    }
    if lookup(raw, "draft").and_then(Value::as_bool) == Some(true) {
        StateClass::Draft
    } else {
        StateClass::Open
    }
}

/// Maps an API URL (`https://api.github.com/repos/o/r/pulls/5`) to its web page.
/// Also handles GitHub Enterprise (`https://host/api/v3/repos/...`).
pub fn html_url_from_api(api: &str) -> Option<String> {
    const ENTERPRISE: &str = "/api/v3/repos/";
    let (base, rest) = if let Some(rest) = api.strip_prefix("https://api.github.com/repos/") {
        ("https://github.com", rest)
    } else {
        let idx = api.find(ENTERPRISE)?;
        (&api[..idx], &api[idx + ENTERPRISE.len()..])
    };

    let parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
    let page = match parts.as_slice() {
        [owner, repo, "issues", number] => format!("{}/{}/issues/{}", owner, repo, number),
        [owner, repo, "pulls", number] => format!("{}/{}/pull/{}", owner, repo, number),
        [owner, repo, "commits", sha] => format!("{}/{}/commit/{}", owner, repo, sha),
        // Anything else shows the repository page.
        [owner, repo, ..] => format!("{}/{}", owner, repo),
        _ => return None,
    };
    Some(format!("{}/{}", base, page))
}

fn field(label: &'static str, value: String, class: ColorClass) -> Field {
    Field {
        label,
        value,
        class,
    }
}

/// Dotted path lookup; JSON null counts as absent.
fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(raw, |value, key| value.get(key))
        .filter(|value| !value.is_null())
}

fn lookup_str<'a>(raw: &'a Value, path: &str) -> Option<&'a str> {
    lookup(raw, path).and_then(Value::as_str)
}

fn required_str<'a>(raw: &'a Value, kind: EntityKind, attribute: &'static str) -> Result<&'a str> {
    lookup_str(raw, attribute).ok_or(GhxError::MalformedEntity { kind, attribute })
}

fn required_u64(raw: &Value, kind: EntityKind, attribute: &'static str) -> Result<u64> {
    lookup(raw, attribute)
        .and_then(Value::as_u64)
        .ok_or(GhxError::MalformedEntity { kind, attribute })
}

fn optional_str(raw: &Value, path: &str) -> String {
    match lookup_str(raw, path).map(clean_cell) {
        Some(value) if !value.is_empty() => value,
        _ => EMPTY_FIELD.to_string(),
    }
}

fn optional_count(raw: &Value, path: &str) -> String {
    lookup(raw, path)
        .and_then(Value::as_u64)
        .map(|n| n.to_string())
        .unwrap_or_else(|| EMPTY_FIELD.to_string())
}

fn body_of(raw: &Value, path: &str) -> Option<String> {
    lookup_str(raw, path)
        .filter(|body| !body.trim().is_empty())
        .map(str::to_string)
}

fn relative_time(raw: &Value, path: &str, now: DateTime<Utc>) -> String {
    lookup_str(raw, path)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|then| format_relative(then.with_timezone(&Utc), now))
        .unwrap_or_else(|| EMPTY_FIELD.to_string())
}

pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(then);
    if duration.num_days() > 30 {
        then.format("%Y-%m-%d").to_string()
    } else if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Table cells are single-line.
fn clean_cell(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn full_issue() -> Value {
        json!({
            "number": 42,
            "title": "Crash on\nstartup",
            "state": "open",
            "html_url": "https://github.com/o/r/issues/42",
            "comments": 3,
            "updated_at": "2024-06-01T09:00:00Z",
            "body": "It **crashes**."
        })
    }

    #[test]
    fn issue_fields_follow_schema() {
        let row = adapt(&full_issue(), EntityKind::Issue, now()).unwrap();
        assert_eq!(row.labels(), EntityKind::Issue.schema());
        assert_eq!(row.field("#"), Some("42"));
        assert_eq!(row.field("title"), Some("Crash on startup"));
        assert_eq!(row.field("comments"), Some("3"));
        assert_eq!(row.field("updated"), Some("3h ago"));
        assert_eq!(row.url, "https://github.com/o/r/issues/42");
        assert_eq!(row.body.as_deref(), Some("It **crashes**."));
    }

    #[test]
    fn missing_optional_fields_keep_schema() {
        let sparse = json!({
            "number": 1,
            "title": "t",
            "state": "closed",
            "html_url": "https://github.com/o/r/issues/1"
        });
        let row = adapt(&sparse, EntityKind::Issue, now()).unwrap();
        assert_eq!(row.labels(), EntityKind::Issue.schema());
        assert_eq!(row.field("comments"), Some(EMPTY_FIELD));
        assert_eq!(row.field("updated"), Some(EMPTY_FIELD));
        assert_eq!(row.field("state"), Some("closed"));
        assert!(row.body.is_none());
    }

    #[test]
    fn missing_title_is_malformed() {
        let mut raw = full_issue();
        raw.as_object_mut().unwrap().remove("title");
        let err = adapt(&raw, EntityKind::Issue, now()).unwrap_err();
        assert!(matches!(
            err,
            GhxError::MalformedEntity { kind: EntityKind::Issue, attribute: "title" }
        ));
    }

    #[test]
    fn null_required_attribute_is_malformed() {
        let mut raw = full_issue();
        raw["html_url"] = Value::Null;
        assert!(adapt(&raw, EntityKind::Issue, now()).is_err());
    }

    #[test]
    fn pull_request_states() {
        let base = json!({
            "number": 7,
            "title": "Add feature",
            "state": "closed",
            "html_url": "https://github.com/o/r/pull/7",
            "user": { "login": "octocat" }
        });

        let closed = adapt(&base, EntityKind::PullRequest, now()).unwrap();
        assert_eq!(closed.field("state"), Some("closed"));

        let mut merged = base.clone();
        merged["merged_at"] = json!("2024-05-01T00:00:00Z");
        let merged = adapt(&merged, EntityKind::PullRequest, now()).unwrap();
        assert_eq!(merged.field("state"), Some("merged"));
        assert_eq!(
            merged.fields[2].class,
            ColorClass::State(StateClass::Merged)
        );

        let mut draft = base.clone();
        draft["state"] = json!("open");
        draft["draft"] = json!(true);
        let draft = adapt(&draft, EntityKind::PullRequest, now()).unwrap();
        assert_eq!(draft.field("state"), Some("draft"));
        assert_eq!(draft.field("author"), Some("octocat"));
    }

    #[test]
    fn repository_schema_with_and_without_optionals() {
        let full = json!({
            "name": "ghx",
            "owner": { "login": "octocat" },
            "html_url": "https://github.com/octocat/ghx",
            "stargazers_count": 120,
            "language": "Rust",
            "description": "Numbered   listings"
        });
        let row = adapt(&full, EntityKind::Repository, now()).unwrap();
        assert_eq!(row.labels(), EntityKind::Repository.schema());
        assert_eq!(row.field("description"), Some("Numbered listings"));
        assert_eq!(row.field("stars"), Some("120"));

        let sparse = json!({
            "name": "ghx",
            "owner": { "login": "octocat" },
            "html_url": "https://github.com/octocat/ghx",
            "language": null,
            "description": ""
        });
        let row = adapt(&sparse, EntityKind::Repository, now()).unwrap();
        assert_eq!(row.labels(), EntityKind::Repository.schema());
        assert_eq!(row.field("language"), Some(EMPTY_FIELD));
        assert_eq!(row.field("description"), Some(EMPTY_FIELD));
    }

    #[test]
    fn every_kind_produces_its_schema() {
        let samples = [
            (EntityKind::Issue, full_issue()),
            (
                EntityKind::PullRequest,
                json!({"number": 1, "title": "t", "state": "open", "html_url": "https://github.com/o/r/pull/1"}),
            ),
            (
                EntityKind::Repository,
                json!({"name": "r", "owner": {"login": "o"}, "html_url": "https://github.com/o/r"}),
            ),
            (
                EntityKind::User,
                json!({"login": "o", "html_url": "https://github.com/o", "bio": "hi"}),
            ),
            (
                EntityKind::Notification,
                json!({"repository": {"full_name": "o/r"}, "subject": {"title": "t", "type": "Issue"}}),
            ),
            (
                EntityKind::TrendingRepo,
                json!({"full_name": "o/r", "html_url": "https://github.com/o/r"}),
            ),
            (
                EntityKind::FeedEvent,
                json!({"type": "WatchEvent", "actor": {"login": "a"}, "repo": {"name": "o/r"}}),
            ),
        ];
        for (kind, raw) in samples {
            let row = adapt(&raw, kind, now()).unwrap();
            assert_eq!(row.kind, kind);
            assert_eq!(row.labels(), kind.schema(), "schema mismatch for {}", kind);
        }
    }

    #[test]
    fn notification_url_points_at_web_page() {
        let raw = json!({
            "reason": "mention",
            "repository": { "full_name": "o/r", "html_url": "https://github.com/o/r" },
            "subject": {
                "title": "Fix it",
                "type": "PullRequest",
                "url": "https://api.github.com/repos/o/r/pulls/12"
            },
            "updated_at": "2024-05-31T12:00:00Z"
        });
        let row = adapt(&raw, EntityKind::Notification, now()).unwrap();
        assert_eq!(row.url, "https://github.com/o/r/pull/12");
        assert_eq!(row.field("reason"), Some("mention"));
        assert_eq!(row.field("updated"), Some("1d ago"));
    }

    #[test]
    fn notification_without_subject_url_falls_back_to_repo() {
        let raw = json!({
            "repository": { "full_name": "o/r", "html_url": "https://github.com/o/r" },
            "subject": { "title": "Q", "type": "Discussion", "url": null }
        });
        let row = adapt(&raw, EntityKind::Notification, now()).unwrap();
        assert_eq!(row.url, "https://github.com/o/r");
    }

    #[test]
    fn feed_events_are_described() {
        let comment = json!({
            "type": "IssueCommentEvent",
            "actor": { "login": "alice" },
            "repo": { "name": "o/r", "url": "https://api.github.com/repos/o/r" },
            "payload": {
                "action": "created",
                "issue": { "number": 115, "html_url": "https://github.com/o/r/issues/115" },
                "comment": {
                    "html_url": "https://github.com/o/r/issues/115#issuecomment-1",
                    "body": "Fixed"
                }
            },
            "created_at": "2024-06-01T11:59:30Z"
        });
        let row = adapt(&comment, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("action"), Some("commented on issue"));
        assert_eq!(row.field("target"), Some("o/r#115"));
        assert_eq!(row.field("created"), Some("just now"));
        assert_eq!(row.url, "https://github.com/o/r/issues/115#issuecomment-1");
        assert_eq!(row.body.as_deref(), Some("Fixed"));

        let merged = json!({
            "type": "PullRequestEvent",
            "actor": { "login": "bob" },
            "repo": { "name": "o/r" },
            "payload": {
                "action": "closed",
                "pull_request": { "number": 3, "merged": true, "html_url": "https://github.com/o/r/pull/3" }
            }
        });
        let row = adapt(&merged, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("action"), Some("merged pull request"));

        let create = json!({
            "type": "CreateEvent",
            "actor": { "login": "bob" },
            "repo": { "name": "o/r", "url": "https://api.github.com/repos/o/r" },
            "payload": { "ref": "master", "ref_type": "branch" }
        });
        let row = adapt(&create, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("action"), Some("created branch master"));
        assert_eq!(row.url, "https://github.com/o/r");

        let push = json!({
            "type": "PushEvent",
            "actor": { "login": "bob" },
            "repo": { "name": "o/r" },
            "payload": { "ref": "refs/heads/main" }
        });
        let row = adapt(&push, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("action"), Some("pushed to main"));
    }

    #[test]
    fn unknown_event_type_keeps_raw_name() {
        let raw = json!({
            "type": "SponsorshipEvent",
            "actor": { "login": "a" },
            "repo": { "name": "o/r" }
        });
        let row = adapt(&raw, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("action"), Some("SponsorshipEvent"));
    }

    #[test]
    fn api_urls_map_to_web_pages() {
        assert_eq!(
            html_url_from_api("https://api.github.com/repos/o/r/issues/5").as_deref(),
            Some("https://github.com/o/r/issues/5")
        );
        assert_eq!(
            html_url_from_api("https://ghe.corp/api/v3/repos/o/r/pulls/9").as_deref(),
            Some("https://ghe.corp/o/r/pull/9")
        );
        assert_eq!(
            html_url_from_api("https://api.github.com/repos/o/r").as_deref(),
            Some("https://github.com/o/r")
        );
        assert_eq!(html_url_from_api("https://example.com/x"), None);
    }

    #[test]
    fn unmapped_api_urls_fall_back_to_the_repository() {
        assert_eq!(
            html_url_from_api("https://api.github.com/repos/o/r/releases/123").as_deref(),
            Some("https://github.com/o/r")
        );
        assert_eq!(
            html_url_from_api("https://api.github.com/repos/o/r/commits/abc123").as_deref(),
            Some("https://github.com/o/r/commit/abc123")
        );
    }

    #[test]
    fn commit_comment_with_short_multibyte_sha() {
        let raw = json!({
            "type": "CommitCommentEvent",
            "actor": { "login": "a" },
            "repo": { "name": "o/r" },
            "payload": { "comment": { "commit_id": "ééééé", "html_url": "https://github.com/o/r/commit/x" } }
        });
        let row = adapt(&raw, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("target"), Some("o/r@ééééé"));

        let raw = json!({
            "type": "CommitCommentEvent",
            "actor": { "login": "a" },
            "repo": { "name": "o/r" },
            "payload": { "comment": { "commit_id": "0123456789abcdef" } }
        });
        let row = adapt(&raw, EntityKind::FeedEvent, now()).unwrap();
        assert_eq!(row.field("target"), Some("o/r@0123456"));
    }

    #[test]
    fn relative_time_buckets() {
        let now = now();
        assert_eq!(format_relative(now, now), "just now");
        assert_eq!(format_relative(now - chrono::Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative(now - chrono::Duration::days(2), now), "2d ago");
        assert_eq!(format_relative(now - chrono::Duration::days(90), now), "2024-03-03");
        assert_eq!(format_relative(now + chrono::Duration::hours(1), now), "just now");
    }
}
