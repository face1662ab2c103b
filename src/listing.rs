//! The listing and `view N` pipelines: source → adapter → index → renderer → sink.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::adapter;
use crate::detail;
use crate::error::{GhxError, Result};
use crate::index::IndexCache;
use crate::output::{Delivery, OutputSink};
use crate::render::{self, Directive};
use crate::source::{Query, Source};
use crate::types::{EntityKind, Row};

/// Rows that survived adaptation, plus what was dropped on the way.
#[derive(Debug)]
pub struct Listing {
    pub rows: Vec<Row>,
    pub skipped: Vec<GhxError>,
}

impl Listing {
    /// Adapts every raw entity as `kind`. Malformed entities are skipped,
    /// the rest are numbered 1..=n in order.
    pub fn build(raws: &[Value], kind: EntityKind, now: DateTime<Utc>) -> Self {
        let mut rows = Vec::with_capacity(raws.len());
        let mut skipped = Vec::new();

        for raw in raws {
            match adapter::adapt(raw, kind, now) {
                Ok(mut row) => {
                    row.position = rows.len() + 1;
                    rows.push(row);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping entity");
                    skipped.push(e);
                }
            }
        }

        Self { rows, skipped }
    }

    pub fn entries(&self) -> Vec<(String, EntityKind)> {
        self.rows.iter().map(|r| (r.url.clone(), r.kind)).collect()
    }

    /// The table, followed by a skipped-count notice when anything was dropped.
    pub fn render(&self, directive: &Directive) -> Result<String> {
        let mut text = render::render(&self.rows, directive)?;
        if let Some(notice) = skipped_notice(self.skipped.len()) {
            text.push_str(&directive.paint(&notice, Some(directive.palette.muted)));
            text.push('\n');
        }
        Ok(text)
    }
}

pub fn skipped_notice(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 item skipped".to_string()),
        n => Some(format!("{} items skipped", n)),
    }
}

/// Fetches, indexes, renders and delivers one listing.
///
/// The index is replaced before anything is printed so `view N` always
/// matches the numbers on screen.
pub async fn run_list<S, W>(
    source: &S,
    query: &Query,
    limit: usize,
    cache: &IndexCache,
    sink: &mut OutputSink<W>,
    directive: &Directive,
) -> Result<Listing>
where
    S: Source + ?Sized,
    W: Write,
{
    let raws = source.list(query, limit).await?;
    tracing::debug!(source = source.name(), count = raws.len(), "fetched listing");

    let listing = Listing::build(&raws, query.kind(), Utc::now());
    cache.replace(&listing.entries())?;

    let text = listing.render(directive)?;
    sink.deliver(&text, None, directive)?;
    Ok(listing)
}

/// Resolves a number from the last listing to its (url, kind).
pub fn view(cache: &IndexCache, position: usize) -> Result<(String, EntityKind)> {
    cache.resolve(position)
}

/// `view N`: opens the item in the browser, or fetches and shows its detail view.
pub async fn run_view<S, W>(
    source: &S,
    cache: &IndexCache,
    position: usize,
    sink: &mut OutputSink<W>,
    directive: &Directive,
) -> Result<Delivery>
where
    S: Source + ?Sized,
    W: Write,
{
    let (url, kind) = view(cache, position)?;

    if directive.browser_open {
        return sink.deliver(&url, Some(&url), directive);
    }

    let fetched = source.fetch(&url, kind).await?;
    let text = detail::render_detail(&fetched, directive, Utc::now())?;
    sink.deliver(&text, Some(&url), &Directive { browser_open: false, ..directive.clone() })
}
