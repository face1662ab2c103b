//! Detail view for a single item: its table fields as a header block,
//! then the converted body and any comments.

use chrono::{DateTime, Utc};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::adapter;
use crate::convert::to_plain_text;
use crate::error::Result;
use crate::render::Directive;
use crate::source::Detail;
use crate::types::EMPTY_FIELD;

const COMMENT_INDENT: &str = "    ";

pub fn render_detail(detail: &Detail, directive: &Directive, now: DateTime<Utc>) -> Result<String> {
    let row = adapter::adapt(&detail.entity, detail.kind, now)?;
    let width = directive.terminal_width;
    let palette = &directive.palette;

    let shown: Vec<_> = row.fields.iter().filter(|f| f.value != EMPTY_FIELD).collect();
    let label_width = shown.iter().map(|f| f.label.width()).max().unwrap_or(0);
    let mut lines = Vec::new();

    for field in shown {
        let pad = " ".repeat(label_width - field.label.width());
        lines.push(format!(
            "{}{}  {}",
            directive.paint(field.label, Some(palette.muted)),
            pad,
            directive.paint(&field.value, palette.color_for(field.class)),
        ));
    }
    lines.push(directive.paint(&row.url, Some(palette.accent)));

    if let Some(body) = row.body.as_deref() {
        lines.push(String::new());
        lines.push(to_plain_text(body, width));
    }

    for comment in &detail.comments {
        let Some(body) = comment.get("body").and_then(Value::as_str) else {
            continue;
        };
        let author = comment
            .pointer("/user/login")
            .and_then(Value::as_str)
            .unwrap_or(EMPTY_FIELD);
        let when = comment
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|then| adapter::format_relative(then.with_timezone(&Utc), now))
            .unwrap_or_else(|| EMPTY_FIELD.to_string());

        lines.push(String::new());
        lines.push(format!(
            "{} {}",
            directive.paint(&format!("@{}", author), Some(palette.accent)),
            directive.paint(&when, Some(palette.muted)),
        ));
        let text = to_plain_text(body, width.saturating_sub(COMMENT_INDENT.len()));
        for line in text.lines() {
            if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{}{}", COMMENT_INDENT, line));
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
