//! Lays out a listing of [`Row`]s as an aligned terminal table.
//!
//! Layout is computed on plain text first; colors are wrapped around the
//! already padded cells afterwards, so stripping the escape codes from a
//! colored table yields the uncolored table byte for byte.

use crossterm::style::{style, Color, Stylize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::{GhxError, Result};
use crate::types::{ColorClass, Row, StateClass};

pub const NO_RESULTS: &str = "No results.";
const ELLIPSIS: char = '…';
const GAP: &str = "  ";
/// The last column never shrinks below this when fitting the terminal.
const MIN_LAST_COLUMN: usize = 8;

/// One color per state plus the handful of accent colors tables use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub open: Color,
    pub closed: Color,
    pub merged: Color,
    pub draft: Color,
    pub position: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            open: Color::Green,
            closed: Color::Red,
            merged: Color::Magenta,
            draft: Color::DarkGrey,
            position: Color::Magenta,
            accent: Color::Cyan,
            muted: Color::Yellow,
        }
    }
}

impl Palette {
    pub fn state(&self, state: StateClass) -> Color {
        match state {
            StateClass::Open => self.open,
            StateClass::Closed => self.closed,
            StateClass::Merged => self.merged,
            StateClass::Draft => self.draft,
        }
    }

    pub fn color_for(&self, class: ColorClass) -> Option<Color> {
        match class {
            ColorClass::Plain => None,
            ColorClass::Accent => Some(self.accent),
            ColorClass::Muted => Some(self.muted),
            ColorClass::State(state) => Some(self.state(state)),
        }
    }
}

/// Per-invocation rendering settings. Never persisted.
#[derive(Debug, Clone)]
pub struct Directive {
    pub terminal_width: usize,
    /// Visible lines before output is handed to the pager.
    pub page_threshold: usize,
    pub max_column_width: usize,
    pub color_enabled: bool,
    pub pager_enabled: bool,
    pub browser_open: bool,
    pub palette: Palette,
}

impl Default for Directive {
    fn default() -> Self {
        Self {
            terminal_width: 100,
            page_threshold: 40,
            max_column_width: 40,
            color_enabled: false,
            pager_enabled: false,
            browser_open: false,
            palette: Palette::default(),
        }
    }
}

impl Directive {
    pub fn paint(&self, text: &str, color: Option<Color>) -> String {
        match color {
            Some(color) if self.color_enabled => style(text).with(color).to_string(),
            _ => text.to_string(),
        }
    }
}

struct Cell {
    text: String,
    pad: usize,
    color: Option<Color>,
}

/// Renders rows of a single kind. Zero rows render as [`NO_RESULTS`].
pub fn render(rows: &[Row], directive: &Directive) -> Result<String> {
    let Some(first) = rows.first() else {
        return Ok(format!("{}\n", NO_RESULTS));
    };
    let kind = first.kind;
    if let Some(other) = rows.iter().find(|row| row.kind != kind) {
        return Err(GhxError::HeterogeneousRows {
            expected: kind,
            found: other.kind,
        });
    }

    let labels = kind.schema();
    let positions: Vec<String> = rows.iter().map(|row| format!("{}.", row.position)).collect();
    let position_width = positions.iter().map(|p| p.width()).max().unwrap_or(0);

    let max_width = directive.max_column_width.max(1);
    let mut widths: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            rows.iter()
                .filter_map(|row| row.fields.get(i))
                .map(|f| f.value.width())
                .chain(std::iter::once(label.width()))
                .max()
                .unwrap_or(0)
                .min(max_width)
        })
        .collect();
    fit_last_column(&mut widths, position_width, directive.terminal_width);

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let header: Vec<Cell> = labels
        .iter()
        .zip(&widths)
        .map(|(label, &width)| layout_cell(label, width, None))
        .collect();
    lines.push(join_line(
        layout_cell("", position_width, None),
        header,
        directive,
    ));

    for (row, position) in rows.iter().zip(positions) {
        let cells = row
            .fields
            .iter()
            .zip(&widths)
            .map(|(field, &width)| {
                layout_cell(&field.value, width, directive.palette.color_for(field.class))
            })
            .collect();
        let position = layout_cell(&position, position_width, Some(directive.palette.position));
        lines.push(join_line(position, cells, directive));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Shrinks the last column so a full line fits `terminal_width`.
fn fit_last_column(widths: &mut [usize], position_width: usize, terminal_width: usize) {
    let Some((last, rest)) = widths.split_last_mut() else {
        return;
    };
    let fixed = position_width + rest.iter().sum::<usize>() + GAP.len() * (rest.len() + 1);
    let available = terminal_width.saturating_sub(fixed).max(MIN_LAST_COLUMN);
    *last = (*last).min(available);
}

fn layout_cell(value: &str, width: usize, color: Option<Color>) -> Cell {
    let text = truncate(value, width);
    let pad = width.saturating_sub(text.width());
    Cell { text, pad, color }
}

fn join_line(position: Cell, cells: Vec<Cell>, directive: &Directive) -> String {
    let mut line = String::new();
    let all = std::iter::once(position).chain(cells);
    for (i, cell) in all.enumerate() {
        if i > 0 {
            line.push_str(GAP);
        }
        line.push_str(&directive.paint(&cell.text, cell.color));
        line.push_str(&" ".repeat(cell.pad));
    }
    line.trim_end().to_string()
}

/// Cuts `value` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate(value: &str, width: usize) -> String {
    if value.width() <= width {
        return value.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let budget = width - ELLIPSIS.width().unwrap_or(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in value.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityKind, Field};

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn repo_row(position: usize, name: &str, description: &str) -> Row {
        Row {
            position,
            kind: EntityKind::Repository,
            url: format!("https://github.com/o/{}", name),
            fields: vec![
                Field { label: "name", value: name.to_string(), class: ColorClass::Accent },
                Field { label: "owner", value: "o".to_string(), class: ColorClass::Plain },
                Field { label: "stars", value: "12".to_string(), class: ColorClass::Muted },
                Field { label: "language", value: "Rust".to_string(), class: ColorClass::Plain },
                Field { label: "description", value: description.to_string(), class: ColorClass::Plain },
            ],
            body: None,
        }
    }

    fn issue_row(position: usize, state: StateClass) -> Row {
        Row {
            position,
            kind: EntityKind::Issue,
            url: format!("https://github.com/o/r/issues/{}", position),
            fields: vec![
                Field { label: "#", value: position.to_string(), class: ColorClass::Accent },
                Field { label: "title", value: "title".to_string(), class: ColorClass::Plain },
                Field { label: "state", value: state.to_string(), class: ColorClass::State(state) },
                Field { label: "comments", value: "0".to_string(), class: ColorClass::Plain },
                Field { label: "updated", value: "1d ago".to_string(), class: ColorClass::Muted },
            ],
            body: None,
        }
    }

    #[test]
    fn empty_listing_renders_no_results_line() {
        let out = render(&[], &Directive::default()).unwrap();
        assert_eq!(out, "No results.\n");
    }

    #[test]
    fn columns_are_aligned() {
        let rows = vec![
            repo_row(1, "a", "short"),
            repo_row(2, "longer-name", "another description"),
        ];
        let out = render(&rows, &Directive::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "    name         owner  stars  language  description");
        assert_eq!(lines[1], "1.  a            o      12     Rust      short");
        assert_eq!(lines[2], "2.  longer-name  o      12     Rust      another description");
    }

    #[test]
    fn long_values_are_truncated_with_ellipsis() {
        let directive = Directive {
            max_column_width: 10,
            ..Directive::default()
        };
        let rows = vec![repo_row(1, "a-very-long-repository-name", "d")];
        let out = render(&rows, &directive).unwrap();
        assert!(out.contains("a-very-lo…"));
        assert!(!out.contains("a-very-long"));
    }

    #[test]
    fn last_column_fits_terminal_width() {
        let directive = Directive {
            terminal_width: 50,
            ..Directive::default()
        };
        let rows = vec![repo_row(1, "r", &"x".repeat(60))];
        let out = render(&rows, &directive).unwrap();
        for line in out.lines() {
            assert!(line.width() <= 50, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let rows = vec![repo_row(1, "a", "d"), issue_row(2, StateClass::Open)];
        let err = render(&rows, &Directive::default()).unwrap_err();
        assert!(matches!(
            err,
            GhxError::HeterogeneousRows {
                expected: EntityKind::Repository,
                found: EntityKind::Issue
            }
        ));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rows = vec![issue_row(1, StateClass::Open), issue_row(2, StateClass::Closed)];
        let directive = Directive {
            color_enabled: true,
            ..Directive::default()
        };
        assert_eq!(
            render(&rows, &directive).unwrap(),
            render(&rows, &directive).unwrap()
        );
    }

    #[test]
    fn color_does_not_change_layout() {
        let rows = vec![
            issue_row(1, StateClass::Open),
            issue_row(2, StateClass::Merged),
            issue_row(10, StateClass::Draft),
        ];
        let plain = render(&rows, &Directive::default()).unwrap();
        let colored = render(
            &rows,
            &Directive {
                color_enabled: true,
                ..Directive::default()
            },
        )
        .unwrap();
        assert_ne!(plain, colored);
        assert!(colored.contains('\x1b'));
        assert_eq!(strip_ansi(&colored), plain);
    }

    #[test]
    fn each_state_has_its_own_color() {
        let palette = Palette::default();
        let states = [
            StateClass::Open,
            StateClass::Closed,
            StateClass::Merged,
            StateClass::Draft,
        ];
        for a in states {
            assert_eq!(palette.state(a), palette.state(a));
            for b in states {
                if a != b {
                    assert_ne!(palette.state(a), palette.state(b));
                }
            }
        }
    }

    #[test]
    fn truncate_respects_wide_characters() {
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcd", 3), "ab…");
        assert_eq!(truncate("abcd", 0), "");
    }
}
