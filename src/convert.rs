//! Rich text (GitHub-flavored markdown with embedded HTML) to plain,
//! wrapped terminal text.
//!
//! Markdown structure comes from `pulldown-cmark`; HTML fragments are
//! handled by a small tag scanner that keeps inner text and drops tags it
//! does not understand. Conversion never fails.
//!
//! The output is itself valid input that converts to the same text: inline
//! code keeps its backticks, and literal characters that would read as
//! markup again are backslash-escaped.

use pulldown_cmark::{Event, Options, Parser, Tag};
use textwrap::{WordSplitter, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

/// Narrowest width text is wrapped to, whatever the terminal reports.
const MIN_WIDTH: usize = 20;
const CODE_INDENT: &str = "    ";

pub fn image_placeholder(src: &str) -> String {
    format!("[image: {}]", src)
}

/// Converts `body` to plain text wrapped at `width` columns.
///
/// Converting the result again returns it unchanged.
pub fn to_plain_text(body: &str, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let normalized = body.replace("\r\n", "\n");
    let mut writer = Writer::new(width);
    for event in Parser::new_ext(&normalized, Options::ENABLE_STRIKETHROUGH) {
        writer.handle(event);
    }
    writer.finish()
}

/// Open markdown containers, popped on the matching end event.
enum Frame {
    Paragraph,
    Heading,
    Quote,
    Code,
    List,
    Item,
    Link { dest: String, start: usize },
    Image,
    HtmlBlock,
    Other,
}

/// Inline content of the block being built.
enum Piece {
    Text(String),
    Code(String),
}

impl Piece {
    fn as_str(&self) -> &str {
        match self {
            Piece::Text(text) | Piece::Code(text) => text,
        }
    }
}

/// Inline content after whitespace is collapsed; code spans stay whole.
enum Token {
    Char(char),
    Code(String),
}

struct Block {
    text: String,
    /// Joined to the previous block without a blank line (list items).
    tight: bool,
}

struct Writer {
    width: usize,
    blocks: Vec<Block>,
    inline: Vec<Piece>,
    frames: Vec<Frame>,
    heading_depth: usize,
    quote_depth: usize,
    image_depth: usize,
    code: Option<String>,
    /// Next number per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// Same as `lists`, for `<ul>`/`<ol>` tags.
    html_lists: Vec<Option<u64>>,
    /// Marker width of each open list item, outermost first.
    item_widths: Vec<usize>,
    item_marker: Option<String>,
    list_started: bool,
    last_marked: bool,
    partial_tag: String,
    html_links: Vec<(Option<String>, usize)>,
}

impl Writer {
    fn new(width: usize) -> Self {
        Self {
            width,
            blocks: Vec::new(),
            inline: Vec::new(),
            frames: Vec::new(),
            heading_depth: 0,
            quote_depth: 0,
            image_depth: 0,
            code: None,
            lists: Vec::new(),
            html_lists: Vec::new(),
            item_widths: Vec::new(),
            item_marker: None,
            list_started: false,
            last_marked: false,
            partial_tag: String::new(),
            html_links: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                if self.image_depth == 0 {
                    self.inline.push(Piece::Code(code.to_string()));
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_html(&html),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.flush_inline(),
            Event::Rule => self.push_rule(),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { .. } => {
                self.flush_inline();
                self.heading_depth += 1;
                Frame::Heading
            }
            Tag::BlockQuote(_) => {
                self.flush_inline();
                self.quote_depth += 1;
                Frame::Quote
            }
            Tag::CodeBlock(_) => {
                self.flush_inline();
                self.code = Some(String::new());
                Frame::Code
            }
            Tag::List(start) => {
                self.flush_inline();
                if !self.in_list() {
                    self.list_started = true;
                }
                self.lists.push(start);
                Frame::List
            }
            Tag::Item => {
                self.flush_inline();
                let marker = next_marker(self.lists.last_mut());
                self.item_widths.push(marker.width());
                self.item_marker = Some(marker);
                Frame::Item
            }
            Tag::Link { dest_url, .. } => Frame::Link {
                dest: dest_url.to_string(),
                start: self.inline.len(),
            },
            Tag::Image { dest_url, .. } => {
                if self.image_depth == 0 {
                    self.push_text(&format!(" {} ", image_placeholder(&dest_url)));
                }
                self.image_depth += 1;
                Frame::Image
            }
            Tag::HtmlBlock => {
                self.flush_inline();
                Frame::HtmlBlock
            }
            _ => Frame::Other,
        };
        self.frames.push(frame);
    }

    fn end(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph => self.flush_inline(),
            Frame::Heading => {
                self.flush_inline();
                self.heading_depth = self.heading_depth.saturating_sub(1);
            }
            Frame::Quote => {
                self.flush_inline();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Frame::Code => {
                let code = self.code.take().unwrap_or_default();
                self.push_code_block(&code);
            }
            Frame::List => {
                self.flush_inline();
                self.lists.pop();
            }
            Frame::Item => {
                self.flush_inline();
                self.item_widths.pop();
                self.item_marker = None;
            }
            Frame::Link { dest, start } => self.close_link(Some(dest), start),
            Frame::Image => self.image_depth = self.image_depth.saturating_sub(1),
            Frame::HtmlBlock => {
                let leftover = std::mem::take(&mut self.partial_tag);
                self.push_text(&leftover);
                self.flush_inline();
            }
            Frame::Other => {}
        }
    }

    fn in_list(&self) -> bool {
        !self.lists.is_empty() || !self.html_lists.is_empty() || !self.item_widths.is_empty()
    }

    fn push_text(&mut self, text: &str) {
        if self.image_depth > 0 || text.is_empty() {
            return;
        }
        let text = if self.heading_depth > 0 {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        self.inline.push(Piece::Text(text));
    }

    /// Appends ` (url)` after link text unless the text already is the url.
    fn close_link(&mut self, dest: Option<String>, start: usize) {
        let Some(dest) = dest.filter(|d| !d.is_empty() && !d.starts_with('#')) else {
            return;
        };
        let text: String = self
            .inline
            .get(start..)
            .unwrap_or_default()
            .iter()
            .map(Piece::as_str)
            .collect();
        let text = text.trim();
        let bare = dest.trim_start_matches("mailto:");
        if text != dest && text != bare {
            self.push_text(&format!(" ({})", dest));
        }
    }

    fn push_html(&mut self, html: &str) {
        let mut input = std::mem::take(&mut self.partial_tag);
        input.push_str(html);
        let mut rest = input.as_str();

        while let Some(start) = rest.find('<') {
            self.push_html_text(&rest[..start]);
            let candidate = &rest[start..];

            if let Some(comment) = candidate.strip_prefix("<!--") {
                match comment.find("-->") {
                    Some(end) => rest = &comment[end + 3..],
                    None => {
                        self.partial_tag = candidate.to_string();
                        return;
                    }
                }
                continue;
            }

            let looks_like_tag = candidate[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
            if !looks_like_tag {
                self.push_html_text("<");
                rest = &candidate[1..];
                continue;
            }

            match candidate.find('>') {
                Some(end) => {
                    self.apply_tag(&candidate[1..end]);
                    rest = &candidate[end + 1..];
                }
                None => {
                    self.partial_tag = candidate.to_string();
                    return;
                }
            }
        }
        self.push_html_text(rest);
    }

    fn push_html_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let decoded = decode_entities(text);
        self.push_text(&decoded);
    }

    fn apply_tag(&mut self, raw: &str) {
        let raw = raw.trim();
        let closing = raw.starts_with('/');
        let body = raw.trim_start_matches('/').trim_end_matches('/');
        let name = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("img", false) => {
                if let Some(src) = attribute(body, "src") {
                    self.push_text(&format!(" {} ", image_placeholder(&src)));
                }
            }
            ("br", _) => self.flush_inline(),
            ("hr", false) => self.push_rule(),
            ("ul" | "ol", false) => {
                self.flush_inline();
                if !self.in_list() {
                    self.list_started = true;
                }
                let start = (name == "ol").then(|| {
                    attribute(body, "start")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(1)
                });
                self.html_lists.push(start);
            }
            ("ul" | "ol", true) => {
                self.flush_inline();
                self.html_lists.pop();
            }
            ("li", false) => {
                self.flush_inline();
                if !self.in_list() && !self.last_marked {
                    self.list_started = true;
                }
                self.item_marker = Some(next_marker(self.html_lists.last_mut()));
            }
            ("li", true) => {
                self.flush_inline();
                self.item_marker = None;
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => {
                self.flush_inline();
                self.heading_depth += 1;
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
                self.flush_inline();
                self.heading_depth = self.heading_depth.saturating_sub(1);
            }
            ("a", false) => {
                let href = attribute(body, "href");
                self.html_links.push((href, self.inline.len()));
            }
            ("a", true) => {
                if let Some((href, start)) = self.html_links.pop() {
                    self.close_link(href, start);
                }
            }
            (
                "p" | "div" | "table" | "tr" | "pre" | "blockquote" | "details" | "summary"
                | "dl" | "dt" | "dd",
                _,
            ) => self.flush_inline(),
            _ => {}
        }
    }

    /// Line prefixes (first line, continuation lines) for the block being flushed.
    fn prefixes(&mut self) -> (String, String) {
        let quote = "> ".repeat(self.quote_depth);
        let outer: usize = self.item_widths.iter().rev().skip(1).sum();
        let own = self.item_widths.last().copied().unwrap_or(0);
        let base = format!("{}{}", quote, " ".repeat(outer));
        match self.item_marker.take() {
            Some(marker) => {
                let hang = " ".repeat(marker.width());
                (format!("{}{}", base, marker), format!("{}{}", base, hang))
            }
            None => {
                let indent = format!("{}{}", base, " ".repeat(own));
                (indent.clone(), indent)
            }
        }
    }

    fn flush_inline(&mut self) {
        let pieces = std::mem::take(&mut self.inline);
        let escaped = escape_inline(&tokens(&pieces));
        if escaped.is_empty() {
            return;
        }
        let marked = self.item_marker.is_some();
        let (first, rest) = self.prefixes();
        let available = self.width.saturating_sub(first.width()).max(MIN_WIDTH / 2);
        let options = textwrap::Options::new(available)
            .break_words(true)
            .word_splitter(WordSplitter::NoHyphenation)
            .wrap_algorithm(WrapAlgorithm::FirstFit);

        let text = textwrap::wrap(&escaped, options)
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let prefix = if i == 0 { &first } else { &rest };
                format!("{}{}", prefix, escape_line_start(line))
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.push_block(text, marked);
    }

    fn push_code_block(&mut self, code: &str) {
        let marked = self.item_marker.is_some();
        let (first, rest) = self.prefixes();
        let text = code
            .trim_end_matches('\n')
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    let prefix = if i == 0 { &first } else { &rest };
                    format!("{}{}{}", prefix, CODE_INDENT, line.trim_end())
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        if !text.trim().is_empty() {
            self.push_block(text, marked);
        }
    }

    fn push_rule(&mut self) {
        self.flush_inline();
        self.push_block("-".repeat(self.width.min(40)), false);
    }

    /// `marked` blocks carry a list marker and sit directly under the
    /// previous block, except the first item of a list.
    fn push_block(&mut self, text: String, marked: bool) {
        let tight = marked && !self.list_started && !self.blocks.is_empty();
        if marked {
            self.list_started = false;
        }
        self.last_marked = marked;
        self.blocks.push(Block { text, tight });
    }

    fn finish(mut self) -> String {
        let leftover = std::mem::take(&mut self.partial_tag);
        self.push_text(&leftover);
        self.flush_inline();

        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push_str(if block.tight { "\n" } else { "\n\n" });
            }
            out.push_str(&block.text);
        }
        out
    }
}

fn next_marker(list: Option<&mut Option<u64>>) -> String {
    match list {
        Some(Some(next)) => {
            let marker = format!("{}. ", next);
            *next += 1;
            marker
        }
        _ => "- ".to_string(),
    }
}

/// Collapses whitespace runs to one space and trims both ends.
fn tokens(pieces: &[Piece]) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => {
                for c in text.chars() {
                    let c = if c.is_whitespace() { ' ' } else { c };
                    let after_space = matches!(tokens.last(), None | Some(Token::Char(' ')));
                    if c == ' ' && after_space {
                        continue;
                    }
                    tokens.push(Token::Char(c));
                }
            }
            Piece::Code(code) => tokens.push(Token::Code(code.clone())),
        }
    }
    while matches!(tokens.last(), Some(Token::Char(' '))) {
        tokens.pop();
    }
    tokens
}

/// Code spans count as punctuation to their neighbours.
fn char_at(tokens: &[Token], i: usize) -> Option<char> {
    tokens.get(i).map(|token| match token {
        Token::Char(c) => *c,
        Token::Code(_) => '`',
    })
}

/// Backslash-escapes every literal character that markdown would otherwise
/// read as markup, and writes code spans with a fence they cannot close early.
fn escape_inline(tokens: &[Token]) -> String {
    let count = |d: char| {
        tokens
            .iter()
            .filter(|t| matches!(t, Token::Char(c) if *c == d))
            .count()
    };
    let (stars, underscores, tildes) = (count('*') > 1, count('_') > 1, count('~') > 1);
    let definition = tokens
        .windows(2)
        .any(|pair| matches!(pair, [Token::Char(']'), Token::Char(':')]));

    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let c = match token {
            Token::Code(code) => {
                out.push_str(&code_span(code));
                continue;
            }
            Token::Char(c) => *c,
        };
        let prev = i.checked_sub(1).and_then(|j| char_at(tokens, j));
        let next = char_at(tokens, i + 1);
        // A delimiter with whitespace on both sides can neither open nor close.
        let spaced = prev.map_or(true, |p| p == ' ') && next.map_or(true, |n| n == ' ');
        let intraword = prev.is_some_and(char::is_alphanumeric) && next.is_some_and(char::is_alphanumeric);

        let escape = match c {
            '\\' => !next.is_some_and(char::is_alphanumeric),
            '`' => true,
            '*' => stars && !spaced,
            '_' => underscores && !spaced && !intraword,
            '~' => tildes && !spaced,
            '&' => entity_follows(&tokens[i + 1..]),
            '<' => next.is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')),
            ']' => matches!(next, Some('(' | '[')),
            '[' => i == 0 && definition,
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// True when `name;` follows, e.g. the `amp;` of `&amp;`.
fn entity_follows(tokens: &[Token]) -> bool {
    for (n, token) in tokens.iter().enumerate().take(33) {
        match token {
            Token::Char(';') => return n > 0,
            Token::Char(c) if c.is_ascii_alphanumeric() || (*c == '#' && n == 0) => {}
            _ => return false,
        }
    }
    false
}

fn code_span(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        run = if c == '`' { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    let fence = "`".repeat(longest + 1);
    let padded = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    if padded {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

/// Escapes a wrapped line that would otherwise start a heading, quote,
/// list item, rule or setext underline.
fn escape_line_start(line: &str) -> String {
    let Some(first) = line.chars().next() else {
        return String::new();
    };
    if first == '\\' {
        return line.to_string();
    }
    let ends_marker = |at: usize| line[at..].chars().next().map_or(true, |c| c == ' ');

    let hashes = line.chars().take_while(|c| *c == '#').count();
    let heading = (1..=6).contains(&hashes) && ends_marker(hashes);
    let bullet = matches!(first, '-' | '+' | '*') && ends_marker(1);
    let underline = matches!(first, '=' | '-') && line.chars().all(|c| c == first);
    let marks: Vec<char> = line.chars().filter(|c| *c != ' ').collect();
    let rule = matches!(first, '-' | '*' | '_') && marks.len() >= 3 && marks.iter().all(|c| *c == first);

    if heading || bullet || underline || rule || first == '>' {
        return format!("\\{}", line);
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let ordered = (1..=9).contains(&digits)
        && matches!(line[digits..].chars().next(), Some('.' | ')'))
        && ends_marker(digits + 1);
    if ordered {
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }
    line.to_string()
}

/// Value of `name="..."` (or single-quoted / bare) inside a tag body.
fn attribute(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let mut search = 0;
    while let Some(found) = lower[search..].find(name) {
        let at = search + found;
        search = at + name.len();
        let preceded_ok = lower[..at]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        let after = lower[search..].trim_start();
        if !preceded_ok || !after.starts_with('=') {
            continue;
        }
        let value_start = tag.len() - after.len() + 1;
        let value = tag[value_start..].trim_start();
        let parsed = match value.chars().next() {
            Some(quote @ ('"' | '\'')) => value[1..].split(quote).next().unwrap_or_default(),
            Some(_) => value.split_whitespace().next().unwrap_or_default(),
            None => "",
        };
        let parsed = decode_entities(parsed);
        return (!parsed.is_empty()).then_some(parsed);
    }
    None
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 60;

    #[test]
    fn bold_tags_are_stripped_and_images_replaced() {
        let body = "This is <b>bold</b> text.\n\n<img src=\"https://example.com/shot.png\" alt=\"shot\">";
        let out = to_plain_text(body, W);
        assert!(out.contains("bold"));
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(out.contains("[image: https://example.com/shot.png]"));
    }

    #[test]
    fn markdown_image_becomes_placeholder_without_alt_text() {
        let out = to_plain_text("See ![screenshot](https://example.com/a.png) here", W);
        assert_eq!(out, "See [image: https://example.com/a.png] here");
    }

    #[test]
    fn headings_and_emphasis() {
        let out = to_plain_text("# Release notes\n\nSome *emphasis* and **strong** `code`.", W);
        assert_eq!(out, "RELEASE NOTES\n\nSome emphasis and strong `code`.");
    }

    #[test]
    fn inline_code_keeps_markup_literal() {
        assert_eq!(
            to_plain_text("The `<div>` tag breaks layout", W),
            "The `<div>` tag breaks layout"
        );
        assert_eq!(
            to_plain_text("Escape it as `\\*` or `&amp;`", W),
            "Escape it as `\\*` or `&amp;`"
        );
        assert_eq!(to_plain_text("Use `` a`b `` here", W), "Use ``a`b`` here");
    }

    #[test]
    fn escaped_markup_stays_escaped() {
        assert_eq!(to_plain_text("\\*not emphasis\\*", W), "\\*not emphasis\\*");
        assert_eq!(
            to_plain_text("&amp;lt;b&amp;gt; double escaped", W),
            "\\&lt;b\\&gt; double escaped"
        );
        assert_eq!(to_plain_text("a \\<b> tag", W), "a \\<b> tag");
    }

    #[test]
    fn line_starts_that_look_like_blocks_are_escaped() {
        assert_eq!(to_plain_text("\\- not a list", W), "\\- not a list");
        assert_eq!(to_plain_text("\\# not a heading", W), "\\# not a heading");
        assert_eq!(to_plain_text("1\\. not a list", W), "1\\. not a list");
        assert_eq!(to_plain_text("\\> not a quote", W), "\\> not a quote");
    }

    #[test]
    fn deeply_nested_entities_convert_in_one_step() {
        let body = format!("&{}lt;b", "amp;".repeat(12));
        let once = to_plain_text(&body, W);
        assert!(once.starts_with("\\&amp;"), "{:?}", once);
        assert_eq!(to_plain_text(&once, W), once);
    }

    #[test]
    fn long_words_are_broken_at_width() {
        let word = "x".repeat(80);
        let out = to_plain_text(&word, 30);
        for line in out.lines() {
            assert!(line.width() <= 30, "too wide: {:?}", line);
        }
        assert_eq!(out.replace('\n', ""), word);
    }

    #[test]
    fn hard_breaks_start_a_new_paragraph() {
        assert_eq!(to_plain_text("first  \nsecond", W), "first\n\nsecond");
        assert_eq!(to_plain_text("<p>first<br>second</p>", W), "first\n\nsecond");
    }

    #[test]
    fn links_show_their_target() {
        let out = to_plain_text("Read [the docs](https://docs.rs) or <https://crates.io>.", W);
        assert_eq!(out, "Read the docs (https://docs.rs) or https://crates.io.");
    }

    #[test]
    fn paragraphs_are_rewrapped() {
        let body = "one two three four five six seven eight nine ten eleven twelve thirteen \
                    fourteen fifteen sixteen\nseventeen\n\nSecond paragraph.";
        let out = to_plain_text(body, 30);
        for line in out.lines() {
            assert!(line.width() <= 30, "too wide: {:?}", line);
        }
        assert!(out.contains("\n\nSecond paragraph."));
        assert!(out.starts_with("one two three four five six"));
    }

    #[test]
    fn lists_keep_one_item_per_line() {
        let out = to_plain_text("* first\n* second\n\n1. one\n2. two", W);
        assert_eq!(out, "- first\n- second\n\n1. one\n2. two");
    }

    #[test]
    fn html_lists_get_markers() {
        assert_eq!(to_plain_text("<ul><li>one</li><li>two</li></ul>", W), "- one\n- two");
        assert_eq!(
            to_plain_text("<ol start=\"3\"><li>three</li><li>four</li></ol>", W),
            "3. three\n4. four"
        );
    }

    #[test]
    fn code_blocks_are_kept_verbatim() {
        let out = to_plain_text("Run:\n\n```sh\ncargo   build\n```", W);
        assert_eq!(out, "Run:\n\n    cargo   build");
    }

    #[test]
    fn quotes_are_prefixed() {
        let out = to_plain_text("> quoted text", W);
        assert_eq!(out, "> quoted text");
    }

    #[test]
    fn unknown_tags_keep_inner_text() {
        let out = to_plain_text("<details><summary>More</summary><custom-tag>inner</custom-tag></details>", W);
        assert!(out.contains("More"));
        assert!(out.contains("inner"));
        assert!(!out.contains("custom-tag"));
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        for body in ["<b>unclosed", "<img src=", "a < b > c", "&#xZZ; &bogus;", "<!-- open", "**", "<<<>>>"] {
            let _ = to_plain_text(body, W);
        }
        assert_eq!(to_plain_text("", W), "");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#65;&#x42;"), "a & b <c> AB");
        assert_eq!(decode_entities("AT&T"), "AT&T");
    }

    #[test]
    fn attributes_are_found_in_any_quote_style() {
        assert_eq!(attribute("img src=\"a.png\" alt=x", "src").as_deref(), Some("a.png"));
        assert_eq!(attribute("img alt='x' src='b.png'", "src").as_deref(), Some("b.png"));
        assert_eq!(attribute("img src=c.png", "src").as_deref(), Some("c.png"));
        assert_eq!(attribute("img data-src=\"d.png\"", "src"), None);
    }

    #[test]
    fn conversion_is_idempotent() {
        let nested_entity = format!("&{}gt; end", "amp;".repeat(12));
        let long_word = format!("see {} now", "y".repeat(70));
        let bodies = [
            "Plain text only",
            "# Title\n\nSome <b>bold</b> and <i>italic</i>.\n\n![img](https://x.io/a.png)",
            "* a\n* b\n  * nested item with a fairly long line that needs to wrap around\n* c",
            "<p>Hello<br>World</p><ul><li>one</li><li>two</li></ul>",
            "> quote\n>\n> second paragraph of the quote",
            "```\nfn main() {}\n```\n\nafter",
            "&amp;lt;b&amp;gt; double escaped",
            "Trailing hard break  \nnext line",
            "a * b * c and 2*3*4",
            "---\n\nText after rule",
            "1. first\n2. second\n\n   continued paragraph in item",
            "The `<div>` tag and `\\*` and `&amp;` spans",
            "snake_case_name and __init__ and ~~gone~~",
            "\\[label\\]: not a definition",
            "a list - b + c > d # e 1. f",
            "C:\\Users\\me and trailing \\",
            &nested_entity,
            &long_word,
        ];
        for body in bodies {
            for width in [20, 40, 80] {
                let once = to_plain_text(body, width);
                let twice = to_plain_text(&once, width);
                assert_eq!(once, twice, "not idempotent for {:?} at {}", body, width);
            }
        }
    }
}
