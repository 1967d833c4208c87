//! Converts display HTML into styled terminal lines.
//!
//! This is a presentation pass over markup that has already gone through the
//! sanitizing sink. It understands the block and inline elements produced by
//! the Markdown renderer and typical hand-written pages; unknown tags are
//! dropped and their text kept.

use std::sync::LazyLock;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use tracing::warn;

use crate::view::theme::Palette;

struct HtmlPatterns {
    token: Regex,
    entity: Regex,
    alt: Regex,
}

static PATTERNS: LazyLock<Result<HtmlPatterns, regex::Error>> = LazyLock::new(|| {
    Ok(HtmlPatterns {
        token: Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)\b([^>]*)>|[^<]+|<")?,
        entity: Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);")?,
        alt: Regex::new(r#"(?i)\balt\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
    })
});

/// Decodes the common named and numeric character references.
pub fn decode_entities(text: &str) -> String {
    let Ok(patterns) = PATTERNS.as_ref() else {
        return text.to_string();
    };
    patterns
        .entity
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet,
    Ordered(usize),
}

struct LineBuilder {
    palette: Palette,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    bold: usize,
    italic: usize,
    underline: usize,
    code: usize,
    strike: usize,
    heading: Option<u8>,
    pre: usize,
    quote: usize,
    skip: usize,
    lists: Vec<ListKind>,
}

impl LineBuilder {
    fn new(palette: Palette) -> Self {
        Self {
            palette,
            lines: Vec::new(),
            spans: Vec::new(),
            bold: 0,
            italic: 0,
            underline: 0,
            code: 0,
            strike: 0,
            heading: None,
            pre: 0,
            quote: 0,
            skip: 0,
            lists: Vec::new(),
        }
    }

    fn style(&self) -> Style {
        let mut style = Style::default().fg(self.palette.foreground);
        if self.heading.is_some() {
            style = style.fg(self.palette.heading).add_modifier(Modifier::BOLD);
        }
        if self.code > 0 || self.pre > 0 {
            style = style.fg(self.palette.code);
        }
        if self.underline > 0 {
            style = style.fg(self.palette.link).add_modifier(Modifier::UNDERLINED);
        }
        if self.bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.strike > 0 {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        style
    }

    fn line_is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.content.trim().is_empty())
    }

    fn start_line(&mut self) {
        if self.quote > 0 {
            self.spans
                .push(Span::styled("│ ".repeat(self.quote), self.palette.dim()));
        }
    }

    fn flush(&mut self) {
        if self.line_is_empty() {
            self.spans.clear();
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        self.lines.push(Line::from(spans));
    }

    /// Ends the current block and leaves one blank separator line.
    fn paragraph_break(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn push_text(&mut self, raw: &str) {
        if self.skip > 0 {
            return;
        }
        let text = decode_entities(raw);
        let style = self.style();

        if self.pre > 0 {
            let mut parts = text.split('\n').peekable();
            while let Some(part) = parts.next() {
                if self.spans.is_empty() {
                    self.start_line();
                }
                if !part.is_empty() {
                    self.spans.push(Span::styled(part.to_string(), style));
                }
                if parts.peek().is_some() {
                    // keep blank lines inside preformatted text
                    let spans = std::mem::take(&mut self.spans);
                    self.lines.push(Line::from(spans));
                }
            }
            return;
        }

        let mut collapsed = String::with_capacity(text.len());
        let mut last_space = self.line_is_empty()
            || self
                .spans
                .last()
                .is_some_and(|span| span.content.ends_with(' '));
        for ch in text.chars() {
            if ch.is_whitespace() && ch != '\u{a0}' {
                if !last_space {
                    collapsed.push(' ');
                    last_space = true;
                }
            } else {
                collapsed.push(ch);
                last_space = false;
            }
        }
        if collapsed.is_empty() {
            return;
        }
        if self.spans.is_empty() {
            self.start_line();
        }
        self.spans.push(Span::styled(collapsed, style));
    }

    fn open(&mut self, tag: &str, attrs: &str, patterns: &HtmlPatterns) {
        match tag {
            "script" | "style" | "head" | "title" => self.skip += 1,
            "p" | "div" | "section" | "article" | "header" | "footer" | "table" => {
                self.paragraph_break();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.paragraph_break();
                let level = tag[1..].parse().unwrap_or(1);
                self.heading = Some(level);
                self.start_line();
                let marker = format!("{} ", "#".repeat(usize::from(level)));
                self.spans.push(Span::styled(marker, self.palette.dim()));
            }
            "br" => {
                let spans = std::mem::take(&mut self.spans);
                self.lines.push(Line::from(spans));
            }
            "hr" => {
                self.paragraph_break();
                self.lines
                    .push(Line::styled("─".repeat(40), self.palette.dim()));
                self.lines.push(Line::default());
            }
            "pre" => {
                self.paragraph_break();
                self.pre += 1;
            }
            "blockquote" => {
                self.paragraph_break();
                self.quote += 1;
            }
            "ul" => {
                if self.lists.is_empty() {
                    self.paragraph_break();
                } else {
                    self.flush();
                }
                self.lists.push(ListKind::Bullet);
            }
            "ol" => {
                if self.lists.is_empty() {
                    self.paragraph_break();
                } else {
                    self.flush();
                }
                self.lists.push(ListKind::Ordered(1));
            }
            "li" => {
                self.flush();
                self.start_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.spans.push(Span::styled(marker, self.palette.active()));
            }
            "tr" => self.flush(),
            "td" | "th" => {
                if !self.line_is_empty() {
                    self.spans.push(Span::styled(" │ ", self.palette.dim()));
                }
                if tag == "th" {
                    self.bold += 1;
                }
            }
            "strong" | "b" => self.bold += 1,
            "em" | "i" => self.italic += 1,
            "u" | "a" => self.underline += 1,
            "code" | "kbd" => self.code += 1,
            "del" | "s" | "strike" => self.strike += 1,
            "img" => {
                let alt = patterns
                    .alt
                    .captures(attrs)
                    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
                    .map_or("image", |m| m.as_str());
                let alt = decode_entities(alt);
                if self.spans.is_empty() {
                    self.start_line();
                }
                self.spans
                    .push(Span::styled(format!("[{alt}]"), self.palette.dim()));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: &str) {
        match tag {
            "script" | "style" | "head" | "title" => self.skip = self.skip.saturating_sub(1),
            "p" | "div" | "section" | "article" | "header" | "footer" | "table" => {
                self.paragraph_break();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.heading = None;
                self.paragraph_break();
            }
            "pre" => {
                self.pre = self.pre.saturating_sub(1);
                self.paragraph_break();
            }
            "blockquote" => {
                self.flush();
                self.quote = self.quote.saturating_sub(1);
                self.paragraph_break();
            }
            "ul" | "ol" => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.paragraph_break();
                } else {
                    self.flush();
                }
            }
            "li" | "tr" => self.flush(),
            "th" => self.bold = self.bold.saturating_sub(1),
            "strong" | "b" => self.bold = self.bold.saturating_sub(1),
            "em" | "i" => self.italic = self.italic.saturating_sub(1),
            "u" | "a" => self.underline = self.underline.saturating_sub(1),
            "code" | "kbd" => self.code = self.code.saturating_sub(1),
            "del" | "s" | "strike" => self.strike = self.strike.saturating_sub(1),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Renders an HTML fragment as styled lines.
pub fn html_to_lines(html: &str, palette: Palette) -> Vec<Line<'static>> {
    let patterns = match PATTERNS.as_ref() {
        Ok(patterns) => patterns,
        Err(e) => {
            warn!("HTML text patterns unavailable, showing raw markup: {}", e);
            return html.lines().map(|line| Line::raw(line.to_string())).collect();
        }
    };

    let mut builder = LineBuilder::new(palette);
    for caps in patterns.token.captures_iter(html) {
        match caps.get(2) {
            Some(name) => {
                let tag = name.as_str().to_ascii_lowercase();
                let attrs = caps.get(3).map_or("", |m| m.as_str());
                if caps.get(1).is_some_and(|slash| !slash.is_empty()) {
                    builder.close(&tag);
                } else {
                    builder.open(&tag, attrs, patterns);
                    if attrs.trim_end().ends_with('/') {
                        builder.close(&tag);
                    }
                }
            }
            None => {
                let text = &caps[0];
                if !text.starts_with("<!--") {
                    builder.push_text(text);
                }
            }
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(html: &str) -> Vec<String> {
        html_to_lines(html, Palette::MOCHA)
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn headings_and_paragraphs() {
        let lines = plain("<h1>Inline Content</h1><p>This content is directly in the data.</p>");
        assert_eq!(
            lines,
            ["# Inline Content", "", "This content is directly in the data."]
        );
    }

    #[test]
    fn whitespace_collapses_outside_pre() {
        let lines = plain("<p>one\n   two</p><pre><code>a\n  b</code></pre>");
        assert_eq!(lines, ["one two", "", "a", "  b"]);
    }

    #[test]
    fn lists_are_marked() {
        let lines = plain("<ul><li>alpha</li><li>beta</li></ul><ol><li>x</li><li>y</li></ol>");
        assert_eq!(lines, ["• alpha", "• beta", "", "1. x", "2. y"]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#39;d&#x27;"), "a & b <c> 'd'");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn inline_styles_apply() {
        let lines = html_to_lines("<p>Welcome to <strong>EC2</strong>.</p>", Palette::MOCHA);
        let strong = &lines[0].spans[1];
        assert_eq!(strong.content, "EC2");
        assert!(strong.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn error_placeholder_renders_as_text() {
        let lines = plain("<p style=\"color:red;\">Error loading content from /d/x.md. Check console.</p>");
        assert_eq!(lines, ["Error loading content from /d/x.md. Check console."]);
    }
}
