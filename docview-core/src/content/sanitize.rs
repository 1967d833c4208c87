//! ``src/content/sanitize.rs``
//! ============================================================================
//! # DisplayHtml: the only way HTML reaches the content pane
//!
//! Document bodies are untrusted. They are either sanitized on the way in or,
//! when the configuration opts in, marked as unsanitized so the choice stays
//! visible at every use site. Placeholders built by the resolver are trusted
//! and escape everything user-provided they embed.

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::{trace, warn};

/// How a piece of display HTML was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTrust {
    Sanitized,
    Trusted,
    Unsanitized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHtml {
    html: String,
    trust: HtmlTrust,
}

impl DisplayHtml {
    /// Strips active content from untrusted HTML.
    pub fn sanitized(raw: &str) -> Self {
        Self {
            html: sanitize_html(raw),
            trust: HtmlTrust::Sanitized,
        }
    }

    /// Markup produced by this crate with every interpolated value escaped.
    pub(crate) fn trusted(html: String) -> Self {
        Self {
            html,
            trust: HtmlTrust::Trusted,
        }
    }

    /// Untrusted HTML shown verbatim. Only reachable through an opted-in [`HtmlPolicy`].
    fn unsanitized(raw: String) -> Self {
        Self {
            html: raw,
            trust: HtmlTrust::Unsanitized,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.html
    }

    #[inline]
    pub fn trust(&self) -> HtmlTrust {
        self.trust
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

/// Decides how untrusted document HTML is admitted for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlPolicy {
    allow_unsanitized: bool,
}

impl HtmlPolicy {
    pub fn new(allow_unsanitized: bool) -> Self {
        if allow_unsanitized {
            warn!("Unsanitized HTML rendering enabled by configuration");
        }
        Self { allow_unsanitized }
    }

    pub fn admit(&self, raw: String) -> DisplayHtml {
        if self.allow_unsanitized {
            DisplayHtml::unsanitized(raw)
        } else {
            DisplayHtml::sanitized(&raw)
        }
    }
}

/// Escapes text for interpolation into element content or a quoted attribute.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Elements dropped together with everything inside them.
const CLEAN_CONTENT_TAGS: [&str; 5] = ["script", "style", "iframe", "object", "embed"];

/// Removes scripting from an HTML fragment.
///
/// The fragment is parsed and rebuilt from an allow-list of elements,
/// attributes and URL schemes. `script`, `style`, `iframe`, `object` and
/// `embed` are dropped with their contents, `on*` handlers never survive and
/// URLs with a `javascript:` scheme (entity-encoded or not) are removed.
pub fn sanitize_html(raw: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .clean_content_tags(CLEAN_CONTENT_TAGS.into_iter().collect::<HashSet<_>>())
        .link_rel(None)
        .url_relative(ammonia::UrlRelative::PassThrough);

    let cleaned = builder.clean(raw).to_string();
    if cleaned != raw {
        trace!("Sanitizer rewrote document HTML");
    }
    cleaned
}
