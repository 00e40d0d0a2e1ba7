//! Display ordering for match timelines.
use crate::TimelineEntry;
use regex::Regex;
use std::sync::LazyLock;

/// Markup produced upstream by the match desk's editor.
///
/// The producer is a trusted collaborator: fragments are stored and handed out
/// byte-for-byte, with no sanitization here. `to_plain_text` builds a separate
/// terminal view and never alters the stored fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHtml(String);

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6])\s*>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

impl TrustedHtml {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn to_plain_text(&self) -> String {
        let with_breaks = LINE_BREAK.replace_all(&self.0, "\n");
        let stripped = TAG.replace_all(&with_breaks, "");
        let decoded = stripped
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");
        decoded
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Most recent first. Entries with equal timestamps keep their arrival order.
pub fn reconcile(entries: &[TimelineEntry]) -> Vec<&TimelineEntry> {
    let mut ordered: Vec<&TimelineEntry> = entries.iter().collect();
    // `sort_by` is stable.
    ordered.sort_by(|a, b| b.at.cmp(&a.at));
    ordered
}
