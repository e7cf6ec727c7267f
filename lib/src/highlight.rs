//! Fragment extraction and match highlighting for long issue bodies.
//!
//! Given an issue body and the searched version, this locates the best
//! match among several literal pattern variants and returns a bounded
//! excerpt with the match's position reported, so a caller can render
//! the matched substring distinctly from its surrounding context.
//!
//! Everything here is pure and deterministic; it is safe to call
//! concurrently for many issues.

use crate::github::types::ProjectIdentity;

/// Default excerpt budget, in characters (ellipses not counted).
pub const DEFAULT_FRAGMENT_LENGTH: usize = 200;

const ELLIPSIS: &str = "...";

/// Location of the best match inside a [`HighlightedFragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Byte offset of the match within the fragment string
    pub start: usize,
    /// Byte offset one past the end of the match
    pub end: usize,
    /// The matched substring, in the text's original casing
    pub matched: String,
    /// The pattern variant that produced the match
    pub pattern: String,
}

/// A bounded excerpt of a longer text, with the located match span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedFragment {
    /// The excerpt, ellipsis-delimited where it is interior to the text
    pub fragment: String,
    /// Where the match sits inside `fragment`; `None` when nothing matched
    pub span: Option<MatchSpan>,
}

impl HighlightedFragment {
    /// The fragment text before the match (including any leading ellipsis).
    pub fn before_match(&self) -> &str {
        match &self.span {
            Some(span) => &self.fragment[..span.start],
            None => &self.fragment,
        }
    }

    /// The matched substring, as it appears in the fragment.
    pub fn matched(&self) -> Option<&str> {
        self.span
            .as_ref()
            .map(|span| &self.fragment[span.start..span.end])
    }

    /// The fragment text after the match (including any trailing ellipsis).
    pub fn after_match(&self) -> &str {
        match &self.span {
            Some(span) => &self.fragment[span.end..],
            None => "",
        }
    }
}

/// The ordered literal pattern variants derived from a search term.
///
/// Earlier variants win offset ties, so the list runs from the barest
/// form to the most decorated.
pub fn pattern_variants(identity: &ProjectIdentity, term: &str) -> Vec<String> {
    vec![
        term.to_string(),
        format!("v{term}"),
        format!("{}@{term}", identity.package_name),
        format!("{} {term}", identity.display_name),
        format!("{} {term}", identity.short_alias),
        format!("{} Version {term}", identity.display_name),
    ]
}

/// Extract an excerpt of at most `max_length` characters centered on the
/// best match of `search_term` (or one of its variants) in `text`.
///
/// The best match is the leftmost occurrence of any variant, compared
/// ASCII-case-insensitively; among variants matching at the same offset
/// the earliest listed wins. When nothing matches, or the term or text
/// is empty, the leading `max_length` characters are returned with no
/// span. Ellipses mark whichever ends of the excerpt are interior to
/// the text.
///
/// ## Examples
///
/// ```
/// use relwatch_lib::github::GithubConfig;
/// use relwatch_lib::highlight::highlight_fragment;
///
/// let identity = GithubConfig::react_native().identity;
/// let text = "Crash seen on React Native 0.72 after upgrade";
/// let result = highlight_fragment(&identity, text, "0.72", 20);
///
/// let span = result.span.unwrap();
/// assert_eq!(span.pattern, "React Native 0.72");
/// assert_eq!(span.matched, "React Native 0.72");
/// ```
pub fn highlight_fragment(
    identity: &ProjectIdentity,
    text: &str,
    search_term: &str,
    max_length: usize,
) -> HighlightedFragment {
    if search_term.is_empty() || text.is_empty() {
        return truncated(text, max_length);
    }

    let folded = text.to_ascii_lowercase();
    let mut best: Option<(usize, String)> = None;
    for pattern in pattern_variants(identity, search_term) {
        if let Some(offset) = folded.find(&pattern.to_ascii_lowercase())
            && best.as_ref().is_none_or(|(best_offset, _)| offset < *best_offset)
        {
            best = Some((offset, pattern));
        }
    }

    let Some((match_byte, pattern)) = best else {
        return truncated(text, max_length);
    };

    // ASCII folding preserves byte offsets and char boundaries, so the
    // match occupies exactly `pattern.len()` bytes of the original text.
    let matched = &text[match_byte..match_byte + pattern.len()];
    let chars: Vec<char> = text.chars().collect();
    let match_start = text[..match_byte].chars().count();
    let match_end = match_start + matched.chars().count();

    let (start, end) = window_around(match_start, match_end, chars.len(), max_length);

    let prefix = if start > 0 { ELLIPSIS } else { "" };
    let suffix = if end < chars.len() { ELLIPSIS } else { "" };
    let window: String = chars[start..end].iter().collect();
    let before: String = chars[start..match_start].iter().collect();

    let span_start = prefix.len() + before.len();
    let span = MatchSpan {
        start: span_start,
        end: span_start + matched.len(),
        matched: matched.to_string(),
        pattern,
    };

    HighlightedFragment {
        fragment: format!("{prefix}{window}{suffix}"),
        span: Some(span),
    }
}

/// Pick the excerpt window (in char indices) around a match.
///
/// Starts half a budget before the match and ends half a budget after
/// it, clamped to the text; the window is then shrunk back to the
/// budget around the match, and widened from the unclamped side when a
/// clamp cut it short.
fn window_around(
    match_start: usize,
    match_end: usize,
    text_len: usize,
    max_length: usize,
) -> (usize, usize) {
    let half = max_length / 2;
    let mut start = match_start.saturating_sub(half);
    let mut end = (match_end + half).min(text_len);

    if end - start > max_length {
        let budget = max_length.saturating_sub(match_end - match_start);
        start = match_start.saturating_sub(budget / 2);
        end = (match_end + (budget - budget / 2)).min(text_len);
    }

    if end - start < max_length {
        if start == 0 {
            end = text_len.min(max_length.max(end));
        } else if end == text_len {
            start = start.min(end.saturating_sub(max_length));
        }
    }

    (start, end)
}

fn truncated(text: &str, max_length: usize) -> HighlightedFragment {
    let mut fragment: String = text.chars().take(max_length).collect();
    if text.chars().count() > max_length {
        fragment.push_str(ELLIPSIS);
    }
    HighlightedFragment {
        fragment,
        span: None,
    }
}
