//! Regex-based HTML-to-text extraction.
//!
//! Intentionally lenient: this is string substitution, not a validating
//! parser. Nested or malformed markup can leave stray fragments behind, which
//! is an accepted tradeoff for the single-page pipeline — the extractor sits
//! behind one pure function so it could be swapped for a real tokenizer
//! without touching callers.

use regex::Regex;
use std::sync::LazyLock;

/// Title plus cleaned plain-text body of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Trimmed `<title>` text; empty when the document has none.
    pub title: String,
    /// Markup-free body text with collapsed whitespace.
    pub text: String,
}

/// Elements removed wholesale, content included, before tag stripping.
const STRIPPED_ELEMENTS: [&str; 7] = [
    "script", "style", "noscript", "iframe", "nav", "footer", "header",
];

static ELEMENT_BLOCK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIPPED_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("element block pattern is valid")
        })
        .collect()
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]*)</title>").expect("title pattern"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Turn raw HTML into a title and a cleaned plain-text body.
///
/// Deterministic and side-effect free: the same input always yields the same
/// output. Malformed HTML degrades gracefully rather than erroring.
pub fn extract_content(html: &str) -> ExtractedContent {
    let title = TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let mut cleaned = html.to_string();
    for re in ELEMENT_BLOCK_RES.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    cleaned = COMMENT_RE.replace_all(&cleaned, "").into_owned();

    // Tags become a space, not nothing, so adjacent words don't concatenate.
    cleaned = TAG_RE.replace_all(&cleaned, " ").into_owned();

    cleaned = decode_common_entities(&cleaned);
    let text = WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string();

    ExtractedContent { title, text }
}

/// Decode the six entities that dominate real-world pages. Everything else is
/// left as-is.
fn decode_common_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_extraction_scenario() {
        let html = "<html><head><title>Acme</title></head><body><script>x()</script><p>We sell widgets.</p></body></html>";
        let extracted = extract_content(html);
        assert_eq!(extracted.title, "Acme");
        assert_eq!(extracted.text, "We sell widgets.");
    }

    #[test]
    fn extraction_is_idempotent_on_same_input() {
        let html = "<html><title> Spaced </title><body><p>One</p><!-- note --><p>Two</p></body></html>";
        let first = extract_content(html);
        let second = extract_content(html);
        assert_eq!(first, second);
        assert_eq!(first.title, "Spaced");
        assert_eq!(first.text, "One Two");
    }

    #[test]
    fn missing_title_yields_empty_string() {
        let extracted = extract_content("<body><p>hello</p></body>");
        assert_eq!(extracted.title, "");
        assert_eq!(extracted.text, "hello");
    }

    #[test]
    fn strips_nav_footer_header_with_content() {
        let html = concat!(
            "<nav><a href=\"/\">Home</a></nav>",
            "<header><h1>Banner</h1></header>",
            "<main>Body text here.</main>",
            "<footer>© 2025 Acme</footer>"
        );
        let extracted = extract_content(html);
        assert_eq!(extracted.text, "Body text here.");
    }

    #[test]
    fn strips_style_noscript_iframe_blocks() {
        let html = concat!(
            "<style>p { color: red }</style>",
            "<noscript>enable js</noscript>",
            "<iframe src=\"x\">fallback</iframe>",
            "<p>kept</p>"
        );
        assert_eq!(extract_content(html).text, "kept");
    }

    #[test]
    fn tags_become_spaces_to_avoid_word_concatenation() {
        let extracted = extract_content("<p>alpha</p><p>beta</p>");
        assert_eq!(extracted.text, "alpha beta");
    }

    #[test]
    fn decodes_the_six_common_entities() {
        let extracted = extract_content("<p>a&nbsp;&amp;&lt;&gt;&quot;&#39;b</p>");
        assert_eq!(extracted.text, "a &<>\"'b");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let extracted = extract_content("<p>a\n\n  b\t\tc</p>");
        assert_eq!(extracted.text, "a b c");
    }

    #[test]
    fn case_insensitive_block_removal() {
        let html = "<SCRIPT>bad()</SCRIPT><P>good</P>";
        assert_eq!(extract_content(html).text, "good");
    }

    #[test]
    fn unclosed_script_degrades_gracefully() {
        // No closing tag: the block pattern can't match, so the opening tag is
        // stripped like any other tag and the script text leaks through. This
        // is the documented regex-extractor tradeoff.
        let extracted = extract_content("<script>leak()");
        assert_eq!(extracted.text, "leak()");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let extracted = extract_content("");
        assert_eq!(extracted.title, "");
        assert_eq!(extracted.text, "");
    }
}
