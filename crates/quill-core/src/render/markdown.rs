//! Restricted markdown to HTML.
//!
//! # Supported syntax
//! - ATX headings `#` through `######` followed by whitespace
//! - `-` bullet lists (flat, consecutive lines form one list)
//! - triple-backtick fenced code blocks
//! - inline `**bold**`, `*italic*` and `` `code` ``
//! - everything else is a paragraph, one per non-blank line
//!
//! # Invariants
//! - Rendering is total: any input produces output, never an error.
//! - `&`, `<` and `>` are escaped before inline formatting, so author text
//!   can never inject markup. Quotes are left alone.
//! - Fenced lines are escaped but never inline-formatted.
//! - An unterminated fence is flushed as a code block at end of input.

use once_cell::sync::Lazy;
use regex::Regex;

static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-\s+").expect("valid list item regex"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid heading regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("valid italic regex"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid code regex"));

const FENCE: &str = "```";

/// Render restricted markdown to an HTML fragment.
pub fn render(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let mut renderer = BlockRenderer::default();

    for raw in normalized.split('\n') {
        renderer.push_line(raw);
    }

    renderer.finish()
}

/// Escape `&`, `<` and `>`.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Apply bold, italic and inline code, in that order, to escaped text.
///
/// Each pattern is a leftmost, non-overlapping pass over the whole string.
/// Text inside a bold span is still eligible for italic and code.
pub fn format_inline(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "<strong>${1}</strong>");
    let text = ITALIC_RE.replace_all(&text, "<em>${1}</em>");
    CODE_RE.replace_all(&text, "<code>${1}</code>").into_owned()
}

/// Block-level state for one pass over the document
#[derive(Default)]
struct BlockRenderer {
    html: String,
    in_list: bool,
    in_code: bool,
    code_buffer: Vec<String>,
}

impl BlockRenderer {
    fn push_line(&mut self, raw: &str) {
        let line = raw.trim_end();

        if line.trim_start().starts_with(FENCE) {
            if self.in_code {
                self.close_code();
            } else {
                self.close_list();
                self.in_code = true;
                self.code_buffer.clear();
            }
            return;
        }

        if self.in_code {
            self.code_buffer.push(escape_html(raw));
            return;
        }

        if let Some(marker) = LIST_ITEM_RE.find(line) {
            if !self.in_list {
                self.close_code();
                self.html.push_str("<ul>");
                self.in_list = true;
            }
            let item = &line[marker.end()..];
            self.push_element("li", &format_inline(&escape_html(item)));
            return;
        }

        self.close_list();

        if line.trim().is_empty() {
            return;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let tag = format!("h{}", caps[1].len());
            let text = format_inline(&escape_html(caps[2].trim()));
            self.push_element(&tag, &text);
            return;
        }

        self.push_element("p", &format_inline(&escape_html(line)));
    }

    fn push_element(&mut self, tag: &str, inner: &str) {
        self.html.push('<');
        self.html.push_str(tag);
        self.html.push('>');
        self.html.push_str(inner);
        self.html.push_str("</");
        self.html.push_str(tag);
        self.html.push('>');
    }

    fn close_list(&mut self) {
        if self.in_list {
            self.html.push_str("</ul>");
            self.in_list = false;
        }
    }

    fn close_code(&mut self) {
        if self.in_code {
            self.html.push_str("<pre><code>");
            self.html.push_str(&self.code_buffer.join("\n"));
            self.html.push_str("</code></pre>");
            self.in_code = false;
            self.code_buffer.clear();
        }
    }

    fn finish(mut self) -> String {
        self.close_list();
        self.close_code();
        self.html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(render("# Title"), "<h1>Title</h1>");
        assert_eq!(render("###   Spaced out  "), "<h3>Spaced out</h3>");
        assert_eq!(render("###### Six"), "<h6>Six</h6>");
    }

    #[test]
    fn test_seven_hashes_is_paragraph() {
        assert_eq!(render("####### Seven"), "<p>####### Seven</p>");
        assert_eq!(render("#NoSpace"), "<p>#NoSpace</p>");
    }

    #[test]
    fn test_heading_inline_formatting() {
        assert_eq!(
            render("## A **bold** <move>"),
            "<h2>A <strong>bold</strong> &lt;move&gt;</h2>"
        );
    }

    #[test]
    fn test_simple_list() {
        assert_eq!(render("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_indented_list_items_share_container() {
        assert_eq!(
            render("  - one\n-   two *x*"),
            "<ul><li>one</li><li>two <em>x</em></li></ul>"
        );
    }

    #[test]
    fn test_non_item_line_closes_list() {
        assert_eq!(
            render("- a\ntext\n- b"),
            "<ul><li>a</li></ul><p>text</p><ul><li>b</li></ul>"
        );
        assert_eq!(
            render("- a\n\n- b"),
            "<ul><li>a</li></ul><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_bare_dash_is_paragraph() {
        assert_eq!(render("-"), "<p>-</p>");
        assert_eq!(render("- "), "<p>-</p>");
        assert_eq!(render("-no-space"), "<p>-no-space</p>");
    }

    #[test]
    fn test_fenced_code_is_escaped_not_formatted() {
        assert_eq!(render("```\n<x>\n```"), "<pre><code>&lt;x&gt;</code></pre>");
        assert_eq!(
            render("```rust\n**not bold** `x`\n\n  indented  \n```"),
            "<pre><code>**not bold** `x`\n\n  indented  </code></pre>"
        );
    }

    #[test]
    fn test_fence_closes_list() {
        assert_eq!(
            render("- a\n```\ncode\n```\n- b"),
            "<ul><li>a</li></ul><pre><code>code</code></pre><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_indented_fence_marker() {
        assert_eq!(render("  ```\nx\n  ```"), "<pre><code>x</code></pre>");
    }

    #[test]
    fn test_unterminated_fence_is_flushed() {
        assert_eq!(
            render("intro\n```\nlet x = 1;"),
            "<p>intro</p><pre><code>let x = 1;</code></pre>"
        );
        assert_eq!(render("```"), "<pre><code></code></pre>");
    }

    #[test]
    fn test_paragraphs_per_line() {
        assert_eq!(
            render("first line\nsecond line\n\n\nthird"),
            "<p>first line</p><p>second line</p><p>third</p>"
        );
    }

    #[test]
    fn test_line_endings_normalized() {
        assert_eq!(render("# A\r\n- b\r- c"), "<h1>A</h1><ul><li>b</li><li>c</li></ul>");
    }

    #[test]
    fn test_escaping_leaves_quotes() {
        assert_eq!(
            render(r#"a & b < "c" > 'd'"#),
            r#"<p>a &amp; b &lt; "c" &gt; 'd'</p>"#
        );
    }

    #[test]
    fn test_inline_patterns() {
        assert_eq!(format_inline("**hi**"), "<strong>hi</strong>");
        assert_eq!(
            format_inline("**bold** and *it* and `code`"),
            "<strong>bold</strong> and <em>it</em> and <code>code</code>"
        );
        assert_eq!(format_inline("**`x`**"), "<strong><code>x</code></strong>");
        assert_eq!(format_inline("a * b"), "a * b");
        assert_eq!(format_inline("**"), "**");
        assert_eq!(format_inline("``"), "``");
    }

    #[test]
    fn test_inline_code_after_escaping() {
        assert_eq!(render("`<b>`"), "<p><code>&lt;b&gt;</code></p>");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("   \n\t\n"), "");
    }

    #[test]
    fn test_rendering_is_total_on_odd_input() {
        let inputs = [
            "```\n```\n```",
            "***",
            "- **unclosed",
            "# ",
            "\u{0}\u{feff}# héllo ✓",
            "-\t- nested?",
        ];
        for input in inputs {
            let _ = render(input);
        }
        assert_eq!(render("-\t- nested?"), "<ul><li>- nested?</li></ul>");
    }
}
