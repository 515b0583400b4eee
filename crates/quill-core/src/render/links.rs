//! Cross-post reference links.
//!
//! A reference token is `[[id]]` where `id` uses `[A-Za-z0-9_-]`. Tokens are
//! rewritten into anchors that navigate to the `#post-{id}` fragment and
//! carry the id in `data-post-reference`. Whether the target exists is left
//! to the caller.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([A-Za-z0-9_-]+)\]\]").expect("valid reference regex"));

/// Replace every `[[id]]` token with an intra-app anchor.
///
/// Text without tokens is returned unchanged.
pub fn linkify(html: &str) -> String {
    REFERENCE_RE
        .replace_all(html, |caps: &Captures| reference_anchor(caps[1].trim()))
        .into_owned()
}

/// Distinct ids referenced in `text`, in order of first appearance.
pub fn references(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for caps in REFERENCE_RE.captures_iter(text) {
        let id = caps[1].trim();
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn reference_anchor(id: &str) -> String {
    format!(
        r##"<a href="#post-{id}" data-post-reference="{id}">[{id}]</a>"##,
        id = id
    )
}
