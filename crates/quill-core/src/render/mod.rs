//! Post rendering
//!
//! `markdown` turns the restricted markdown dialect into an HTML fragment;
//! `links` rewrites `[[id]]` reference tokens into anchors. `render_post`
//! chains them the way posts are displayed: markdown content is rendered
//! first, HTML content is used as-is, and reference links are applied to
//! both.

pub mod links;
pub mod markdown;

pub use links::{linkify, references};
pub use markdown::{escape_html, render};

use crate::models::{Post, PostFormat};

/// Display HTML for a post body
pub fn render_post(post: &Post) -> String {
    let html = match post.format {
        PostFormat::Markdown => render(&post.content),
        PostFormat::Html => post.content.clone(),
    };
    linkify(&html)
}

/// Standalone HTML document for previewing one post
pub fn render_page(post: &Post) -> String {
    let title = escape_html(&post.title);
    let id = escape_attribute(&post.id);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<article id="post-{id}" data-post-id="{id}">
<h1>{title}</h1>
<p class="post-meta">created {created} &middot; updated {updated}</p>
<div class="post-content">
{body}
</div>
</article>
</body>
</html>
"#,
        title = title,
        id = id,
        created = post.created_at.format("%Y-%m-%d %H:%M UTC"),
        updated = post.updated_at.format("%Y-%m-%d %H:%M UTC"),
        body = render_post(post),
    )
}

fn escape_attribute(value: &str) -> String {
    escape_html(value).replace('"', "&quot;")
}
