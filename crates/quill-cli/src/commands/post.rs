//! Post command handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use quill_core::{
    render_page, NewPost, Post, PostChanges, PostFormat, PostService, RecordStore,
};

use crate::editor::{confirm, edit_text};
use crate::output::Output;

/// Service over whichever backend the configuration selects
pub type Service = PostService<Box<dyn RecordStore>>;

/// Where new content comes from
pub struct ContentSource {
    pub content: Option<String>,
    pub file: Option<PathBuf>,
}

impl ContentSource {
    fn is_given(&self) -> bool {
        self.content.is_some() || self.file.is_some()
    }

    /// Content from the flag or file, if either was given
    fn read(self) -> Result<Option<String>> {
        if let Some(content) = self.content {
            return Ok(Some(content));
        }
        match self.file {
            Some(path) => fs::read_to_string(&path)
                .map(Some)
                .with_context(|| format!("Failed to read content file: {:?}", path)),
            None => Ok(None),
        }
    }
}

/// List all posts
pub fn list(service: &Service, output: &Output) -> Result<()> {
    let posts = service.list().context("Failed to list posts")?;
    output.print_posts(&posts);
    Ok(())
}

/// Show one post
pub fn show(service: &Service, id: String, output: &Output) -> Result<()> {
    let post = resolve_post(service, &id)?;
    output.print_post(&post);
    Ok(())
}

/// Create a new post
pub fn create(
    service: &Service,
    title: String,
    source: ContentSource,
    format: Option<String>,
    output: &Output,
) -> Result<()> {
    let content = match source.read()? {
        Some(content) => content,
        None => {
            let format = PostFormat::parse_or_default(format.as_deref());
            edit_text("", format).context("Failed to edit post")?
        }
    };

    let input = NewPost {
        title: Some(title),
        content: Some(content),
        format,
    };
    let post = service.create(input).context("Failed to create post")?;

    if output.is_quiet() {
        println!("{}", post.id);
    } else {
        output.success(&format!("Created post {}", post.id));
    }

    Ok(())
}

/// Edit an existing post
///
/// With no flags at all the current content opens in the editor.
pub fn edit(
    service: &Service,
    id: String,
    title: Option<String>,
    source: ContentSource,
    format: Option<String>,
    output: &Output,
) -> Result<()> {
    let post = resolve_post(service, &id)?;

    let interactive = title.is_none() && format.is_none() && !source.is_given();
    let content = if interactive {
        let edited = edit_text(&post.content, post.format).context("Failed to edit post")?;
        if edited == post.content {
            output.message("No changes.");
            return Ok(());
        }
        Some(edited)
    } else {
        source.read()?
    };

    let changes = PostChanges {
        title,
        content,
        format,
    };
    let updated = service
        .update(&post.id, changes)
        .context("Failed to update post")?;

    output.success(&format!("Updated post {}", updated.id));
    Ok(())
}

/// Delete a post, asking first in interactive mode
pub fn delete(service: &Service, id: String, yes: bool, output: &Output) -> Result<()> {
    let post = resolve_post(service, &id)?;

    if !yes && output.should_prompt() {
        println!("Delete post: {} - {}", post.short_id(), post.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    service.delete(&post.id).context("Failed to delete post")?;

    output.success(&format!("Deleted post: {}", post.id));
    Ok(())
}

/// Render a post as an HTML fragment or full page, optionally in a browser
pub fn render(
    service: &Service,
    id: String,
    page: bool,
    open: bool,
    output: &Output,
) -> Result<()> {
    let post = resolve_post(service, &id)?;

    if open {
        let path = std::env::temp_dir().join(format!("quill-{}.html", post.id));
        fs::write(&path, render_page(&post))
            .with_context(|| format!("Failed to write preview: {:?}", path))?;
        open::that(&path).with_context(|| format!("Failed to open preview: {:?}", path))?;
        output.success(&format!("Opened {}", path.display()));
        return Ok(());
    }

    let html = if page {
        render_page(&post)
    } else {
        service.render(&post.id)?
    };
    output.print_html(&html);
    Ok(())
}

/// List the posts a post links to
pub fn refs(service: &Service, id: String, output: &Output) -> Result<()> {
    let post = resolve_post(service, &id)?;
    let references = service
        .references(&post.id)
        .context("Failed to resolve references")?;
    output.print_references(&post, &references);
    Ok(())
}

/// Find a post by full id or unique id prefix
fn resolve_post(service: &Service, id: &str) -> Result<Post> {
    match service.get(id) {
        Ok(post) => return Ok(post),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    let prefix = id.trim();
    let posts = service.list()?;
    let matches = prefix_matches(&posts, prefix);

    match matches.len() {
        0 => bail!("No post found matching: {}", prefix),
        1 => Ok(matches[0].clone()),
        _ => {
            eprintln!("Multiple posts match '{}':", prefix);
            for post in &matches {
                eprintln!("  {} - {}", post.id, post.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

fn prefix_matches<'a>(posts: &'a [Post], prefix: &str) -> Vec<&'a Post> {
    posts.iter().filter(|p| p.id.starts_with(prefix)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::MemoryRecordStore;

    fn service() -> Service {
        PostService::new(Box::new(MemoryRecordStore::new()) as Box<dyn RecordStore>)
    }

    #[test]
    fn test_resolve_by_prefix() {
        let service = service();
        let post = service.create(NewPost::new("Hello", "body")).unwrap();

        let found = resolve_post(&service, &post.id[..8]).unwrap();
        assert_eq!(found, post);
        assert!(resolve_post(&service, "zzzzzzzz").is_err());
    }

    #[test]
    fn test_resolve_rejects_invalid_id() {
        let service = service();
        let err = resolve_post(&service, "../x").unwrap_err();
        assert!(err.to_string().contains("invalid post id"));
    }

    #[test]
    fn test_content_source_prefers_flag() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("post.md");
        fs::write(&path, "from file").unwrap();

        let source = ContentSource {
            content: Some("from flag".to_string()),
            file: Some(path.clone()),
        };
        assert_eq!(source.read().unwrap().as_deref(), Some("from flag"));

        let source = ContentSource {
            content: None,
            file: Some(path),
        };
        assert_eq!(source.read().unwrap().as_deref(), Some("from file"));

        let source = ContentSource {
            content: None,
            file: None,
        };
        assert!(!source.is_given());
        assert_eq!(source.read().unwrap(), None);
    }
}
