//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use quill_core::{Post, PostError, Reference, StorageError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - ids only
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single post with its raw content
    pub fn print_post(&self, post: &Post) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", post.id);
                println!("Title:   {}", post.title);
                println!("Format:  {}", post.format);
                println!("Created: {}", post.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated: {}", post.updated_at.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", post.content);
            }
            OutputFormat::Json => print_json(post),
            OutputFormat::Quiet => println!("{}", post.id),
        }
    }

    /// Print a list of posts
    pub fn print_posts(&self, posts: &[Post]) {
        match self.format {
            OutputFormat::Human => {
                if posts.is_empty() {
                    println!("No posts found.");
                    return;
                }
                for post in posts {
                    println!(
                        "{} | {:<40} | {:<8} | {}",
                        post.short_id(),
                        truncate(&post.title, 40),
                        post.format,
                        post.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
                println!("\n{} post(s)", posts.len());
            }
            OutputFormat::Json => print_json(posts),
            OutputFormat::Quiet => {
                for post in posts {
                    println!("{}", post.id);
                }
            }
        }
    }

    /// Print the references a post makes to other posts
    pub fn print_references(&self, post: &Post, references: &[Reference]) {
        match self.format {
            OutputFormat::Human => {
                println!("References from: {} - {}", post.short_id(), post.title);
                println!();
                if references.is_empty() {
                    println!("No references.");
                    return;
                }
                for reference in references {
                    let marker = if reference.exists { "✓" } else { "✗ missing" };
                    println!("  {} {}", reference.id, marker);
                }
            }
            OutputFormat::Json => {
                let json_refs: Vec<_> = references
                    .iter()
                    .map(|r| serde_json::json!({"id": r.id, "exists": r.exists}))
                    .collect();
                print_json(&json_refs);
            }
            OutputFormat::Quiet => {
                for reference in references {
                    println!("{}", reference.id);
                }
            }
        }
    }

    /// Print rendered HTML
    ///
    /// Quiet mode still prints the HTML, since it is the command's payload.
    pub fn print_html(&self, html: &str) {
        match self.format {
            OutputFormat::Json => print_json(&serde_json::json!({ "html": html })),
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", html),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Report a failed command on stderr, with a recovery hint when one exists
    pub fn error(&self, error: &anyhow::Error) {
        let hint = recovery_suggestion(error);
        match self.format {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "message": format!("{:#}", error),
                        "hint": hint
                    })
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                eprintln!("Error: {:#}", error);
                if let Some(hint) = hint {
                    eprintln!("Hint: {}", hint);
                }
            }
        }
    }
}

/// Recovery hint from the first storage error in the chain
fn recovery_suggestion(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return storage.recovery_suggestion();
        }
        match cause.downcast_ref::<PostError>() {
            Some(PostError::Storage(storage)) => storage.recovery_suggestion(),
            _ => None,
        }
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
