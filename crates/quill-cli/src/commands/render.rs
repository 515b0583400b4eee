//! Standalone markdown rendering

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::output::Output;

/// Render markdown from a file, or stdin when no file is given
pub fn markdown(file: Option<PathBuf>, output: &Output) -> Result<()> {
    let source = match file {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read markdown file: {:?}", path))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read markdown from stdin")?;
            buffer
        }
    };

    let html = quill_core::linkify(&quill_core::render(&source));
    output.print_html(&html);
    Ok(())
}
