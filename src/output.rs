//! CLI output formatting for `--check`.
//!
//! Output is information-first: each image leads with its positional index
//! and file, with alt text and tags as indented context lines.
//!
//! ```text
//! Gallery: images/images_metadata.yml (3 images)
//! 001 cat.jpg
//!     Alt: A cat
//!     Tags: animals, cute
//! 002 dog.jpg
//! 003 cat.jpg
//!     Alt: Another cat
//!
//! Warnings
//!     cat.jpg listed 2 times
//! ```
//!
//! [`format_check_output`] is pure and returns lines for testability;
//! [`print_check_output`] writes them to stdout.

use crate::metadata::GalleryMetadata;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count_label(n: usize) -> String {
    match n {
        1 => "1 image".to_string(),
        n => format!("{n} images"),
    }
}

/// Format the catalog summary printed by `--check`.
pub fn format_check_output(gallery: &GalleryMetadata, metadata_path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Gallery: {} ({})",
        metadata_path.display(),
        count_label(gallery.len())
    )];

    for (i, record) in gallery.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), record.file));
        if !record.alt_text.is_empty() {
            lines.push(format!("{}Alt: {}", indent(1), record.alt_text));
        }
        if !record.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), record.tags.join(", ")));
        }
    }

    let duplicates = gallery.duplicate_files();
    if !duplicates.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for (file, count) in duplicates {
            lines.push(format!("{}{} listed {} times", indent(1), file, count));
        }
    }

    lines
}

pub fn print_check_output(gallery: &GalleryMetadata, metadata_path: &Path) {
    for line in format_check_output(gallery, metadata_path) {
        println!("{}", line);
    }
}
