//! Shared test utilities for the myst-image-gallery test suite.
//!
//! Provides project fixtures on disk and lookups into rendered gallery
//! trees.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = project_with_metadata(CAT_DOG_YAML, &["cat.jpg", "dog.jpg"]);
//! let transform = GalleryTransform::new(tmp.path(), GalleryConfig::default());
//! let grid = transform.render(&DirectiveContext::default()).unwrap();
//!
//! let cards = cards_of(&grid);
//! assert_eq!(caption(cards[0]), "A cat");
//! assert_eq!(tag_labels(cards[0]), vec!["animals", "cute"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::node::Node;

/// Two-record catalog: a fully described cat and a bare dog.
pub const CAT_DOG_YAML: &str = r#"
- file: cat.jpg
  alt-text: "A cat"
  tags: [animals, cute]
- file: dog.jpg
"#;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a project root with `images/images_metadata.yml` holding `yaml`
/// and a placeholder file for each name in `images`.
pub fn project_with_metadata(yaml: &str, images: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let images_dir = tmp.path().join("images");
    fs::create_dir_all(&images_dir).unwrap();
    fs::write(images_dir.join("images_metadata.yml"), yaml).unwrap();
    for name in images {
        touch(&images_dir.join(name));
    }
    tmp
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"fake image").unwrap();
}

// =========================================================================
// Gallery tree lookups — panic with a clear message on shape mismatch
// =========================================================================

/// Card children of a grid node. Panics if `grid` is not a grid.
pub fn cards_of(grid: &Node) -> Vec<&Node> {
    match grid {
        Node::Grid { children, .. } => {
            for child in children {
                assert!(
                    matches!(child, Node::Card { .. }),
                    "grid child is not a card: {child:?}"
                );
            }
            children.iter().collect()
        }
        other => panic!("expected grid node, got {other:?}"),
    }
}

/// Image URL of a card.
pub fn image_url(card: &Node) -> &str {
    match card.children().first() {
        Some(Node::Image { url, .. }) => url,
        other => panic!("card does not start with an image: {other:?}"),
    }
}

/// Caption text of a card.
pub fn caption(card: &Node) -> String {
    match card.children().get(1) {
        Some(p @ Node::Paragraph { .. }) => p.plain_text(),
        other => panic!("card has no caption paragraph: {other:?}"),
    }
}

/// Tag badge labels of a card, in order.
pub fn tag_labels(card: &Node) -> Vec<String> {
    match card.children().get(2) {
        Some(Node::Div { children }) => children.iter().map(Node::plain_text).collect(),
        other => panic!("card has no tag container: {other:?}"),
    }
}
