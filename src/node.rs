//! MyST AST nodes emitted by the plugin.
//!
//! MyST documents are unist trees: every node is a JSON object with a
//! `type` discriminator, optional `children`, and node-specific fields.
//! The host hands us whole documents as untyped JSON; the nodes we *produce*
//! are typed here and serialized into that JSON.
//!
//! ```text
//! grid {columns}
//! └── card
//!     ├── image {url, alt, style}
//!     ├── paragraph
//!     │   └── text {value: alt text}
//!     └── div
//!         └── span {style}          (one per tag)
//!             └── text {value: tag}
//! ```

use serde::{Deserialize, Serialize};

/// Node type of the directive placeholder, replaced at the transform stage.
pub const GALLERY_NODE_TYPE: &str = "image-gallery";

/// A point in the source document (1-based line, 1-based column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// Source span of a node, as attached by the MyST parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
}

/// Inline CSS, serialized with camelCase keys the way MyST expects.
/// Unset properties are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<String>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Responsive grid; `columns` are counts per breakpoint.
    Grid {
        columns: Vec<u8>,
        children: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
    },
    Card {
        children: Vec<Node>,
    },
    Image {
        url: String,
        alt: String,
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,
    },
    Paragraph {
        children: Vec<Node>,
    },
    Div {
        children: Vec<Node>,
    },
    Span {
        #[serde(default, skip_serializing_if = "Style::is_empty")]
        style: Style,
        children: Vec<Node>,
    },
    Text {
        value: String,
    },
    /// Callout box; `kind` is e.g. `"danger"`.
    Admonition {
        kind: String,
        children: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
    },
    AdmonitionTitle {
        children: Vec<Node>,
    },
    /// Directive placeholder, waiting for the document transform.
    #[serde(rename = "image-gallery")]
    ImageGallery {
        #[serde(default)]
        children: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
    },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn placeholder(position: Option<Position>) -> Self {
        Node::ImageGallery {
            children: Vec::new(),
            position,
        }
    }

    /// Error marker shown in place of a gallery that failed to render.
    pub fn error_marker(message: &str, position: Option<Position>) -> Self {
        Node::Admonition {
            kind: "danger".to_string(),
            children: vec![
                Node::AdmonitionTitle {
                    children: vec![Node::text("Image gallery could not be rendered")],
                },
                Node::paragraph(vec![Node::text(message)]),
            ],
            position,
        }
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Grid { children, .. }
            | Node::Card { children }
            | Node::Paragraph { children }
            | Node::Div { children }
            | Node::Span { children, .. }
            | Node::Admonition { children, .. }
            | Node::AdmonitionTitle { children }
            | Node::ImageGallery { children, .. } => children,
            Node::Image { .. } | Node::Text { .. } => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text { value } => value.clone(),
            other => other.children().iter().map(Node::plain_text).collect(),
        }
    }
}
