//! Gallery rendering and document transformation.
//!
//! [`GalleryTransform::render`] turns the catalog into one grid node;
//! [`GalleryTransform::apply`] finds every `image-gallery` placeholder in a
//! MyST document and swaps the rendered grid in.
//!
//! ## Failure isolation
//!
//! Each placeholder is rendered independently and re-reads the catalog. A
//! failure (missing catalog, bad YAML, missing image under the `error`
//! policy) replaces only that placeholder with a `danger` admonition and
//! logs the source line. Other galleries in the document, and other
//! documents, still render.
//!
//! An invalid `image-gallery.toml` is handled the same way: a transform
//! built with [`GalleryTransform::misconfigured`] turns every placeholder
//! into an admonition naming the config error, and documents without a
//! gallery pass through untouched.

use crate::config::{ConfigError, GalleryConfig, MissingImagePolicy};
use crate::metadata::{self, GalleryMetadata, ImageRecord, MetadataError};
use crate::node::{GALLERY_NODE_TYPE, Node, Position, Style};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),
    #[error("Invalid image-gallery config: {0}")]
    Config(String),
}

/// Where a directive occurrence sits, and what it was given.
#[derive(Debug, Clone, Default)]
pub struct DirectiveContext {
    /// Source span of the directive, if the host reported one.
    pub position: Option<Position>,
    /// Directive options. The gallery takes none; kept for logging.
    pub options: serde_json::Map<String, Value>,
}

impl DirectiveContext {
    /// Build a context from an `image-gallery` node of a host document.
    pub fn from_node(node: &Value) -> Self {
        let position = node
            .get("position")
            .and_then(|p| serde_json::from_value(p.clone()).ok());
        let options = node
            .get("options")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { position, options }
    }

    /// `line N` for log messages, or `unknown line`.
    pub fn location(&self) -> String {
        match &self.position {
            Some(pos) => format!("line {}", pos.start.line),
            None => "unknown line".to_string(),
        }
    }
}

/// Outcome of [`GalleryTransform::apply`] over one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub rendered: usize,
    pub failed: usize,
}

impl std::fmt::Display for TransformReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rendered, {} failed", self.rendered, self.failed)
    }
}

pub struct GalleryTransform {
    root: PathBuf,
    config: GalleryConfig,
    config_error: Option<String>,
}

impl GalleryTransform {
    pub fn new(root: impl Into<PathBuf>, config: GalleryConfig) -> Self {
        Self {
            root: root.into(),
            config,
            config_error: None,
        }
    }

    /// A transform whose config failed to load. Every render fails with
    /// [`RenderError::Config`].
    pub fn misconfigured(root: impl Into<PathBuf>, err: &ConfigError) -> Self {
        Self {
            root: root.into(),
            config: GalleryConfig::default(),
            config_error: Some(err.to_string()),
        }
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.config.metadata_file(&self.root)
    }

    /// Render the gallery for one directive occurrence.
    pub fn render(&self, ctx: &DirectiveContext) -> Result<Node, RenderError> {
        if let Some(message) = &self.config_error {
            return Err(RenderError::Config(message.clone()));
        }
        let path = self.metadata_path();
        debug!(path = %path.display(), at = %ctx.location(), "loading image metadata");
        let gallery = metadata::load_metadata(&path)?;

        for (file, count) in gallery.duplicate_files() {
            warn!(file, count, "image listed more than once in metadata");
        }

        let cards = self.render_cards(&gallery)?;
        info!(cards = cards.len(), at = %ctx.location(), "rendered image gallery");

        Ok(Node::Grid {
            columns: self.config.grid.columns.clone(),
            children: cards,
            position: ctx.position.clone(),
        })
    }

    fn render_cards(&self, gallery: &GalleryMetadata) -> Result<Vec<Node>, RenderError> {
        let mut cards = Vec::with_capacity(gallery.len());
        for record in gallery {
            let on_disk = self.image_path(record);
            if !on_disk.is_file() {
                match self.config.missing_images {
                    MissingImagePolicy::Warn => {
                        warn!(path = %on_disk.display(), "image referenced in metadata not found");
                    }
                    MissingImagePolicy::Skip => {
                        warn!(path = %on_disk.display(), "skipping missing image");
                        continue;
                    }
                    MissingImagePolicy::Error => return Err(RenderError::ImageNotFound(on_disk)),
                }
            }
            cards.push(self.render_card(record));
        }
        Ok(cards)
    }

    /// Build one card: image, caption, and tag badges.
    pub fn render_card(&self, record: &ImageRecord) -> Node {
        let image = Node::Image {
            url: self.image_url(record),
            alt: record.alt_text.clone(),
            style: self.image_style(),
        };
        let caption = Node::paragraph(vec![Node::text(record.alt_text.as_str())]);
        let badges = Node::Div {
            children: record
                .tags
                .iter()
                .map(|tag| Node::Span {
                    style: self.tag_style(),
                    children: vec![Node::text(tag.as_str())],
                })
                .collect(),
        };
        Node::Card {
            children: vec![image, caption, badges],
        }
    }

    /// Project-relative URL of a record's image, always `/`-separated.
    pub fn image_url(&self, record: &ImageRecord) -> String {
        let dir = self.config.images_dir.trim_matches('/');
        let file = record.relative_path();
        if dir.is_empty() {
            file
        } else {
            format!("{dir}/{file}")
        }
    }

    fn image_path(&self, record: &ImageRecord) -> PathBuf {
        record
            .relative_path()
            .split('/')
            .fold(self.root.join(&self.config.images_dir), |path, segment| {
                path.join(segment)
            })
    }

    fn image_style(&self) -> Style {
        let image = &self.config.image;
        Style {
            width: Some(image.width.clone()),
            height: Some(image.height.clone()),
            object_fit: Some(image.object_fit.clone()),
            ..Style::default()
        }
    }

    fn tag_style(&self) -> Style {
        let tags = &self.config.tags;
        Style {
            display: Some(tags.display.clone()),
            background: Some(tags.background.clone()),
            color: Some(tags.color.clone()),
            border_radius: Some(tags.border_radius),
            padding: Some(tags.padding),
            margin: Some(tags.margin),
            ..Style::default()
        }
    }

    /// Replace every `image-gallery` node in `document`, at any depth.
    pub fn apply(&self, document: &mut Value) -> TransformReport {
        let mut report = TransformReport::default();
        self.apply_node(document, &mut report);
        if report.rendered + report.failed == 0 {
            info!("no image-gallery directive found in document");
        }
        report
    }

    fn apply_node(&self, node: &mut Value, report: &mut TransformReport) {
        if is_gallery_node(node) {
            let ctx = DirectiveContext::from_node(node);
            if !ctx.options.is_empty() {
                debug!(options = ?ctx.options, "ignoring image-gallery options");
            }
            let rendered = match self.render(&ctx) {
                Ok(grid) => {
                    report.rendered += 1;
                    grid
                }
                Err(err) => {
                    report.failed += 1;
                    error!(at = %ctx.location(), "image-gallery failed: {err}");
                    Node::error_marker(&err.to_string(), ctx.position.clone())
                }
            };
            match serde_json::to_value(rendered) {
                Ok(value) => *node = value,
                Err(err) => error!(at = %ctx.location(), "could not serialize gallery: {err}"),
            }
            return;
        }

        match node {
            Value::Object(map) => {
                for child in map.values_mut() {
                    if child.is_array() || child.is_object() {
                        self.apply_node(child, report);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.apply_node(item, report);
                }
            }
            _ => {}
        }
    }
}

fn is_gallery_node(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some(GALLERY_NODE_TYPE)
}
