//! MyST executable-plugin contract.
//!
//! The host talks to the plugin in three calls, all JSON over stdio:
//!
//! | Invocation | stdin | stdout |
//! |------------|-------|--------|
//! | *(no flags)* | — | [`PluginSpec`] manifest |
//! | `--directive image-gallery` | directive data | `[placeholder]` |
//! | `--transform image-gallery` | whole document | transformed document |
//!
//! The directive call only drops a placeholder node into the tree. Rendering
//! happens in the transform call, at the `document` stage, once the whole
//! page is known.

use crate::node::{GALLERY_NODE_TYPE, Node, Position};
use crate::transform::GalleryTransform;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use thiserror::Error;
use tracing::info;

pub const PLUGIN_NAME: &str = "Image Gallery Plugin";
pub const DIRECTIVE_NAME: &str = GALLERY_NODE_TYPE;
pub const TRANSFORM_NAME: &str = GALLERY_NODE_TYPE;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unknown directive '{0}' (this plugin provides 'image-gallery')")]
    UnknownDirective(String),
    #[error("Unknown transform '{0}' (this plugin provides 'image-gallery')")]
    UnknownTransform(String),
    #[error("Roles are not implemented by this plugin (requested '{0}')")]
    UnsupportedRole(String),
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capability manifest printed when the host runs the plugin without flags.
#[derive(Debug, Clone, Serialize)]
pub struct PluginSpec {
    pub name: String,
    pub directives: Vec<DirectiveSpec>,
    pub transforms: Vec<TransformSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectiveSpec {
    pub name: String,
    pub doc: String,
    /// Accepted options; the gallery takes none, so this is always `{}`.
    pub options: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformSpec {
    pub name: String,
    pub doc: String,
    pub stage: String,
}

pub fn plugin_spec() -> PluginSpec {
    PluginSpec {
        name: PLUGIN_NAME.to_string(),
        directives: vec![DirectiveSpec {
            name: DIRECTIVE_NAME.to_string(),
            doc: "A directive for embedding a gallery of images with alt text and tags."
                .to_string(),
            options: serde_json::Map::new(),
        }],
        transforms: vec![TransformSpec {
            name: TRANSFORM_NAME.to_string(),
            doc: "Replaces image-gallery placeholders with a grid of image cards.".to_string(),
            stage: "document".to_string(),
        }],
    }
}

/// Handle `--directive NAME`: emit the placeholder for the transform stage.
///
/// The directive's source position (`node.position` in the host's directive
/// data) is copied onto the placeholder so errors can point at it later.
pub fn run_directive(name: &str, data: &Value) -> Result<Vec<Node>, PluginError> {
    if name != DIRECTIVE_NAME {
        return Err(PluginError::UnknownDirective(name.to_string()));
    }
    let position = data
        .pointer("/node/position")
        .and_then(|p| serde_json::from_value::<Position>(p.clone()).ok());
    Ok(vec![Node::placeholder(position)])
}

/// Handle `--transform NAME`: render every placeholder in `document`.
pub fn run_transform(
    name: &str,
    mut document: Value,
    transform: &GalleryTransform,
) -> Result<Value, PluginError> {
    if name != TRANSFORM_NAME {
        return Err(PluginError::UnknownTransform(name.to_string()));
    }
    let report = transform.apply(&mut document);
    info!(%report, "image-gallery transform finished");
    Ok(document)
}

/// Read the JSON payload the host writes on stdin.
pub fn read_input(reader: impl Read) -> Result<Value, PluginError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Handle `--role NAME`. Always an error: no roles are declared.
pub fn run_role(name: &str) -> Result<Value, PluginError> {
    Err(PluginError::UnsupportedRole(name.to_string()))
}
