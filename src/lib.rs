//! # MyST Image Gallery
//!
//! An executable plugin for the [MyST](https://mystmd.org) document engine.
//! It adds an `image-gallery` directive that renders a YAML catalog of images
//! as a responsive grid of cards, each holding the image, its alt text as a
//! caption, and its tags as badges.
//!
//! # Architecture: Placeholder, Then Transform
//!
//! The host drives the plugin through three invocations, all JSON on stdio:
//!
//! ```text
//! 1. Manifest   (no flags)                 →  directives + transforms offered
//! 2. Directive  --directive image-gallery  →  [ {type: "image-gallery"} ]
//! 3. Transform  --transform image-gallery  →  document with grids in place
//! ```
//!
//! The directive step only leaves a placeholder. All file access happens in
//! the transform step, where each placeholder independently re-reads the
//! catalog and is replaced by a `grid` node. A failing placeholder becomes a
//! visible error admonition; nothing else on the page is affected.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`plugin`] | Capability manifest and the directive/transform/role entry points |
//! | [`transform`] | Gallery rendering and placeholder replacement in a document tree |
//! | [`metadata`] | `images_metadata.yml` loading and shape validation |
//! | [`node`] | Typed MyST AST nodes emitted by the plugin |
//! | [`config`] | `image-gallery.toml` loading, merging, and validation |
//! | [`output`] | `--check` output formatting |
//!
//! # Design Decisions
//!
//! ## Stdout Is the Protocol
//!
//! Only protocol JSON goes to stdout. Logging goes through `tracing` to
//! stderr, so the host can surface diagnostics without corrupting the tree
//! it reads back.
//!
//! ## No Caching
//!
//! The catalog is a small static file. Reading it per placeholder keeps each
//! render a pure function of (catalog, config), which is what makes repeated
//! renders identical and lets hosts run documents in parallel.
//!
//! ## One Layout per Site
//!
//! Grid columns and card styles come from `image-gallery.toml`, not from
//! directive options, so every gallery on a site looks the same.

pub mod config;
pub mod metadata;
pub mod node;
pub mod output;
pub mod plugin;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
