//! Plugin configuration module.
//!
//! Handles loading, validating, and merging `image-gallery.toml`. The file is
//! optional and sparse: stock defaults are serialized to a TOML table and the
//! user's values are merged on top, so a config only needs the keys it wants
//! to change.
//!
//! ## Config File Location
//!
//! ```text
//! my-docs/
//! ├── myst.yml
//! ├── image-gallery.toml        # Plugin config (optional)
//! └── images/
//!     ├── images_metadata.yml   # Gallery catalog
//!     ├── cat.jpg
//!     └── dog.jpg
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! metadata_path = "images/images_metadata.yml"
//! images_dir = "images"
//! missing_images = "warn"   # warn | skip | error
//!
//! [grid]
//! columns = [1, 1, 1, 2]    # xs, sm, md, lg
//!
//! [image]
//! width = "100%"
//! height = "200px"
//! object_fit = "cover"
//!
//! [tags]
//! background = "#009e9cff"
//! color = "white"
//! display = "inline-block"
//! border_radius = 8
//! padding = 5
//! margin = 5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "image-gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Plugin configuration loaded from `image-gallery.toml`.
///
/// Every gallery rendered in one run shares this configuration, which is
/// what keeps the grid layout and card styling uniform across a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Metadata file, relative to the project root.
    pub metadata_path: String,
    /// Directory image `file` entries are relative to (from the project root).
    pub images_dir: String,
    /// What to do when a catalog entry points at a file that isn't on disk.
    pub missing_images: MissingImagePolicy,
    /// Responsive column layout of the grid container.
    pub grid: GridLayout,
    /// Inline style applied to every card image.
    pub image: ImageStyleConfig,
    /// Inline style applied to every tag badge.
    pub tags: TagStyleConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            metadata_path: "images/images_metadata.yml".to_string(),
            images_dir: "images".to_string(),
            missing_images: MissingImagePolicy::default(),
            grid: GridLayout::default(),
            image: ImageStyleConfig::default(),
            tags: TagStyleConfig::default(),
        }
    }
}

const OBJECT_FIT_VALUES: &[&str] = &["fill", "contain", "cover", "none", "scale-down"];
const MAX_COLUMNS: u8 = 12;

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "metadata_path must not be empty".into(),
            ));
        }
        if self.grid.columns.len() != 4 {
            return Err(ConfigError::Validation(format!(
                "grid.columns must have 4 entries (xs, sm, md, lg), got {}",
                self.grid.columns.len()
            )));
        }
        if let Some(bad) = self
            .grid
            .columns
            .iter()
            .find(|&&c| c == 0 || c > MAX_COLUMNS)
        {
            return Err(ConfigError::Validation(format!(
                "grid.columns values must be 1-{MAX_COLUMNS}, got {bad}"
            )));
        }
        if self.image.width.trim().is_empty() || self.image.height.trim().is_empty() {
            return Err(ConfigError::Validation(
                "image.width and image.height must not be empty".into(),
            ));
        }
        if !OBJECT_FIT_VALUES.contains(&self.image.object_fit.as_str()) {
            return Err(ConfigError::Validation(format!(
                "image.object_fit must be one of {}, got {:?}",
                OBJECT_FIT_VALUES.join("|"),
                self.image.object_fit
            )));
        }
        Ok(())
    }

    /// Absolute location of the metadata file for a project root.
    pub fn metadata_file(&self, root: &Path) -> PathBuf {
        root.join(&self.metadata_path)
    }
}

/// Handling of catalog entries whose image file does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingImagePolicy {
    /// Log a warning and render the card anyway.
    #[default]
    Warn,
    /// Log a warning and leave the card out of the grid.
    Skip,
    /// Fail the directive occurrence.
    Error,
}

/// Column counts per breakpoint, smallest screen first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridLayout {
    /// `[xs, sm, md, lg]` column counts.
    pub columns: Vec<u8>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: vec![1, 1, 1, 2],
        }
    }
}

/// Fixed dimensions and cropping for card images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageStyleConfig {
    /// CSS width (e.g. `"100%"`).
    pub width: String,
    /// CSS height (e.g. `"200px"`).
    pub height: String,
    /// CSS `object-fit` value applied uniformly to every image.
    pub object_fit: String,
}

impl Default for ImageStyleConfig {
    fn default() -> Self {
        Self {
            width: "100%".to_string(),
            height: "200px".to_string(),
            object_fit: "cover".to_string(),
        }
    }
}

/// Badge styling for tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagStyleConfig {
    pub background: String,
    pub color: String,
    pub display: String,
    /// Corner radius in pixels.
    pub border_radius: u32,
    /// Padding in pixels.
    pub padding: u32,
    /// Margin in pixels.
    pub margin: u32,
}

impl Default for TagStyleConfig {
    fn default() -> Self {
        Self {
            background: "#009e9cff".to_string(),
            color: "white".to_string(),
            display: "inline-block".to_string(),
            border_radius: 8,
            padding: 5,
            margin: 5,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the plugin config.
///
/// `explicit` is a path given on the command line; otherwise
/// `image-gallery.toml` in the project root is used. A missing default file
/// means stock defaults. A missing explicit file is an error.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => {
            let raw = load_raw_config(path)?;
            if raw.is_none() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            raw
        }
        None => load_raw_config(&root.join(CONFIG_FILE_NAME))?,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `image-gallery.toml`.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# MyST Image Gallery Configuration
# ================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to myst.yml as image-gallery.toml, or pass it
# explicitly with --config. Unknown keys will cause an error.

# Gallery catalog, relative to the project root.
metadata_path = "images/images_metadata.yml"

# Directory that catalog `file` entries are relative to.
images_dir = "images"

# What to do when a catalog entry names an image that isn't on disk:
#   warn  - log a warning and render the card anyway
#   skip  - log a warning and leave the card out
#   error - fail the directive with an error marker
missing_images = "warn"

# ---------------------------------------------------------------------------
# Grid layout
# ---------------------------------------------------------------------------
[grid]
# Columns per breakpoint: [extra-small, small, medium, large]. Each 1-12.
columns = [1, 1, 1, 2]

# ---------------------------------------------------------------------------
# Card images
# ---------------------------------------------------------------------------
[image]
width = "100%"
height = "200px"
# One of fill, contain, cover, none, scale-down.
object_fit = "cover"

# ---------------------------------------------------------------------------
# Tag badges
# ---------------------------------------------------------------------------
[tags]
background = "#009e9cff"
color = "white"
display = "inline-block"
border_radius = 8   # px
padding = 5         # px
margin = 5          # px
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_paths() {
        let config = GalleryConfig::default();
        assert_eq!(config.metadata_path, "images/images_metadata.yml");
        assert_eq!(config.images_dir, "images");
        assert_eq!(config.missing_images, MissingImagePolicy::Warn);
    }

    #[test]
    fn default_config_layout_and_styles() {
        let config = GalleryConfig::default();
        assert_eq!(config.grid.columns, vec![1, 1, 1, 2]);
        assert_eq!(config.image.object_fit, "cover");
        assert_eq!(config.tags.background, "#009e9cff");
        assert_eq!(config.tags.border_radius, 8);
    }

    #[test]
    fn metadata_file_joins_root() {
        let config = GalleryConfig::default();
        assert_eq!(
            config.metadata_file(Path::new("/docs")),
            PathBuf::from("/docs/images/images_metadata.yml")
        );
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[grid]
columns = [1, 2, 3, 4]
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.grid.columns, vec![1, 2, 3, 4]);
        // Defaults preserved
        assert_eq!(config.image.height, "200px");
        assert_eq!(config.tags.color, "white");
    }

    #[test]
    fn parse_missing_images_policy() {
        let config: GalleryConfig = toml::from_str(r#"missing_images = "skip""#).unwrap();
        assert_eq!(config.missing_images, MissingImagePolicy::Skip);
        let config: GalleryConfig = toml::from_str(r#"missing_images = "error""#).unwrap();
        assert_eq!(config.missing_images, MissingImagePolicy::Error);
    }

    #[test]
    fn unknown_policy_rejected() {
        let result: Result<GalleryConfig, _> = toml::from_str(r#"missing_images = "panic""#);
        assert!(result.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn load_config_reads_file_from_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
images_dir = "figures"

[image]
height = "150px"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.images_dir, "figures");
        assert_eq!(config.image.height, "150px");
        assert_eq!(config.image.width, "100%");
    }

    #[test]
    fn load_config_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, r#"metadata_path = "gallery.yml""#).unwrap();

        let config = load_config(tmp.path(), Some(&path)).unwrap();
        assert_eq!(config.metadata_path, "gallery.yml");
    }

    #[test]
    fn load_config_explicit_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(tmp.path(), Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path(), None);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[grid]
colums = [1, 1, 1, 1]
"#,
        )
        .unwrap();
        assert!(load_config(tmp.path(), None).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<GalleryConfig, _> = toml::from_str("[gird]\ncolumns = [1]\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[grid]
columns = [1, 1, 0, 2]
"#,
        )
        .unwrap();
        let result = load_config(tmp.path(), None);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_column_count() {
        let mut config = GalleryConfig::default();
        config.grid.columns = vec![1, 2, 3];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("4 entries"));
    }

    #[test]
    fn validate_column_bounds() {
        let mut config = GalleryConfig::default();
        config.grid.columns = vec![1, 1, 1, 12];
        assert!(config.validate().is_ok());

        config.grid.columns = vec![1, 1, 1, 13];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_object_fit() {
        let mut config = GalleryConfig::default();
        config.image.object_fit = "scale-down".to_string();
        assert!(config.validate().is_ok());

        config.image.object_fit = "stretch".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("object_fit"));
    }

    #[test]
    fn validate_empty_metadata_path() {
        let mut config = GalleryConfig::default();
        config.metadata_path = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_image_dimensions() {
        let mut config = GalleryConfig::default();
        config.image.height = String::new();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[image]
width = "100%"
height = "200px"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[image]
height = "120px"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let image = merged.get("image").unwrap();
        assert_eq!(image.get("height").unwrap().as_str(), Some("120px"));
        assert_eq!(image.get("width").unwrap().as_str(), Some("100%"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("columns = [1, 1, 1, 2]").unwrap();
        let overlay: toml::Value = toml::from_str("columns = [2, 2, 3, 4]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("columns").unwrap().as_array().unwrap().len(), 4);
        assert_eq!(
            merged.get("columns").unwrap().as_array().unwrap()[0].as_integer(),
            Some(2)
        );
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value().unwrap(), None).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str(
            r#"
[image]
object_fit = "squash"
"#,
        )
        .unwrap();
        let result = resolve_config(stock_defaults_value().unwrap(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: GalleryConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[grid]"));
        assert!(content.contains("[image]"));
        assert!(content.contains("[tags]"));
        assert!(content.contains("missing_images"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("grid").is_some());
        assert!(val.get("image").is_some());
        assert!(val.get("tags").is_some());
    }
}
