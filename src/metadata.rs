//! Gallery catalog loading.
//!
//! The catalog is a YAML file (by default `images/images_metadata.yml`)
//! listing the images to show, in display order:
//!
//! ```yaml
//! - file: cat.jpg
//!   alt-text: A cat
//!   tags: [animals, cute]
//! - file: dog.jpg
//! ```
//!
//! The older layout, with the list nested under an `images:` key and the
//! path under `filename:`, is accepted too:
//!
//! ```yaml
//! images:
//!   - filename: cat.jpg
//!     alt-text: A cat
//! ```
//!
//! ## Shape rules
//!
//! - Declaration order is display order. Nothing is sorted.
//! - `file` is required and must be non-empty.
//! - `file` must stay inside the images directory: no absolute paths, no `..`.
//! - `alt-text` and `tags` are optional; an explicit `null` counts as absent.
//! - Scalar tags (`2023`, `true`) are kept as their string form.
//! - Keys other than these are ignored, so catalogs can carry extra data.
//! - An empty document is an empty gallery.
//! - Duplicate `file` entries are kept; [`GalleryMetadata::duplicate_files`]
//!   reports them so callers can warn.

use serde::{Deserialize, Deserializer, de};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Image metadata file not found: {0}")]
    NotFound(PathBuf),
    #[error("Invalid image metadata in {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRecord {
    /// Image path, relative to the configured images directory.
    #[serde(alias = "filename")]
    pub file: String,
    /// Alt text, also used as the card caption.
    #[serde(
        default,
        rename = "alt-text",
        alias = "alt_text",
        deserialize_with = "null_as_default"
    )]
    pub alt_text: String,
    /// Tag labels, rendered as badges in this order.
    #[serde(default, deserialize_with = "scalar_tags")]
    pub tags: Vec<String>,
}

impl ImageRecord {
    /// `file` with `/` separators and `.` segments removed.
    ///
    /// Both the emitted URL and the on-disk lookup are built from this.
    pub fn relative_path(&self) -> String {
        normalize_file(&self.file)
    }
}

fn normalize_file(file: &str) -> String {
    file.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// True when `file` resolves to a location under the images directory.
fn stays_inside_images_dir(file: &str) -> bool {
    let slashed = file.replace('\\', "/");
    !slashed.starts_with('/')
        && !Path::new(file).has_root()
        && Path::new(&slashed)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// The whole catalog, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryMetadata {
    pub records: Vec<ImageRecord>,
}

impl GalleryMetadata {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRecord> {
        self.records.iter()
    }

    /// Files listed more than once, with how often, in first-seen order.
    pub fn duplicate_files(&self) -> Vec<(&str, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut order = Vec::new();
        for record in &self.records {
            let count = counts.entry(record.file.as_str()).or_insert(0);
            if *count == 0 {
                order.push(record.file.as_str());
            }
            *count += 1;
        }
        order
            .into_iter()
            .filter_map(|file| {
                let n = counts[file];
                (n > 1).then_some((file, n))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a GalleryMetadata {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn scalar_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_yaml::Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|tag| match tag {
            serde_yaml::Value::String(s) => Ok(s),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            serde_yaml::Value::Bool(b) => Ok(b.to_string()),
            other => Err(de::Error::custom(format!(
                "tags must be strings or scalars, got {other:?}"
            ))),
        })
        .collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Read and parse the catalog at `path`.
///
/// A fresh read happens on every call; nothing is cached.
pub fn load_metadata(path: &Path) -> Result<GalleryMetadata, MetadataError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            MetadataError::NotFound(path.to_path_buf())
        } else {
            MetadataError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_metadata(&content, path)
}

/// Parse catalog text. `path` is only used for error messages.
pub fn parse_metadata(content: &str, path: &Path) -> Result<GalleryMetadata, MetadataError> {
    let parse_error = |message: String| MetadataError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

    let entries = match document {
        serde_yaml::Value::Null => return Ok(GalleryMetadata::default()),
        serde_yaml::Value::Sequence(seq) => seq,
        serde_yaml::Value::Mapping(mut map) => match map.remove("images") {
            Some(serde_yaml::Value::Sequence(seq)) => seq,
            Some(serde_yaml::Value::Null) => return Ok(GalleryMetadata::default()),
            Some(_) => return Err(parse_error("`images` must be a list of image records".into())),
            None => {
                return Err(parse_error(
                    "expected a list of image records (or an `images:` list)".into(),
                ));
            }
        },
        _ => {
            return Err(parse_error(
                "expected a list of image records (or an `images:` list)".into(),
            ));
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let index = i + 1;
        if !entry.is_mapping() {
            return Err(parse_error(format!("record {index} is not a mapping")));
        }
        let record: ImageRecord =
            serde_yaml::from_value(entry).map_err(|e| parse_error(format!("record {index}: {e}")))?;
        if record.relative_path().trim().is_empty() {
            return Err(parse_error(format!("record {index}: `file` is empty")));
        }
        if !stays_inside_images_dir(&record.file) {
            return Err(parse_error(format!(
                "record {index}: `file` must be relative to the images directory"
            )));
        }
        records.push(record);
    }

    Ok(GalleryMetadata { records })
}
