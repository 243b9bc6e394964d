//! Normalized extraction result.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::common::ImageFormat;
use crate::sanitize::{sanitize_or, ARTIST_PLACEHOLDER, TITLE_PLACEHOLDER};

/// One artwork as reported by a source.
///
/// Only `identifier` is guaranteed. A missing `image_url` means the item
/// cannot be downloaded; a missing title or artist falls back to placeholder
/// names on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    /// Source-specific key.
    pub identifier: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    /// Absolute URL of the full-size image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Extra descriptive lines (technique, date, dimensions...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ItemRecord {
    /// Create a record with only its identifier.
    pub fn new<S: Into<String>>(identifier: S) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = non_empty(title.into());
        self
    }

    pub fn with_artist<S: Into<String>>(mut self, artist: S) -> Self {
        self.artist = non_empty(artist.into());
        self
    }

    pub fn with_image_url<S: Into<String>>(mut self, url: S) -> Self {
        self.image_url = non_empty(url.into());
        self
    }

    pub fn with_detail<S: Into<String>>(mut self, detail: S) -> Self {
        if let Some(detail) = non_empty(detail.into()) {
            self.details.push(detail);
        }
        self
    }

    /// Whether there is an image to download.
    pub fn is_downloadable(&self) -> bool {
        self.image_url.is_some()
    }

    /// Title for log lines.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Sin título")
    }

    /// Artist for log lines.
    pub fn display_artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("Sin artista")
    }

    /// Directory holding this artist's files under `root`.
    pub fn artist_dir(&self, root: &Path) -> PathBuf {
        root.join(sanitize_or(
            self.artist.as_deref().unwrap_or(""),
            ARTIST_PLACEHOLDER,
        ))
    }

    /// `root/<artist>/<title>.<ext>` for the given format.
    pub fn destination(&self, root: &Path, format: ImageFormat) -> PathBuf {
        let stem = sanitize_or(self.title.as_deref().unwrap_or(""), TITLE_PLACEHOLDER);
        self.artist_dir(root)
            .join(format!("{}.{}", stem, format.extension()))
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
