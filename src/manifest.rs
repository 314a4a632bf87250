use crate::config::{MANIFEST_FILE_NAME, SHARE_URL_PREFIX};
use crate::models::{Manifest, StickerSet};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

impl Manifest {
    pub fn for_set(set_name: &str, set: &StickerSet) -> Self {
        Self {
            title: set.title.clone(),
            name: set.name.clone(),
            icon: None,
            url: format!("{SHARE_URL_PREFIX}{set_name}"),
        }
    }
}

/// Writes `sticker.json` into a set's output directory.
pub struct ManifestWriter {
    manifest_file: PathBuf,
}

impl ManifestWriter {
    pub fn new(set_dir: &Path) -> Self {
        let manifest_file = set_dir.join(MANIFEST_FILE_NAME);
        Self { manifest_file }
    }

    pub fn path(&self) -> &Path {
        &self.manifest_file
    }

    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let content =
            serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;

        fs::write(&self.manifest_file, content).context("Failed to write manifest file")?;

        Ok(())
    }
}
