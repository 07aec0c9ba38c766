//! Candidate image discovery
//!
//! Enumerates the image files under a search path. The identifier list is
//! sorted because candidate order is part of the engine launch contract:
//! the engine indexes the files in argument order and keys its scores by
//! the identifiers it was given, so the order has to be reproducible.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::Path;

/// Extensions recognized as searchable images
const IMAGE_EXTENSIONS: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

fn image_globs() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for ext in IMAGE_EXTENSIONS {
        let glob = GlobBuilder::new(&format!("*.{}", ext))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("bad image glob for extension {}", ext))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Discover candidate images under `root`.
///
/// Returns identifiers relative to `root`, sorted and de-duplicated. The
/// walk respects ignore files and skips hidden entries.
pub fn discover(root: &Path) -> Result<Vec<String>> {
    let globs = image_globs()?;
    let mut names = Vec::new();

    for entry in WalkBuilder::new(root).build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if !globs.is_match(entry.file_name()) {
            continue;
        }

        let name = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .into_owned();
        names.push(name);
    }

    names.sort();
    names.dedup();
    Ok(names)
}
