//! Directory scanning that turns a folder (or a file inside one) into the
//! ordered image list a gallery session is presented with.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, trace};
use walkdir::WalkDir;

use crate::models::{is_image_path, ImageSource};

/// Configuration for the directory scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to descend into subdirectories.
    pub recursive: bool,
    /// Maximum directory depth when recursive (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
    /// Whether to include dot-files and dot-directories.
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: 0, // unlimited
            follow_symlinks: false,
            include_hidden: false,
        }
    }
}

/// Images to present and the index to start at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub sources: Vec<ImageSource>,
    pub start_index: usize,
}

/// Lists the images under `dir`, sorted by path.
pub fn scan_sources(dir: &Path, config: &ScanConfig) -> Result<Vec<ImageSource>> {
    if !dir.is_dir() {
        bail!("Not a directory: {:?}", dir);
    }

    let mut walker = WalkDir::new(dir).follow_links(config.follow_symlinks);
    if !config.recursive {
        walker = walker.max_depth(1);
    } else if config.max_depth > 0 {
        walker = walker.max_depth(config.max_depth);
    }

    let include_hidden = config.include_hidden;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in walker.into_iter().filter_entry(|entry| {
        // Never filter the root itself, even if it is a dot-directory
        entry.depth() == 0
            || include_hidden
            || entry
                .file_name()
                .to_str()
                .map(|name| !name.starts_with('.'))
                .unwrap_or(true)
    }) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() && !entry.path_is_symlink() {
            continue;
        }
        if is_image_path(entry.path()) {
            trace!(path = ?entry.path(), "Found image");
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    info!("Found {} images in {:?}", paths.len(), dir);
    Ok(paths.into_iter().map(ImageSource::File).collect())
}

/// Resolves what to open for a command-line or file-manager path.
///
/// A directory opens at its first image; an image file opens its parent
/// directory positioned on that file.
pub fn resolve_target(path: &Path, config: &ScanConfig) -> Result<ScanTarget> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {:?}", path))?;

    if path.is_dir() {
        return Ok(ScanTarget {
            sources: scan_sources(&path, config)?,
            start_index: 0,
        });
    }

    if !is_image_path(&path) {
        bail!("Not an image file: {:?}", path);
    }
    let parent = path
        .parent()
        .with_context(|| format!("Image has no parent directory: {:?}", path))?;
    let sources = scan_sources(parent, &ScanConfig {
        recursive: false,
        ..config.clone()
    })?;
    let start_index = sources
        .iter()
        .position(|source| matches!(source, ImageSource::File(p) if *p == path))
        .unwrap_or(0);

    Ok(ScanTarget {
        sources,
        start_index,
    })
}
