//! Frame discovery.
//!
//! Frames are files named `<prefix>..._<index>.<extension>` inside a single
//! data directory. The index is the integer between the last underscore and
//! the extension, and frames are ordered by its numeric value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// File name prefix of inversion output frames.
pub const DEFAULT_FRAME_PREFIX: &str = "dcinv";

/// File extension of inversion output frames.
pub const DEFAULT_FRAME_EXTENSION: &str = "vtk";

/// One snapshot in the time-ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: u64,
    pub path: PathBuf,
}

impl Frame {
    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Numerically ordered frames found in a data directory.
#[derive(Debug, Clone, Default)]
pub struct FrameCatalog {
    frames: BTreeMap<u64, PathBuf>,
}

impl FrameCatalog {
    /// Scan `dir` (non-recursively) for frame files.
    ///
    /// An empty result is not an error; it is logged as a warning and the
    /// caller decides how to surface it.
    pub fn discover(dir: &Path, prefix: &str, extension: &str) -> Result<Self> {
        info!(dir = %dir.display(), prefix, extension, "Discovering frame files");

        let mut frames = BTreeMap::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            match parse_frame_index(name, prefix, extension) {
                Some(index) => {
                    if let Some(previous) = frames.insert(index, entry.path().to_path_buf()) {
                        warn!(
                            index,
                            replaced = %previous.display(),
                            "Duplicate frame index, keeping the later file"
                        );
                    }
                }
                None => debug!(file = name, "Ignoring non-frame file"),
            }
        }

        let catalog = Self { frames };
        if catalog.is_empty() {
            warn!(dir = %dir.display(), "No frame files found");
        } else {
            info!(count = catalog.len(), "Found frame files");
        }
        Ok(catalog)
    }

    /// Build a catalog from already-known file names (no filesystem access).
    pub fn from_names<I, S>(dir: &Path, names: I, prefix: &str, extension: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let frames = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                parse_frame_index(name, prefix, extension).map(|i| (i, dir.join(name)))
            })
            .collect();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame indices in ascending numeric order.
    pub fn indices(&self) -> Vec<u64> {
        self.frames.keys().copied().collect()
    }

    pub fn get(&self, index: u64) -> Option<Frame> {
        self.frames.get(&index).map(|path| Frame {
            index,
            path: path.clone(),
        })
    }

    pub fn first(&self) -> Option<Frame> {
        self.frames.iter().next().map(|(&index, path)| Frame {
            index,
            path: path.clone(),
        })
    }

    /// Smallest and largest frame index.
    pub fn index_range(&self) -> Option<(u64, u64)> {
        let first = *self.frames.keys().next()?;
        let last = *self.frames.keys().next_back()?;
        Some((first, last))
    }

    /// Iterate frames in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.iter().map(|(&index, path)| Frame {
            index,
            path: path.clone(),
        })
    }
}

/// Extract the frame index from a file name.
///
/// The name must start with `prefix` and end with `.<extension>`; the index
/// is the integer token after the last underscore.
pub fn parse_frame_index(file_name: &str, prefix: &str, extension: &str) -> Option<u64> {
    if !file_name.starts_with(prefix) {
        return None;
    }
    let stem = file_name
        .strip_suffix(extension)?
        .strip_suffix('.')?;
    let (_, token) = stem.rsplit_once('_')?;
    token.parse().ok()
}
