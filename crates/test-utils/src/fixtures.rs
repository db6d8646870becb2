//! Common test fixtures for resvis tests.
//!
//! This module provides pre-defined values from real inversion runs and
//! temporary frame directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::generators::SyntheticMesh;

/// Frame file naming used by the inversion output.
pub mod frames {
    pub const PREFIX: &str = "dcinv";
    pub const JSON_EXTENSION: &str = "json";

    /// Unsorted names whose numeric order is 1, 2, 10
    pub const UNSORTED_NAMES: [&str; 3] = ["dcinv_1.vtk", "dcinv_10.vtk", "dcinv_2.vtk"];
}

/// Ranges observed on the dam data set.
pub mod ranges {
    /// Auto-detected log10 resistivity range
    pub const AUTO: (f64, f64) = (-0.189, 4.970);

    /// A typical manual override
    pub const MANUAL: (f64, f64) = (0.0, 5.0);

    pub const SCALAR: &str = "Resistivity(log10)";
}

/// Clip box used when inspecting the dam core.
pub mod bounds {
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub const DAM_CLIP: [f64; 6] = [2.0, 17.0, 2.0, 22.0, 22.0, 27.0];

    /// Mesh extent enclosing `DAM_CLIP`
    pub const DAM_MESH: [f64; 6] = [0.0, 20.0, 0.0, 25.0, 20.0, 30.0];
}

/// A temporary directory of frame files, deleted on drop.
pub struct FrameDir {
    dir: TempDir,
}

impl FrameDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a JSON mesh frame named `<prefix>_<index>.json`.
    pub fn write_mesh(&self, prefix: &str, index: u64, mesh: &SyntheticMesh) -> PathBuf {
        let path = self
            .path()
            .join(format!("{prefix}_{index}.{}", frames::JSON_EXTENSION));
        fs::write(&path, mesh.to_json()).expect("write mesh frame");
        path
    }

    /// Write an arbitrary file, e.g. a non-matching name or a corrupt frame.
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    /// Create empty files with the given names.
    pub fn touch_all(&self, names: &[&str]) {
        for name in names {
            self.write_raw(name, "");
        }
    }
}

impl Default for FrameDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvis_common::Bounds3;

    #[test]
    fn test_frame_dir_writes() {
        let dir = FrameDir::new();
        let mesh = SyntheticMesh::structured(Bounds3::from_array(bounds::DAM_MESH), [2, 2, 2]);
        let path = dir.write_mesh(frames::PREFIX, 7, &mesh);
        assert!(path.ends_with("dcinv_7.json"));
        assert!(path.exists());

        dir.touch_all(&frames::UNSORTED_NAMES);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_clip_inside_mesh() {
        let clip = Bounds3::from_array(bounds::DAM_CLIP);
        let mesh = Bounds3::from_array(bounds::DAM_MESH);
        assert_eq!(mesh.intersection(&clip), Some(clip));
    }
}
