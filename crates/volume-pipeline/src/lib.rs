//! Numeric pipeline for time-ordered resistivity volumes.
//!
//! Turns scalar fields defined on irregular meshes into uniform grids with
//! color/opacity transfer functions and isosurfaces, keeping the value scale
//! consistent across the whole frame sequence.
//!
//! # Architecture
//!
//! ```text
//! FrameCatalog::discover(dir)
//!      │
//!      ▼
//! MeshLoader::load(frame) ──► dyn MeshSource
//!      │
//!      ▼
//! resolve_scalar (missing array → first available, cell → point)
//!      │
//!      ▼
//! resample(bounds ∩ clip, target_cells) ──► UniformGrid
//!      │                    │
//!      │                    └─► DegenerateGrid ─► FrameOutput::Fallback
//!      ▼
//! cleanup::clean (NaN/Inf, then out-of-range)
//!      │
//!      ▼
//! RangeTracker::update (auto/manual hysteresis)
//!      │
//!      ├─► build_color / build_opacity
//!      │
//!      └─► isosurface::generate + volume_visibility
//!               │
//!               ▼
//!          FrameOutput::Volume
//! ```
//!
//! # Example
//!
//! ```ignore
//! use volume_pipeline::{FrameCatalog, FramePipeline, JsonMeshLoader, Session};
//!
//! let catalog = FrameCatalog::discover(dir, "dcinv", "json")?;
//! let pipeline = FramePipeline::new(JsonMeshLoader);
//! let mut session = Session::default();
//!
//! for frame in catalog.iter() {
//!     let output = pipeline.run_frame(&mut session, &frame)?;
//! }
//! ```

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod isosurface;
pub mod mesh;
pub mod pipeline;
pub mod range;
pub mod resample;
pub mod session;
pub mod transfer;

// Re-export commonly used types at crate root
pub use catalog::{parse_frame_index, Frame, FrameCatalog};
pub use cleanup::{clean, CleanedField};
pub use config::{CatalogConfig, PipelineConfig};
pub use error::{PipelineError, Result};
pub use isosurface::{
    IsosurfaceLayer, IsosurfaceMode, IsosurfaceSpec, Isosurface, TriangleMesh, VolumeVisibility,
};
pub use mesh::{resolve_scalar, JsonMeshLoader, MeshLoader, MeshSource, ResolvedScalar, TetMesh};
pub use pipeline::{FallbackScene, FrameOutput, FramePipeline, FrameSummary, VolumeScene};
pub use range::RangeTracker;
pub use resample::{resample, GridGeometry};
pub use session::{RangeMode, Session, SessionParams};
pub use transfer::{
    build_color, build_opacity, ColorTransferFunction, OpacityChannels, OpacityPreset,
    OpacityTransferFunction, Palette,
};

pub use resvis_common::{Bounds3, Provenance, ScalarSelection, UniformGrid, ValueRange};
