//! Rendering and export of resistivity frame sequences.
//!
//! A [`BatchExporter`] walks a [`volume_pipeline::FrameCatalog`] in order,
//! updates each frame through a [`volume_pipeline::FramePipeline`], renders
//! the result with a [`FrameRenderer`] and hands the image to a
//! [`FrameSink`]: a PNG sequence, an ffmpeg-encoded MP4, or memory.

pub mod batch;
pub mod config;
pub mod error;
pub mod preview;
pub mod sink;

pub use batch::{BatchExporter, ExportReport, SkippedFrame};
pub use config::{ExportConfig, ViewAxis, DEFAULT_FPS};
pub use error::{ExportError, Result};
pub use preview::{FrameRenderer, PreviewRenderer};
pub use sink::{is_ffmpeg_on_path, FfmpegSink, FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
