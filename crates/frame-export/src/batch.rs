//! Sequential export of a whole frame catalog.

use serde::Serialize;
use tracing::{error, info, instrument, warn};
use volume_pipeline::{FrameCatalog, FramePipeline, MeshLoader, RangeMode, Session};

use crate::error::{ExportError, Result};
use crate::preview::FrameRenderer;
use crate::sink::{FrameSink, SinkConfig};

/// A frame left out of the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFrame {
    pub index: u64,
    pub error: String,
}

/// Outcome of a batch export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportReport {
    /// Frames pushed to the sink, in order
    pub rendered: Vec<u64>,
    /// Subset of `rendered` drawn as a bounds outline
    pub fallback: Vec<u64>,
    pub skipped: Vec<SkippedFrame>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Runs every frame through the pipeline and a renderer into a sink.
///
/// Frames are processed one at a time in catalog order against a single
/// session. A frame that fails to load, update or render is logged and
/// skipped. Sink failures abort the export.
pub struct BatchExporter<L, R> {
    pipeline: FramePipeline<L>,
    renderer: R,
    fps: u32,
}

impl<L: MeshLoader, R: FrameRenderer> BatchExporter<L, R> {
    pub fn new(pipeline: FramePipeline<L>, renderer: R, fps: u32) -> Self {
        Self {
            pipeline,
            renderer,
            fps,
        }
    }

    pub fn pipeline(&self) -> &FramePipeline<L> {
        &self.pipeline
    }

    #[instrument(skip_all, fields(frames = catalog.len()))]
    pub fn export(
        &self,
        session: &mut Session,
        catalog: &FrameCatalog,
        sink: &mut dyn FrameSink,
        size: (u32, u32),
    ) -> Result<ExportReport> {
        if catalog.is_empty() {
            return Err(ExportError::validation("no frames to export"));
        }

        if session.params.range_mode == RangeMode::Global && session.global_range().is_none() {
            let global = self
                .pipeline
                .scan_global_range(catalog, &session.params.scalar);
            session.set_global_range(global);
        }

        sink.begin(SinkConfig {
            width: size.0,
            height: size.1,
            fps: self.fps,
        })?;

        let mut report = ExportReport::default();

        for frame in catalog.iter() {
            let output = match self.pipeline.run_frame(session, &frame) {
                Ok(output) => output,
                Err(err) => {
                    error!(frame = frame.index, error = %err, "Frame update failed, skipping");
                    report.skipped.push(SkippedFrame {
                        index: frame.index,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            let image = match self.renderer.render(&output) {
                Ok(image) => image,
                Err(err) => {
                    error!(frame = frame.index, error = %err, "Frame render failed, skipping");
                    report.skipped.push(SkippedFrame {
                        index: frame.index,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            sink.push_frame(frame.index, &image)?;
            if output.is_fallback() {
                report.fallback.push(frame.index);
            }
            report.rendered.push(frame.index);
        }

        sink.end()?;

        if report.rendered.is_empty() {
            warn!("Every frame was skipped");
        }
        info!(
            rendered = report.rendered.len(),
            fallback = report.fallback.len(),
            skipped = report.skipped.len(),
            "Export finished"
        );

        Ok(report)
    }
}
