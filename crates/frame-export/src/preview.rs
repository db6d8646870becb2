//! Software preview of frame outputs.
//!
//! Volume scenes are ray-marched orthographically along the configured axis
//! with front-to-back emission/absorption compositing. Isosurfaces show up as
//! shaded crossings of their isovalue along each ray. Fallback scenes render
//! as a bounding-box outline.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use volume_pipeline::{Bounds3, FallbackScene, FrameOutput, VolumeScene, VolumeVisibility};

use crate::config::{ExportConfig, ViewAxis};
use crate::error::Result;

/// Samples per ray at which an opacity of 1.0 per sample is calibrated.
const REFERENCE_SAMPLES: f64 = 64.0;

/// Accumulated alpha at which a ray stops marching.
const EARLY_EXIT_ALPHA: f64 = 0.995;

/// Outline color for fallback scenes.
const OUTLINE_COLOR: Rgba<u8> = Rgba([64, 64, 64, 255]);

/// Turns one frame output into an RGBA image.
///
/// Implementations must not carry state from one call to the next; every
/// frame is rendered from its own output alone.
pub trait FrameRenderer {
    fn render(&self, output: &FrameOutput) -> Result<RgbaImage>;
}

/// Orthographic software renderer.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    width: u32,
    height: u32,
    axis: ViewAxis,
    background: [u8; 3],
    view: Option<Bounds3>,
}

impl PreviewRenderer {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            axis: config.view_axis,
            background: config.background,
            view: None,
        }
    }

    /// Frame every image on `view` instead of the scene's own bounds.
    ///
    /// Keeps the camera fixed across a sequence.
    pub fn with_view(mut self, view: Bounds3) -> Self {
        self.view = Some(view);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blank(&self) -> RgbaImage {
        let [r, g, b] = self.background;
        RgbaImage::from_pixel(self.width, self.height, Rgba([r, g, b, 255]))
    }

    /// World `(horizontal, vertical)` extents shown in the image.
    fn framing(&self, scene_bounds: Bounds3) -> ([f64; 2], [f64; 2]) {
        let view = self.view.unwrap_or(scene_bounds);
        let (_, h, v) = self.axis.axes();
        let (lo, hi) = (view.min_corner(), view.max_corner());
        ([lo[h], hi[h]], [lo[v], hi[v]])
    }

    fn render_volume(&self, scene: &VolumeScene) -> RgbaImage {
        let mut img = self.blank();
        let grid = &scene.grid;
        let (d, h, v) = self.axis.axes();
        let (hr, vr) = self.framing(grid.bounds());

        let n = (grid.dims[d] * 2).max(2);
        let depth_lo = grid.origin[d];
        let depth = grid.spacing[d] * (grid.dims[d].saturating_sub(1)) as f64;
        let step = depth / (n - 1) as f64;
        let exponent = if depth > 0.0 {
            step * REFERENCE_SAMPLES / depth
        } else {
            1.0
        };

        let show_volume = !matches!(scene.visibility, VolumeVisibility::Hidden);
        let bg = self.background.map(|c| c as f64 / 255.0);

        for py in 0..self.height {
            let wv = vr[1] - (py as f64 + 0.5) / self.height as f64 * (vr[1] - vr[0]);
            for px in 0..self.width {
                let wh = hr[0] + (px as f64 + 0.5) / self.width as f64 * (hr[1] - hr[0]);

                let mut acc = Accumulator::default();
                let mut prev: Option<f64> = None;

                for i in 0..n {
                    let mut p = [0.0; 3];
                    p[d] = depth_lo + i as f64 * step;
                    p[h] = wh;
                    p[v] = wv;

                    let Some(value) = grid.sample(p).filter(|s| s.is_finite()) else {
                        prev = None;
                        continue;
                    };

                    if let Some(before) = prev {
                        let shade = 1.0 - 0.4 * i as f64 / (n - 1) as f64;
                        for surface in &scene.isosurfaces {
                            if crosses(before, value, surface.value) {
                                let rgb = scene.color.color_at(surface.value).map(|c| c * shade);
                                acc.add(rgb, surface.opacity);
                            }
                        }
                    }

                    if show_volume {
                        let alpha = scene.opacity.opacity_at(value).clamp(0.0, 1.0);
                        if alpha > 0.0 {
                            let corrected = 1.0 - (1.0 - alpha).powf(exponent);
                            acc.add(scene.color.color_at(value), corrected);
                        }
                    }

                    if acc.alpha >= EARLY_EXIT_ALPHA {
                        break;
                    }
                    prev = Some(value);
                }

                img.put_pixel(px, py, acc.over(bg));
            }
        }

        img
    }

    fn render_outline(&self, scene: &FallbackScene) -> RgbaImage {
        let mut img = self.blank();
        let (hr, vr) = self.framing(scene.bounds);
        let (_, h, v) = self.axis.axes();
        let (lo, hi) = (scene.bounds.min_corner(), scene.bounds.max_corner());

        let to_px = |wh: f64, wv: f64| -> (f32, f32) {
            let x = if hr[1] > hr[0] {
                (wh - hr[0]) / (hr[1] - hr[0]) * self.width.saturating_sub(1) as f64
            } else {
                self.width.saturating_sub(1) as f64 / 2.0
            };
            let y = if vr[1] > vr[0] {
                (vr[1] - wv) / (vr[1] - vr[0]) * self.height.saturating_sub(1) as f64
            } else {
                self.height.saturating_sub(1) as f64 / 2.0
            };
            (x as f32, y as f32)
        };

        let (x0, y0) = to_px(lo[h], hi[v]);
        let (x1, y1) = to_px(hi[h], lo[v]);
        let w = (x1 - x0).round() as i64;
        let hgt = (y1 - y0).round() as i64;

        if w >= 1 && hgt >= 1 {
            let rect = Rect::at(x0.round() as i32, y0.round() as i32)
                .of_size(w as u32 + 1, hgt as u32 + 1);
            draw_hollow_rect_mut(&mut img, rect, OUTLINE_COLOR);
        } else {
            // Flat box seen edge-on
            draw_line_segment_mut(&mut img, (x0, y0), (x1, y1), OUTLINE_COLOR);
        }

        img
    }
}

impl FrameRenderer for PreviewRenderer {
    fn render(&self, output: &FrameOutput) -> Result<RgbaImage> {
        Ok(match output {
            FrameOutput::Volume(scene) => self.render_volume(scene),
            FrameOutput::Fallback(scene) => self.render_outline(scene),
        })
    }
}

fn crosses(a: f64, b: f64, level: f64) -> bool {
    a != b && (a - level) * (b - level) <= 0.0
}

#[derive(Debug, Default)]
struct Accumulator {
    rgb: [f64; 3],
    alpha: f64,
}

impl Accumulator {
    fn add(&mut self, rgb: [f64; 3], alpha: f64) {
        let weight = (1.0 - self.alpha) * alpha.clamp(0.0, 1.0);
        for (acc, c) in self.rgb.iter_mut().zip(rgb) {
            *acc += weight * c;
        }
        self.alpha += weight;
    }

    fn over(&self, bg: [f64; 3]) -> Rgba<u8> {
        let mut out = [255u8; 4];
        for c in 0..3 {
            let value = self.rgb[c] + (1.0 - self.alpha) * bg[c];
            out[c] = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        Rgba(out)
    }
}
