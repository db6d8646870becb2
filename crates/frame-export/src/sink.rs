//! Frame sinks: where rendered frames go.

use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use image::RgbaImage;
use tracing::{debug, info};

use crate::error::{ExportError, Result};

/// Configuration handed to a sink before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl SinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::validation("frame width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(ExportError::validation("fps must be non-zero"));
        }
        Ok(())
    }
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in increasing frame-index order between one
/// `begin` and one `end`.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> Result<()>;
    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}

fn check_size(cfg: Option<SinkConfig>, frame: &RgbaImage) -> Result<()> {
    let Some(cfg) = cfg else {
        return Err(ExportError::validation("push_frame called before begin"));
    };
    if frame.dimensions() != (cfg.width, cfg.height) {
        return Err(ExportError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            cfg.width,
            cfg.height
        )));
    }
    Ok(())
}

/// Keeps frames in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, RgbaImage)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(u64, RgbaImage)] {
        &self.frames
    }

    pub fn indices(&self) -> Vec<u64> {
        self.frames.iter().map(|(i, _)| *i).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> Result<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        check_size(self.cfg, frame)?;
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes one PNG per frame: `<dir>/<prefix>_<index:05>.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            cfg: None,
            written: Vec::new(),
        }
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}_{:05}.png", self.prefix, index))
    }

    /// Files written so far, in push order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> Result<()> {
        cfg.validate()?;
        std::fs::create_dir_all(&self.dir)?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        check_size(self.cfg, frame)?;
        let path = self.frame_path(index);
        frame.save(&path)?;
        debug!(path = %path.display(), "Wrote frame");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        info!(
            frames = self.written.len(),
            dir = %self.dir.display(),
            "PNG sequence complete"
        );
        Ok(())
    }
}

/// Check whether an `ffmpeg` binary can be launched.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Read `reader` to the end on a background thread.
fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| ExportError::encoder("ffmpeg stderr drain thread panicked"))?
        .map_err(|e| ExportError::encoder(format!("ffmpeg stderr read failed: {e}")))
}

/// Pipes raw RGBA frames into a system `ffmpeg` producing H.264 MP4.
pub struct FfmpegSink {
    out_path: PathBuf,
    overwrite: bool,
    cfg: Option<SinkConfig>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frames: usize,
}

impl FfmpegSink {
    pub fn new(out_path: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite,
            cfg: None,
            child: None,
            stdin: None,
            stderr_drain: None,
            frames: 0,
        }
    }

    fn spawn(&self, cfg: SinkConfig) -> Result<Child> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&self.out_path);

        cmd.spawn().map_err(|e| {
            ExportError::encoder(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> Result<()> {
        cfg.validate()?;
        if cfg.width % 2 != 0 || cfg.height % 2 != 0 {
            return Err(ExportError::validation(
                "width/height must be even (required for yuv420p output)",
            ));
        }
        if !self.overwrite && self.out_path.exists() {
            return Err(ExportError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        ensure_parent_dir(&self.out_path)?;

        if !is_ffmpeg_on_path() {
            return Err(ExportError::encoder(
                "ffmpeg is required for movie export, but was not found on PATH",
            ));
        }

        let mut child = self.spawn(cfg)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExportError::encoder("failed to open ffmpeg stdin"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExportError::encoder("failed to open ffmpeg stderr"))?;

        info!(
            output = %self.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            "Started ffmpeg"
        );

        self.cfg = Some(cfg);
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(drain(stderr));
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        check_size(self.cfg, frame)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ExportError::encoder("ffmpeg encoder is not running"));
        };
        stdin.write_all(frame.as_raw()).map_err(|e| {
            ExportError::encoder(format!("failed to write frame {index} to ffmpeg: {e}"))
        })?;
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Err(ExportError::encoder("ffmpeg encoder is not running"));
        };

        let status = child
            .wait()
            .map_err(|e| ExportError::encoder(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => join_drain(handle)?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(ExportError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        info!(
            output = %self.out_path.display(),
            frames = self.frames,
            "Movie written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn cfg(width: u32, height: u32) -> SinkConfig {
        SinkConfig {
            width,
            height,
            fps: 10,
        }
    }

    #[test]
    fn test_in_memory_sink_rejects_size_mismatch() {
        let mut sink = InMemorySink::new();
        sink.begin(cfg(4, 4)).unwrap();

        let wrong = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        assert!(matches!(
            sink.push_frame(1, &wrong),
            Err(ExportError::Validation(_))
        ));
    }

    #[test]
    fn test_push_before_begin_fails() {
        let mut sink = InMemorySink::new();
        let frame = RgbaImage::new(2, 2);
        assert!(sink.push_frame(1, &frame).is_err());
    }

    #[test]
    fn test_ffmpeg_sink_rejects_odd_size_before_spawning() {
        let mut sink = FfmpegSink::new("unused.mp4", true);
        assert!(matches!(
            sink.begin(cfg(5, 4)),
            Err(ExportError::Validation(_))
        ));
        assert!(matches!(sink.end(), Err(ExportError::Encoder(_))));
    }

    #[test]
    fn test_stderr_drain_reads_past_pipe_capacity() {
        // Larger than a typical 64 KiB pipe buffer
        let chatter = vec![b'x'; 256 * 1024];
        let handle = drain(std::io::Cursor::new(chatter.clone()));
        assert_eq!(join_drain(handle).unwrap(), chatter);
    }

    #[test]
    fn test_ffmpeg_sink_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("movie.mp4");
        std::fs::write(&out, b"taken").unwrap();

        let mut sink = FfmpegSink::new(&out, false);
        assert!(matches!(
            sink.begin(cfg(4, 4)),
            Err(ExportError::Validation(_))
        ));
    }
}
