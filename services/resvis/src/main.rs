//! Resistivity volume frame driver.
//!
//! Discovers a frame sequence, runs it through the volume pipeline with one
//! persistent session and either prints per-frame summaries, renders single
//! previews or exports the whole sequence as PNGs or an MP4.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use frame_export::{
    BatchExporter, ExportConfig, FfmpegSink, FrameRenderer, FrameSink, PngSequenceSink,
    PreviewRenderer, ViewAxis,
};
use volume_pipeline::{
    Bounds3, FrameCatalog, FramePipeline, FrameSummary, IsosurfaceMode, JsonMeshLoader,
    MeshLoader, PipelineConfig, RangeMode, ScalarSelection, Session,
};

#[derive(Parser, Debug)]
#[command(name = "resvis")]
#[command(about = "Resample, inspect and export time-ordered resistivity volumes")]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, env = "RESVIS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RESVIS_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that reads frames.
#[derive(ClapArgs, Debug)]
struct FrameOptions {
    /// Directory containing the frame files
    dir: PathBuf,

    /// Frame file prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Frame file extension
    #[arg(long)]
    extension: Option<String>,

    /// Scalar to display, e.g. "Resistivity(log10)" or "Resistivity (cell)"
    #[arg(long)]
    scalar: Option<String>,

    /// Clip box as xmin,xmax,ymin,ymax,zmin,zmax
    #[arg(long)]
    clip: Option<String>,

    /// Approximate number of grid cells
    #[arg(long)]
    target_cells: Option<i64>,

    /// Manual value range as min,max
    #[arg(long)]
    range: Option<String>,

    /// Color palette name
    #[arg(long)]
    palette: Option<String>,

    /// Use one range across all frames
    #[arg(long)]
    global_range: bool,

    /// Number of isosurfaces; 1 shows a single surface at --isovalue
    #[arg(long)]
    isosurfaces: Option<u32>,

    /// Isovalue for a single isosurface
    #[arg(long)]
    isovalue: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the frames found in a directory
    Catalog {
        #[command(flatten)]
        frames: FrameOptions,
    },
    /// Print arrays, bounds and a pipeline summary per frame as JSON lines
    Info {
        #[command(flatten)]
        frames: FrameOptions,

        /// Only this frame (all frames otherwise)
        #[arg(long)]
        frame: Option<u64>,
    },
    /// Print the value range of the scalar over every frame
    Range {
        #[command(flatten)]
        frames: FrameOptions,
    },
    /// Render one frame to a PNG preview
    Render {
        #[command(flatten)]
        frames: FrameOptions,

        /// Frame index (first frame otherwise)
        #[arg(long)]
        frame: Option<u64>,

        /// Output PNG
        #[arg(short, long, visible_alias = "out", default_value = "preview.png")]
        output: PathBuf,

        #[command(flatten)]
        view: ViewOptions,
    },
    /// Render every frame into a PNG sequence or an MP4
    Export {
        #[command(flatten)]
        frames: FrameOptions,

        /// Output MP4 (requires ffmpeg on PATH)
        #[arg(short, long, visible_alias = "out", conflicts_with = "png_dir")]
        output: Option<PathBuf>,

        /// Write a PNG per frame into this directory instead
        #[arg(long)]
        png_dir: Option<PathBuf>,

        /// Frames per second
        #[arg(long, default_value_t = frame_export::DEFAULT_FPS)]
        fps: u32,

        /// Refuse to replace an existing movie
        #[arg(long)]
        no_overwrite: bool,

        #[command(flatten)]
        view: ViewOptions,
    },
}

#[derive(ClapArgs, Debug)]
struct ViewOptions {
    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Axis to look along (x, y or z)
    #[arg(long, default_value = "y")]
    axis: ViewAxis,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Catalog { frames } => {
            let catalog = prepare(&mut config, &frames)?;
            for frame in catalog.iter() {
                println!("{}\t{}", frame.index, frame.path.display());
            }
        }
        Command::Info { frames, frame } => {
            let catalog = prepare(&mut config, &frames)?;
            let pipeline = FramePipeline::new(JsonMeshLoader);
            let mut session = start_session(&pipeline, &catalog, &config);

            for f in catalog.iter() {
                let mesh = pipeline.loader().load(&f)?;
                let output = pipeline.update(&mut session, &f, mesh.as_ref())?;
                if frame.map_or(true, |only| only == f.index) {
                    let line = json!({
                        "frame": f.index,
                        "file": f.file_name(),
                        "bounds": mesh.bounds(),
                        "point_scalars": mesh.point_scalar_names(),
                        "cell_scalars": mesh.cell_scalar_names(),
                        "summary": FrameSummary::from(&output),
                    });
                    println!("{line}");
                }
            }
        }
        Command::Range { frames } => {
            let catalog = prepare(&mut config, &frames)?;
            let pipeline = FramePipeline::new(JsonMeshLoader);
            match pipeline.scan_global_range(&catalog, &config.session.scalar) {
                Some(range) => println!("{}", serde_json::to_string(&range)?),
                None => bail!("no finite values of '{}' in any frame", config.session.scalar),
            }
        }
        Command::Render {
            frames,
            frame,
            output,
            view,
        } => {
            let catalog = prepare(&mut config, &frames)?;
            let export = view.into_config(frame_export::DEFAULT_FPS, output.clone(), true);
            export.validate()?;

            let target = match frame {
                Some(index) => catalog
                    .get(index)
                    .with_context(|| format!("frame {index} not found"))?,
                None => catalog.first().context("no frames found")?,
            };

            let pipeline = FramePipeline::new(JsonMeshLoader);
            let mut session = start_session(&pipeline, &catalog, &config);
            let mut renderer = PreviewRenderer::new(&export);
            if let Some(clip) = config.session.clip_bounds {
                renderer = renderer.with_view(clip);
            }

            // Earlier frames drive the range tracker the same way playback does
            let mut last = None;
            for f in catalog.iter().take_while(|f| f.index <= target.index) {
                last = Some(pipeline.run_frame(&mut session, &f)?);
            }
            let scene = last.context("no frame rendered")?;
            renderer.render(&scene)?.save(&output)?;
            info!(frame = target.index, output = %output.display(), "Wrote preview");
            println!("{}", serde_json::to_string(&FrameSummary::from(&scene))?);
        }
        Command::Export {
            frames,
            output,
            png_dir,
            fps,
            no_overwrite,
            view,
        } => {
            let catalog = prepare(&mut config, &frames)?;
            let movie = output.unwrap_or_else(|| PathBuf::from("resistivity.mp4"));
            let export = view.into_config(fps, movie.clone(), !no_overwrite);
            export.validate()?;

            let pipeline = FramePipeline::new(JsonMeshLoader);
            let mut session = Session::new(config.session.clone());
            let mut renderer = PreviewRenderer::new(&export);
            if let Some(clip) = config.session.clip_bounds {
                renderer = renderer.with_view(clip);
            }

            let mut sink: Box<dyn FrameSink> = match png_dir {
                Some(dir) => Box::new(PngSequenceSink::new(dir, config.catalog.frame_prefix.clone())),
                None => Box::new(FfmpegSink::new(movie, export.overwrite)),
            };

            let exporter = BatchExporter::new(pipeline, renderer, export.fps);
            let report = exporter.export(
                &mut session,
                &catalog,
                sink.as_mut(),
                (export.width, export.height),
            )?;
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    Ok(())
}

impl ViewOptions {
    fn into_config(self, fps: u32, output: PathBuf, overwrite: bool) -> ExportConfig {
        ExportConfig {
            fps,
            width: self.width,
            height: self.height,
            output,
            overwrite,
            view_axis: self.axis,
            ..ExportConfig::default()
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// YAML file if given, defaults otherwise, then `RESVIS_*` overrides.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            let mut config = PipelineConfig::default();
            // The bundled loader reads JSON meshes
            config.catalog.frame_extension = "json".to_string();
            config
        }
    };
    config.apply_env();
    Ok(config)
}

/// Apply command-line overrides, validate and discover the frames.
fn prepare(config: &mut PipelineConfig, opts: &FrameOptions) -> Result<FrameCatalog> {
    if let Some(prefix) = &opts.prefix {
        config.catalog.frame_prefix = prefix.clone();
    }
    if let Some(ext) = &opts.extension {
        config.catalog.frame_extension = ext.trim_start_matches('.').to_string();
    }

    let session = &mut config.session;
    if let Some(scalar) = &opts.scalar {
        session.scalar = ScalarSelection::parse(scalar);
    }
    if let Some(clip) = &opts.clip {
        session.clip_bounds = Some(Bounds3::from_arg_string(clip)?);
    }
    if let Some(cells) = opts.target_cells {
        session.target_cells = cells;
    }
    if let Some(range) = &opts.range {
        session.manual_range = Some(parse_pair(range)?);
    }
    if let Some(palette) = &opts.palette {
        session.palette = palette.clone();
    }
    if opts.global_range {
        session.range_mode = RangeMode::Global;
    }
    if let Some(count) = opts.isosurfaces {
        session.show_isosurfaces = count > 0;
        session.isosurface.count = count.max(1);
        session.isosurface.mode = if count > 1 {
            IsosurfaceMode::Multiple
        } else {
            IsosurfaceMode::Single
        };
    }
    if let Some(value) = opts.isovalue {
        session.isosurface.value = value;
    }

    config.validate()?;

    let catalog = FrameCatalog::discover(
        &opts.dir,
        &config.catalog.frame_prefix,
        &config.catalog.frame_extension,
    )?;
    if catalog.is_empty() {
        bail!(
            "no '{}_<n>.{}' frames in {}",
            config.catalog.frame_prefix,
            config.catalog.frame_extension,
            opts.dir.display()
        );
    }
    if let Some((first, last)) = catalog.index_range() {
        info!(first, last, count = catalog.len(), "Frame sequence");
    }
    Ok(catalog)
}

fn start_session(
    pipeline: &FramePipeline<JsonMeshLoader>,
    catalog: &FrameCatalog,
    config: &PipelineConfig,
) -> Session {
    let mut session = Session::new(config.session.clone());
    if session.params.range_mode == RangeMode::Global {
        let global = pipeline.scan_global_range(catalog, &session.params.scalar);
        if global.is_none() {
            warn!("No finite values found for the global range; using per-frame ranges");
        }
        session.set_global_range(global);
    }
    session
}

fn parse_pair(s: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [min, max] = parts.as_slice() else {
        bail!("expected 'min,max', got '{s}'");
    };
    let min: f64 = min.parse().with_context(|| format!("invalid number '{min}'"))?;
    let max: f64 = max.parse().with_context(|| format!("invalid number '{max}'"))?;
    Ok((min, max))
}
