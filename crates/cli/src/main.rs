use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use ab_glyph::FontArc;
use clap::{Args, Parser, Subcommand};
use image::RgbImage;

use facemarks_core::detection::infrastructure::rustface_ert_loader;
use facemarks_core::overlay::canvas::RenderStyle;
use facemarks_core::overlay::image_canvas::{load_font, ImageCanvas};
use facemarks_core::overlay::renderer::render_frame;
use facemarks_core::persistence;
use facemarks_core::persistence::sequence_file::load_sequence;
use facemarks_core::pipeline::extract_sequence_use_case::ExtractSequenceUseCase;
use facemarks_core::pipeline::pipeline_logger::SummaryLogger;
use facemarks_core::pipeline::sequence_landmarks::SequenceLandmarks;
use facemarks_core::sequence::frame::Frame;
use facemarks_core::shared::config::LandmarkConfig;
use facemarks_core::shared::error::BoxError;
use facemarks_core::shared::image::Image;
use facemarks_core::video::infrastructure::image_file_source::{
    collect_image_paths, read_image, ImageFileSource,
};

const LABEL_FONT_SIZE: f32 = 12.0;

/// Facial landmark extraction for image sequences.
#[derive(Parser)]
#[command(name = "facemarks", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect faces and landmarks in every input frame.
    Extract(ExtractArgs),
    /// Print a summary of a stored sequence.
    Inspect {
        /// Sequence file.
        sequence: PathBuf,
    },
    /// Draw a stored sequence over its source images.
    Render(RenderArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Image files or directories of images, in capture order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Sequence file to write.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON settings file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark (shape predictor) model.
    #[arg(long)]
    model: Option<PathBuf>,

    /// SeetaFace detector model.
    #[arg(long)]
    detector_model: Option<PathBuf>,

    /// Downscale factor applied before detection (> 0).
    #[arg(long)]
    scale: Option<f32>,

    /// Also write annotated copies of each frame here.
    #[arg(long)]
    render_dir: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args)]
struct RenderArgs {
    /// Sequence file.
    sequence: PathBuf,

    /// Source images matching the sequence frames, in order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory for the annotated images.
    #[arg(long)]
    output_dir: PathBuf,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args, Clone)]
struct StyleArgs {
    /// Draw landmark indices.
    #[arg(long)]
    labels: bool,

    /// TrueType font for labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Line thickness in pixels.
    #[arg(long, default_value = "1")]
    thickness: u32,
}

impl StyleArgs {
    fn render_style(&self) -> RenderStyle {
        RenderStyle {
            thickness: self.thickness,
            draw_labels: self.labels,
            ..RenderStyle::default()
        }
    }

    fn load_font(&self) -> Result<Option<FontArc>, BoxError> {
        match (&self.font, self.labels) {
            (Some(path), true) => Ok(Some(load_font(path)?)),
            (None, true) => {
                log::warn!("--labels without --font: landmark indices will not be drawn");
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxError> {
    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Inspect { sequence } => run_inspect(&sequence),
        Command::Render(args) => run_render(args),
    }
}

fn run_extract(args: ExtractArgs) -> Result<(), BoxError> {
    let config = build_config(&args)?;
    if args.output.is_none() && args.render_dir.is_none() {
        return Err("nothing to do: pass --output and/or --render-dir".into());
    }
    if args.output.is_some() && !persistence::is_supported() {
        return Err("--output needs a build with the `persistence` feature".into());
    }
    let model_path = config
        .model_path
        .clone()
        .ok_or("a landmark model is required (--model or `model_path` in --config)")?;

    let loader = rustface_ert_loader(config.detector.clone());
    let landmarks = SequenceLandmarks::with_model(loader, &model_path, config.frame_scale)?;
    let source = ImageFileSource::new(args.inputs);

    let mut use_case = ExtractSequenceUseCase::new(
        Box::new(source),
        landmarks,
        Box::new(SummaryLogger::default()),
    );

    if let Some(dir) = args.render_dir {
        fs::create_dir_all(&dir)?;
        let style = args.style.render_style();
        let font = args.style.load_font()?;
        use_case = use_case.with_observer(move |source, frame| {
            let annotated = annotate(&source.image, frame, &style, font.as_ref());
            annotated.save(dir.join(format!("{}.png", source.label)))?;
            Ok(())
        });
    }

    let sequence = use_case.execute(args.output.as_deref())?;
    let faces: usize = sequence.iter().map(Frame::face_count).sum();
    log::info!("Done: {} frames, {faces} faces", sequence.len());
    Ok(())
}

fn build_config(args: &ExtractArgs) -> Result<LandmarkConfig, BoxError> {
    let mut config = match &args.config {
        Some(path) => LandmarkConfig::load(path)?,
        None => LandmarkConfig::default(),
    };
    if let Some(scale) = args.scale {
        config.frame_scale = scale;
    }
    if let Some(model) = &args.model {
        config.model_path = Some(model.clone());
    }
    if let Some(detector_model) = &args.detector_model {
        config.detector.model_path = Some(detector_model.clone());
    }
    config.validate()?;
    Ok(config)
}

fn run_inspect(path: &Path) -> Result<(), BoxError> {
    let sequence = load_sequence(path)?;

    println!("{}: {} frames", path.display(), sequence.len());
    for (i, frame) in sequence.iter().enumerate() {
        println!(
            "  frame {i:5}: {}x{}, {} faces, {} landmarks",
            frame.width,
            frame.height,
            frame.face_count(),
            frame.landmark_count()
        );
    }
    let faces: usize = sequence.iter().map(Frame::face_count).sum();
    let points: usize = sequence.iter().map(Frame::landmark_count).sum();
    println!("total: {faces} faces, {points} landmarks");
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<(), BoxError> {
    let sequence = load_sequence(&args.sequence)?;
    let images = collect_image_paths(&args.images)?;
    if images.len() != sequence.len() {
        log::warn!(
            "{} images for {} frames; rendering the first {}",
            images.len(),
            sequence.len(),
            images.len().min(sequence.len())
        );
    }

    fs::create_dir_all(&args.output_dir)?;
    let style = args.style.render_style();
    let font = args.style.load_font()?;

    for (path, frame) in images.iter().zip(sequence.iter()) {
        let image = read_image(path)?;
        if (image.width(), image.height()) != (frame.width, frame.height) {
            log::warn!(
                "{} is {}x{} but its frame was recorded at {}x{}",
                path.display(),
                image.width(),
                image.height(),
                frame.width,
                frame.height
            );
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame");
        let out = args.output_dir.join(format!("{stem}.png"));
        annotate(&image, frame, &style, font.as_ref()).save(&out)?;
        log::debug!("Wrote {}", out.display());
    }
    Ok(())
}

fn annotate(image: &Image, frame: &Frame, style: &RenderStyle, font: Option<&FontArc>) -> RgbImage {
    let mut rgb = image.to_rgb();
    let mut canvas = ImageCanvas::new(&mut rgb);
    if let Some(font) = font {
        canvas = canvas.with_font(font, LABEL_FONT_SIZE);
    }
    render_frame(&mut canvas, frame, style);
    rgb
}
