use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use image::{Rgb, RgbImage};

use brodmann_core::runtime::create_detector_with;
use brodmann_core::shared::constants::IMAGE_EXTENSIONS;
use brodmann_core::{
    Detection, DetectionBuffer, DetectionRecord, DetectorConfig, EngineKind, ImageDescriptor,
    Rotation, PARAMS_PER_DETECTION,
};

const DEFAULT_IMAGE: &str = "./example.jpg";
const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Run the TinyBrodmann detector on a single image.
#[derive(Parser)]
#[command(name = "bd17-detect")]
struct Cli {
    /// Input image file (defaults to ./example.jpg).
    image: Option<PathBuf>,

    /// Write a copy of the image with detections outlined.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Detector orientation in degrees: 0, 90, 180 or 270.
    #[arg(long, default_value = "0")]
    rotation: u32,

    /// Maximum number of detections to report.
    #[arg(long, default_value = "20")]
    max_detections: usize,

    /// Inference engine: contrast or blazeface (defaults to BD17_ENGINE, then contrast).
    #[arg(long)]
    engine: Option<EngineKind>,

    /// BlazeFace model file (defaults to the model cache directory).
    #[arg(long)]
    model: Option<PathBuf>,

    /// BlazeFace confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f32>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let input = match &cli.image {
        Some(path) => path.clone(),
        None => {
            log::warn!("No image given, using {DEFAULT_IMAGE}");
            PathBuf::from(DEFAULT_IMAGE)
        }
    };
    let rotation = validate(&cli, &input)?;

    let config = build_config(&cli, |key| std::env::var(key).ok())?;
    if cli.model.is_some() && config.engine != EngineKind::Blazeface {
        log::warn!("--model is ignored by the {} engine", config.engine);
    }
    let mut detector = create_detector_with(&config)?;
    detector.rotate(rotation);

    let rgb = image::open(&input)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let bgr = to_bgr(&rgb);

    let mut records = vec![0.0f32; cli.max_detections * PARAMS_PER_DETECTION];
    let mut class_ids = vec![0u32; cli.max_detections];
    let mut buffer =
        DetectionBuffer::new(&mut records, cli.max_detections).with_class_ids(&mut class_ids);
    let outcome = detector.detect(&ImageDescriptor::bgr(width, height, &bgr), &mut buffer)?;

    log::info!(
        "{}: {} of {} candidates reported ({} engine, rotation {rotation})",
        input.display(),
        outcome.written,
        outcome.candidates,
        detector.engine_name()
    );
    let written: Vec<DetectionRecord> = buffer.iter().collect();
    let detections: Vec<Detection> = written
        .iter()
        .zip(class_ids.iter())
        .map(|(record, &class_id)| Detection::from_record(record, class_id))
        .collect();
    for (i, d) in detections.iter().enumerate() {
        println!(
            "{i}: x={} y={} w={} h={} confidence={:.3} class={}",
            d.x, d.y, d.width, d.height, d.confidence, d.class_id
        );
    }

    if let Some(output) = &cli.output {
        let mut annotated = rgb;
        for d in &detections {
            draw_box(&mut annotated, d);
        }
        annotated.save(output)?;
        log::info!("Output written to {}", output.display());
    }

    Ok(())
}

fn validate(cli: &Cli, input: &Path) -> Result<Rotation, Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !is_image(input) {
        log::warn!(
            "{} has an unrecognized extension, decoding anyway",
            input.display()
        );
    }
    let rotation = Rotation::from_degrees(cli.rotation).ok_or_else(|| {
        format!(
            "Rotation must be 0, 90, 180 or 270 degrees, got {}",
            cli.rotation
        )
    })?;
    Ok(rotation)
}

/// Environment settings first, then any flags given on the command line.
fn build_config<F>(cli: &Cli, lookup: F) -> Result<DetectorConfig, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = DetectorConfig::from_lookup(lookup)?;
    if let Some(engine) = cli.engine {
        config.engine = engine;
    }
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }
    if let Some(confidence) = cli.confidence {
        config.confidence = confidence;
    }
    config.validate()?;
    Ok(config)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn to_bgr(rgb: &RgbImage) -> Vec<u8> {
    rgb.pixels()
        .flat_map(|Rgb([r, g, b])| [*b, *g, *r])
        .collect()
}

/// Outlines `d` with corners `(x, y)` and `(x + w - 1, y + h - 1)`.
fn draw_box(img: &mut RgbImage, d: &Detection) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || d.width < 1.0 || d.height < 1.0 {
        return;
    }
    let (right, bottom) = d.bottom_right();
    let x0 = (d.x.max(0.0) as u32).min(w - 1);
    let y0 = (d.y.max(0.0) as u32).min(h - 1);
    let x1 = (right.max(0.0) as u32).min(w - 1);
    let y1 = (bottom.max(0.0) as u32).min(h - 1);

    for x in x0..=x1 {
        img.put_pixel(x, y0, BOX_COLOR);
        img.put_pixel(x, y1, BOX_COLOR);
    }
    for y in y0..=y1 {
        img.put_pixel(x0, y, BOX_COLOR);
        img.put_pixel(x1, y, BOX_COLOR);
    }
}
