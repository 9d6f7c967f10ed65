//! CLI tool to run a saved draft screenshot through the hero reader and dump
//! every intermediate image.
//! Usage: cargo run -p dota-vision --features cli --bin analyze_draft -- <screenshot.png> [output_dir]

use std::path::PathBuf;

use anyhow::{Context, Result};
use dota_data::HeroRegistry;
use dota_state::ColorScheme;
use dota_vision::isolate::preprocess;
use dota_vision::{
    geometry, DraftReader, EngineConfig, Isolation, MaskSelector, SaturatedMode, TesseractReader,
};

fn main() -> Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = if args.len() >= 3 {
        PathBuf::from(&args[2])
    } else {
        PathBuf::from("./debug_output")
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    println!("Loading image: {}", input_path.display());
    let img = image::open(&input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?
        .to_rgb8();
    let (w, h) = img.dimensions();
    println!("Image size: {}x{}", w, h);

    let config = EngineConfig::default();
    let estimator = SaturatedMode {
        min_saturation: config.preprocess.min_saturation,
    };
    let selector = MaskSelector::new(&config.colors, &estimator);

    println!("\n=== Slot Regions ===");
    let rects = geometry::resolve(&config.geometry, w, h)?;
    for (i, rect) in rects.iter().enumerate() {
        let view = geometry::slot_view(&img, rect);
        view.to_image()
            .save(output_dir.join(format!("slot_{}_0_raw.png", i)))?;

        let region = preprocess(&view, config.preprocess.blur_sigma);
        region.save(output_dir.join(format!("slot_{}_1_blurred.png", i)))?;

        let scheme = selector.classify(&region);
        println!(
            "  Slot {}: x={} y={} w={} h={} own scheme {:?}",
            i, rect.x, rect.y, rect.width, rect.height, scheme
        );

        // Both colour masks, since the half's carried scheme may differ from this slot's own
        let isolations = [
            Isolation::Inverse,
            Isolation::SchemeMask(ColorScheme::Green),
            Isolation::SchemeMask(ColorScheme::Red),
            Isolation::Threshold,
        ];
        for (n, isolation) in isolations.iter().enumerate() {
            isolation.apply(&region, &config).save(output_dir.join(format!(
                "slot_{}_{}_{}.png",
                i,
                n + 2,
                isolation.label()
            )))?;
        }
    }

    println!("\n=== OCR Results ===");
    let reader = TesseractReader::new();
    if !reader.is_available() {
        println!("Tesseract not available! Install it and make sure it is on PATH");
        return Ok(());
    }

    let registry = HeroRegistry::builtin();
    let result = DraftReader::new(&registry, config).identify(&img, &reader)?;
    for slot in result.slots() {
        println!(
            "  Slot {} ({:?}, {:?}, {} attempt(s)): '{}' -> {}",
            slot.index,
            slot.side,
            slot.scheme,
            slot.attempts,
            slot.raw_text,
            slot.hero
                .as_ref()
                .map(|h| format!("{} ({})", h.name, h.id))
                .unwrap_or_else(|| "unresolved".to_string())
        );
    }
    println!(
        "Unresolved: {}, aborted: {}",
        result.unresolved_count(),
        result.aborted()
    );

    println!("\nDebug images saved to: {}", output_dir.display());
    Ok(())
}
