//! Commentary engine demo
//!
//! Replays a short scripted match through the engine and prints (or speaks)
//! the resulting commentary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use commentary_engine::{
    CommentaryEngine, ConsoleNarrator, EngineConfig, Narrator, SayNarrator, TemplateBank,
};

/// Command line arguments for the demo
#[derive(Parser, Debug)]
#[command(name = "commentary_demo")]
#[command(about = "Replays a scripted football match through the commentary engine")]
struct Args {
    /// Random seed for reproducible variant selection
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a TOML template file (overrides the built-in templates)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Speak through the system TTS voice instead of printing
    #[arg(long)]
    speak: bool,

    /// Gap between utterances in milliseconds
    #[arg(long)]
    gap_ms: Option<u64>,
}

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Could not load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    config.seed = Some(args.seed);
    if let Some(gap) = args.gap_ms {
        config.delivery.utterance_gap_ms = gap;
    }

    let templates = match &args.templates {
        Some(path) => match TemplateBank::from_file(path) {
            Ok(bank) => bank,
            Err(e) => {
                eprintln!("Could not load templates {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => commentary_engine::default_templates(),
    };

    let narrator: Arc<dyn Narrator> = if args.speak {
        Arc::new(SayNarrator::new(config.speech_rate))
    } else {
        Arc::new(ConsoleNarrator)
    };

    println!("Commentary Engine Demo");
    println!("======================");
    println!("Seed: {}", args.seed);
    println!("Queue capacity: {}", config.delivery.queue_capacity);
    println!("Utterance gap: {} ms", config.delivery.utterance_gap_ms);
    println!();

    let engine = CommentaryEngine::with_parts(
        config,
        templates,
        narrator,
        Arc::new(commentary_engine::SystemClock),
    );

    run_scripted_match(&engine);

    engine.shutdown();

    println!();
    println!(
        "Match complete. {} line(s) dropped under pressure.",
        engine.dropped_items()
    );
}

/// A compressed half of football, paced so cooldowns visibly thin out the
/// routine play while the big moments always land.
fn run_scripted_match(engine: &CommentaryEngine) {
    let beat = Duration::from_millis(400);

    engine.on_match_start("Redwood FC", "Harbor Town");
    std::thread::sleep(beat);

    // Early possession play.
    engine.on_pass("Alvarez", "Okafor", false);
    std::thread::sleep(beat);
    engine.on_pass("Okafor", "Lindqvist", false);
    std::thread::sleep(beat);
    engine.on_pass("Lindqvist", "Moreau", false);
    std::thread::sleep(beat);
    engine.on_pass("Moreau", "Silva", false);
    std::thread::sleep(beat);
    engine.on_pass("Silva", "Alvarez", false);
    std::thread::sleep(beat);

    // Harbor Town break it up.
    engine.on_interception("Kovac", "Harbor Town");
    std::thread::sleep(beat);
    engine.on_pass("Kovac", "Demir", true);
    std::thread::sleep(beat);

    // A chance at each end.
    engine.on_shot("Demir", "Harbor Town", true);
    std::thread::sleep(beat);
    engine.on_save("Fontaine", "Demir");
    std::thread::sleep(beat);
    engine.on_possession_change("Redwood FC");
    std::thread::sleep(beat);
    engine.on_dribble("Silva", true);
    std::thread::sleep(beat);
    engine.on_shot("Silva", "Redwood FC", false);
    std::thread::sleep(beat);

    // It gets physical.
    engine.on_tackle("Kovac", "Silva", false, true);
    std::thread::sleep(beat);
    engine.on_free_kick("Redwood FC");
    std::thread::sleep(beat);
    engine.on_yellow_card("Kovac");
    std::thread::sleep(beat);

    // The breakthrough.
    engine.on_corner_kick("Redwood FC");
    std::thread::sleep(beat);
    engine.on_goal("Moreau", "Redwood FC", 1, 0);
    std::thread::sleep(beat);

    // Late drama.
    engine.on_substitution("Ito", "Lindqvist");
    std::thread::sleep(beat);
    engine.on_tackle("Demir", "Ito", true, false);
    std::thread::sleep(beat);
    engine.on_red_card("Demir");
    std::thread::sleep(beat);

    engine.on_half_time(1, 0);
    std::thread::sleep(beat);
    engine.on_full_time(1, 0);
}
