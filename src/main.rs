//! Page Curl Engine - Entry point
//!
//! Headless driver for the page-turn core.
//!
//! CLI Usage:
//!   cargo run                              # Read through a generated book
//!   cargo run -- --diagnose                # Run physics diagnostics
//!   cargo run -- --diagnose -n 600 -v 2.5  # Custom frames and release velocity

use std::time::Instant;

use anyhow::Result;
use page_curl_engine::{
    cache::InMemoryProvider,
    config::TurnConfiguration,
    coordinator::TurnEvent,
    lighting::LightingModel,
    physics::{PhysicsSimulator, TickOutcome},
    session::ReaderSession,
    state::TurnDirection,
};

/// Frame duration at 60 Hz
const FRAME_DT: f32 = 1.0 / 60.0;
/// Default configuration file
const CONFIG_PATH: &str = "turn_config.json";

struct Args {
    diagnose: bool,
    frames: usize,
    release_velocity: f32,
    release_progress: f32,
    chapters: usize,
    config_path: String,
    save_config: bool,
}

/// Release a dragged page and trace the physics until it settles
fn run_diagnostics(config: &TurnConfiguration, args: &Args) -> Result<()> {
    println!("=== Page Curl Engine - Physics Diagnostics ===\n");
    println!(
        "Paper: stiffness {:.2}, weight {:.2}, elasticity {:.2}, air {:.2}, gravity {:.2}",
        config.paper_stiffness,
        config.page_weight,
        config.elasticity,
        config.air_resistance,
        config.gravity
    );

    let mut simulator = PhysicsSimulator::new(config);
    let lighting = LightingModel::new(config.shadows_enabled);
    println!(
        "Mesh: {}x{} points, {} triangles",
        simulator.mesh().resolution(),
        simulator.mesh().resolution(),
        simulator.mesh().triangle_count()
    );

    simulator.begin_drag(TurnDirection::Forward, 0.0);
    simulator.update_drag(args.release_progress);
    let Some(decision) = simulator.end_drag(args.release_velocity) else {
        anyhow::bail!("Simulator refused the drag release");
    };
    println!(
        "Released at progress {:.2} with velocity {:.2}/s -> target {:.0} ({})",
        args.release_progress,
        args.release_velocity,
        decision.target,
        if decision.commits { "commit" } else { "cancel" }
    );
    println!("\n--- Running up to {} frames ---\n", args.frames);

    let start_time = Instant::now();
    let mut min_progress = simulator.progress();
    let mut max_progress = simulator.progress();
    let mut settled_at = None;

    for frame in 0..args.frames {
        let outcome = simulator.tick(FRAME_DT);
        min_progress = min_progress.min(simulator.progress());
        max_progress = max_progress.max(simulator.progress());

        if args.frames >= 10 && frame % (args.frames / 10) == 0 {
            let shadow = lighting.shadow(simulator.progress(), simulator.progress() > 0.5);
            println!(
                "  frame {:4}: progress={:.4}, velocity={:+.4}, shadow={:.3}, curl={:.4}",
                frame,
                simulator.progress(),
                simulator.velocity(),
                shadow.opacity,
                simulator.mesh().curl_amount()
            );
        }

        if let TickOutcome::Settled { committed, .. } = outcome {
            settled_at = Some((frame + 1, committed));
            break;
        }
    }
    let elapsed = start_time.elapsed();

    println!("\n=== Results ===");
    println!("Elapsed time: {:.2?}", elapsed);
    simulator.diagnostics().print_summary();

    println!("\n=== Diagnostic Checks ===");
    match settled_at {
        Some((frames, committed)) => println!(
            "✓ Settled after {} frames ({:.2} s), {}",
            frames,
            frames as f32 * FRAME_DT,
            if committed { "committed" } else { "cancelled" }
        ),
        None => {
            println!("⚠️  WARNING: Page did not settle within {} frames", args.frames);
            println!("   Try more frames (-n 2000) or higher elasticity");
        }
    }
    if (0.0..=1.0).contains(&min_progress) && (0.0..=1.0).contains(&max_progress) {
        println!("✓ Progress stayed within [0, 1]");
    } else {
        println!(
            "⚠️  WARNING: Progress escaped range: [{:.4}, {:.4}]",
            min_progress, max_progress
        );
    }

    Ok(())
}

/// Turn through a generated book, printing events and the chapter window
fn run_reading(config: TurnConfiguration, chapters: usize) -> Result<()> {
    println!("=== Page Curl Engine - Reading {} chapters ===\n", chapters);

    let provider = InMemoryProvider::numbered(chapters);
    let mut session = ReaderSession::open_detected(config, provider, chapters, 0);
    session.subscribe(|event: &TurnEvent| match event {
        TurnEvent::PageChanged(page) => println!("  page changed -> {}", page),
        TurnEvent::Progress(fraction) => println!("  reading position {:.0}%", fraction * 100.0),
        TurnEvent::ReachedEnd => println!("  reached the end"),
        TurnEvent::ReachedStart => println!("  reached the start"),
        _ => {}
    });

    loop {
        session.tick(FRAME_DT);
        if !session.go_to_next_page(true) {
            break;
        }
        let mut frames = 0;
        while session.coordinator().is_ticking() && frames < 2000 {
            session.tick(FRAME_DT);
            frames += 1;
        }

        let window: Vec<String> = session
            .cache()
            .views()
            .iter()
            .map(|view| {
                format!(
                    "{}{}{}",
                    view.index,
                    if view.is_current { "*" } else { "" },
                    if view.is_loading { "…" } else { "" }
                )
            })
            .collect();
        println!(
            "chapter {} after {} frames, window [{}]",
            session.current_chapter(),
            frames,
            window.join(", ")
        );
    }

    let stats = session.cache().stats();
    println!(
        "\nLoads: {} requested, {} completed, {} failed, {} stale; {} evictions",
        stats.loads_requested,
        stats.loads_completed,
        stats.loads_failed,
        stats.stale_discarded,
        stats.evictions
    );
    Ok(())
}

/// Parse CLI arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        diagnose: false,
        frames: 600,
        release_velocity: 0.0,
        release_progress: 0.6,
        chapters: 5,
        config_path: CONFIG_PATH.to_string(),
        save_config: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--diagnose" | "-d" => parsed.diagnose = true,
            "-n" | "--frames" => {
                i += 1;
                if i < args.len() {
                    parsed.frames = args[i].parse().unwrap_or(600);
                }
            }
            "-v" | "--velocity" => {
                i += 1;
                if i < args.len() {
                    parsed.release_velocity = args[i].parse().unwrap_or(0.0);
                }
            }
            "-p" | "--progress" => {
                i += 1;
                if i < args.len() {
                    parsed.release_progress = args[i].parse().unwrap_or(0.6);
                }
            }
            "--chapters" => {
                i += 1;
                if i < args.len() {
                    parsed.chapters = args[i].parse().unwrap_or(5);
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    parsed.config_path = args[i].clone();
                }
            }
            "--save-config" => parsed.save_config = true,
            "--help" | "-h" => {
                println!("Page Curl Engine");
                println!();
                println!("Usage: page-curl-engine [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --diagnose, -d       Run physics diagnostics");
                println!("  -n, --frames N       Frames to simulate (default: 600)");
                println!("  -v, --velocity V     Release velocity in progress/s (default: 0.0)");
                println!("  -p, --progress P     Release progress (default: 0.6)");
                println!("  --chapters N         Chapters in the generated book (default: 5)");
                println!("  -c, --config PATH    Configuration file (default: {})", CONFIG_PATH);
                println!("  --save-config        Write the effective configuration and exit");
                println!("  --help, -h           Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args();
    let config = TurnConfiguration::load_or_default(&args.config_path);

    if args.save_config {
        config.save(&args.config_path)?;
        println!("Configuration written to {}", args.config_path);
        return Ok(());
    }

    if args.diagnose {
        return run_diagnostics(&config, &args);
    }

    log::info!("Page Curl Engine starting...");
    run_reading(config, args.chapters.max(1))
}
