//! Knightfall headless runner
//!
//! Loads a scenario, steps the simulation at a fixed rate while replaying
//! the scenario's input script, and logs what happened.
//!
//! Usage: knightfall --scenario demos/arena.ron --frames 600

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use knightfall::assets::{AnimationLibrary, ClipLibrary};
use knightfall::config::SimConfig;
use knightfall::game::{Simulation, Tag};
use knightfall::scenario::Scenario;

/// Clip table used when no `--clips` file is given
const DEFAULT_CLIPS: &str = include_str!("../demos/clips.ron");

#[derive(Parser)]
#[command(name = "knightfall", version = knightfall::VERSION, about = "Run a scenario headless")]
struct Cli {
    /// Scenario file (RON)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Tuning overrides (RON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Animation clip table (RON)
    #[arg(long)]
    clips: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Seed for critical knockback rolls
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Keep running after a level door is touched
    #[arg(long)]
    ignore_doors: bool,
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let clips = match &cli.clips {
        Some(path) => ClipLibrary::load(path).with_context(|| format!("loading clips {}", path.display()))?,
        None => ClipLibrary::from_ron_str(DEFAULT_CLIPS).context("parsing built-in clip table")?,
    };
    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("loading scenario {}", cli.scenario.display()))?;

    let assets: Rc<dyn AnimationLibrary> = Rc::new(clips);
    let mut sim = Simulation::new(config, assets, cli.seed);
    let report = sim.load_scenario(&scenario);
    if report.spawned == 0 {
        anyhow::bail!("scenario '{}' has no usable entities", scenario.name);
    }

    let mut exit: Option<String> = None;
    while sim.frame() < cli.frames {
        let frame = sim.frame();
        sim.step(&scenario.input_at(frame), cli.dt);

        for death in sim.events.death.iter() {
            log::info!(
                "frame {}: {} {} died at ({:.0}, {:.0})",
                frame,
                death.tag,
                death.entity,
                death.position.x,
                death.position.y
            );
        }
        for item in sim.events.item_collected.iter() {
            log::debug!("frame {}: collected {:?}", frame, item.kind);
        }
        if let Some(transition) = sim.events.level_transition.iter().next() {
            if !cli.ignore_doors {
                exit = Some(transition.target.clone());
                break;
            }
        }
        if sim.player().is_none() {
            log::info!("frame {}: no player left", frame);
            break;
        }
    }

    summarize(&sim, exit.as_deref());
    Ok(())
}

fn summarize(sim: &Simulation, exit: Option<&str>) {
    println!("frames run: {}", sim.frame());
    for tag in Tag::ALL {
        let count = sim.world.count(tag);
        if count > 0 {
            println!("  {:<12} {}", tag.name(), count);
        }
    }
    println!("score: {}", sim.score.value);
    match sim.player().and_then(|p| sim.world.health.get(p)) {
        Some(health) => println!("player health: {}/{}", health.current, health.max),
        None => println!("player health: -"),
    }
    if let Some(target) = exit {
        println!("exited to: {}", target);
    }
}
