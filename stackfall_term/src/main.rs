mod frequency_regulator;
mod keyboard;
mod term_render;

use anyhow::Context;
use clap::Parser;
use console::Term;
use stackfall::{Engine, EngineConfig, Flow, InputIntents, KindSource, RenderState};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::frequency_regulator::FrequencyRegulator;
use crate::term_render::{AnsiTermStyle, PlainTermStyle, Playfield, TermRender, TermStyle};

const TITLE: &str = "Tetris";

/// stackfall - falling-block puzzle in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the piece sequence
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulation ticks per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    tick_rate: u32,

    /// Screen refreshes per second (capped at the tick rate)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    render_rate: u32,

    /// Run this many ticks without input and print the final state as JSON
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,

    /// Render without colors
    #[arg(long)]
    plain: bool,

    /// Raise log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Logs go to stderr so they never mix with the playfield
    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let mut engine = match args.seed {
        Some(seed) => Engine::seeded(config, seed)?,
        None => Engine::random(config)?,
    };

    match args.headless {
        Some(ticks) => run_headless(&mut engine, ticks),
        None => run_interactive(&mut engine, &args).await,
    }
}

fn run_headless<K: KindSource>(engine: &mut Engine<K>, ticks: u64) -> anyhow::Result<()> {
    let mut locked = 0usize;
    let mut cleared = 0usize;
    for _ in 0..ticks {
        let outcome = engine.tick(InputIntents::none());
        locked += usize::from(outcome.events.locked.is_some());
        cleared += outcome.events.cleared_rows.len();
    }
    tracing::info!("Headless run: {} ticks, {} pieces locked, {} rows cleared", ticks, locked, cleared);
    println!("{}", serde_json::to_string_pretty(&engine.state())?);
    Ok(())
}

async fn run_interactive<K: KindSource>(engine: &mut Engine<K>, args: &Args) -> anyhow::Result<()> {
    let render_term = Term::stdout();
    render_term.hide_cursor()?;
    render_term.clear_screen()?;

    let (key_sender, key_receiver) = flume::unbounded();
    let keyboard_task = keyboard::spawn_key_reader(key_sender);

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(args.tick_rate)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = FrequencyRegulator::new(
        args.render_rate.min(args.tick_rate) as usize,
        args.tick_rate as usize,
    );

    // Main tick loop - one engine step per interval tick
    let result = loop {
        ticker.tick().await;

        let input = key_receiver
            .try_iter()
            .fold(InputIntents::none(), InputIntents::merge);
        let outcome = engine.tick(input);
        if !outcome.events.cleared_rows.is_empty() {
            tracing::info!("Cleared rows {:?}", outcome.events.cleared_rows);
        }

        if frames.step() > 0 {
            let drawn = if args.plain {
                draw(&render_term, &outcome.state, &PlainTermStyle)
            } else {
                draw(&render_term, &outcome.state, &AnsiTermStyle)
            };
            if let Err(e) = drawn {
                break Err(e);
            }
        }

        if outcome.flow == Flow::Quit {
            break Ok(());
        }
    };

    // Wait for keyboard task to finish
    keyboard_task.abort();
    let _ = keyboard_task.await;
    render_term.show_cursor()?;
    result
}

fn draw(term: &Term, state: &RenderState, style: &impl TermStyle) -> anyhow::Result<()> {
    let field = Playfield::new(state, TITLE).with_footer(vec![
        String::new(),
        "← → move   ↑ rotate".to_string(),
        "↓ drop     q quit".to_string(),
    ]);
    term.move_cursor_to(0, 0)?;
    for line in field.render(style) {
        term.write_line(&line)?;
    }
    term.flush()?;
    Ok(())
}
