#![forbid(unsafe_code)]
//! Headless host for the light level overlay.

mod cli;
mod commands;
mod render;
mod watch;

use std::error::Error;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use lightlvl_config::ConfigStore;
use lightlvl_runtime::{Scanner, task_queue};
use lightlvl_world::{SharedPlayer, TerrainParams, VoxelGrid};

use crate::cli::Cli;
use crate::render::LogRenderer;
use crate::watch::ConfigWatcher;

const FRAME: Duration = Duration::from_millis(50);
// Radians per frame for the demo player's walk.
const WALK_STEP: f64 = 0.01;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        log::warn!("stdin reader unavailable: {}", e);
    }
    rx
}

/// Moves the player around a circle, standing on the topmost block of each column.
fn walk(world: &VoxelGrid, player: &SharedPlayer, orbit: f64, frame: u64) {
    let angle = frame as f64 * WALK_STEP;
    let (x, z) = (orbit * angle.cos(), orbit * angle.sin());
    let y = world
        .column_top(x.floor() as i32, z.floor() as i32)
        .map_or(0, |top| top + 1);
    player.set_feet(x, f64::from(y), z);
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let params = TerrainParams {
        seed: cli.seed,
        half_extent: cli.world_radius.max(1),
        ..Default::default()
    };
    let t0 = Instant::now();
    let world = Arc::new(VoxelGrid::generate(&params));
    log::info!(
        "generated world: seed {} half extent {} ({} solid blocks) in {:?}",
        params.seed,
        params.half_extent,
        world.solid_count(),
        t0.elapsed()
    );

    let orbit = f64::from(params.half_extent) / 2.0;
    let player = Arc::new(SharedPlayer::default());
    walk(&world, &player, orbit, 0);

    let (mut store, outcome) = ConfigStore::open(&cli.config);
    log::info!("settings {} ({:?})", store.path().display(), outcome);

    let (tasks, queue) = task_queue();
    let mut scanner = Scanner::new(world.clone(), player.clone(), store.shared(), tasks)
        .with_period(Duration::from_millis(cli.period_ms.max(1)));

    let watcher = if cli.watch_config {
        match ConfigWatcher::new(store.path()) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("config watcher disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    if cli.start {
        scanner.activate()?;
    }

    let lines = spawn_stdin_reader();
    let mut renderer = LogRenderer::default();
    let mut frame: u64 = 0;
    loop {
        let mut stdin_closed = false;
        loop {
            match lines.try_recv() {
                Ok(line) => {
                    if let Some(reply) = commands::dispatch(&line, &mut store, &mut scanner) {
                        for l in reply {
                            println!("{l}");
                        }
                    } else if !line.trim().is_empty() {
                        println!("Type .lightlvl help for commands");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    stdin_closed = true;
                    break;
                }
            }
        }
        if watcher.as_ref().is_some_and(ConfigWatcher::changed) {
            store.reload_if_changed();
        }

        walk(&world, &player, orbit, frame);
        queue.drain(&mut renderer);

        frame += 1;
        if cli.frames > 0 && frame >= cli.frames {
            break;
        }
        if cli.frames == 0 && stdin_closed {
            break;
        }
        thread::sleep(FRAME);
    }

    scanner.deactivate();
    queue.drain(&mut renderer);
    let stats = scanner.stats();
    log::info!(
        "stopped after {} frames: {} passes, {} skipped, last pass {} blocks in {}us, {} overlay updates, {} still shown",
        frame,
        stats.passes,
        stats.skipped,
        stats.last_count,
        stats.last_pass_us,
        renderer.updates,
        renderer.shown().len()
    );
    Ok(())
}
