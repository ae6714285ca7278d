//! Headless Orrery driver.
//!
//! Generates a seeded planetary system, steps it on a worker pool through the
//! fixed-timestep clock, despawns comets when their pass ends, and logs the
//! final state of every body.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-demo -- --duration 60 --seed 7`.

mod generator;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use clap::Parser;
use glam::DVec3;
use orrery_config::{CliArgs, Config};
use orrery_sim::{EndReason, KeplerSolver, OrbitEvent, SimClock, Simulation, StepPool};
use tracing::{debug, error, info, warn};

use crate::generator::{Kind, System, generate_system};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config
        .debug
        .log_dir
        .clone()
        .unwrap_or_else(|| config_dir.join("logs"));
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let solver = KeplerSolver::new(config.solver.tolerance, config.solver.max_iterations);
    let mut system =
        match generate_system(&config.generator, solver, config.simulation.time_scale) {
            Ok(system) => system,
            Err(err) => {
                error!(%err, "failed to generate system");
                std::process::exit(1);
            }
        };
    info!(
        bodies = system.bodies.len(),
        seed = config.generator.seed,
        "system generated"
    );

    let ticks = run(&mut system, &config);
    info!(
        ticks,
        remaining = system.bodies.len(),
        "simulation finished"
    );
    report(&system);
}

/// Steps every body for the configured duration. Returns the number of steps.
fn run(system: &mut System, config: &Config) -> u64 {
    let sim = &config.simulation;
    let pool = StepPool::new(sim.worker_threads, system.bodies.len());
    let mut clock = SimClock::new(sim.fixed_dt, sim.max_frame_time);

    for body in &mut system.bodies {
        body.start();
    }

    // Headless: every frame takes exactly one step.
    let frame_time = clock.fixed_dt();
    while clock.sim_time() < sim.duration_seconds && !system.bodies.is_empty() {
        clock.tick(frame_time, |dt, sim_time| {
            let bodies = std::mem::take(&mut system.bodies);
            system.bodies = pool
                .step_all(bodies, dt)
                .into_iter()
                .map(|step| {
                    if let Err(err) = step.result {
                        warn!(body = step.body.id, %err, sim_time, "keeping previous state");
                    }
                    step.body
                })
                .collect();
            despawn_finished(system);
        });

        if clock.update_count() % 600 == 0 {
            debug!(sim_time = clock.sim_time(), bodies = system.bodies.len(), "tick");
        }
    }

    clock.update_count()
}

/// Drains every body's events and removes bodies whose orbit deactivated them.
fn despawn_finished(system: &mut System) {
    let mut finished = HashSet::new();
    for (id, info) in system.info.iter().enumerate() {
        for event in info.events.try_iter() {
            if let OrbitEvent::Ended { reason } = event {
                info!(body = %info.name, ?reason, "orbit ended");
                if reason == EndReason::Deactivated {
                    finished.insert(id as u64);
                }
            }
        }
    }
    if !finished.is_empty() {
        system.bodies.retain(|body| !finished.contains(&body.id));
    }
}

/// Position of every remaining body relative to the system origin.
fn world_positions(system: &System) -> HashMap<u64, DVec3> {
    let local: HashMap<u64, DVec3> = system
        .bodies
        .iter()
        .map(|body| (body.id, body.orbit().position()))
        .collect();

    local
        .iter()
        .map(|(&id, &position)| {
            let offset = match system.info[id as usize].kind {
                Kind::Moon { parent } => local.get(&parent).copied().unwrap_or(DVec3::ZERO),
                Kind::Planet | Kind::Comet => DVec3::ZERO,
            };
            (id, offset + position)
        })
        .collect()
}

fn report(system: &System) {
    let positions = world_positions(system);
    for body in &system.bodies {
        let info = &system.info[body.id as usize];
        let position = positions.get(&body.id).copied().unwrap_or(DVec3::ZERO);
        let orbit = body.orbit();
        info!(
            body = %info.name,
            x = position.x,
            y = position.y,
            z = position.z,
            radius = orbit.radius(),
            true_anomaly = orbit.true_anomaly().to_degrees(),
            spin = body.rotation.as_ref().map(|r| r.angle().to_degrees()),
            "final state"
        );
    }
}
