//! # Headless World Walk
//!
//! Streams a world around a reference point walking east and logs what the
//! chunk store does. Useful for watching generation and eviction without a
//! renderer.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use voxel_world::{World, WorldConfig};

/// Blocks walked per step.
const STEP: f64 = 8.0;
const STEPS: usize = 64;

fn main() {
    voxel_world::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => match WorldConfig::from_json(&json) {
                Ok(config) => config,
                Err(err) => {
                    log::error!("Invalid config {path}: {err}");
                    std::process::exit(1);
                }
            },
            Err(err) => {
                log::error!("Cannot read {path}: {err}");
                std::process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };

    let mut world = match World::new(config) {
        Ok(world) => world,
        Err(err) => {
            log::error!("Cannot create world: {err}");
            std::process::exit(1);
        }
    };

    world.update_reference_point(0.0, 0.0);
    world.flush_generation();
    match world.generator().surface_height(0, 0) {
        Ok(height) => log::info!(
            "Spawn column (0, 0): {:?} at height {height}",
            world.generator().biome_at(0, 0)
        ),
        Err(err) => log::warn!("Cannot sample the spawn column: {err}"),
    }

    for step in 1..=STEPS {
        let x = step as f64 * STEP;
        if world.update_reference_point(x, 0.0) {
            log::info!("Step {step}: entered chunk at x = {x}");
        }
        let applied = world.process_tasks();
        let dirty = world.take_dirty_chunks();
        log::debug!("Step {step}: {applied} chunks applied, {} dirty", dirty.len());
    }

    world.flush_generation();
    let stats = world.stats();
    log::info!(
        "Walk finished: {} resident, {} generated, {} evicted, {} late results, {} visible",
        stats.resident,
        stats.generated,
        stats.evicted,
        stats.late_results,
        world.visible_chunks(STEPS as f64 * STEP, 0.0).len()
    );
}
