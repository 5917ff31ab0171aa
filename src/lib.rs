#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! Chunked storage and procedural generation for an effectively infinite
//! block world, streamed around a moving reference point.
//!
//! ## Key Modules
//!
//! * `voxels` - Block registry, chunks, the chunk store and the `World` facade
//! * `generation` - Seeded noise, biomes, terrain and feature placement
//! * `task_management` - Worker pool that runs chunk generation off the owner thread
//! * `config` - JSON world configuration
//! * `error` - Error types
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_world::{World, WorldConfig};
//!
//! voxel_world::init_logging();
//! let mut world = World::new(WorldConfig::with_seed(42)).unwrap();
//! world.update_reference_point(0.0, 0.0);
//! world.flush_generation();
//! let chunks = world.visible_chunks(0.0, 0.0);
//! ```
//!
//! The same crate builds for WebAssembly, where generation workers are Web
//! Workers and logs go to the browser console.

pub mod config;
pub mod error;
pub mod generation;
pub mod task_management;
pub mod voxels;

pub use config::WorldConfig;
pub use error::{ConfigError, GenerationError, WorldError};
pub use generation::{noise::NoiseStrategy, noise::WorldSeed, GenerationDetail};
pub use voxels::{
    block::{block_type::BlockType, compute_drops, tool::Tool, ItemDrop},
    chunk::{Chunk, ChunkPos, CHUNK_SIZE},
    chunk_store::{ChunkState, ChunkStats},
    world::World,
};

/// Installs the logger: `env_logger` writing to stdout and filtered by
/// `RUST_LOG` on native targets.
#[cfg(not(target_family = "wasm"))]
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG");
    if log_builder.try_init().is_ok() {
        log::info!("Logger initialized");
    }
}

/// Installs the logger: the browser console, plus a panic hook that reports
/// panics there.
#[cfg(target_family = "wasm")]
pub fn init_logging() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Logger initialized");
    }
}
