//! # World Configuration
//!
//! Startup settings of a [`crate::World`]. Every field has a default, so an
//! empty JSON object is a valid configuration:
//!
//! ```json
//! { "seed": 42, "load_radius": 6, "render_radius": 4, "detail": "reduced" }
//! ```

use serde::Deserialize;

use crate::{
    error::ConfigError,
    generation::{noise::NoiseStrategy, noise::WorldSeed, GenerationDetail},
};

/// Largest radius, in chunks, any of the three radii may take.
pub const MAX_RADIUS: u32 = 64;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. A random one is drawn when absent.
    pub seed: Option<u64>,
    /// Chunks within this radius of the reference point are kept resident.
    pub load_radius: u32,
    /// Chunks within this radius are handed to the renderer.
    pub render_radius: u32,
    /// Resident chunks beyond this radius are evicted.
    pub retain_radius: u32,
    /// Hard cap on resident chunks, enforced by LRU eviction.
    pub max_resident_chunks: usize,
    /// Generation worker threads. Zero generates inline in `process_tasks`.
    pub worker_threads: usize,
    pub detail: GenerationDetail,
    pub noise: NoiseStrategy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: None,
            load_radius: 6,
            render_radius: 4,
            retain_radius: 8,
            max_resident_chunks: 512,
            worker_threads: 0,
            detail: GenerationDetail::Full,
            noise: NoiseStrategy::Gradient,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// A default configuration with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        WorldConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let largest = self
            .render_radius
            .max(self.load_radius)
            .max(self.retain_radius);
        if largest > MAX_RADIUS {
            return Err(ConfigError::RadiusTooLarge {
                radius: largest,
                max: MAX_RADIUS,
            });
        }
        if self.render_radius > self.load_radius || self.load_radius > self.retain_radius {
            return Err(ConfigError::InvalidRadii {
                render: self.render_radius,
                load: self.load_radius,
                retain: self.retain_radius,
            });
        }
        if self.max_resident_chunks == 0 {
            return Err(ConfigError::ZeroResidentLimit);
        }
        Ok(())
    }

    /// The configured seed, or a freshly drawn one.
    pub fn resolve_seed(&self) -> WorldSeed {
        self.seed.map(WorldSeed::new).unwrap_or_else(WorldSeed::random)
    }
}
