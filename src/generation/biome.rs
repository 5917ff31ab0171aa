//! # Biome Classification
//!
//! Classifies every world column into a [`Biome`] from low-frequency climate
//! noise. The classification is a pure function of `(seed, x, z)`.

use crate::voxels::block::block_type::BlockType;

use super::noise::{create_noise, NoiseSource, NoiseStrategy, WorldSeed};

/// Terrain classes driving height, materials and features.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Plains,
    Forest,
    Desert,
    Mountains,
    Snow,
    Swamp,
    Beach,
    Riverbank,
    Mushroom,
    Volcanic,
}

impl Biome {
    /// Material of the three layers under the surface block.
    pub const fn subsurface_block(self) -> BlockType {
        match self {
            Biome::Desert | Biome::Beach => BlockType::Sand,
            Biome::Swamp | Biome::Riverbank => BlockType::Clay,
            Biome::Volcanic => BlockType::Basalt,
            Biome::Mountains => BlockType::Gravel,
            Biome::Plains | Biome::Forest | Biome::Snow | Biome::Mushroom => BlockType::Dirt,
        }
    }

    /// Surface material of a dry column below the snow line.
    pub const fn surface_block(self) -> BlockType {
        match self {
            Biome::Desert | Biome::Beach | Biome::Volcanic => BlockType::Sand,
            Biome::Snow => BlockType::Snow,
            Biome::Swamp | Biome::Riverbank => BlockType::Clay,
            Biome::Plains | Biome::Forest | Biome::Mountains | Biome::Mushroom => BlockType::Grass,
        }
    }

    /// Surface material of a column below sea level.
    pub const fn bed_block(self) -> BlockType {
        match self {
            Biome::Swamp | Biome::Riverbank => BlockType::Clay,
            _ => BlockType::Sand,
        }
    }

    /// Returns true for biomes whose surface sits at or near the water line.
    pub const fn is_wetland(self) -> bool {
        matches!(self, Biome::Swamp | Biome::Beach | Biome::Riverbank)
    }
}

/// Climate sample behind one classification.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Climate {
    pub temperature: f64,
    pub humidity: f64,
    pub continentalness: f64,
    pub river: f64,
    pub weirdness: f64,
}

/// Biome classifier that determines the biome at world coordinates.
pub struct BiomeClassifier {
    temperature: Box<dyn NoiseSource>,
    humidity: Box<dyn NoiseSource>,
    continentalness: Box<dyn NoiseSource>,
    river: Box<dyn NoiseSource>,
    weirdness: Box<dyn NoiseSource>,
}

impl BiomeClassifier {
    const CLIMATE_SCALE: f64 = 1.0 / 384.0;
    const CONTINENT_SCALE: f64 = 1.0 / 512.0;
    const RIVER_SCALE: f64 = 1.0 / 320.0;
    const WEIRDNESS_SCALE: f64 = 1.0 / 256.0;
    /// Half-width of the river band in river-noise units.
    pub const RIVER_WIDTH: f64 = 0.035;
    /// Continentalness below which a column counts as coastline.
    const COAST_LEVEL: f64 = -0.35;

    pub fn new(seed: WorldSeed, strategy: NoiseStrategy) -> Self {
        BiomeClassifier {
            temperature: create_noise(strategy, seed.noise_seed(0x7e3a)),
            humidity: create_noise(strategy, seed.noise_seed(0x4d1f)),
            continentalness: create_noise(strategy, seed.noise_seed(0xc047)),
            river: create_noise(strategy, seed.noise_seed(0x21fe)),
            weirdness: create_noise(strategy, seed.noise_seed(0x9a9a)),
        }
    }

    pub fn climate(&self, x: i32, z: i32) -> Climate {
        let (x, z) = (x as f64, z as f64);
        Climate {
            temperature: self
                .temperature
                .fbm2d(x * Self::CLIMATE_SCALE, z * Self::CLIMATE_SCALE, 2, 0.5, 2.0),
            humidity: self
                .humidity
                .fbm2d(x * Self::CLIMATE_SCALE, z * Self::CLIMATE_SCALE, 2, 0.5, 2.0),
            continentalness: self
                .continentalness
                .noise2d(x * Self::CONTINENT_SCALE, z * Self::CONTINENT_SCALE),
            river: self.river.noise2d(x * Self::RIVER_SCALE, z * Self::RIVER_SCALE),
            weirdness: self
                .weirdness
                .noise2d(x * Self::WEIRDNESS_SCALE, z * Self::WEIRDNESS_SCALE),
        }
    }

    pub fn classify(&self, x: i32, z: i32) -> Biome {
        Self::classify_climate(&self.climate(x, z))
    }

    /// Maps a climate sample to a biome. Water bodies and coasts win over
    /// climate, rare biomes come from the weirdness channel.
    pub fn classify_climate(climate: &Climate) -> Biome {
        if climate.river.abs() < Self::RIVER_WIDTH {
            return Biome::Riverbank;
        }
        if climate.continentalness < Self::COAST_LEVEL {
            return Biome::Beach;
        }
        if climate.weirdness > 0.62 {
            return if climate.temperature > 0.15 {
                Biome::Volcanic
            } else {
                Biome::Mushroom
            };
        }
        if climate.continentalness > 0.45 {
            return if climate.temperature < -0.35 {
                Biome::Snow
            } else {
                Biome::Mountains
            };
        }

        match (climate.temperature, climate.humidity) {
            (t, _) if t < -0.3 => Biome::Snow,
            (t, h) if t > 0.3 && h < -0.1 => Biome::Desert,
            (_, h) if h > 0.4 => Biome::Swamp,
            (_, h) if h > 0.05 => Biome::Forest,
            _ => Biome::Plains,
        }
    }
}
