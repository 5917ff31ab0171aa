//! # Terrain Generation
//!
//! Pure, deterministic generation of chunk contents from a world seed.
//!
//! [`terrain::TerrainGenerator`] is the entry point. It classifies each column
//! into a biome, computes its surface height, fills the column and finally
//! decorates the chunk with features. Nothing here touches the chunk store;
//! the output is a plain block map handed back to the caller.

use serde::Deserialize;

pub mod biome;
pub mod features;
pub mod noise;
pub mod terrain;

/// Water surface height of the world.
pub const SEA_LEVEL: i32 = 30;

/// Performance tier of the generator. Lower tiers sample fewer octaves and
/// place fewer features.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationDetail {
    #[default]
    Full,
    Reduced,
    Minimal,
}

impl GenerationDetail {
    /// Octaves summed by the height field.
    pub const fn octaves(self) -> u32 {
        match self {
            GenerationDetail::Full => 5,
            GenerationDetail::Reduced => 3,
            GenerationDetail::Minimal => 1,
        }
    }

    /// Multiplier applied to every feature chance.
    pub const fn feature_density(self) -> f64 {
        match self {
            GenerationDetail::Full => 1.0,
            GenerationDetail::Reduced => 0.5,
            GenerationDetail::Minimal => 0.0,
        }
    }

    /// Whether deep stone receives ore substitution.
    pub const fn ores(self) -> bool {
        !matches!(self, GenerationDetail::Minimal)
    }
}
