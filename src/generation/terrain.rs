//! # Terrain Generator
//!
//! Turns a chunk position into the chunk's block map. Generation runs in
//! three passes over the chunk:
//!
//! 1. **Sampling**: every column gets a biome and a surface height.
//! 2. **Filling**: bedrock, stone with depth-stratified ores, three
//!    subsurface layers, the surface cap, then liquid up to sea level.
//! 3. **Decoration**: features from [`super::features`].
//!
//! All randomness comes from PRNGs seeded by `(seed, chunk, salt)`, so the
//! output is a pure function of the seed, detail tier, noise strategy and
//! chunk position. This is what lets the store drop a chunk and later
//! regenerate it unchanged.

use cgmath::Point3;
use web_time::Instant;

use crate::{
    error::GenerationError,
    voxels::{
        block::block_type::BlockType,
        chunk::{
            chunk_creation::ChunkBuilder, ChunkBlocks, ChunkPos, CHUNK_SIZE, WORLD_HEIGHT,
            WORLD_MIN_Y,
        },
    },
};

use super::{
    biome::{Biome, BiomeClassifier},
    features,
    noise::{create_noise, NoiseSource, NoiseStrategy, WorldSeed},
    GenerationDetail, SEA_LEVEL,
};

/// Average surface height of inland terrain.
pub const BASE_HEIGHT: i32 = 34;
/// Mountain columns at or above this height are capped with snow.
pub const SNOW_LINE: i32 = 60;
/// Lowest surface height the generator produces.
pub const MIN_SURFACE: i32 = 4;
/// Top of the generated volume. Surfaces stay 16 blocks below it so
/// features have room to grow.
pub const GENERATION_CEILING: i32 = WORLD_HEIGHT;
/// Surface height of the fallback platform.
pub const FLAT_HEIGHT: i32 = SEA_LEVEL + 2;

const SUBSURFACE_DEPTH: i32 = 3;
const ELEVATION_SCALE: f64 = 1.0 / 160.0;
const RUGGED_SCALE: f64 = 1.0 / 48.0;
const CRATER_SCALE: f64 = 1.0 / 40.0;
const CRATER_THRESHOLD: f64 = 0.45;

const ORE_SALT: u64 = 0x04e5;
const FEATURE_SALT: u64 = 0xfea7;
const CRATER_SALT: u64 = 0xc7a7;

/// Biome and surface of one world column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnSample {
    pub biome: Biome,
    /// y of the topmost terrain block.
    pub height: i32,
    /// Set when a volcanic crater was carved into this column.
    pub crater: bool,
}

impl ColumnSample {
    pub fn is_underwater(&self) -> bool {
        self.height < SEA_LEVEL
    }

    /// The block placed at the surface height.
    pub fn cap_block(&self) -> BlockType {
        if self.is_underwater() {
            return self.biome.bed_block();
        }
        if self.biome == Biome::Mountains && self.height >= SNOW_LINE {
            return BlockType::Snow;
        }
        self.biome.surface_block()
    }
}

/// Deterministic chunk generator for one world seed.
pub struct TerrainGenerator {
    seed: WorldSeed,
    detail: GenerationDetail,
    biomes: BiomeClassifier,
    elevation: Box<dyn NoiseSource>,
    ruggedness: Box<dyn NoiseSource>,
    craters: Box<dyn NoiseSource>,
}

impl TerrainGenerator {
    pub fn new(seed: WorldSeed, detail: GenerationDetail, strategy: NoiseStrategy) -> Self {
        TerrainGenerator {
            seed,
            detail,
            biomes: BiomeClassifier::new(seed, strategy),
            elevation: create_noise(strategy, seed.noise_seed(0xe1e7)),
            ruggedness: create_noise(strategy, seed.noise_seed(0x7a66)),
            craters: create_noise(strategy, seed.noise_seed(0xc7a7)),
        }
    }

    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    pub fn detail(&self) -> GenerationDetail {
        self.detail
    }

    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        self.biomes.classify(x, z)
    }

    /// y of the topmost terrain block of a column, ignoring features and liquids.
    pub fn surface_height(&self, x: i32, z: i32) -> Result<i32, GenerationError> {
        Ok(self.sample_column(x, z)?.height)
    }

    /// Classifies a column and computes its surface height.
    pub fn sample_column(&self, x: i32, z: i32) -> Result<ColumnSample, GenerationError> {
        let climate = self.biomes.climate(x, z);
        let biome = BiomeClassifier::classify_climate(&climate);
        let (fx, fz) = (x as f64, z as f64);
        let octaves = self.detail.octaves();
        let sea = SEA_LEVEL as f64;

        let base = self
            .elevation
            .fbm2d(fx * ELEVATION_SCALE, fz * ELEVATION_SCALE, octaves, 0.5, 2.0);
        let mut height = BASE_HEIGHT as f64 + base * 8.0 + climate.continentalness * 6.0;
        let mut crater = false;

        match biome {
            Biome::Mountains => {
                let rugged = self
                    .ruggedness
                    .fbm2d(fx * RUGGED_SCALE, fz * RUGGED_SCALE, octaves, 0.55, 2.1);
                height += 12.0 + rugged.abs() * 24.0;
            }
            Biome::Snow => height += 4.0 + base.max(0.0) * 10.0,
            Biome::Beach => height = sea + base * 2.0,
            Biome::Riverbank => {
                // Deepest in the middle of the band.
                let depth = 1.0 - climate.river.abs() / BiomeClassifier::RIVER_WIDTH;
                height = sea - 1.0 - depth * 4.0;
            }
            Biome::Swamp => height = sea + base,
            Biome::Volcanic => {
                height += 6.0 + base.abs() * 10.0;
                let bowl = self.craters.noise2d(fx * CRATER_SCALE, fz * CRATER_SCALE);
                if bowl > CRATER_THRESHOLD && self.seed.column_chance(x, z, CRATER_SALT) < 0.9 {
                    height -= (bowl - CRATER_THRESHOLD) * 40.0;
                    crater = true;
                }
            }
            Biome::Plains | Biome::Forest | Biome::Desert | Biome::Mushroom => {}
        }

        if !height.is_finite() {
            return Err(GenerationError::NonFiniteNoise { x, z });
        }
        let height = (height.round() as i32).clamp(MIN_SURFACE, GENERATION_CEILING - 16);
        Ok(ColumnSample {
            biome,
            height,
            crater,
        })
    }

    /// Generates the block map of one chunk. Every key lies inside the
    /// chunk's footprint and build range.
    pub fn generate_chunk(&self, pos: ChunkPos) -> Result<ChunkBlocks, GenerationError> {
        let started = Instant::now();
        let origin = pos.origin();
        let mut builder = ChunkBuilder::new(pos);
        let mut ore_rng = self.seed.chunk_rng(pos.x, pos.z, ORE_SALT);

        let mut columns = Vec::with_capacity((CHUNK_SIZE * CHUNK_SIZE) as usize);
        for local_z in 0..CHUNK_SIZE {
            for local_x in 0..CHUNK_SIZE {
                let (x, z) = (origin.x + local_x, origin.z + local_z);
                let column = self.sample_column(x, z)?;
                self.fill_column(&mut builder, x, z, &column, &mut ore_rng);
                columns.push(column);
            }
        }

        let mut feature_rng = self.seed.chunk_rng(pos.x, pos.z, FEATURE_SALT);
        features::decorate(
            &mut builder,
            &columns,
            &mut feature_rng,
            self.detail.feature_density(),
        );

        let blocks = builder.return_blocks();
        log::debug!(
            "Generated chunk {pos} with {} blocks in {:?}",
            blocks.len(),
            started.elapsed()
        );
        Ok(blocks)
    }

    fn fill_column(
        &self,
        builder: &mut ChunkBuilder,
        x: i32,
        z: i32,
        column: &ColumnSample,
        ore_rng: &mut fastrand::Rng,
    ) {
        let surface = column.height;
        builder.set(Point3::new(x, WORLD_MIN_Y, z), BlockType::Bedrock);

        let stone_top = surface - SUBSURFACE_DEPTH;
        for y in WORLD_MIN_Y + 1..stone_top {
            let block = if self.detail.ores() {
                ore_at(y, ore_rng.f64()).unwrap_or(BlockType::Stone)
            } else {
                BlockType::Stone
            };
            builder.set(Point3::new(x, y, z), block);
        }

        let subsurface = column.biome.subsurface_block();
        for y in stone_top.max(WORLD_MIN_Y + 1)..surface {
            builder.set(Point3::new(x, y, z), subsurface);
        }
        builder.set(Point3::new(x, surface, z), column.cap_block());

        let (liquid, liquid_top) = if column.crater {
            (BlockType::Lava, SEA_LEVEL.max(surface + 1))
        } else {
            (BlockType::Water, SEA_LEVEL)
        };
        for y in surface + 1..=liquid_top {
            builder.set(Point3::new(x, y, z), liquid);
        }
        if column.biome == Biome::Snow && liquid == BlockType::Water && surface < SEA_LEVEL {
            builder.set(Point3::new(x, SEA_LEVEL, z), BlockType::Ice);
        }
    }

    /// A plain grass platform: bedrock, dirt and a grass top at [`FLAT_HEIGHT`].
    /// Stands in for a chunk whose generation failed.
    pub fn flat_chunk(pos: ChunkPos) -> ChunkBlocks {
        let origin = pos.origin();
        let mut builder = ChunkBuilder::new(pos);
        for local_z in 0..CHUNK_SIZE {
            for local_x in 0..CHUNK_SIZE {
                let (x, z) = (origin.x + local_x, origin.z + local_z);
                builder.set(Point3::new(x, WORLD_MIN_Y, z), BlockType::Bedrock);
                for y in WORLD_MIN_Y + 1..FLAT_HEIGHT {
                    builder.set(Point3::new(x, y, z), BlockType::Dirt);
                }
                builder.set(Point3::new(x, FLAT_HEIGHT, z), BlockType::Grass);
            }
        }
        builder.return_blocks()
    }
}

/// Picks an ore for a stone cell at height `y` from a uniform roll.
/// Coal dominates near the surface; iron, gold and diamond sit deeper.
fn ore_at(y: i32, roll: f64) -> Option<BlockType> {
    let table: &[(BlockType, f64)] = if y < 12 {
        &[
            (BlockType::DiamondOre, 0.003),
            (BlockType::GoldOre, 0.006),
            (BlockType::IronOre, 0.014),
            (BlockType::CoalOre, 0.006),
        ]
    } else if y < 22 {
        &[
            (BlockType::GoldOre, 0.002),
            (BlockType::IronOre, 0.012),
            (BlockType::CoalOre, 0.014),
        ]
    } else {
        &[(BlockType::IronOre, 0.004), (BlockType::CoalOre, 0.02)]
    };

    let mut threshold = 0.0;
    for (ore, chance) in table {
        threshold += chance;
        if roll < threshold {
            return Some(*ore);
        }
    }
    None
}
