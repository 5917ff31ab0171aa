//! # Feature Placement
//!
//! Decorates a chunk after its columns are filled: trees, cacti, exposed ore,
//! volcanic vents, ash, mushrooms, flowers and grass.
//!
//! Every column rolls each feature its biome allows against a per-chunk PRNG,
//! so a chunk always decorates identically. Each feature kind may appear at
//! most once per 4x4 sub-area of the chunk, and all writes go through
//! [`ChunkBuilder::place_if_empty`].

use bitvec::prelude::BitVec;
use cgmath::Point3;

use crate::voxels::{
    block::block_type::BlockType,
    chunk::{chunk_creation::ChunkBuilder, CHUNK_SIZE},
};

use super::{biome::Biome, terrain::ColumnSample, SEA_LEVEL};

/// Side length of a placement sub-area, in blocks.
const SUB_AREA: i32 = 4;
const SUB_AREAS_PER_SIDE: i32 = CHUNK_SIZE / SUB_AREA;

/// Tracks which sub-areas of a chunk already hold one feature kind.
struct FeatureGrid {
    claimed: BitVec,
}

impl FeatureGrid {
    fn new() -> Self {
        FeatureGrid {
            claimed: BitVec::repeat(false, (SUB_AREAS_PER_SIDE * SUB_AREAS_PER_SIDE) as usize),
        }
    }

    fn index(local_x: i32, local_z: i32) -> usize {
        ((local_z / SUB_AREA) * SUB_AREAS_PER_SIDE + local_x / SUB_AREA) as usize
    }

    fn is_claimed(&self, local_x: i32, local_z: i32) -> bool {
        self.claimed[Self::index(local_x, local_z)]
    }

    fn claim(&mut self, local_x: i32, local_z: i32) {
        self.claimed.set(Self::index(local_x, local_z), true);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Feature {
    Tree,
    Cactus,
    OreOutcrop,
    Vent,
    Ash,
    GiantMushroom,
    SmallMushroom,
    Flower,
    TallGrass,
}

const FEATURE_COUNT: usize = 9;

impl Feature {
    /// Features a biome may roll, with their base per-column chance.
    fn candidates(biome: Biome) -> &'static [(Feature, f64)] {
        match biome {
            Biome::Forest => &[(Feature::Tree, 0.14), (Feature::TallGrass, 0.05)],
            Biome::Plains => &[
                (Feature::Tree, 0.015),
                (Feature::Flower, 0.05),
                (Feature::TallGrass, 0.12),
            ],
            Biome::Desert => &[(Feature::Cactus, 0.025)],
            Biome::Mountains => &[(Feature::OreOutcrop, 0.03), (Feature::Tree, 0.01)],
            Biome::Snow => &[(Feature::Tree, 0.02)],
            Biome::Swamp => &[(Feature::Tree, 0.03), (Feature::SmallMushroom, 0.05)],
            Biome::Mushroom => &[
                (Feature::GiantMushroom, 0.04),
                (Feature::SmallMushroom, 0.1),
            ],
            Biome::Volcanic => &[(Feature::Vent, 0.02), (Feature::Ash, 0.15)],
            Biome::Beach | Biome::Riverbank => &[],
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Decorates the chunk being built. `columns` holds one sample per column in
/// z-major order, matching the order the columns were filled.
pub fn decorate(
    builder: &mut ChunkBuilder,
    columns: &[ColumnSample],
    rng: &mut fastrand::Rng,
    density: f64,
) {
    if density <= 0.0 {
        return;
    }

    let origin = builder.position().origin();
    let mut grids: Vec<FeatureGrid> = (0..FEATURE_COUNT).map(|_| FeatureGrid::new()).collect();

    for local_z in 0..CHUNK_SIZE {
        for local_x in 0..CHUNK_SIZE {
            let column = &columns[(local_z * CHUNK_SIZE + local_x) as usize];
            if column.height < SEA_LEVEL || column.crater {
                continue;
            }
            let ground = Point3::new(origin.x + local_x, column.height, origin.z + local_z);

            for (feature, chance) in Feature::candidates(column.biome) {
                let roll = rng.f64();
                let grid = &mut grids[feature.slot()];
                if roll >= chance * density || grid.is_claimed(local_x, local_z) {
                    continue;
                }
                let placed = place(*feature, builder, ground, local_x, local_z, rng);
                if placed {
                    grid.claim(local_x, local_z);
                    // One feature per column.
                    break;
                }
            }
        }
    }
}

fn place(
    feature: Feature,
    builder: &mut ChunkBuilder,
    ground: Point3<i32>,
    local_x: i32,
    local_z: i32,
    rng: &mut fastrand::Rng,
) -> bool {
    let surface = builder.get(ground);
    let above = Point3::new(ground.x, ground.y + 1, ground.z);
    match feature {
        Feature::Tree => {
            let fits_canopy = (2..CHUNK_SIZE - 2).contains(&local_x)
                && (2..CHUNK_SIZE - 2).contains(&local_z);
            let rooted = matches!(
                surface,
                BlockType::Grass | BlockType::Snow | BlockType::Dirt | BlockType::Clay
            );
            fits_canopy && rooted && place_tree(builder, above, rng.i32(3..=6))
        }
        Feature::Cactus => {
            surface == BlockType::Sand
                && place_column(builder, above, BlockType::Cactus, rng.i32(1..=3))
        }
        Feature::OreOutcrop => {
            let ore = if rng.f64() < 0.7 {
                BlockType::CoalOre
            } else {
                BlockType::IronOre
            };
            let placed = builder.place_if_empty(above, ore);
            if placed && rng.bool() {
                builder.place_if_empty(Point3::new(above.x, above.y + 1, above.z), BlockType::Stone);
            }
            placed
        }
        Feature::Vent => {
            let height = rng.i32(2..=4);
            if !place_column(builder, above, BlockType::Basalt, height) {
                return false;
            }
            builder.place_if_empty(
                Point3::new(above.x, above.y + height, above.z),
                BlockType::Lava,
            );
            true
        }
        Feature::Ash => builder.place_if_empty(above, BlockType::Ash),
        Feature::GiantMushroom => {
            let fits_cap = (1..CHUNK_SIZE - 1).contains(&local_x)
                && (1..CHUNK_SIZE - 1).contains(&local_z);
            fits_cap && place_giant_mushroom(builder, above, rng.i32(3..=4))
        }
        Feature::SmallMushroom => builder.place_if_empty(above, BlockType::Mushroom),
        Feature::Flower => {
            surface == BlockType::Grass && builder.place_if_empty(above, BlockType::Flower)
        }
        Feature::TallGrass => {
            surface == BlockType::Grass && builder.place_if_empty(above, BlockType::TallGrass)
        }
    }
}

/// Returns true when every cell of the vertical run starting at `base` is empty.
fn column_is_clear(builder: &ChunkBuilder, base: Point3<i32>, height: i32) -> bool {
    (0..height).all(|dy| {
        let pos = Point3::new(base.x, base.y + dy, base.z);
        builder.accepts(pos) && builder.get(pos).is_air()
    })
}

fn place_column(builder: &mut ChunkBuilder, base: Point3<i32>, block: BlockType, height: i32) -> bool {
    if !column_is_clear(builder, base, height) {
        return false;
    }
    for dy in 0..height {
        builder.place_if_empty(Point3::new(base.x, base.y + dy, base.z), block);
    }
    true
}

/// Trunk of `trunk_height` logs topped by a rounded leaf canopy.
fn place_tree(builder: &mut ChunkBuilder, base: Point3<i32>, trunk_height: i32) -> bool {
    // Canopy reaches one block above the trunk.
    if !column_is_clear(builder, base, trunk_height + 2) {
        return false;
    }
    place_column(builder, base, BlockType::Wood, trunk_height);

    let top = base.y + trunk_height - 1;
    for dy in -2..=1 {
        let radius: i32 = if dy < 0 { 2 } else { 1 };
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let corner = dx.abs() == radius && dz.abs() == radius;
                if corner && (radius == 2 || dy == 1) {
                    continue;
                }
                builder.place_if_empty(Point3::new(base.x + dx, top + dy, base.z + dz), BlockType::Leaves);
            }
        }
    }
    true
}

fn place_giant_mushroom(builder: &mut ChunkBuilder, base: Point3<i32>, stem_height: i32) -> bool {
    if !column_is_clear(builder, base, stem_height + 1) {
        return false;
    }
    place_column(builder, base, BlockType::Wood, stem_height);
    let cap_y = base.y + stem_height;
    for dx in -1..=1 {
        for dz in -1..=1 {
            builder.place_if_empty(Point3::new(base.x + dx, cap_y, base.z + dz), BlockType::MushroomCap);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::chunk::ChunkPos;

    fn flat_columns(biome: Biome, height: i32) -> Vec<ColumnSample> {
        vec![
            ColumnSample {
                biome,
                height,
                crater: false,
            };
            (CHUNK_SIZE * CHUNK_SIZE) as usize
        ]
    }

    fn grassy_builder(height: i32) -> ChunkBuilder {
        let mut builder = ChunkBuilder::new(ChunkPos::new(0, 0));
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                builder.set(Point3::new(x, height, z), BlockType::Grass);
            }
        }
        builder
    }

    #[test]
    fn at_most_one_tree_per_sub_area() {
        let height = SEA_LEVEL + 2;
        let mut builder = grassy_builder(height);
        let mut rng = fastrand::Rng::with_seed(3);
        // Saturate the chance so every eligible column tries.
        decorate(&mut builder, &flat_columns(Biome::Forest, height), &mut rng, 10.0);
        let blocks = builder.return_blocks();

        let trunks: Vec<_> = blocks
            .iter()
            .filter(|(pos, block)| **block == BlockType::Wood && pos.y == height + 1)
            .map(|(pos, _)| (pos.x / SUB_AREA, pos.z / SUB_AREA))
            .collect();
        assert!(!trunks.is_empty());
        let mut unique = trunks.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), trunks.len());
    }

    #[test]
    fn features_never_replace_existing_blocks() {
        let height = SEA_LEVEL + 2;
        let mut builder = grassy_builder(height);
        let mut rng = fastrand::Rng::with_seed(11);
        decorate(&mut builder, &flat_columns(Biome::Plains, height), &mut rng, 10.0);
        let blocks = builder.return_blocks();
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                assert_eq!(blocks.get(&Point3::new(x, height, z)), Some(&BlockType::Grass));
            }
        }
    }

    #[test]
    fn zero_density_places_nothing() {
        let height = SEA_LEVEL + 2;
        let mut builder = grassy_builder(height);
        let mut rng = fastrand::Rng::with_seed(11);
        decorate(&mut builder, &flat_columns(Biome::Forest, height), &mut rng, 0.0);
        assert_eq!(builder.return_blocks().len(), (CHUNK_SIZE * CHUNK_SIZE) as usize);
    }
}
