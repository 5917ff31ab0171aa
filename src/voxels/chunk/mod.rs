//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x16 column of the world that
//! spans the whole build height, and the unit of generation, streaming and
//! eviction.
//!
//! ## Storage
//!
//! Chunks store blocks sparsely, keyed by absolute world coordinate. Air is
//! never stored: a coordinate without an entry reads back as
//! [`BlockType::Air`], and writing air removes the entry. Underground stone
//! dominates the entry count; the sky costs nothing.
//!
//! A chunk only ever holds coordinates inside its own footprint.

use std::{collections::HashMap, fmt};

use cgmath::Point3;

use super::block::block_type::BlockType;

pub mod chunk_creation;

/// The horizontal dimension (width and depth) of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;
/// Lowest y coordinate of the build range.
pub const WORLD_MIN_Y: i32 = 0;
/// One past the highest y coordinate of the build range.
pub const WORLD_HEIGHT: i32 = 96;

/// Block map produced by generation and owned by a resident chunk.
pub type ChunkBlocks = HashMap<Point3<i32>, BlockType>;

/// Integer chunk coordinate, `(floor(x / 16), floor(z / 16))` of any block inside it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkPos { x, z }
    }

    /// Returns the chunk that owns the given world block coordinate.
    pub fn from_block(pos: Point3<i32>) -> Self {
        ChunkPos {
            x: pos.x.div_euclid(CHUNK_SIZE),
            z: pos.z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Returns the chunk containing a continuous world position.
    pub fn from_world(x: f64, z: f64) -> Self {
        let size = CHUNK_SIZE as f64;
        ChunkPos {
            x: (x / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// World coordinate of the chunk's minimum corner at `WORLD_MIN_Y`.
    pub fn origin(self) -> Point3<i32> {
        Point3::new(self.x * CHUNK_SIZE, WORLD_MIN_Y, self.z * CHUNK_SIZE)
    }

    /// Returns true when the world block coordinate lies in this chunk's footprint.
    pub fn contains(self, pos: Point3<i32>) -> bool {
        ChunkPos::from_block(pos) == self
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_squared(self, other: ChunkPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// Returns true when `self` lies within `radius` chunks of `center`.
    pub fn within_radius(self, center: ChunkPos, radius: u32) -> bool {
        self.distance_squared(center) <= (radius as i64) * (radius as i64)
    }

    /// Every chunk within `radius` of `self`, nearest first, ties broken by x then z.
    pub fn chunks_within(self, radius: u32) -> Vec<ChunkPos> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let side = 2 * radius as usize + 1;
        let mut positions = Vec::with_capacity(side * side);
        for dx in -r..=r {
            for dz in -r..=r {
                let pos = ChunkPos::new(self.x + dx, self.z + dz);
                if pos.within_radius(self, radius) {
                    positions.push(pos);
                }
            }
        }
        sort_nearest_first(&mut positions, self);
        positions
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Sorts chunk positions by distance to `center`, then x, then z.
pub fn sort_nearest_first(positions: &mut [ChunkPos], center: ChunkPos) {
    positions.sort_by_key(|pos| (pos.distance_squared(center), pos.x, pos.z));
}

/// A resident column of blocks.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkPos,
    blocks: ChunkBlocks,
    /// Logical tick of the last time the store touched this chunk.
    pub last_accessed: u64,
    /// Set on every mutation, cleared when the renderer picks the change up.
    pub dirty: bool,
}

impl Chunk {
    /// Wraps a generated block map. Entries outside the footprint and air
    /// entries are dropped.
    pub fn new(position: ChunkPos, mut blocks: ChunkBlocks, last_accessed: u64) -> Self {
        blocks.retain(|pos, block| position.contains(*pos) && !block.is_air());
        Chunk {
            position,
            blocks,
            last_accessed,
            dirty: true,
        }
    }

    /// Returns the block at a world coordinate inside this chunk, air if unset.
    pub fn get(&self, pos: Point3<i32>) -> BlockType {
        self.blocks.get(&pos).copied().unwrap_or(BlockType::Air)
    }

    /// Writes a block and returns the previous one. Air removes the entry.
    ///
    /// Returns `None` without writing when `pos` is outside the footprint.
    pub fn set(&mut self, pos: Point3<i32>, block: BlockType) -> Option<BlockType> {
        if !self.position.contains(pos) {
            return None;
        }
        let previous = if block.is_air() {
            self.blocks.remove(&pos)
        } else {
            self.blocks.insert(pos, block)
        };
        self.dirty = true;
        Some(previous.unwrap_or(BlockType::Air))
    }

    /// Number of stored (non-air) blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Read-only view of the stored blocks for rendering collaborators.
    pub fn blocks(&self) -> &ChunkBlocks {
        &self.blocks
    }

    /// Highest non-air, non-liquid block in a column, if any.
    pub fn top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        (WORLD_MIN_Y..WORLD_HEIGHT)
            .rev()
            .find(|y| self.get(Point3::new(x, *y, z)).is_solid())
    }
}
