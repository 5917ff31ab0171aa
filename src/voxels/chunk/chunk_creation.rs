//! # Chunk Creation Module
//!
//! This module provides the builder the terrain generator writes through. It
//! enforces the two write rules of a generation pass:
//!
//! 1. Every write is clipped to the chunk's footprint and build range, so a
//!    feature that overhangs a chunk border simply loses the overhang.
//! 2. Features go through [`ChunkBuilder::place_if_empty`], which never
//!    overwrites a block placed earlier in the same pass.

use cgmath::Point3;

use crate::voxels::block::block_type::BlockType;

use super::{ChunkBlocks, ChunkPos, WORLD_HEIGHT, WORLD_MIN_Y};

/// Accumulates the block map of one chunk during generation.
pub struct ChunkBuilder {
    /// The chunk being created
    position: ChunkPos,
    /// Non-air blocks written so far
    blocks: ChunkBlocks,
}

impl ChunkBuilder {
    pub fn new(position: ChunkPos) -> Self {
        ChunkBuilder {
            position,
            blocks: ChunkBlocks::new(),
        }
    }

    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Returns true when `pos` may be written by this builder.
    pub fn accepts(&self, pos: Point3<i32>) -> bool {
        (WORLD_MIN_Y..WORLD_HEIGHT).contains(&pos.y) && self.position.contains(pos)
    }

    /// Returns the block written at `pos` so far, air if none.
    pub fn get(&self, pos: Point3<i32>) -> BlockType {
        self.blocks.get(&pos).copied().unwrap_or(BlockType::Air)
    }

    /// Writes a block unconditionally. Used for the base column fill.
    pub fn set(&mut self, pos: Point3<i32>, block_type: BlockType) {
        if !self.accepts(pos) {
            return;
        }
        if block_type.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block_type);
        }
    }

    /// Writes a block only if the cell is still empty.
    ///
    /// Returns true when the block was written.
    pub fn place_if_empty(&mut self, pos: Point3<i32>, block_type: BlockType) -> bool {
        if !self.accepts(pos) || self.blocks.contains_key(&pos) {
            return false;
        }
        self.set(pos, block_type);
        true
    }

    /// Finalizes the pass and returns the block map.
    pub fn return_blocks(self) -> ChunkBlocks {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_if_empty_never_overwrites() {
        let mut builder = ChunkBuilder::new(ChunkPos::new(0, 0));
        let pos = Point3::new(1, 20, 1);
        builder.set(pos, BlockType::Grass);
        assert!(!builder.place_if_empty(pos, BlockType::Wood));
        assert_eq!(builder.get(pos), BlockType::Grass);
        assert!(builder.place_if_empty(Point3::new(1, 21, 1), BlockType::Wood));
    }

    #[test]
    fn writes_are_clipped_to_footprint_and_build_range() {
        let mut builder = ChunkBuilder::new(ChunkPos::new(0, 0));
        builder.set(Point3::new(-1, 20, 0), BlockType::Stone);
        builder.set(Point3::new(0, WORLD_HEIGHT, 0), BlockType::Stone);
        assert!(!builder.place_if_empty(Point3::new(0, 20, 16), BlockType::Leaves));
        assert!(builder.return_blocks().is_empty());
    }
}
