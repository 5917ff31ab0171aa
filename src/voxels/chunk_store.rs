//! # Chunk Store
//!
//! Owns every resident chunk and decides which chunks should exist.
//!
//! ## Lifecycle
//!
//! Each chunk key is in exactly one state:
//!
//! * **Absent**: not stored and not requested.
//! * **Pending**: generation was requested and its result has not arrived.
//! * **Resident**: the chunk is stored and readable.
//!
//! Moving the reference point into a new chunk requests every absent chunk in
//! the load radius (nearest first) and evicts resident chunks beyond the
//! retain radius. The resident count is then capped by evicting least
//! recently used chunks. An evicted chunk goes back to Absent; requesting it
//! again regenerates identical terrain from the seed.
//!
//! The store never generates anything itself. Requested keys are queued and
//! drained by the owner through [`ChunkStore::take_generation_requests`];
//! results come back through [`ChunkStore::on_chunk_generated`].

use std::collections::{HashSet, VecDeque};

use cgmath::Point3;
use lru::LruCache;

use crate::{
    config::WorldConfig,
    error::WorldError,
    voxels::{
        block::block_type::BlockType,
        chunk::{sort_nearest_first, Chunk, ChunkBlocks, ChunkPos, WORLD_HEIGHT, WORLD_MIN_Y},
    },
};

/// Lifecycle state of one chunk key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Absent,
    Pending,
    Resident,
}

/// Counters describing the store, for logging and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub resident: usize,
    pub pending: usize,
    /// Pending keys not yet handed to the task manager.
    pub queued: usize,
    pub generated: u64,
    pub evicted: u64,
    /// Results that arrived for chunks no longer wanted.
    pub late_results: u64,
}

pub struct ChunkStore {
    /// Resident chunks, most recently used first.
    chunks: LruCache<ChunkPos, Chunk>,
    pending: HashSet<ChunkPos>,
    requests: VecDeque<ChunkPos>,
    reference: Option<ChunkPos>,
    load_radius: u32,
    render_radius: u32,
    retain_radius: u32,
    max_resident: usize,
    /// Logical clock advanced by every reference point change.
    tick: u64,
    generated: u64,
    evicted: u64,
    late_results: u64,
}

impl ChunkStore {
    pub fn new(config: &WorldConfig) -> Self {
        ChunkStore {
            chunks: LruCache::unbounded(),
            pending: HashSet::new(),
            requests: VecDeque::new(),
            reference: None,
            load_radius: config.load_radius,
            render_radius: config.render_radius,
            retain_radius: config.retain_radius,
            max_resident: config.max_resident_chunks,
            tick: 0,
            generated: 0,
            evicted: 0,
            late_results: 0,
        }
    }

    /// Chunk currently containing the reference point, if one was set.
    pub fn reference_chunk(&self) -> Option<ChunkPos> {
        self.reference
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Moves the reference point to the world position `(x, z)`.
    ///
    /// Does nothing and returns false while the point stays inside the same
    /// chunk. Otherwise requests the absent chunks of the load radius,
    /// refreshes the resident ones, evicts beyond the retain radius and
    /// enforces the resident limit.
    pub fn update_reference_point(&mut self, x: f64, z: f64) -> bool {
        let center = ChunkPos::from_world(x, z);
        if self.reference == Some(center) {
            return false;
        }
        self.reference = Some(center);
        self.tick += 1;

        let wanted = center.chunks_within(self.load_radius);

        // Touch farthest first so the nearest chunks end up most recently used.
        for pos in wanted.iter().rev() {
            if let Some(chunk) = self.chunks.get_mut(pos) {
                chunk.last_accessed = self.tick;
            }
        }

        // Requests that were never dispatched are dropped once out of range.
        let retain_radius = self.retain_radius;
        let pending = &mut self.pending;
        self.requests.retain(|pos| {
            let keep = pos.within_radius(center, retain_radius);
            if !keep {
                pending.remove(pos);
            }
            keep
        });

        let mut requested = 0;
        for pos in &wanted {
            if !self.chunks.contains(pos) && self.pending.insert(*pos) {
                self.requests.push_back(*pos);
                requested += 1;
            }
        }
        sort_nearest_first(self.requests.make_contiguous(), center);

        let outside: Vec<ChunkPos> = self
            .chunks
            .iter()
            .map(|(pos, _)| *pos)
            .filter(|pos| !pos.within_radius(center, self.retain_radius))
            .collect();
        for pos in outside {
            self.evict(pos);
        }
        self.evict_lru(self.max_resident);

        log::debug!(
            "Reference moved to chunk {center}: {requested} requested, {} resident, {} pending",
            self.chunks.len(),
            self.pending.len()
        );
        true
    }

    /// Takes up to `limit` keys waiting to be handed to a generator, nearest
    /// first. They stay pending until their result arrives; the rest stay
    /// queued here, where a later move can still drop or reorder them.
    pub fn take_generation_requests(&mut self, limit: usize) -> Vec<ChunkPos> {
        let count = limit.min(self.requests.len());
        self.requests.drain(..count).collect()
    }

    /// Pending keys not yet taken by [`ChunkStore::take_generation_requests`].
    pub fn queued_count(&self) -> usize {
        self.requests.len()
    }

    /// Queues every pending key for generation again. Used when generation
    /// work was lost, so no key stays pending forever.
    pub fn requeue_pending(&mut self) -> usize {
        let queued: HashSet<ChunkPos> = self.requests.iter().copied().collect();
        let mut requeued = 0;
        for pos in &self.pending {
            if !queued.contains(pos) {
                self.requests.push_back(*pos);
                requeued += 1;
            }
        }
        if let Some(center) = self.reference {
            sort_nearest_first(self.requests.make_contiguous(), center);
        }
        requeued
    }

    /// Stores a generated chunk.
    ///
    /// A result for a key that is already resident is ignored. A result for
    /// a key outside the retain radius is stored and evicted at once.
    pub fn on_chunk_generated(&mut self, pos: ChunkPos, blocks: ChunkBlocks) {
        let was_pending = self.pending.remove(&pos);
        if self.chunks.contains(&pos) {
            log::warn!("Ignoring duplicate generation result for resident chunk {pos}");
            return;
        }

        self.chunks.put(pos, Chunk::new(pos, blocks, self.tick));
        self.generated += 1;

        let wanted = self
            .reference
            .map_or(true, |center| pos.within_radius(center, self.retain_radius));
        if !wanted {
            log::warn!("Chunk {pos} arrived after leaving the retain radius, evicting");
            self.late_results += 1;
            self.evict(pos);
            return;
        }
        if !was_pending {
            log::warn!("Chunk {pos} arrived without being requested");
        }

        log::debug!("Chunk {pos} is resident");
        self.evict_lru(self.max_resident);
    }

    fn evict(&mut self, pos: ChunkPos) -> bool {
        if self.chunks.pop(&pos).is_some() {
            log::trace!("Evicted chunk {pos}");
            self.evicted += 1;
            true
        } else {
            false
        }
    }

    /// Evicts least recently used chunks until at most `limit` remain.
    /// Returns the evicted keys, oldest first.
    pub fn evict_lru(&mut self, limit: usize) -> Vec<ChunkPos> {
        let mut evicted = Vec::new();
        while self.chunks.len() > limit {
            let Some((pos, chunk)) = self.chunks.pop_lru() else {
                break;
            };
            log::trace!("Evicted chunk {pos} (last accessed at tick {})", chunk.last_accessed);
            self.evicted += 1;
            evicted.push(pos);
        }
        evicted
    }

    pub fn chunk_state(&self, pos: ChunkPos) -> ChunkState {
        if self.chunks.contains(&pos) {
            ChunkState::Resident
        } else if self.pending.contains(&pos) {
            ChunkState::Pending
        } else {
            ChunkState::Absent
        }
    }

    /// Resident chunk at `pos`. Does not count as a use.
    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.peek(&pos)
    }

    /// Block at a world coordinate: `None` when its chunk is not resident,
    /// air for anything not stored.
    pub fn get_block(&self, pos: Point3<i32>) -> Option<BlockType> {
        self.chunks
            .peek(&ChunkPos::from_block(pos))
            .map(|chunk| chunk.get(pos))
    }

    /// Writes a block into a resident chunk and returns the previous block.
    /// Writing air removes the stored entry.
    pub fn set_block(&mut self, pos: Point3<i32>, block: BlockType) -> Result<BlockType, WorldError> {
        if !(WORLD_MIN_Y..WORLD_HEIGHT).contains(&pos.y) {
            return Err(WorldError::OutOfBuildRange { y: pos.y });
        }
        let key = ChunkPos::from_block(pos);
        let tick = self.tick;
        let chunk = self
            .chunks
            .get_mut(&key)
            .ok_or(WorldError::ChunkNotResident { pos: key })?;
        chunk.last_accessed = tick;
        chunk
            .set(pos, block)
            .ok_or(WorldError::ChunkNotResident { pos: key })
    }

    /// Resident chunks within the render radius of `(x, z)`, nearest first.
    pub fn visible_chunks(&self, x: f64, z: f64) -> Vec<&Chunk> {
        let center = ChunkPos::from_world(x, z);
        let mut positions: Vec<ChunkPos> = self
            .chunks
            .iter()
            .map(|(pos, _)| *pos)
            .filter(|pos| pos.within_radius(center, self.render_radius))
            .collect();
        sort_nearest_first(&mut positions, center);
        positions
            .iter()
            .filter_map(|pos| self.chunks.peek(pos))
            .collect()
    }

    /// Keys of chunks changed since the last call, clearing their dirty flag.
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkPos> {
        let mut dirty = Vec::new();
        for (pos, chunk) in self.chunks.iter_mut() {
            if chunk.dirty {
                chunk.dirty = false;
                dirty.push(*pos);
            }
        }
        match self.reference {
            Some(center) => sort_nearest_first(&mut dirty, center),
            None => dirty.sort(),
        }
        dirty
    }

    /// Keys of all resident chunks, nearest to the reference first.
    pub fn resident_positions(&self) -> Vec<ChunkPos> {
        let mut positions: Vec<ChunkPos> = self.chunks.iter().map(|(pos, _)| *pos).collect();
        match self.reference {
            Some(center) => sort_nearest_first(&mut positions, center),
            None => positions.sort(),
        }
        positions
    }

    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> ChunkStats {
        ChunkStats {
            resident: self.chunks.len(),
            pending: self.pending.len(),
            queued: self.requests.len(),
            generated: self.generated,
            evicted: self.evicted,
            late_results: self.late_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::terrain::TerrainGenerator;

    fn config(load: u32, retain: u32, limit: usize) -> WorldConfig {
        WorldConfig {
            seed: Some(1),
            load_radius: load,
            render_radius: load.min(1),
            retain_radius: retain,
            max_resident_chunks: limit,
            ..Default::default()
        }
    }

    /// Answers every outstanding request with a flat chunk.
    fn fulfil(store: &mut ChunkStore) {
        for pos in store.take_generation_requests(usize::MAX) {
            store.on_chunk_generated(pos, TerrainGenerator::flat_chunk(pos));
        }
    }

    #[test]
    fn moving_within_a_chunk_is_a_no_op() {
        let mut store = ChunkStore::new(&config(1, 2, 64));
        assert!(store.update_reference_point(0.5, 0.5));
        assert!(!store.update_reference_point(15.9, 3.0));
        assert_eq!(store.take_generation_requests(usize::MAX).len(), 5);
        assert!(store.take_generation_requests(usize::MAX).is_empty());
    }

    #[test]
    fn requests_are_nearest_first_and_pending() {
        let mut store = ChunkStore::new(&config(2, 3, 64));
        store.update_reference_point(0.0, 0.0);
        let requests = store.take_generation_requests(usize::MAX);
        assert_eq!(requests[0], ChunkPos::new(0, 0));
        assert_eq!(requests[1], ChunkPos::new(-1, 0));
        assert!(requests
            .iter()
            .all(|pos| store.chunk_state(*pos) == ChunkState::Pending));

        store.on_chunk_generated(requests[0], TerrainGenerator::flat_chunk(requests[0]));
        assert_eq!(store.chunk_state(requests[0]), ChunkState::Resident);
        assert_eq!(store.chunk_state(ChunkPos::new(9, 9)), ChunkState::Absent);
    }

    #[test]
    fn duplicate_results_are_ignored() {
        let mut store = ChunkStore::new(&config(0, 1, 64));
        store.update_reference_point(0.0, 0.0);
        fulfil(&mut store);
        let pos = ChunkPos::new(0, 0);
        let marker = Point3::new(1, 50, 1);
        store.set_block(marker, BlockType::Glowstone).unwrap();

        store.on_chunk_generated(pos, ChunkBlocks::new());
        assert_eq!(store.get_block(marker), Some(BlockType::Glowstone));
        assert_eq!(store.stats().generated, 1);
    }

    #[test]
    fn late_results_are_stored_then_evicted() {
        let mut store = ChunkStore::new(&config(1, 1, 64));
        store.update_reference_point(0.0, 0.0);
        let requests = store.take_generation_requests(usize::MAX);
        store.update_reference_point(100.0 * 16.0, 0.0);

        for pos in requests {
            store.on_chunk_generated(pos, TerrainGenerator::flat_chunk(pos));
            assert_eq!(store.chunk_state(pos), ChunkState::Absent);
        }
        assert_eq!(store.stats().late_results, 5);
        assert_eq!(store.stats().generated, 5);
    }

    #[test]
    fn undispatched_requests_are_dropped_when_out_of_range() {
        let mut store = ChunkStore::new(&config(1, 1, 64));
        store.update_reference_point(0.0, 0.0);
        store.update_reference_point(100.0 * 16.0, 0.0);
        let requests = store.take_generation_requests(usize::MAX);
        assert_eq!(requests.len(), 5);
        assert!(requests.iter().all(|pos| pos.x >= 99));
        assert_eq!(store.pending_count(), 5);
    }

    #[test]
    fn limited_takes_leave_the_rest_queued() {
        let mut store = ChunkStore::new(&config(2, 3, 64));
        store.update_reference_point(0.0, 0.0);
        let first = store.take_generation_requests(3);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0], ChunkPos::new(0, 0));
        assert_eq!(store.queued_count(), 10);
        assert_eq!(store.pending_count(), 13);

        // Far move: the queued keys are dropped, the taken ones stay pending.
        store.update_reference_point(100.0 * 16.0, 0.0);
        assert_eq!(store.pending_count(), 3 + 13);
        let next = store.take_generation_requests(1);
        assert_eq!(next, vec![ChunkPos::new(100, 0)]);
    }

    #[test]
    fn lru_evicts_least_recently_accessed_first() {
        let mut store = ChunkStore::new(&config(0, 100, 3));
        for x in 0..3 {
            store.update_reference_point(x as f64 * 16.0, 0.0);
            fulfil(&mut store);
        }
        // Revisit chunk 0 so chunk 1 becomes the oldest.
        store.update_reference_point(0.0, 0.0);
        store.update_reference_point(3.0 * 16.0, 0.0);
        fulfil(&mut store);

        assert_eq!(store.resident_count(), 3);
        assert_eq!(store.chunk_state(ChunkPos::new(1, 0)), ChunkState::Absent);
        assert_eq!(store.chunk_state(ChunkPos::new(0, 0)), ChunkState::Resident);

        let evicted = store.evict_lru(1);
        assert_eq!(evicted, vec![ChunkPos::new(2, 0), ChunkPos::new(0, 0)]);
        assert_eq!(store.resident_positions(), vec![ChunkPos::new(3, 0)]);
    }

    #[test]
    fn block_access_requires_a_resident_chunk() {
        let mut store = ChunkStore::new(&config(0, 1, 64));
        let pos = Point3::new(3, 40, 3);
        assert_eq!(store.get_block(pos), None);
        assert_eq!(
            store.set_block(pos, BlockType::Stone),
            Err(WorldError::ChunkNotResident {
                pos: ChunkPos::new(0, 0)
            })
        );

        store.update_reference_point(0.0, 0.0);
        fulfil(&mut store);
        assert_eq!(store.get_block(pos), Some(BlockType::Air));
        assert_eq!(store.set_block(pos, BlockType::Stone), Ok(BlockType::Air));
        assert_eq!(store.set_block(pos, BlockType::Air), Ok(BlockType::Stone));
        assert_eq!(store.get_block(pos), Some(BlockType::Air));
        assert_eq!(
            store.set_block(Point3::new(3, WORLD_HEIGHT, 3), BlockType::Stone),
            Err(WorldError::OutOfBuildRange { y: WORLD_HEIGHT })
        );
    }

    #[test]
    fn dirty_chunks_are_reported_once() {
        let mut store = ChunkStore::new(&config(1, 2, 64));
        store.update_reference_point(0.0, 0.0);
        fulfil(&mut store);
        assert_eq!(store.take_dirty_chunks().len(), 5);
        assert!(store.take_dirty_chunks().is_empty());

        store.set_block(Point3::new(-1, 60, 0), BlockType::Torch).unwrap();
        assert_eq!(store.take_dirty_chunks(), vec![ChunkPos::new(-1, 0)]);
    }

    #[test]
    fn visible_chunks_respect_the_render_radius() {
        let mut store = ChunkStore::new(&config(2, 3, 64));
        store.update_reference_point(0.0, 0.0);
        fulfil(&mut store);
        let visible: Vec<ChunkPos> = store
            .visible_chunks(0.0, 0.0)
            .iter()
            .map(|chunk| chunk.position)
            .collect();
        assert_eq!(
            visible,
            vec![
                ChunkPos::new(0, 0),
                ChunkPos::new(-1, 0),
                ChunkPos::new(0, -1),
                ChunkPos::new(0, 1),
                ChunkPos::new(1, 0),
            ]
        );
    }
}
