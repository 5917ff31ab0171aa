//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates the blocks of
//! one chunk off the owner thread. It is scheduled for every chunk the store
//! requests as the reference point moves through the world.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
    time::Duration,
};

use web_time::Instant;

use crate::{
    error::GenerationError,
    generation::terrain::TerrainGenerator,
    task_management::task::{Task, TaskResult},
    voxels::{
        chunk::{ChunkBlocks, ChunkPos},
        chunk_store::ChunkStore,
    },
};

/// A task that generates chunk data asynchronously.
///
/// A failed or panicking generation still produces a result: the flat
/// fallback chunk. The key therefore never stays pending.
pub struct ChunkGenerationTask {
    /// Shared, immutable generator for the world seed
    generator: Arc<TerrainGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkPos,
}

impl ChunkGenerationTask {
    pub fn new(generator: Arc<TerrainGenerator>, position: ChunkPos) -> Self {
        ChunkGenerationTask {
            generator,
            position,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let started = Instant::now();
        let position = self.position;

        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.generator.generate_chunk(position)));
        let (blocks, fallback) = blocks_or_fallback(position, outcome);

        Box::new(ChunkGenerationTaskResult {
            position,
            blocks,
            fallback,
            elapsed: started.elapsed(),
        })
    }
}

/// Unwraps a caught generation outcome. Errors and panics are logged and
/// replaced with the flat chunk; the flag is true when that happened.
fn blocks_or_fallback(
    position: ChunkPos,
    outcome: thread::Result<Result<ChunkBlocks, GenerationError>>,
) -> (ChunkBlocks, bool) {
    match outcome {
        Ok(Ok(blocks)) => (blocks, false),
        Ok(Err(err)) => {
            log::warn!("Generation of chunk {position} failed ({err}), using a flat chunk");
            (TerrainGenerator::flat_chunk(position), true)
        }
        Err(_) => {
            log::warn!("Generation of chunk {position} panicked, using a flat chunk");
            (TerrainGenerator::flat_chunk(position), true)
        }
    }
}

/// The generated blocks of one chunk, waiting to be stored.
pub struct ChunkGenerationTaskResult {
    position: ChunkPos,
    blocks: ChunkBlocks,
    fallback: bool,
    elapsed: Duration,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(self: Box<Self>, store: &mut ChunkStore) {
        log::debug!(
            "Chunk {} generated in {:?}{}",
            self.position,
            self.elapsed,
            if self.fallback { " (fallback)" } else { "" }
        );
        store.on_chunk_generated(self.position, self.blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::WorldConfig,
        generation::{noise::NoiseStrategy, noise::WorldSeed, GenerationDetail},
        voxels::chunk_store::ChunkState,
    };

    #[test]
    fn result_makes_the_chunk_resident() {
        let generator = Arc::new(TerrainGenerator::new(
            WorldSeed::new(3),
            GenerationDetail::Reduced,
            NoiseStrategy::Gradient,
        ));
        let mut store = ChunkStore::new(&WorldConfig::with_seed(3));
        store.update_reference_point(0.0, 0.0);
        let pos = ChunkPos::new(0, 0);

        let task = ChunkGenerationTask::new(Arc::clone(&generator), pos);
        task.process().handle_result(&mut store);

        assert_eq!(store.chunk_state(pos), ChunkState::Resident);
        let expected = generator.generate_chunk(pos).unwrap();
        assert_eq!(store.chunk(pos).map(|chunk| chunk.blocks()), Some(&expected));
    }

    #[test]
    fn errors_and_panics_fall_back_to_a_flat_resident_chunk() {
        let mut store = ChunkStore::new(&WorldConfig::with_seed(3));
        store.update_reference_point(0.0, 0.0);
        let requests = store.take_generation_requests(2);
        let (failed, panicked) = (requests[0], requests[1]);

        let error = Ok(Err(GenerationError::NonFiniteNoise { x: 0, z: 0 }));
        let panic = panic::catch_unwind(|| -> Result<ChunkBlocks, GenerationError> {
            panic!("noise exploded")
        });

        for (pos, outcome) in [(failed, error), (panicked, panic)] {
            assert_eq!(store.chunk_state(pos), ChunkState::Pending);
            let (blocks, fallback) = blocks_or_fallback(pos, outcome);
            assert!(fallback);
            assert_eq!(blocks, TerrainGenerator::flat_chunk(pos));

            Box::new(ChunkGenerationTaskResult {
                position: pos,
                blocks,
                fallback,
                elapsed: Duration::ZERO,
            })
            .handle_result(&mut store);
            assert_eq!(store.chunk_state(pos), ChunkState::Resident);
            let flat = TerrainGenerator::flat_chunk(pos);
            assert_eq!(store.chunk(pos).map(|chunk| chunk.blocks()), Some(&flat));
        }
    }
}
