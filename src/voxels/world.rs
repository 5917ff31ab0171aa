//! # World Module
//!
//! This module provides the `World` struct, the single entry point of the
//! crate. It ties the chunk store to the terrain generator and the task
//! manager, and layers the gameplay rules (placement restrictions, tool
//! requirements, drops) over raw block access.
//!
//! ## Frame Loop
//!
//! ```no_run
//! use voxel_world::{World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::with_seed(42)).unwrap();
//! world.update_reference_point(0.0, 0.0);
//! world.flush_generation();
//! loop {
//!     // Move the player, then:
//!     world.update_reference_point(8.0, 8.0);
//!     world.process_tasks();
//!     for chunk in world.visible_chunks(8.0, 8.0) {
//!         // Render the chunk...
//!     }
//! #   break;
//! }
//! ```

use std::sync::Arc;

use cgmath::Point3;

use crate::{
    config::WorldConfig,
    error::{ConfigError, WorldError},
    generation::{noise::WorldSeed, terrain::TerrainGenerator},
    task_management::TaskManager,
    voxels::{
        block::{block_type::BlockType, compute_drops, tool::Tool, ItemDrop},
        chunk::{Chunk, ChunkPos, WORLD_HEIGHT, WORLD_MIN_Y},
        chunk_store::{ChunkState, ChunkStats, ChunkStore},
        tasks::chunk_generation_task::ChunkGenerationTask,
    },
};

/// A streamed voxel world around one moving reference point.
pub struct World {
    config: WorldConfig,
    generator: Arc<TerrainGenerator>,
    store: ChunkStore,
    task_manager: TaskManager,
}

impl World {
    /// Validates `config` and creates an empty world. Nothing is generated
    /// until the reference point is set.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.resolve_seed();
        let generator = Arc::new(TerrainGenerator::new(seed, config.detail, config.noise));
        let store = ChunkStore::new(&config);
        let task_manager = TaskManager::new(config.worker_threads);

        log::info!(
            "Created world with seed {} (detail {:?}, noise {:?}, {} workers)",
            seed.value(),
            config.detail,
            config.noise,
            task_manager.worker_count()
        );

        Ok(World {
            config,
            generator,
            store,
            task_manager,
        })
    }

    pub fn seed(&self) -> WorldSeed {
        self.generator.seed()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Moves the reference point and dispatches generation for newly wanted
    /// chunks. Returns false when the point stayed in the same chunk.
    pub fn update_reference_point(&mut self, x: f64, z: f64) -> bool {
        let moved = self.store.update_reference_point(x, z);
        if moved {
            self.dispatch_requests();
        }
        moved
    }

    /// Hands the nearest queued requests to the task manager, only as many as
    /// it can start now. The rest stay in the store.
    fn dispatch_requests(&mut self) {
        self.task_manager.process_queued_tasks();
        let capacity = self.task_manager.available_capacity();
        for pos in self.store.take_generation_requests(capacity) {
            let task = ChunkGenerationTask::new(Arc::clone(&self.generator), pos);
            self.task_manager.publish_task(Box::new(task));
        }
    }

    /// Applies finished generation results and feeds queued work to idle
    /// workers. Never blocks. Returns the number of chunks applied.
    pub fn process_tasks(&mut self) -> usize {
        self.dispatch_requests();
        let applied = self.task_manager.process_completed_tasks(&mut self.store);
        if self.task_manager.worker_count() > 0 {
            self.dispatch_requests();
        }
        applied
    }

    /// Blocks until no chunk is pending.
    pub fn flush_generation(&mut self) {
        loop {
            self.process_tasks();
            if self.store.pending_count() == 0 {
                return;
            }
            if self.task_manager.is_idle() {
                if self.store.queued_count() > 0 {
                    continue;
                }
                let requeued = self.store.requeue_pending();
                log::warn!("Requeueing {requeued} chunks whose generation was lost");
                continue;
            }
            self.task_manager.wait_for_result(&mut self.store);
        }
    }

    pub fn chunk_state(&self, pos: ChunkPos) -> ChunkState {
        self.store.chunk_state(pos)
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.store.chunk(pos)
    }

    /// Block at `pos`, `None` when its chunk is not resident.
    pub fn get_block(&self, pos: Point3<i32>) -> Option<BlockType> {
        self.store.get_block(pos)
    }

    /// Block at `pos`, treating non-resident chunks as air.
    pub fn block_at(&self, pos: Point3<i32>) -> BlockType {
        self.get_block(pos).unwrap_or(BlockType::Air)
    }

    pub fn is_solid_at(&self, pos: Point3<i32>) -> bool {
        self.block_at(pos).is_solid()
    }

    /// Writes a block with no gameplay checks and returns the previous one.
    pub fn set_block(&mut self, pos: Point3<i32>, block: BlockType) -> Result<BlockType, WorldError> {
        self.store.set_block(pos, block)
    }

    /// Places a block the way a player would: the target must be replaceable
    /// and the block's placement restrictions must hold.
    pub fn place_block(&mut self, pos: Point3<i32>, block: BlockType) -> Result<(), WorldError> {
        if !(WORLD_MIN_Y..WORLD_HEIGHT).contains(&pos.y) {
            return Err(WorldError::OutOfBuildRange { y: pos.y });
        }
        let occupant = self
            .get_block(pos)
            .ok_or(WorldError::ChunkNotResident {
                pos: ChunkPos::from_block(pos),
            })?;
        if !occupant.is_replaceable() {
            return Err(WorldError::Occupied {
                pos,
                block,
                occupant,
            });
        }

        let restrictions = block.placement_restrictions();
        let restricted = |reason| WorldError::PlacementRestricted { pos, block, reason };
        let below = Point3::new(pos.x, pos.y - 1, pos.z);
        let above = Point3::new(pos.x, pos.y + 1, pos.z);
        if restrictions.must_be_on_solid && !self.is_solid_at(below) {
            return Err(restricted("needs solid ground below"));
        }
        if restrictions.cannot_be_underwater
            && (occupant.is_liquid() || self.block_at(above).is_liquid())
        {
            return Err(restricted("cannot be placed underwater"));
        }
        if restrictions.cannot_be_next_to_solid
            && HORIZONTAL_NEIGHBOURS
                .iter()
                .any(|(dx, dz)| self.is_solid_at(Point3::new(pos.x + dx, pos.y, pos.z + dz)))
        {
            return Err(restricted("cannot touch a solid block"));
        }

        self.set_block(pos, block)?;
        Ok(())
    }

    /// Mines the block at `pos` and returns what it drops.
    pub fn mine_block(
        &mut self,
        pos: Point3<i32>,
        tool: Option<Tool>,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<ItemDrop>, WorldError> {
        let block = self
            .get_block(pos)
            .ok_or(WorldError::ChunkNotResident {
                pos: ChunkPos::from_block(pos),
            })?;
        if block.is_air() || block.is_liquid() {
            return Err(WorldError::NothingToMine { pos });
        }
        if block.is_unmineable() {
            return Err(WorldError::Unmineable { block });
        }
        if let Some(requirement) = block.required_tool() {
            if !requirement.is_met_by(tool) {
                return Err(WorldError::ToolRequired { block, requirement });
            }
        }

        self.set_block(pos, BlockType::Air)?;
        Ok(compute_drops(block, rng))
    }

    /// Seconds needed to mine the block at `pos`, `None` when it cannot be
    /// mined with `tool` or its chunk is not resident.
    pub fn mining_time(&self, pos: Point3<i32>, tool: Option<Tool>) -> Option<f64> {
        let block = self.get_block(pos)?;
        if block.is_air() || block.is_liquid() {
            return None;
        }
        block.mining_time(tool)
    }

    /// Resident chunks within the render radius of `(x, z)`, nearest first.
    pub fn visible_chunks(&self, x: f64, z: f64) -> Vec<&Chunk> {
        self.store.visible_chunks(x, z)
    }

    /// Chunks changed since the last call, for the renderer to rebuild.
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkPos> {
        self.store.take_dirty_chunks()
    }

    pub fn stats(&self) -> ChunkStats {
        self.store.stats()
    }

    /// Highest solid block of a resident column, if any.
    pub fn top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        self.store
            .chunk(ChunkPos::from_block(Point3::new(x, 0, z)))
            .and_then(|chunk| chunk.top_solid_y(x, z))
    }
}

const HORIZONTAL_NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generation::terrain::FLAT_HEIGHT,
        voxels::block::tool::{ToolKind, ToolTier},
    };

    /// A world whose only chunk is a flat platform at the origin.
    fn flat_world() -> World {
        let config = WorldConfig {
            seed: Some(1),
            load_radius: 0,
            render_radius: 0,
            retain_radius: 1,
            ..Default::default()
        };
        let mut world = World::new(config).unwrap();
        world.store.update_reference_point(0.0, 0.0);
        for pos in world.store.take_generation_requests(usize::MAX) {
            world
                .store
                .on_chunk_generated(pos, TerrainGenerator::flat_chunk(pos));
        }
        world
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = WorldConfig {
            render_radius: 9,
            ..Default::default()
        };
        assert!(matches!(World::new(config), Err(ConfigError::InvalidRadii { .. })));
    }

    #[test]
    fn placement_checks_occupancy_and_restrictions() {
        let mut world = flat_world();
        let ground = Point3::new(4, FLAT_HEIGHT, 4);
        let above = Point3::new(4, FLAT_HEIGHT + 1, 4);

        assert_eq!(
            world.place_block(ground, BlockType::Stone),
            Err(WorldError::Occupied {
                pos: ground,
                block: BlockType::Stone,
                occupant: BlockType::Grass
            })
        );

        let floating = Point3::new(4, FLAT_HEIGHT + 5, 4);
        assert!(matches!(
            world.place_block(floating, BlockType::Flower),
            Err(WorldError::PlacementRestricted { .. })
        ));

        world.place_block(above, BlockType::Flower).unwrap();
        assert_eq!(world.get_block(above), Some(BlockType::Flower));

        world.set_block(Point3::new(8, FLAT_HEIGHT + 1, 8), BlockType::Stone).unwrap();
        assert!(matches!(
            world.place_block(Point3::new(9, FLAT_HEIGHT + 1, 8), BlockType::Cactus),
            Err(WorldError::PlacementRestricted { .. })
        ));

        assert_eq!(
            world.place_block(Point3::new(100, 40, 0), BlockType::Stone),
            Err(WorldError::ChunkNotResident {
                pos: ChunkPos::new(6, 0)
            })
        );
    }

    #[test]
    fn mining_enforces_tools_and_returns_drops() {
        let mut world = flat_world();
        let mut rng = fastrand::Rng::with_seed(9);
        let dirt = Point3::new(2, FLAT_HEIGHT - 1, 2);
        let stone = Point3::new(2, FLAT_HEIGHT + 1, 2);
        world.set_block(stone, BlockType::Stone).unwrap();

        assert!(matches!(
            world.mine_block(stone, None, &mut rng),
            Err(WorldError::ToolRequired { block: BlockType::Stone, .. })
        ));
        let pickaxe = Tool::new(ToolKind::Pickaxe, ToolTier::Wood);
        assert_eq!(
            world.mine_block(stone, Some(pickaxe), &mut rng),
            Ok(vec![ItemDrop {
                block: BlockType::Stone,
                count: 1
            }])
        );
        assert_eq!(world.get_block(stone), Some(BlockType::Air));

        assert!(world.mining_time(dirt, None).is_some());
        world.mine_block(dirt, None, &mut rng).unwrap();
        assert_eq!(
            world.mine_block(dirt, None, &mut rng),
            Err(WorldError::NothingToMine { pos: dirt })
        );

        let bedrock = Point3::new(2, 0, 2);
        assert_eq!(
            world.mine_block(bedrock, Some(pickaxe), &mut rng),
            Err(WorldError::Unmineable {
                block: BlockType::Bedrock
            })
        );
        assert_eq!(world.mining_time(bedrock, Some(pickaxe)), None);
    }

    #[test]
    fn surface_queries_follow_edits() {
        let mut world = flat_world();
        assert_eq!(world.top_solid_y(5, 5), Some(FLAT_HEIGHT));
        world.set_block(Point3::new(5, 70, 5), BlockType::Planks).unwrap();
        assert_eq!(world.top_solid_y(5, 5), Some(70));
        assert!(world.is_solid_at(Point3::new(5, 70, 5)));
        assert_eq!(world.block_at(Point3::new(500, 10, 500)), BlockType::Air);
    }
}
