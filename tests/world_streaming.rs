use cgmath::Point3;
use voxel_world::{
    task_management::INLINE_TASKS_PER_PASS, BlockType, ChunkPos, ChunkState, GenerationDetail,
    World, WorldConfig, CHUNK_SIZE,
};

fn config(seed: u64, load: u32, retain: u32) -> WorldConfig {
    WorldConfig {
        seed: Some(seed),
        load_radius: load,
        render_radius: load.min(2),
        retain_radius: retain,
        ..Default::default()
    }
}

/// World x/z at the centre of chunk `(cx, cz)`.
fn chunk_center(cx: i32, cz: i32) -> (f64, f64) {
    let size = CHUNK_SIZE as f64;
    (cx as f64 * size + size / 2.0, cz as f64 * size + size / 2.0)
}

fn move_to_chunk(world: &mut World, cx: i32, cz: i32) {
    let (x, z) = chunk_center(cx, cz);
    world.update_reference_point(x, z);
    world.flush_generation();
}

#[test]
fn seed_42_spawn_column_is_capped_and_reproducible() {
    let mut world = World::new(config(42, 1, 2)).unwrap();
    move_to_chunk(&mut world, 0, 0);

    let height = world.generator().surface_height(0, 0).unwrap();
    let biome = world.generator().biome_at(0, 0);
    let cap = world.get_block(Point3::new(0, height, 0)).unwrap();
    assert!(cap != BlockType::Air && cap != BlockType::Water);
    if !biome.is_wetland() {
        assert!(
            matches!(cap, BlockType::Grass | BlockType::Sand | BlockType::Snow),
            "{biome:?} spawn capped with {cap}"
        );
    }
    let original = world.chunk(ChunkPos::new(0, 0)).unwrap().blocks().clone();

    move_to_chunk(&mut world, 1000, 0);
    assert_eq!(world.chunk_state(ChunkPos::new(0, 0)), ChunkState::Absent);

    move_to_chunk(&mut world, 0, 0);
    assert_eq!(world.generator().surface_height(0, 0).unwrap(), height);
    assert_eq!(world.get_block(Point3::new(0, height, 0)), Some(cap));
    assert_eq!(world.chunk(ChunkPos::new(0, 0)).unwrap().blocks(), &original);
}

#[test]
fn moving_ten_chunks_east_evicts_beyond_the_retain_radius() {
    let mut world = World::new(WorldConfig {
        detail: GenerationDetail::Minimal,
        ..config(7, 6, 8)
    })
    .unwrap();
    move_to_chunk(&mut world, 0, 0);
    let loaded = ChunkPos::new(0, 0).chunks_within(6);
    assert_eq!(world.stats().resident, loaded.len());

    move_to_chunk(&mut world, 10, 0);
    let center = ChunkPos::new(10, 0);
    for pos in world.store().resident_positions() {
        assert!(pos.within_radius(center, 8), "{pos} should have been evicted");
    }
    for pos in center.chunks_within(6) {
        assert_eq!(world.chunk_state(pos), ChunkState::Resident, "{pos} missing");
    }
    // Loaded from the origin and still inside the retain radius.
    assert_eq!(world.chunk_state(ChunkPos::new(2, 0)), ChunkState::Resident);
    assert_eq!(world.chunk_state(ChunkPos::new(3, 0)), ChunkState::Resident);
    assert_eq!(world.chunk_state(ChunkPos::new(1, 0)), ChunkState::Absent);
    assert_eq!(world.chunk_state(ChunkPos::new(0, 0)), ChunkState::Absent);
    assert_eq!(world.stats().pending, 0);
}

#[test]
fn resident_limit_holds_while_walking() {
    let mut world = World::new(WorldConfig {
        max_resident_chunks: 20,
        detail: GenerationDetail::Minimal,
        ..config(11, 2, 10)
    })
    .unwrap();
    for cx in 0..12 {
        move_to_chunk(&mut world, cx, 0);
        assert!(world.stats().resident <= 20);
        for pos in ChunkPos::new(cx, 0).chunks_within(2) {
            assert_eq!(world.chunk_state(pos), ChunkState::Resident);
        }
    }
    assert!(world.stats().evicted > 0);
}

#[test]
fn chunks_only_hold_their_own_blocks() {
    let mut world = World::new(config(3, 2, 3)).unwrap();
    move_to_chunk(&mut world, -1, 1);
    for pos in world.store().resident_positions() {
        let chunk = world.chunk(pos).unwrap();
        assert!(!chunk.is_empty());
        for (key, block) in chunk.blocks() {
            assert_eq!(ChunkPos::from_block(*key), pos);
            assert!(!block.is_air());
        }
    }

    let sky = Point3::new(-10, 95, 20);
    assert_eq!(world.get_block(sky), Some(BlockType::Air));
    assert_eq!(world.get_block(Point3::new(10_000, 10, 0)), None);
}

#[test]
fn worker_threads_generate_the_same_terrain() {
    let mut inline = World::new(config(21, 2, 3)).unwrap();
    let mut threaded = World::new(WorldConfig {
        worker_threads: 2,
        ..config(21, 2, 3)
    })
    .unwrap();
    move_to_chunk(&mut inline, 4, -4);
    move_to_chunk(&mut threaded, 4, -4);

    let positions = inline.store().resident_positions();
    assert_eq!(positions.len(), 13);
    assert_eq!(threaded.store().resident_positions(), positions);
    for pos in positions {
        assert_eq!(
            inline.chunk(pos).unwrap().blocks(),
            threaded.chunk(pos).unwrap().blocks()
        );
    }
}

#[test]
fn edits_are_dirty_and_lost_on_regeneration() {
    let mut world = World::new(config(5, 1, 1)).unwrap();
    move_to_chunk(&mut world, 0, 0);
    assert_eq!(world.take_dirty_chunks().len(), 5);

    let pos = Point3::new(3, 90, 3);
    assert_eq!(world.set_block(pos, BlockType::Glowstone), Ok(BlockType::Air));
    assert_eq!(world.take_dirty_chunks(), vec![ChunkPos::new(0, 0)]);

    move_to_chunk(&mut world, 50, 0);
    move_to_chunk(&mut world, 0, 0);
    assert_eq!(world.get_block(pos), Some(BlockType::Air));
}

#[test]
fn process_tasks_makes_progress_without_blocking() {
    let mut world = World::new(config(8, 1, 2)).unwrap();
    let (x, z) = chunk_center(0, 0);
    assert!(world.update_reference_point(x, z));
    assert!(!world.update_reference_point(x + 1.0, z));

    let mut rounds = 0;
    while world.stats().pending > 0 {
        world.process_tasks();
        rounds += 1;
        assert!(rounds < 100, "generation never finished");
    }
    assert_eq!(world.stats().resident, 5);
}

#[test]
fn far_move_generates_the_new_area_before_the_old_one() {
    let mut world = World::new(WorldConfig {
        detail: GenerationDetail::Minimal,
        ..config(13, 6, 8)
    })
    .unwrap();
    let (x, z) = chunk_center(0, 0);
    world.update_reference_point(x, z);
    let (x, z) = chunk_center(100, 0);
    world.update_reference_point(x, z);

    let center = ChunkPos::new(100, 0);
    let wanted = center.chunks_within(6);
    assert_eq!(world.stats().queued, wanted.len());

    let mut passes = 0;
    while world.chunk_state(center) != ChunkState::Resident {
        world.process_tasks();
        passes += 1;
        assert!(passes <= 2, "new centre still not generated");
    }
    // Only the work already handed out before the move is wasted.
    let late = world.stats().late_results;
    assert!(late <= INLINE_TASKS_PER_PASS as u64);

    world.flush_generation();
    assert_eq!(world.stats().late_results, late);
    for pos in wanted {
        assert_eq!(world.chunk_state(pos), ChunkState::Resident);
    }
    assert_eq!(world.chunk_state(ChunkPos::new(0, 0)), ChunkState::Absent);
}
