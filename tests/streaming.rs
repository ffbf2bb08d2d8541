use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use cgmath::Point3;
use web_time::{Duration, Instant};

use voxel_world::core::config::{EngineConfig, GenerationMethod, MapConfig};
use voxel_world::core::spatial_key::{self, SpatialKey};
use voxel_world::engine_state::physics::PhysicsBackend;
use voxel_world::engine_state::rendering::{ChunkMesh, RenderBackend};
use voxel_world::engine_state::voxels::block::block_type::BlockType;
use voxel_world::engine_state::voxels::chunk::Chunk;
use voxel_world::engine_state::voxels::world::ChunkState;
use voxel_world::engine_state::voxels::world_map::WorldMap;
use voxel_world::engine_state::EngineState;

#[derive(Default)]
struct Calls {
    rendered: HashSet<SpatialKey>,
    render_updates: Vec<(SpatialKey, u64)>,
    collidable: HashSet<SpatialKey>,
    physics_updates: Vec<SpatialKey>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Calls>>);

impl Recorder {
    fn with<T>(&self, f: impl FnOnce(&mut Calls) -> T) -> T {
        f(&mut self.0.lock().unwrap())
    }
}

impl RenderBackend for Recorder {
    fn add_chunk(&mut self, mesh: &ChunkMesh) {
        self.with(|calls| assert!(calls.rendered.insert(mesh.key), "chunk added twice"));
    }

    fn update_chunk(&mut self, mesh: &ChunkMesh) {
        self.with(|calls| calls.render_updates.push((mesh.key, mesh.version)));
    }

    fn rem_chunk(&mut self, key: SpatialKey) {
        self.with(|calls| calls.rendered.remove(&key));
    }
}

impl PhysicsBackend for Recorder {
    fn add_chunk(&mut self, chunk: &Chunk) {
        self.with(|calls| assert!(calls.collidable.insert(chunk.key()), "collision added twice"));
    }

    fn update_chunk(&mut self, chunk: &Chunk) {
        self.with(|calls| calls.physics_updates.push(chunk.key()));
    }

    fn rem_chunk(&mut self, key: SpatialKey) {
        self.with(|calls| calls.collidable.remove(&key));
    }
}

fn config(generation: GenerationMethod) -> EngineConfig {
    EngineConfig {
        seed: 5,
        map: MapConfig {
            width: 4,
            height: 4,
            subdivisions: 4,
        },
        generation,
        view_radius: 2,
        active_radius: 1,
        worker_count: 3,
        ..Default::default()
    }
}

fn engine(generation: GenerationMethod) -> (EngineState, Recorder) {
    let recorder = Recorder::default();
    let engine = EngineState::new(
        config(generation),
        Box::new(recorder.clone()),
        Box::new(recorder.clone()),
    )
    .unwrap();
    (engine, recorder)
}

/// Updates at `position` until every chunk in view is loaded and meshed.
fn settle(engine: &mut EngineState, recorder: &Recorder, position: Point3<f32>) {
    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        engine.update(position);
        let rendered = recorder.with(|calls| calls.rendered.len());
        if engine.is_idle() && rendered == engine.world().loaded_positions().len() {
            engine.update(position);
            if engine.is_idle() {
                return;
            }
        }
        assert!(Instant::now() < deadline, "streaming never settled");
        thread::sleep(Duration::from_millis(2));
    }
}

fn view_sphere(center: Point3<i32>, radius: i32) -> HashSet<SpatialKey> {
    let mut keys = HashSet::new();
    for y in -radius..=radius {
        for z in -radius..=radius {
            for x in -radius..=radius {
                let p = Point3::new(center.x + x, center.y + y, center.z + z);
                if p.y >= 0 && x * x + y * y + z * z <= radius * radius {
                    keys.insert(spatial_key::key_of(p));
                }
            }
        }
    }
    keys
}

fn loaded_keys(engine: &EngineState) -> HashSet<SpatialKey> {
    engine
        .world()
        .loaded_positions()
        .into_iter()
        .map(spatial_key::key_of)
        .collect()
}

#[test]
fn streaming_converges_and_follows_the_viewpoint() {
    let (mut engine, recorder) = engine(GenerationMethod::Overworld);
    let start = Point3::new(40.0, 100.0, 40.0);
    engine.init(start).unwrap();
    settle(&mut engine, &recorder, start);

    let expected = view_sphere(Point3::new(1, 3, 1), 2);
    assert_eq!(loaded_keys(&engine), expected);
    assert_eq!(recorder.with(|calls| calls.rendered.clone()), expected);
    assert_eq!(
        recorder.with(|calls| calls.collidable.clone()),
        view_sphere(Point3::new(1, 3, 1), 1)
    );

    let moved = Point3::new(40.0 + 32.0 * 4.0, 100.0, 40.0);
    settle(&mut engine, &recorder, moved);

    let expected = view_sphere(Point3::new(5, 3, 1), 2);
    assert_eq!(loaded_keys(&engine), expected);
    assert_eq!(recorder.with(|calls| calls.rendered.clone()), expected);
    assert_eq!(engine.world().loading_count(), 0);
    assert_eq!(
        engine.world().chunk_state(Point3::new(1, 3, 1)),
        ChunkState::Unloaded
    );
}

#[test]
fn edits_remesh_one_chunk_through_the_workers() {
    let (mut engine, recorder) = engine(GenerationMethod::Solid);
    let position = Point3::new(5.0, 5.0, 5.0);
    engine.init(position).unwrap();
    settle(&mut engine, &recorder, position);

    assert!(engine.break_block(3, 3, 3));
    assert!(engine.place_block(4, 3, 3, BlockType::Chalk));
    settle(&mut engine, &recorder, position);

    let home = spatial_key::encode(0, 0, 0);
    let (updates, physics) =
        recorder.with(|calls| (calls.render_updates.clone(), calls.physics_updates.clone()));
    assert_eq!(physics, vec![home, home]);
    assert!(updates.iter().all(|&(key, _)| key == home));
    assert_eq!(updates.last(), Some(&(home, 2)));
    assert_eq!(engine.world().get_block(3, 3, 3), Some(0));
    assert_eq!(engine.world().get_block(4, 3, 3), Some(BlockType::Chalk.code()));
}

#[test]
fn same_seed_generates_the_same_chunks() {
    let (mut a, recorder_a) = engine(GenerationMethod::Overworld);
    let (mut b, recorder_b) = engine(GenerationMethod::Overworld);
    let position = Point3::new(40.0, 100.0, 40.0);
    settle(&mut a, &recorder_a, position);
    settle(&mut b, &recorder_b, position);

    for p in a.world().loaded_positions() {
        let voxels =
            |engine: &EngineState| engine.world().chunk(p).map(|chunk| chunk.serialize().data);
        assert_eq!(voxels(&a), voxels(&b));
    }
}

#[test]
fn restored_map_rebuilds_an_identical_world() {
    let (mut original, recorder) = engine(GenerationMethod::Overworld);
    let position = Point3::new(40.0, 100.0, 40.0);
    settle(&mut original, &recorder, position);

    let path =
        std::env::temp_dir().join(format!("voxel-world-restore-{}.json", std::process::id()));
    original.save_map(&path).unwrap();
    let map = WorldMap::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let recorder_restored = Recorder::default();
    let mut restored = EngineState::with_map(
        config(GenerationMethod::Overworld),
        map,
        Box::new(recorder_restored.clone()),
        Box::new(recorder_restored.clone()),
    )
    .unwrap();
    settle(&mut restored, &recorder_restored, position);

    for p in original.world().loaded_positions() {
        let a = original.world().chunk(p).unwrap();
        let b = restored.world().chunk(p).unwrap();
        assert_eq!(a.serialize().data, b.serialize().data);
        assert_eq!(a.object_count(), b.object_count());
    }
}

#[test]
fn restored_map_keeps_its_own_seed_under_a_different_config() {
    let (mut original, recorder) = engine(GenerationMethod::Perlin);
    let position = Point3::new(40.0, 40.0, 40.0);
    settle(&mut original, &recorder, position);

    let data = original.world().map().serialize();
    let map = WorldMap::deserialize(data).unwrap();
    let config = EngineConfig {
        seed: 1,
        ..config(GenerationMethod::Perlin)
    };

    let recorder_restored = Recorder::default();
    let mut restored = EngineState::with_map(
        config,
        map,
        Box::new(recorder_restored.clone()),
        Box::new(recorder_restored.clone()),
    )
    .unwrap();
    settle(&mut restored, &recorder_restored, position);

    let positions = original.world().loaded_positions();
    assert!(!positions.is_empty());
    for p in positions {
        let a = original.world().chunk(p).unwrap().serialize();
        let b = restored.world().chunk(p).unwrap().serialize();
        assert_eq!(a.data, b.data, "voxels differ at {p:?}");
        let kinds = |data: &voxel_world::engine_state::voxels::chunk::ChunkData| {
            data.objects
                .iter()
                .map(|(kind, placements)| {
                    let spots: Vec<_> = placements.iter().map(|o| (o.x, o.y, o.z)).collect();
                    (*kind, spots)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(kinds(&a), kinds(&b), "doodads differ at {p:?}");
    }
}
