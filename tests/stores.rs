use glam::Vec2;
use sparse_ecs::prelude::*;
use sparse_ecs::storage::BLOCK;

#[test]
fn test_values_across_block_boundaries() -> Result<()> {
    let mut world = World::new();
    let pos = world.register_component(XyStore::new());
    let hp = world.register_component(IntStore::new());

    // spans three blocks
    let count = 2 * BLOCK as u32 + 10;
    for i in 0..count {
        let mut e = world.create(false)?;
        let id = e.id();
        e.add(&pos)?.add(&hp)?;
        e.store_mut(&pos).set(id, i as f32, -(i as f32));
        e.store_mut(&hp).set(id, i as i32 * 2);
    }

    for id in [0, BLOCK as u32 - 1, BLOCK as u32, count - 1] {
        assert_eq!(world.store(&pos).get(id), Vec2::new(id as f32, -(id as f32)));
        assert_eq!(world.store(&hp).get(id), id as i32 * 2);
    }
    Ok(())
}

#[test]
fn test_restore_far_id_allocates_its_block() -> Result<()> {
    let mut world = World::new();
    let status = world.register_component(MaskStore::new());
    let far = 40 * BLOCK as u32 + 3;

    let mask = BitSet::from_bits([status.id().index()]);
    world.restore(far, &mask)?;
    world.store_mut(&status).set(far, 0b101);
    assert!(world.store(&status).is_set(far, 0b100));
    assert_eq!(world.entity(far)?.component_ids().collect::<Vec<_>>(), vec![status.id()]);
    Ok(())
}

#[test]
fn test_snapshot_and_restore_into_another_world() -> Result<()> {
    let mut source = World::new();
    let pos = source.register_component(XyStore::new());
    let name = source.register_component(GenericStore::<String>::new());

    let id = source
        .create(true)?
        .add_with(&pos, |store, id| store.set(id, 1.5, 2.5))?
        .add_with(&name, |store, id| {
            store.set(id, "probe".into());
        })?
        .id();
    let mask = source.entity(id)?.component_mask().clone();
    let at = source.store(&pos).get(id);

    let mut target = World::new();
    let pos2 = target.register_component(XyStore::new());
    let name2 = target.register_component(GenericStore::<String>::new());
    let mut restored = target.restore(id, &mask)?;
    restored.store_mut(&pos2).set_vec(id, at);
    assert!(restored.has(&name2));
    // generic slots start empty
    assert!(restored.store(&name2).get(id).is_none());
    assert_eq!(target.store(&pos2).get(id), Vec2::new(1.5, 2.5));
    Ok(())
}

#[test]
fn test_float_and_mask_helpers() -> Result<()> {
    const STUNNED: u32 = 1 << 2;

    let mut world = World::new();
    let speed = world.register_component(FloatStore::new());
    let status = world.register_component(MaskStore::new());
    let id = world.create(false)?.add(&speed)?.add(&status)?.id();

    world.store_mut(&speed).set(id, 2.0);
    world.store_mut(&speed).add(id, 0.5);
    assert_eq!(world.store(&speed).get(id), 2.5);

    let flags = world.store_mut(&status);
    flags.set_flag(id, STUNNED);
    assert!(flags.is_set(id, STUNNED));
    flags.clear_flag(id, STUNNED);
    assert_eq!(flags.get(id), 0);
    Ok(())
}

#[test]
#[should_panic(expected = "not registered")]
fn test_handle_from_another_world_panics() {
    let mut a = World::new();
    a.register_component(IntStore::new());
    let mut b = World::new();
    let pos = b.register_component(XyStore::new());
    let _ = a.store(&pos);
}
