use sweep_collide::*;

fn main() -> Result<()> {
    let mut engine = PhysicsEngine::new();
    engine.set_parallel_enabled(true);

    engine.add_static(
        "ground",
        Vec3::new(0.0, -0.5, 0.0),
        ColliderShape::cuboid(Vec3::new(10.0, 0.5, 10.0)),
    )?;

    let mut bodies = Vec::new();
    for i in 0..5 {
        let position = Vec3::new(i as f32 * 0.3, 1.0 + i as f32 * 1.5, 0.0);
        let shape = if i % 2 == 0 {
            ColliderShape::unit_box()
        } else {
            ColliderShape::sphere(0.5)
        };
        bodies.push(engine.add_body(&format!("body-{i}"), position, shape, RigidBody::new())?);
    }

    let landings = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = std::sync::Arc::clone(&landings);
    engine
        .world_mut()
        .add_collision_listener(move |_: ObjectId, mtv: Vec3, _: Option<ObjectId>| {
            if mtv.y > 0.0 {
                counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        });

    engine.start();
    for _ in 0..180 {
        engine.step(1.0 / 60.0);
    }

    for id in &bodies {
        println!("{id:?} rests at {:?}", engine.position(*id)?);
    }
    println!(
        "upward pushes: {}, last step: {:?}",
        landings.load(std::sync::atomic::Ordering::Relaxed),
        engine.world().last_profile()
    );

    engine.stop();
    Ok(())
}
