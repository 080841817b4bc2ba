use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sweep_collide::*;

fn sphere(radius: f32, position: Vec3) -> PlacedShape {
    PlacedShape::sphere(radius, position)
}

fn cube(position: Vec3) -> PlacedShape {
    PlacedShape::unit_box(position)
}

#[test]
fn unit_spheres_overlapping_by_half() {
    let a = sphere(1.0, Vec3::ZERO);
    let b = sphere(1.0, Vec3::new(1.5, 0.0, 0.0));

    let mtv = NarrowPhase::penetration(&a, &b).expect("spheres overlap");
    assert_relative_eq!(mtv.length(), 0.5, epsilon = 1e-5);
    assert!(mtv.x < 0.0, "first sphere is pushed toward -X, got {mtv:?}");

    let back = NarrowPhase::penetration(&b, &a).expect("spheres overlap");
    assert_relative_eq!(back.x, 0.5, epsilon = 1e-5);
}

#[test]
fn separated_spheres_do_not_collide() {
    let a = sphere(1.0, Vec3::ZERO);
    let b = sphere(1.0, Vec3::new(2.5, 0.0, 0.0));
    assert!(!NarrowPhase::intersects(&a, &b));
    assert!(NarrowPhase::penetration(&a, &b).is_none());

    let touching = sphere(1.0, Vec3::new(2.0, 0.0, 0.0));
    assert!(!NarrowPhase::intersects(&a, &touching));
}

#[test]
fn coincident_boxes_report_nonzero_mtv() {
    let a = cube(Vec3::ZERO);
    let b = cube(Vec3::ZERO);

    assert!(NarrowPhase::intersects(&a, &b));
    let mtv = NarrowPhase::penetration(&a, &b).expect("coincident boxes overlap");
    assert!(mtv.length() > 0.0);
    assert_relative_eq!(mtv.abs().max_element(), 1.0, epsilon = 1e-3);
}

#[test]
fn boxes_apart_on_every_axis_do_not_collide() {
    let a = cube(Vec3::ZERO);
    for offset in [
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(0.0, -1.2, 0.0),
        Vec3::new(0.0, 0.0, 3.0),
        Vec3::new(2.0, 2.0, 2.0),
    ] {
        assert!(!NarrowPhase::intersects(&a, &cube(offset)), "offset {offset:?}");
    }
}

#[test]
fn intersection_is_symmetric() {
    let shapes = [
        cube(Vec3::ZERO),
        cube(Vec3::new(0.7, 0.3, -0.2)),
        sphere(0.5, Vec3::new(0.0, 0.9, 0.0)),
        sphere(0.75, Vec3::new(1.1, 0.2, 0.1)),
        PlacedShape::new(
            ColliderShape::unit_box(),
            Vec3::new(-1.2, 0.0, 0.0),
            Vec3::new(2.0, 0.5, 1.0),
        ),
        cube(Vec3::new(5.0, 5.0, 5.0)),
    ];

    for (i, a) in shapes.iter().enumerate() {
        for b in &shapes[i + 1..] {
            assert_eq!(
                NarrowPhase::intersects(a, b),
                NarrowPhase::intersects(b, a),
                "{a:?} vs {b:?}"
            );
        }
    }
}

#[test]
fn box_mtv_flips_with_argument_order() {
    let a = cube(Vec3::ZERO);
    let b = cube(Vec3::new(0.8, 0.1, 0.0));

    let forward = NarrowPhase::penetration(&a, &b).expect("overlap");
    let backward = NarrowPhase::penetration(&b, &a).expect("overlap");
    assert_relative_eq!(forward.x, -0.2, epsilon = 1e-3);
    assert_relative_eq!(backward.x, 0.2, epsilon = 1e-3);
}

#[test]
fn sphere_resting_on_box_reports_contact_below_center() {
    let ball = sphere(0.5, Vec3::new(0.0, 0.9, 0.0));
    let ground = cube(Vec3::ZERO);

    let contact = NarrowPhase::contact(&ball, &ground).expect("touching");
    assert!(contact.mtv.y > 0.0);
    assert_relative_eq!(contact.depth(), 0.1, epsilon = 1e-2);
    let point = contact.point.expect("sphere contact point");
    assert_relative_eq!(point.y, 0.4, epsilon = 1e-2);
}

#[test]
fn world_queries_use_world_transforms() {
    let mut world = PhysicsWorld::new();
    let parent = world.create_object("parent");
    let child = world.create_object("child");
    let other = world.create_object("other");
    world.set_parent(child, parent).expect("parent");

    world
        .transform_mut(parent)
        .expect("transform")
        .set_position(Vec3::new(3.0, 0.0, 0.0));
    world
        .transform_mut(other)
        .expect("transform")
        .set_position(Vec3::new(3.5, 0.0, 0.0));
    world
        .add_collider(child, Collider::new(ColliderShape::unit_box()))
        .expect("collider");
    world
        .add_collider(other, Collider::new(ColliderShape::unit_box()))
        .expect("collider");

    assert!(world.intersects(child, other).expect("query"));
    let mtv = world.penetration(child, other).expect("query").expect("overlap");
    assert_relative_eq!(mtv.x, -0.5, epsilon = 1e-3);
}

#[test]
fn missing_collider_is_an_error() {
    let mut world = PhysicsWorld::new();
    let bare = world.create_object("bare");
    let other = world.create_object("other");
    assert_eq!(
        world.intersects(bare, other),
        Err(PhysicsError::MissingCollider(bare))
    );
}

#[test]
fn random_box_overlaps_report_the_shallowest_axis() {
    let mut rng = StdRng::seed_from_u64(0x5eed_b0c5);
    let fixed = cube(Vec3::ZERO);

    for _ in 0..250 {
        let offset = Vec3::new(
            rng.gen_range(-0.9..0.9),
            rng.gen_range(-0.9..0.9),
            rng.gen_range(-0.9..0.9),
        );
        let moving = cube(offset);
        let expected = (Vec3::ONE - offset.abs()).min_element();

        let mtv = NarrowPhase::penetration(&moving, &fixed)
            .unwrap_or_else(|| panic!("boxes offset by {offset:?} overlap"));
        assert_relative_eq!(mtv.length(), expected, epsilon = 1e-3);

        let back = NarrowPhase::penetration(&fixed, &moving)
            .unwrap_or_else(|| panic!("boxes offset by {offset:?} overlap both ways"));
        assert_relative_eq!(back.length(), expected, epsilon = 1e-3);
    }
}

#[test]
fn random_sphere_box_overlaps_match_the_face_depth() {
    let mut rng = StdRng::seed_from_u64(42);
    let fixed = cube(Vec3::ZERO);
    let axes = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];

    for round in 0..250 {
        let axis = axes[round % axes.len()];
        let radius: f32 = rng.gen_range(0.3..1.0);
        let depth: f32 = rng.gen_range(0.05..0.25);
        let lateral = Vec3::new(
            rng.gen_range(-0.3..0.3),
            rng.gen_range(-0.3..0.3),
            rng.gen_range(-0.3..0.3),
        ) * (Vec3::ONE - axis.abs());
        let center = axis * (0.5 + radius - depth) + lateral;
        let ball = sphere(radius, center);

        let mtv = NarrowPhase::penetration(&ball, &fixed)
            .unwrap_or_else(|| panic!("sphere at {center:?} r={radius} overlaps the box"));
        assert_relative_eq!(mtv.length(), depth, epsilon = 1e-2);
        assert!(mtv.dot(axis) > 0.0, "sphere at {center:?} pushed along {mtv:?}");

        let back = NarrowPhase::penetration(&fixed, &ball)
            .unwrap_or_else(|| panic!("box overlaps sphere at {center:?}"));
        assert_relative_eq!(back.length(), depth, epsilon = 1e-2);
    }
}
