//! Determinism test
//!
//! Один и тот же сценарий (дуэль + снаряд + targeting) прогоняется трижды;
//! снепшоты Health/TargetingState должны совпасть бит в бит — вся
//! симуляция однопоточная и идёт на ManualDuration тиках.

use bevy::prelude::*;
use duskhold_combat::*;

/// Полный сценарий: два бойца, стена, стрела, захват цели, один замах
fn run_scenario(ticks: usize) -> Vec<u8> {
    let mut app = create_headless_app();
    let world = app.world_mut();

    world.spawn((
        Transform::from_translation(Vec3::new(3.0, 1.0, -2.0)),
        SceneCollider::cuboid(Vec3::new(0.3, 1.0, 1.5), layers::LAYER_ENVIRONMENT),
    ));

    let mut relations = RelationGraph::default();
    relations.adjust(RelationKey::label("ironguard"), -0.6);

    let challenger = world
        .spawn((
            Transform::IDENTITY,
            Identity::new(1).with_labels(["wolfpack"]),
            Health::new(120),
            HitterBody::default(),
            HitReceiver::default(),
            Targetable::default(),
            SceneCollider::sphere(0.5, layers::LAYER_ACTORS)
                .with_center_offset(Vec3::new(0.0, 0.9, 0.0)),
            relations,
            RelationFilter::enemies(),
            Vision::default(),
            TargeterConfig::default(),
            TargetingState::default(),
        ))
        .id();

    world.spawn((
        Transform::from_translation(Vec3::new(0.0, 0.0, -1.1)).looking_at(Vec3::ZERO, Vec3::Y),
        Identity::new(2).with_labels(["ironguard"]),
        Health::new(100),
        HitterBody::default(),
        HitReceiver::default(),
        GuardState::blocking(),
        Targetable::default(),
        SceneCollider::sphere(0.5, layers::LAYER_ACTORS)
            .with_center_offset(Vec3::new(0.0, 0.9, 0.0)),
    ));

    world.spawn((
        Transform::from_translation(Vec3::new(0.0, 0.9, 5.0)),
        Projectile {
            velocity: Vec3::new(0.0, 0.0, -8.0),
            lifetime: 2.0,
            ..Default::default()
        },
    ));

    for tick in 0..ticks {
        // После warmup тика (нулевой update только взводит время)
        if tick == 1 {
            app.world_mut().send_event(TargetInput { agent: challenger });
        }
        if tick == 10 {
            app.world_mut()
                .entity_mut(challenger)
                .insert(MeleeSwing::new(SwingProfile::default()));
        }
        app.update();
    }

    let mut snapshot = world_snapshot::<Health>(app.world_mut());
    snapshot.extend(world_snapshot::<TargetingState>(app.world_mut()));
    snapshot
}

#[test]
fn test_scenario_determinism_three_runs() {
    const TICKS: usize = 200;

    let snapshot1 = run_scenario(TICKS);
    let snapshot2 = run_scenario(TICKS);
    let snapshot3 = run_scenario(TICKS);

    assert!(!snapshot1.is_empty());
    assert_eq!(snapshot1, snapshot2, "determinism failed: run 1 != run 2");
    assert_eq!(snapshot2, snapshot3, "determinism failed: run 2 != run 3");
}
