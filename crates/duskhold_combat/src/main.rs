//! Headless дуэль DUSKHOLD
//!
//! Запускает симуляцию без рендера: два бойца, стена, снаряд —
//! smoke-прогон всех подсистем.

use bevy::prelude::*;
use duskhold_combat::*;

fn main() {
    println!("Starting DUSKHOLD headless duel");

    let mut app = create_headless_app();

    let world = app.world_mut();

    // Стена сбоку от арены (occluder для зрения)
    world.spawn((
        Transform::from_translation(Vec3::new(4.0, 1.0, -2.0)),
        SceneCollider::cuboid(Vec3::new(0.3, 1.0, 2.0), layers::LAYER_ENVIRONMENT),
    ));

    // Challenger: целится и машет мечом
    let mut relations = RelationGraph::default();
    relations.adjust(RelationKey::label("ironguard"), -0.6);

    let challenger = world
        .spawn((
            Transform::IDENTITY, // смотрит в -Z
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

    // Sentinel: стоит в блоке напротив
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

    // Стрела из-за спины challenger'а (проверка tracker + collision)
    world.spawn((
        Transform::from_translation(Vec3::new(0.0, 0.9, 6.0)),
        Projectile {
            velocity: Vec3::new(0.0, 0.0, -8.0),
            lifetime: 2.0,
            source: Some(challenger),
            ..Default::default()
        },
    ));

    for tick in 0..360 {
        // Навести цель после warmup тика (нулевой update только взводит время)
        if tick == 1 {
            app.world_mut().send_event(TargetInput { agent: challenger });
        }

        // Новый замах каждые 1.5 секунды
        if tick % 90 == 0 && app.world().get::<MeleeSwing>(challenger).is_none() {
            app.world_mut()
                .entity_mut(challenger)
                .insert(MeleeSwing::new(SwingProfile::default()));
        }

        app.update();

        if tick % 60 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    // Итог дуэли
    let mut query = app.world_mut().query::<(Entity, &Identity, &Health)>();
    for (entity, identity, health) in query.iter(app.world()) {
        println!(
            "{:?} (uid {}): {}/{} HP",
            entity, identity.uid, health.current, health.max
        );
    }

    println!("Duel complete!");
}
