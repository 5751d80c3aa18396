//! Projectiles — полёт, столкновения, collision-course запросы
//!
//! Снаряд летит линейно; столкновение — sphere sweep от позиции тика к
//! следующей через общий caster (2 scan точки — прямая). Попадания идут
//! через тот же resolver, что и melee: re-hit cooldown держит один root
//! от повторной обработки той же опасностью, destroy-on-hit сводит
//! одновременные контакты к ближайшему.
//!
//! `ProjectileTracker` — живое множество для dodge-логики: "влетит ли
//! точка в чей-то курс". Членство — единственное мутабельное состояние.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::combat::{
    resolve_scan_hit, EntityDied, GuardState, HitCooldowns, HitLanded, HitPolicy, HitReceiver,
    MoveStats,
};
use crate::components::{Health, HitterBody, SceneCollider, SceneVolume};
use crate::layers;
use crate::sweep::caster::closest_point_on_segment;
use crate::sweep::{sweep_path, ScanPoint, SweepShape};

/// Окно предсказания курса по умолчанию (секунды полёта вперёд)
pub const DEFAULT_PREDICTION_WINDOW: f32 = 1.0;

/// Летящий снаряд
#[derive(Component, Debug, Clone)]
#[require(HitCooldowns)]
pub struct Projectile {
    pub radius: f32,
    /// Мировая скорость (м/с)
    pub velocity: Vec3,
    pub mass: f32,
    /// Кто выпустил (kill credit, исключение из collision)
    pub source: Option<Entity>,
    /// Слои, с которыми сталкивается
    pub mask: u32,
    /// Остаток жизни (секунды)
    pub lifetime: f32,
    pub stats: MoveStats,
    pub policy: HitPolicy,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            radius: 0.1,
            velocity: Vec3::ZERO,
            mass: 0.2,
            source: None,
            mask: layers::MASK_PROJECTILES,
            lifetime: 5.0,
            stats: MoveStats::default().scaled(0.6),
            policy: HitPolicy::default(),
        }
    }
}

/// Событие: снаряд истёк (lifetime), не столкнувшись
#[derive(Event, Debug, Clone)]
pub struct ProjectileExpired {
    pub projectile: Entity,
}

/// Живое множество отслеживаемых снарядов
#[derive(Resource, Debug, Default)]
pub struct ProjectileTracker {
    tracked: HashSet<Entity>,
}

impl ProjectileTracker {
    /// Идемпотентная регистрация; true — новый
    pub fn register(&mut self, projectile: Entity) -> bool {
        self.tracked.insert(projectile)
    }

    /// Идемпотентное удаление; true — был
    pub fn unregister(&mut self, projectile: Entity) -> bool {
        self.tracked.remove(&projectile)
    }

    pub fn contains(&self, projectile: Entity) -> bool {
        self.tracked.contains(&projectile)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Влетит ли `point` в курс какого-то из отслеживаемых снарядов.
    ///
    /// Курс: позиция сейчас → `window` секунд вперёд по текущей скорости;
    /// контакт — ближайшая точка отрезка ближе суммы радиусов. Возвращает
    /// ПЕРВЫЙ подошедший снаряд в порядке итерации, не ближайший — кому
    /// нужен ближайший, сканирует всех сам.
    pub fn is_in_path<'a, I>(
        &self,
        point: Vec3,
        radius: f32,
        window: f32,
        projectiles: I,
    ) -> Option<Entity>
    where
        I: IntoIterator<Item = (Entity, Vec3, &'a Projectile)>,
    {
        for (entity, position, projectile) in projectiles {
            if !self.tracked.contains(&entity) {
                continue;
            }

            let ahead = position + projectile.velocity * window;
            let closest = closest_point_on_segment(position, ahead, point);
            if closest.distance(point) < projectile.radius + radius {
                return Some(entity);
            }
        }
        None
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Система: регистрация заспавненных снарядов в tracker
pub fn track_spawned_projectiles(
    mut tracker: ResMut<ProjectileTracker>,
    added: Query<Entity, Added<Projectile>>,
) {
    for entity in added.iter() {
        if tracker.register(entity) {
            crate::logger::log(&format!("🏹 Projectile {:?} registered", entity));
        }
    }
}

/// Система: снятие деспавненных снарядов с tracker'а
pub fn untrack_despawned_projectiles(
    mut tracker: ResMut<ProjectileTracker>,
    mut removed: RemovedComponents<Projectile>,
) {
    for entity in removed.read() {
        tracker.unregister(entity);
    }
}

/// Система: столкновения снарядов за текущий тик
///
/// Сегмент тика прокатывается sphere sweep'ом до того, как flight сдвинет
/// снаряд. destroy-on-hit: обрабатывается только ближайший контакт, снаряд
/// гибнет даже о декорацию без hittable capability.
pub fn projectile_collision(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &Transform, &Projectile, &mut HitCooldowns)>,
    colliders: Query<(Entity, &Transform, &SceneCollider)>,
    mut receivers: Query<(&HitReceiver, &mut Health, Option<&GuardState>)>,
    time: Res<Time<Fixed>>,
    mut landed: EventWriter<HitLanded>,
    mut deaths: EventWriter<EntityDied>,
) {
    let delta = time.delta_secs();

    for (entity, xf, projectile, mut cooldowns) in projectiles.iter_mut() {
        let start = xf.translation;
        let end = start + projectile.velocity * delta;
        let path = [
            ScanPoint::at(start, xf.rotation, 0.0),
            ScanPoint::at(end, xf.rotation, 1.0),
        ];

        let volumes: Vec<SceneVolume> = colliders
            .iter()
            .filter(|(root, _, _)| *root != entity && Some(*root) != projectile.source)
            .map(|(root, volume_xf, collider)| {
                SceneVolume::from_collider(root, volume_xf, collider)
            })
            .collect();

        let Ok(outcome) = sweep_path(
            &path,
            SweepShape::Sphere {
                radius: projectile.radius,
            },
            projectile.mask,
            &volumes,
        ) else {
            continue;
        };

        if outcome.hits.is_empty() {
            continue;
        }

        let body = HitterBody {
            mass: projectile.mass,
            velocity: projectile.velocity,
        };

        if projectile.policy.destroy_on_hit {
            // Единственный сегмент — hits отсортированы по дистанции,
            // первый и есть ближайший
            let hit = &outcome.hits[0];
            if !cooldowns.on_cooldown(hit.root) {
                if let Some(resolved) =
                    resolve_scan_hit(hit, entity, &body, projectile.stats, &mut receivers)
                {
                    if resolved.accepted {
                        if resolved.lethal {
                            deaths.write(EntityDied {
                                entity: hit.root,
                                killer: projectile.source.or(Some(entity)),
                            });
                        }
                        landed.write(HitLanded {
                            attacker: projectile.source.unwrap_or(entity),
                            target: hit.root,
                            data: resolved.data,
                        });
                    }
                }
            }

            crate::logger::log(&format!(
                "💨 Projectile {:?} destroyed on contact with {:?}",
                entity, hit.root
            ));
            commands.entity(entity).despawn();
            continue;
        }

        // Персистентная опасность: все контакты независимо, под cooldown
        for hit in &outcome.hits {
            if cooldowns.on_cooldown(hit.root) {
                continue;
            }
            cooldowns.arm(hit.root, projectile.policy.rehit_cooldown);

            let Some(resolved) =
                resolve_scan_hit(hit, entity, &body, projectile.stats, &mut receivers)
            else {
                continue;
            };
            if !resolved.accepted {
                continue;
            }

            if resolved.lethal {
                deaths.write(EntityDied {
                    entity: hit.root,
                    killer: projectile.source.or(Some(entity)),
                });
            }
            landed.write(HitLanded {
                attacker: projectile.source.unwrap_or(entity),
                target: hit.root,
                data: resolved.data,
            });
        }
    }
}

/// Система: линейный полёт и lifetime
pub fn projectile_flight(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile)>,
    time: Res<Time<Fixed>>,
    mut expired: EventWriter<ProjectileExpired>,
) {
    let delta = time.delta_secs();

    for (entity, mut xf, mut projectile) in projectiles.iter_mut() {
        xf.translation += projectile.velocity * delta;

        projectile.lifetime -= delta;
        if projectile.lifetime <= 0.0 {
            expired.write(ProjectileExpired { projectile: entity });
            commands.entity(entity).despawn();
            crate::logger::log(&format!("⏱️ Projectile {:?} expired", entity));
        }
    }
}

/// Projectile Plugin
pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProjectileTracker>()
            .add_event::<ProjectileExpired>();

        app.add_systems(
            FixedUpdate,
            (
                track_spawned_projectiles,
                projectile_collision,
                projectile_flight,
                untrack_despawned_projectiles,
            )
                .chain(),
        );
    }
}
