//! Hit resolver — от геометрического контакта к обработанному удару
//!
//! Пайплайн: ScanHit → lookup hittable capability на root → HitData →
//! синхронная обработка получателем → HitLanded/EntityDied события.
//! Объекты без capability пропускаются молча (декорации — частый случай).

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Health, HitterBody, Targetable};
use crate::sweep::ScanHit;

use super::hit_data::{HitData, MoveStats};
use super::receiver::{GuardState, HitReceiver};
use super::swing::MeleeSwing;

/// Cooldown повторного попадания той же опасностью по тому же root (секунды)
pub const REHIT_COOLDOWN: f32 = 0.5;

/// Политика обработки попаданий движущейся опасности (снаряд, ловушка)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitPolicy {
    /// Гибнет при первом контакте: из одновременных попаданий за тик
    /// обрабатывается только ближайшее
    pub destroy_on_hit: bool,
    /// Окно, в котором тот же root повторно не обрабатывается
    pub rehit_cooldown: f32,
}

impl Default for HitPolicy {
    fn default() -> Self {
        Self {
            destroy_on_hit: true,
            rehit_cooldown: REHIT_COOLDOWN,
        }
    }
}

/// Таблица re-hit cooldown'ов опасности: root → оставшееся время
///
/// Принадлежит эксклюзивно своей опасности; умирает вместе с ней,
/// после чего никакой обработки ударов уже не происходит.
#[derive(Component, Debug, Clone, Default)]
pub struct HitCooldowns {
    table: HashMap<Entity, f32>,
}

impl HitCooldowns {
    pub fn on_cooldown(&self, root: Entity) -> bool {
        self.table.get(&root).is_some_and(|t| *t > 0.0)
    }

    pub fn arm(&mut self, root: Entity, seconds: f32) {
        self.table.insert(root, seconds);
    }

    pub fn tick(&mut self, delta: f32) {
        self.table.retain(|_, t| {
            *t -= delta;
            *t > 0.0
        });
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

// ============================================================================
// Events
// ============================================================================

/// Событие: sweep задел root (ещё не разрешено в удар)
#[derive(Event, Debug, Clone)]
pub struct SweepHit {
    pub attacker: Entity,
    pub stats: MoveStats,
    pub hit: ScanHit,
}

/// Событие: удар обработан получателем
///
/// `data` несёт заполненные result-поля — читается наружным слоем
/// для hit-reaction/knockback презентации.
#[derive(Event, Debug, Clone)]
pub struct HitLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub data: HitData,
}

/// Событие: entity умер (health == 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// Деспавн не автоматический — трупы остаются на месте.
#[derive(Component, Debug)]
pub struct Dead;

// ============================================================================
// Resolution
// ============================================================================

/// Итог разрешения одного контакта
#[derive(Debug, Clone)]
pub struct ResolvedHit {
    pub data: HitData,
    /// Получатель принял удар (false — отказ: труп, неуязвимость)
    pub accepted: bool,
    /// Удар убил цель
    pub lethal: bool,
}

/// Разрешает контакт в удар: lookup capability → HitData → обработка.
///
/// `None` — на root нет hittable capability (не ошибка).
pub fn resolve_scan_hit(
    hit: &ScanHit,
    hitter: Entity,
    body: &HitterBody,
    stats: MoveStats,
    receivers: &mut Query<(&HitReceiver, &mut Health, Option<&GuardState>)>,
) -> Option<ResolvedHit> {
    let Ok((receiver, mut health, guard)) = receivers.get_mut(hit.root) else {
        return None;
    };

    let mut data = HitData::new(hit.root, hitter, body, stats, hit.point, hit.direction);
    let accepted = receiver.process(guard, &mut health, &mut data);
    let lethal = accepted && !health.is_alive();

    Some(ResolvedHit {
        data,
        accepted,
        lethal,
    })
}

// ============================================================================
// Systems
// ============================================================================

/// Система: тик re-hit cooldown таблиц
pub fn tick_hit_cooldowns(mut cooldowns: Query<&mut HitCooldowns>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();
    for mut table in cooldowns.iter_mut() {
        table.tick(delta);
    }
}

/// Система: разрешение sweep контактов в удары
///
/// Dedup по root внутри sweep'а и внутри всего замаха уже сделан выше по
/// пайплайну, поэтому на один root — максимум один вызов обработки.
pub fn resolve_sweep_hits(
    mut sweep_hits: EventReader<SweepHit>,
    bodies: Query<&HitterBody>,
    mut receivers: Query<(&HitReceiver, &mut Health, Option<&GuardState>)>,
    mut swings: Query<&mut MeleeSwing>,
    mut landed: EventWriter<HitLanded>,
    mut deaths: EventWriter<EntityDied>,
) {
    for event in sweep_hits.read() {
        // Не бьем самого себя
        if event.attacker == event.hit.root {
            continue;
        }

        let body = bodies.get(event.attacker).copied().unwrap_or_default();

        let Some(resolved) = resolve_scan_hit(
            &event.hit,
            event.attacker,
            &body,
            event.stats,
            &mut receivers,
        ) else {
            continue;
        };

        if !resolved.accepted {
            crate::logger::log(&format!(
                "🛡️ Hit refused by {:?} (dead/invulnerable)",
                event.hit.root
            ));
            continue;
        }

        if let Ok(mut swing) = swings.get_mut(event.attacker) {
            swing.total_damage += resolved.data.damage;
        }

        crate::logger::log(&format!(
            "💥 Hit landed: {:?} → {:?} (damage: {:.1}, blocked: {:.1}, parried: {}, stunned: {})",
            event.attacker,
            event.hit.root,
            resolved.data.damage,
            resolved.data.blocked,
            resolved.data.parried,
            resolved.data.stunned,
        ));

        if resolved.lethal {
            deaths.write(EntityDied {
                entity: event.hit.root,
                killer: Some(event.attacker),
            });
        }

        landed.write(HitLanded {
            attacker: event.attacker,
            target: event.hit.root,
            data: resolved.data,
        });
    }
}

/// Система: маркировка мертвых
///
/// Вешает Dead, гасит Targetable.enabled — труп перестаёт быть целью,
/// и targeting state machine сбросит его на ближайшем тике.
pub fn mark_dead(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    mut targetables: Query<&mut Targetable>,
) {
    for event in deaths.read() {
        if let Ok(mut targetable) = targetables.get_mut(event.entity) {
            targetable.enabled = false;
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Dead);
        }

        crate::logger::log_info(&format!(
            "☠️ Entity {:?} killed by {:?}",
            event.entity, event.killer
        ));
    }
}
