//! Hittable capability — получатель ударов
//!
//! `HitReceiver` на root entity означает "в это можно попасть". Обработка
//! синхронная: резолвер зовёт `process`, получатель заполняет result-поля
//! `HitData` и применяет урон к своему Health. Объекты без компонента
//! (декорации) — не ошибка, их просто пропускают.

use bevy::prelude::*;

use crate::components::Health;

use super::hit_data::HitData;

/// Защитные характеристики получателя ударов
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitReceiver {
    /// Стойкость брони (гасит penetration)
    pub toughness: f32,
    /// Устойчивость корпуса (гасит impact)
    pub stability: f32,
    /// Сколько атакующей мощи гасит блок
    pub guard_power: f32,
    /// Порог impact, выше которого цель оглушается
    pub stun_threshold: f32,
}

impl Default for HitReceiver {
    fn default() -> Self {
        Self {
            toughness: 10.0,
            stability: 150.0,
            guard_power: 12.0,
            stun_threshold: 0.6,
        }
    }
}

/// Текущее защитное состояние (поднят ли блок, открыто ли parry окно)
///
/// parry_window > 0 во время активного парирования; тикает вниз каждый кадр.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct GuardState {
    pub blocking: bool,
    /// Оставшееся время parry окна (секунды)
    pub parry_window: f32,
}

impl GuardState {
    pub fn blocking() -> Self {
        Self {
            blocking: true,
            parry_window: 0.0,
        }
    }

    pub fn parrying(window: f32) -> Self {
        Self {
            blocking: true,
            parry_window: window,
        }
    }

    pub fn is_parrying(&self) -> bool {
        self.blocking && self.parry_window > 0.0
    }
}

impl HitReceiver {
    /// Обрабатывает удар: пишет result-поля и применяет урон.
    ///
    /// `false` — отказ (труп не обрабатывает удары), result-поля не тронуты;
    /// вызывающий обязан проверить флаг прежде чем считать удар состоявшимся.
    pub fn process(
        &self,
        guard: Option<&GuardState>,
        health: &mut Health,
        hit: &mut HitData,
    ) -> bool {
        if !health.is_alive() {
            return false;
        }

        hit.penetration = if hit.piercing <= 0.0 {
            0.0
        } else {
            (hit.piercing / (hit.piercing + self.toughness)).clamp(0.0, 1.0)
        };
        hit.impact = if hit.force <= 0.0 {
            0.0
        } else {
            (hit.force / (hit.force + self.stability)).clamp(0.0, 1.0)
        };

        let attack_power = hit.strength + hit.offence;

        if guard.is_some_and(|g| g.is_parrying()) {
            // Идеальное парирование: урон и сила полностью погашены
            hit.parried = true;
            hit.blocked = attack_power;
            hit.damage = 0.0;
            hit.force_transferred = 0.0;
            hit.stunned = false;
            return true;
        }

        if guard.is_some_and(|g| g.blocking) {
            hit.blocked = attack_power.min(self.guard_power);
        }

        let effective = (attack_power - hit.blocked).max(0.0);
        hit.damage = effective * (0.35 + 0.65 * hit.penetration);
        hit.stunned = hit.impact > self.stun_threshold;
        hit.force_transferred = hit.force * hit.impact;

        health.take_damage(hit.damage.round() as u32);
        true
    }
}

/// Система: тик parry окон
pub fn update_guard_windows(mut guards: Query<&mut GuardState>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut guard in guards.iter_mut() {
        if guard.parry_window > 0.0 {
            guard.parry_window = (guard.parry_window - delta).max(0.0);
        }
    }
}
