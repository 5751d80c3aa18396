//! HitData — контракт обмена данными удара между бьющим и получателем

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::HitterBody;

/// Боевые параметры одного приёма (удар, выпад, снаряд)
///
/// Значения уже отмасштабированы процентом приёма: лёгкий укол несёт
/// 40% strength персонажа, тяжёлый замах — 130%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveStats {
    /// Толкающая сила удара (Н·с условно)
    pub force: f32,
    /// Сила персонажа за приёмом
    pub strength: f32,
    /// Атакующий навык
    pub offence: f32,
    /// Пробивание брони
    pub piercing: f32,
}

impl Default for MoveStats {
    fn default() -> Self {
        Self {
            force: 120.0,
            strength: 10.0,
            offence: 5.0,
            piercing: 2.0,
        }
    }
}

impl MoveStats {
    /// Масштаб приёма (0.4 = лёгкий, 1.3 = тяжёлый)
    pub fn scaled(&self, percent: f32) -> Self {
        Self {
            force: self.force * percent,
            strength: self.strength * percent,
            offence: self.offence * percent,
            piercing: self.piercing * percent,
        }
    }
}

/// Запись одного удара по одному получателю.
///
/// Send-поля заполняет резолвер при создании; result-поля пишет ТОЛЬКО
/// получатель при обработке и они валидны только после неё. Экземпляр
/// принадлежит вызову, создавшему его: новый удар / новый получатель —
/// новый экземпляр, переиспользования нет.
#[derive(Debug, Clone)]
pub struct HitData {
    // --- send (фиксируются при создании) ---
    /// Кого бьём
    pub receiver: Entity,
    /// Кто бьёт
    pub hitter: Entity,
    /// Масса бьющего (кг)
    pub mass: f32,
    /// Мировой импульс бьющего в момент удара
    pub inertia: Vec3,
    /// Мировая точка контакта
    pub point: Vec3,
    /// Нормализованное направление удара внутрь цели
    pub direction: Vec3,
    pub force: f32,
    pub strength: f32,
    pub offence: f32,
    pub piercing: f32,

    // --- result (пишет получатель) ---
    /// Сколько атакующей мощи съел блок
    pub blocked: f32,
    pub parried: bool,
    pub stunned: bool,
    /// Доля пробития брони [0,1]
    pub penetration: f32,
    /// Доля импакта (сбивание равновесия) [0,1]
    pub impact: f32,
    /// Итоговый урон
    pub damage: f32,
    /// Переданная в цель сила (knockback наружному слою)
    pub force_transferred: f32,
}

impl HitData {
    pub fn new(
        receiver: Entity,
        hitter: Entity,
        body: &HitterBody,
        stats: MoveStats,
        point: Vec3,
        direction: Vec3,
    ) -> Self {
        Self {
            receiver,
            hitter,
            mass: body.mass,
            inertia: body.momentum(),
            point,
            direction,
            force: stats.force,
            strength: stats.strength,
            offence: stats.offence,
            piercing: stats.piercing,

            blocked: 0.0,
            parried: false,
            stunned: false,
            penetration: 0.0,
            impact: 0.0,
            damage: 0.0,
            force_transferred: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_stats_scaling() {
        let stats = MoveStats::default().scaled(0.5);
        assert_eq!(stats.force, 60.0);
        assert_eq!(stats.strength, 5.0);
    }

    #[test]
    fn test_hit_data_captures_momentum() {
        let mut body = HitterBody::new(60.0);
        body.velocity = Vec3::new(0.0, 0.0, 3.0);

        let hit = HitData::new(
            Entity::from_raw(1),
            Entity::from_raw(2),
            &body,
            MoveStats::default(),
            Vec3::ZERO,
            Vec3::Z,
        );

        assert_eq!(hit.mass, 60.0);
        assert_eq!(hit.inertia, Vec3::new(0.0, 0.0, 180.0));
        assert_eq!(hit.damage, 0.0); // result-поля пустые до обработки
        assert!(!hit.parried);
    }
}
