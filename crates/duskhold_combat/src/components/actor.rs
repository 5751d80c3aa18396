//! Базовые компоненты акторов: Health, HitterBody

use bevy::prelude::*;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Физическое тело бойца — масса и текущая скорость
///
/// Источник инерции для ударов: momentum = mass × velocity.
/// Скорость пишет внешний movement-слой, симуляция только читает.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitterBody {
    /// Масса (кг)
    pub mass: f32,
    /// Мировая скорость (м/с)
    pub velocity: Vec3,
}

impl Default for HitterBody {
    fn default() -> Self {
        Self {
            mass: 80.0,
            velocity: Vec3::ZERO,
        }
    }
}

impl HitterBody {
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            velocity: Vec3::ZERO,
        }
    }

    /// Мировой импульс (кг·м/с)
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}
