//! Объёмы для пространственных запросов: SceneCollider, SceneVolume
//!
//! Поверхность physics/query provider: sweep caster и occlusion raycasts
//! работают по срезу `SceneVolume` записей, собранных из ECS query.
//! Откуда записи пришли (ECS, broad-phase grid, внешний движок) — не важно.

use bevy::prelude::*;

/// Форма объёма в мировых координатах
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum VolumeShape {
    /// Сфера (bounding sphere тела)
    Sphere { radius: f32 },
    /// Axis-aligned box (статичное окружение: стены, ящики)
    Box { half_extents: Vec3 },
}

/// Компонент: entity участвует в sweep/occlusion запросах
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct SceneCollider {
    pub shape: VolumeShape,
    /// Layer bits (см. crate::layers)
    pub layer: u32,
    /// Смещение центра объёма от origin entity
    pub center_offset: Vec3,
}

impl SceneCollider {
    pub fn sphere(radius: f32, layer: u32) -> Self {
        Self {
            shape: VolumeShape::Sphere { radius },
            layer,
            center_offset: Vec3::ZERO,
        }
    }

    pub fn cuboid(half_extents: Vec3, layer: u32) -> Self {
        Self {
            shape: VolumeShape::Box { half_extents },
            layer,
            center_offset: Vec3::ZERO,
        }
    }

    pub fn with_center_offset(mut self, offset: Vec3) -> Self {
        self.center_offset = offset;
        self
    }
}

/// Запись объёма для одного запроса (снимок на текущий кадр)
#[derive(Debug, Clone, Copy)]
pub struct SceneVolume {
    /// Root entity, которому принадлежит объём
    pub root: Entity,
    pub shape: VolumeShape,
    /// Мировой центр объёма
    pub center: Vec3,
    pub layer: u32,
}

impl SceneVolume {
    pub fn from_collider(root: Entity, transform: &Transform, collider: &SceneCollider) -> Self {
        Self {
            root,
            shape: collider.shape,
            center: transform.translation + transform.rotation * collider.center_offset,
            layer: collider.layer,
        }
    }

    pub fn matches(&self, mask: u32) -> bool {
        self.layer & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;

    #[test]
    fn test_volume_mask_match() {
        let vol = SceneVolume {
            root: Entity::PLACEHOLDER,
            shape: VolumeShape::Sphere { radius: 0.5 },
            center: Vec3::ZERO,
            layer: layers::LAYER_ACTORS,
        };

        assert!(vol.matches(layers::MASK_MELEE_SWEEP));
        assert!(!vol.matches(layers::MASK_VISION_OCCLUDERS));
    }

    #[test]
    fn test_volume_center_from_offset() {
        let collider =
            SceneCollider::sphere(0.5, layers::LAYER_ACTORS).with_center_offset(Vec3::Y);
        let transform = Transform::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let vol = SceneVolume::from_collider(Entity::PLACEHOLDER, &transform, &collider);
        assert_eq!(vol.center, Vec3::new(3.0, 1.0, 0.0));
    }
}
