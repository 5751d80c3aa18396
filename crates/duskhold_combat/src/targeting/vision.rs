//! Vision spotting — какие кандидаты сейчас видимы
//!
//! Зрение составлено из "глаз": каждый глаз — origin + конус (half FOV) +
//! дальность + опциональный occlusion raycast по маске. Кандидат видим,
//! если его видит ХОТЯ БЫ один глаз; в результат попадает один раз,
//! порядок кандидатов сохраняется.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::SceneVolume;
use crate::layers;
use crate::sweep::caster::segment_blocked;

const EPS: f32 = 1e-6;

/// Один сенсор зрения
#[derive(Debug, Clone, Copy)]
pub struct Eye {
    /// Origin в локале владельца (уровень глаз)
    pub offset: Vec3,
    /// Направление взгляда в локале владельца
    pub forward: Vec3,
    /// Половина угла конуса (радианы)
    pub half_fov: f32,
    /// Дальность (метры)
    pub range: f32,
    /// Проверять ли заслон raycast'ом
    pub check_occlusion: bool,
    /// Какие слои заслоняют
    pub mask: u32,
}

impl Default for Eye {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::NEG_Z,
            half_fov: 60_f32.to_radians(),
            range: 20.0,
            check_occlusion: true,
            mask: layers::MASK_VISION_OCCLUDERS,
        }
    }
}

/// Компонент зрения (один и больше глаз)
#[derive(Component, Debug, Clone)]
pub struct Vision {
    pub eyes: Vec<Eye>,
}

impl Default for Vision {
    fn default() -> Self {
        Self {
            eyes: vec![Eye::default()],
        }
    }
}

/// Кандидат на видимость (entity + мировой центр тела)
#[derive(Debug, Clone, Copy)]
pub struct SightCandidate {
    pub entity: Entity,
    pub center: Vec3,
}

/// Метрика выбора наиболее вероятной цели
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMetric {
    /// Наименьший угол от центра взгляда
    CenterAngle,
    /// Наименьшая дистанция
    Distance,
}

/// Видимое подмножество кандидатов.
///
/// Кандидат видим от глаза, если: дистанция < range И угол < half_fov И
/// (occlusion выключен ИЛИ отрезок до центра не перекрыт объёмом из маски).
/// Владелец и сам кандидат не заслоняют.
pub fn spot(
    owner: Entity,
    xf: &Transform,
    vision: &Vision,
    candidates: &[SightCandidate],
    occluders: &[SceneVolume],
) -> Vec<SightCandidate> {
    let mut visible = Vec::new();
    let mut seen: HashSet<Entity> = HashSet::new();

    for candidate in candidates {
        if candidate.entity == owner || seen.contains(&candidate.entity) {
            continue;
        }

        for eye in &vision.eyes {
            let origin = xf.translation + xf.rotation * eye.offset;
            let forward = (xf.rotation * eye.forward).normalize_or_zero();

            let to_candidate = candidate.center - origin;
            let distance = to_candidate.length();
            if distance >= eye.range {
                continue;
            }

            if distance > EPS {
                let angle = forward.angle_between(to_candidate);
                if angle >= eye.half_fov {
                    continue;
                }
            }

            if eye.check_occlusion
                && segment_blocked(
                    origin,
                    candidate.center,
                    eye.mask,
                    occluders,
                    &[owner, candidate.entity],
                )
            {
                continue;
            }

            seen.insert(candidate.entity);
            visible.push(*candidate);
            break; // достаточно одного глаза
        }
    }

    visible
}

/// Лучший кандидат из видимого подмножества по метрике.
///
/// Равные значения разрешаются в пользу первого встреченного (строгое <).
pub fn most_likely_target(
    xf: &Transform,
    metric: TargetMetric,
    visible: &[SightCandidate],
) -> Option<Entity> {
    let forward = *xf.forward();

    let mut best: Option<(Entity, f32)> = None;
    for candidate in visible {
        let to_candidate = candidate.center - xf.translation;
        let desirability = match metric {
            TargetMetric::CenterAngle => {
                if to_candidate.length_squared() < EPS * EPS {
                    0.0
                } else {
                    forward.angle_between(to_candidate)
                }
            }
            TargetMetric::Distance => to_candidate.length(),
        };

        match best {
            Some((_, best_value)) if desirability >= best_value => {}
            _ => best = Some((candidate.entity, desirability)),
        }
    }

    best.map(|(entity, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::VolumeShape;

    fn owner_at_origin() -> Transform {
        // Смотрит в -Z (bevy forward)
        Transform::IDENTITY
    }

    fn eye_no_occlusion() -> Eye {
        Eye {
            offset: Vec3::ZERO,
            check_occlusion: false,
            ..Default::default()
        }
    }

    fn candidate(id: u32, center: Vec3) -> SightCandidate {
        SightCandidate {
            entity: Entity::from_raw(id),
            center,
        }
    }

    #[test]
    fn test_spot_range_gate() {
        let owner = Entity::from_raw(100);
        let vision = Vision {
            eyes: vec![Eye {
                range: 10.0,
                ..eye_no_occlusion()
            }],
        };

        let near = candidate(1, Vec3::new(0.0, 0.0, -5.0));
        let far = candidate(2, Vec3::new(0.0, 0.0, -15.0));

        let visible = spot(owner, &owner_at_origin(), &vision, &[near, far], &[]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].entity, near.entity);
    }

    #[test]
    fn test_spot_fov_gate() {
        let owner = Entity::from_raw(100);
        let vision = Vision {
            eyes: vec![Eye {
                half_fov: 30_f32.to_radians(),
                ..eye_no_occlusion()
            }],
        };

        let ahead = candidate(1, Vec3::new(0.0, 0.0, -5.0));
        let behind = candidate(2, Vec3::new(0.0, 0.0, 5.0));
        let side = candidate(3, Vec3::new(5.0, 0.0, -1.0)); // ~79° от центра

        let visible = spot(owner, &owner_at_origin(), &vision, &[ahead, behind, side], &[]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].entity, ahead.entity);
    }

    #[test]
    fn test_spot_occlusion_gate() {
        let owner = Entity::from_raw(100);
        let vision = Vision {
            eyes: vec![Eye {
                offset: Vec3::ZERO,
                ..Default::default()
            }],
        };

        let target = candidate(1, Vec3::new(0.0, 0.0, -8.0));
        // Стена между глазом и целью
        let wall = SceneVolume {
            root: Entity::from_raw(50),
            shape: VolumeShape::Box {
                half_extents: Vec3::new(2.0, 2.0, 0.2),
            },
            center: Vec3::new(0.0, 0.0, -4.0),
            layer: layers::LAYER_ENVIRONMENT,
        };

        let visible = spot(owner, &owner_at_origin(), &vision, &[target], &[wall]);
        assert!(visible.is_empty());

        // Стена в стороне — не заслоняет
        let side_wall = SceneVolume {
            center: Vec3::new(6.0, 0.0, -4.0),
            ..wall
        };
        let visible = spot(owner, &owner_at_origin(), &vision, &[target], &[side_wall]);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_spot_any_eye_union_dedup() {
        let owner = Entity::from_raw(100);
        // Два глаза: вперёд и назад; цель сзади видима только второму,
        // цель впереди — обоим (узкий и широкий конус), но в результате раз
        let vision = Vision {
            eyes: vec![
                eye_no_occlusion(),
                Eye {
                    forward: Vec3::Z,
                    ..eye_no_occlusion()
                },
            ],
        };

        let front = candidate(1, Vec3::new(0.0, 0.0, -4.0));
        let back = candidate(2, Vec3::new(0.0, 0.0, 4.0));

        let visible = spot(owner, &owner_at_origin(), &vision, &[front, back], &[]);
        let entities: Vec<Entity> = visible.iter().map(|c| c.entity).collect();
        assert_eq!(entities, vec![front.entity, back.entity]);
    }

    #[test]
    fn test_spot_skips_owner() {
        let owner = Entity::from_raw(100);
        let vision = Vision {
            eyes: vec![eye_no_occlusion()],
        };
        let own_body = SightCandidate {
            entity: owner,
            center: Vec3::new(0.0, 0.0, -1.0),
        };

        let visible = spot(owner, &owner_at_origin(), &vision, &[own_body], &[]);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_most_likely_by_center_angle() {
        let xf = owner_at_origin();
        let centered = candidate(1, Vec3::new(0.5, 0.0, -10.0));
        let offside = candidate(2, Vec3::new(4.0, 0.0, -5.0));

        let best = most_likely_target(&xf, TargetMetric::CenterAngle, &[offside, centered]);
        assert_eq!(best, Some(centered.entity));
    }

    #[test]
    fn test_most_likely_by_distance_tie_breaks_first() {
        let xf = owner_at_origin();
        let a = candidate(1, Vec3::new(0.0, 0.0, -5.0));
        let b = candidate(2, Vec3::new(5.0, 0.0, 0.0)); // та же дистанция

        let best = most_likely_target(&xf, TargetMetric::Distance, &[a, b]);
        assert_eq!(best, Some(a.entity));
    }

    #[test]
    fn test_most_likely_empty() {
        let xf = owner_at_origin();
        assert_eq!(most_likely_target(&xf, TargetMetric::Distance, &[]), None);
    }
}
