//! Sweep caster — объёмные cast'ы вдоль scan пути
//!
//! Для каждой пары соседних scan точек форма (сфера или box, выровненный по
//! повороту точки) кастится от текущего center к следующему. Один root
//! попадает в результат не больше одного раза за весь sweep — первым
//! встреченным контактом. Порядок результата — порядок обнаружения по
//! сегментам; внутри сегмента контакты стабильно сортируются по дистанции,
//! чтобы одновременные попадания обрабатывались воспроизводимо.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::{SceneVolume, VolumeShape};

use super::path::{ScanPoint, MIN_SCAN_POINTS};
use super::SweepError;

const EPS: f32 = 1e-6;

/// Форма sweep'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepShape {
    Sphere { radius: f32 },
    /// Box выравнивается по rotation стартовой точки сегмента
    Box { half_extents: Vec3 },
}

/// Один контакт sweep'а
#[derive(Debug, Clone, Copy)]
pub struct ScanHit {
    /// Root entity задетого объёма
    pub root: Entity,
    /// Мировая точка контакта
    pub point: Vec3,
    /// Дистанция контакта вдоль сегмента (метры от его начала)
    pub distance: f32,
    /// Направление sweep'а в момент контакта (unit)
    pub direction: Vec3,
    /// Ориентация, из которой шёл сегмент
    pub origin: ScanPoint,
    /// Индекс сегмента пути
    pub segment: usize,
}

/// Результат sweep'а
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// Уникальные по root контакты в порядке обнаружения
    pub hits: Vec<ScanHit>,
    /// Roots, чьи объёмы пропущены из-за неподдерживаемой комбинации форм
    pub unsupported: Vec<Entity>,
}

/// Прокатывает форму по scan пути через срез объёмов сцены.
///
/// Сегмент нулевой длины пропускается (контактов нет, не ошибка).
/// Путь короче 2 точек — `SweepError::InvalidArgument`.
pub fn sweep_path(
    points: &[ScanPoint],
    shape: SweepShape,
    mask: u32,
    volumes: &[SceneVolume],
) -> Result<SweepOutcome, SweepError> {
    if points.len() < MIN_SCAN_POINTS {
        return Err(SweepError::InvalidArgument(points.len()));
    }

    let mut outcome = SweepOutcome::default();
    let mut seen: HashSet<Entity> = HashSet::new();
    let mut seen_unsupported: HashSet<Entity> = HashSet::new();

    for (segment, pair) in points.windows(2).enumerate() {
        let start = pair[0].center;
        let end = pair[1].center;

        let seg = end - start;
        let len = seg.length();
        if len < EPS {
            continue;
        }
        let dir = seg / len;

        // Кандидаты сегмента: (distance, point, root)
        let mut candidates: Vec<(f32, Vec3, Entity)> = Vec::new();

        for vol in volumes {
            if !vol.matches(mask) || seen.contains(&vol.root) {
                continue;
            }

            match cast_against(shape, pair[0].rotation, start, end, dir, len, vol) {
                Ok(Some((distance, point))) => candidates.push((distance, point, vol.root)),
                Ok(None) => {}
                Err(SweepError::UnsupportedShape) => {
                    if seen_unsupported.insert(vol.root) {
                        crate::logger::log_warning(&format!(
                            "sweep: unsupported shape pair, skipping volume of {:?}",
                            vol.root
                        ));
                        outcome.unsupported.push(vol.root);
                    }
                }
                Err(other) => return Err(other),
            }
        }

        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        for (distance, point, root) in candidates {
            if !seen.insert(root) {
                continue;
            }
            outcome.hits.push(ScanHit {
                root,
                point,
                distance,
                direction: dir,
                origin: pair[0],
                segment,
            });
        }
    }

    Ok(outcome)
}

/// Cast формы против одного объёма. Ok(Some) — контакт, Ok(None) — мимо.
fn cast_against(
    shape: SweepShape,
    rotation: Quat,
    start: Vec3,
    end: Vec3,
    dir: Vec3,
    len: f32,
    vol: &SceneVolume,
) -> Result<Option<(f32, Vec3)>, SweepError> {
    match (shape, vol.shape) {
        (SweepShape::Sphere { radius }, VolumeShape::Sphere { radius: vol_radius }) => {
            let Some(distance) = ray_sphere_enter(start, dir, len, vol.center, radius + vol_radius)
            else {
                return Ok(None);
            };
            let cast_center = start + dir * distance;
            let to_contact = cast_center - vol.center;
            let point = if to_contact.length_squared() < EPS * EPS {
                cast_center
            } else {
                vol.center + to_contact.normalize() * vol_radius
            };
            Ok(Some((distance, point)))
        }

        (SweepShape::Sphere { radius }, VolumeShape::Box { half_extents }) => {
            let inflated = half_extents + Vec3::splat(radius);
            let Some(t) = segment_aabb_enter(start, end, vol.center, inflated) else {
                return Ok(None);
            };
            let distance = t * len;
            let cast_center = start + dir * distance;
            let local = (cast_center - vol.center).clamp(-half_extents, half_extents);
            Ok(Some((distance, vol.center + local)))
        }

        (SweepShape::Box { half_extents }, VolumeShape::Sphere { radius }) => {
            // Относительное движение центра сферы в локальных осях box'а
            let inv = rotation.inverse();
            let local_from = inv * (vol.center - start);
            let local_to = inv * (vol.center - end);
            let inflated = half_extents + Vec3::splat(radius);
            let Some(t) = segment_aabb_enter(local_from, local_to, Vec3::ZERO, inflated) else {
                return Ok(None);
            };
            let distance = t * len;
            let box_center = start + dir * distance;
            let local = (inv * (vol.center - box_center)).clamp(-half_extents, half_extents);
            Ok(Some((distance, box_center + rotation * local)))
        }

        (SweepShape::Box { .. }, VolumeShape::Box { .. }) => Err(SweepError::UnsupportedShape),
    }
}

/// Дистанция входа луча в сферу; старт внутри — 0.
pub(crate) fn ray_sphere_enter(
    origin: Vec3,
    dir: Vec3,
    max_dist: f32,
    center: Vec3,
    radius: f32,
) -> Option<f32> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = m.dot(dir);
    if b > 0.0 {
        // Снаружи и удаляемся
        return None;
    }

    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let t = -b - disc.sqrt();
    (t <= max_dist).then_some(t)
}

/// Параметр входа сегмента в AABB (slab метод); старт внутри — 0.
pub(crate) fn segment_aabb_enter(start: Vec3, end: Vec3, center: Vec3, half: Vec3) -> Option<f32> {
    let d = end - start;
    let s = start - center;

    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = 1.0;

    for axis in 0..3 {
        let da = d[axis];
        let sa = s[axis];
        let ha = half[axis];

        if da.abs() < EPS {
            if sa.abs() > ha {
                return None;
            }
            continue;
        }

        let mut t1 = (-ha - sa) / da;
        let mut t2 = (ha - sa) / da;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min.max(0.0))
}

/// Перекрыт ли отрезок хотя бы одним объёмом из маски (LOS raycast).
///
/// Roots из `exclude` не заслоняют (сам наблюдатель и цель).
pub(crate) fn segment_blocked(
    start: Vec3,
    end: Vec3,
    mask: u32,
    volumes: &[SceneVolume],
    exclude: &[Entity],
) -> bool {
    let seg = end - start;
    let len = seg.length();
    if len < EPS {
        return false;
    }
    let dir = seg / len;

    for vol in volumes {
        if !vol.matches(mask) || exclude.contains(&vol.root) {
            continue;
        }

        let blocked = match vol.shape {
            VolumeShape::Sphere { radius } => {
                ray_sphere_enter(start, dir, len, vol.center, radius).is_some()
            }
            VolumeShape::Box { half_extents } => {
                segment_aabb_enter(start, end, vol.center, half_extents).is_some()
            }
        };
        if blocked {
            return true;
        }
    }

    false
}

/// Ближайшая к `p` точка отрезка [a, b]
pub(crate) fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPS * EPS {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;
    use crate::sweep::path::{build_scan_path, ScanFrame, ScanPoint};

    fn sphere_volume(root: Entity, center: Vec3, radius: f32) -> SceneVolume {
        SceneVolume {
            root,
            shape: VolumeShape::Sphere { radius },
            center,
            layer: layers::LAYER_ACTORS,
        }
    }

    fn line_path(from: Vec3, to: Vec3, points: usize) -> Vec<ScanPoint> {
        (0..points)
            .map(|i| {
                let t = i as f32 / (points - 1) as f32;
                ScanPoint::at(from.lerp(to, t), Quat::IDENTITY, t)
            })
            .collect()
    }

    #[test]
    fn test_sweep_rejects_short_path() {
        let path = [ScanPoint::at(Vec3::ZERO, Quat::IDENTITY, 0.0)];
        let result = sweep_path(&path, SweepShape::Sphere { radius: 0.5 }, u32::MAX, &[]);
        assert_eq!(result.err(), Some(SweepError::InvalidArgument(1)));
    }

    #[test]
    fn test_sweep_dedups_root_across_segments() {
        // Объём накрывает весь путь — каждый сегмент пересекает его,
        // но в результате root ровно один раз
        let target = Entity::from_raw(10);
        let volumes = [sphere_volume(target, Vec3::new(2.0, 0.0, 0.0), 10.0)];

        let path = line_path(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 6);
        let outcome =
            sweep_path(&path, SweepShape::Sphere { radius: 0.3 }, u32::MAX, &volumes).unwrap();

        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].root, target);
        assert_eq!(outcome.hits[0].segment, 0);
    }

    #[test]
    fn test_sweep_hits_midpoint_target_with_tangent_direction() {
        // Дуга 90° радиуса 2 вокруг origin, цель на середине дуги
        let orbit = Vec3::ZERO;
        let from = ScanFrame::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY);
        let to = ScanFrame::new(Vec3::new(0.0, 0.0, 2.0), Quat::IDENTITY);
        let path = build_scan_path(orbit, from, to, Vec3::ZERO, 5).unwrap();

        let mid = std::f32::consts::FRAC_PI_4;
        let target = Entity::from_raw(3);
        let volumes = [sphere_volume(
            target,
            Vec3::new(2.0 * mid.cos(), 0.0, 2.0 * mid.sin()),
            0.2,
        )];

        let outcome =
            sweep_path(&path, SweepShape::Sphere { radius: 0.1 }, u32::MAX, &volumes).unwrap();

        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].root, target);

        // Касательная к дуге в середине: (-sin 45°, 0, cos 45°)
        let tangent = Vec3::new(-mid.sin(), 0.0, mid.cos());
        let dot = outcome.hits[0].direction.dot(tangent);
        assert!(dot > 0.95, "direction {:?} vs tangent {:?}", outcome.hits[0].direction, tangent);
    }

    #[test]
    fn test_sweep_skips_zero_length_segments() {
        let p = ScanPoint::at(Vec3::ZERO, Quat::IDENTITY, 0.0);
        let path = [p, p, ScanPoint::at(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, 1.0)];

        let target = Entity::from_raw(5);
        let volumes = [sphere_volume(target, Vec3::new(1.0, 0.0, 0.0), 0.4)];

        let outcome =
            sweep_path(&path, SweepShape::Sphere { radius: 0.2 }, u32::MAX, &volumes).unwrap();
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].segment, 1);
    }

    #[test]
    fn test_sweep_orders_same_segment_hits_by_distance() {
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        // far раньше в срезе, но дальше по ходу sweep'а
        let volumes = [
            sphere_volume(far, Vec3::new(3.0, 0.0, 0.0), 0.3),
            sphere_volume(near, Vec3::new(1.0, 0.0, 0.0), 0.3),
        ];

        let path = line_path(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 2);
        let outcome =
            sweep_path(&path, SweepShape::Sphere { radius: 0.2 }, u32::MAX, &volumes).unwrap();

        assert_eq!(outcome.hits.len(), 2);
        assert_eq!(outcome.hits[0].root, near);
        assert_eq!(outcome.hits[1].root, far);
        assert!(outcome.hits[0].distance < outcome.hits[1].distance);
    }

    #[test]
    fn test_sweep_respects_layer_mask() {
        let wall = Entity::from_raw(8);
        let volumes = [SceneVolume {
            root: wall,
            shape: VolumeShape::Sphere { radius: 1.0 },
            center: Vec3::new(1.0, 0.0, 0.0),
            layer: layers::LAYER_ENVIRONMENT,
        }];

        let path = line_path(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), 2);
        let outcome = sweep_path(
            &path,
            SweepShape::Sphere { radius: 0.2 },
            layers::MASK_MELEE_SWEEP,
            &volumes,
        )
        .unwrap();
        assert!(outcome.hits.is_empty());
    }

    #[test]
    fn test_box_sweep_against_box_volume_reported_unsupported() {
        let crate_root = Entity::from_raw(4);
        let volumes = [SceneVolume {
            root: crate_root,
            shape: VolumeShape::Box {
                half_extents: Vec3::splat(0.5),
            },
            center: Vec3::new(1.0, 0.0, 0.0),
            layer: layers::LAYER_ACTORS,
        }];

        let path = line_path(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), 3);
        let outcome = sweep_path(
            &path,
            SweepShape::Box {
                half_extents: Vec3::splat(0.3),
            },
            u32::MAX,
            &volumes,
        )
        .unwrap();

        assert!(outcome.hits.is_empty());
        assert_eq!(outcome.unsupported, vec![crate_root]);
    }

    #[test]
    fn test_box_sweep_hits_sphere_volume() {
        let target = Entity::from_raw(6);
        let volumes = [sphere_volume(target, Vec3::new(2.0, 0.4, 0.0), 0.3)];

        let path = line_path(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 2);
        let outcome = sweep_path(
            &path,
            SweepShape::Box {
                half_extents: Vec3::new(0.1, 0.5, 0.1),
            },
            u32::MAX,
            &volumes,
        )
        .unwrap();

        assert_eq!(outcome.hits.len(), 1);
        assert!(outcome.hits[0].distance > 0.0);
    }

    #[test]
    fn test_ray_sphere_start_inside() {
        let t = ray_sphere_enter(Vec3::ZERO, Vec3::X, 5.0, Vec3::new(0.1, 0.0, 0.0), 1.0);
        assert_eq!(t, Some(0.0));
    }

    #[test]
    fn test_segment_aabb_miss_parallel_axis() {
        // Отрезок параллелен X и проходит выше box'а
        let t = segment_aabb_enter(
            Vec3::new(-2.0, 2.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::ZERO,
            Vec3::splat(1.0),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn test_closest_point_on_segment_clamps_ends() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(-1.0, 1.0, 0.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(5.0, 1.0, 0.0)), b);
        assert_eq!(
            closest_point_on_segment(a, b, Vec3::new(1.0, 3.0, 0.0)),
            Vec3::new(1.0, 0.0, 0.0)
        );
    }
}
