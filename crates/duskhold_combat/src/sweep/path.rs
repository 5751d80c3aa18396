//! Scan path — интерполяция дуги замаха вокруг orbit точки
//!
//! Прямая интерполяция позиций оружия срезает дугу замаха хордой и теряет
//! контакты у краёв. Вместо этого offset'ы от orbit точки (плечо, рукоять)
//! интерполируются сферически: даже 2 sample'а на однокадровый удар дают
//! дугу, а не отрезок.

use bevy::prelude::*;

use super::SweepError;

/// Минимальное число точек пути (1 сегмент)
pub const MIN_SCAN_POINTS: usize = 2;

const EPS: f32 = 1e-6;

/// Ориентация конца дуги (позиция + поворот оружия)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl ScanFrame {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Точка scan пути на доле t ∈ [0,1]
#[derive(Debug, Clone, Copy)]
pub struct ScanPoint {
    pub position: Vec3,
    pub rotation: Quat,
    /// Мировой центр cast формы (position + rotation * local_center)
    pub center: Vec3,
    pub t: f32,
}

impl ScanPoint {
    /// Точка без локального смещения формы (center == position)
    pub fn at(position: Vec3, rotation: Quat, t: f32) -> Self {
        Self {
            position,
            rotation,
            center: position,
            t,
        }
    }
}

/// Строит scan путь из `points` точек между двумя ориентациями вокруг orbit.
///
/// offset(t) = slerp(from.position − orbit, to.position − orbit, t),
/// position = orbit + offset, rotation = нормализованный lerp поворотов,
/// center = position + rotation * local_center.
///
/// Чистая функция; `points < 2` — `SweepError::InvalidArgument`.
pub fn build_scan_path(
    orbit: Vec3,
    from: ScanFrame,
    to: ScanFrame,
    local_center: Vec3,
    points: usize,
) -> Result<Vec<ScanPoint>, SweepError> {
    if points < MIN_SCAN_POINTS {
        return Err(SweepError::InvalidArgument(points));
    }

    let offset_a = from.position - orbit;
    let offset_b = to.position - orbit;

    let mut path = Vec::with_capacity(points);
    for i in 0..points {
        let t = i as f32 / (points - 1) as f32;

        let position = orbit + slerp_offset(offset_a, offset_b, t);
        let rotation = from.rotation.lerp(to.rotation, t);
        let center = position + rotation * local_center;

        path.push(ScanPoint {
            position,
            rotation,
            center,
            t,
        });
    }

    Ok(path)
}

/// Сферическая интерполяция offset-векторов: направление идёт по дуге,
/// длина лерпится. Вырожденные случаи (нулевой offset, коллинеарность)
/// откатываются к линейному lerp.
pub(crate) fn slerp_offset(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    let len_a = a.length();
    let len_b = b.length();
    if len_a < EPS || len_b < EPS {
        return a.lerp(b, t);
    }

    let dir_a = a / len_a;
    let dir_b = b / len_b;
    let angle = dir_a.dot(dir_b).clamp(-1.0, 1.0).acos();
    if angle < EPS {
        return a.lerp(b, t);
    }

    let cross = dir_a.cross(dir_b);
    let axis = if cross.length_squared() < EPS * EPS {
        // Противонаправленные offsets: плоскость дуги не определена,
        // берём любую ортогональную ось
        dir_a.any_orthonormal_vector()
    } else {
        cross.normalize()
    };

    let dir = Quat::from_axis_angle(axis, angle * t) * dir_a;
    let len = len_a + (len_b - len_a) * t;
    dir * len
}
