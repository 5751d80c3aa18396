//! Melee swing — фазовый драйвер замаха (windup → active → recovery)
//!
//! Внешний behavior-слой вешает `MeleeSwing` на атакующего; во время Active
//! фазы оружейная дуга прокатывается sweep'ом кадр за кадром (прошлый тик →
//! текущий тик через scan path). `struck` копит задетые root'ы: весь замах
//! бьёт один root не больше одного раза. Снятие компонента посреди замаха —
//! отмена: дальнейшей обработки ударов нет.

use bevy::prelude::*;

use crate::components::{SceneCollider, SceneVolume};
use crate::layers;
use crate::sweep::path::slerp_offset;
use crate::sweep::{build_scan_path, sweep_path, ScanFrame, SweepShape};

use super::hit_data::MoveStats;
use super::resolver::SweepHit;

/// Дуга замаха в локальных координатах атакующего
#[derive(Debug, Clone, Copy)]
pub struct SwingArc {
    /// Orbit точка дуги (плечо)
    pub orbit: Vec3,
    pub from: ScanFrame,
    pub to: ScanFrame,
}

impl SwingArc {
    pub fn world_orbit(&self, xf: &Transform) -> Vec3 {
        xf.translation + xf.rotation * self.orbit
    }

    /// Мировая ориентация оружия на доле замаха p ∈ [0,1]
    pub fn world_frame(&self, xf: &Transform, p: f32) -> ScanFrame {
        let offset = slerp_offset(
            self.from.position - self.orbit,
            self.to.position - self.orbit,
            p,
        );
        let local_pos = self.orbit + offset;
        let local_rot = self.from.rotation.lerp(self.to.rotation, p);

        ScanFrame::new(
            xf.translation + xf.rotation * local_pos,
            xf.rotation * local_rot,
        )
    }
}

impl Default for SwingArc {
    fn default() -> Self {
        // Горизонтальный слэш справа налево перед грудью (перед — локальный -Z)
        Self {
            orbit: Vec3::new(0.0, 1.2, 0.0),
            from: ScanFrame::new(Vec3::new(0.7, 1.2, -0.4), Quat::IDENTITY),
            to: ScanFrame::new(Vec3::new(-0.7, 1.2, -0.4), Quat::IDENTITY),
        }
    }
}

/// Конфигурация замаха (доля характеристик, форма, тайминги)
#[derive(Debug, Clone)]
pub struct SwingProfile {
    /// Длительность телеграфа (секунды)
    pub windup: f32,
    /// Длительность активной фазы (hit detection)
    pub active: f32,
    /// Длительность восстановления (уязвимость)
    pub recovery: f32,
    pub arc: SwingArc,
    pub shape: SweepShape,
    /// Центр формы в локале оружия
    pub local_center: Vec3,
    /// Число scan точек на тик (2 достаточно для однокадрового среза дуги)
    pub scan_points: usize,
    pub stats: MoveStats,
    pub mask: u32,
}

impl Default for SwingProfile {
    fn default() -> Self {
        Self {
            windup: 0.25,
            active: 0.2,
            recovery: 0.3,
            arc: SwingArc::default(),
            shape: SweepShape::Sphere { radius: 0.4 },
            local_center: Vec3::ZERO,
            scan_points: 2,
            stats: MoveStats::default(),
            mask: layers::MASK_MELEE_SWEEP,
        }
    }
}

/// Фазы замаха
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingPhase {
    /// Телеграф (виден врагу, hitbox выключен)
    Windup,
    /// Дуга прокатывается sweep'ом
    Active,
    /// Восстановление (уязвимость)
    Recovery,
}

/// Состояние текущего замаха
#[derive(Component, Debug, Clone)]
pub struct MeleeSwing {
    pub phase: SwingPhase,
    /// Остаток текущей фазы (секунды)
    pub phase_timer: f32,
    pub profile: SwingProfile,
    /// Доля active фазы, уже прокатанная sweep'ом
    pub progress: f32,
    /// Root'ы, задетые за этот замах (повторно не бьём)
    pub struck: Vec<Entity>,
    /// Суммарный урон замаха (read-back для наружного слоя)
    pub total_damage: f32,
}

impl MeleeSwing {
    pub fn new(profile: SwingProfile) -> Self {
        let timer = profile.windup;
        Self {
            phase: SwingPhase::Windup,
            phase_timer: timer,
            profile,
            progress: 0.0,
            struck: Vec::new(),
            total_damage: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == SwingPhase::Active
    }
}

/// Событие: замах завершён (аггрегат для behavior-слоя)
#[derive(Event, Debug, Clone)]
pub struct SwingFinished {
    pub attacker: Entity,
    pub targets_hit: usize,
    pub total_damage: f32,
}

// ============================================================================
// Systems
// ============================================================================

/// Система: прокат sweep'ов активной фазы
///
/// Идёт ПЕРЕД тиком фаз: p1 считается из таймера на конец текущего тика,
/// поэтому хвост дуги [p0, 1] прокатывается в тот же тик, в котором active
/// фаза истекает.
pub fn perform_swing_sweeps(
    mut swings: Query<(Entity, &Transform, &mut MeleeSwing)>,
    colliders: Query<(Entity, &Transform, &SceneCollider)>,
    time: Res<Time<Fixed>>,
    mut sweep_hits: EventWriter<SweepHit>,
) {
    let delta = time.delta_secs();

    for (attacker, xf, mut swing) in swings.iter_mut() {
        if !swing.is_active() {
            continue;
        }

        let p0 = swing.progress;
        let p1 = if swing.profile.active <= 0.0 {
            1.0
        } else {
            (1.0 - (swing.phase_timer - delta).max(0.0) / swing.profile.active).clamp(p0, 1.0)
        };
        if p1 <= p0 {
            continue;
        }

        let orbit = swing.profile.arc.world_orbit(xf);
        let from = swing.profile.arc.world_frame(xf, p0);
        let to = swing.profile.arc.world_frame(xf, p1);

        let path = match build_scan_path(
            orbit,
            from,
            to,
            swing.profile.local_center,
            swing.profile.scan_points.max(2),
        ) {
            Ok(path) => path,
            Err(err) => {
                crate::logger::log_error(&format!(
                    "swing: scan path failed for {:?}: {}",
                    attacker, err
                ));
                swing.progress = p1;
                continue;
            }
        };

        let volumes: Vec<SceneVolume> = colliders
            .iter()
            .filter(|(root, _, _)| *root != attacker)
            .map(|(root, vxf, collider)| SceneVolume::from_collider(root, vxf, collider))
            .collect();

        let outcome = match sweep_path(&path, swing.profile.shape, swing.profile.mask, &volumes) {
            Ok(outcome) => outcome,
            Err(err) => {
                crate::logger::log_error(&format!("swing: sweep failed for {:?}: {}", attacker, err));
                swing.progress = p1;
                continue;
            }
        };

        for hit in outcome.hits {
            if swing.struck.contains(&hit.root) {
                continue;
            }
            swing.struck.push(hit.root);

            sweep_hits.write(SweepHit {
                attacker,
                stats: swing.profile.stats,
                hit,
            });
        }

        swing.progress = p1;
    }
}

/// Система: тик фаз замаха (windup → active → recovery → снятие)
pub fn update_swing_phases(
    mut swings: Query<(Entity, &mut MeleeSwing)>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut finished: EventWriter<SwingFinished>,
) {
    let delta = time.delta_secs();

    for (entity, mut swing) in swings.iter_mut() {
        swing.phase_timer -= delta;
        if swing.phase_timer > 0.0 {
            continue;
        }

        match swing.phase {
            SwingPhase::Windup => {
                swing.phase = SwingPhase::Active;
                swing.phase_timer = swing.profile.active;
                swing.progress = 0.0;
                crate::logger::log(&format!("⚔️ Swing: Windup → Active (entity: {:?})", entity));
            }
            SwingPhase::Active => {
                swing.phase = SwingPhase::Recovery;
                swing.phase_timer = swing.profile.recovery;
                crate::logger::log(&format!("🛡️ Swing: Active → Recovery (entity: {:?})", entity));
            }
            SwingPhase::Recovery => {
                finished.write(SwingFinished {
                    attacker: entity,
                    targets_hit: swing.struck.len(),
                    total_damage: swing.total_damage,
                });
                commands.entity(entity).remove::<MeleeSwing>();
                crate::logger::log(&format!(
                    "✅ Swing complete (entity: {:?}, hits: {}, damage: {:.1})",
                    entity,
                    swing.struck.len(),
                    swing.total_damage
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swing_starts_in_windup() {
        let swing = MeleeSwing::new(SwingProfile::default());
        assert_eq!(swing.phase, SwingPhase::Windup);
        assert_eq!(swing.phase_timer, 0.25);
        assert!(!swing.is_active());
        assert!(swing.struck.is_empty());
    }

    #[test]
    fn test_arc_world_frame_endpoints() {
        let arc = SwingArc::default();
        let xf = Transform::from_translation(Vec3::new(10.0, 0.0, 0.0));

        let start = arc.world_frame(&xf, 0.0);
        let end = arc.world_frame(&xf, 1.0);

        assert!((start.position - (xf.translation + arc.from.position)).length() < 1e-4);
        assert!((end.position - (xf.translation + arc.to.position)).length() < 1e-4);
    }

    #[test]
    fn test_arc_respects_attacker_rotation() {
        let arc = SwingArc {
            orbit: Vec3::ZERO,
            from: ScanFrame::new(Vec3::X, Quat::IDENTITY),
            to: ScanFrame::new(Vec3::Z, Quat::IDENTITY),
        };
        // Атакующий повёрнут на 90° вокруг Y: локальный +X → мировой -Z
        let xf = Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let start = arc.world_frame(&xf, 0.0);
        assert!((start.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }
}
