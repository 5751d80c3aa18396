//! Combat module — от замаха к обработанному удару
//!
//! Пайплайн за один тик (chained, порядок важен):
//! 1. tick_hit_cooldowns — тик re-hit окон движущихся опасностей
//! 2. update_guard_windows — тик parry окон защитников
//! 3. perform_swing_sweeps — прокат дуги активных замахов → SweepHit
//! 4. resolve_sweep_hits — контакт → HitData → обработка получателем
//! 5. update_swing_phases — тик фаз замаха, SwingFinished
//! 6. mark_dead — Dead маркер, труп перестаёт быть targetable
//!
//! Всё завершается в том же тике, в котором запущено; параллелизма нет.

use bevy::prelude::*;

pub mod hit_data;
pub mod receiver;
pub mod resolver;
pub mod swing;

// Re-export основных типов
pub use hit_data::{HitData, MoveStats};
pub use receiver::{update_guard_windows, GuardState, HitReceiver};
pub use resolver::{
    resolve_scan_hit, tick_hit_cooldowns, Dead, EntityDied, HitCooldowns, HitLanded, HitPolicy,
    ResolvedHit, SweepHit, REHIT_COOLDOWN,
};
pub use swing::{MeleeSwing, SwingArc, SwingFinished, SwingPhase, SwingProfile};

/// Combat Plugin — регистрирует пайплайн ударов в FixedUpdate
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SweepHit>()
            .add_event::<HitLanded>()
            .add_event::<SwingFinished>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                resolver::tick_hit_cooldowns,
                receiver::update_guard_windows,
                swing::perform_swing_sweeps,
                resolver::resolve_sweep_hits,
                swing::update_swing_phases,
                resolver::mark_dead,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
