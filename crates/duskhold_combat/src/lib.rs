//! DUSKHOLD Combat Core
//!
//! Headless ECS-симуляция боевого ядра (Bevy 0.16, strategic layer):
//! hit-scan sweeps по дуге замаха, разрешение ударов, граф отношений,
//! targeting/vision и снаряды. Рендер/движок — внешний tactical слой:
//! он спавнит entity с нужными компонентами, шлёт input события и
//! читает HitLanded/TargetChanged обратно.
//!
//! Никакого ambient DI: все зависимости — компоненты и ресурсы,
//! передаваемые явно; жизненный цикл — FixedUpdate тики владеющего App.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

// Публичные модули
pub mod combat;
pub mod components;
pub mod layers;
pub mod logger;
pub mod projectile;
pub mod relations;
pub mod sweep;
pub mod targeting;

// Re-export базовых типов для удобства
pub use combat::{
    CombatPlugin, Dead, EntityDied, GuardState, HitCooldowns, HitData, HitLanded, HitPolicy,
    HitReceiver, MeleeSwing, MoveStats, SwingArc, SwingFinished, SwingPhase, SwingProfile,
    REHIT_COOLDOWN,
};
pub use components::*;
pub use projectile::{
    Projectile, ProjectileExpired, ProjectilePlugin, ProjectileTracker,
    DEFAULT_PREDICTION_WINDOW,
};
pub use relations::{
    RelationChanged, RelationGraph, RelationKey, RelationsPlugin, RelationsUpdated,
    DEFAULT_RELATION_THRESHOLD,
};
pub use sweep::{
    build_scan_path, sweep_path, ScanFrame, ScanHit, ScanPoint, SweepError, SweepOutcome,
    SweepShape, MIN_SCAN_POINTS,
};
pub use targeting::{
    most_likely_target, spot, Eye, FilterKind, RelationFilter, SightCandidate, TargetChanged,
    TargetInput, TargetMetric, TargeterConfig, TargetingPlugin, TargetingState, Vision,
};

/// Частота симуляции (Hz)
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            // Подсистемы
            .add_plugins((
                CombatPlugin,
                RelationsPlugin,
                TargetingPlugin,
                ProjectilePlugin,
            ));
    }
}

/// Создаёт minimal Bevy App для headless симуляции.
///
/// Время двигается вручную: каждый `app.update()` — ровно один fixed тик,
/// чтобы тесты и headless прогоны были детерминированы и не зависели от
/// wall clock.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )))
        .add_plugins(CorePlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
/// (сортировка по Entity ID, сериализация через Debug)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
