//! Sweep подсистема — геометрия ударов по дуге
//!
//! - path: интерполяция scan пути вокруг orbit точки (плечо при замахе)
//! - caster: цепочка объёмных cast'ов вдоль пути + dedup по root
//!
//! Чистая геометрия без side effects: системы боя собирают снимок
//! `SceneVolume` из ECS и зовут `sweep_path`.

use thiserror::Error;

pub mod caster;
pub mod path;

pub use caster::{sweep_path, ScanHit, SweepOutcome, SweepShape};
pub use path::{build_scan_path, ScanFrame, ScanPoint, MIN_SCAN_POINTS};

/// Ошибки sweep геометрии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SweepError {
    /// Путь короче минимума — фатально для вызова, частичного результата нет
    #[error("scan path requires at least 2 points (got {0})")]
    InvalidArgument(usize),

    /// Комбинация форм, которую caster не умеет; объём пропускается
    #[error("box sweep against box volume is not supported")]
    UnsupportedShape,
}
