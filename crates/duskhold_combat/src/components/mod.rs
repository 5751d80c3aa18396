//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: живые существа (Health, физическое тело бойца)
//! - identity: идентификация для relations/targeting (uid + labels, Targetable)
//! - collider: объёмы для sweep/occlusion запросов (SceneCollider)

pub mod actor;
pub mod collider;
pub mod identity;

// Re-exports для удобного импорта
pub use actor::*;
pub use collider::*;
pub use identity::*;
