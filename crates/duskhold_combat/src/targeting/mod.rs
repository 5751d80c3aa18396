//! Targeting module — кого агент видит и в кого целится
//!
//! - filter: живые выборки врагов/друзей поверх глобального множества
//! - vision: multi-eye spotting (range + FOV + occlusion)
//! - state: Idle ⇄ Targeting state machine
//!
//! Порядок в тике: publish relation событий → refresh фильтров →
//! targeting transitions. Фильтры консистентны на момент последнего
//! триггера, не real-time.

use bevy::prelude::*;

pub mod filter;
pub mod state;
pub mod vision;

pub use filter::{refresh_relation_filters, FilterKind, RelationFilter};
pub use state::{update_targeting, TargetChanged, TargetInput, TargeterConfig, TargetingState};
pub use vision::{most_likely_target, spot, Eye, SightCandidate, TargetMetric, Vision};

use crate::relations::RelationPublish;

/// Targeting Plugin
pub struct TargetingPlugin;

impl Plugin for TargetingPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TargetInput>().add_event::<TargetChanged>();

        app.add_systems(
            FixedUpdate,
            (filter::refresh_relation_filters, state::update_targeting)
                .chain()
                .after(RelationPublish),
        );
    }
}
