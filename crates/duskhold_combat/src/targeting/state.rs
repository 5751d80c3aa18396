//! Targeting state machine — захват и сброс цели
//!
//! Idle ⇄ Targeting, гоняется внешним behavior-контроллером через
//! TargetInput ("навести цель" — toggle). Переходы:
//! - Idle → Targeting: input И есть хотя бы один видимый враг
//!   (выбор через most_likely_target)
//! - Targeting → Idle: повторный input, ИЛИ дистанция > max,
//!   ИЛИ цель перестала быть targetable
//!
//! Вход в Idle всегда чистит ссылку и шлёт TargetChanged если значение
//! изменилось.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::{SceneCollider, SceneVolume, Targetable};

use super::filter::RelationFilter;
use super::vision::{most_likely_target, spot, SightCandidate, TargetMetric, Vision};

/// Состояние прицеливания агента
#[derive(Component, Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetingState {
    /// Цели нет
    #[default]
    Idle,
    /// Цель захвачена
    Targeting { target: Entity },
}

impl TargetingState {
    pub fn target(&self) -> Option<Entity> {
        match self {
            TargetingState::Idle => None,
            TargetingState::Targeting { target } => Some(*target),
        }
    }
}

/// Параметры targeter'а
#[derive(Component, Debug, Clone)]
pub struct TargeterConfig {
    /// Дистанция, дальше которой цель сбрасывается (метры)
    pub max_distance: f32,
    /// Метрика выбора наиболее вероятной цели
    pub metric: TargetMetric,
}

impl Default for TargeterConfig {
    fn default() -> Self {
        Self {
            max_distance: 25.0,
            metric: TargetMetric::CenterAngle,
        }
    }
}

/// Событие: input action "навести/сбросить цель"
#[derive(Event, Debug, Clone)]
pub struct TargetInput {
    pub agent: Entity,
}

/// Событие: текущая цель агента изменилась
#[derive(Event, Debug, Clone)]
pub struct TargetChanged {
    pub agent: Entity,
    pub target: Option<Entity>,
}

/// Система: transitions targeting state machine
pub fn update_targeting(
    mut inputs: EventReader<TargetInput>,
    mut agents: Query<(
        Entity,
        &Transform,
        &Vision,
        &RelationFilter,
        &TargeterConfig,
        &mut TargetingState,
    )>,
    targetables: Query<(&Transform, &Targetable)>,
    colliders: Query<(Entity, &Transform, &SceneCollider)>,
    mut changed: EventWriter<TargetChanged>,
) {
    let toggled: HashSet<Entity> = inputs.read().map(|event| event.agent).collect();

    for (agent, xf, vision, filter, config, mut state) in agents.iter_mut() {
        let next = match &*state {
            TargetingState::Idle => {
                if !toggled.contains(&agent) {
                    continue;
                }

                // Кандидаты: члены enemy-фильтра, у которых включён Targetable
                let candidates: Vec<SightCandidate> = filter
                    .members
                    .iter()
                    .filter_map(|&entity| {
                        let (target_xf, targetable) = targetables.get(entity).ok()?;
                        targetable.enabled.then(|| SightCandidate {
                            entity,
                            center: targetable.center(target_xf),
                        })
                    })
                    .collect();

                let occluders: Vec<SceneVolume> = colliders
                    .iter()
                    .map(|(root, volume_xf, collider)| {
                        SceneVolume::from_collider(root, volume_xf, collider)
                    })
                    .collect();

                let visible = spot(agent, xf, vision, &candidates, &occluders);
                let Some(target) = most_likely_target(xf, config.metric, &visible) else {
                    // Врагов не видно — остаёмся в Idle
                    continue;
                };

                crate::logger::log(&format!("🎯 {:?} acquired target {:?}", agent, target));
                changed.write(TargetChanged {
                    agent,
                    target: Some(target),
                });
                TargetingState::Targeting { target }
            }

            TargetingState::Targeting { target } => {
                let target = *target;

                let dropped = if toggled.contains(&agent) {
                    true // явный toggle off
                } else {
                    match targetables.get(target) {
                        Ok((target_xf, targetable)) => {
                            !targetable.enabled
                                || xf.translation.distance(target_xf.translation)
                                    > config.max_distance
                        }
                        // despawned — больше не существует
                        Err(_) => true,
                    }
                };

                if !dropped {
                    continue;
                }

                crate::logger::log(&format!("🎯 {:?} dropped target {:?}", agent, target));
                changed.write(TargetChanged {
                    agent,
                    target: None,
                });
                TargetingState::Idle
            }
        };

        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_target_accessor() {
        assert_eq!(TargetingState::Idle.target(), None);

        let target = Entity::from_raw(4);
        assert_eq!(TargetingState::Targeting { target }.target(), Some(target));
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(TargetingState::default(), TargetingState::Idle);
    }
}
