//! Relation filter — живая выборка врагов/друзей из глобального множества
//!
//! Реактивный view: членство пересчитывается когда (a) глобальное множество
//! Identity меняется (spawn/despawn), или (b) граф владельца опубликовал
//! изменение. Между событиями список не пересобирается — `members`
//! консистентен на момент последнего триггера.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::Identity;
use crate::relations::{RelationGraph, RelationsUpdated};

/// Какое производное множество фильтруем
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Enemies,
    Friends,
}

/// Живая выборка entities, подходящих под предикат отношения владельца
#[derive(Component, Debug, Clone)]
pub struct RelationFilter {
    pub kind: FilterKind,
    /// Члены выборки на момент последнего триггера
    pub members: Vec<Entity>,
}

impl RelationFilter {
    pub fn enemies() -> Self {
        Self {
            kind: FilterKind::Enemies,
            members: Vec::new(),
        }
    }

    pub fn friends() -> Self {
        Self {
            kind: FilterKind::Friends,
            members: Vec::new(),
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }
}

/// Система: пересборка фильтров по триггерам
pub fn refresh_relation_filters(
    mut filters: Query<(Entity, &mut RelationFilter, &RelationGraph)>,
    identities: Query<(Entity, &Identity)>,
    added: Query<Entity, Added<Identity>>,
    mut removed: RemovedComponents<Identity>,
    mut updated: EventReader<RelationsUpdated>,
) {
    let population_changed = !added.is_empty() || removed.read().next().is_some();
    let changed_owners: HashSet<Entity> = updated.read().map(|event| event.owner).collect();

    if !population_changed && changed_owners.is_empty() {
        return;
    }

    for (owner, mut filter, graph) in filters.iter_mut() {
        if !population_changed && !changed_owners.contains(&owner) {
            continue;
        }

        let kind = filter.kind;
        filter.members = identities
            .iter()
            .filter(|(entity, identity)| {
                *entity != owner
                    && match kind {
                        FilterKind::Enemies => graph.is_enemy(identity),
                        FilterKind::Friends => graph.is_friend(identity),
                    }
            })
            .map(|(entity, _)| entity)
            .collect();

        crate::logger::log(&format!(
            "🔍 RelationFilter({:?}) of {:?} refreshed: {} members",
            kind,
            owner,
            filter.members.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_constructors() {
        let enemies = RelationFilter::enemies();
        assert_eq!(enemies.kind, FilterKind::Enemies);
        assert!(enemies.members.is_empty());
        assert!(!enemies.contains(Entity::from_raw(1)));

        assert_eq!(RelationFilter::friends().kind, FilterKind::Friends);
    }
}
