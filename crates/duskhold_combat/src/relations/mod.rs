//! Relation graph — отношение агента к миру
//!
//! Каждый агент эксклюзивно владеет своим графом: ключ (uid entity или
//! label группы) → скаляр [-1, 1]. Производные множества друзей/врагов
//! пересчитываются жадно на каждой мутации — чтение O(1), мутация O(n)
//! (ожидаемые кардинальности — десятки, редко сотни записей).
//!
//! Нотификации явные: мутации копят pending ключи, система
//! `publish_relation_events` публикует их раз в тик — сначала "relation
//! changed for key" по каждому ключу, затем один "relations changed".

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Identity;

/// Порог производных множеств по умолчанию
pub const DEFAULT_RELATION_THRESHOLD: f32 = 0.2;

/// Ключ записи отношения
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKey {
    /// Конкретная entity по стабильному uid
    Uid(u64),
    /// Группа по ярлыку ("orcs", "guards")
    Label(String),
}

impl RelationKey {
    pub fn label(name: impl Into<String>) -> Self {
        Self::Label(name.into())
    }
}

/// Граф отношений одного агента
#[derive(Component, Debug, Clone)]
pub struct RelationGraph {
    entries: HashMap<RelationKey, f32>,
    /// Порог производных множеств (строгое сравнение)
    threshold: f32,
    enemies: HashSet<RelationKey>,
    friends: HashSet<RelationKey>,
    /// Мутации с прошлой публикации
    pending: Vec<RelationKey>,
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new(DEFAULT_RELATION_THRESHOLD)
    }
}

impl RelationGraph {
    pub fn new(threshold: f32) -> Self {
        Self {
            entries: HashMap::new(),
            threshold,
            enemies: HashSet::new(),
            friends: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Восстановление из персистентных пар (загрузка сейва хостом)
    pub fn from_snapshot(threshold: f32, pairs: Vec<(RelationKey, f32)>) -> Self {
        let mut graph = Self::new(threshold);
        for (key, score) in pairs {
            graph.entries.insert(key, score.clamp(-1.0, 1.0));
        }
        graph.recompute();
        graph
    }

    /// Персистентные пары ключ → скор (формат хранения — дело хоста)
    pub fn snapshot(&self) -> Vec<(RelationKey, f32)> {
        let mut pairs: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        // Стабильный порядок для детерминированных сейвов
        pairs.sort_by(|a, b| format!("{:?}", a.0).cmp(&format!("{:?}", b.0)));
        pairs
    }

    /// Ставит отношение, клампит в [-1, 1], жадно пересчитывает множества
    pub fn set(&mut self, key: RelationKey, amount: f32) {
        self.entries.insert(key.clone(), amount.clamp(-1.0, 1.0));
        self.recompute();
        self.pending.push(key);
    }

    /// Сдвигает отношение от текущего (отсутствующий ключ — от 0)
    pub fn adjust(&mut self, key: RelationKey, delta: f32) {
        let current = self.entries.get(&key).copied().unwrap_or(0.0);
        self.set(key, current + delta);
    }

    pub fn get(&self, key: &RelationKey) -> Option<f32> {
        self.entries.get(key).copied()
    }

    /// Суммарный скор идентификации: запись uid + записи всех labels.
    ///
    /// Отсутствующие записи дают 0; нормализации нет — сумма нескольких
    /// совпавших ярлыков может выйти за [-1, 1].
    pub fn score(&self, identity: &Identity) -> f32 {
        let mut total = self
            .entries
            .get(&RelationKey::Uid(identity.uid))
            .copied()
            .unwrap_or(0.0);

        for label in &identity.labels {
            total += self
                .entries
                .get(&RelationKey::Label(label.clone()))
                .copied()
                .unwrap_or(0.0);
        }

        total
    }

    pub fn enemies(&self) -> &HashSet<RelationKey> {
        &self.enemies
    }

    pub fn friends(&self) -> &HashSet<RelationKey> {
        &self.friends
    }

    /// Враг ли: uid или любой ярлык в множестве врагов
    pub fn is_enemy(&self, identity: &Identity) -> bool {
        self.matches_set(&self.enemies, identity)
    }

    /// Друг ли: uid или любой ярлык в множестве друзей
    pub fn is_friend(&self, identity: &Identity) -> bool {
        self.matches_set(&self.friends, identity)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches_set(&self, set: &HashSet<RelationKey>, identity: &Identity) -> bool {
        if set.contains(&RelationKey::Uid(identity.uid)) {
            return true;
        }
        identity
            .labels
            .iter()
            .any(|label| set.contains(&RelationKey::Label(label.clone())))
    }

    fn recompute(&mut self) {
        self.enemies.clear();
        self.friends.clear();

        for (key, score) in &self.entries {
            if *score < -self.threshold {
                self.enemies.insert(key.clone());
            } else if *score > self.threshold {
                self.friends.insert(key.clone());
            }
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Событие: отношение к конкретному ключу изменилось
#[derive(Event, Debug, Clone)]
pub struct RelationChanged {
    pub owner: Entity,
    pub key: RelationKey,
}

/// Событие: граф агента изменился (агрегат после всех per-key)
#[derive(Event, Debug, Clone)]
pub struct RelationsUpdated {
    pub owner: Entity,
}

/// Система: публикация накопленных нотификаций
///
/// Порядок: per-key события, затем один агрегат на владельца.
pub fn publish_relation_events(
    mut graphs: Query<(Entity, &mut RelationGraph)>,
    mut changed: EventWriter<RelationChanged>,
    mut updated: EventWriter<RelationsUpdated>,
) {
    for (owner, mut graph) in graphs.iter_mut() {
        if graph.pending.is_empty() {
            continue;
        }

        for key in std::mem::take(&mut graph.pending) {
            changed.write(RelationChanged { owner, key });
        }
        updated.write(RelationsUpdated { owner });
    }
}

/// Set публикации relation событий — targeting упорядочивается после него
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationPublish;

/// Relations Plugin
pub struct RelationsPlugin;

impl Plugin for RelationsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RelationChanged>()
            .add_event::<RelationsUpdated>();

        app.add_systems(FixedUpdate, publish_relation_events.in_set(RelationPublish));
    }
}
