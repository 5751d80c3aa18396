//! Relation graph properties под случайными последовательностями мутаций
//!
//! Seeded ChaCha8 — прогон воспроизводим.

use std::collections::HashSet;

use duskhold_combat::{RelationGraph, RelationKey, DEFAULT_RELATION_THRESHOLD};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LABELS: [&str; 5] = ["orcs", "guards", "undead", "wolves", "bandits"];

fn random_key(rng: &mut ChaCha8Rng) -> RelationKey {
    if rng.gen_bool(0.5) {
        RelationKey::Uid(rng.gen_range(0..20))
    } else {
        RelationKey::label(LABELS[rng.gen_range(0..LABELS.len())])
    }
}

#[test]
fn test_scores_stay_clamped_under_random_mutations() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut graph = RelationGraph::default();

    for _ in 0..2000 {
        let key = random_key(&mut rng);
        let amount = rng.gen_range(-3.0_f32..3.0);

        if rng.gen_bool(0.5) {
            graph.set(key, amount);
        } else {
            graph.adjust(key, amount);
        }
    }

    for (key, score) in graph.snapshot() {
        assert!(
            (-1.0..=1.0).contains(&score),
            "score {:?} вне [-1,1] для {:?}",
            score,
            key
        );
    }
}

#[test]
fn test_derived_sets_match_threshold_after_every_mutation() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut graph = RelationGraph::default();

    for _ in 0..500 {
        graph.adjust(random_key(&mut rng), rng.gen_range(-1.0_f32..1.0));

        // Производные множества — ровно записи за строгим порогом
        let expected_enemies: HashSet<RelationKey> = graph
            .snapshot()
            .into_iter()
            .filter(|(_, score)| *score < -DEFAULT_RELATION_THRESHOLD)
            .map(|(key, _)| key)
            .collect();
        let expected_friends: HashSet<RelationKey> = graph
            .snapshot()
            .into_iter()
            .filter(|(_, score)| *score > DEFAULT_RELATION_THRESHOLD)
            .map(|(key, _)| key)
            .collect();

        assert_eq!(graph.enemies(), &expected_enemies);
        assert_eq!(graph.friends(), &expected_friends);
    }
}
