//! Optional balanced ACTIVE/non-ACTIVE sampling for the snapshot's object set.

use std::collections::HashSet;

use astraguard_catalog::Tle;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy)]
pub struct BalancedSamplingConfig {
    pub snapshot_active: usize,
    pub snapshot_debris: usize,
    pub snapshot_max: usize,
    pub seed: u64,
}

fn is_active(group: &str) -> bool {
    group.to_uppercase() == "ACTIVE"
}

/// Selects object indices for the snapshot, guaranteeing every index whose
/// norad_id is in `required_norad_ids`, then filling the remaining budget
/// from a seeded-random ACTIVE/non-ACTIVE split.
pub fn select_object_indices(
    valid_tles: &[Tle],
    required_norad_ids: &HashSet<u32>,
    config: BalancedSamplingConfig,
) -> Vec<usize> {
    let mut required_indices: Vec<usize> = (0..valid_tles.len())
        .filter(|&idx| required_norad_ids.contains(&valid_tles[idx].norad_id))
        .collect();

    let effective_cap = if required_indices.len() > config.snapshot_max {
        tracing::warn!(
            required = required_indices.len(),
            configured_max = config.snapshot_max,
            "required snapshot objects exceed snapshot_max; expanding cap"
        );
        required_indices.len()
    } else {
        config.snapshot_max
    };

    let required_set: HashSet<usize> = required_indices.iter().copied().collect();
    let mut active_pool: Vec<usize> = Vec::new();
    let mut debris_pool: Vec<usize> = Vec::new();
    for idx in 0..valid_tles.len() {
        if required_set.contains(&idx) {
            continue;
        }
        if is_active(&valid_tles[idx].source_group) {
            active_pool.push(idx);
        } else {
            debris_pool.push(idx);
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    active_pool.shuffle(&mut rng);
    debris_pool.shuffle(&mut rng);

    let remaining_budget = effective_cap.saturating_sub(required_indices.len());
    let active_target = config.snapshot_active.min(active_pool.len());
    let debris_target = config.snapshot_debris.min(debris_pool.len());

    let mut extra: Vec<usize> = active_pool.into_iter().take(active_target).collect();
    extra.extend(debris_pool.into_iter().take(debris_target));
    extra.truncate(remaining_budget);

    required_indices.extend(extra);
    required_indices.sort_unstable();
    required_indices.dedup();
    required_indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tle(norad_id: u32, group: &str) -> Tle {
        Tle {
            norad_id,
            name: format!("SAT-{norad_id}"),
            epoch_utc: "2026-01-01T00:00:00Z".to_string(),
            line1: String::new(),
            line2: String::new(),
            source_group: group.to_string(),
            fetched_at_utc: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn required_indices_are_always_included() {
        let tles = vec![tle(1, "ACTIVE"), tle(2, "DEBRIS"), tle(3, "ACTIVE")];
        let required: HashSet<u32> = [2].into_iter().collect();
        let config = BalancedSamplingConfig {
            snapshot_active: 0,
            snapshot_debris: 0,
            snapshot_max: 0,
            seed: 42,
        };
        let indices = select_object_indices(&tles, &required, config);
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn cap_expands_when_required_count_exceeds_it() {
        let tles = vec![tle(1, "ACTIVE"), tle(2, "DEBRIS")];
        let required: HashSet<u32> = [1, 2].into_iter().collect();
        let config = BalancedSamplingConfig {
            snapshot_active: 0,
            snapshot_debris: 0,
            snapshot_max: 1,
            seed: 7,
        };
        let indices = select_object_indices(&tles, &required, config);
        assert_eq!(indices.len(), 2);
    }

    #[test]
    fn selection_is_deterministic_for_a_fixed_seed() {
        let tles: Vec<Tle> = (0..20)
            .map(|i| tle(i, if i % 2 == 0 { "ACTIVE" } else { "DEBRIS" }))
            .collect();
        let required = HashSet::new();
        let config = BalancedSamplingConfig {
            snapshot_active: 3,
            snapshot_debris: 3,
            snapshot_max: 10,
            seed: 99,
        };
        let a = select_object_indices(&tles, &required, config);
        let b = select_object_indices(&tles, &required, config);
        assert_eq!(a, b);
    }

    #[test]
    fn total_selection_respects_snapshot_max() {
        let tles: Vec<Tle> = (0..50).map(|i| tle(i, "ACTIVE")).collect();
        let required = HashSet::new();
        let config = BalancedSamplingConfig {
            snapshot_active: 40,
            snapshot_debris: 40,
            snapshot_max: 10,
            seed: 1,
        };
        let indices = select_object_indices(&tles, &required, config);
        assert!(indices.len() <= 10);
    }
}
