//! Stage-serial driver (C10): catalog -> propagation -> screening -> risk ->
//! trend -> maneuver -> snapshot/artifacts, in that order, timed and logged.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use astraguard_artifacts::{
    apply_linkage_check, build_snapshot, select_object_indices, write_cesium_snapshot,
    write_maneuver_plans, write_manifest, write_top_conjunctions, BalancedSamplingConfig,
    ManeuverPlanEntry, WrittenArtifact,
};
use astraguard_catalog::{normalize_groups, CatalogSource, JsonFileCatalog, Tle};
use astraguard_maneuver::plan_min_delta_v;
use astraguard_propagator::propagate_positions;
use astraguard_risk::{build_conjunction_event, rank_events, Assumptions, ConjunctionEvent, MODEL_VERSION};
use astraguard_screening::{candidate_stream, find_refined_conjunctions};
use astraguard_trend::{evaluate_trend_gate, GateDecision};
use chrono::Utc;

use crate::config::ScreeningConfig;
use crate::error::AstraGuardError;

/// Coarse-grid samples kept on either side of a pair's coarse minimum when
/// building its fine refinement timeline.
const REFINE_HALF_WINDOW_STEPS: usize = 1;

#[derive(Debug)]
pub struct PipelineSummary {
    pub objects_propagated: usize,
    pub events_scored: usize,
    pub events_ranked: usize,
    pub events_linked: usize,
    pub events_dropped_by_linkage: usize,
    pub objects_in_snapshot: usize,
    pub manifest_path: PathBuf,
}

fn stage<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    tracing::info!(stage = name, elapsed_ms = start.elapsed().as_millis() as u64, "stage complete");
    result
}

pub fn run(config: &ScreeningConfig) -> Result<PipelineSummary, AstraGuardError> {
    let start_utc = config.start_utc.unwrap_or_else(Utc::now);
    let generated_at_utc = Utc::now();
    let normalized_groups = normalize_groups(&config.groups);

    let tles: Vec<Tle> = stage("catalog_load", || -> Result<Vec<Tle>, AstraGuardError> {
        let catalog = JsonFileCatalog::new(&config.catalog_path);
        Ok(catalog.list_tles(&config.groups, config.max_objects, true, true)?)
    })?;
    if tles.is_empty() {
        return Err(AstraGuardError::NoValidObjects);
    }

    let grid = stage("propagation", || {
        propagate_positions(&tles, start_utc, config.horizon_hours, config.dt_s)
    })?;

    let refined = stage("screening", || -> Result<_, AstraGuardError> {
        let stream = candidate_stream(&grid.positions_km, config.voxel_km)?;
        Ok(find_refined_conjunctions(
            &grid.kept_tles,
            &grid.kept_norad_ids,
            &grid.times_utc,
            &grid.positions_km,
            stream,
            config.dt_refine_s,
            REFINE_HALF_WINDOW_STEPS,
        ))
    })?;

    let assumptions = Assumptions {
        dt_s: config.dt_s,
        dt_refine_s: config.dt_refine_s,
        horizon_hours: config.horizon_hours,
        hard_body_radius_m: config.hard_body_radius_m,
        sigma_payload_m: config.sigma_payload_m,
        sigma_debris_m: config.sigma_debris_m,
        voxel_km: config.voxel_km,
        catalog_groups_used: normalized_groups,
    };

    let events: Vec<ConjunctionEvent> = stage("risk_scoring", || {
        refined
            .iter()
            .filter_map(|r| {
                build_conjunction_event(
                    r,
                    config.sigma_payload_m,
                    config.sigma_debris_m,
                    config.hard_body_radius_m,
                    config.pair_type_filter,
                    assumptions.clone(),
                )
            })
            .collect::<Vec<_>>()
    });
    tracing::info!(count = events.len(), "conjunction events scored");

    let ranked = rank_events(events);
    let top_k: Vec<ConjunctionEvent> = ranked.iter().take(config.top_k).cloned().collect();
    if top_k.len() < ranked.len() {
        tracing::info!(total = ranked.len(), kept = top_k.len(), "truncated to top-K");
    }

    let tle_by_norad: HashMap<u32, &Tle> =
        grid.kept_tles.iter().map(|tle| (tle.norad_id, tle)).collect();

    let plans_by_event_id: BTreeMap<String, ManeuverPlanEntry> =
        stage("trend_and_maneuver", || {
            let mut map = BTreeMap::new();
            for event in &top_k {
                let (Some(primary), Some(secondary)) =
                    (tle_by_norad.get(&event.primary_id), tle_by_norad.get(&event.secondary_id))
                else {
                    tracing::warn!(event_id = %event.event_id, "skipping trend evaluation: object missing from kept set");
                    continue;
                };

                let evaluation = evaluate_trend_gate(
                    event,
                    primary,
                    secondary,
                    &primary.source_group,
                    &secondary.source_group,
                    &config.trend,
                    start_utc,
                );

                let decision = evaluation.decision;
                let maneuver_plan = if decision == GateDecision::Maneuver {
                    let tca_utc = chrono::DateTime::parse_from_rfc3339(&event.tca_utc)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or(start_utc);
                    tracing::info!(event_id = %event.event_id, "event is maneuver-eligible");
                    Some(plan_min_delta_v(tca_utc, event.miss_distance_m, &config.maneuver_policy))
                } else {
                    None
                };

                let entry = ManeuverPlanEntry::from_trend_evaluation(evaluation, maneuver_plan);
                map.insert(event.event_id.clone(), entry);
            }
            map
        });

    let required_norad_ids: HashSet<u32> = top_k
        .iter()
        .flat_map(|e| [e.primary_id, e.secondary_id])
        .collect();

    let object_indices: Vec<usize> = if config.snapshot.balanced {
        select_object_indices(
            &grid.kept_tles,
            &required_norad_ids,
            BalancedSamplingConfig {
                snapshot_active: config.snapshot.snapshot_active,
                snapshot_debris: config.snapshot.snapshot_debris,
                snapshot_max: config.snapshot.snapshot_max,
                seed: config.seed,
            },
        )
    } else if grid.kept_tles.len() <= config.snapshot.snapshot_max {
        (0..grid.kept_tles.len()).collect()
    } else {
        let mut required: Vec<usize> = (0..grid.kept_tles.len())
            .filter(|&idx| required_norad_ids.contains(&grid.kept_tles[idx].norad_id))
            .collect();
        let required_set: HashSet<usize> = required.iter().copied().collect();
        for idx in 0..grid.kept_tles.len() {
            if required.len() >= config.snapshot.snapshot_max {
                break;
            }
            if !required_set.contains(&idx) {
                required.push(idx);
            }
        }
        required.sort_unstable();
        required.dedup();
        required
    };

    let snapshot = stage("snapshot_build", || {
        build_snapshot(
            &grid.times_utc,
            &grid.positions_km,
            &grid.kept_tles,
            config.dt_s,
            config.snapshot.downsample_step,
            &object_indices,
            generated_at_utc,
            MODEL_VERSION,
        )
    });

    let (linked_events, dropped_by_linkage) = apply_linkage_check(top_k, &snapshot);
    let plans_by_event_id: BTreeMap<String, ManeuverPlanEntry> = linked_events
        .iter()
        .filter_map(|e| plans_by_event_id.get(&e.event_id).map(|entry| (e.event_id.clone(), entry.clone())))
        .collect();

    let mut written: Vec<WrittenArtifact> = Vec::new();
    written.push(write_cesium_snapshot(&config.output_dir, &snapshot)?);
    written.extend(write_top_conjunctions(&config.output_dir, MODEL_VERSION, generated_at_utc, &linked_events)?);
    written.push(write_maneuver_plans(&config.output_dir, MODEL_VERSION, generated_at_utc, &plans_by_event_id)?);

    let repo_root = std::env::current_dir().unwrap_or_else(|_| config.output_dir.clone());
    let manifest_path = write_manifest(&config.output_dir, &repo_root, generated_at_utc, None, MODEL_VERSION, &written)?;

    Ok(PipelineSummary {
        objects_propagated: grid.object_count(),
        events_scored: ranked.len(),
        events_ranked: ranked.len(),
        events_linked: linked_events.len(),
        events_dropped_by_linkage: dropped_by_linkage,
        objects_in_snapshot: snapshot.objects.len(),
        manifest_path,
    })
}
