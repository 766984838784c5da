//! Drops any top-K event whose pair or TCA falls outside the snapshot.

use astraguard_risk::ConjunctionEvent;
use chrono::{DateTime, Utc};

use crate::snapshot::CesiumSnapshot;

/// Sets `tca_index_snapshot` and drops events that don't link to the
/// snapshot: either referenced norad_id is missing, or the TCA timestamp
/// can't be parsed, or the nearest index is out of range.
pub fn apply_linkage_check(events: Vec<ConjunctionEvent>, snapshot: &CesiumSnapshot) -> (Vec<ConjunctionEvent>, usize) {
    let mut linked = Vec::with_capacity(events.len());
    let mut dropped = 0usize;

    for mut event in events {
        if !snapshot.has_norad_id(event.primary_id) || !snapshot.has_norad_id(event.secondary_id) {
            dropped += 1;
            continue;
        }

        let tca_utc: Option<DateTime<Utc>> =
            DateTime::parse_from_rfc3339(&event.tca_utc).ok().map(|dt| dt.with_timezone(&Utc));

        let index = tca_utc.and_then(|tca| snapshot.nearest_time_index(tca));
        match index {
            Some(idx) if idx < snapshot.times_utc.len() => {
                event.tca_index_snapshot = Some(idx);
                linked.push(event);
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "events dropped by linkage check");
    }

    (linked, dropped)
}
