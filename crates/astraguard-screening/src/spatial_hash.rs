//! Per-timestep voxel hashing for broad-phase pair culling.

use std::collections::HashMap;

use crate::ScreeningError;

const NEIGHBOR_OFFSETS: [(i64, i64, i64); 27] = build_neighbor_offsets();

const fn build_neighbor_offsets() -> [(i64, i64, i64); 27] {
    let mut offsets = [(0i64, 0i64, 0i64); 27];
    let mut idx = 0;
    let mut dx = -1i64;
    while dx <= 1 {
        let mut dy = -1i64;
        while dy <= 1 {
            let mut dz = -1i64;
            while dz <= 1 {
                offsets[idx] = (dx, dy, dz);
                idx += 1;
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    offsets
}

/// Lazy, finite, pull-based sequence of `(t_idx, sorted pairs)` — never
/// materializes the full candidate set in memory at once (spec §9).
pub struct CandidateStream<'a> {
    positions_km: &'a [Vec<[f64; 3]>],
    voxel_km: f64,
    next_t: usize,
}

impl<'a> Iterator for CandidateStream<'a> {
    type Item = (usize, Vec<(usize, usize)>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_t >= self.positions_km.len() {
            return None;
        }
        let t_idx = self.next_t;
        self.next_t += 1;
        Some((t_idx, pairs_for_timestep(&self.positions_km[t_idx], self.voxel_km)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.positions_km.len() - self.next_t;
        (remaining, Some(remaining))
    }
}

fn voxel_key(position: &[f64; 3], voxel_km: f64) -> (i64, i64, i64) {
    (
        (position[0] / voxel_km).floor() as i64,
        (position[1] / voxel_km).floor() as i64,
        (position[2] / voxel_km).floor() as i64,
    )
}

fn pairs_for_timestep(positions: &[[f64; 3]], voxel_km: f64) -> Vec<(usize, usize)> {
    let mut voxel_map: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (obj_idx, position) in positions.iter().enumerate() {
        voxel_map
            .entry(voxel_key(position, voxel_km))
            .or_default()
            .push(obj_idx);
    }

    let mut pair_set = std::collections::BTreeSet::new();
    for (key, idxs) in &voxel_map {
        for (dx, dy, dz) in NEIGHBOR_OFFSETS {
            let neighbor_key = (key.0 + dx, key.1 + dy, key.2 + dz);
            let Some(neighbor_idxs) = voxel_map.get(&neighbor_key) else {
                continue;
            };
            for &i in idxs {
                for &j in neighbor_idxs {
                    if i < j {
                        pair_set.insert((i, j));
                    }
                }
            }
        }
    }

    pair_set.into_iter().collect()
}

/// Build the lazy candidate stream over a full propagation grid.
pub fn candidate_stream(
    positions_km: &[Vec<[f64; 3]>],
    voxel_km: f64,
) -> Result<CandidateStream<'_>, ScreeningError> {
    if voxel_km <= 0.0 {
        return Err(ScreeningError::InvalidVoxelSize);
    }
    Ok(CandidateStream {
        positions_km,
        voxel_km,
        next_t: 0,
    })
}
