//! Broad-phase voxel candidate generation (C3) and local TCA refinement (C4).

mod refine;
mod spatial_hash;

pub use refine::{find_refined_conjunctions, RefinedEvent};
pub use spatial_hash::{candidate_stream, CandidateStream};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("voxel_km must be > 0")]
    InvalidVoxelSize,
}
