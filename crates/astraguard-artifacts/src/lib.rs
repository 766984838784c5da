//! Snapshot downsampling, ECI->ECEF transform, balanced sampling, linkage
//! checking, and ranked artifact emission (C9).

mod balanced;
mod entry;
mod gmst;
mod linkage;
mod manifest;
mod snapshot;
mod writer;

pub use balanced::{select_object_indices, BalancedSamplingConfig};
pub use entry::ManeuverPlanEntry;
pub use gmst::{gmst_radians, rotate_eci_to_ecef};
pub use linkage::apply_linkage_check;
pub use manifest::{sha256_hex, ArtifactEntry, ArtifactManifest};
pub use snapshot::{build_snapshot, CesiumSnapshot, ObjectTrack, SnapshotMeta};
pub use writer::{
    write_cesium_snapshot, write_maneuver_plans, write_manifest, write_top_conjunctions, ArtifactError,
    WrittenArtifact,
};
