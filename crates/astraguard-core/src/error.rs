//! Top-level pipeline error, wrapping each stage's error kind.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstraGuardError {
    #[error(transparent)]
    Catalog(#[from] astraguard_catalog::CatalogError),
    #[error(transparent)]
    Propagation(#[from] astraguard_propagator::PropagatorError),
    #[error(transparent)]
    Screening(#[from] astraguard_screening::ScreeningError),
    #[error(transparent)]
    Artifact(#[from] astraguard_artifacts::ArtifactError),
    #[error("no valid objects survived catalog load and propagation")]
    NoValidObjects,
}

impl AstraGuardError {
    /// Exit code per spec §6/§7: 0 success, 1 any fatal failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
