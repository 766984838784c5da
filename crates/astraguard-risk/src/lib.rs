//! Assumed-covariance collision probability and conjunction event scoring (C5).

mod event;
mod pc;
mod sigma;

pub use event::{build_conjunction_event, rank_events, Assumptions, ConjunctionEvent, PairTypeFilter, MODEL_VERSION};
pub use pc::pc_assumed_encounter_isotropic;
pub use sigma::{
    classify_sigma_m, sigma_components_for_group, sigma_effective_from_rtn, sigma_pair_effective_m,
    sigma_pair_m, RtnSigmaBases,
};
