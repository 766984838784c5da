//! Minimum-delta-v maneuver planning (C8).

mod plan;
mod policy;

pub use plan::{plan_min_delta_v, Feasibility, LateBaseline, ManeuverPlan, RtnDirection};
pub use policy::{effective_target_miss_m, ManeuverPolicy};
