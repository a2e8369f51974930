//! Diff engine - Comparison logic and plan generation

mod compare;
mod plan;

pub use compare::classify;
pub use plan::{compare, generate_transfer_plan, PlanStats, TransferPlan};
