mod catalog;
pub mod constants;
mod cost;
pub mod engine;
pub mod layout;
mod options;
mod quality;
mod rank;
mod result;
mod types;

pub use catalog::*;
pub use cost::{CostBreakdown, finishing_charge, price_candidate};
pub use engine::{calculate, calculate_async};
pub use options::*;
pub use quality::{QualityContext, candidate_warnings, design_warnings};
pub use rank::{compare_options, global_warnings, pricing_summary, rank_options, recommend};
pub use result::*;
pub use types::*;
