pub mod engine;
pub mod input;

pub use engine::{compute_roi, run_roi, MonthlyBalance, RoiAssumptions, RoiResult};
pub use input::{parse_assumptions, parse_assumptions_str, validate_assumptions, MAX_HORIZON_MONTHS};
