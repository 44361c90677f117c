pub mod file;
pub mod stdin;

use lane_roi_core::roi::{self, RoiAssumptions};

/// Assumptions from `--input <file>` or piped stdin, if either is present.
pub fn read_assumptions(
    path: Option<&str>,
) -> Result<Option<RoiAssumptions>, Box<dyn std::error::Error>> {
    let value = match path {
        Some(p) => Some(file::read_json_value(p)?),
        None => stdin::read_stdin()?,
    };
    match value {
        Some(v) => Ok(Some(roi::parse_assumptions(&v)?)),
        None => Ok(None),
    }
}
