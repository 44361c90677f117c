use napi::Result as NapiResult;
use napi_derive::napi;

use lane_roi_core::roi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// ROI worksheet
// ---------------------------------------------------------------------------

/// Pure projection result for the worksheet's assumptions.
#[napi]
pub fn compute_roi(input_json: String) -> NapiResult<String> {
    let input = roi::parse_assumptions_str(&input_json).map_err(to_napi_error)?;
    let output = roi::compute_roi(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Projection wrapped with warnings and metadata.
#[napi]
pub fn run_roi(input_json: String) -> NapiResult<String> {
    let input = roi::parse_assumptions_str(&input_json).map_err(to_napi_error)?;
    let output = roi::run_roi(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Check assumptions without computing; returns the normalised input.
#[napi]
pub fn validate_roi_input(input_json: String) -> NapiResult<String> {
    let input = roi::parse_assumptions_str(&input_json).map_err(to_napi_error)?;
    serde_json::to_string(&input).map_err(to_napi_error)
}
