use anyhow::Result;
use serde_json::{json, Value};

use lane_roi_core::roi::{RoiAssumptions, RoiResult};

pub const JSON_FILE_NAME: &str = "roi_response.json";

/// The `{inputs, outputs}` pair, shared by the JSON artifact and the timeline payload.
pub fn document(inputs: &RoiAssumptions, outputs: &RoiResult) -> Value {
    json!({
        "inputs": inputs,
        "outputs": outputs,
    })
}

pub fn render(inputs: &RoiAssumptions, outputs: &RoiResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&document(inputs, outputs))?)
}
