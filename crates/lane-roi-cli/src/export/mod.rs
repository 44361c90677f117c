pub mod html;
pub mod json;

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use lane_roi_core::roi::{RoiAssumptions, RoiResult};

/// Write the HTML snapshot. A directory target gets the default file name.
pub fn write_html(target: &Path, inputs: &RoiAssumptions, outputs: &RoiResult) -> Result<PathBuf> {
    let path = resolve_target(target, html::SNAPSHOT_FILE_NAME);
    let contents = html::render_snapshot(inputs, outputs)?;
    fs::write(&path, contents).with_context(|| format!("Write {}", path.display()))?;
    info!("exported HTML snapshot to {}", path.display());
    Ok(path)
}

/// Write the `{inputs, outputs}` JSON artifact. A directory target gets the default file name.
pub fn write_json(target: &Path, inputs: &RoiAssumptions, outputs: &RoiResult) -> Result<PathBuf> {
    let path = resolve_target(target, json::JSON_FILE_NAME);
    let contents = json::render(inputs, outputs)?;
    fs::write(&path, contents).with_context(|| format!("Write {}", path.display()))?;
    info!("exported JSON artifact to {}", path.display());
    Ok(path)
}

fn resolve_target(target: &Path, default_name: &str) -> PathBuf {
    if target.is_dir() {
        target.join(default_name)
    } else {
        target.to_path_buf()
    }
}
