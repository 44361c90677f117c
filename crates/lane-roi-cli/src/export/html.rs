use anyhow::Result;

use lane_roi_core::roi::{RoiAssumptions, RoiResult};

pub const SNAPSHOT_FILE_NAME: &str = "Strategy_Snapshot_ROI.html";

const SNAPSHOT_TITLE: &str = "Strategy Snapshot — ROI";

/// Standalone HTML decision artifact for one run.
pub fn render_snapshot(inputs: &RoiAssumptions, outputs: &RoiResult) -> Result<String> {
    let key_numbers = escape_html(&serde_json::to_string_pretty(outputs)?);
    let assumptions = escape_html(&serde_json::to_string_pretty(inputs)?);

    Ok(format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <style>
    body{{font-family: Arial, Helvetica, sans-serif; padding:30px; color:#111}}
    h1{{font-size:20px;margin-bottom:8px}}
    h2{{font-size:14px;margin-top:18px}}
    pre{{background:#f7f7f7;padding:12px;border-radius:6px;overflow:auto}}
    .section{{margin-bottom:18px}}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <div class="section"><strong>Situation</strong>
    <div>ROI worksheet run</div>
  </div>
  <div class="section"><h2>Key Numbers</h2>
    <pre>{key_numbers}</pre>
  </div>
  <div class="section"><h2>Recommendation</h2>
    <div>Review payback month and net. Use this snapshot as a decision artifact.</div>
  </div>
  <div class="section"><h2>Next Actions</h2>
    <ul><li>Share with stakeholders</li><li>Run sensitivity scenarios</li></ul>
  </div>
  <div class="section"><h2>Assumptions</h2>
    <pre>{assumptions}</pre>
  </div>
</body>
</html>
"#,
        title = SNAPSHOT_TITLE,
    ))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
