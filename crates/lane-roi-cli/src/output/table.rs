use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    print!("{}", render(value));
}

fn render(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                render_run(result, map)
            } else if let Some(outputs) = map.get("outputs") {
                render_saved_worksheet(outputs, map)
            } else {
                render_flat_object(map)
            }
        }
        Value::Array(arr) => render_array(arr),
        _ => format!("{}\n", value),
    }
}

/// A fresh run: summary, balances, then the envelope's warnings and methodology.
fn render_run(result: &Value, envelope: &Map<String, Value>) -> String {
    let mut out = render_roi_summary(result);

    if let Some(Value::Number(id)) = envelope.get("worksheet_id") {
        out.push_str(&format!("\nSaved as worksheet {}\n", id));
    }

    if let Some(Value::Array(paths)) = envelope.get("exports") {
        for p in paths {
            if let Value::String(s) = p {
                out.push_str(&format!("Exported {}\n", s));
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings {
                if let Value::String(s) = w {
                    out.push_str(&format!("  - {}\n", s));
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\nMethodology: {}\n", meth));
    }

    out
}

fn render_saved_worksheet(outputs: &Value, record: &Map<String, Value>) -> String {
    let header: Map<String, Value> = record
        .iter()
        .filter(|(k, _)| k.as_str() != "outputs")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let mut out = render_flat_object(&header);
    out.push('\n');
    out.push_str(&render_roi_summary(outputs));
    out
}

/// The worksheet's result panel followed by the monthly balances.
fn render_roi_summary(result: &Value) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["Total gain", &format_value(&result["totalGain"])]);
    builder.push_record(["Net", &format_value(&result["net"])]);
    builder.push_record(["ROI %", &format_roi_pct(&result["roiPct"])]);
    builder.push_record(["Payback month", &format_payback(&result["paybackMonth"])]);
    let mut out = format!("{}\n", Table::from(builder));

    if let Some(Value::Array(balances)) = result.get("monthlyBalances") {
        out.push_str("\nMonthly balances:\n");
        out.push_str(&render_array(balances));
    }
    out
}

fn render_flat_object(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    format!("{}\n", Table::from(builder))
}

fn render_array(arr: &[Value]) -> String {
    if arr.is_empty() {
        return "(empty)\n".to_string();
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        format!("{}\n", Table::from(builder))
    } else {
        arr.iter().map(|item| format!("{}\n", format_value(item))).collect()
    }
}

/// ROI % to one decimal place, or a dash when undefined.
fn format_roi_pct(value: &Value) -> String {
    match value.as_f64() {
        Some(pct) => format!("{:.1}", pct),
        None => "—".to_string(),
    }
}

fn format_payback(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        _ => "N/A".to_string(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
