use clap::Args;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::{export, store};

/// Arguments for listing saved worksheets
#[derive(Args)]
pub struct HistoryArgs {
    /// Only runs for this venture
    #[arg(long)]
    pub venture_id: Option<String>,

    /// Maximum number of runs, newest first
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for showing one saved worksheet
#[derive(Args)]
pub struct ShowArgs {
    /// Worksheet id
    pub id: i64,
}

/// Arguments for re-exporting a saved worksheet
#[derive(Args)]
pub struct ExportArgs {
    /// Worksheet id
    pub id: i64,

    /// Write the HTML strategy snapshot to this file or directory
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Write the JSON artifact to this file or directory
    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// Arguments for listing timeline entries
#[derive(Args)]
pub struct TimelineArgs {
    /// Only entries for this venture
    #[arg(long)]
    pub venture_id: Option<String>,

    /// Maximum number of entries, newest first
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Include each entry's saved `{inputs, outputs}` document
    #[arg(long)]
    pub payload: bool,
}

fn connect(db: Option<&Path>) -> Result<Connection, Box<dyn std::error::Error>> {
    let path = store::db_path(db)?;
    Ok(store::open(&path)?)
}

pub fn run_history(args: HistoryArgs, db: Option<&Path>) -> Result<Value, Box<dyn std::error::Error>> {
    history(&connect(db)?, &args)
}

pub fn run_show(args: ShowArgs, db: Option<&Path>) -> Result<Value, Box<dyn std::error::Error>> {
    show(&connect(db)?, &args)
}

pub fn run_export(args: ExportArgs, db: Option<&Path>) -> Result<Value, Box<dyn std::error::Error>> {
    export_saved(&connect(db)?, &args)
}

pub fn run_timeline(args: TimelineArgs, db: Option<&Path>) -> Result<Value, Box<dyn std::error::Error>> {
    timeline(&connect(db)?, &args)
}

fn timeline(conn: &Connection, args: &TimelineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let events = store::list_timeline(conn, args.venture_id.as_deref(), args.limit, args.payload)?;
    Ok(serde_json::to_value(events)?)
}

/// One flat row per run, so tables and CSV stay readable.
fn history(conn: &Connection, args: &HistoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = store::list_worksheets(conn, args.venture_id.as_deref(), args.limit)?
        .into_iter()
        .map(|w| {
            let outputs = serde_json::to_value(&w.outputs).unwrap_or_default();
            json!({
                "id": w.id,
                "created_at": w.created_at,
                "venture_id": w.venture_id,
                "user_id": w.user_id,
                "months": w.inputs.months,
                "net": outputs["net"],
                "roiPct": outputs["roiPct"],
                "paybackMonth": outputs["paybackMonth"],
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

fn show(conn: &Connection, args: &ShowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record = store::get_worksheet(conn, args.id)?
        .ok_or_else(|| format!("Worksheet {} not found", args.id))?;
    Ok(serde_json::to_value(record)?)
}

fn export_saved(conn: &Connection, args: &ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.html.is_none() && args.json.is_none() {
        return Err("--html <path> or --json <path> is required".into());
    }
    let record = store::get_worksheet(conn, args.id)?
        .ok_or_else(|| format!("Worksheet {} not found", args.id))?;

    let mut exports = Vec::new();
    if let Some(ref target) = args.html {
        let path = export::write_html(target, &record.inputs, &record.outputs)?;
        exports.push(path.display().to_string());
    }
    if let Some(ref target) = args.json {
        let path = export::write_json(target, &record.inputs, &record.outputs)?;
        exports.push(path.display().to_string());
    }

    Ok(json!({ "id": record.id, "exports": exports }))
}
