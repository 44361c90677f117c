use clap::Args;
use colored::Colorize;
use log::{info, warn};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use lane_roi_core::roi::{self, RoiAssumptions, RoiResult};

use crate::{export, input, store};

/// Arguments for an ROI worksheet run
#[derive(Args)]
pub struct RoiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Additional revenue per month (negative for a decrease)
    #[arg(long, allow_hyphen_values = true)]
    pub monthly_revenue_increase: Option<Decimal>,

    /// Change in monthly cost (positive for an increase)
    #[arg(long, allow_hyphen_values = true)]
    pub monthly_cost_change: Option<Decimal>,

    /// Projection horizon in months [default: 12]
    #[arg(long, allow_hyphen_values = true)]
    pub months: Option<i64>,

    /// Upfront investment at t=0
    #[arg(long, allow_hyphen_values = true)]
    pub initial_investment: Option<Decimal>,

    /// Persist the run and its timeline entry
    #[arg(long)]
    pub save: bool,

    /// Venture the run belongs to
    #[arg(long)]
    pub venture_id: Option<String>,

    /// User recorded on the saved run [default: anonymous]
    #[arg(long)]
    pub user_id: Option<String>,

    /// Write the HTML strategy snapshot to this file or directory
    #[arg(long)]
    pub export_html: Option<PathBuf>,

    /// Write the JSON artifact to this file or directory
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

pub fn run_roi(args: RoiArgs, db: Option<&Path>) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = resolve_assumptions(&args)?;
    execute(&args, &assumptions, db)
}

fn resolve_assumptions(args: &RoiArgs) -> Result<RoiAssumptions, Box<dyn std::error::Error>> {
    match input::read_assumptions(args.input.as_deref())? {
        Some(parsed) => Ok(parsed),
        None => assumptions_from_flags(args),
    }
}

/// Flags over the worksheet defaults (12 months, every amount zero).
fn assumptions_from_flags(args: &RoiArgs) -> Result<RoiAssumptions, Box<dyn std::error::Error>> {
    let defaults = RoiAssumptions::default();
    let assumptions = RoiAssumptions {
        monthly_revenue_increase: args
            .monthly_revenue_increase
            .unwrap_or(defaults.monthly_revenue_increase),
        monthly_cost_change: args
            .monthly_cost_change
            .unwrap_or(defaults.monthly_cost_change),
        months: args.months.unwrap_or(defaults.months),
        initial_investment: args
            .initial_investment
            .unwrap_or(defaults.initial_investment),
    };
    roi::validate_assumptions(&assumptions)?;
    Ok(assumptions)
}

/// Compute, then save and export as requested.
///
/// Save and export failures become warnings on the output; the computed
/// result is always returned.
fn execute(
    args: &RoiArgs,
    assumptions: &RoiAssumptions,
    db: Option<&Path>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let output = roi::run_roi(assumptions);
    let mut value = serde_json::to_value(&output)?;

    if args.save {
        match save(args, assumptions, &output.result, db) {
            Ok(id) => {
                info!("saved ROI run as worksheet {id}");
                value["worksheet_id"] = json!(id);
            }
            Err(e) => {
                warn!("failed to save ROI run: {e:#}");
                eprintln!("{}: run not saved: {:#}", "warning".yellow().bold(), e);
                push_warning(&mut value, format!("Run not saved: {e:#}"));
            }
        }
    }

    let mut exports = Vec::new();
    if let Some(ref target) = args.export_html {
        match export::write_html(target, assumptions, &output.result) {
            Ok(path) => exports.push(path.display().to_string()),
            Err(e) => {
                warn!("HTML export failed: {e:#}");
                push_warning(&mut value, format!("HTML export failed: {e:#}"));
            }
        }
    }
    if let Some(ref target) = args.export_json {
        match export::write_json(target, assumptions, &output.result) {
            Ok(path) => exports.push(path.display().to_string()),
            Err(e) => {
                warn!("JSON export failed: {e:#}");
                push_warning(&mut value, format!("JSON export failed: {e:#}"));
            }
        }
    }
    if !exports.is_empty() {
        value["exports"] = json!(exports);
    }

    Ok(value)
}

fn save(
    args: &RoiArgs,
    assumptions: &RoiAssumptions,
    result: &RoiResult,
    db: Option<&Path>,
) -> anyhow::Result<i64> {
    let path = store::db_path(db)?;
    let mut conn = store::open(&path)?;
    store::save_run(
        &mut conn,
        &store::NewRun {
            venture_id: args.venture_id.as_deref(),
            user_id: args.user_id.as_deref(),
            inputs: assumptions,
            outputs: result,
        },
    )
}

fn push_warning(value: &mut Value, warning: String) {
    if let Some(Value::Array(warnings)) = value.get_mut("warnings") {
        warnings.push(Value::String(warning));
    }
}
