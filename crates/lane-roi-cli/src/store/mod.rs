use anyhow::{Context, Result};
use chrono::Utc;
use directories::ProjectDirs;
use log::debug;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use lane_roi_core::roi::{RoiAssumptions, RoiResult};

use crate::export;

mod stored;

use stored::{StoredAssumptions, StoredResult, StoredRun};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("ai.lane", "Lane", "lane-roi"));

pub const DB_FILE_NAME: &str = "lane-roi.sqlite";
pub const ANONYMOUS_USER: &str = "anonymous";
pub const WORKSHEET_KIND_ROI: &str = "roi";

const TIMELINE_KIND: &str = "insight";
const TIMELINE_TITLE: &str = "ROI run";
const TIMELINE_BODY: &str = "ROI run saved.";

/// Resolve the database file: explicit path first, then the platform data dir.
pub fn db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join(DB_FILE_NAME))
}

pub fn open(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!("opened worksheet store at {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS worksheets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        venture_id TEXT,
        user_id TEXT NOT NULL,
        type TEXT NOT NULL,
        inputs TEXT NOT NULL,  -- JSON assumptions, decimals as strings
        outputs TEXT NOT NULL, -- JSON result, decimals as strings
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_worksheets_venture ON worksheets(venture_id);

    CREATE TABLE IF NOT EXISTS timeline_events(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        venture_id TEXT,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        payload TEXT NOT NULL, -- {inputs, outputs}, decimals as strings
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_timeline_venture ON timeline_events(venture_id);
    "#,
    )
    .context("Initialise worksheet schema")?;
    Ok(())
}

/// A computed run to persist, with the identifiers of whoever ran it.
pub struct NewRun<'a> {
    pub venture_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
    pub inputs: &'a RoiAssumptions,
    pub outputs: &'a RoiResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorksheetRecord {
    pub id: i64,
    pub venture_id: Option<String>,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub inputs: RoiAssumptions,
    pub outputs: RoiResult,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub id: i64,
    pub venture_id: Option<String>,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    /// The `{inputs, outputs}` pair of the saved run, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Insert the worksheet row and its timeline entry in one transaction.
///
/// Returns the new worksheet id.
pub fn save_run(conn: &mut Connection, run: &NewRun<'_>) -> Result<i64> {
    let venture_id = run.venture_id.filter(|v| !v.is_empty());
    let user_id = run
        .user_id
        .filter(|u| !u.is_empty())
        .unwrap_or(ANONYMOUS_USER);

    let inputs = serde_json::to_string(&StoredAssumptions::from(run.inputs))?;
    let outputs = serde_json::to_string(&StoredResult::from(run.outputs))?;
    let payload = serde_json::to_string(&StoredRun::new(run.inputs, run.outputs))?;
    let now = Utc::now().to_rfc3339();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO worksheets(venture_id,user_id,type,inputs,outputs,created_at)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![venture_id, user_id, WORKSHEET_KIND_ROI, inputs, outputs, now],
    )
    .context("Insert worksheet")?;
    let id = tx.last_insert_rowid();

    tx.execute(
        "INSERT INTO timeline_events(venture_id,user_id,kind,title,body,payload,created_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![venture_id, user_id, TIMELINE_KIND, TIMELINE_TITLE, TIMELINE_BODY, payload, now],
    )
    .context("Insert timeline event")?;
    tx.commit()?;

    debug!("saved worksheet {id} for user {user_id}");
    Ok(id)
}

type RawWorksheet = (i64, Option<String>, String, String, String, String, String);

fn raw_worksheet(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawWorksheet> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn decode_worksheet(raw: RawWorksheet) -> Result<WorksheetRecord> {
    let (id, venture_id, user_id, kind, inputs, outputs, created_at) = raw;
    let inputs: StoredAssumptions = serde_json::from_str(&inputs)
        .with_context(|| format!("Decode inputs of worksheet {id}"))?;
    let outputs: StoredResult = serde_json::from_str(&outputs)
        .with_context(|| format!("Decode outputs of worksheet {id}"))?;
    Ok(WorksheetRecord {
        id,
        venture_id,
        user_id,
        kind,
        inputs: inputs.into(),
        outputs: outputs.into(),
        created_at,
    })
}

/// Most recent worksheets first, optionally for a single venture.
pub fn list_worksheets(
    conn: &Connection,
    venture_id: Option<&str>,
    limit: usize,
) -> Result<Vec<WorksheetRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, venture_id, user_id, type, inputs, outputs, created_at
         FROM worksheets
         WHERE (?1 IS NULL OR venture_id = ?1)
         ORDER BY id DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![venture_id, limit as i64], raw_worksheet)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(decode_worksheet(row?)?);
    }
    Ok(out)
}

pub fn get_worksheet(conn: &Connection, id: i64) -> Result<Option<WorksheetRecord>> {
    let raw = conn
        .query_row(
            "SELECT id, venture_id, user_id, type, inputs, outputs, created_at
             FROM worksheets WHERE id = ?1",
            params![id],
            raw_worksheet,
        )
        .optional()?;
    raw.map(decode_worksheet).transpose()
}

/// Most recent timeline entries first.
///
/// With `include_payload`, each entry carries its run as the same
/// `{inputs, outputs}` document the JSON export writes.
pub fn list_timeline(
    conn: &Connection,
    venture_id: Option<&str>,
    limit: usize,
    include_payload: bool,
) -> Result<Vec<TimelineEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, venture_id, user_id, kind, title, body, created_at, payload
         FROM timeline_events
         WHERE (?1 IS NULL OR venture_id = ?1)
         ORDER BY id DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![venture_id, limit as i64], |r| {
        let event = TimelineEvent {
            id: r.get(0)?,
            venture_id: r.get(1)?,
            user_id: r.get(2)?,
            kind: r.get(3)?,
            title: r.get(4)?,
            body: r.get(5)?,
            created_at: r.get(6)?,
            payload: None,
        };
        let payload: String = r.get(7)?;
        Ok((event, payload))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (mut event, payload) = row?;
        if include_payload {
            let run: StoredRun = serde_json::from_str(&payload)
                .with_context(|| format!("Decode payload of timeline event {}", event.id))?;
            let inputs: RoiAssumptions = run.inputs.into();
            let outputs: RoiResult = run.outputs.into();
            event.payload = Some(export::json::document(&inputs, &outputs));
        }
        out.push(event);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_roi_core::roi::compute_roi;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample() -> RoiAssumptions {
        RoiAssumptions {
            monthly_revenue_increase: dec!(1000),
            monthly_cost_change: dec!(200),
            months: 12,
            initial_investment: dec!(2000),
        }
    }

    #[test]
    fn save_run_writes_worksheet_and_timeline() {
        let mut conn = open_in_memory().unwrap();
        let inputs = sample();
        let outputs = compute_roi(&inputs);

        let id = save_run(
            &mut conn,
            &NewRun {
                venture_id: Some("v-1"),
                user_id: Some("u-1"),
                inputs: &inputs,
                outputs: &outputs,
            },
        )
        .unwrap();

        let record = get_worksheet(&conn, id).unwrap().unwrap();
        assert_eq!(record.kind, "roi");
        assert_eq!(record.venture_id.as_deref(), Some("v-1"));
        assert_eq!(record.inputs, inputs);
        assert_eq!(record.outputs, outputs);

        let events = list_timeline(&conn, Some("v-1"), 10, false).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "insight");
        assert_eq!(events[0].title, "ROI run");
        assert_eq!(events[0].body, "ROI run saved.");
        assert!(events[0].payload.is_none());
    }

    #[test]
    fn timeline_payload_matches_json_artifact() {
        let mut conn = open_in_memory().unwrap();
        let inputs = sample();
        let outputs = compute_roi(&inputs);
        save_run(
            &mut conn,
            &NewRun {
                venture_id: Some("v-1"),
                user_id: None,
                inputs: &inputs,
                outputs: &outputs,
            },
        )
        .unwrap();

        let events = list_timeline(&conn, None, 10, true).unwrap();
        let payload = events[0].payload.as_ref().unwrap();
        assert_eq!(payload, &export::json::document(&inputs, &outputs));
        assert_eq!(payload["outputs"]["paybackMonth"], 3);
        assert_eq!(payload["inputs"]["months"], 12);

        let listed = serde_json::to_value(&events).unwrap();
        assert_eq!(listed[0]["payload"]["outputs"]["roiPct"], 380.0);
        let bare = serde_json::to_value(list_timeline(&conn, None, 10, false).unwrap()).unwrap();
        assert!(bare[0].get("payload").is_none());
    }

    #[test]
    fn repeating_quotient_reads_back_exactly() {
        let mut conn = open_in_memory().unwrap();
        // net -2 over an investment of 3: ROI % is -200/3.
        let inputs = RoiAssumptions {
            monthly_revenue_increase: dec!(1),
            monthly_cost_change: dec!(0),
            months: 1,
            initial_investment: dec!(3),
        };
        let outputs = compute_roi(&inputs);
        assert_eq!(
            outputs.roi_pct.unwrap().to_string(),
            "-66.666666666666666666666666670"
        );

        let id = save_run(
            &mut conn,
            &NewRun {
                venture_id: None,
                user_id: None,
                inputs: &inputs,
                outputs: &outputs,
            },
        )
        .unwrap();

        let record = get_worksheet(&conn, id).unwrap().unwrap();
        assert_eq!(record.outputs, outputs);
        assert_eq!(
            record.outputs.roi_pct.unwrap().to_string(),
            "-66.666666666666666666666666670"
        );
    }

    #[test]
    fn saturated_result_stays_listable() {
        let mut conn = open_in_memory().unwrap();
        let inputs = sample();
        let ordinary = compute_roi(&inputs);
        save_run(
            &mut conn,
            &NewRun {
                venture_id: None,
                user_id: None,
                inputs: &inputs,
                outputs: &ordinary,
            },
        )
        .unwrap();

        let huge = RoiAssumptions {
            monthly_revenue_increase: dec!(79000000000000000000000000000),
            monthly_cost_change: dec!(0),
            months: 2,
            initial_investment: dec!(0),
        };
        let saturated = compute_roi(&huge);
        assert_eq!(saturated.total_gain, Decimal::MAX);
        let id = save_run(
            &mut conn,
            &NewRun {
                venture_id: None,
                user_id: None,
                inputs: &huge,
                outputs: &saturated,
            },
        )
        .unwrap();

        let record = get_worksheet(&conn, id).unwrap().unwrap();
        assert_eq!(record.inputs, huge);
        assert_eq!(record.outputs, saturated);
        assert_eq!(list_worksheets(&conn, None, 10).unwrap().len(), 2);
        assert_eq!(list_timeline(&conn, None, 10, true).unwrap().len(), 2);
    }

    #[test]
    fn missing_identifiers_default() {
        let mut conn = open_in_memory().unwrap();
        let inputs = sample();
        let outputs = compute_roi(&inputs);
        let id = save_run(
            &mut conn,
            &NewRun {
                venture_id: Some(""),
                user_id: None,
                inputs: &inputs,
                outputs: &outputs,
            },
        )
        .unwrap();

        let record = get_worksheet(&conn, id).unwrap().unwrap();
        assert_eq!(record.user_id, ANONYMOUS_USER);
        assert_eq!(record.venture_id, None);
    }

    #[test]
    fn list_filters_by_venture_newest_first() {
        let mut conn = open_in_memory().unwrap();
        let inputs = sample();
        let outputs = compute_roi(&inputs);
        for venture in ["a", "b", "a"] {
            save_run(
                &mut conn,
                &NewRun {
                    venture_id: Some(venture),
                    user_id: None,
                    inputs: &inputs,
                    outputs: &outputs,
                },
            )
            .unwrap();
        }

        let all = list_worksheets(&conn, None, 10).unwrap();
        assert_eq!(all.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3, 2, 1]);

        let a = list_worksheets(&conn, Some("a"), 10).unwrap();
        assert_eq!(a.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3, 1]);

        assert_eq!(list_worksheets(&conn, None, 1).unwrap().len(), 1);
        assert!(get_worksheet(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn failed_save_leaves_nothing_behind() {
        let mut conn = open_in_memory().unwrap();
        conn.execute_batch("DROP TABLE timeline_events;").unwrap();
        let inputs = sample();
        let outputs = compute_roi(&inputs);

        let err = save_run(
            &mut conn,
            &NewRun {
                venture_id: None,
                user_id: None,
                inputs: &inputs,
                outputs: &outputs,
            },
        );
        assert!(err.is_err());
        assert!(list_worksheets(&conn, None, 10).unwrap().is_empty());
    }
}
