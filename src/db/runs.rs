use crate::coordinator::RunSummary;
use crate::errors::StoreError;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub struct ScrapeRun {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub pages_fetched: Option<i64>,
    pub listings_found: Option<i64>,
    pub skipped: Option<i64>,
    pub persisted: Option<i64>,
    pub abandoned: Option<i64>,
    pub cancelled: bool,
    pub success: bool,
    pub error_message: Option<String>,
}

pub fn start_run(conn: &Connection, now: NaiveDateTime) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO scrape_runs (started_at, success) VALUES (?1, 0)",
        params![now.format(TS_FORMAT).to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn finish_run(
    conn: &Connection,
    run_id: i64,
    now: NaiveDateTime,
    summary: &RunSummary,
    error: Option<&str>,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE scrape_runs
            SET finished_at = ?1, pages_fetched = ?2, listings_found = ?3, skipped = ?4,
                persisted = ?5, abandoned = ?6, cancelled = ?7, success = ?8, error_message = ?9
          WHERE id = ?10",
        params![
            now.format(TS_FORMAT).to_string(),
            summary.pages_fetched,
            summary.listings_found as i64,
            summary.skipped as i64,
            summary.persisted as i64,
            summary.abandoned as i64,
            summary.cancelled,
            error.is_none(),
            error,
            run_id
        ],
    )?;
    Ok(())
}

pub fn recent_runs(conn: &Connection, limit: u32) -> Result<Vec<ScrapeRun>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, started_at, finished_at, pages_fetched, listings_found, skipped,
                persisted, abandoned, cancelled, success, error_message
           FROM scrape_runs
          ORDER BY id DESC
          LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok(ScrapeRun {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            pages_fetched: row.get(3)?,
            listings_found: row.get(4)?,
            skipped: row.get(5)?,
            persisted: row.get(6)?,
            abandoned: row.get(7)?,
            cancelled: row.get(8)?,
            success: row.get(9)?,
            error_message: row.get(10)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}
