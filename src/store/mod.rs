//! Project persistence in SQLite.
//!
//! A project is a saved [`GenerationResult`] plus an id, creation time and
//! the paths it was exported to. Rows are written once and only ever deleted.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use indexmap::IndexMap;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{ChecklistError, Result};
use crate::pipeline::GenerationResult;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword TEXT NOT NULL,
    facility_type TEXT NOT NULL,
    check_phase TEXT NOT NULL,
    focus_area TEXT,
    data_collected INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    result_json TEXT NOT NULL,
    output_path_md TEXT,
    output_path_json TEXT
);
CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at);
"#;

const RECENT_DAYS: i64 = 7;

/// What gets saved for a finished generation.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub result: GenerationResult,
    pub data_collected: bool,
    pub output_path_md: Option<String>,
    pub output_path_json: Option<String>,
}

impl NewProject {
    pub fn new(result: GenerationResult, data_collected: bool) -> Self {
        Self {
            result,
            data_collected,
            output_path_md: None,
            output_path_json: None,
        }
    }

    pub fn with_paths(mut self, md: Option<String>, json: Option<String>) -> Self {
        self.output_path_md = md;
        self.output_path_json = json;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub keyword: String,
    pub facility_type: String,
    pub check_phase: String,
    pub focus_area: Option<String>,
    pub data_collected: bool,
    pub created_at: DateTime<Utc>,
    pub result: GenerationResult,
    pub output_path_md: Option<String>,
    pub output_path_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_projects: i64,
    /// Most common first
    pub facility_types: IndexMap<String, i64>,
    pub check_phases: IndexMap<String, i64>,
    pub recent_7days: i64,
}

/// Raw column values before JSON/timestamp parsing
struct ProjectRow {
    id: i64,
    keyword: String,
    facility_type: String,
    check_phase: String,
    focus_area: Option<String>,
    data_collected: bool,
    created_at: String,
    result_json: String,
    output_path_md: Option<String>,
    output_path_json: Option<String>,
}

const SELECT_COLUMNS: &str = "id, keyword, facility_type, check_phase, focus_area, data_collected, \
     created_at, result_json, output_path_md, output_path_json";

impl ProjectRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            keyword: row.get(1)?,
            facility_type: row.get(2)?,
            check_phase: row.get(3)?,
            focus_area: row.get(4)?,
            data_collected: row.get(5)?,
            created_at: row.get(6)?,
            result_json: row.get(7)?,
            output_path_md: row.get(8)?,
            output_path_json: row.get(9)?,
        })
    }

    fn into_project(self) -> Result<Project> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| {
                ChecklistError::persistence(format!(
                    "bad created_at '{}' for project {}: {}",
                    self.created_at, self.id, e
                ))
            })?
            .with_timezone(&Utc);
        Ok(Project {
            id: self.id,
            keyword: self.keyword,
            facility_type: self.facility_type,
            check_phase: self.check_phase,
            focus_area: self.focus_area,
            data_collected: self.data_collected,
            created_at,
            result: serde_json::from_str(&self.result_json)?,
            output_path_md: self.output_path_md,
            output_path_json: self.output_path_json,
        })
    }
}

/// Fixed-width UTC timestamps so lexical order is chronological.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn keyword_filter(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

pub struct ProjectStore {
    conn: Mutex<Connection>,
}

impl ProjectStore {
    /// Open (or create) the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(|e| {
            ChecklistError::persistence(format!("failed to open db at {}: {}", path.display(), e))
        })?;
        let store = Self::with_connection(conn)?;
        debug!("Project store opened at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| ChecklistError::persistence(format!("failed to apply schema: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ChecklistError::persistence("connection lock poisoned"))
    }

    pub fn create(&self, project: &NewProject) -> Result<i64> {
        self.create_at(project, Utc::now())
    }

    /// Insert with an explicit creation time.
    pub fn create_at(&self, project: &NewProject, created_at: DateTime<Utc>) -> Result<i64> {
        let meta = &project.result.metadata;
        let result_json = serde_json::to_string(&project.result)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO projects (
                keyword, facility_type, check_phase, focus_area, data_collected,
                created_at, result_json, output_path_md, output_path_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                meta.keyword,
                meta.facility_type,
                meta.check_phase,
                meta.focus_area,
                project.data_collected,
                timestamp(created_at),
                result_json,
                project.output_path_md,
                project.output_path_json,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!("Saved project {} ('{}')", id, meta.keyword);
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Project> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                ProjectRow::from_row,
            )
            .optional()?;
        match row {
            Some(row) => row.into_project(),
            None => Err(ChecklistError::NotFound { id }),
        }
    }

    /// Newest first. `keyword` filters by case-insensitive substring.
    pub fn list(&self, limit: usize, offset: usize, keyword: Option<&str>) -> Result<Vec<Project>> {
        let filter = keyword_filter(keyword);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM projects \
             WHERE (?1 IS NULL OR instr(lower(keyword), lower(?1)) > 0) \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                params![filter, limit as i64, offset as i64],
                ProjectRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    pub fn count(&self, keyword: Option<&str>) -> Result<i64> {
        let filter = keyword_filter(keyword);
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM projects \
             WHERE (?1 IS NULL OR instr(lower(keyword), lower(?1)) > 0)",
            params![filter],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if removed > 0 {
            info!("Deleted project {}", id);
        }
        Ok(removed > 0)
    }

    pub fn stats(&self) -> Result<ProjectStats> {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<ProjectStats> {
        let conn = self.conn()?;
        let total_projects = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        let facility_types = histogram(&conn, "facility_type")?;
        let check_phases = histogram(&conn, "check_phase")?;
        let cutoff = timestamp(now - Duration::days(RECENT_DAYS));
        let recent_7days = conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE created_at >= ?1",
            params![cutoff],
            |row| row.get(0),
        )?;
        Ok(ProjectStats {
            total_projects,
            facility_types,
            check_phases,
            recent_7days,
        })
    }
}

fn histogram(conn: &Connection, column: &str) -> Result<IndexMap<String, i64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {col}, COUNT(*) AS n FROM projects GROUP BY {col} ORDER BY n DESC, {col} ASC",
        col = column
    ))?;
    let pairs = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(pairs.into_iter().collect())
}
