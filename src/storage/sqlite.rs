//! `SQLite` issue store.
//!
//! Opens the beads database read-only and reads both tables inside a single
//! deferred transaction, which pins one WAL snapshot for the whole read.
//! Columns are discovered at runtime so older and newer beads schemas both
//! load; columns this crate does not model end up in `Issue::extra`.

use crate::config::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::error::{ReadyError, Result};
use crate::model::{Dependency, DependencyType, Issue, Priority, Snapshot, Status};
use crate::storage::{IssueStore, WorkspaceRef};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

/// Issue store reading a beads `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: Option<PathBuf>,
    lock_timeout: Duration,
}

impl Default for SqliteStore {
    fn default() -> Self {
        Self {
            db_path: None,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }
}

impl SqliteStore {
    /// Discover the database inside each workspace's `.beads` directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always read this database file, whatever the workspace.
    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// How long to wait on a locked database before giving up.
    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Database file this store would read for `workspace`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryNotFound` if no database can be located.
    pub fn resolve_db_path(&self, workspace: &WorkspaceRef) -> Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let beads_dir = config::discover_beads_dir(workspace.path())?;
        config::locate_database(&beads_dir)
    }

    fn open(&self, path: &Path) -> Result<Connection> {
        if !path.is_file() {
            return Err(ReadyError::RepositoryNotFound {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.lock_timeout)?;
        Ok(conn)
    }

    /// Read a snapshot from an explicit database file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryNotFound`, `RepositoryUnavailable` or
    /// `RepositoryCorrupt` as described on [`IssueStore::snapshot`].
    pub fn read_path(&self, path: &Path) -> Result<Snapshot> {
        debug!(path = %path.display(), "Opening database read-only");
        let mut conn = self.open(path)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let issues = read_issues(&tx)?;
        let dependencies = read_dependencies(&tx)?;
        tx.commit()?;
        Ok(Snapshot::new(issues, dependencies))
    }
}

impl IssueStore for SqliteStore {
    fn snapshot(&self, workspace: &WorkspaceRef) -> Result<Snapshot> {
        let path = self.resolve_db_path(workspace)?;
        self.read_path(&path)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column names of `table`, in declaration order.
fn table_columns(tx: &Transaction<'_>, table: &str) -> Result<Vec<String>> {
    let mut stmt = tx.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if columns.is_empty() {
        return Err(ReadyError::corrupt(format!("missing table '{table}'")));
    }
    Ok(columns)
}

fn read_issues(tx: &Transaction<'_>) -> Result<Vec<Issue>> {
    let columns = table_columns(tx, "issues")?;
    if !columns.iter().any(|c| c == "id") {
        return Err(ReadyError::corrupt("issues table has no 'id' column"));
    }

    let select = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {select} FROM issues ORDER BY id");
    let mut stmt = tx.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut issues = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        issues.push(issue_from_values(&columns, values, issues.len() + 1)?);
    }

    trace!(count = issues.len(), "Read issues");
    Ok(issues)
}

fn issue_from_values(columns: &[String], values: Vec<Value>, row_no: usize) -> Result<Issue> {
    let mut issue = Issue::new(String::new(), String::new());
    issue.status = None;

    for (name, value) in columns.iter().zip(values) {
        match name.as_str() {
            "id" => {
                issue.id = text(value).ok_or_else(|| {
                    ReadyError::corrupt(format!("issue row {row_no} has no id"))
                })?;
            }
            "title" => issue.title = text(value).unwrap_or_default(),
            "description" => issue.description = text(value),
            "status" => issue.status = text(value).map(|s| Status::parse_lenient(&s)),
            "priority" => issue.priority = priority(value, row_no)?,
            "assignee" => issue.assignee = text(value),
            "issue_type" => {
                issue.issue_type = text(value)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default();
            }
            "created_at" => issue.created_at = timestamp(value),
            "updated_at" => issue.updated_at = timestamp(value),
            "closed_at" => issue.closed_at = timestamp(value),
            "notes" => issue.notes = text(value),
            "design" => issue.design = text(value),
            "external_ref" => issue.external_ref = text(value),
            "acceptance_criteria" => issue.acceptance_criteria = text(value),
            "approval" => issue.approval = text(value),
            "epic_id" => issue.epic_id = text(value),
            other => {
                if let Some(json) = json_value(value) {
                    issue.extra.insert(other.to_string(), json);
                }
            }
        }
    }

    Ok(issue)
}

fn read_dependencies(tx: &Transaction<'_>) -> Result<Vec<Dependency>> {
    let columns = table_columns(tx, "dependencies")?;
    for required in ["issue_id", "depends_on_id"] {
        if !columns.iter().any(|c| c == required) {
            return Err(ReadyError::corrupt(format!(
                "dependencies table has no '{required}' column"
            )));
        }
    }
    let optional = |name: &str| {
        if columns.iter().any(|c| c == name) {
            quote_ident(name)
        } else {
            "NULL".to_string()
        }
    };

    let sql = format!(
        "SELECT issue_id, depends_on_id, {}, {}, {} FROM dependencies",
        optional("type"),
        optional("created_at"),
        optional("created_by"),
    );
    let mut stmt = tx.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut deps = Vec::new();
    while let Some(row) = rows.next()? {
        let row_no = deps.len() + 1;
        let endpoint = |idx: usize, what: &str| -> Result<String> {
            text(row.get::<_, Value>(idx)?).ok_or_else(|| {
                ReadyError::corrupt(format!("dependency row {row_no} has no {what}"))
            })
        };
        let issue_id = endpoint(0, "issue_id")?;
        let depends_on_id = endpoint(1, "depends_on_id")?;
        let dep_type = text(row.get::<_, Value>(2)?)
            .and_then(|s| s.parse::<DependencyType>().ok())
            .unwrap_or_default();

        deps.push(Dependency {
            issue_id,
            depends_on_id,
            dep_type,
            created_at: timestamp(row.get::<_, Value>(3)?),
            created_by: text(row.get::<_, Value>(4)?),
        });
    }

    trace!(count = deps.len(), "Read dependencies");
    Ok(deps)
}

/// Non-empty text. Integer ids are accepted and stringified.
///
/// The database stores empty strings for `NOT NULL DEFAULT ''` fields, so an
/// empty string reads as unset.
fn text(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s).filter(|v| !v.is_empty()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Null | Value::Real(_) | Value::Blob(_) => None,
    }
}

fn priority(value: Value, row_no: usize) -> Result<Priority> {
    let bad = |what: String| ReadyError::corrupt(format!("issue row {row_no}: bad priority {what}"));
    match value {
        Value::Null => Ok(Priority::default()),
        Value::Integer(n) => i32::try_from(n)
            .map(Priority)
            .map_err(|_| bad(n.to_string())),
        Value::Text(s) if s.trim().is_empty() => Ok(Priority::default()),
        Value::Text(s) => s.trim().parse::<i32>().map(Priority).map_err(|_| bad(s)),
        Value::Real(f) => Err(bad(f.to_string())),
        Value::Blob(_) => Err(bad("blob".to_string())),
    }
}

fn timestamp(value: Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Text(s) => parse_datetime(&s),
        Value::Integer(secs) => Utc.timestamp_opt(secs, 0).single(),
        Value::Null | Value::Real(_) | Value::Blob(_) => None,
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    trace!(value = s, "Unparseable timestamp treated as unset");
    None
}

fn json_value(value: Value) -> Option<serde_json::Value> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Integer(n) => Some(n.into()),
        Value::Real(f) => serde_json::Number::from_f64(f).map(serde_json::Value::Number),
        Value::Text(s) if s.is_empty() => None,
        Value::Text(s) => Some(serde_json::Value::String(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_db(dir: &Path, schema: &str) -> PathBuf {
        let path = dir.join("beads.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(schema).unwrap();
        path
    }

    const MINIMAL: &str = "
        CREATE TABLE issues (id TEXT PRIMARY KEY, title TEXT, status TEXT, priority INTEGER,
                             created_at TEXT, owner TEXT, estimate INTEGER);
        CREATE TABLE dependencies (issue_id TEXT, depends_on_id TEXT, type TEXT);
    ";

    #[test]
    fn reads_issues_dependencies_and_extra_columns() {
        let temp = TempDir::new().unwrap();
        let path = create_db(temp.path(), MINIMAL);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "INSERT INTO issues VALUES ('bd-1', 'One', 'open', 1, '2025-01-02 03:04:05', '', 5);
             INSERT INTO issues VALUES ('bd-2', 'Two', NULL, NULL, '2025-01-03T00:00:00Z', 'pat', NULL);
             INSERT INTO dependencies VALUES ('bd-2', 'bd-1', 'blocks');
             INSERT INTO dependencies VALUES ('bd-2', 'bd-9', NULL);",
        )
        .unwrap();
        drop(conn);

        let snapshot = SqliteStore::new().read_path(&path).unwrap();
        assert_eq!(snapshot.issues.len(), 2);

        let one = &snapshot.issues[0];
        assert_eq!(one.id, "bd-1");
        assert_eq!(one.status, Some(Status::Open));
        assert_eq!(one.priority, Priority::HIGH);
        assert!(one.created_at.is_some());
        assert_eq!(one.extra.get("estimate"), Some(&serde_json::json!(5)));
        assert!(!one.extra.contains_key("owner"));

        let two = &snapshot.issues[1];
        assert_eq!(two.status, None);
        assert_eq!(two.priority, Priority::MEDIUM);
        assert_eq!(two.extra.get("owner"), Some(&serde_json::json!("pat")));

        assert_eq!(snapshot.dependencies.len(), 2);
        assert_eq!(snapshot.dependencies[1].dep_type, DependencyType::Blocks);
    }

    #[test]
    fn integer_ids_are_stringified() {
        let temp = TempDir::new().unwrap();
        let path = create_db(
            temp.path(),
            "CREATE TABLE issues (id INTEGER PRIMARY KEY, title TEXT, status TEXT);
             CREATE TABLE dependencies (issue_id INTEGER, depends_on_id INTEGER, type TEXT);
             INSERT INTO issues VALUES (7, 'Seven', 'closed');
             INSERT INTO dependencies VALUES (7, 8, 'related');",
        );
        let snapshot = SqliteStore::new().read_path(&path).unwrap();
        assert_eq!(snapshot.issues[0].id, "7");
        assert_eq!(snapshot.dependencies[0].depends_on_id, "8");
        assert_eq!(snapshot.dependencies[0].dep_type, DependencyType::Related);
    }

    #[test]
    fn null_id_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = create_db(
            temp.path(),
            "CREATE TABLE issues (id TEXT, title TEXT);
             CREATE TABLE dependencies (issue_id TEXT, depends_on_id TEXT);
             INSERT INTO issues VALUES (NULL, 'orphan');",
        );
        let err = SqliteStore::new().read_path(&path).unwrap_err();
        assert!(matches!(err, ReadyError::RepositoryCorrupt { .. }));
    }

    #[test]
    fn missing_tables_are_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = create_db(temp.path(), "CREATE TABLE issues (id TEXT, title TEXT);");
        let err = SqliteStore::new().read_path(&path).unwrap_err();
        match err {
            ReadyError::RepositoryCorrupt { reason } => assert!(reason.contains("dependencies")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("beads.db");
        std::fs::write(&path, b"this is not a database, just some bytes padding it out").unwrap();
        let err = SqliteStore::new().read_path(&path).unwrap_err();
        assert!(matches!(err, ReadyError::RepositoryCorrupt { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = SqliteStore::new()
            .read_path(&temp.path().join("nope.db"))
            .unwrap_err();
        assert!(matches!(err, ReadyError::RepositoryNotFound { .. }));
    }

    #[test]
    fn text_priority_must_be_numeric() {
        assert_eq!(priority(Value::Text(" 3 ".into()), 1).unwrap(), Priority::LOW);
        assert!(priority(Value::Text("high".into()), 1).is_err());
        assert!(priority(Value::Integer(i64::MAX), 1).is_err());
    }

    #[test]
    fn parse_datetime_formats() {
        assert!(parse_datetime("2025-06-01T10:00:00+02:00").is_some());
        assert!(parse_datetime("2025-06-01 10:00:00.123").is_some());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("").is_none());
    }
}
