//! A temporary beads workspace backed by a real SQLite file.

use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const BEADS_SCHEMA: &str = "
    CREATE TABLE issues (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL DEFAULT '',
        description TEXT,
        status TEXT,
        priority INTEGER DEFAULT 2,
        issue_type TEXT DEFAULT 'task',
        assignee TEXT,
        created_at DATETIME,
        updated_at DATETIME,
        closed_at DATETIME,
        external_ref TEXT,
        source_repo TEXT
    );
    CREATE TABLE dependencies (
        issue_id TEXT NOT NULL,
        depends_on_id TEXT NOT NULL,
        type TEXT NOT NULL DEFAULT 'blocks',
        created_at DATETIME,
        created_by TEXT,
        PRIMARY KEY (issue_id, depends_on_id)
    );
";

pub struct BeadsWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub db_path: PathBuf,
}

impl BeadsWorkspace {
    /// Create `<tmp>/.beads/beads.db` with the beads schema.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let beads_dir = root.join(".beads");
        fs::create_dir_all(&beads_dir).expect("beads dir");
        let db_path = beads_dir.join("beads.db");
        let conn = Connection::open(&db_path).expect("open db");
        conn.execute_batch(BEADS_SCHEMA).expect("schema");
        Self {
            temp_dir,
            root,
            db_path,
        }
    }

    /// A workspace directory with no `.beads` at all.
    pub fn empty() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        (temp_dir, root)
    }

    pub fn beads_dir(&self) -> PathBuf {
        self.root.join(".beads")
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.db_path).expect("open db")
    }

    pub fn insert_issue(&self, id: &str, title: &str, status: Option<&str>, priority: i64) {
        self.conn()
            .execute(
                "INSERT INTO issues (id, title, status, priority) VALUES (?1, ?2, ?3, ?4)",
                params![id, title, status, priority],
            )
            .expect("insert issue");
    }

    pub fn insert_issue_created(
        &self,
        id: &str,
        title: &str,
        status: Option<&str>,
        priority: i64,
        created_at: &str,
    ) {
        self.conn()
            .execute(
                "INSERT INTO issues (id, title, status, priority, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, title, status, priority, created_at],
            )
            .expect("insert issue");
    }

    pub fn insert_dep(&self, issue_id: &str, depends_on_id: &str, dep_type: &str) {
        self.conn()
            .execute(
                "INSERT INTO dependencies (issue_id, depends_on_id, type) VALUES (?1, ?2, ?3)",
                params![issue_id, depends_on_id, dep_type],
            )
            .expect("insert dependency");
    }

    pub fn set_status(&self, id: &str, status: &str) {
        self.conn()
            .execute(
                "UPDATE issues SET status = ?1 WHERE id = ?2",
                params![status, id],
            )
            .expect("update status");
    }

    pub fn write_config(&self, yaml: &str) {
        fs::write(self.beads_dir().join("config.yaml"), yaml).expect("write config");
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Default for BeadsWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
