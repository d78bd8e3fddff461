use crate::error::Result as CatalogResult;
use crate::model::{Endpoint, NewEndpoint, Page, ScanSession, SessionStatus};
use crate::store::CatalogStore;
use rusqlite::{Connection, OptionalExtension, Result, params};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Database {
    conn: Connection,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    folder_name TEXT NOT NULL,
    controller_name TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE(folder_name, controller_name)
);

CREATE TABLE IF NOT EXISTS endpoints (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    redirect TEXT NOT NULL DEFAULT '',
    discovered_at INTEGER NOT NULL,

    FOREIGN KEY(page_id) REFERENCES pages(id) ON DELETE CASCADE,
    UNIQUE(page_id, url)
);

CREATE INDEX IF NOT EXISTS idx_endpoints_page ON endpoints(page_id);

-- One row per scan run
CREATE TABLE IF NOT EXISTS scan_sessions (
    id TEXT PRIMARY KEY,
    root TEXT NOT NULL,
    start_time INTEGER NOT NULL,
    end_time INTEGER,
    status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'failed')),
    files_scanned INTEGER NOT NULL DEFAULT 0,
    endpoints_added INTEGER NOT NULL DEFAULT 0
);
            ",
        )?;
        Ok(())
    }

    // Session management
    pub fn create_session(&self, root: &str) -> Result<String> {
        let session_id = uuid::Uuid::new_v4().to_string();

        self.conn.execute(
            "INSERT INTO scan_sessions (id, root, start_time, status) VALUES (?1, ?2, ?3, ?4)",
            params![&session_id, root, current_timestamp(), SessionStatus::Running.as_str()],
        )?;

        Ok(session_id)
    }

    pub fn complete_session(&self, session_id: &str, files_scanned: usize, endpoints_added: usize) -> Result<()> {
        self.conn.execute(
            "UPDATE scan_sessions
             SET status = ?1, end_time = ?2, files_scanned = ?3, endpoints_added = ?4
             WHERE id = ?5",
            params![
                SessionStatus::Completed.as_str(),
                current_timestamp(),
                files_scanned as i64,
                endpoints_added as i64,
                session_id
            ],
        )?;
        Ok(())
    }

    pub fn fail_session(&self, session_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE scan_sessions SET status = ?1, end_time = ?2 WHERE id = ?3",
            params![SessionStatus::Failed.as_str(), current_timestamp(), session_id],
        )?;
        Ok(())
    }

    pub fn get_sessions(&self) -> Result<Vec<ScanSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, root, start_time, end_time, status, files_scanned, endpoints_added
             FROM scan_sessions ORDER BY start_time, rowid",
        )?;

        let sessions = stmt
            .query_map([], |row| {
                let status: String = row.get(4)?;
                Ok(ScanSession {
                    id: row.get(0)?,
                    root: row.get(1)?,
                    start_time: row.get(2)?,
                    end_time: row.get(3)?,
                    status: SessionStatus::from_str(&status).unwrap_or(SessionStatus::Failed),
                    files_scanned: row.get(5)?,
                    endpoints_added: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(sessions)
    }

    pub fn count_endpoints(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM endpoints", [], |row| row.get(0))
    }

    fn insert_endpoint(conn: &Connection, endpoint: &NewEndpoint) -> Result<i64> {
        conn.execute(
            "INSERT INTO endpoints (page_id, url, redirect, discovered_at) VALUES (?1, ?2, ?3, ?4)",
            params![endpoint.page_id, endpoint.url, endpoint.redirect, current_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl CatalogStore for Database {
    fn find_page(&self, folder_name: &str, controller_name: &str) -> CatalogResult<Option<Page>> {
        let page = self
            .conn
            .query_row(
                "SELECT id, folder_name, controller_name FROM pages
                 WHERE folder_name = ?1 AND controller_name = ?2",
                params![folder_name, controller_name],
                |row| {
                    Ok(Page {
                        id: row.get(0)?,
                        folder_name: row.get(1)?,
                        controller_name: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(page)
    }

    fn create_page(&mut self, folder_name: &str, controller_name: &str) -> CatalogResult<Page> {
        self.conn.execute(
            "INSERT INTO pages (folder_name, controller_name, created_at) VALUES (?1, ?2, ?3)",
            params![folder_name, controller_name, current_timestamp()],
        )?;

        Ok(Page {
            id: self.conn.last_insert_rowid(),
            folder_name: folder_name.to_string(),
            controller_name: controller_name.to_string(),
        })
    }

    fn page_endpoints(&self, page_id: i64) -> CatalogResult<Vec<Endpoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, page_id, url, redirect FROM endpoints WHERE page_id = ?1 ORDER BY id",
        )?;

        let endpoints = stmt
            .query_map(params![page_id], |row| {
                Ok(Endpoint {
                    id: row.get(0)?,
                    page_id: row.get(1)?,
                    url: row.get(2)?,
                    redirect: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(endpoints)
    }

    fn endpoint_exists(&self, page_id: i64, url: &str) -> CatalogResult<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM endpoints WHERE page_id = ?1 AND url = ?2",
                params![page_id, url],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        Ok(exists)
    }

    fn create_endpoint(&mut self, endpoint: &NewEndpoint) -> CatalogResult<Endpoint> {
        let id = Self::insert_endpoint(&self.conn, endpoint)?;

        Ok(Endpoint {
            id,
            page_id: endpoint.page_id,
            url: endpoint.url.clone(),
            redirect: endpoint.redirect.clone(),
        })
    }

    fn create_endpoints(&mut self, batch: &[NewEndpoint]) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;
        for endpoint in batch {
            Self::insert_endpoint(&tx, endpoint)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn pages(&self) -> CatalogResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, folder_name, controller_name FROM pages ORDER BY folder_name, controller_name",
        )?;

        let pages = stmt
            .query_map([], |row| {
                Ok(Page {
                    id: row.get(0)?,
                    folder_name: row.get(1)?,
                    controller_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(pages)
    }
}
