//! libSQL-backed note cache

use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Row};
use tokio::sync::Mutex;

use super::Database;
use crate::data::NoteCacheStore;
use crate::error::Result;
use crate::models::{Note, NoteId, NoteOrder};
use crate::util::now_millis;

const NOTE_COLUMNS: &str = "id, title, body, created_at, updated_at";

/// Cache store over a shared libSQL database.
#[derive(Clone)]
pub struct LibSqlNoteCache {
    db: Arc<Mutex<Database>>,
    page_size: u32,
}

impl LibSqlNoteCache {
    pub fn new(db: Database, page_size: u32) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            page_size: page_size.max(1),
        }
    }

    /// Open (and migrate) the database at `path`.
    pub async fn open(path: impl AsRef<std::path::Path>, page_size: u32) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?, page_size))
    }

    pub async fn open_in_memory(page_size: u32) -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?, page_size))
    }

    fn parse_note(row: &Row) -> Result<Note> {
        Ok(Note {
            id: NoteId::from(row.get::<String>(0)?),
            title: row.get(1)?,
            body: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    async fn collect_notes(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Note>> {
        let mut rows = conn.query(sql, params).await?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }

    /// Run `body` between `BEGIN` and `COMMIT`, rolling back on failure.
    async fn in_transaction<F, Fut, T>(conn: &Connection, body: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        conn.execute("BEGIN TRANSACTION", ()).await?;
        match body().await {
            Ok(value) => {
                if let Err(e) = conn.execute("COMMIT", ()).await {
                    conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(error) => {
                conn.execute("ROLLBACK", ()).await.ok();
                Err(error)
            }
        }
    }
}

fn affected(rows: u64) -> i64 {
    i64::try_from(rows).unwrap_or(i64::MAX)
}

#[async_trait]
impl NoteCacheStore for LibSqlNoteCache {
    async fn insert_note(&self, note: &Note) -> Result<i64> {
        let db = self.db.lock().await;
        let rows = db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO notes (id, title, body, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                libsql::params![
                    note.id.as_str(),
                    note.title.as_str(),
                    note.body.as_str(),
                    note.created_at,
                    note.updated_at
                ],
            )
            .await?;
        Ok(affected(rows))
    }

    async fn insert_notes(&self, notes: &[Note]) -> Result<Vec<i64>> {
        let db = self.db.lock().await;
        let conn = db.connection();
        Self::in_transaction(conn, move || async move {
            let mut results = Vec::with_capacity(notes.len());
            for note in notes {
                let rows = conn
                    .execute(
                        "INSERT OR IGNORE INTO notes (id, title, body, created_at, updated_at)
                         VALUES (?, ?, ?, ?, ?)",
                        libsql::params![
                            note.id.as_str(),
                            note.title.as_str(),
                            note.body.as_str(),
                            note.created_at,
                            note.updated_at
                        ],
                    )
                    .await?;
                results.push(if rows > 0 { affected(rows) } else { -1 });
            }
            Ok(results)
        })
        .await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<i64> {
        let db = self.db.lock().await;
        let rows = db
            .connection()
            .execute("DELETE FROM notes WHERE id = ?", libsql::params![id.as_str()])
            .await?;
        Ok(affected(rows))
    }

    async fn delete_notes(&self, ids: &[NoteId]) -> Result<i64> {
        let db = self.db.lock().await;
        let conn = db.connection();
        Self::in_transaction(conn, move || async move {
            let mut removed = 0;
            for id in ids {
                removed += conn
                    .execute("DELETE FROM notes WHERE id = ?", libsql::params![id.as_str()])
                    .await?;
            }
            Ok(affected(removed))
        })
        .await
    }

    async fn update_note(
        &self,
        id: &NoteId,
        title: &str,
        body: &str,
        timestamp: Option<i64>,
    ) -> Result<i64> {
        let updated_at = timestamp.unwrap_or_else(now_millis);
        let db = self.db.lock().await;
        let rows = db
            .connection()
            .execute(
                "UPDATE notes SET title = ?, body = ?, updated_at = ? WHERE id = ?",
                libsql::params![title, body, updated_at, id.as_str()],
            )
            .await?;
        Ok(affected(rows))
    }

    async fn search_notes(&self, query: &str, order: NoteOrder, page: u32) -> Result<Vec<Note>> {
        let limit = i64::from(page.max(1)) * i64::from(self.page_size);
        let sql = format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes
             WHERE instr(title, ?) > 0 OR instr(body, ?) > 0
             ORDER BY {}, id ASC
             LIMIT ?",
            order.sql()
        );
        let db = self.db.lock().await;
        Self::collect_notes(
            db.connection(),
            &sql,
            libsql::params![query, query, limit],
        )
        .await
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        let db = self.db.lock().await;
        Self::collect_notes(
            db.connection(),
            &format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY id ASC"),
            (),
        )
        .await
    }

    async fn search_note_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
                libsql::params![id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_num_notes(&self) -> Result<i64> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query("SELECT COUNT(*) FROM notes", ())
            .await?;
        match rows.next().await? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(0),
        }
    }
}
