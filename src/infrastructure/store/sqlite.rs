//! Embedded SQLite store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Garden, GardenId, NewGarden, Tree, TreeRecord};
use crate::infrastructure::store::{StoreError, StoreResult};
use crate::infrastructure::traits::GardenStore;

const TREE_COLUMNS: &str = r#""row", "col", variety, status, notes, images, harvest_info, created_at, updated_at"#;

#[derive(Debug)]
pub struct SqliteGardenStore {
    conn: Mutex<Connection>,
}

impl SqliteGardenStore {
    /// Open the database file, creating it and its schema if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::io(format!("create {}", parent.display()), e))?;
        }
        debug!("opening sqlite store at {}", path.display());
        let conn = Connection::open(&path)?;
        Self::init(conn)
    }

    /// Private database that lives as long as the store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        install_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn install_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS gardens (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT UNIQUE NOT NULL,
          "rows" INTEGER NOT NULL CHECK("rows" > 0),
          "cols" INTEGER NOT NULL CHECK("cols" > 0),
          created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trees (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          garden_id INTEGER NOT NULL REFERENCES gardens(id) ON DELETE CASCADE,
          "row" INTEGER NOT NULL,
          "col" INTEGER NOT NULL,
          variety TEXT NOT NULL DEFAULT '',
          status TEXT NOT NULL DEFAULT '',
          notes TEXT NOT NULL DEFAULT '',
          images TEXT NOT NULL DEFAULT '[]',
          harvest_info TEXT NOT NULL DEFAULT '[]',
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          UNIQUE(garden_id, "row", "col")
        );

        CREATE INDEX IF NOT EXISTS idx_trees_garden ON trees(garden_id);
        "#,
    )?;
    Ok(())
}

fn trees_of(conn: &Connection, garden_id: GardenId) -> StoreResult<Vec<Tree>> {
    let sql = format!("SELECT {TREE_COLUMNS} FROM trees WHERE garden_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare_cached(&sql)?;
    let trees = stmt
        .query_map(params![garden_id], tree_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(trees)
}

fn garden_from_row(row: &Row<'_>) -> rusqlite::Result<Garden> {
    Ok(Garden {
        id: row.get(0)?,
        name: row.get(1)?,
        rows: row.get(2)?,
        cols: row.get(3)?,
        created_at: row.get(4)?,
        trees: Vec::new(),
    })
}

fn tree_from_row(row: &Row<'_>) -> rusqlite::Result<Tree> {
    Ok(Tree {
        row: row.get(0)?,
        col: row.get(1)?,
        variety: row.get(2)?,
        status: row.get(3)?,
        notes: row.get(4)?,
        images: json_column(row, 5)?,
        harvest_info: json_column(row, 6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<T>> {
    let raw: Option<String> = row.get(idx)?;
    match raw.as_deref() {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, _) => code.code == ErrorCode::ConstraintViolation,
        _ => false,
    }
}

impl GardenStore for SqliteGardenStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn insert_garden(&self, garden: &NewGarden, created_at: DateTime<Utc>) -> StoreResult<Garden> {
        let conn = self.conn()?;
        let insert = conn.execute(
            r#"INSERT INTO gardens (name, "rows", "cols", created_at) VALUES (?1, ?2, ?3, ?4)"#,
            params![garden.name, garden.rows, garden.cols, created_at],
        );
        match insert {
            Ok(_) => {}
            Err(err) if is_constraint_violation(&err) => {
                return Err(StoreError::DuplicateGarden(garden.name.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        Ok(Garden {
            id: conn.last_insert_rowid(),
            name: garden.name.clone(),
            rows: garden.rows,
            cols: garden.cols,
            created_at,
            trees: Vec::new(),
        })
    }

    fn garden_id(&self, name: &str) -> StoreResult<Option<GardenId>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM gardens WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_gardens(&self) -> StoreResult<Vec<Garden>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            r#"SELECT id, name, "rows", "cols", created_at FROM gardens ORDER BY created_at DESC, id DESC"#,
        )?;
        let mut gardens = stmt
            .query_map([], garden_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for garden in &mut gardens {
            garden.trees = trees_of(&conn, garden.id)?;
        }
        Ok(gardens)
    }

    fn count_gardens(&self) -> StoreResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM gardens", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn trees(&self, garden_id: GardenId) -> StoreResult<Vec<Tree>> {
        let conn = self.conn()?;
        trees_of(&conn, garden_id)
    }

    fn upsert_tree(
        &self,
        garden_id: GardenId,
        record: &TreeRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<Tree> {
        let images = serde_json::to_string(&record.images)?;
        let harvest_info = serde_json::to_string(&record.harvest_info)?;

        let conn = self.conn()?;
        let created_at = conn.query_row(
            r#"
            INSERT INTO trees (garden_id, "row", "col", variety, status, notes, images, harvest_info, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT(garden_id, "row", "col") DO UPDATE SET
              variety = excluded.variety,
              status = excluded.status,
              notes = excluded.notes,
              images = excluded.images,
              harvest_info = excluded.harvest_info,
              updated_at = excluded.updated_at
            RETURNING created_at
            "#,
            params![
                garden_id,
                record.cell.row,
                record.cell.col,
                record.variety,
                record.status,
                record.notes,
                images,
                harvest_info,
                now,
            ],
            |row| row.get::<_, DateTime<Utc>>(0),
        );
        let created_at = match created_at {
            Ok(ts) => ts,
            Err(err) if is_constraint_violation(&err) => {
                return Err(StoreError::MissingGarden(garden_id));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Tree {
            row: record.cell.row,
            col: record.cell.col,
            variety: record.variety.clone(),
            status: record.status.clone(),
            notes: record.notes.clone(),
            images: record.images.clone(),
            harvest_info: record.harvest_info.clone(),
            created_at,
            updated_at: now,
        })
    }

    fn delete_garden(&self, garden_id: GardenId) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM trees WHERE garden_id = ?1", params![garden_id])?;
        let deleted = tx.execute("DELETE FROM gardens WHERE id = ?1", params![garden_id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cell, TreeFields};

    #[test]
    fn given_existing_name_when_inserting_then_duplicate_garden() {
        let store = SqliteGardenStore::open_in_memory().unwrap();
        let garden = NewGarden::try_new("Vườn A", 3, 3).unwrap();
        store.insert_garden(&garden, Utc::now()).unwrap();

        let err = store.insert_garden(&garden, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateGarden(name) if name == "Vườn A"));
    }

    #[test]
    fn given_vanished_garden_when_upserting_then_missing_garden() {
        let store = SqliteGardenStore::open_in_memory().unwrap();
        let record = TreeFields::default().into_record(Cell::new(0, 0));

        let err = store.upsert_tree(999, &record, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::MissingGarden(999)));
    }

    #[test]
    fn given_malformed_images_column_when_reading_then_conversion_error() {
        let store = SqliteGardenStore::open_in_memory().unwrap();
        let garden = store
            .insert_garden(&NewGarden::try_new("A", 2, 2).unwrap(), Utc::now())
            .unwrap();
        store
            .upsert_tree(garden.id, &TreeFields::default().into_record(Cell::new(1, 1)), Utc::now())
            .unwrap();
        store
            .conn()
            .unwrap()
            .execute("UPDATE trees SET images = 'oops'", [])
            .unwrap();

        let err = store.trees(garden.id).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
