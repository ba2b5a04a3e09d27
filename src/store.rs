use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::utils;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable persistence for named record collections. A collection is
/// always read and written whole; the last writer wins.
pub trait Store {
    /// True when the collection has ever been written, even as empty.
    fn exists(&self, collection: &str) -> bool;

    /// Read failures of any kind (missing row, unreadable database,
    /// corrupt payload) yield an empty collection.
    fn load<T: DeserializeOwned>(&self, collection: &str) -> Vec<T>;

    /// Serializes the full collection and replaces any prior payload.
    fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open_default() -> rusqlite::Result<Self> {
        let path = utils::database_path();
        utils::ensure_parent(&path);
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> rusqlite::Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS collections(
                name TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_utc TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn read_payload(&self, collection: &str) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT payload FROM collections WHERE name = ?1",
                params![collection],
                |row| row.get(0),
            )
            .optional()
    }
}

impl Store for SqliteStore {
    fn exists(&self, collection: &str) -> bool {
        matches!(self.read_payload(collection), Ok(Some(_)))
    }

    fn load<T: DeserializeOwned>(&self, collection: &str) -> Vec<T> {
        let payload = match self.read_payload(collection) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("failed to read collection {collection}: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&payload) {
            Ok(records) => records,
            Err(err) => {
                log::warn!("discarding corrupt payload for {collection}: {err}");
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(records)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO collections (name, payload, updated_utc)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
               payload = excluded.payload,
               updated_utc = excluded.updated_utc",
            params![collection, payload, now],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("in-memory store")
    }

    fn event(id: &str, date: &str) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            desc: String::new(),
            date: date.to_string(),
            time: String::new(),
            venue: String::new(),
            capacity: 0,
            image: String::new(),
            created: None,
        }
    }

    #[test]
    fn missing_collection_loads_empty() {
        let store = store();
        assert!(!store.exists("events"));
        assert!(store.load::<Event>("events").is_empty());
    }

    #[test]
    fn corrupt_payload_is_absorbed() {
        let store = store();
        store
            .conn
            .execute(
                "INSERT INTO collections (name, payload, updated_utc) VALUES ('events', '{not json', '')",
                [],
            )
            .expect("insert garbage");
        assert!(store.load::<Event>("events").is_empty());
        // the collection still counts as written
        assert!(store.exists("events"));
    }

    #[test]
    fn save_replaces_the_whole_collection() {
        let store = store();
        store
            .save("events", &[event("e1", "2026-09-01"), event("e2", "2026-09-02")])
            .expect("first save");
        store
            .save("events", &[event("e3", "2026-09-03")])
            .expect("second save");

        let loaded = store.load::<Event>("events");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "e3");
    }

    #[test]
    fn saving_what_was_loaded_changes_nothing() {
        let store = store();
        store
            .save("events", &[event("e1", "2026-09-01")])
            .expect("save");
        let before = store.read_payload("events").expect("read").expect("payload");

        let loaded = store.load::<Event>("events");
        store.save("events", &loaded).expect("resave");
        let after = store.read_payload("events").expect("read").expect("payload");

        assert_eq!(before, after);
    }

    #[test]
    fn empty_collection_is_distinct_from_absent() {
        let store = store();
        store.save("registrations", &Vec::<Event>::new()).expect("save");
        assert!(store.exists("registrations"));
        assert!(store.load::<Event>("registrations").is_empty());
    }
}
