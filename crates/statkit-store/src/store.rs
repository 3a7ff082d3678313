use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use statkit_core::history::{push_capped, toggle};
use statkit_core::store::keys;
use statkit_core::{HistoryEntry, PreferenceStore, StatError, StatResult};

use crate::schema::init_db;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(path: &Path) -> StatResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StatError::Storage(format!("cannot create db directory: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| StatError::Storage(format!("cannot open database: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StatError::Storage(e.to_string()))?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> StatResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StatError::Storage(format!("cannot open in-memory db: {e}")))?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    fn get_raw(&self, key: &str) -> StatResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| StatError::Storage(e.to_string()))
    }

    /// Decode the JSON under `key`. Unreadable values are logged and treated
    /// as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StatResult<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, "discarding unreadable stored value: {e}");
                Ok(None)
            }
        }
    }

    fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StatResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, json, Utc::now().to_rfc3339()],
            )
            .map_err(|e| StatError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StatResult<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| StatError::Storage(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PreferenceStore impl
// ---------------------------------------------------------------------------

impl PreferenceStore for SqliteStore {
    fn favorites(&self) -> StatResult<Vec<String>> {
        Ok(self.get_json(keys::FAVORITES)?.unwrap_or_default())
    }

    fn toggle_favorite(&self, symbol: &str) -> StatResult<bool> {
        let mut favorites = self.favorites()?;
        let now_favorite = toggle(&mut favorites, symbol);
        self.put_json(keys::FAVORITES, &favorites)?;
        Ok(now_favorite)
    }

    fn history(&self) -> StatResult<Vec<HistoryEntry>> {
        Ok(self.get_json(keys::HISTORY)?.unwrap_or_default())
    }

    fn record_history(&self, entry: HistoryEntry) -> StatResult<()> {
        let mut history = self.history()?;
        push_capped(&mut history, entry);
        self.put_json(keys::HISTORY, &history)
    }

    fn clear_history(&self) -> StatResult<()> {
        self.remove(keys::HISTORY)
    }

    fn cached_api_key(&self) -> StatResult<Option<String>> {
        self.get_json(keys::API_KEY)
    }

    fn set_cached_api_key(&self, key: &str) -> StatResult<()> {
        self.put_json(keys::API_KEY, key)
    }

    fn clear_cached_api_key(&self) -> StatResult<()> {
        self.remove(keys::API_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statkit_core::HISTORY_LIMIT;

    fn test_store() -> SqliteStore {
        SqliteStore::in_memory().unwrap()
    }

    #[test]
    fn test_favorites_start_empty() {
        let store = test_store();
        assert!(store.favorites().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_favorite_persists() {
        let store = test_store();
        assert!(store.toggle_favorite("μ").unwrap());
        assert!(store.toggle_favorite("σ").unwrap());
        assert_eq!(store.favorites().unwrap(), vec!["μ", "σ"]);

        assert!(!store.toggle_favorite("μ").unwrap());
        assert_eq!(store.favorites().unwrap(), vec!["σ"]);
    }

    #[test]
    fn test_history_newest_first_and_capped() {
        let store = test_store();
        for i in 0..(HISTORY_LIMIT + 3) {
            store
                .record_history(HistoryEntry::new(format!("problem {i}"), "solution"))
                .unwrap();
        }
        let history = store.history().unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].problem, "problem 12");
        assert_eq!(history.last().unwrap().problem, "problem 3");
    }

    #[test]
    fn test_clear_history() {
        let store = test_store();
        store.record_history(HistoryEntry::new("p", "s")).unwrap();
        store.clear_history().unwrap();
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_cached_api_key_round_trip() {
        let store = test_store();
        assert_eq!(store.cached_api_key().unwrap(), None);
        store.set_cached_api_key("xai-abc").unwrap();
        assert_eq!(store.cached_api_key().unwrap().as_deref(), Some("xai-abc"));
        store.clear_cached_api_key().unwrap();
        assert_eq!(store.cached_api_key().unwrap(), None);
    }

    #[test]
    fn test_values_stored_as_json_under_fixed_keys() {
        let store = test_store();
        store.toggle_favorite("x̄").unwrap();
        let raw = store.get_raw(keys::FAVORITES).unwrap().unwrap();
        assert_eq!(raw, r#"["x̄"]"#);
    }

    #[test]
    fn test_corrupt_value_treated_as_empty() {
        let store = test_store();
        store
            .conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, 'not json', '')",
                params![keys::HISTORY],
            )
            .unwrap();
        assert!(store.history().unwrap().is_empty());
        store.record_history(HistoryEntry::new("p", "s")).unwrap();
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("statkit.db");
        {
            let store = SqliteStore::new(&path).unwrap();
            store.toggle_favorite("χ²").unwrap();
        }
        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.favorites().unwrap(), vec!["χ²"]);
    }
}
