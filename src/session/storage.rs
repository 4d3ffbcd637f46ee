//! Persisted key/value session storage.
//!
//! Mirrors the browser storage contract the backend's web client
//! established: two independent string key/value areas ("local" and
//! "session"), a set of legacy duplicate token keys that older writers
//! may have populated, and junk sentinel values (`""`, `"null"`,
//! `"undefined"`) that must be treated as absent. Each area is one JSON
//! object file under the state directory.
//!
//! Reads tolerate every legacy key; writes from this client land on the
//! canonical `token` key only. A purge removes every identity-related
//! key from both areas, never a partial subset.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered candidate token keys. Earlier entries win; the first is the
/// canonical key all new writes use. The rest are read-path
/// compatibility with older writers.
pub const TOKEN_KEYS: [&str; 6] = [
    "token",
    "auth_token",
    "access_token",
    "jwt_token",
    "authToken",
    "backendToken",
];

/// Canonical token key for new writes.
pub const CANONICAL_TOKEN_KEY: &str = "token";

/// Key holding the JSON-serialized local identity record.
pub const USER_KEY: &str = "user";

/// Key holding the provider (OAuth) session claims, session area only.
pub const PROVIDER_KEY: &str = "provider_session";

/// Which storage area a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Durable area (`local.json`), survives across sessions.
    Local,
    /// Provider-scoped area (`session.json`).
    Session,
}

/// One JSON-file-backed key/value area.
struct AreaFile {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl AreaFile {
    fn open(path: PathBuf) -> Self {
        let entries = Self::read(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Read the backing file. Missing file means empty; a malformed file
    /// is logged and treated as empty (it is overwritten on the next
    /// write) rather than surfaced to the user.
    fn read(path: &Path) -> HashMap<String, String> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(file = %path.display(), "discarding malformed storage file: {e}");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn reload(&self) {
        *self.entries.lock() = Self::read(&self.path);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock();
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock();
        let mut dirty = false;
        for key in keys {
            dirty |= entries.remove(*key).is_some();
        }
        if dirty {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Both storage areas for one state directory.
pub struct SessionStorage {
    local: AreaFile,
    session: AreaFile,
}

/// Point-in-time view of the identity-related keys, used by the poller
/// to detect out-of-band writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSnapshot {
    pub token: Option<String>,
    pub user: Option<String>,
    pub provider: Option<String>,
}

impl SessionStorage {
    /// Open (or create) the storage files under the given directory.
    pub fn open(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)
            .with_context(|| format!("failed to create {}", state_dir.display()))?;
        Ok(Self {
            local: AreaFile::open(state_dir.join("local.json")),
            session: AreaFile::open(state_dir.join("session.json")),
        })
    }

    fn area(&self, area: Area) -> &AreaFile {
        match area {
            Area::Local => &self.local,
            Area::Session => &self.session,
        }
    }

    /// Raw value for a key, junk sentinels included.
    pub fn get(&self, area: Area, key: &str) -> Option<String> {
        self.area(area).get(key)
    }

    pub fn set(&self, area: Area, key: &str, value: &str) -> Result<()> {
        self.area(area).set(key, value)
    }

    pub fn remove(&self, area: Area, key: &str) -> Result<bool> {
        self.area(area).remove(key)
    }

    /// Re-read both backing files, picking up writes by other processes.
    pub fn reload(&self) {
        self.local.reload();
        self.session.reload();
    }

    /// First usable token value, scanning every candidate key in the
    /// local area before the session area.
    pub fn first_usable_token(&self) -> Option<String> {
        for area in [Area::Local, Area::Session] {
            for key in TOKEN_KEYS {
                if let Some(value) = self.get(area, key) {
                    if usable_value(&value) {
                        return Some(value);
                    }
                }
            }
        }
        None
    }

    /// Remove every identity-related key from both areas.
    pub fn purge_identity_keys(&self) -> Result<()> {
        let mut keys: Vec<&str> = TOKEN_KEYS.to_vec();
        keys.push(USER_KEY);
        keys.push(PROVIDER_KEY);
        self.local.remove_many(&keys)?;
        self.session.remove_many(&keys)?;
        Ok(())
    }

    /// Snapshot of the identity keys for change detection.
    pub fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot {
            token: self.first_usable_token(),
            user: self.get(Area::Local, USER_KEY),
            provider: self.get(Area::Session, PROVIDER_KEY),
        }
    }
}

/// Whether a stored string is a real value rather than a junk sentinel
/// left behind by a sloppy writer.
pub fn usable_value(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != "null" && trimmed != "undefined"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, SessionStorage) {
        let tmp = TempDir::new().unwrap();
        let storage = SessionStorage::open(tmp.path()).unwrap();
        (tmp, storage)
    }

    #[test]
    fn set_get_roundtrip() {
        let (_tmp, storage) = test_storage();
        storage.set(Area::Local, "token", "abc").unwrap();
        assert_eq!(storage.get(Area::Local, "token").as_deref(), Some("abc"));
        assert_eq!(storage.get(Area::Session, "token"), None);
    }

    #[test]
    fn junk_sentinels_are_not_usable() {
        assert!(!usable_value(""));
        assert!(!usable_value("   "));
        assert!(!usable_value("null"));
        assert!(!usable_value("undefined"));
        assert!(usable_value("real-token"));
    }

    #[test]
    fn token_scan_skips_junk_and_prefers_local() {
        let (_tmp, storage) = test_storage();
        storage.set(Area::Local, "token", "undefined").unwrap();
        storage.set(Area::Local, "jwt_token", "").unwrap();
        storage.set(Area::Local, "backendToken", "from-local").unwrap();
        storage.set(Area::Session, "token", "from-session").unwrap();

        assert_eq!(
            storage.first_usable_token().as_deref(),
            Some("from-local")
        );
    }

    #[test]
    fn token_scan_falls_back_to_session_area() {
        let (_tmp, storage) = test_storage();
        storage.set(Area::Local, "auth_token", "null").unwrap();
        storage.set(Area::Session, "access_token", "from-session").unwrap();

        assert_eq!(
            storage.first_usable_token().as_deref(),
            Some("from-session")
        );
    }

    #[test]
    fn purge_removes_every_identity_key_from_both_areas() {
        let (_tmp, storage) = test_storage();
        for key in TOKEN_KEYS {
            storage.set(Area::Local, key, "x").unwrap();
            storage.set(Area::Session, key, "y").unwrap();
        }
        storage.set(Area::Local, USER_KEY, "{}").unwrap();
        storage.set(Area::Session, PROVIDER_KEY, "{}").unwrap();
        storage.set(Area::Local, "unrelated", "keep").unwrap();

        storage.purge_identity_keys().unwrap();

        for area in [Area::Local, Area::Session] {
            for key in TOKEN_KEYS {
                assert_eq!(storage.get(area, key), None, "{key} left behind");
            }
            assert_eq!(storage.get(area, USER_KEY), None);
            assert_eq!(storage.get(area, PROVIDER_KEY), None);
        }
        // Non-identity keys survive
        assert_eq!(storage.get(Area::Local, "unrelated").as_deref(), Some("keep"));
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let tmp = TempDir::new().unwrap();
        let a = SessionStorage::open(tmp.path()).unwrap();
        let b = SessionStorage::open(tmp.path()).unwrap();

        b.set(Area::Local, "token", "written-elsewhere").unwrap();
        assert_eq!(a.get(Area::Local, "token"), None);

        a.reload();
        assert_eq!(
            a.get(Area::Local, "token").as_deref(),
            Some("written-elsewhere")
        );
    }

    #[test]
    fn malformed_backing_file_is_treated_as_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("local.json"), "not json at all").unwrap();

        let storage = SessionStorage::open(tmp.path()).unwrap();
        assert_eq!(storage.get(Area::Local, "token"), None);

        // Writing works and replaces the corrupt file
        storage.set(Area::Local, "token", "fresh").unwrap();
        let reopened = SessionStorage::open(tmp.path()).unwrap();
        assert_eq!(reopened.get(Area::Local, "token").as_deref(), Some("fresh"));
    }

    #[test]
    fn snapshot_changes_when_identity_keys_change() {
        let (_tmp, storage) = test_storage();
        let before = storage.snapshot();
        storage.set(Area::Local, USER_KEY, r#"{"id":"u1"}"#).unwrap();
        assert_ne!(before, storage.snapshot());
    }
}
