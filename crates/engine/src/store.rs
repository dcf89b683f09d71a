//! Durable key-value persistence.
//!
//! Every entity collection is serialized as one JSON blob under a stable
//! [`StoreKey`]. The engine treats storage as best-effort: a write that
//! fails every medium is dropped silently and the in-memory state stays the
//! source of truth, while a blob that fails to load or decode makes the
//! engine fall back to the built-in fixture for that key only.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{EngineError, ResultEngine};

/// Stable names of the persisted collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Bookings,
    Invoices,
    Customers,
    Drivers,
    Vehicles,
    Income,
    Expenses,
    Partners,
    Estimations,
    Activity,
}

impl StoreKey {
    pub const ALL: [StoreKey; 10] = [
        StoreKey::Bookings,
        StoreKey::Invoices,
        StoreKey::Customers,
        StoreKey::Drivers,
        StoreKey::Vehicles,
        StoreKey::Income,
        StoreKey::Expenses,
        StoreKey::Partners,
        StoreKey::Estimations,
        StoreKey::Activity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bookings => "bookings",
            Self::Invoices => "invoices",
            Self::Customers => "customers",
            Self::Drivers => "drivers",
            Self::Vehicles => "vehicles",
            Self::Income => "income",
            Self::Expenses => "expenses",
            Self::Partners => "partners",
            Self::Estimations => "estimations",
            Self::Activity => "activityHistory",
        }
    }
}

/// A medium the engine writes collections through.
///
/// Implementations are synchronous: the engine is single-writer and never
/// blocks a mutation on storage in an observable way (failures degrade to
/// memory-only state instead of propagating).
pub trait DurableStore: std::fmt::Debug {
    fn load(&self, key: StoreKey) -> ResultEngine<Option<Vec<u8>>>;
    fn save(&mut self, key: StoreKey, bytes: &[u8]) -> ResultEngine<()>;
    fn remove(&mut self, key: StoreKey) -> ResultEngine<()>;
}

/// One `<key>.json` file per key under a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl DurableStore for FileStore {
    fn load(&self, key: StoreKey) -> ResultEngine<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: StoreKey, bytes: &[u8]) -> ResultEngine<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), bytes)?;
        Ok(())
    }

    fn remove(&mut self, key: StoreKey) -> ResultEngine<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    blobs: HashMap<StoreKey, Vec<u8>>,
    failing: bool,
}

/// In-memory store. Clones share state, so tests can keep a handle to a
/// store handed to the engine, and can flip it into a failing mode to
/// exercise the fallback chain.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every subsequent operation fails with a persistence error.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Raw blob access, for poisoning and asserting in tests.
    pub fn blob(&self, key: StoreKey) -> Option<Vec<u8>> {
        self.lock().blobs.get(&key).cloned()
    }

    pub fn insert_blob(&self, key: StoreKey, bytes: Vec<u8>) {
        self.lock().blobs.insert(key, bytes);
    }

    fn check(inner: &MemoryStoreInner) -> ResultEngine<()> {
        if inner.failing {
            return Err(EngineError::Persistence("memory store failing".to_string()));
        }
        Ok(())
    }
}

impl DurableStore for MemoryStore {
    fn load(&self, key: StoreKey) -> ResultEngine<Option<Vec<u8>>> {
        let inner = self.lock();
        Self::check(&inner)?;
        Ok(inner.blobs.get(&key).cloned())
    }

    fn save(&mut self, key: StoreKey, bytes: &[u8]) -> ResultEngine<()> {
        let mut inner = self.lock();
        Self::check(&inner)?;
        inner.blobs.insert(key, bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: StoreKey) -> ResultEngine<()> {
        let mut inner = self.lock();
        Self::check(&inner)?;
        inner.blobs.remove(&key);
        Ok(())
    }
}

/// Primary medium with a transparent secondary.
///
/// Writes go to the primary and retry against the secondary only when the
/// primary fails. Reads consult the secondary when the primary errors or has
/// no blob, so a value written during a primary outage stays readable.
#[derive(Debug)]
pub struct FallbackStore<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackStore<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: DurableStore, S: DurableStore> DurableStore for FallbackStore<P, S> {
    fn load(&self, key: StoreKey) -> ResultEngine<Option<Vec<u8>>> {
        match self.primary.load(key) {
            Ok(Some(bytes)) => Ok(Some(bytes)),
            Ok(None) => self.secondary.load(key),
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "primary load failed, trying secondary");
                self.secondary.load(key)
            }
        }
    }

    fn save(&mut self, key: StoreKey, bytes: &[u8]) -> ResultEngine<()> {
        match self.primary.save(key, bytes) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "primary save failed, trying secondary");
                self.secondary.save(key, bytes)
            }
        }
    }

    fn remove(&mut self, key: StoreKey) -> ResultEngine<()> {
        let primary = self.primary.remove(key);
        let secondary = self.secondary.remove(key);
        primary.or(secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        assert_eq!(store.load(StoreKey::Bookings).unwrap(), None);
        store.save(StoreKey::Bookings, b"[1,2,3]").unwrap();
        assert_eq!(
            store.load(StoreKey::Bookings).unwrap(),
            Some(b"[1,2,3]".to_vec())
        );

        store.remove(StoreKey::Bookings).unwrap();
        assert_eq!(store.load(StoreKey::Bookings).unwrap(), None);
        // Removing a missing key is not an error.
        store.remove(StoreKey::Bookings).unwrap();
    }

    #[test]
    fn memory_store_failing_mode() {
        let mut store = MemoryStore::new();
        store.save(StoreKey::Drivers, b"x").unwrap();

        store.set_failing(true);
        assert!(matches!(
            store.load(StoreKey::Drivers),
            Err(EngineError::Persistence(_))
        ));
        assert!(store.save(StoreKey::Drivers, b"y").is_err());

        store.set_failing(false);
        assert_eq!(store.load(StoreKey::Drivers).unwrap(), Some(b"x".to_vec()));
    }

    #[test]
    fn fallback_save_retries_secondary() {
        let primary = MemoryStore::new();
        let secondary = MemoryStore::new();
        primary.set_failing(true);

        let mut store = FallbackStore::new(primary.clone(), secondary.clone());
        store.save(StoreKey::Invoices, b"blob").unwrap();

        assert_eq!(secondary.blob(StoreKey::Invoices), Some(b"blob".to_vec()));
        primary.set_failing(false);
        assert_eq!(primary.blob(StoreKey::Invoices), None);
    }

    #[test]
    fn fallback_load_reads_secondary_when_primary_empty_or_failing() {
        let primary = MemoryStore::new();
        let secondary = MemoryStore::new();
        secondary.insert_blob(StoreKey::Customers, b"from-secondary".to_vec());

        let store = FallbackStore::new(primary.clone(), secondary.clone());
        assert_eq!(
            store.load(StoreKey::Customers).unwrap(),
            Some(b"from-secondary".to_vec())
        );

        primary.set_failing(true);
        assert_eq!(
            store.load(StoreKey::Customers).unwrap(),
            Some(b"from-secondary".to_vec())
        );
    }

    #[test]
    fn fallback_save_fails_only_when_both_fail() {
        let primary = MemoryStore::new();
        let secondary = MemoryStore::new();
        primary.set_failing(true);
        secondary.set_failing(true);

        let mut store = FallbackStore::new(primary, secondary);
        assert!(store.save(StoreKey::Expenses, b"blob").is_err());
    }
}
