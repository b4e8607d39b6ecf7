// Tried/saved selections that survive restarts
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use toolhub_cache::KvCache;
use tracing::{debug, info, warn};

/// Storage key for the tried set
pub const TRIED_KEY: &str = "triedTools";
/// Storage key for the saved set
pub const SAVED_KEY: &str = "savedTools";

/// Durable string key-value medium the store writes through to
///
/// Swap implementations without touching the store: SQLite for real use,
/// a JSON file for portability, memory for tests.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Non-persistent backend
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one JSON object on disk, rewritten on every write
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileBackend {
    /// Open the file, starting empty if it is missing or unreadable
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring malformed selection file {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Could not read selection file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self { path, values }
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

impl KeyValueBackend for KvCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        KvCache::get(self, key).map_err(Error::from)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        KvCache::set(self, key, value).map_err(Error::from)
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Which of the two per-tool tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Tried,
    Saved,
}

impl Mark {
    pub fn key(&self) -> &'static str {
        match self {
            Mark::Tried => TRIED_KEY,
            Mark::Saved => SAVED_KEY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mark::Tried => "Tried",
            Mark::Saved => "Saved",
        }
    }
}

/// Owns the tried and saved id sets and writes every change through
/// to the backend
pub struct SelectionStore<B: KeyValueBackend> {
    backend: B,
    tried: BTreeSet<String>,
    saved: BTreeSet<String>,
}

impl<B: KeyValueBackend> SelectionStore<B> {
    /// Read both sets from the backend. Missing or broken entries start empty.
    pub fn load(backend: B) -> Self {
        let tried = Self::read_set(&backend, TRIED_KEY);
        let saved = Self::read_set(&backend, SAVED_KEY);
        debug!("Loaded selections: {} tried, {} saved", tried.len(), saved.len());

        Self {
            backend,
            tried,
            saved,
        }
    }

    fn read_set(backend: &B, key: &str) -> BTreeSet<String> {
        match backend.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!("Discarding malformed '{}' entry: {}", key, e);
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!("Could not read '{}', starting empty: {}", key, e);
                BTreeSet::new()
            }
        }
    }

    pub fn tried(&self) -> &BTreeSet<String> {
        &self.tried
    }

    pub fn saved(&self) -> &BTreeSet<String> {
        &self.saved
    }

    pub fn is_tried(&self, id: &str) -> bool {
        self.tried.contains(id)
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.contains(id)
    }

    pub fn tried_count(&self) -> usize {
        self.tried.len()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    pub fn has(&self, mark: Mark, id: &str) -> bool {
        match mark {
            Mark::Tried => self.is_tried(id),
            Mark::Saved => self.is_saved(id),
        }
    }

    pub fn set_tried(&mut self, id: &str, included: bool) -> bool {
        self.set(Mark::Tried, id, included)
    }

    pub fn set_saved(&mut self, id: &str, included: bool) -> bool {
        self.set(Mark::Saved, id, included)
    }

    /// Add or remove `id`. Returns whether anything changed; unchanged sets
    /// are not rewritten.
    pub fn set(&mut self, mark: Mark, id: &str, included: bool) -> bool {
        let set = match mark {
            Mark::Tried => &mut self.tried,
            Mark::Saved => &mut self.saved,
        };

        let changed = if included {
            set.insert(id.to_string())
        } else {
            set.remove(id)
        };

        if changed {
            self.persist(mark);
        }
        changed
    }

    /// Write one set through. Failures are logged and otherwise ignored;
    /// the in-memory state stays authoritative for this session.
    fn persist(&mut self, mark: Mark) {
        let set = match mark {
            Mark::Tried => &self.tried,
            Mark::Saved => &self.saved,
        };

        let ids: Vec<&String> = set.iter().collect();
        let result = serde_json::to_string(&ids)
            .map_err(Error::from)
            .and_then(|json| self.backend.set(mark.key(), &json));

        match result {
            Ok(()) => info!("Persisted {} {} ids", set.len(), mark.label().to_lowercase()),
            Err(e) => warn!("Failed to persist '{}': {}", mark.key(), e),
        }
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
