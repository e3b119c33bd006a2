//! Tiered Store
//!
//! String key/value persistence that falls back from durable storage to
//! session storage to an in-process map. Failures never reach the caller.
//!
//! Every write goes to the in-process map as well as the first tier that
//! accepts it, and reads prefer that map. A key written (or removed) during
//! this session therefore reads back the last value even when the durable
//! tier rejected the write but still holds older data.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Storage tier error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage tier unavailable: {0}")]
    Unavailable(String),

    #[error("Quota exceeded writing {0}")]
    QuotaExceeded(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One backing persistence mechanism in the fallback chain
pub trait StorageTier: std::fmt::Debug {
    fn name(&self) -> &'static str;
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Which tier accepted a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    Durable,
    Session,
    Memory,
}

/// Durable tier: a JSON object on disk, survives process restarts
#[derive(Debug)]
pub struct FileTier {
    path: PathBuf,
}

impl FileTier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load for modification; a corrupt file is replaced rather than kept
    fn load_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Encode(e)) => {
                tracing::warn!("Discarding corrupt store file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(map)?)?;
        Ok(())
    }
}

impl StorageTier for FileTier {
    fn name(&self) -> &'static str {
        "durable"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.load_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.persist(&map)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.load_for_write()?;
        if map.remove(key).is_some() {
            self.persist(&map)?;
        }
        Ok(())
    }
}

/// Session tier: shared map that outlives one engine instance.
///
/// Clones share the same storage, so a host can hand a clone to the engine
/// it rebuilds after a reset.
#[derive(Debug, Clone, Default)]
pub struct SessionTier {
    data: Rc<RefCell<HashMap<String, String>>>,
}

impl SessionTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl StorageTier for SessionTier {
    fn name(&self) -> &'static str {
        "session"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

/// Durable, then session, then memory
#[derive(Debug, Default)]
pub struct TieredStore {
    durable: Option<Box<dyn StorageTier>>,
    session: Option<Box<dyn StorageTier>>,
    /// This session's writes; `None` marks a removal
    memory: HashMap<String, Option<String>>,
}

impl TieredStore {
    /// Store backed by the in-process map alone
    pub fn memory_only() -> Self {
        Self::default()
    }

    pub fn new(durable: Box<dyn StorageTier>, session: Box<dyn StorageTier>) -> Self {
        Self { durable: Some(durable), session: Some(session), memory: HashMap::new() }
    }

    pub fn with_durable(mut self, tier: Box<dyn StorageTier>) -> Self {
        self.durable = Some(tier);
        self
    }

    pub fn with_session(mut self, tier: Box<dyn StorageTier>) -> Self {
        self.session = Some(tier);
        self
    }

    /// Write `value`, returning the highest tier that accepted it
    pub fn set(&mut self, key: &str, value: &str) -> TierKind {
        self.memory.insert(key.to_string(), Some(value.to_string()));

        if let Some(tier) = self.durable.as_mut() {
            match tier.set_item(key, value) {
                Ok(()) => return TierKind::Durable,
                Err(e) => tracing::debug!("{} tier rejected {}: {}", tier.name(), key, e),
            }
        }
        if let Some(tier) = self.session.as_mut() {
            match tier.set_item(key, value) {
                Ok(()) => return TierKind::Session,
                Err(e) => tracing::debug!("{} tier rejected {}: {}", tier.name(), key, e),
            }
        }
        if self.durable.is_some() || self.session.is_some() {
            tracing::warn!("Persisting {} in memory only; it will not survive a reload", key);
        }
        TierKind::Memory
    }

    /// Read `key`, or `None` if no tier yields a value
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(entry) = self.memory.get(key) {
            return entry.clone();
        }
        for tier in [self.durable.as_deref(), self.session.as_deref()].into_iter().flatten() {
            match tier.get_item(key) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => tracing::debug!("{} tier read of {} failed: {}", tier.name(), key, e),
            }
        }
        None
    }

    /// Remove `key` from every tier
    pub fn remove(&mut self, key: &str) {
        self.memory.insert(key.to_string(), None);
        for tier in [self.durable.as_deref_mut(), self.session.as_deref_mut()].into_iter().flatten() {
            if let Err(e) = tier.remove_item(key) {
                tracing::debug!("{} tier could not remove {}: {}", tier.name(), key, e);
            }
        }
    }
}
