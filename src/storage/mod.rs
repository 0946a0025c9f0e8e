//! Durable storage for one session's cart.
//!
//! Both backends keep the cart as a JSON array of line items. A payload that
//! cannot be decoded is discarded and reported as "no prior cart".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::aggregates::CartLineItem;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cart storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("cart could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait CartStorage {
    /// `None` when nothing usable is stored.
    fn load_cart(&mut self) -> Option<Vec<CartLineItem>>;
    fn save_cart(&mut self, items: &[CartLineItem]) -> Result<(), StorageError>;
}

impl<S: CartStorage + ?Sized> CartStorage for Box<S> {
    fn load_cart(&mut self) -> Option<Vec<CartLineItem>> { (**self).load_cart() }
    fn save_cart(&mut self, items: &[CartLineItem]) -> Result<(), StorageError> { (**self).save_cart(items) }
}

fn decode(raw: &str) -> Option<Vec<CartLineItem>> {
    match serde_json::from_str(raw) {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed stored cart");
            None
        }
    }
}

/// Cart kept as a JSON file on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
    pub fn path(&self) -> &Path { &self.path }

    /// Sibling file a save is staged in before it replaces the cart.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for JsonFileStorage {
    fn load_cart(&mut self) -> Option<Vec<CartLineItem>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "stored cart unreadable");
                return None;
            }
        };
        let items = decode(&raw);
        if items.is_none() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not delete malformed cart");
            }
        }
        items
    }

    fn save_cart(&mut self, items: &[CartLineItem]) -> Result<(), StorageError> {
        let payload = serde_json::to_vec(items)?;
        let staging = self.staging_path();
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Cart kept in memory as the raw JSON string a durable store would hold.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    payload: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
    pub fn with_payload(payload: impl Into<String>) -> Self { Self { payload: Some(payload.into()) } }
    pub fn payload(&self) -> Option<&str> { self.payload.as_deref() }
}

impl CartStorage for MemoryStorage {
    fn load_cart(&mut self) -> Option<Vec<CartLineItem>> {
        let items = decode(self.payload.as_deref()?);
        if items.is_none() {
            self.payload = None;
        }
        items
    }

    fn save_cart(&mut self, items: &[CartLineItem]) -> Result<(), StorageError> {
        self.payload = Some(serde_json::to_string(items)?);
        Ok(())
    }
}
