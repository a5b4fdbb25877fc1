// Storage collaborator: opaque key-value stores plus the JSON layout of the ledger
// and order log on top of them.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    errors::StorageError,
    models::{InventoryRecord, OrderRecord},
};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

pub const DEFAULT_LEDGER_KEY: &str = "bun-count-inventory";
pub const DEFAULT_ORDER_LOG_KEY: &str = "bun-count-orders";

/// A string-keyed store of string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// What the application state needs from persistence. Every save is a full overwrite.
pub trait Storage {
    fn load_ledger(&self) -> Result<Vec<InventoryRecord>, StorageError>;
    fn save_ledger(&self, records: &[InventoryRecord]) -> Result<(), StorageError>;
    fn load_order_log(&self) -> Result<Vec<OrderRecord>, StorageError>;
    fn append_order_log(&self, orders: &[OrderRecord]) -> Result<(), StorageError>;
}

/// [`Storage`] as two JSON arrays under fixed keys of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct JsonStorage<S> {
    store: S,
    ledger_key: String,
    order_log_key: String,
}

impl<S: KeyValueStore> JsonStorage<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, DEFAULT_LEDGER_KEY, DEFAULT_ORDER_LOG_KEY)
    }

    pub fn with_keys(
        store: S,
        ledger_key: impl Into<String>,
        order_log_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            ledger_key: ledger_key.into(),
            order_log_key: order_log_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        match self.store.get(key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw)?;
        debug!(key, entries = items.len(), bytes = raw.len(), "Persisted");
        Ok(())
    }
}

impl<S: KeyValueStore> Storage for JsonStorage<S> {
    fn load_ledger(&self) -> Result<Vec<InventoryRecord>, StorageError> {
        self.load_list(&self.ledger_key)
    }

    fn save_ledger(&self, records: &[InventoryRecord]) -> Result<(), StorageError> {
        self.save_list(&self.ledger_key, records)
    }

    fn load_order_log(&self) -> Result<Vec<OrderRecord>, StorageError> {
        self.load_list(&self.order_log_key)
    }

    fn append_order_log(&self, orders: &[OrderRecord]) -> Result<(), StorageError> {
        self.save_list(&self.order_log_key, orders)
    }
}
