#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use bun_count::{
    calendar::add_days,
    errors::StorageError,
    models::{default_catalog, InventoryUpdate, ProductId},
    storage::{InMemoryStore, JsonStorage, KeyValueStore},
    AppState,
};
use chrono::NaiveDate;

pub const ORIGINAL_BUN: ProductId = 1;
pub const HOT_DOG_BUN: ProductId = 2;
pub const JUNIOR_BUN: ProductId = 3;

/// 2024-05-06, a Monday. Tests address days as offsets from it.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).expect("valid date")
}

pub fn day(offset: i64) -> NaiveDate {
    add_days(monday(), offset)
}

/// Application state over a shared in-memory store.
pub struct TestApp {
    pub state: AppState,
    pub store: InMemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::new())
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        let state = AppState::load(default_catalog(), Box::new(JsonStorage::new(store.clone())))
            .expect("state loads");
        Self { state, store }
    }

    /// Reloads state from whatever has been persisted so far.
    pub fn reload(&self) -> Self {
        Self::with_store(self.store.clone())
    }

    pub fn count(&mut self, product: ProductId, date: NaiveDate, rp: Option<u32>, eodc: Option<u32>) {
        let mut update = InventoryUpdate::default();
        if rp.is_some() {
            update = update.received(rp);
        }
        if eodc.is_some() {
            update = update.end_of_day_count(eodc);
        }
        self.state.upsert(product, date, update).expect("upsert succeeds");
    }

    pub fn override_forecast(&mut self, product: ProductId, date: NaiveDate, bags: u32) {
        self.state
            .upsert(product, date, InventoryUpdate::default().forecast(Some(bags)))
            .expect("upsert succeeds");
    }
}

/// Key-value store whose writes can be switched off to simulate an unavailable backend.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    failing: Rc<Cell<bool>>,
}

impl FlakyStore {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Unavailable("backend offline".into()));
        }
        self.inner.set(key, value)
    }
}
