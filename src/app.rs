use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

use crate::{
    errors::{ServiceError, StorageError},
    models::{InventoryRecord, InventoryUpdate, OrderRecord, Product, ProductId},
    services::{
        coverage_days, delivery_date,
        sheets::{ForecastDay, ProductSheet, WeeklyDay},
        ForecastEstimator, InventoryLedger, OrderCalculator, OrderOutcome, OrderResult,
        SheetBuilder,
    },
    storage::Storage,
};

/// Process-wide state: product catalog, inventory ledger and order log.
///
/// Loaded once at startup; every mutation is persisted before it returns. When a
/// write fails the in-memory mutation is undone, so memory always matches the last
/// successful save.
pub struct AppState {
    catalog: Vec<Product>,
    ledger: InventoryLedger,
    orders: Vec<OrderRecord>,
    storage: Box<dyn Storage>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .field("ledger", &self.ledger)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn load(catalog: Vec<Product>, storage: Box<dyn Storage>) -> Result<Self, ServiceError> {
        validate_catalog(&catalog)?;
        let ledger = InventoryLedger::from_records(storage.load_ledger()?);
        let orders = storage.load_order_log()?;
        info!(
            products = catalog.len(),
            inventory_records = ledger.len(),
            orders = orders.len(),
            "Application state loaded"
        );
        Ok(Self {
            catalog,
            ledger,
            orders,
            storage,
        })
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn product(&self, product_id: ProductId) -> Result<&Product, ServiceError> {
        self.catalog
            .iter()
            .find(|product| product.id == product_id)
            .ok_or_else(|| ServiceError::NotFound(format!("product {product_id}")))
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn order_log(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn get(&self, product_id: ProductId, date: NaiveDate) -> Option<&InventoryRecord> {
        self.ledger.get(product_id, date)
    }

    pub fn yesterday_eodc(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        self.ledger.yesterday_eodc(product_id, date)
    }

    /// Merges `update` into the record and persists the whole ledger.
    #[instrument(skip(self))]
    pub fn upsert(
        &mut self,
        product_id: ProductId,
        date: NaiveDate,
        update: InventoryUpdate,
    ) -> Result<InventoryRecord, ServiceError> {
        self.product(product_id)?;

        let snapshot = self.ledger.clone();
        let record = self.ledger.upsert(product_id, date, update);
        if let Err(err) = self.storage.save_ledger(&self.ledger.to_vec()) {
            self.ledger = snapshot;
            return Err(storage_failure(err));
        }
        Ok(record)
    }

    pub fn estimate(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        ForecastEstimator::new(&self.ledger).estimate(product_id, date)
    }

    pub fn forecast(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        ForecastEstimator::new(&self.ledger).forecast_or_override(product_id, date)
    }

    pub fn delivery_date(&self, order_date: NaiveDate) -> Option<NaiveDate> {
        delivery_date(order_date)
    }

    pub fn coverage_days(&self, order_date: NaiveDate) -> Vec<NaiveDate> {
        coverage_days(order_date)
    }

    pub fn calculate_order(
        &self,
        product_id: ProductId,
        order_date: NaiveDate,
    ) -> Result<Option<OrderResult>, ServiceError> {
        let product = self.product(product_id)?;
        Ok(OrderCalculator::new(&self.ledger).calculate_order(product, order_date))
    }

    /// Every product's order for `order_date` without recording anything.
    pub fn preview_order(&self, order_date: NaiveDate) -> Vec<OrderResult> {
        OrderCalculator::new(&self.ledger).preview(&self.catalog, order_date)
    }

    /// Places an order for `order_key`, appending it to the order log.
    ///
    /// Invalid dates and weekends come back as [`OrderOutcome::Rejected`]; nothing is
    /// written in that case.
    #[instrument(skip(self))]
    pub fn place_order(&mut self, order_key: &str) -> Result<OrderOutcome, ServiceError> {
        let outcome = OrderCalculator::new(&self.ledger).build_order(&self.catalog, order_key);
        let record = match outcome {
            OrderOutcome::Placed(record) => record,
            OrderOutcome::Rejected(reason) => {
                info!(%reason, "Order rejected");
                return Ok(OrderOutcome::Rejected(reason));
            }
        };

        self.orders.push(record.clone());
        if let Err(err) = self.storage.append_order_log(&self.orders) {
            self.orders.pop();
            return Err(storage_failure(err));
        }

        info!(
            order_date = %record.order_date,
            delivery_date = %record.delivery_date,
            total_ordered = record.total_ordered(),
            "Order placed"
        );
        Ok(OrderOutcome::Placed(record))
    }

    pub fn weekly_sheet(&self, start: NaiveDate, days: usize) -> Vec<ProductSheet<WeeklyDay>> {
        SheetBuilder::new(&self.ledger).weekly(&self.catalog, start, days)
    }

    pub fn forecast_sheet(&self, start: NaiveDate, days: usize) -> Vec<ProductSheet<ForecastDay>> {
        SheetBuilder::new(&self.ledger).forecast(&self.catalog, start, days)
    }
}

fn storage_failure(err: StorageError) -> ServiceError {
    warn!(error = %err, "Persistence failed; in-memory change rolled back");
    ServiceError::Storage(err)
}

fn validate_catalog(catalog: &[Product]) -> Result<(), ServiceError> {
    let mut seen = HashSet::new();
    for product in catalog {
        if product.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "product {} has an empty name",
                product.id
            )));
        }
        if !seen.insert(product.id) {
            return Err(ServiceError::ValidationError(format!(
                "duplicate product id {}",
                product.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::default_catalog,
        storage::{InMemoryStore, JsonStorage},
    };
    use assert_matches::assert_matches;
    use std::num::NonZeroU32;

    fn state() -> AppState {
        AppState::load(
            default_catalog(),
            Box::new(JsonStorage::new(InMemoryStore::new())),
        )
        .unwrap()
    }

    #[test]
    fn unknown_product_is_not_found() {
        let mut state = state();
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_matches!(
            state.upsert(42, date, InventoryUpdate::default().received(Some(1))),
            Err(ServiceError::NotFound(_))
        );
        assert!(state.ledger().is_empty());
    }

    #[test]
    fn duplicate_catalog_ids_are_rejected() {
        let mut catalog = default_catalog();
        catalog.push(Product::new(1, "Copy", 6, NonZeroU32::MIN));
        let result = AppState::load(catalog, Box::new(JsonStorage::new(InMemoryStore::new())));
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }
}
