use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    calendar::add_days,
    models::{InventoryRecord, InventoryUpdate, ProductId},
};

/// All daily count records, unique by `(product, date)`.
///
/// Stock carries forward only through [`InventoryLedger::yesterday_eodc`]; there is no
/// opening-balance field. `used_bags` is always re-derived from the source counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryLedger {
    records: BTreeMap<(ProductId, NaiveDate), InventoryRecord>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from persisted records. A later duplicate key replaces an earlier
    /// one, and usage is re-derived so stale stored values are repaired.
    pub fn from_records(records: impl IntoIterator<Item = InventoryRecord>) -> Self {
        let mut ledger = Self {
            records: records.into_iter().map(|r| (r.key(), r)).collect(),
        };
        let keys: Vec<_> = ledger.records.keys().copied().collect();
        for (product_id, date) in keys {
            ledger.rederive(product_id, date);
        }
        ledger
    }

    pub fn get(&self, product_id: ProductId, date: NaiveDate) -> Option<&InventoryRecord> {
        self.records.get(&(product_id, date))
    }

    /// End-of-day count of the previous day, or 0 when it was never recorded.
    /// This is the morning count (MC) for `date`.
    pub fn yesterday_eodc(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        self.get(product_id, add_days(date, -1))
            .and_then(|record| record.pdc_bags)
            .map(i64::from)
            .unwrap_or(0)
    }

    /// Bags received on `date`, 0 when absent.
    pub fn received(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        self.get(product_id, date)
            .and_then(|record| record.rp_bags)
            .map(i64::from)
            .unwrap_or(0)
    }

    /// Merges `update` into the record for `(product_id, date)`, creating it if needed.
    ///
    /// Usage for the day is re-derived (or cleared when the end-of-day count is
    /// absent), and so is usage for the following day, whose morning count is this
    /// day's end-of-day count.
    pub fn upsert(
        &mut self,
        product_id: ProductId,
        date: NaiveDate,
        update: InventoryUpdate,
    ) -> InventoryRecord {
        let record = self
            .records
            .entry((product_id, date))
            .or_insert_with(|| InventoryRecord::empty(product_id, date));
        update.merge_into(record);

        self.rederive(product_id, date);
        self.rederive(product_id, add_days(date, 1));

        let merged = self.records[&(product_id, date)].clone();
        debug!(
            product_id,
            date = %date,
            rp_bags = ?merged.rp_bags,
            pdc_bags = ?merged.pdc_bags,
            used_bags = ?merged.used_bags,
            fc_bags = ?merged.fc_bags,
            "Inventory record upserted"
        );
        merged
    }

    fn rederive(&mut self, product_id: ProductId, date: NaiveDate) {
        let morning_count = self.yesterday_eodc(product_id, date);
        if let Some(record) = self.records.get_mut(&(product_id, date)) {
            record.used_bags = record.derive_used(morning_count);
            if let Some(used) = record.used_bags.filter(|used| *used < 0) {
                warn!(
                    product_id,
                    date = %date,
                    used_bags = used,
                    "Derived usage is negative; end-of-day count exceeds available stock"
                );
            }
        }
    }

    /// Records for one product in ascending date order.
    pub fn records_for(
        &self,
        product_id: ProductId,
    ) -> impl DoubleEndedIterator<Item = &InventoryRecord> + '_ {
        self.records
            .range((product_id, NaiveDate::MIN)..=(product_id, NaiveDate::MAX))
            .map(|(_, record)| record)
    }

    /// Records for one product with `from <= date < until`.
    pub fn records_between(
        &self,
        product_id: ProductId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> impl Iterator<Item = &InventoryRecord> + '_ {
        let upper = if until > from { until } else { from };
        self.records
            .range((product_id, from)..(product_id, upper))
            .map(|(_, record)| record)
    }

    pub fn records(&self) -> impl Iterator<Item = &InventoryRecord> + '_ {
        self.records.values()
    }

    pub fn to_vec(&self) -> Vec<InventoryRecord> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
