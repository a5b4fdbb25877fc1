use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// One day of counts for one product. At most one exists per `(product_id, date)`.
///
/// `None` means "not recorded yet", which is distinct from a recorded zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub date: NaiveDate,
    /// Bags received that day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_bags: Option<u32>,
    /// End-of-day physical count (EODC).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdc_bags: Option<u32>,
    /// Derived consumption; negative when counts disagree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_bags: Option<i64>,
    /// Manager forecast override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fc_bags: Option<u32>,
}

impl InventoryRecord {
    pub fn empty(product_id: ProductId, date: NaiveDate) -> Self {
        Self {
            product_id,
            date,
            rp_bags: None,
            pdc_bags: None,
            used_bags: None,
            fc_bags: None,
        }
    }

    pub fn key(&self) -> (ProductId, NaiveDate) {
        (self.product_id, self.date)
    }

    /// `MC + RP - EODC`, absent while the end-of-day count is missing.
    pub fn derive_used(&self, morning_count: i64) -> Option<i64> {
        self.pdc_bags.map(|eodc| {
            morning_count + i64::from(self.rp_bags.unwrap_or(0)) - i64::from(eodc)
        })
    }
}

/// Change to a single field: leave it, clear it, or set it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// An explicit empty entry clears the field.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Clear,
        }
    }
}

/// Partial update merged into a record by the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InventoryUpdate {
    pub rp_bags: FieldUpdate<u32>,
    pub pdc_bags: FieldUpdate<u32>,
    pub fc_bags: FieldUpdate<u32>,
}

impl InventoryUpdate {
    /// `None` clears the field; omit the call to leave it untouched.
    pub fn received(mut self, bags: Option<u32>) -> Self {
        self.rp_bags = bags.into();
        self
    }

    pub fn end_of_day_count(mut self, bags: Option<u32>) -> Self {
        self.pdc_bags = bags.into();
        self
    }

    pub fn forecast(mut self, bags: Option<u32>) -> Self {
        self.fc_bags = bags.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rp_bags.is_keep() && self.pdc_bags.is_keep() && self.fc_bags.is_keep()
    }

    pub(crate) fn merge_into(self, record: &mut InventoryRecord) {
        self.rp_bags.apply(&mut record.rp_bags);
        self.pdc_bags.apply(&mut record.pdc_bags);
        self.fc_bags.apply(&mut record.fc_bags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn derive_used_needs_end_of_day_count() {
        let mut record = InventoryRecord::empty(1, date());
        record.rp_bags = Some(3);
        assert_eq!(record.derive_used(10), None);

        record.pdc_bags = Some(4);
        assert_eq!(record.derive_used(10), Some(9));
    }

    #[test]
    fn missing_receipts_count_as_zero() {
        let mut record = InventoryRecord::empty(1, date());
        record.pdc_bags = Some(12);
        assert_eq!(record.derive_used(10), Some(-2));
    }

    #[test]
    fn merge_keeps_clears_and_sets() {
        let mut record = InventoryRecord::empty(2, date());
        record.rp_bags = Some(5);
        record.fc_bags = Some(7);

        InventoryUpdate::default()
            .end_of_day_count(Some(3))
            .forecast(None)
            .merge_into(&mut record);

        assert_eq!(record.rp_bags, Some(5));
        assert_eq!(record.pdc_bags, Some(3));
        assert_eq!(record.fc_bags, None);
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let record: InventoryRecord =
            serde_json::from_str(r#"{"productId":1,"date":"2024-05-06","rpBags":null,"pdcBags":4}"#)
                .unwrap();
        assert_eq!(record.rp_bags, None);
        assert_eq!(record.pdc_bags, Some(4));
        assert_eq!(record.used_bags, None);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"productId": 1, "date": "2024-05-06", "pdcBags": 4})
        );
    }
}
