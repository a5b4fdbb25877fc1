use chrono::{Datelike, NaiveDate};
use tracing::instrument;

use crate::{models::ProductId, services::ledger::InventoryLedger};

/// Number of same-weekday observations averaged by [`ForecastEstimator::estimate`].
pub const FORECAST_HISTORY_WEEKS: usize = 4;

/// Same-weekday rolling average over recorded usage.
pub struct ForecastEstimator<'a> {
    ledger: &'a InventoryLedger,
}

impl<'a> ForecastEstimator<'a> {
    pub fn new(ledger: &'a InventoryLedger) -> Self {
        Self { ledger }
    }

    /// Mean usage of the most recent records sharing `date`'s weekday, rounded half-up.
    /// Zero without history, and never below zero.
    #[instrument(level = "debug", skip(self))]
    pub fn estimate(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        let weekday = date.weekday();
        let history: Vec<i64> = self
            .ledger
            .records_for(product_id)
            .rev()
            .filter(|record| record.date.weekday() == weekday)
            .filter_map(|record| record.used_bags)
            .take(FORECAST_HISTORY_WEEKS)
            .collect();

        if history.is_empty() {
            return 0;
        }

        let sum: i64 = history.iter().sum();
        round_half_up(sum, history.len() as i64).max(0)
    }

    /// The manager override when one is set, otherwise [`Self::estimate`].
    pub fn forecast_or_override(&self, product_id: ProductId, date: NaiveDate) -> i64 {
        match self.ledger.get(product_id, date).and_then(|r| r.fc_bags) {
            Some(fc) => i64::from(fc),
            None => self.estimate(product_id, date),
        }
    }
}

/// `numerator / denominator` rounded to the nearest integer, halves toward positive
/// infinity. `denominator` must be positive.
pub(crate) fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator).div_euclid(2 * denominator)
}
