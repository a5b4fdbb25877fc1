use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::num::NonZeroU32;
use tracing::{info, instrument};

use crate::{
    calendar::{day_name, parse_calendar_key},
    errors::RejectionReason,
    models::{OrderLine, OrderRecord, Product},
    services::{
        forecasting::{round_half_up, ForecastEstimator},
        ledger::InventoryLedger,
        order_policy::{coverage_days, delivery_date, policy_for},
    },
};

/// Recommended order for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderResult {
    pub product_name: String,
    pub increment: u32,
    /// Shortfall for display, never negative.
    pub needed: i64,
    /// Multiple of `increment`, never negative.
    pub ordered: i64,
    pub delivery_date: NaiveDate,
    pub delivery_weekday: Weekday,
    /// Yesterday's end-of-day count plus today's receipts.
    pub starting_on_hand: i64,
    /// Receipts from the order day up to, not including, the delivery day.
    pub in_transit: i64,
    pub total_forecast: i64,
    /// Signed shortfall that feeds rounding.
    pub raw_needed: i64,
}

impl OrderResult {
    pub fn to_line(&self) -> OrderLine {
        OrderLine {
            product_name: self.product_name.clone(),
            increment: self.increment,
            needed: self.needed,
            ordered: self.ordered,
        }
    }
}

/// Result of asking for an order on a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Placed(OrderRecord),
    Rejected(RejectionReason),
}

/// Rounds `value` to the nearest multiple of `increment` (half-up on the quotient)
/// and floors the result at zero.
pub fn clamp_to_increment(value: i64, increment: NonZeroU32) -> i64 {
    let increment = i64::from(increment.get());
    (round_half_up(value, increment) * increment).max(0)
}

pub struct OrderCalculator<'a> {
    ledger: &'a InventoryLedger,
}

impl<'a> OrderCalculator<'a> {
    pub fn new(ledger: &'a InventoryLedger) -> Self {
        Self { ledger }
    }

    /// Stock available at the start of `date`: yesterday's end-of-day count plus the
    /// day's receipts.
    pub fn starting_on_hand(&self, product: &Product, date: NaiveDate) -> i64 {
        self.ledger.yesterday_eodc(product.id, date) + self.ledger.received(product.id, date)
    }

    /// `None` when `order_date` falls on a day without an order policy.
    #[instrument(level = "debug", skip(self, product), fields(product_id = product.id))]
    pub fn calculate_order(&self, product: &Product, order_date: NaiveDate) -> Option<OrderResult> {
        let policy = policy_for(order_date.weekday())?;
        let delivery = delivery_date(order_date)?;

        let starting_on_hand = self.starting_on_hand(product, order_date);
        let in_transit: i64 = self
            .ledger
            .records_between(product.id, order_date, delivery)
            .filter_map(|record| record.rp_bags)
            .map(i64::from)
            .sum();

        let estimator = ForecastEstimator::new(self.ledger);
        let total_forecast: i64 = coverage_days(order_date)
            .into_iter()
            .map(|day| estimator.forecast_or_override(product.id, day))
            .sum();

        let raw_needed = total_forecast - (starting_on_hand + in_transit);

        Some(OrderResult {
            product_name: product.name.clone(),
            increment: product.order_increment.get(),
            needed: raw_needed.max(0),
            ordered: clamp_to_increment(raw_needed, product.order_increment),
            delivery_date: delivery,
            delivery_weekday: policy.delivery_weekday,
            starting_on_hand,
            in_transit,
            total_forecast,
            raw_needed,
        })
    }

    /// Order results for every product on `order_date`, empty on weekends.
    pub fn preview(&self, catalog: &[Product], order_date: NaiveDate) -> Vec<OrderResult> {
        catalog
            .iter()
            .filter_map(|product| self.calculate_order(product, order_date))
            .collect()
    }

    /// Builds the order record for `order_key` without recording it anywhere.
    pub fn build_order(&self, catalog: &[Product], order_key: &str) -> OrderOutcome {
        let Ok(order_date) = parse_calendar_key(order_key) else {
            return OrderOutcome::Rejected(RejectionReason::InvalidDate);
        };
        let Some(delivery) = delivery_date(order_date) else {
            return OrderOutcome::Rejected(RejectionReason::Weekend);
        };

        let items: Vec<OrderLine> = self
            .preview(catalog, order_date)
            .iter()
            .map(OrderResult::to_line)
            .collect();

        info!(
            order_date = %order_date,
            delivery_date = %delivery,
            order_day = day_name(order_date.weekday()),
            lines = items.len(),
            "Order calculated"
        );

        OrderOutcome::Placed(OrderRecord {
            order_date,
            delivery_date: delivery,
            items,
        })
    }
}
