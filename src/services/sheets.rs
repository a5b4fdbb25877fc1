//! Row data for the weekly count sheet and the forecast sheet.

use chrono::NaiveDate;
use serde::Serialize;
use strum::{Display, EnumIter};

use crate::{
    calendar::date_range,
    models::{Product, ProductId},
    services::{forecasting::ForecastEstimator, ledger::InventoryLedger},
};

pub const WEEKLY_SHEET_DAYS: usize = 7;
pub const FORECAST_SHEET_DAYS: usize = 14;

/// Rows of the weekly count sheet, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum WeeklyRow {
    #[strum(serialize = "Morning Count")]
    MorningCount,
    #[strum(serialize = "Received")]
    Received,
    #[strum(serialize = "Total (IST)")]
    InStockTotal,
    #[strum(serialize = "Night Count (EODC)")]
    EndOfDayCount,
    #[strum(serialize = "Used")]
    Used,
    #[strum(serialize = "Forecast (FC)")]
    Forecast,
}

/// Rows of the forecast sheet, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum ForecastRow {
    #[strum(serialize = "Received (RP)")]
    Received,
    #[strum(serialize = "Forecast override")]
    Override,
    #[strum(serialize = "Forecast (FC)")]
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyDay {
    pub date: NaiveDate,
    pub morning_count: i64,
    pub received: Option<u32>,
    pub in_stock_total: i64,
    pub end_of_day_count: Option<u32>,
    pub used: Option<i64>,
    pub forecast: i64,
}

impl WeeklyDay {
    /// Cell value for `row`; `None` renders as a blank.
    pub fn cell(&self, row: WeeklyRow) -> Option<i64> {
        match row {
            WeeklyRow::MorningCount => Some(self.morning_count),
            WeeklyRow::Received => self.received.map(i64::from),
            WeeklyRow::InStockTotal => Some(self.in_stock_total),
            WeeklyRow::EndOfDayCount => self.end_of_day_count.map(i64::from),
            WeeklyRow::Used => self.used,
            WeeklyRow::Forecast => Some(self.forecast),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub received: Option<u32>,
    pub forecast_override: Option<u32>,
    pub forecast: i64,
}

impl ForecastDay {
    pub fn cell(&self, row: ForecastRow) -> Option<i64> {
        match row {
            ForecastRow::Received => self.received.map(i64::from),
            ForecastRow::Override => self.forecast_override.map(i64::from),
            ForecastRow::Forecast => Some(self.forecast),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSheet<D> {
    pub product_id: ProductId,
    pub product_name: String,
    pub days: Vec<D>,
}

pub struct SheetBuilder<'a> {
    ledger: &'a InventoryLedger,
}

impl<'a> SheetBuilder<'a> {
    pub fn new(ledger: &'a InventoryLedger) -> Self {
        Self { ledger }
    }

    pub fn weekly(
        &self,
        catalog: &[Product],
        start: NaiveDate,
        days: usize,
    ) -> Vec<ProductSheet<WeeklyDay>> {
        let dates = date_range(start, days);
        let estimator = ForecastEstimator::new(self.ledger);
        catalog
            .iter()
            .map(|product| ProductSheet {
                product_id: product.id,
                product_name: product.name.clone(),
                days: dates
                    .iter()
                    .map(|&date| {
                        let record = self.ledger.get(product.id, date);
                        let morning_count = self.ledger.yesterday_eodc(product.id, date);
                        let received = record.and_then(|r| r.rp_bags);
                        let end_of_day_count = record.and_then(|r| r.pdc_bags);
                        let in_stock_total = morning_count + i64::from(received.unwrap_or(0));
                        WeeklyDay {
                            date,
                            morning_count,
                            received,
                            in_stock_total,
                            end_of_day_count,
                            used: end_of_day_count.map(|eodc| in_stock_total - i64::from(eodc)),
                            forecast: estimator.forecast_or_override(product.id, date),
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn forecast(
        &self,
        catalog: &[Product],
        start: NaiveDate,
        days: usize,
    ) -> Vec<ProductSheet<ForecastDay>> {
        let dates = date_range(start, days);
        let estimator = ForecastEstimator::new(self.ledger);
        catalog
            .iter()
            .map(|product| ProductSheet {
                product_id: product.id,
                product_name: product.name.clone(),
                days: dates
                    .iter()
                    .map(|&date| {
                        let record = self.ledger.get(product.id, date);
                        ForecastDay {
                            date,
                            received: record.and_then(|r| r.rp_bags),
                            forecast_override: record.and_then(|r| r.fc_bags),
                            forecast: estimator.forecast_or_override(product.id, date),
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calendar::add_days,
        models::{default_catalog, InventoryUpdate},
    };
    use strum::IntoEnumIterator;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn weekly_sheet_carries_counts_forward() {
        let mut ledger = InventoryLedger::new();
        ledger.upsert(
            1,
            monday(),
            InventoryUpdate::default()
                .received(Some(8))
                .end_of_day_count(Some(5)),
        );
        ledger.upsert(1, add_days(monday(), 1), InventoryUpdate::default().received(Some(2)));

        let sheets = SheetBuilder::new(&ledger).weekly(&default_catalog(), monday(), WEEKLY_SHEET_DAYS);
        assert_eq!(sheets.len(), 3);
        let original = &sheets[0];
        assert_eq!(original.product_name, "Original Bun");
        assert_eq!(original.days.len(), 7);

        let mon = &original.days[0];
        assert_eq!(mon.morning_count, 0);
        assert_eq!(mon.in_stock_total, 8);
        assert_eq!(mon.used, Some(3));

        let tue = &original.days[1];
        assert_eq!(tue.morning_count, 5);
        assert_eq!(tue.in_stock_total, 7);
        assert_eq!(tue.used, None);
        assert_eq!(tue.cell(WeeklyRow::Used), None);
        assert_eq!(tue.cell(WeeklyRow::Received), Some(2));
    }

    #[test]
    fn forecast_sheet_shows_override_and_effective_forecast() {
        let mut ledger = InventoryLedger::new();
        ledger.upsert(2, monday(), InventoryUpdate::default().forecast(Some(12)));

        let sheets = SheetBuilder::new(&ledger).forecast(&default_catalog(), monday(), FORECAST_SHEET_DAYS);
        let hot_dog = &sheets[1];
        assert_eq!(hot_dog.days.len(), 14);
        assert_eq!(hot_dog.days[0].forecast_override, Some(12));
        assert_eq!(hot_dog.days[0].forecast, 12);
        assert_eq!(hot_dog.days[7].cell(ForecastRow::Override), None);
        assert_eq!(hot_dog.days[7].cell(ForecastRow::Forecast), Some(0));
    }

    #[test]
    fn row_labels_follow_sheet_order() {
        let labels: Vec<String> = WeeklyRow::iter().map(|row| row.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "Morning Count",
                "Received",
                "Total (IST)",
                "Night Count (EODC)",
                "Used",
                "Forecast (FC)"
            ]
        );
        assert_eq!(ForecastRow::iter().count(), 3);
    }
}
