//! Day-of-week delivery rules.
//!
//! | Order day | Lead time | Coverage | Delivery  |
//! |-----------|-----------|----------|-----------|
//! | Monday    | 3         | 4        | Thursday  |
//! | Tuesday   | 3         | 4        | Friday    |
//! | Wednesday | 3         | 5        | Saturday  |
//! | Thursday  | 4         | 5        | Monday    |
//! | Friday    | 4         | 6        | Tuesday   |
//!
//! Weekend orders have no policy and are rejected.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::calendar::{add_days, date_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderPolicy {
    /// Days from placing the order to its delivery.
    pub lead_time_days: u32,
    /// Days, starting with the order day, the order must supply.
    pub coverage_days: u32,
    pub delivery_weekday: Weekday,
}

pub fn policy_for(weekday: Weekday) -> Option<OrderPolicy> {
    let (lead_time_days, coverage_days, delivery_weekday) = match weekday {
        Weekday::Mon => (3, 4, Weekday::Thu),
        Weekday::Tue => (3, 4, Weekday::Fri),
        Weekday::Wed => (3, 5, Weekday::Sat),
        Weekday::Thu => (4, 5, Weekday::Mon),
        Weekday::Fri => (4, 6, Weekday::Tue),
        Weekday::Sat | Weekday::Sun => return None,
    };
    Some(OrderPolicy {
        lead_time_days,
        coverage_days,
        delivery_weekday,
    })
}

/// When an order placed on `order_date` arrives, if that weekday takes orders.
pub fn delivery_date(order_date: NaiveDate) -> Option<NaiveDate> {
    policy_for(order_date.weekday())
        .map(|policy| add_days(order_date, i64::from(policy.lead_time_days)))
}

/// Days an order placed on `order_date` must cover. Empty on weekends.
pub fn coverage_days(order_date: NaiveDate) -> Vec<NaiveDate> {
    policy_for(order_date.weekday())
        .map(|policy| date_range(order_date, policy.coverage_days as usize))
        .unwrap_or_default()
}
