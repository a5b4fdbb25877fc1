pub mod forecasting;
pub mod ledger;
pub mod order_policy;
pub mod orders;
pub mod sheets;

pub use forecasting::ForecastEstimator;
pub use ledger::InventoryLedger;
pub use order_policy::{coverage_days, delivery_date, policy_for, OrderPolicy};
pub use orders::{clamp_to_increment, OrderCalculator, OrderOutcome, OrderResult};
pub use sheets::SheetBuilder;
