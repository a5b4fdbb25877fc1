//! Bun Count
//!
//! Daily bun inventory counts, same-weekday demand forecasting and replenishment
//! order calculation for a small bakery counter.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

pub use app::AppState;

pub mod prelude {
    pub use crate::app::*;
    pub use crate::calendar::*;
    pub use crate::errors::*;
    pub use crate::models::*;
    pub use crate::services::*;
    pub use crate::storage::*;
}
