//! Data model for the acquisition pipeline.

mod series;
mod symbol;

pub use series::{DailyBar, PriceHistory, RawBar, RawHistory, COLUMNS};
pub use symbol::Symbol;
