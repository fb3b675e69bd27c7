pub mod classification;
pub mod config;
pub mod entity;
pub mod error;
pub mod period;

pub use classification::{ClassificationResult, FinePolicy, Variant, DEFAULT_FINE};
pub use config::Config;
pub use entity::*;
pub use error::*;
pub use period::{Period, PeriodRange};
