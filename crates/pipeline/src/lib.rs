//! Waste aggregation and notification pipeline.
//!
//! SELECT → AGGREGATE → CLASSIFY → COMPOSE → DISPATCH → REPORT, one pass
//! per invocation. Stores and the send capability are passed in as trait
//! objects; nothing here holds global state.

pub mod aggregator;
pub mod classifier;
pub mod memory;
pub mod pipeline;
pub mod report;
pub mod store;

pub use memory::InMemoryStore;
pub use pipeline::{AlertRequest, Pipeline, ValidatedRequest};
pub use report::{BatchReport, FailedRecipient};
pub use store::{RecipientDirectory, WasteLogStore};
