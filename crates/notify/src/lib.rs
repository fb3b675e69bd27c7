//! Notification side of the waste pipeline.
//!
//! This crate provides:
//! - `Notifier` trait, the send capability the dispatcher delivers through
//! - SMTP email and log-only notifier implementations
//! - Minijinja templates for the per-variant subject and body
//! - `Composer`, turning a classification plus recipient into a payload
//! - `Dispatcher`, a bounded concurrent fan-out with per-recipient outcomes

pub mod composer;
pub mod dispatcher;
pub mod email;
pub mod log;
pub mod templating;
pub mod traits;

pub use composer::{Composed, ComposedNotification, Composer};
pub use dispatcher::Dispatcher;
pub use traits::{DispatchOutcome, NotificationPayload, Notifier, NotifyError};
