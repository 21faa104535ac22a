//! Order lifecycle workflows shared by the HTTP handlers.
//!
//! - [`submit_order`]: record a new order, forward it to the vendor and
//!   finalize it as `submitted` or `failed`.
//! - [`apply_webhook`]: apply a vendor status update to a stored order.

pub mod submission;
pub mod webhook;

pub use submission::{SubmissionOutcome, SubmitError, submit_order, validate_order};
pub use webhook::{WebhookApplyError, apply_webhook};
