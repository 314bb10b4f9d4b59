//! Chat-platform webhook handling.
//!
//! `intake` classifies raw updates, `dispatcher` turns accepted updates into
//! background reply jobs, and `transport` is the outbound delivery port.

pub mod dispatcher;
pub mod intake;
pub mod transport;

pub use dispatcher::{DispatchSettings, WebhookDispatcher};
pub use intake::{Intake, classify};
pub use transport::MessageTransport;
