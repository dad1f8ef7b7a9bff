//! RFQ types module
//!
//! Contains request and response types for the RFQ API.

pub mod request;
pub mod response;

pub use request::{CreateRfqRequest, ExecuteQuoteRequest, Side};
pub use response::{ExecutionResult, Quote, RfqHandle};
