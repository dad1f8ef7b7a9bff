//! RFQ request types

#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Direction of the RFQ, from the requester's point of view.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

/// Request body for creating an RFQ.
///
/// The defaults describe the staging flow: buy 100 USDC against BRL, quoted by `braza`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct CreateRfqRequest {
    /// Pair in `base/quote` form, e.g. `usdc/brl`.
    #[builder(default = "usdc/brl".to_owned())]
    pub instrument_pair: String,
    /// Sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    #[builder(default = dec!(100.00))]
    pub quantity: Decimal,
    #[builder(default)]
    pub side: Side,
    /// Asset `quantity` is denominated in.
    #[builder(default = "usdc".to_owned())]
    pub amount_denomination: String,
    /// Liquidity providers asked to quote.
    #[builder(default = vec!["braza".to_owned()])]
    pub providers: Vec<String>,
}

impl Default for CreateRfqRequest {
    fn default() -> Self {
        CreateRfqRequest::builder().build()
    }
}

/// Request body for executing a quote.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct ExecuteQuoteRequest {
    pub winning_quote_id: String,
}
