//! Shared primitive types used across the dashboard engine.

/// Unique identifier of a payment within one fetched set.
pub type PaymentCode = String;

/// Merchant identifier (`mchtCode` on the wire).
pub type MerchantCode = String;

/// Machine status code, e.g. `SUCCESS`.
pub type StatusCode = String;

/// Pay-type code, e.g. `CARD`.
pub type PayTypeCode = String;

/// Calendar-day bucket key, formatted `YYYY-MM-DD`.
pub type DateKey = String;

/// Format used for date keys and filter bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The one status whose amounts count toward approved totals.
pub const SUCCESS_STATUS: &str = "SUCCESS";
