//! Payment and merchant records, raw and normalized.
//!
//! RULE: `*Dto` types mirror the API wire shape exactly.
//! Everything downstream of normalization works on `Payment`.

use crate::types::{MerchantCode, PayTypeCode, PaymentCode, StatusCode, SUCCESS_STATUS};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Wire types ───────────────────────────────────────────────────────────────

/// A payment as received from `GET /payments/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub payment_code: PaymentCode,
    pub mcht_code:    MerchantCode,
    pub amount:       String,
    pub currency:     String,
    pub pay_type:     PayTypeCode,
    pub status:       StatusCode,
    pub payment_at:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub mcht_code: MerchantCode,
    pub mcht_name: String,
    pub status:    String,
    pub biz_type:  String,
}

/// Merchants arrive from the list endpoint already in their final shape.
pub type MerchantDto = Merchant;

/// `GET /merchants/details/{mchtCode}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantDetail {
    #[serde(flatten)]
    pub merchant:      Merchant,
    pub biz_no:        String,
    pub address:       String,
    pub phone:         String,
    pub email:         String,
    pub registered_at: String,
    pub updated_at:    String,
}

/// Status code lookup entry (payment status and merchant status lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeItem {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTypeItem {
    #[serde(rename = "type")]
    pub pay_type: PayTypeCode,
    #[serde(default)]
    pub description: String,
}

// ── Normalized ───────────────────────────────────────────────────────────────

/// A payment after normalization: numeric amount, sortable timestamp.
///
/// `payment_at` is wall-clock time in the dashboard's reporting offset,
/// so `payment_at.date()` is the calendar day used by filters and buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_code: PaymentCode,
    pub mcht_code:    MerchantCode,
    pub amount:       f64,
    pub currency:     String,
    pub pay_type:     PayTypeCode,
    pub status:       StatusCode,
    pub payment_at:   NaiveDateTime,
}

impl Payment {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}
