//! Dashboard filter and its application to normalized payments.
//!
//! RULE: filtering never mutates its input and preserves order.
//! An absent field (or an empty string) imposes no constraint.

use crate::{
    error::{DashError, DashResult},
    payment::Payment,
    types::{MerchantCode, PayTypeCode, StatusCode, DATE_FORMAT},
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    /// Inclusive lower calendar-day bound.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_date_as_none"
    )]
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper calendar-day bound.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_date_as_none"
    )]
    pub to_date:   Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcht_code: Option<MerchantCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status:    Option<StatusCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_type:  Option<PayTypeCode>,
}

impl DashboardFilter {
    /// The default page filter: the last `days` days up to and including `today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            from_date: Some(
                today
                    .checked_sub_days(Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MIN),
            ),
            to_date: Some(today),
            ..Self::default()
        }
    }

    pub fn merchant(&self) -> Option<&str> {
        active(&self.mcht_code)
    }

    pub fn status(&self) -> Option<&str> {
        active(&self.status)
    }

    pub fn pay_type(&self) -> Option<&str> {
        active(&self.pay_type)
    }

    pub fn is_empty(&self) -> bool {
        self.from_date.is_none()
            && self.to_date.is_none()
            && self.merchant().is_none()
            && self.status().is_none()
            && self.pay_type().is_none()
    }

    /// Does this payment pass every constraint?
    pub fn matches(&self, payment: &Payment) -> bool {
        let day = payment.payment_at.date();
        if self.from_date.is_some_and(|from| day < from) {
            return false;
        }
        if self.to_date.is_some_and(|to| day > to) {
            return false;
        }
        if self.merchant().is_some_and(|m| payment.mcht_code != m) {
            return false;
        }
        if self.status().is_some_and(|s| payment.status != s) {
            return false;
        }
        if self.pay_type().is_some_and(|t| payment.pay_type != t) {
            return false;
        }
        true
    }

    /// Query parameters for `GET /payments/list`. Unset fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.from_date {
            pairs.push(("fromDate", from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = self.to_date {
            pairs.push(("toDate", to.format(DATE_FORMAT).to_string()));
        }
        if let Some(m) = self.merchant() {
            pairs.push(("mchtCode", m.to_string()));
        }
        if let Some(s) = self.status() {
            pairs.push(("status", s.to_string()));
        }
        if let Some(t) = self.pay_type() {
            pairs.push(("payType", t.to_string()));
        }
        pairs
    }
}

/// Payments passing `filter`, in input order.
pub fn apply_filter(payments: &[Payment], filter: &DashboardFilter) -> Vec<Payment> {
    payments
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

/// Parse a `YYYY-MM-DD` filter bound.
pub fn parse_date(raw: &str) -> DashResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| DashError::InvalidDate {
        raw: raw.to_string(),
    })
}

/// Date inputs send `""` when cleared; treat that like an absent bound.
fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_date(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}
