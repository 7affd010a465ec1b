//! Normalization: raw payment DTOs to numeric/temporal `Payment`s.
//!
//! RULE: this is the only place amounts and timestamps are parsed.
//! A value that does not parse is never coerced to zero or to the epoch;
//! the policy decides whether it fails the batch or is dropped and reported.

use crate::{
    error::{DashError, DashResult},
    payment::{Payment, PaymentDto},
    types::PaymentCode,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizePolicy {
    /// Any invalid record fails the whole batch.
    #[default]
    Strict,
    /// Invalid records are dropped and listed in `Normalized::rejected`.
    SkipInvalid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectedField {
    Amount,
    PaymentAt,
}

/// A record dropped under `NormalizePolicy::SkipInvalid`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the raw input.
    pub index:        usize,
    pub payment_code: PaymentCode,
    pub field:        RejectedField,
    pub raw:          String,
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub payments: Vec<Payment>,
    pub rejected: Vec<Rejection>,
}

pub struct Normalizer {
    offset: FixedOffset,
    policy: NormalizePolicy,
}

impl Normalizer {
    pub fn new(offset: FixedOffset, policy: NormalizePolicy) -> Self {
        Self { offset, policy }
    }

    /// Strict normalizer reporting in UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix(), NormalizePolicy::Strict)
    }

    pub fn policy(&self) -> NormalizePolicy {
        self.policy
    }

    /// Normalize a batch, preserving input order.
    pub fn normalize(&self, raw: &[PaymentDto]) -> DashResult<Normalized> {
        let mut out = Normalized {
            payments: Vec::with_capacity(raw.len()),
            rejected: Vec::new(),
        };

        for (index, dto) in raw.iter().enumerate() {
            match self.normalize_one(dto) {
                Ok(payment) => out.payments.push(payment),
                Err(err) if self.policy == NormalizePolicy::SkipInvalid => {
                    let rejection = match err {
                        DashError::InvalidAmount { raw, .. } => Rejection {
                            index,
                            payment_code: dto.payment_code.clone(),
                            field: RejectedField::Amount,
                            raw,
                        },
                        DashError::InvalidTimestamp { raw, .. } => Rejection {
                            index,
                            payment_code: dto.payment_code.clone(),
                            field: RejectedField::PaymentAt,
                            raw,
                        },
                        other => return Err(other),
                    };
                    log::warn!(
                        "normalize: dropping payment {} (index {index}): invalid {:?} {:?}",
                        rejection.payment_code,
                        rejection.field,
                        rejection.raw
                    );
                    out.rejected.push(rejection);
                }
                Err(err) => return Err(err),
            }
        }

        log::debug!(
            "normalize: {} in, {} kept, {} rejected",
            raw.len(),
            out.payments.len(),
            out.rejected.len()
        );
        Ok(out)
    }

    pub fn normalize_one(&self, dto: &PaymentDto) -> DashResult<Payment> {
        let amount = parse_amount(&dto.amount).ok_or_else(|| DashError::InvalidAmount {
            payment_code: dto.payment_code.clone(),
            raw: dto.amount.clone(),
        })?;
        let payment_at =
            parse_timestamp(&dto.payment_at, self.offset).ok_or_else(|| {
                DashError::InvalidTimestamp {
                    payment_code: dto.payment_code.clone(),
                    raw: dto.payment_at.clone(),
                }
            })?;

        Ok(Payment {
            payment_code: dto.payment_code.clone(),
            mcht_code: dto.mcht_code.clone(),
            amount,
            currency: dto.currency.clone(),
            pay_type: dto.pay_type.clone(),
            status: dto.status.clone(),
            payment_at,
        })
    }
}

/// Strict normalization in UTC.
pub fn normalize_payments(raw: &[PaymentDto]) -> DashResult<Vec<Payment>> {
    Ok(Normalizer::utc().normalize(raw)?.payments)
}

/// Parse a decimal string. Only finite values are accepted.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an ISO-8601 timestamp into wall-clock time at `offset`.
///
/// Timestamps carrying their own offset are converted; naive ones are
/// taken to already be in the reporting offset; a bare date means midnight.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&offset).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&offset).naive_local());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(s, crate::types::DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
