//! Data source seam: one async method per REST endpoint.
//!
//! RULE: aggregation code never fetches. Callers fetch through a
//! `DashboardSource` and hand the results to the pure functions.
//!
//! Implementations:
//!   - `HttpDashboardSource`: the real API over reqwest
//!   - `StaticSource`: an in-memory `Fixture` (tests, offline runner)

use crate::{
    config::DashConfig,
    error::{DashError, DashResult},
    filter::DashboardFilter,
    normalize::parse_timestamp,
    payment::{CodeItem, Merchant, MerchantDetail, PaymentDto, PaymentTypeItem},
};
use chrono::{FixedOffset, Offset, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{collections::HashSet, time::Duration};

/// Uniform response wrapper of every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status:  i64,
    #[serde(default)]
    pub message: String,
    pub data:    T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Payments,
    Merchants,
    MerchantDetail,
    PaymentStatusCodes,
    PaymentTypeCodes,
    MerchantStatusCodes,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Payments            => "/payments/list",
            Endpoint::Merchants           => "/merchants/list",
            Endpoint::MerchantDetail      => "/merchants/details",
            Endpoint::PaymentStatusCodes  => "/common/payment-status/all",
            Endpoint::PaymentTypeCodes    => "/common/payment-type/all",
            Endpoint::MerchantStatusCodes => "/common/mcht-status/all",
        }
    }
}

#[async_trait::async_trait]
pub trait DashboardSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_payments(&self, filter: &DashboardFilter) -> DashResult<Vec<PaymentDto>>;

    async fn fetch_merchants(&self) -> DashResult<Vec<Merchant>>;

    async fn fetch_merchant_detail(&self, mcht_code: &str) -> DashResult<MerchantDetail>;

    async fn fetch_payment_status_codes(&self) -> DashResult<Vec<CodeItem>>;

    async fn fetch_payment_type_codes(&self) -> DashResult<Vec<PaymentTypeItem>>;

    async fn fetch_merchant_status_codes(&self) -> DashResult<Vec<CodeItem>>;
}

// ── HTTP ─────────────────────────────────────────────────────────────────────

pub struct HttpDashboardSource {
    pub base_url: String,
    pub client:   reqwest::Client,
}

impl HttpDashboardSource {
    pub fn from_config(config: &DashConfig) -> DashResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> DashResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        // Error envelopes may carry `data: null`; check status before typing `data`.
        let envelope: ApiEnvelope<serde_json::Value> = resp.json().await?;
        let data = unwrap_envelope(path, envelope)?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Envelope `status` is the HTTP-like code the API reports; anything
/// outside 2xx is an application error even on an HTTP 200.
pub fn unwrap_envelope<T>(endpoint: &str, envelope: ApiEnvelope<T>) -> DashResult<T> {
    if (200..300).contains(&envelope.status) {
        Ok(envelope.data)
    } else {
        Err(DashError::Api {
            endpoint: endpoint.to_string(),
            status: envelope.status,
            message: envelope.message,
        })
    }
}

#[async_trait::async_trait]
impl DashboardSource for HttpDashboardSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_payments(&self, filter: &DashboardFilter) -> DashResult<Vec<PaymentDto>> {
        self.get(Endpoint::Payments.path(), &filter.query_pairs()).await
    }

    async fn fetch_merchants(&self) -> DashResult<Vec<Merchant>> {
        self.get(Endpoint::Merchants.path(), &[]).await
    }

    async fn fetch_merchant_detail(&self, mcht_code: &str) -> DashResult<MerchantDetail> {
        let path = format!(
            "{}/{}",
            Endpoint::MerchantDetail.path(),
            urlencoding::encode(mcht_code)
        );
        self.get(&path, &[]).await
    }

    async fn fetch_payment_status_codes(&self) -> DashResult<Vec<CodeItem>> {
        self.get(Endpoint::PaymentStatusCodes.path(), &[]).await
    }

    async fn fetch_payment_type_codes(&self) -> DashResult<Vec<PaymentTypeItem>> {
        self.get(Endpoint::PaymentTypeCodes.path(), &[]).await
    }

    async fn fetch_merchant_status_codes(&self) -> DashResult<Vec<CodeItem>> {
        self.get(Endpoint::MerchantStatusCodes.path(), &[]).await
    }
}

// ── Static fixture ───────────────────────────────────────────────────────────

/// Everything the API would serve, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fixture {
    pub payments:              Vec<PaymentDto>,
    pub merchants:             Vec<Merchant>,
    pub merchant_details:      Vec<MerchantDetail>,
    pub payment_status_codes:  Vec<CodeItem>,
    pub payment_type_codes:    Vec<PaymentTypeItem>,
    pub merchant_status_codes: Vec<CodeItem>,
}

impl Fixture {
    pub fn load(path: &str) -> DashResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct StaticSource {
    fixture: Fixture,
    offset:  FixedOffset,
    failing: HashSet<Endpoint>,
}

impl StaticSource {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            offset: Utc.fix(),
            failing: HashSet::new(),
        }
    }

    /// Calendar day used for server-side date filtering. Defaults to UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Make one endpoint answer with an API error.
    pub fn failing(mut self, endpoint: Endpoint) -> Self {
        self.failing.insert(endpoint);
        self
    }

    fn check(&self, endpoint: Endpoint) -> DashResult<()> {
        if self.failing.contains(&endpoint) {
            return Err(DashError::Api {
                endpoint: endpoint.path().to_string(),
                status: 500,
                message: "fixture failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DashboardSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    /// Server-side filtering as the API does it, on raw DTOs.
    /// Records whose timestamp does not parse are passed through so the
    /// normalization policy decides their fate.
    async fn fetch_payments(&self, filter: &DashboardFilter) -> DashResult<Vec<PaymentDto>> {
        self.check(Endpoint::Payments)?;
        Ok(self
            .fixture
            .payments
            .iter()
            .filter(|dto| {
                if filter.merchant().is_some_and(|m| dto.mcht_code != m)
                    || filter.status().is_some_and(|s| dto.status != s)
                    || filter.pay_type().is_some_and(|t| dto.pay_type != t)
                {
                    return false;
                }
                match parse_timestamp(&dto.payment_at, self.offset) {
                    Some(at) => {
                        let day = at.date();
                        !(filter.from_date.is_some_and(|from| day < from)
                            || filter.to_date.is_some_and(|to| day > to))
                    }
                    None => true,
                }
            })
            .cloned()
            .collect())
    }

    async fn fetch_merchants(&self) -> DashResult<Vec<Merchant>> {
        self.check(Endpoint::Merchants)?;
        Ok(self.fixture.merchants.clone())
    }

    async fn fetch_merchant_detail(&self, mcht_code: &str) -> DashResult<MerchantDetail> {
        self.check(Endpoint::MerchantDetail)?;
        self.fixture
            .merchant_details
            .iter()
            .find(|d| d.merchant.mcht_code == mcht_code)
            .cloned()
            .ok_or_else(|| DashError::Api {
                endpoint: format!("{}/{mcht_code}", Endpoint::MerchantDetail.path()),
                status: 404,
                message: format!("merchant {mcht_code} not found"),
            })
    }

    async fn fetch_payment_status_codes(&self) -> DashResult<Vec<CodeItem>> {
        self.check(Endpoint::PaymentStatusCodes)?;
        Ok(self.fixture.payment_status_codes.clone())
    }

    async fn fetch_payment_type_codes(&self) -> DashResult<Vec<PaymentTypeItem>> {
        self.check(Endpoint::PaymentTypeCodes)?;
        Ok(self.fixture.payment_type_codes.clone())
    }

    async fn fetch_merchant_status_codes(&self) -> DashResult<Vec<CodeItem>> {
        self.check(Endpoint::MerchantStatusCodes)?;
        Ok(self.fixture.merchant_status_codes.clone())
    }
}
