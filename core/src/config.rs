use crate::{
    display::{StatusCategory, StatusCategoryMap},
    normalize::NormalizePolicy,
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dashboard settings. Every field has a default, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub api_base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Offset of the reporting timezone, east of UTC.
    pub utc_offset_minutes: i32,
    pub normalize_policy: NormalizePolicy,
    /// Width of the default filter window ending today.
    pub default_lookback_days: u32,
    pub page_initial_rows: usize,
    pub page_step_rows: usize,
    /// Rows shown in the "recent payments" table on the dashboard page.
    pub recent_rows: usize,
    pub top_merchants: usize,
    pub status_categories: HashMap<String, StatusCategory>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1".into(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            utc_offset_minutes: 0,
            normalize_policy: NormalizePolicy::Strict,
            default_lookback_days: 30,
            page_initial_rows: 30,
            page_step_rows: 30,
            recent_rows: 10,
            top_merchants: 10,
            status_categories: StatusCategoryMap::default().into_inner(),
        }
    }
}

impl DashConfig {
    /// Load from a JSON file.
    /// In tests, use DashConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Config with fixed values for use in tests: UTC reporting, strict
    /// normalization, small pages so pagination is easy to exercise.
    pub fn default_test() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9".into(),
            connect_timeout_ms: 200,
            request_timeout_ms: 500,
            page_initial_rows: 3,
            page_step_rows: 2,
            recent_rows: 5,
            top_merchants: 3,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_initial_rows == 0 || self.page_step_rows == 0 {
            anyhow::bail!("page_initial_rows and page_step_rows must be > 0");
        }
        if self.utc_offset().is_none() {
            anyhow::bail!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            );
        }
        Ok(())
    }

    /// The reporting offset. `None` only when the configured minutes are
    /// outside ±24h, which `validate` rejects.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }

    pub fn status_category_map(&self) -> StatusCategoryMap {
        StatusCategoryMap::from(self.status_categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: DashConfig =
            serde_json::from_str(r#"{ "top_merchants": 5, "utc_offset_minutes": 540 }"#).unwrap();
        assert_eq!(cfg.top_merchants, 5);
        assert_eq!(cfg.page_initial_rows, 30);
        assert_eq!(cfg.utc_offset().unwrap().local_minus_utc(), 540 * 60);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_page_step_is_rejected() {
        let cfg = DashConfig {
            page_step_rows: 0,
            ..DashConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let cfg = DashConfig {
            utc_offset_minutes: 24 * 60,
            ..DashConfig::default()
        };
        assert!(cfg.utc_offset().is_none());
        assert!(cfg.validate().is_err());
    }
}
