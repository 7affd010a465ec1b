//! paydash-core: aggregation engine behind the payments & merchants dashboard.
//!
//! Data flow: raw DTOs → normalize → filter → summary / group-bys /
//! merchant ranking → display view-models.

pub mod aggregation;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pagination;
pub mod payment;
pub mod types;
