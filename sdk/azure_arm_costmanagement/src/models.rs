//! Shared types for the `Microsoft.CostManagement` resource provider.

/// API version all alert requests are pinned to.
pub(crate) const API_VERSION: &str = "2019-11-01";
