//! Shared types for the `Microsoft.Subscription` resource provider.

/// API version all alias requests are pinned to.
pub(crate) const API_VERSION: &str = "2021-10-01";
