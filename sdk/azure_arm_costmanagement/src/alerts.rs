//! Cost alert management for Azure Resource Manager.
//!
//! Cost Management raises alerts when spending crosses budget or credit
//! thresholds. Alerts are read at a scope - any ARM ancestry path from
//! a billing account down to a resource group - and the collection can
//! span several pages, so [`list`] hands back a lazy
//! [`Pager`] rather than a buffered vector. Alerts on linked external
//! cloud accounts live under a provider scope instead and come back in
//! one response, via [`list_external`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use azure_arm_core::auth::ArmCredential;
//! use azure_arm_core::client::ArmClient;
//! use azure_arm_core::options::OperationOptions;
//! use azure_arm_costmanagement::alerts::{self, DismissAlertPayload};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArmClient::builder()
//!     .credential(ArmCredential::bearer_token("eyJ0eXAi..."))
//!     .build()?;
//!
//! let scope = "subscriptions/00000000-0000-0000-0000-000000000000";
//!
//! // Page through the open alerts
//! let mut pager = alerts::list(&client, scope, &OperationOptions::new())?;
//! while let Some(page) = pager.next_page().await {
//!     for alert in page?.value {
//!         println!("{}", alert.name);
//!     }
//! }
//!
//! // Dismiss one that has been handled
//! let dismissed = alerts::dismiss(
//!     &client,
//!     scope,
//!     "alert-1",
//!     &DismissAlertPayload::dismissed(),
//!     &OperationOptions::new(),
//! )
//! .await?;
//! println!("now {:?}", dismissed.properties.status);
//! # Ok(())
//! # }
//! ```

use azure_arm_core::client::ArmClient;
use azure_arm_core::error::ArmResult;
use azure_arm_core::options::OperationOptions;
use azure_arm_core::paging::{Page, Pager};
use azure_arm_core::request::{Request, RequestBuilder};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::models::API_VERSION;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Lifecycle status of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Status unset.
    None,
    /// The alert is open.
    Active,
    /// The alert was overridden by the service.
    Overridden,
    /// The underlying condition cleared.
    Resolved,
    /// A user dismissed the alert.
    Dismissed,
}

/// The patch body for moving an alert to a new status.
#[derive(Debug, Clone, Serialize)]
pub struct DismissAlertPayload {
    /// Properties to patch.
    pub properties: DismissAlertProperties,
}

/// Properties carried in a dismiss patch.
#[derive(Debug, Clone, Serialize)]
pub struct DismissAlertProperties {
    /// The status to move the alert to.
    pub status: AlertStatus,
}

impl DismissAlertPayload {
    /// A payload that moves the alert to [`AlertStatus::Dismissed`].
    pub fn dismissed() -> Self {
        Self {
            properties: DismissAlertProperties {
                status: AlertStatus::Dismissed,
            },
        }
    }
}

/// The kind of account an external cloud provider ID names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalCloudProviderType {
    /// A linked external subscription.
    ExternalSubscriptions,
    /// A consolidated external billing account.
    ExternalBillingAccounts,
}

impl ExternalCloudProviderType {
    /// The wire form, used as a path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExternalSubscriptions => "externalSubscriptions",
            Self::ExternalBillingAccounts => "externalBillingAccounts",
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A cost alert.
#[derive(Debug, Clone, Deserialize)]
pub struct Alert {
    /// Fully qualified resource ID of the alert.
    pub id: String,

    /// The alert name, unique within its scope.
    pub name: String,

    /// Resource type, always `Microsoft.CostManagement/alerts`.
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Properties of the alert.
    pub properties: AlertProperties,
}

/// Properties of a cost alert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    /// Human-readable description.
    pub description: Option<String>,

    /// Lifecycle status.
    pub status: Option<AlertStatus>,

    /// What raised the alert (for example `Preset`).
    pub source: Option<String>,

    /// ID of the entity the overrun was detected on.
    pub cost_entity_id: Option<String>,

    /// When the alert was raised.
    pub creation_time: Option<String>,
}

/// One page of alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsResult {
    /// The alerts on this page.
    #[serde(default)]
    pub value: Vec<Alert>,

    /// Continuation link to the next page, absent on the last page.
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

impl Page for AlertsResult {
    type Item = Alert;

    fn into_items(self) -> Vec<Alert> {
        self.value
    }

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// List the alerts at a scope, lazily.
///
/// Returns a [`Pager`]: no request is made until the first page is
/// asked for, and the service's `nextLink` URLs are followed verbatim,
/// one fetch per page. Argument validation still happens here, before
/// the pager exists.
///
/// # Arguments
///
/// * `client` - The ARM client.
/// * `scope` - The ARM scope to read alerts from, for example
///   `subscriptions/{id}` or
///   `subscriptions/{id}/resourceGroups/{name}`. Spliced into the path
///   verbatim.
/// * `options` - Per-call options.
///
/// # Example
///
/// ```rust,no_run
/// # use azure_arm_core::client::ArmClient;
/// # use azure_arm_core::options::OperationOptions;
/// # use azure_arm_costmanagement::alerts;
/// # async fn example(client: &ArmClient) -> azure_arm_core::ArmResult<()> {
/// let mut pager = alerts::list(client, "subscriptions/s1", &OperationOptions::new())?;
/// while let Some(page) = pager.next_page().await {
///     println!("{} alerts", page?.value.len());
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Tracing
///
/// Emits a span named `arm::alerts::list` with field `scope`.
#[tracing::instrument(name = "arm::alerts::list", skip(client, options), fields(scope = %scope))]
pub fn list(
    client: &ArmClient,
    scope: &str,
    options: &OperationOptions,
) -> ArmResult<Pager<AlertsResult>> {
    tracing::debug!("listing cost alerts");

    let initial = RequestBuilder::new(
        Method::GET,
        "{scope}/providers/Microsoft.CostManagement/alerts",
        API_VERSION,
    )
    .raw_path_param("scope", scope)
    .apply(options)
    .build()?;

    let client = client.clone();
    let hook = options.on_response.clone();

    Ok(Pager::new(move |cursor| {
        let request = match cursor {
            Some(link) => Request::get(link),
            None => initial.clone(),
        };
        let client = client.clone();
        let hook = hook.clone();

        Box::pin(async move {
            let response = client.send(&request).await?;
            if let Some(hook) = &hook {
                hook(&response);
            }
            response.expect_success(&[200])?.json::<AlertsResult>()
        })
    }))
}

/// Get a single alert by ID.
///
/// # Tracing
///
/// Emits a span named `arm::alerts::get` with fields `scope` and
/// `alert_id`.
#[tracing::instrument(
    name = "arm::alerts::get",
    skip(client, options),
    fields(scope = %scope, alert_id = %alert_id)
)]
pub async fn get(
    client: &ArmClient,
    scope: &str,
    alert_id: &str,
    options: &OperationOptions,
) -> ArmResult<Alert> {
    tracing::debug!("getting cost alert");

    let request = RequestBuilder::new(
        Method::GET,
        "{scope}/providers/Microsoft.CostManagement/alerts/{alertId}",
        API_VERSION,
    )
    .raw_path_param("scope", scope)
    .raw_path_param("alertId", alert_id)
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    let alert = response.expect_success(&[200])?.json::<Alert>()?;

    Ok(alert)
}

/// Change an alert's status, typically to dismiss it.
///
/// Returns the patched alert as the service sees it afterwards.
///
/// # Tracing
///
/// Emits a span named `arm::alerts::dismiss` with fields `scope` and
/// `alert_id`.
#[tracing::instrument(
    name = "arm::alerts::dismiss",
    skip(client, body, options),
    fields(scope = %scope, alert_id = %alert_id)
)]
pub async fn dismiss(
    client: &ArmClient,
    scope: &str,
    alert_id: &str,
    body: &DismissAlertPayload,
    options: &OperationOptions,
) -> ArmResult<Alert> {
    tracing::debug!("dismissing cost alert");

    let request = RequestBuilder::new(
        Method::PATCH,
        "{scope}/providers/Microsoft.CostManagement/alerts/{alertId}",
        API_VERSION,
    )
    .raw_path_param("scope", scope)
    .raw_path_param("alertId", alert_id)
    .json(body)
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    let alert = response.expect_success(&[200])?.json::<Alert>()?;

    tracing::debug!(status = ?alert.properties.status, "alert status patched");
    Ok(alert)
}

/// List the alerts on an external cloud provider account.
///
/// Unlike [`list`] there is no pager here: the service returns the
/// whole collection in one response. The provider scope is a single
/// path segment rather than an ARM ancestry path, so both segments are
/// percent-encoded.
///
/// # Arguments
///
/// * `client` - The ARM client.
/// * `provider_type` - Which kind of account `provider_id` names.
/// * `provider_id` - The external subscription or billing account ID.
/// * `options` - Per-call options.
///
/// # Tracing
///
/// Emits a span named `arm::alerts::list_external` with fields
/// `provider_type` and `provider_id`.
#[tracing::instrument(
    name = "arm::alerts::list_external",
    skip(client, options),
    fields(provider_type = provider_type.as_str(), provider_id = %provider_id)
)]
pub async fn list_external(
    client: &ArmClient,
    provider_type: ExternalCloudProviderType,
    provider_id: &str,
    options: &OperationOptions,
) -> ArmResult<AlertsResult> {
    tracing::debug!("listing external cloud provider alerts");

    let request = RequestBuilder::new(
        Method::GET,
        "/providers/Microsoft.CostManagement/{externalCloudProviderType}/{externalCloudProviderId}/alerts",
        API_VERSION,
    )
    .path_param("externalCloudProviderType", provider_type.as_str())
    .path_param("externalCloudProviderId", provider_id)
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    let alerts = response.expect_success(&[200])?.json::<AlertsResult>()?;

    tracing::debug!(count = alerts.value.len(), "external alerts listed");
    Ok(alerts)
}
