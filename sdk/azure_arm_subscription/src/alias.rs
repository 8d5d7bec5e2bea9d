//! Subscription alias management for Azure Resource Manager.
//!
//! An alias names a subscription creation request. Putting an alias
//! provisions a new subscription (or adopts an existing one) under that
//! name; the same alias can later be read, listed, and deleted. Because
//! provisioning takes time, creation is a long-running operation: the
//! service acknowledges the request and reports progress through a
//! status monitor until the subscription reaches `Succeeded` or
//! `Failed`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use azure_arm_core::auth::ArmCredential;
//! use azure_arm_core::client::ArmClient;
//! use azure_arm_core::options::OperationOptions;
//! use azure_arm_subscription::alias::{self, PutAliasRequest, Workload};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArmClient::builder()
//!     .credential(ArmCredential::bearer_token("eyJ0eXAi..."))
//!     .build()?;
//!
//! let request = PutAliasRequest::builder()
//!     .display_name("team-sandbox")
//!     .workload(Workload::DevTest)
//!     .billing_scope("/billingAccounts/1234/billingProfiles/5678/invoiceSections/9abc")
//!     .build()?;
//!
//! // Kick off creation and wait for the terminal state
//! let poller = alias::begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
//!     .await?;
//! let outcome = poller.wait().await?;
//! println!("creation finished: {}", outcome.status);
//!
//! // Look the alias up later
//! let alias = alias::get(&client, "team-sandbox", &OperationOptions::new()).await?;
//! println!("subscription: {:?}", alias.properties.subscription_id);
//! # Ok(())
//! # }
//! ```

use azure_arm_core::client::ArmClient;
use azure_arm_core::error::{ArmError, ArmResult};
use azure_arm_core::lro::Poller;
use azure_arm_core::options::OperationOptions;
use azure_arm_core::request::RequestBuilder;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::models::API_VERSION;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// The kind of workload a subscription will host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Workload {
    /// Production workloads.
    Production,
    /// Development and testing workloads, billed at dev/test rates.
    DevTest,
}

/// The body of a subscription alias create request.
#[derive(Debug, Clone, Serialize)]
pub struct PutAliasRequest {
    /// Properties of the alias.
    pub properties: PutAliasRequestProperties,
}

/// Properties describing the subscription to create or adopt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutAliasRequestProperties {
    /// Friendly name of the subscription.
    pub display_name: String,

    /// The kind of workload the subscription will host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<Workload>,

    /// Billing scope the subscription is created under. Required when
    /// creating a new subscription, ignored when adopting an existing
    /// one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_scope: Option<String>,

    /// Adopt this existing subscription instead of creating a new one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl PutAliasRequest {
    /// Create a builder for a [`PutAliasRequest`].
    pub fn builder() -> PutAliasRequestBuilder {
        PutAliasRequestBuilder::default()
    }
}

/// Builder for [`PutAliasRequest`].
#[derive(Debug, Default)]
pub struct PutAliasRequestBuilder {
    display_name: Option<String>,
    workload: Option<Workload>,
    billing_scope: Option<String>,
    subscription_id: Option<String>,
}

impl PutAliasRequestBuilder {
    /// Set the friendly name of the subscription (required).
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the workload kind.
    pub fn workload(mut self, workload: Workload) -> Self {
        self.workload = Some(workload);
        self
    }

    /// Set the billing scope the subscription is created under.
    pub fn billing_scope(mut self, scope: impl Into<String>) -> Self {
        self.billing_scope = Some(scope.into());
        self
    }

    /// Adopt an existing subscription instead of creating a new one.
    pub fn subscription_id(mut self, id: impl Into<String>) -> Self {
        self.subscription_id = Some(id.into());
        self
    }

    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if `display_name` is
    /// missing or empty.
    pub fn build(self) -> ArmResult<PutAliasRequest> {
        let display_name = self
            .display_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ArmError::InvalidArgument("display_name is required".into()))?;

        Ok(PutAliasRequest {
            properties: PutAliasRequestProperties {
                display_name,
                workload: self.workload,
                billing_scope: self.billing_scope,
                subscription_id: self.subscription_id,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Provisioning lifecycle of an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProvisioningState {
    /// The request was accepted and provisioning is under way.
    Accepted,
    /// The subscription exists and the alias points at it.
    Succeeded,
    /// Provisioning failed.
    Failed,
}

/// A subscription alias.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionAlias {
    /// Fully qualified resource ID of the alias.
    pub id: String,

    /// The alias name.
    pub name: String,

    /// Resource type, always `Microsoft.Subscription/aliases`.
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Properties of the alias.
    pub properties: SubscriptionAliasProperties,
}

/// Properties of a subscription alias.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAliasProperties {
    /// ID of the subscription the alias points at, once provisioned.
    pub subscription_id: Option<String>,

    /// Where provisioning stands.
    pub provisioning_state: Option<ProvisioningState>,
}

/// The collection of aliases visible to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionAliasList {
    /// The aliases.
    #[serde(default)]
    pub value: Vec<SubscriptionAlias>,
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// Create a subscription under an alias, or adopt an existing one.
///
/// Putting the same alias again with the same body is idempotent.
/// Returns a [`Poller`] tracking the provisioning; the acknowledgement
/// may already be terminal when the service completes synchronously.
///
/// # Arguments
///
/// * `client` - The ARM client.
/// * `alias_name` - Name for the alias. Letters, digits, `-`, `_`, and
///   `.` only; validated before anything is sent.
/// * `body` - The creation request.
/// * `options` - Per-call options.
///
/// # Example
///
/// ```rust,no_run
/// # use azure_arm_core::client::ArmClient;
/// # use azure_arm_core::options::OperationOptions;
/// # use azure_arm_subscription::alias::{self, PutAliasRequest};
/// # async fn example(client: &ArmClient, request: &PutAliasRequest) -> azure_arm_core::ArmResult<()> {
/// let poller = alias::begin_create(client, "team-sandbox", request, &OperationOptions::new())
///     .await?;
///
/// // Detach and resume later if the process cannot wait
/// let token = poller.continuation_token()?;
/// # Ok(())
/// # }
/// ```
///
/// # Tracing
///
/// Emits a span named `arm::aliases::begin_create` with field `alias_name`.
#[tracing::instrument(
    name = "arm::aliases::begin_create",
    skip(client, body, options),
    fields(alias_name = %alias_name)
)]
pub async fn begin_create(
    client: &ArmClient,
    alias_name: &str,
    body: &PutAliasRequest,
    options: &OperationOptions,
) -> ArmResult<Poller<SubscriptionAlias>> {
    tracing::debug!("creating subscription alias");

    let request = RequestBuilder::new(
        Method::PUT,
        "/providers/Microsoft.Subscription/aliases/{aliasName}",
        API_VERSION,
    )
    .validated_path_param("aliasName", alias_name)
    .json(body)
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    let response = response.expect_success(&[200, 201, 202])?;

    tracing::debug!(status = response.status(), "alias create acknowledged");
    Ok(Poller::from_response(client, request.target(), &response, options))
}

/// Get an alias by name.
///
/// # Example
///
/// ```rust,no_run
/// # use azure_arm_core::client::ArmClient;
/// # use azure_arm_core::options::OperationOptions;
/// # use azure_arm_subscription::alias;
/// # async fn example(client: &ArmClient) -> azure_arm_core::ArmResult<()> {
/// let alias = alias::get(client, "team-sandbox", &OperationOptions::new()).await?;
/// println!("points at: {:?}", alias.properties.subscription_id);
/// # Ok(())
/// # }
/// ```
///
/// # Tracing
///
/// Emits a span named `arm::aliases::get` with field `alias_name`.
#[tracing::instrument(
    name = "arm::aliases::get",
    skip(client, options),
    fields(alias_name = %alias_name)
)]
pub async fn get(
    client: &ArmClient,
    alias_name: &str,
    options: &OperationOptions,
) -> ArmResult<SubscriptionAlias> {
    tracing::debug!("getting subscription alias");

    let request = RequestBuilder::new(
        Method::GET,
        "/providers/Microsoft.Subscription/aliases/{aliasName}",
        API_VERSION,
    )
    .validated_path_param("aliasName", alias_name)
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    let alias = response.expect_success(&[200])?.json::<SubscriptionAlias>()?;

    Ok(alias)
}

/// Delete an alias.
///
/// Deleting the alias does not delete the subscription it points at.
///
/// # Tracing
///
/// Emits a span named `arm::aliases::delete` with field `alias_name`.
#[tracing::instrument(
    name = "arm::aliases::delete",
    skip(client, options),
    fields(alias_name = %alias_name)
)]
pub async fn delete(
    client: &ArmClient,
    alias_name: &str,
    options: &OperationOptions,
) -> ArmResult<()> {
    tracing::debug!("deleting subscription alias");

    let request = RequestBuilder::new(
        Method::DELETE,
        "/providers/Microsoft.Subscription/aliases/{aliasName}",
        API_VERSION,
    )
    .validated_path_param("aliasName", alias_name)
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    response.expect_success(&[200, 204])?;

    tracing::debug!("alias deleted");
    Ok(())
}

/// List all aliases visible to the caller.
///
/// The alias collection is small and returned in one response; there is
/// no pagination here.
///
/// # Tracing
///
/// Emits a span named `arm::aliases::list`.
#[tracing::instrument(name = "arm::aliases::list", skip(client, options))]
pub async fn list(
    client: &ArmClient,
    options: &OperationOptions,
) -> ArmResult<SubscriptionAliasList> {
    tracing::debug!("listing subscription aliases");

    let request = RequestBuilder::new(
        Method::GET,
        "/providers/Microsoft.Subscription/aliases",
        API_VERSION,
    )
    .apply(options)
    .build()?;

    let response = client.send(&request).await?;
    if let Some(hook) = &options.on_response {
        hook(&response);
    }
    let list = response
        .expect_success(&[200])?
        .json::<SubscriptionAliasList>()?;

    tracing::debug!(count = list.value.len(), "aliases listed");
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_mock_client;
    use azure_arm_core::lro::OperationStatus;
    use azure_arm_core::options::PollingMode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALIAS_PATH: &str = "/providers/Microsoft.Subscription/aliases/team-sandbox";
    const MONITOR_PATH: &str = "/providers/Microsoft.Subscription/subscriptionOperations/op-1";

    fn alias_body(provisioning_state: &str) -> serde_json::Value {
        serde_json::json!({
            "id": ALIAS_PATH,
            "name": "team-sandbox",
            "type": "Microsoft.Subscription/aliases",
            "properties": {
                "subscriptionId": "291bba3f-e0a5-47bc-a099-3bdcb2a50a05",
                "provisioningState": provisioning_state
            }
        })
    }

    // --- Cycle 1: Request model tests ---

    #[test]
    fn test_put_alias_request_serialization() {
        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .workload(Workload::Production)
            .billing_scope("/billingAccounts/1234/billingProfiles/5678/invoiceSections/9abc")
            .build()
            .expect("should build");

        let json = serde_json::to_value(&request).expect("should serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "properties": {
                    "displayName": "team-sandbox",
                    "workload": "Production",
                    "billingScope": "/billingAccounts/1234/billingProfiles/5678/invoiceSections/9abc"
                }
            })
        );
    }

    #[test]
    fn test_put_alias_request_requires_display_name() {
        let missing = PutAliasRequest::builder().build();
        assert!(matches!(missing, Err(ArmError::InvalidArgument(_))));

        let empty = PutAliasRequest::builder().display_name("").build();
        assert!(matches!(empty, Err(ArmError::InvalidArgument(_))));
    }

    #[test]
    fn test_alias_response_deserialization() {
        let alias: SubscriptionAlias =
            serde_json::from_value(alias_body("Succeeded")).expect("should parse");

        assert_eq!(alias.name, "team-sandbox");
        assert_eq!(alias.resource_type, "Microsoft.Subscription/aliases");
        assert_eq!(
            alias.properties.subscription_id.as_deref(),
            Some("291bba3f-e0a5-47bc-a099-3bdcb2a50a05")
        );
        assert_eq!(
            alias.properties.provisioning_state,
            Some(ProvisioningState::Succeeded)
        );
    }

    // --- Cycle 2: Alias creation tests ---

    #[tokio::test]
    async fn test_begin_create_polls_until_succeeded() {
        let server = MockServer::start().await;
        let monitor_url = format!("{}{MONITOR_PATH}", server.uri());
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .and(header("Authorization", "Bearer test-access-token"))
            .and(query_param("api-version", "2021-10-01"))
            .and(body_json(serde_json::json!({
                "properties": {
                    "displayName": "team-sandbox",
                    "workload": "Production",
                    "billingScope": "/billingAccounts/1234/billingProfiles/5678/invoiceSections/9abc"
                }
            })))
            .respond_with(
                ResponseTemplate::new(202)
                    .append_header("Azure-AsyncOperation", monitor_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(MONITOR_PATH))
            .respond_with(move |_req: &wiremock::Request| {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count == 0 {
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"status": "InProgress"}))
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"status": "Succeeded"}))
                }
            })
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .workload(Workload::Production)
            .billing_scope("/billingAccounts/1234/billingProfiles/5678/invoiceSections/9abc")
            .build()
            .expect("should build");

        let poller = begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
            .await
            .expect("should be accepted");
        let outcome = poller.wait().await.expect("should reach a terminal state");

        assert_eq!(outcome.status, OperationStatus::Succeeded);
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_begin_create_result_arrives_with_the_final_poll() {
        let server = MockServer::start().await;
        let monitor_url = format!("{}{MONITOR_PATH}", server.uri());
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .respond_with(
                ResponseTemplate::new(202)
                    .append_header("Azure-AsyncOperation", monitor_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(MONITOR_PATH))
            .respond_with(move |_req: &wiremock::Request| {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count == 0 {
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"status": "InProgress"}))
                } else {
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({
                        "status": "Succeeded",
                        "result": alias_body("Succeeded")
                    }))
                }
            })
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        let poller = begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
            .await
            .expect("should be accepted");
        let outcome = poller.wait().await.expect("should reach a terminal state");

        assert_eq!(outcome.status, OperationStatus::Succeeded);
        assert_eq!(polls.load(Ordering::SeqCst), 2);
        let alias = outcome.result.expect("the monitor reported the alias");
        assert_eq!(alias.name, "team-sandbox");
        assert_eq!(
            alias.properties.subscription_id.as_deref(),
            Some("291bba3f-e0a5-47bc-a099-3bdcb2a50a05")
        );
    }

    #[tokio::test]
    async fn test_begin_create_synchronous_completion() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(alias_body("Succeeded")))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        let poller = begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
            .await
            .expect("should be accepted");
        let outcome = poller.wait().await.expect("should succeed");

        assert_eq!(outcome.status, OperationStatus::Succeeded);
        let alias = outcome.result.expect("the body is the resource");
        assert_eq!(alias.name, "team-sandbox");

        // Only the PUT itself hit the wire.
        assert_eq!(
            server.received_requests().await.expect("recording enabled").len(),
            1
        );
    }

    #[tokio::test]
    async fn test_begin_create_validates_the_alias_name() {
        let server = MockServer::start().await;
        let client = setup_mock_client(&server).await;

        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        let result = begin_create(&client, "bad/name", &request, &OperationOptions::new()).await;

        assert!(matches!(result, Err(ArmError::InvalidArgument(_))));
        assert!(
            server.received_requests().await.expect("recording enabled").is_empty(),
            "validation failures must not reach the wire"
        );
    }

    #[tokio::test]
    async fn test_begin_create_failure_is_reported_in_the_state() {
        let server = MockServer::start().await;
        let monitor_url = format!("{}{MONITOR_PATH}", server.uri());

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .respond_with(
                ResponseTemplate::new(202)
                    .append_header("Azure-AsyncOperation", monitor_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(MONITOR_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "Failed",
                "error": {"code": "BillingNotFound", "message": "unknown billing scope"}
            })))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        let poller = begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
            .await
            .expect("should be accepted");
        let outcome = poller.wait().await.expect("polling itself should succeed");

        assert_eq!(outcome.status, OperationStatus::Failed);
        let error = outcome.error.expect("failure carries the service error");
        assert_eq!(error.code.as_deref(), Some("BillingNotFound"));
    }

    // --- Cycle 3: Read and delete tests ---

    #[tokio::test]
    async fn test_get_alias_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ALIAS_PATH))
            .and(header("Authorization", "Bearer test-access-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(alias_body("Succeeded")))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;

        let alias = get(&client, "team-sandbox", &OperationOptions::new())
            .await
            .expect("should succeed");

        assert_eq!(alias.name, "team-sandbox");
        assert_eq!(
            alias.properties.provisioning_state,
            Some(ProvisioningState::Succeeded)
        );
    }

    #[tokio::test]
    async fn test_get_alias_not_found_with_unparseable_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ALIAS_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;

        let error = get(&client, "team-sandbox", &OperationOptions::new())
            .await
            .expect_err("should classify");

        match error {
            ArmError::NotFound { envelope } => assert!(envelope.is_empty()),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_alias_success() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(ALIAS_PATH))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;

        delete(&client, "team-sandbox", &OperationOptions::new())
            .await
            .expect("should succeed");
    }

    #[tokio::test]
    async fn test_delete_alias_conflict() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(ALIAS_PATH))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "error": {"code": "AliasInUse", "message": "provisioning in progress"}
            })))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;

        let error = delete(&client, "team-sandbox", &OperationOptions::new())
            .await
            .expect_err("should classify");

        match error {
            ArmError::Conflict { envelope } => {
                assert_eq!(envelope.code.as_deref(), Some("AliasInUse"));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_aliases() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/providers/Microsoft.Subscription/aliases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [alias_body("Succeeded"), alias_body("Accepted")]
            })))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;

        let list = list(&client, &OperationOptions::new())
            .await
            .expect("should succeed");

        assert_eq!(list.value.len(), 2);
        assert_eq!(list.value[0].name, "team-sandbox");
    }

    // --- Cycle 4: Per-call options tests ---

    #[tokio::test]
    async fn test_api_version_override_is_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ALIAS_PATH))
            .and(query_param("api-version", "2020-09-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(alias_body("Succeeded")))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let options = OperationOptions::new().api_version("2020-09-01");

        let alias = get(&client, "team-sandbox", &options).await.expect("should succeed");

        assert_eq!(alias.name, "team-sandbox");
    }

    #[tokio::test]
    async fn test_client_request_id_is_attached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ALIAS_PATH))
            .and(header(
                "x-ms-client-request-id",
                "0f47b203-d336-4fa6-9f4c-9e4a34a0a1f4",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(alias_body("Succeeded")))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let options =
            OperationOptions::new().client_request_id("0f47b203-d336-4fa6-9f4c-9e4a34a0a1f4");

        get(&client, "team-sandbox", &options).await.expect("should succeed");
    }

    #[tokio::test]
    async fn test_on_response_sees_the_raw_acknowledgement() {
        let server = MockServer::start().await;
        let monitor_url = format!("{}{MONITOR_PATH}", server.uri());

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .respond_with(
                ResponseTemplate::new(202)
                    .append_header("Azure-AsyncOperation", monitor_url.as_str()),
            )
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let seen = Arc::new(AtomicU32::new(0));
        let sink = seen.clone();

        let options = OperationOptions::new().on_response(move |response| {
            sink.store(u32::from(response.status()), Ordering::SeqCst);
        });

        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        begin_create(&client, "team-sandbox", &request, &options)
            .await
            .expect("should be accepted");

        assert_eq!(seen.load(Ordering::SeqCst), 202);
    }

    #[tokio::test]
    async fn test_no_polling_returns_the_acknowledgement() {
        let server = MockServer::start().await;
        let monitor_url = format!("{}{MONITOR_PATH}", server.uri());

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .respond_with(
                ResponseTemplate::new(202)
                    .append_header("Azure-AsyncOperation", monitor_url.as_str()),
            )
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let options = OperationOptions::new().polling(PollingMode::NoPolling);

        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        let poller = begin_create(&client, "team-sandbox", &request, &options)
            .await
            .expect("should be accepted");
        let outcome = poller.wait().await.expect("should succeed");

        assert_eq!(outcome.status, OperationStatus::Running);
        // Only the PUT itself hit the wire.
        assert_eq!(
            server.received_requests().await.expect("recording enabled").len(),
            1
        );
    }

    // --- Cycle 5: Continuation token tests ---

    #[tokio::test]
    async fn test_create_detaches_and_resumes() {
        let server = MockServer::start().await;
        let monitor_url = format!("{}{MONITOR_PATH}", server.uri());
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        Mock::given(method("PUT"))
            .and(path(ALIAS_PATH))
            .respond_with(
                ResponseTemplate::new(202)
                    .append_header("Azure-AsyncOperation", monitor_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(MONITOR_PATH))
            .respond_with(move |_req: &wiremock::Request| {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count == 0 {
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"status": "InProgress"}))
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"status": "Succeeded"}))
                }
            })
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;
        let request = PutAliasRequest::builder()
            .display_name("team-sandbox")
            .build()
            .expect("should build");

        let mut poller = begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
            .await
            .expect("should be accepted");

        let first = poller.poll().await.expect("should poll");
        assert_eq!(first.status, OperationStatus::Running);

        // Hand the token to "another process" and keep polling there.
        let token = poller.continuation_token().expect("should serialize");
        drop(poller);

        let resumed: Poller<SubscriptionAlias> =
            Poller::resume(&client, &token).expect("should resume");
        let outcome = resumed.wait().await.expect("should succeed");

        assert_eq!(outcome.status, OperationStatus::Succeeded);
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    // --- Cycle 6: Tracing spans ---

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_get_alias_emits_span() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ALIAS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(alias_body("Succeeded")))
            .mount(&server)
            .await;

        let client = setup_mock_client(&server).await;

        let _ = get(&client, "team-sandbox", &OperationOptions::new()).await;

        assert!(logs_contain("arm::aliases::get"));
    }
}
