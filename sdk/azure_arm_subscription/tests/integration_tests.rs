//! Integration tests for azure_arm_subscription.
//!
//! These tests hit the live Azure Resource Manager endpoint and create
//! a real subscription alias.
//! Run with: `cargo test --features integration-tests`
//!
//! Required environment variables:
//! - `AZURE_ARM_ACCESS_TOKEN`: A bearer token for the management endpoint
//! - `AZURE_ARM_BILLING_SCOPE`: The billing scope new subscriptions are billed under

#![cfg(feature = "integration-tests")]

use azure_arm_core::auth::ArmCredential;
use azure_arm_core::client::ArmClient;
use azure_arm_core::error::ArmError;
use azure_arm_core::lro::{OperationStatus, Poller};
use azure_arm_core::options::OperationOptions;
use azure_arm_subscription::alias::{self, PutAliasRequest, SubscriptionAlias, Workload};

fn get_client() -> ArmClient {
    let token = std::env::var("AZURE_ARM_ACCESS_TOKEN").expect("AZURE_ARM_ACCESS_TOKEN not set");

    ArmClient::builder()
        .credential(ArmCredential::bearer_token(token))
        .build()
        .expect("Failed to build client")
}

fn get_billing_scope() -> String {
    std::env::var("AZURE_ARM_BILLING_SCOPE").expect("AZURE_ARM_BILLING_SCOPE not set")
}

fn unique_alias_name() -> String {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs();
    format!("arm-sdk-it-{stamp}")
}

#[tokio::test]
async fn test_alias_lifecycle() {
    let client = get_client();
    let alias_name = unique_alias_name();

    // Create a subscription under the alias
    let request = PutAliasRequest::builder()
        .display_name("ARM SDK Integration Test")
        .workload(Workload::DevTest)
        .billing_scope(get_billing_scope())
        .build()
        .expect("valid request");

    let poller = alias::begin_create(&client, &alias_name, &request, &OperationOptions::new())
        .await
        .expect("begin create");

    let outcome = poller.wait().await.expect("poll creation");
    assert_eq!(outcome.status, OperationStatus::Succeeded);

    // Get the alias
    let fetched = alias::get(&client, &alias_name, &OperationOptions::new())
        .await
        .expect("get alias");
    assert_eq!(fetched.name, alias_name);
    assert!(fetched.properties.subscription_id.is_some());

    // List aliases (should include ours)
    let aliases = alias::list(&client, &OperationOptions::new())
        .await
        .expect("list aliases");
    assert!(aliases.value.iter().any(|a| a.name == alias_name));

    // Cleanup: the subscription itself outlives the alias
    alias::delete(&client, &alias_name, &OperationOptions::new())
        .await
        .expect("delete alias");
}

#[tokio::test]
async fn test_detach_and_resume_across_pollers() {
    let client = get_client();
    let alias_name = unique_alias_name();

    let request = PutAliasRequest::builder()
        .display_name("ARM SDK Resume Test")
        .workload(Workload::DevTest)
        .billing_scope(get_billing_scope())
        .build()
        .expect("valid request");

    let poller = alias::begin_create(&client, &alias_name, &request, &OperationOptions::new())
        .await
        .expect("begin create");

    // Detach, then finish the operation from a fresh poller
    let token = poller.continuation_token().expect("serialize token");
    drop(poller);

    let resumed: Poller<SubscriptionAlias> = Poller::resume(&client, &token).expect("resume");
    let outcome = resumed.wait().await.expect("poll creation");
    assert_eq!(outcome.status, OperationStatus::Succeeded);

    // Cleanup
    alias::delete(&client, &alias_name, &OperationOptions::new())
        .await
        .expect("delete alias");
}

#[tokio::test]
async fn test_get_missing_alias_is_not_found() {
    let client = get_client();

    let error = alias::get(
        &client,
        "arm-sdk-it-never-created",
        &OperationOptions::new(),
    )
    .await
    .expect_err("absent alias");

    assert!(matches!(error, ArmError::NotFound { .. }));
}
