//! # Azure ARM Subscription
//!
//! Subscription lifecycle client for the Azure Resource Manager Rust SDK.
//!
//! This crate provides Rust bindings for the `Microsoft.Subscription`
//! resource provider: creating subscriptions through aliases, looking them
//! up, and removing them. Creating a subscription provisions billing and
//! tenancy resources behind the scenes, so the create call is a
//! long-running operation driven to completion through a poller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use azure_arm_core::auth::ArmCredential;
//! use azure_arm_core::client::ArmClient;
//! use azure_arm_core::options::OperationOptions;
//! use azure_arm_subscription::alias::{self, PutAliasRequest, Workload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ArmClient::builder()
//!         .credential(ArmCredential::bearer_token("eyJ0eXAi..."))
//!         .build()?;
//!
//!     // Create a subscription under an alias
//!     let request = PutAliasRequest::builder()
//!         .display_name("team-sandbox")
//!         .workload(Workload::Production)
//!         .billing_scope("/billingAccounts/1234/billingProfiles/5678/invoiceSections/9abc")
//!         .build()?;
//!
//!     let poller =
//!         alias::begin_create(&client, "team-sandbox", &request, &OperationOptions::new())
//!             .await?;
//!     let outcome = poller.wait().await?;
//!     println!("provisioning finished: {}", outcome.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Alias**: A client-chosen name identifying a subscription creation
//!   request. The alias survives the request, so retrying a create with
//!   the same alias is idempotent.
//! - **Long-running creation**: `begin_create` returns a
//!   [`Poller`](azure_arm_core::lro::Poller) that tracks provisioning.
//!   Wait on it, poll it step by step, or detach it into a continuation
//!   token and resume elsewhere.
//!
//! ## Modules
//!
//! - [`alias`] - Create, retrieve, list, and delete subscription aliases

pub mod alias;
pub mod models;

/// Test utilities shared across modules.
#[cfg(test)]
pub(crate) mod test_utils {
    pub(crate) use azure_arm_core::test_support::mock_client as setup_mock_client;
}
