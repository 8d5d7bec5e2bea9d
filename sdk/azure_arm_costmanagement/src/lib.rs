//! # Azure ARM Cost Management
//!
//! Cost Management client for the Azure Resource Manager Rust SDK.
//!
//! This crate provides Rust bindings for the `Microsoft.CostManagement`
//! resource provider's alert surface: paging through cost alerts at any
//! scope, fetching a single alert, dismissing alerts that have been
//! handled, and reading alerts on linked external cloud accounts.
//!
//! Alerts live at a **scope** - a subscription, a resource group, a
//! billing account. A scope is itself a URL path fragment, so it is
//! spliced into the request path verbatim rather than percent-encoded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use azure_arm_core::auth::ArmCredential;
//! use azure_arm_core::client::ArmClient;
//! use azure_arm_core::options::OperationOptions;
//! use azure_arm_costmanagement::alerts;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ArmClient::builder()
//!         .credential(ArmCredential::bearer_token("eyJ0eXAi..."))
//!         .build()?;
//!
//!     // Walk every alert on the subscription, page by page
//!     let mut pager = alerts::list(
//!         &client,
//!         "subscriptions/00000000-0000-0000-0000-000000000000",
//!         &OperationOptions::new(),
//!     )?;
//!
//!     while let Some(page) = pager.next_page().await {
//!         for alert in page?.value {
//!             println!("{}: {:?}", alert.name, alert.properties.status);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Scope**: The ARM ancestry path alerts are read from, passed
//!   through without encoding.
//! - **Lazy paging**: [`alerts::list`] returns a
//!   [`Pager`](azure_arm_core::paging::Pager) that fetches nothing until
//!   asked and follows `nextLink` continuation URLs verbatim.
//!
//! ## Modules
//!
//! - [`alerts`] - List, get, and dismiss cost alerts, including alerts
//!   on external cloud providers

pub mod alerts;
pub mod models;

/// Test utilities shared across modules.
#[cfg(test)]
pub(crate) mod test_utils {
    pub(crate) use azure_arm_core::test_support::mock_client as setup_mock_client;
}
