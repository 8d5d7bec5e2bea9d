//! HTTP client for Azure Resource Manager.
//!
//! This module provides [`ArmClient`], the transport every operation
//! goes through. The client owns the endpoint, the credential, and the
//! retry policy for transient failures; it does not decide whether a
//! response is a success. Operations declare their own success sets and
//! classify the [`RawResponse`](crate::response::RawResponse) the
//! client hands back.
//!
//! # Examples
//!
//! ## Using a pre-acquired token
//! ```rust,no_run
//! use azure_arm_core::client::ArmClient;
//! use azure_arm_core::auth::ArmCredential;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArmClient::builder()
//!     .credential(ArmCredential::bearer_token("eyJ0eXAi..."))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using an external token provider
//! ```rust,no_run
//! use azure_arm_core::auth::{ArmCredential, TokenProvider};
//! use azure_arm_core::client::ArmClient;
//! use azure_arm_core::error::ArmResult;
//! use std::sync::Arc;
//!
//! struct CliToken;
//!
//! #[async_trait::async_trait]
//! impl TokenProvider for CliToken {
//!     async fn token(&self) -> ArmResult<String> {
//!         // Shell out to `az account get-access-token`, hit IMDS, ...
//!         Ok("token".into())
//!     }
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArmClient::builder()
//!     .credential(ArmCredential::provider(Arc::new(CliToken)))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::auth::ArmCredential;
use crate::error::{ArmError, ArmResult};
use crate::request::Request;
use crate::response::RawResponse;
use reqwest::Client as HttpClient;
use url::Url;

use std::time::Duration;

/// The Azure Resource Manager public endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read/response timeout (60 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default delay between polls of a long-running operation (30 seconds),
/// the ARM service default.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(30);

/// Determines if an HTTP status code represents a retriable error.
///
/// Retriable errors are transient server-side issues that may succeed on retry:
/// - 429 Too Many Requests (rate limiting)
/// - 500 Internal Server Error
/// - 502 Bad Gateway
/// - 503 Service Unavailable
/// - 504 Gateway Timeout
#[inline]
pub fn is_retriable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Configuration for automatic retry behavior on transient errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Initial backoff duration before the first retry.
    /// Subsequent retries use exponential backoff (2^attempt * initial_backoff).
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// The base client for Azure Resource Manager requests.
///
/// Handles authentication, transport, endpoint resolution, and retries
/// for transient statuses. Service crates build on it through their
/// operation functions.
///
/// The client is cheaply cloneable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ArmClient {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: Url,
    pub(crate) credential: ArmCredential,
    pub(crate) retry_policy: RetryPolicy,
    pub(crate) polling_interval: Duration,
}

/// Builder for constructing an [`ArmClient`].
///
/// Use [`ArmClient::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct ArmClientBuilder {
    endpoint: Option<String>,
    credential: Option<ArmCredential>,
    http_client: Option<HttpClient>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    polling_interval: Option<Duration>,
}

impl ArmClient {
    /// Create a new builder for configuring an `ArmClient`.
    pub fn builder() -> ArmClientBuilder {
        ArmClientBuilder::default()
    }

    /// Get the base endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the retry policy configuration.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Get the default delay between polls of a long-running operation.
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    /// Resolve a request target against the endpoint.
    ///
    /// Relative targets join onto the endpoint; absolute URLs (server
    /// issued continuation links and poll targets) pass through as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be joined to the endpoint URL.
    pub fn url(&self, target: &str) -> ArmResult<Url> {
        self.endpoint
            .join(target)
            .map_err(|e| ArmError::InvalidEndpoint(format!("failed to construct URL: {e}")))
    }

    /// Send a request with automatic retry on transient errors.
    ///
    /// Automatically attaches the `Authorization` header. Retries on
    /// retriable HTTP statuses (429, 500, 502, 503, 504) with
    /// exponential backoff, then returns the final response whatever
    /// its status: classification against an operation's success set is
    /// the caller's job, via
    /// [`RawResponse::expect_success`](crate::response::RawResponse::expect_success).
    ///
    /// # Errors
    ///
    /// Returns an error if credential resolution fails or the request
    /// fails at the transport level after all retries.
    pub async fn send(&self, request: &Request) -> ArmResult<RawResponse> {
        let url = self.url(request.target())?;
        let auth = self.credential.resolve().await?;

        for attempt in 0..=self.retry_policy.max_retries {
            let mut builder = self
                .http
                .request(request.method().clone(), url.clone())
                .header("Authorization", &auth)
                .headers(request.headers().clone());
            if let Some(body) = request.body() {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();

            // Non-retriable status or last attempt - this is the final response
            if !is_retriable_status(status) || attempt == self.retry_policy.max_retries {
                return RawResponse::from_reqwest(response).await;
            }

            // Calculate backoff with jitter: base_backoff * jitter_factor
            // jitter_factor is in range [0.75, 1.25] for ±25% variation
            let base_backoff = self.retry_policy.initial_backoff * 2_u32.pow(attempt);
            let jitter = 0.75 + fastrand::f64() * 0.5; // 0.75 to 1.25
            let backoff = base_backoff.mul_f64(jitter);
            tokio::time::sleep(backoff).await;
        }

        // This should never be reached due to the loop logic
        unreachable!("retry loop should return before reaching here")
    }
}

impl ArmClientBuilder {
    /// Set the management endpoint URL.
    ///
    /// If not set, the builder checks the `AZURE_ARM_ENDPOINT`
    /// environment variable and finally falls back to
    /// [`DEFAULT_ENDPOINT`] (`https://management.azure.com`). Sovereign
    /// clouds set their own endpoint here.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the credential to use for authentication.
    ///
    /// If not set, the builder uses [`ArmCredential::from_env()`] which
    /// reads a pre-acquired token from `AZURE_ARM_ACCESS_TOKEN`.
    pub fn credential(mut self, credential: ArmCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set a custom HTTP client.
    ///
    /// Use this to configure proxies or other HTTP settings.
    ///
    /// **Note:** If you provide a custom HTTP client, any timeout configuration
    /// via [`connect_timeout`](Self::connect_timeout) will be ignored.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the connection timeout.
    ///
    /// This is the maximum time allowed for establishing a connection to the server.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    ///
    /// This is the maximum time allowed for receiving a response from the server.
    /// It covers the entire request/response cycle including reading the body.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the retry policy for transient errors.
    ///
    /// Configures automatic retries for retriable HTTP errors (429, 500, 502, 503, 504)
    /// with exponential backoff.
    ///
    /// Defaults to 3 retries with 500ms initial backoff.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Set the client-wide default delay between polls of a
    /// long-running operation.
    ///
    /// Defaults to [`DEFAULT_POLLING_INTERVAL`] (30 seconds). Individual
    /// calls can override it through their options.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }

    /// Build the `ArmClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint URL is invalid
    /// - No credential is provided and `AZURE_ARM_ACCESS_TOKEN` is not set
    pub fn build(self) -> ArmResult<ArmClient> {
        // Build HTTP client first using timeout configuration
        let http = self.http_client.unwrap_or_else(|| {
            let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
            let read_timeout = self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT);

            reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .timeout(read_timeout)
                .build()
                .expect("failed to build HTTP client")
        });

        let endpoint_str = self
            .endpoint
            .or_else(|| std::env::var("AZURE_ARM_ENDPOINT").ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let endpoint = Url::parse(&endpoint_str)
            .map_err(|e| ArmError::InvalidEndpoint(format!("failed to parse '{endpoint_str}': {e}")))?;

        let credential = self
            .credential
            .map(Ok)
            .unwrap_or_else(ArmCredential::from_env)?;

        Ok(ArmClient {
            http,
            endpoint,
            credential,
            retry_policy: self.retry_policy.unwrap_or_default(),
            polling_interval: self.polling_interval.unwrap_or(DEFAULT_POLLING_INTERVAL),
        })
    }
}
