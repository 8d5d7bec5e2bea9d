//! Per-call configuration for ARM operations.
//!
//! Every operation facade accepts an [`OperationOptions`] value covering
//! the knobs that would otherwise be loose keyword arguments: an API
//! version override, extra headers and query parameters, the client
//! request id, a response hook, and polling behavior for long-running
//! operations.

use crate::response::RawResponse;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How a `begin_*` operation drives its poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollingMode {
    /// Poll the status monitor until a terminal state is reached.
    #[default]
    Auto,

    /// Do not poll; the poller reports the state derived from the
    /// initial response and completion tracking is up to the caller.
    NoPolling,
}

/// Observational hook invoked with each raw response before it is
/// classified into success or error.
pub type ResponseInterceptor = Arc<dyn Fn(&RawResponse) + Send + Sync>;

/// Options applied to a single operation call.
///
/// The default value changes nothing about the call. All setters are
/// chainable:
///
/// ```rust
/// use azure_arm_core::options::OperationOptions;
/// use std::time::Duration;
///
/// let options = OperationOptions::default()
///     .client_request_id("00000000-0000-0000-0000-000000000001")
///     .polling_interval(Duration::from_secs(5));
/// ```
#[derive(Clone, Default)]
pub struct OperationOptions {
    /// API version override sent as the `api-version` query parameter.
    pub api_version: Option<String>,

    /// Extra headers appended to the request.
    pub headers: Vec<(String, String)>,

    /// Extra query parameters appended after the operation's own.
    pub params: Vec<(String, String)>,

    /// Correlation id sent as `x-ms-client-request-id`.
    pub client_request_id: Option<String>,

    /// Hook observing each raw response before classification.
    pub on_response: Option<ResponseInterceptor>,

    /// Polling behavior for long-running operations.
    pub polling: PollingMode,

    /// Poll delay used when the service sends no `Retry-After` hint.
    /// Falls back to the client-wide default when unset.
    pub polling_interval: Option<Duration>,
}

impl OperationOptions {
    /// Create options equal to [`OperationOptions::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the API version for this call.
    ///
    /// Operations pin the version their service contract was built
    /// against; overriding it may result in unsupported behavior. The
    /// value is passed through without validation.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Append a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter to the request.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Set the `x-ms-client-request-id` correlation header.
    pub fn client_request_id(mut self, id: impl Into<String>) -> Self {
        self.client_request_id = Some(id.into());
        self
    }

    /// Observe each raw response before classification.
    ///
    /// The hook sees every page fetch of a paged operation and the
    /// submission response of a long-running one. It cannot alter the
    /// response or the classification outcome.
    pub fn on_response(mut self, hook: impl Fn(&RawResponse) + Send + Sync + 'static) -> Self {
        self.on_response = Some(Arc::new(hook));
        self
    }

    /// Set the polling mode for `begin_*` operations.
    pub fn polling(mut self, mode: PollingMode) -> Self {
        self.polling = mode;
        self
    }

    /// Set the default delay between polls of a long-running operation.
    ///
    /// A server-provided `Retry-After` header overrides this for the
    /// wait it accompanies.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }
}

impl fmt::Debug for OperationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationOptions")
            .field("api_version", &self.api_version)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("client_request_id", &self.client_request_id)
            .field("on_response", &self.on_response.as_ref().map(|_| "<hook>"))
            .field("polling", &self.polling)
            .field("polling_interval", &self.polling_interval)
            .finish()
    }
}
