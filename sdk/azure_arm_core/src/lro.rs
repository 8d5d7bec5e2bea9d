//! Long-running operation polling.
//!
//! ARM models slow provisioning work as a long-running operation: the
//! initial request is acknowledged with `202 Accepted` (or completes
//! synchronously), and a status monitor URL reports progress until the
//! operation reaches one of the three terminal outcomes `Succeeded`,
//! `Failed`, or `Canceled`. [`Poller`] drives that protocol: it picks
//! the poll URL from the acknowledgement headers, polls on a fixed
//! interval unless the service sends `Retry-After`, and caches the
//! terminal state once seen.
//!
//! An operation that fails is still a successfully polled operation.
//! [`Poller::wait`] returns `Ok` with [`OperationStatus::Failed`] and
//! the service's error envelope in [`OperationState::error`]; `Err` is
//! reserved for the polling machinery itself (transport failures,
//! rejected poll requests).
//!
//! A poller can be detached into a [continuation token](Poller::continuation_token)
//! and picked up later, in another process if need be, with
//! [`Poller::resume`].

use crate::client::ArmClient;
use crate::error::{ArmError, ArmResult, ErrorEnvelope};
use crate::options::{OperationOptions, PollingMode};
use crate::request::Request;
use crate::response::RawResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::time::Duration;

/// Headers that carry the status monitor URL, in precedence order.
const POLL_URL_HEADERS: [&str; 3] = ["azure-asyncoperation", "operation-location", "location"];

/// The status of a long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// The operation has not started executing.
    NotStarted,
    /// The operation is executing.
    #[serde(alias = "InProgress")]
    Running,
    /// The operation finished and its result (if any) is available.
    Succeeded,
    /// The operation finished unsuccessfully.
    Failed,
    /// The operation was canceled before it finished.
    #[serde(alias = "Cancelled")]
    Canceled,
}

impl OperationStatus {
    /// Whether this status is one of the three terminal outcomes.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Parse a wire status string, case-insensitively.
    ///
    /// Services mint their own in-progress markers (`Accepted`,
    /// `Creating`, `Deleting`, ...); anything that is not a recognized
    /// terminal or initial marker counts as still running.
    fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "notstarted" => Self::NotStarted,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::Running,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "NotStarted",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        };
        f.write_str(s)
    }
}

/// Derive the operation status from a response.
///
/// Status monitors report a top-level `status` field; resources under
/// provisioning report `properties.provisioningState`. A body with
/// neither falls back to the HTTP code: `202` means the work is still
/// in flight, anything else accepted by the success set means it is
/// done.
fn status_from_body(status_code: u16, body: &[u8]) -> OperationStatus {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(s) = json.get("status").and_then(|v| v.as_str()) {
            return OperationStatus::from_wire(s);
        }
        if let Some(s) = json
            .pointer("/properties/provisioningState")
            .and_then(|v| v.as_str())
        {
            return OperationStatus::from_wire(s);
        }
    }

    if status_code == 202 {
        OperationStatus::Running
    } else {
        OperationStatus::Succeeded
    }
}

/// Extract the operation's result from a final response body.
///
/// A status monitor document (recognized by its top-level `status`
/// member) nests the resource under `result`; any other body is taken
/// to be the resource itself.
fn result_from_body<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    let mut json: serde_json::Value = serde_json::from_slice(body).ok()?;
    if json.get("status").is_some() {
        serde_json::from_value(json.get_mut("result")?.take()).ok()
    } else {
        serde_json::from_value(json).ok()
    }
}

/// A snapshot of a long-running operation.
#[derive(Debug, Clone)]
pub struct OperationState<T> {
    /// Where the operation stands.
    pub status: OperationStatus,
    /// The operation's result, when it succeeded and the final response
    /// carried one, either as the body itself or nested under the
    /// status monitor's `result` member. Monitors that report the
    /// outcome with no payload leave this `None`.
    pub result: Option<T>,
    /// The service's error envelope, when the operation failed or was
    /// canceled.
    pub error: Option<ErrorEnvelope>,
}

impl<T: DeserializeOwned> OperationState<T> {
    fn from_response(response: &RawResponse) -> Self {
        let status = status_from_body(response.status(), response.body());

        let result = if status == OperationStatus::Succeeded && !response.body().is_empty() {
            result_from_body(response.body())
        } else {
            None
        };

        let error = match status {
            OperationStatus::Failed | OperationStatus::Canceled => {
                Some(ErrorEnvelope::failsafe_from_bytes(response.body()))
            }
            _ => None,
        };

        Self {
            status,
            result,
            error,
        }
    }
}

/// The serializable position of a [`Poller`].
///
/// This is the payload of a continuation token: everything needed to
/// keep polling an operation from another client, process, or machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerState {
    /// The status monitor URL being polled.
    pub poll_url: String,
    /// The status observed most recently.
    pub last_status: OperationStatus,
    /// How many polls have hit the wire.
    pub attempts: u32,
}

/// Tracks a long-running operation to completion.
///
/// Obtained from an operation's `begin_*` function. Call
/// [`wait`](Self::wait) to block until a terminal status, or
/// [`poll`](Self::poll) to advance one step at a time.
pub struct Poller<T> {
    client: ArmClient,
    state: PollerState,
    interval: Duration,
    mode: PollingMode,
    initial: Option<OperationState<T>>,
    terminal: Option<OperationState<T>>,
    retry_after: Option<Duration>,
}

impl<T> Poller<T>
where
    T: DeserializeOwned + Clone,
{
    /// Build a poller from the acknowledgement of a long-running
    /// operation.
    ///
    /// The status monitor URL is taken from the response headers in
    /// precedence order `Azure-AsyncOperation`, `Operation-Location`,
    /// `Location`; with none present the original request target is
    /// polled. An acknowledgement that is already terminal (the service
    /// completed synchronously) produces a poller that never touches
    /// the wire.
    pub fn from_response(
        client: &ArmClient,
        original_target: &str,
        response: &RawResponse,
        options: &OperationOptions,
    ) -> Self {
        let poll_url = POLL_URL_HEADERS
            .iter()
            .find_map(|name| response.header(name))
            .unwrap_or(original_target)
            .to_string();

        let initial = OperationState::from_response(response);
        let last_status = initial.status;
        let terminal = last_status.is_terminal().then(|| initial.clone());

        Self {
            client: client.clone(),
            state: PollerState {
                poll_url,
                last_status,
                attempts: 0,
            },
            interval: options
                .polling_interval
                .unwrap_or_else(|| client.polling_interval()),
            mode: options.polling,
            initial: Some(initial),
            terminal,
            retry_after: response.retry_after(),
        }
    }

    /// Rebuild a poller from a continuation token.
    ///
    /// The token is the string produced by
    /// [`continuation_token`](Self::continuation_token), possibly in a
    /// different process. A resumed poller always re-polls at least
    /// once, even when the token recorded a terminal status; the
    /// terminal answer is re-fetched rather than trusted.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] if the token does not
    /// parse.
    pub fn resume(client: &ArmClient, token: &str) -> ArmResult<Self> {
        let state: PollerState = serde_json::from_str(token)
            .map_err(|e| ArmError::InvalidArgument(format!("invalid continuation token: {e}")))?;

        Ok(Self {
            client: client.clone(),
            state,
            interval: client.polling_interval(),
            mode: PollingMode::Auto,
            initial: None,
            terminal: None,
            retry_after: None,
        })
    }

    /// Serialize this poller's position as a continuation token.
    ///
    /// # Errors
    ///
    /// Returns an error if the state fails to serialize.
    pub fn continuation_token(&self) -> ArmResult<String> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// The status monitor URL this poller is watching.
    pub fn poll_url(&self) -> &str {
        &self.state.poll_url
    }

    /// The most recently observed status.
    pub fn status(&self) -> OperationStatus {
        self.state.last_status
    }

    /// How many polls have hit the wire.
    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }

    /// Advance the operation by one poll.
    ///
    /// Once a terminal state has been observed it is cached and
    /// replayed: further calls return it without touching the wire. In
    /// [`PollingMode::NoPolling`] the initial acknowledgement is
    /// returned as-is instead of polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll request fails at the transport
    /// level or the status monitor rejects it. A `Failed` or `Canceled`
    /// operation is not an error here; inspect
    /// [`OperationState::status`].
    pub async fn poll(&mut self) -> ArmResult<OperationState<T>> {
        if let Some(terminal) = &self.terminal {
            return Ok(terminal.clone());
        }

        if self.mode == PollingMode::NoPolling {
            if let Some(initial) = &self.initial {
                return Ok(initial.clone());
            }
        }

        let request = Request::get(&self.state.poll_url);
        let response = self.client.send(&request).await?;
        self.state.attempts += 1;

        // Capture the delay hint before classification consumes the response.
        self.retry_after = response.retry_after();
        let response = response.expect_success(&[200, 201, 202, 204])?;

        let state = OperationState::from_response(&response);
        self.state.last_status = state.status;

        tracing::trace!(
            url = %self.state.poll_url,
            status = %state.status,
            attempt = self.state.attempts,
            "polled operation status"
        );

        if state.status.is_terminal() {
            self.terminal = Some(state.clone());
        }

        Ok(state)
    }

    /// Poll until the operation reaches a terminal status.
    ///
    /// The first poll happens immediately; afterwards the poller sleeps
    /// for the configured interval between polls, except that a
    /// `Retry-After` header on a poll response overrides the interval
    /// for the single wait that follows it. In
    /// [`PollingMode::NoPolling`] the initial acknowledgement is
    /// returned without any wire traffic.
    ///
    /// # Errors
    ///
    /// Returns an error only when polling itself fails; a `Failed` or
    /// `Canceled` operation comes back as `Ok` with the corresponding
    /// [`OperationStatus`].
    pub async fn wait(mut self) -> ArmResult<OperationState<T>> {
        loop {
            let state = self.poll().await?;
            if state.status.is_terminal() || self.mode == PollingMode::NoPolling {
                return Ok(state);
            }

            let delay = self.retry_after.take().unwrap_or(self.interval);
            tokio::time::sleep(delay).await;
        }
    }
}
