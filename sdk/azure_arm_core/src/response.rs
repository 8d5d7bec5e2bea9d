//! Buffered responses and success-set classification.

use crate::error::{ArmError, ArmResult, ErrorEnvelope};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// An HTTP response with its body fully read off the wire.
///
/// The transport hands back a `RawResponse` for every completed
/// exchange, whatever the status. Each operation then declares which
/// statuses it considers success via
/// [`expect_success`](RawResponse::expect_success); everything else is
/// classified into an [`ArmError`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Assemble a response from its parts. Exposed for tests and custom
    /// transports.
    pub fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub(crate) async fn from_reqwest(response: reqwest::Response) -> ArmResult<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header value as a string. Case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> ArmResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The server's `Retry-After` hint in delta-seconds, if present and
    /// well-formed.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// Classify this response against the operation's success set.
    ///
    /// A status in `success_codes` passes the response through. Any
    /// other status yields the matching [`ArmError`] kind (401
    /// authentication, 404 not-found, 409 conflict, otherwise a generic
    /// HTTP error) carrying whatever error envelope the body held. A
    /// body that fails to parse degrades to an empty envelope; it never
    /// masks the status-derived error.
    pub fn expect_success(self, success_codes: &[u16]) -> ArmResult<Self> {
        if success_codes.contains(&self.status) {
            return Ok(self);
        }

        let envelope = ErrorEnvelope::failsafe_from_bytes(&self.body);
        Err(ArmError::from_status(self.status, envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse::new(status, HeaderMap::new(), Bytes::from(body.to_string()))
    }

    #[test]
    fn declared_success_codes_pass_through() {
        for status in [200, 201, 202, 204] {
            let result = response(status, "{}").expect_success(&[200, 201, 202, 204]);
            assert_eq!(result.expect("should pass").status(), status);
        }
    }

    #[test]
    fn undeclared_success_codes_are_errors_too() {
        // 201 from a service that only promises 200 is out of contract.
        let err = response(201, "{}").expect_success(&[200]).unwrap_err();

        match err {
            ArmError::Http { status, .. } => assert_eq!(status, 201),
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn statuses_classify_per_the_table() {
        let err = response(401, r#"{"error": {"code": "InvalidAuthenticationToken"}}"#)
            .expect_success(&[200])
            .unwrap_err();
        assert!(matches!(err, ArmError::Authentication { .. }));

        let err = response(404, "{}").expect_success(&[200]).unwrap_err();
        assert!(matches!(err, ArmError::NotFound { .. }));

        let err = response(409, "{}").expect_success(&[200]).unwrap_err();
        assert!(matches!(err, ArmError::Conflict { .. }));

        let err = response(503, "{}").expect_success(&[200]).unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn error_envelope_is_carried_into_the_error() {
        let err = response(
            409,
            r#"{"error": {"code": "AliasAlreadyExists", "message": "alias is taken"}}"#,
        )
        .expect_success(&[200, 201])
        .unwrap_err();

        let envelope = err.envelope().expect("status-derived error");
        assert_eq!(envelope.code.as_deref(), Some("AliasAlreadyExists"));
        assert_eq!(envelope.message.as_deref(), Some("alias is taken"));
    }

    #[test]
    fn unparseable_error_bodies_never_mask_the_status() {
        let err = response(404, "<html>Not Found</html>")
            .expect_success(&[200])
            .unwrap_err();

        match err {
            ArmError::NotFound { envelope } => assert!(envelope.is_empty()),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn json_deserializes_the_body() {
        #[derive(Debug, serde::Deserialize)]
        struct Item {
            name: String,
        }

        let item: Item = response(200, r#"{"name": "alias-1"}"#)
            .json()
            .expect("should parse");
        assert_eq!(item.name, "alias-1");

        let err = response(200, "not json").json::<Item>().unwrap_err();
        assert!(matches!(err, ArmError::Serialization(_)));
    }

    #[test]
    fn retry_after_parses_delta_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let response = RawResponse::new(202, headers, Bytes::new());
        assert_eq!(response.retry_after(), Some(Duration::from_secs(7)));

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        let response = RawResponse::new(202, headers, Bytes::new());
        assert_eq!(response.retry_after(), None);

        let response = RawResponse::new(202, HeaderMap::new(), Bytes::new());
        assert_eq!(response.retry_after(), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Azure-AsyncOperation", HeaderValue::from_static("https://example.test/op/1"));
        let response = RawResponse::new(202, headers, Bytes::new());

        assert_eq!(
            response.header("azure-asyncoperation"),
            Some("https://example.test/op/1")
        );
    }
}
