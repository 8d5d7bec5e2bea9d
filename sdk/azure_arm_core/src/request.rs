//! Request descriptors and the URL-template builder.
//!
//! Operations declare their HTTP shape with a [`RequestBuilder`]: a
//! method, a path template with `{name}` placeholders, and the API
//! version the operation was built against. All validation happens
//! locally in [`RequestBuilder::build`], before any I/O; the resulting
//! [`Request`] is immutable.

use crate::error::{ArmError, ArmResult};
use crate::options::OperationOptions;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;

/// An immutable request descriptor, ready to be sent.
///
/// `target` is the path-and-query relative to the client endpoint, or a
/// full URL when the descriptor wraps a continuation link or poll
/// target.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// A plain GET of a server-issued URL, used verbatim.
    ///
    /// Continuation links and poll targets already carry their own query
    /// string; nothing is appended or re-encoded.
    pub fn get(target: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            method: Method::GET,
            target: target.into(),
            headers,
            body: None,
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path-and-query (or full URL) this request addresses.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Headers attached to the request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The serialized body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

#[derive(Debug, Clone, Copy)]
enum ParamStyle {
    Encoded,
    Checked,
    Raw,
}

#[derive(Debug)]
struct PathParam {
    name: String,
    value: String,
    style: ParamStyle,
}

/// Builder binding path parameters, query pairs, headers, and a JSON
/// body into a [`Request`].
///
/// # Example
///
/// ```rust
/// use azure_arm_core::request::RequestBuilder;
/// use reqwest::Method;
///
/// # fn example() -> azure_arm_core::error::ArmResult<()> {
/// let request = RequestBuilder::new(
///     Method::GET,
///     "/providers/Microsoft.Subscription/aliases/{aliasName}",
///     "2021-10-01",
/// )
/// .validated_path_param("aliasName", "my-alias")
/// .build()?;
///
/// assert_eq!(
///     request.target(),
///     "/providers/Microsoft.Subscription/aliases/my-alias?api-version=2021-10-01"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    template: String,
    api_version: String,
    path_params: Vec<PathParam>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Result<Bytes>>,
}

impl RequestBuilder {
    /// Start a request for `template`, pinned to `api_version`.
    pub fn new(method: Method, template: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
            api_version: api_version.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Bind a path placeholder to a percent-encoded value.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(PathParam {
            name: name.into(),
            value: value.into(),
            style: ParamStyle::Encoded,
        });
        self
    }

    /// Bind a path placeholder to a resource name.
    ///
    /// On top of percent-encoding, [`build`](Self::build) rejects values
    /// with characters outside `[A-Za-z0-9._-]`, the character class ARM
    /// accepts for resource names.
    pub fn validated_path_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.path_params.push(PathParam {
            name: name.into(),
            value: value.into(),
            style: ParamStyle::Checked,
        });
        self
    }

    /// Bind a path placeholder to a value spliced in verbatim.
    ///
    /// ARM scope strings are themselves URL paths
    /// (`subscriptions/{id}/resourceGroups/{name}`) and must not be
    /// re-encoded.
    pub fn raw_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(PathParam {
            name: name.into(),
            value: value.into(),
            style: ParamStyle::Raw,
        });
        self
    }

    /// Append a query parameter.
    ///
    /// The `api-version` pair is always emitted first; everything else
    /// follows in insertion order.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: serde::Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body).map(Bytes::from));
        self
    }

    /// Merge per-call options: API version override, extra query
    /// parameters and headers, and the client request id.
    pub fn apply(mut self, options: &OperationOptions) -> Self {
        if let Some(version) = &options.api_version {
            self.api_version = version.clone();
        }
        for (name, value) in &options.params {
            self.query.push((name.clone(), value.clone()));
        }
        for (name, value) in &options.headers {
            self.headers.push((name.clone(), value.clone()));
        }
        if let Some(id) = &options.client_request_id {
            self.headers
                .push(("x-ms-client-request-id".into(), id.clone()));
        }
        self
    }

    /// Validate every binding and produce the immutable [`Request`].
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidArgument`] when a placeholder is left
    /// unbound, a parameter does not appear in the template, a value is
    /// empty or fails the resource-name character class, or a header is
    /// not representable. Returns [`ArmError::Serialization`] when the
    /// JSON body could not be serialized. No I/O is performed.
    pub fn build(self) -> ArmResult<Request> {
        let mut path = self.template;

        for param in &self.path_params {
            if param.value.is_empty() {
                return Err(ArmError::InvalidArgument(format!(
                    "path parameter '{}' must not be empty",
                    param.name
                )));
            }
            if matches!(param.style, ParamStyle::Checked)
                && !is_valid_resource_name(&param.value)
            {
                return Err(ArmError::InvalidArgument(format!(
                    "path parameter '{}' contains characters outside [A-Za-z0-9._-]",
                    param.name
                )));
            }

            let placeholder = format!("{{{}}}", param.name);
            if !path.contains(&placeholder) {
                return Err(ArmError::InvalidArgument(format!(
                    "unknown path parameter '{}'",
                    param.name
                )));
            }

            let bound = match param.style {
                ParamStyle::Raw => param.value.clone(),
                ParamStyle::Encoded | ParamStyle::Checked => {
                    urlencoding::encode(&param.value).into_owned()
                }
            };
            path = path.replace(&placeholder, &bound);
        }

        if let Some(start) = path.find('{') {
            let name: String = path[start + 1..].chars().take_while(|c| *c != '}').collect();
            return Err(ArmError::InvalidArgument(format!(
                "path parameter '{name}' was not bound"
            )));
        }

        // Raw scope values may or may not carry a leading slash; the
        // final path always has exactly one.
        let path = format!("/{}", path.trim_start_matches('/'));

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("api-version", &self.api_version);
        for (name, value) in &self.query {
            query.append_pair(name, value);
        }
        let target = format!("{}?{}", path, query.finish());

        let body = self.body.transpose()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ArmError::InvalidArgument(format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ArmError::InvalidArgument(format!("invalid value for header '{name}': {e}"))
            })?;
            headers.insert(name, value);
        }

        Ok(Request {
            method: self.method,
            target,
            headers,
            body,
        })
    }
}

fn is_valid_resource_name(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
