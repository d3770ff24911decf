//! HTTP transport abstraction.
//!
//! The context only needs "send this request, give me status, headers and
//! body". [`ReqwestTransport`] does that over the network; tests substitute
//! an in-memory implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Sent as-is.
    Raw(String),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// One entry per header value; repeated names are sent repeatedly.
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// A received response. HTTP error statuses are responses too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// All values of a header, matched case-insensitively, in received order.
    pub fn header(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(
        &self,
        method: &str,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

pub(crate) fn parse_method(method: &str) -> Result<Method, TransportError> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| TransportError::InvalidMethod(method.to_string()))
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |reason: String| TransportError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: &str,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, TransportError> {
        let method = parse_method(method)?;
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut request = self
            .client
            .request(method.clone(), parsed)
            .headers(header_map(&options.headers)?);

        request = match options.body {
            Some(RequestBody::Raw(body)) => request.body(body),
            Some(RequestBody::Form(fields)) => request.form(&fields),
            None => request,
        };

        debug!("Sending {} {}", method, url);
        let response = request.send().await?;
        let status = response.status().as_u16();

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.text().await?;
        debug!("Received {} from {} {}", status, method, url);

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
