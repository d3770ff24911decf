//! Web API context: request state and response assertions.

use crate::config::ContextConfig;
use crate::headers::RequestHeaders;
use crate::placeholders::Placeholders;
use crate::transport::{
    ReqwestTransport, RequestBody, RequestOptions, Response, Transport, TransportError,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Url;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use webapi_matcher::{
    assert_contains_subset, assert_key_matches_pattern, assert_matches_pattern,
    assert_text_contains, assert_text_not_contains, parse_actual_json, parse_expected_json,
    AssertionError, ChainMatcher,
};

pub const AUTHORIZATION: &str = "Authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("You must first make a request to check a response.")]
    NoResponse,
    #[error("expected response code {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },
    #[error("expected Content-Type '{expected}', got {}", .actual.as_deref().unwrap_or("none"))]
    ContentTypeMismatch {
        expected: String,
        actual: Option<String>,
    },
    #[error(transparent)]
    Assertion(#[from] AssertionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),
}

/// Method and URL of the last request, as sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    pub method: String,
    pub url: String,
}

/// State shared by the steps of one scenario.
#[derive(Debug)]
pub struct WebApiContext {
    transport: Arc<dyn Transport>,
    chain: Arc<ChainMatcher>,
    base_url: Url,
    authorization_prefix: String,
    authorization: Option<String>,
    headers: RequestHeaders,
    placeholders: Placeholders,
    request: Option<RequestData>,
    response: Option<Response>,
}

impl WebApiContext {
    pub fn new(config: &ContextConfig, transport: Arc<dyn Transport>) -> Result<Self, ContextError> {
        config.validate().map_err(ContextError::Config)?;
        let base_url = config.base().map_err(ContextError::Config)?;

        let mut headers = RequestHeaders::new();
        for (name, value) in &config.default_headers {
            headers.add(name.clone(), value.clone());
        }

        Ok(Self {
            transport,
            chain: Arc::new(ChainMatcher::standard()),
            base_url,
            authorization_prefix: config.authorization_prefix.clone(),
            authorization: None,
            headers,
            placeholders: Placeholders::new(),
            request: None,
            response: None,
        })
    }

    /// Context talking to the network through reqwest.
    pub fn from_config(config: &ContextConfig) -> Result<Self, ContextError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::new(config, Arc::new(transport))
    }

    /// Use a custom matcher chain, e.g. one with callback tokens.
    pub fn with_chain(mut self, chain: Arc<ChainMatcher>) -> Self {
        self.chain = chain;
        self
    }

    pub fn chain(&self) -> &ChainMatcher {
        &self.chain
    }

    // ===== Authorization and headers =====

    /// Replace any `Authorization` header with `<prefix> base64(user:password)`.
    pub fn authenticate_as(&mut self, username: &str, password: &str) {
        self.headers.remove(AUTHORIZATION);
        let token = STANDARD.encode(format!("{username}:{password}"));
        self.headers
            .add(AUTHORIZATION, format!("{} {}", self.authorization_prefix, token));
        self.authorization = Some(token);
    }

    pub fn set_authorization(&mut self, authorization: Option<String>) {
        self.authorization = authorization;
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    // ===== Placeholders =====

    pub fn set_placeholder(&mut self, key: &str, value: &str) {
        self.placeholders.set(key, value);
    }

    pub fn remove_placeholder(&mut self, key: &str) {
        self.placeholders.remove(key);
    }

    pub fn replace_placeholders(&self, text: &str) -> String {
        self.placeholders.replace(text)
    }

    // ===== Requests =====

    pub async fn send_request(&mut self, method: &str, url: &str) -> Result<(), ContextError> {
        self.dispatch(method, url, None).await
    }

    /// Send the `(field, value)` rows as a JSON object body.
    pub async fn send_request_with_values(
        &mut self,
        method: &str,
        url: &str,
        rows: &[(String, String)],
    ) -> Result<(), ContextError> {
        let fields: Map<String, Value> = rows
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(self.replace_placeholders(value))))
            .collect();
        let body = Value::Object(fields).to_string();
        self.dispatch(method, url, Some(RequestBody::Raw(body))).await
    }

    pub async fn send_request_with_body(
        &mut self,
        method: &str,
        url: &str,
        body: &str,
    ) -> Result<(), ContextError> {
        let body = self.replace_placeholders(body.trim());
        self.dispatch(method, url, Some(RequestBody::Raw(body))).await
    }

    /// Send `key=value` lines as a URL-encoded form.
    pub async fn send_request_with_form_data(
        &mut self,
        method: &str,
        url: &str,
        body: &str,
    ) -> Result<(), ContextError> {
        let body = self.replace_placeholders(body.trim());
        let fields = parse_form_data(&body);
        self.dispatch(method, url, Some(RequestBody::Form(fields))).await
    }

    /// Placeholders replaced, leading slashes trimmed, joined onto the base URL.
    pub fn prepare_url(&self, url: &str) -> Result<Url, ContextError> {
        let replaced = self.replace_placeholders(url);
        let relative = replaced.trim_start_matches('/');
        self.base_url.join(relative).map_err(|e| {
            ContextError::Transport(TransportError::InvalidUrl {
                url: replaced.clone(),
                reason: e.to_string(),
            })
        })
    }

    async fn dispatch(
        &mut self,
        method: &str,
        url: &str,
        body: Option<RequestBody>,
    ) -> Result<(), ContextError> {
        let url = self.prepare_url(url)?;
        let method = method.to_lowercase();

        self.request = Some(RequestData {
            method: method.clone(),
            url: url.to_string(),
        });

        let options = RequestOptions {
            headers: self.headers.pairs(),
            body,
        };

        debug!("{} {}", method, url);
        match self.transport.send(&method, url.as_str(), options).await {
            Ok(response) => {
                debug!("{} {} => {}", method, url, response.status);
                self.response = Some(response);
                Ok(())
            }
            Err(e) => {
                warn!("{} {} failed without a response: {}", method, url, e);
                self.response = None;
                Err(e.into())
            }
        }
    }

    // ===== Responses =====

    pub fn response(&self) -> Result<&Response, ContextError> {
        self.response.as_ref().ok_or(ContextError::NoResponse)
    }

    pub fn last_request(&self) -> Option<&RequestData> {
        self.request.as_ref()
    }

    pub fn response_code_should_be(&self, code: u16) -> Result<(), ContextError> {
        let actual = self.response()?.status;
        if actual == code {
            Ok(())
        } else {
            Err(ContextError::StatusMismatch {
                expected: code,
                actual,
            })
        }
    }

    /// Case-insensitive.
    pub fn response_should_contain(&self, text: &str) -> Result<(), ContextError> {
        assert_text_contains(text, &self.response()?.body)?;
        Ok(())
    }

    /// Case-sensitive.
    pub fn response_should_not_contain(&self, text: &str) -> Result<(), ContextError> {
        assert_text_not_contains(text, &self.response()?.body)?;
        Ok(())
    }

    /// The response holds at least the entries of `raw`, compared loosely.
    pub fn response_should_contain_json(&self, raw: &str) -> Result<(), ContextError> {
        let body = &self.response()?.body;
        let expected = parse_expected_json(&self.replace_placeholders(raw))?;
        let actual = parse_actual_json(body)?;
        assert_contains_subset(&expected, &actual)?;
        Ok(())
    }

    /// The response matches the pattern document `raw`.
    pub fn response_should_contain_json_matching(&self, raw: &str) -> Result<(), ContextError> {
        let body = &self.response()?.body;
        let pattern = parse_expected_json(&self.replace_placeholders(raw))?;
        let actual = parse_actual_json(body)?;
        assert_matches_pattern(&self.chain, &pattern, &actual)?;
        Ok(())
    }

    /// The value under `key` matches `raw`. The pattern text is used
    /// verbatim, without placeholder substitution.
    pub fn response_should_contain_json_with_key_matching(
        &self,
        key: &str,
        raw: &str,
    ) -> Result<(), ContextError> {
        let actual = parse_actual_json(&self.response()?.body)?;
        assert_key_matches_pattern(&self.chain, key, raw, &actual)?;
        Ok(())
    }

    /// The first `Content-Type` value is exactly `application/json`.
    pub fn response_should_be_json(&self) -> Result<(), ContextError> {
        let content_type = self.response()?.first_header("Content-Type");
        if content_type == Some(JSON_CONTENT_TYPE) {
            Ok(())
        } else {
            Err(ContextError::ContentTypeMismatch {
                expected: JSON_CONTENT_TYPE.to_string(),
                actual: content_type.map(str::to_string),
            })
        }
    }

    /// `<method> <url> => <status>:\n<body>` for the last exchange.
    pub fn describe_response(&self) -> Result<String, ContextError> {
        let response = self.response()?;
        let (method, url) = match &self.request {
            Some(request) => (request.method.as_str(), request.url.as_str()),
            None => ("method-not-set", "url-not-set"),
        };
        Ok(format!(
            "{} {} => {}:\n{}",
            method, url, response.status, response.body
        ))
    }
}

/// Parse `a=1` lines (or `a=1&b=2`) into decoded form fields.
pub fn parse_form_data(body: &str) -> Vec<(String, String)> {
    body.lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>()
        .join("&")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_form_component(key), decode_form_component(value))
        })
        .collect()
}

fn decode_form_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
