use crate::domain::entities::{Method, Request};
use crate::domain::params::ParamTree;
use crate::domain::value_objects::{ContentType, JsonBody, Url};
use anyhow::{Context, Result, anyhow};
use std::str::FromStr;
use tracing::debug;

const CONTENT_TYPE: &str = "Content-Type";

pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<Url>,
    headers: Vec<(String, String)>,
    body: Option<JsonBody>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            url: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: &str) -> Result<Self> {
        self.method = Some(Method::from_str(method)?);
        Ok(self)
    }

    pub fn url(mut self, raw_url: &str) -> Result<Self> {
        self.url = Some(Url::new(raw_url)?);
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value.to_string());
        self
    }

    /// Sets `Content-Type` from an alias such as `json` or `html`
    pub fn content_type(mut self, alias: &str) -> Self {
        let content_type = ContentType::from_alias(alias);
        self.set_header(CONTENT_TYPE, content_type.as_str().to_string());
        self
    }

    /// Builds the JSON body from `key=value` / `key:=value` tokens.
    ///
    /// GET requests carry no body, so their tokens are ignored. Must be
    /// called after `method`.
    pub fn params<S: AsRef<str>>(mut self, tokens: &[S]) -> Result<Self> {
        let method = self
            .method
            .ok_or_else(|| anyhow!("Method must be set before params"))?;
        if method == Method::Get {
            if !tokens.is_empty() {
                debug!(count = tokens.len(), "ignoring params for GET request");
            }
            return Ok(self);
        }

        let tree = ParamTree::parse(tokens)?;
        let json = tree.to_json().context("Failed to encode params as JSON")?;
        self.body = Some(JsonBody(json));
        Ok(self)
    }

    pub fn body(mut self, json: &Option<String>) -> Result<Self> {
        if let Some(data) = json {
            self.body = Some(JsonBody::new(data)?);
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Request> {
        Ok(Request {
            method: self.method.ok_or_else(|| anyhow!("Method is required"))?,
            url: self.url.ok_or_else(|| anyhow!("URL is required"))?,
            headers: self.headers,
            body: self.body,
        })
    }

    fn set_header(&mut self, name: &str, value: String) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, slot)) => *slot = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `Key: Value` header arguments, splitting on the first colon
pub fn parse_headers<S: AsRef<str>>(raw_headers: &[S]) -> Result<Vec<(String, String)>> {
    raw_headers
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            let (name, value) = raw.split_once(':').ok_or_else(|| {
                anyhow!("Invalid header format: '{}'. Use 'Key: Value'", raw)
            })?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
