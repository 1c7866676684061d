use crate::domain::value_objects::{JsonBody, Url};
use anyhow::{Result, anyhow};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP method enum for simplicity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(anyhow!("Unsupported HTTP method: '{}'", other)),
        }
    }
}

/// Represents an HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>, // Key-value pairs for headers
    pub body: Option<JsonBody>,
}

impl Request {
    /// Renders the request the way it goes over the wire:
    /// request line, headers, blank line, body.
    pub fn pretty(&self) -> String {
        let path = self
            .url
            .0
            .path_and_query()
            .map(|pq| pq.as_str())
            .filter(|pq| !pq.is_empty())
            .unwrap_or("/");

        let mut out = format!("{} {} HTTP/1.1\r\n", self.method, path);
        if let Some(host) = self.url.0.authority() {
            out.push_str(&format!("Host: {}\r\n", host));
        }
        for (name, value) in &self.headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        if let Some(body) = &self.body {
            out.push_str("\r\n");
            out.push_str(&body.0);
        }
        out
    }
}

/// Represents an HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Everything needed to replay a request later.
///
/// A params body is not stored; it is rebuilt from `params` each time the
/// request is used, so extra params can be appended on replay. A raw `data`
/// body is stored as given and takes precedence over params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRequest {
    pub uri: String,
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

fn default_content_type() -> String {
    "json".to_string()
}
