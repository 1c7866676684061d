use anyhow::{anyhow, Result};
use hyper::http::Uri;
use serde_json::Value;

/// Represents a validated URL
#[derive(Debug, Clone)]
pub struct Url(pub Uri);


impl Url {
    /// Creates a new Url with validation
    ///
    /// # Arguments
    /// * `url` - The URL string to parse
    ///
    /// # Returns
    /// * `Ok(Url)` - Validated URL
    /// * `Err(anyhow::Error)` - If the URL is invalid
    pub fn new(url: &str) -> Result<Self> {
        let uri = url.parse::<Uri>().map_err(|e| anyhow!("Invalid URL: {}", e))?;
        Ok(Url(uri))
    }

    /// Returns the URL as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

/// Represents a validated JSON body
#[derive(Debug, Clone)]
pub struct JsonBody(pub String);

impl JsonBody {
    /// Creates a new JsonBody with validation
    ///
    /// # Arguments
    /// * `json` - The JSON string to validate
    ///
    /// # Returns
    /// * `Ok(JsonBody)` - Validated JSON
    /// * `Err(anyhow::Error)` - If the JSON is invalid
    pub fn new(json: &str) -> Result<Self> {
        serde_json::from_str::<Value>(json)
            .map_err(|e| anyhow!("Invalid JSON: {}", e))?;
        Ok(JsonBody(json.to_string()))
    }
}

/// Content type of the request body, resolved from a short alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType(String);

impl ContentType {
    pub const JSON: &'static str = "json";
    pub const HTML: &'static str = "html";

    /// `json` and `html` expand to their MIME types; anything else is
    /// taken as a MIME type already.
    pub fn from_alias(alias: &str) -> Self {
        let mime = match alias {
            Self::JSON => "application/json",
            Self::HTML => "text/html",
            other => other,
        };
        ContentType(mime.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
