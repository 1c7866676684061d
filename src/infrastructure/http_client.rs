use crate::application::services::HttpRequestService;
use crate::domain::entities::{Request, Response, Method as DomainMethod};
use crate::domain::value_objects::{JsonBody, Url};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Method, Request as HyperRequest};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use hyper_tls::HttpsConnector;
use http_body_util::{BodyExt, Full};
use tokio_native_tls::native_tls;
use tracing::debug;

/// Infrastructure implementation of HttpClient using Hyper
/// This is a low-level HTTP transport that the application service uses.
/// Both `http://` and `https://` URIs are dialed; TLS uses the platform
/// defaults.
pub struct HyperHttpClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HyperHttpClient {
    /// Fails only if the platform TLS backend cannot be initialised
    pub fn new() -> Result<Self> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let tls = native_tls::TlsConnector::new().context("Failed to initialise TLS")?;
        let connector = HttpsConnector::from((http, tokio_native_tls::TlsConnector::from(tls)));

        let client = Client::builder(TokioExecutor::new())
            .build::<HttpsConnector<HttpConnector>, Full<Bytes>>(connector);
        Ok(Self { client })
    }

    /// Creates a configured HTTP request service using this client
    pub fn create_request_service(self) -> HttpRequestService {
        HttpRequestService::new(Box::new(self))
    }
}

#[async_trait]
impl crate::application::services::HttpClient for HyperHttpClient {
    async fn send(&self, request: Request) -> Result<Response> {
        let hyper_request = RequestAdapter::to_hyper_request(request)?;
        let hyper_response = self.execute_http_request(hyper_request).await?;
        ResponseAdapter::to_domain_response(hyper_response).await
    }
}

impl HyperHttpClient {
    async fn execute_http_request(
        &self,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<hyper::Response<hyper::body::Incoming>> {
        debug!(method = %request.method(), uri = %request.uri(), "dispatching");
        self.client
            .request(request)
            .await
            .context("HTTP request execution failed")
    }
}

/// Adapter for converting domain requests to Hyper requests
struct RequestAdapter;

impl RequestAdapter {
    fn to_hyper_request(domain_request: Request) -> Result<HyperRequest<Full<Bytes>>> {
        let method = MethodAdapter::to_hyper_method(domain_request.method);
        let uri = UriAdapter::to_hyper_uri(&domain_request.url);
        let body = BodyAdapter::to_hyper_body(&domain_request.body);

        let mut builder = HyperRequest::builder()
            .method(method)
            .uri(uri);

        builder = HeaderAdapter::apply_headers(builder, &domain_request.headers)?;

        builder.body(body)
            .map_err(|e| anyhow!("Failed to build HTTP request: {}", e))
    }
}

/// Adapter for converting domain responses from Hyper responses
struct ResponseAdapter;

impl ResponseAdapter {
    async fn to_domain_response(
        hyper_response: hyper::Response<hyper::body::Incoming>,
    ) -> Result<Response> {
        let status = hyper_response.status();
        let headers = HeaderAdapter::to_domain_headers(hyper_response.headers());
        let body = Self::extract_response_body(hyper_response).await?;

        Ok(Response { status, headers, body })
    }

    async fn extract_response_body(
        response: hyper::Response<hyper::body::Incoming>,
    ) -> Result<String> {
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| anyhow!("Failed to read response body: {}", e))?
            .to_bytes();

        String::from_utf8(body_bytes.to_vec())
            .map_err(|e| anyhow!("Response body contains invalid UTF-8: {}", e))
    }
}

/// Adapter for converting domain HTTP methods to Hyper methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_hyper_method(domain_method: DomainMethod) -> Method {
        match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Delete => Method::DELETE,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Head => Method::HEAD,
            DomainMethod::Options => Method::OPTIONS,
        }
    }
}

/// Adapter for converting domain URLs to Hyper URIs
struct UriAdapter;

impl UriAdapter {
    fn to_hyper_uri(domain_url: &Url) -> &hyper::Uri {
        &domain_url.0
    }
}

/// Adapter for converting domain request bodies to Hyper bodies
struct BodyAdapter;

impl BodyAdapter {
    fn to_hyper_body(domain_body: &Option<JsonBody>) -> Full<Bytes> {
        match domain_body {
            Some(json_body) => Full::new(Bytes::from(json_body.0.clone())),
            None => Full::new(Bytes::new()),
        }
    }
}

/// Adapter for handling HTTP headers
struct HeaderAdapter;

impl HeaderAdapter {
    fn apply_headers(
        mut builder: http::request::Builder,
        headers: &[(String, String)],
    ) -> Result<http::request::Builder> {
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow!("Invalid header name '{}': {}", name, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| anyhow!("Invalid value for header '{}': {}", name, e))?;
            builder = builder.header(name, value);
        }
        Ok(builder)
    }

    fn to_domain_headers(headers: &HeaderMap) -> Vec<(String, String)> {
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::HttpClient;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn domain_request(headers: Vec<(&str, &str)>, body: Option<&str>) -> Request {
        Request {
            method: DomainMethod::Patch,
            url: Url::new("http://localhost:8080/items/1").unwrap(),
            headers: headers
                .into_iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body: body.map(|b| JsonBody(b.to_string())),
        }
    }

    #[test]
    fn converts_method_uri_and_headers() {
        let request = domain_request(
            vec![("Content-Type", "application/json"), ("X-Trace", "42")],
            Some(r#"{"a":1}"#),
        );

        let hyper_request = RequestAdapter::to_hyper_request(request).unwrap();

        assert_eq!(hyper_request.method(), Method::PATCH);
        assert_eq!(hyper_request.uri(), "http://localhost:8080/items/1");
        assert_eq!(hyper_request.headers()["content-type"], "application/json");
        assert_eq!(hyper_request.headers()["x-trace"], "42");
    }

    #[test]
    fn rejects_invalid_header_names() {
        let request = domain_request(vec![("Bad Header", "1")], None);
        assert!(RequestAdapter::to_hyper_request(request).is_err());
    }

    #[test]
    fn maps_every_method() {
        assert_eq!(MethodAdapter::to_hyper_method(DomainMethod::Head), Method::HEAD);
        assert_eq!(MethodAdapter::to_hyper_method(DomainMethod::Options), Method::OPTIONS);
        assert_eq!(MethodAdapter::to_hyper_method(DomainMethod::Delete), Method::DELETE);
    }

    #[tokio::test]
    async fn https_uri_is_dialed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hang up, so the TLS handshake fails right after connecting
        let accepted = tokio::spawn(async move { listener.accept().await.is_ok() });

        let client = HyperHttpClient::new().unwrap();
        let request = Request {
            method: DomainMethod::Get,
            url: Url::new(&format!("https://{}/", addr)).unwrap(),
            headers: vec![],
            body: None,
        };

        let result = tokio::time::timeout(Duration::from_secs(10), client.send(request))
            .await
            .expect("https request should not hang");

        assert!(result.is_err());
        assert!(accepted.await.unwrap(), "listener never saw a connection");
    }

    #[tokio::test]
    async fn connect_failure_keeps_error_chain() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HyperHttpClient::new().unwrap();
        let request = Request {
            method: DomainMethod::Get,
            url: Url::new(&format!("http://{}/", addr)).unwrap(),
            headers: vec![],
            body: None,
        };

        let err = client.send(request).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP request execution failed");
        assert!(err.chain().count() > 1);
    }
}
