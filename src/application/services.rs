use crate::domain::entities::{Request, Response};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

/// Trait for HTTP clients to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Application service for orchestrating HTTP request workflows
/// This contains business logic and use cases
pub struct HttpRequestService {
    http_client: Box<dyn HttpClient>,
}

impl HttpRequestService {
    pub fn new(http_client: Box<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    /// Validates and sends a single HTTP request
    pub async fn send_request(&self, request: Request) -> Result<Response> {
        self.validate_request(&request)?;
        debug!(method = %request.method, url = %request.url.as_str(), "sending request");

        let response = self.http_client.send(request).await?;
        info!(status = %response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    fn validate_request(&self, request: &Request) -> Result<()> {
        RequestValidator::validate(request)
    }
}

/// Domain service for request validation
/// This contains domain business rules
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate(request: &Request) -> Result<()> {
        Self::validate_url(&request.url)?;
        Self::validate_method_body_combination(request)?;
        Ok(())
    }

    fn validate_url(url: &crate::domain::value_objects::Url) -> Result<()> {
        let url_str = url.as_str();

        if url_str.is_empty() {
            return Err(anyhow::anyhow!("URL cannot be empty"));
        }
        if !url_str.starts_with("http://") && !url_str.starts_with("https://") {
            return Err(anyhow::anyhow!("URL must start with http:// or https://"));
        }
        Ok(())
    }

    fn validate_method_body_combination(request: &Request) -> Result<()> {
        use crate::domain::entities::Method;

        match (&request.method, &request.body) {
            (Method::Get, Some(_)) => {
                Err(anyhow::anyhow!("GET requests should not have a body"))
            },
            _ => Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Method;
    use crate::domain::value_objects::{JsonBody, Url};
    use hyper::StatusCode;

    fn request(method: Method, url: &str, body: Option<&str>) -> Request {
        Request {
            method,
            url: Url::new(url).unwrap(),
            headers: vec![],
            body: body.map(|b| JsonBody(b.to_string())),
        }
    }

    fn ok_response(body: &str) -> Response {
        Response {
            status: StatusCode::OK,
            headers: vec![],
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn sends_valid_request_through_client() {
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.body.as_ref().map(|b| b.0.as_str()) == Some(r#"{"a":1}"#)
            })
            .times(1)
            .returning(|_| Ok(ok_response(r#"{"ok":true}"#)));

        let service = HttpRequestService::new(Box::new(client));
        let response = service
            .send_request(request(Method::Post, "http://localhost/items", Some(r#"{"a":1}"#)))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn rejects_get_with_body_before_sending() {
        let mut client = MockHttpClient::new();
        client.expect_send().never();

        let service = HttpRequestService::new(Box::new(client));
        let err = service
            .send_request(request(Method::Get, "http://localhost/", Some("{}")))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("GET requests should not have a body"));
    }

    #[tokio::test]
    async fn rejects_url_without_scheme() {
        let mut client = MockHttpClient::new();
        client.expect_send().never();

        let service = HttpRequestService::new(Box::new(client));
        let err = service
            .send_request(request(Method::Get, "localhost:8080", None))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("http://"));
    }

    #[tokio::test]
    async fn propagates_client_errors() {
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let service = HttpRequestService::new(Box::new(client));
        let err = service
            .send_request(request(Method::Delete, "http://localhost/items/1", None))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
    }
}
