//! HTTP transport for the document service.
//!
//! One [`ApiClient`] is built from [`ApiConfig`] and handed to every
//! endpoint function. Any failure leaving this module is an [`ApiError`].

use crate::config::ApiConfig;
use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("resumo/", env!("CARGO_PKG_VERSION"));

/// Per-call knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Replaces the client's default timeout for this call only
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Pre-configured client: fixed base URL, default timeout and JSON content type.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let inner = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::from_transport(&e))?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request. Non-2xx statuses and transport failures are
    /// normalized; there is no retry.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Form>,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let timeout = options.timeout.unwrap_or(self.timeout);
        debug!(%method, %url, ?timeout, "sending request");

        let mut request = self.inner.request(method.clone(), &url).timeout(timeout);
        if let Some(form) = body {
            // Sets multipart/form-data with its boundary, replacing the JSON default
            request = request.multipart(form);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_transport(&e);
                warn!(%method, %url, error = %e, "request failed without response");
                return Err(err);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let err = ApiError::from_response_body(status, &body);
        warn!(%method, %url, status = status.as_u16(), message = %err.message, "request rejected");
        Err(err)
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .send(Method::GET, path, None, RequestOptions::default())
            .await?;
        decode(response).await
    }

    /// POST a multipart form and decode a JSON body
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(form), options).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::from_transport(&e)
        } else {
            ApiError::undecodable(status, &e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MSG_BAD_REQUEST, MSG_FILE_TOO_LARGE, MSG_SERVER_ERROR, MSG_UNKNOWN};
    use crate::types::HealthResponse;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: server.uri(),
            timeout_ms: 60_000,
        })
        .unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/".into(),
            timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/question"), "http://localhost:8000/api/question");
        assert_eq!(client.url("api/question"), "http://localhost:8000/api/question");
        assert_eq!(client.timeout(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn get_json_sends_json_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "service": "backend"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let health: HealthResponse = client_for(&server).get_json("/").await.unwrap();
        assert!(health.ok);
        assert_eq!(health.service, "backend");
    }

    #[tokio::test]
    async fn error_statuses_are_normalized() {
        let cases = [
            (400, serde_json::json!({"detail": "empty text"}), "empty text".to_string()),
            (400, serde_json::json!({}), MSG_BAD_REQUEST.to_string()),
            (413, serde_json::json!({"detail": "big"}), MSG_FILE_TOO_LARGE.to_string()),
            (422, serde_json::json!({"detail": "not a PDF"}), "not a PDF".to_string()),
            (500, serde_json::json!({"detail": "boom"}), MSG_SERVER_ERROR.to_string()),
            (404, serde_json::json!({"detail": "Not Found"}), MSG_UNKNOWN.to_string()),
        ];

        for (status, body, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_json(body))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .get_json::<HealthResponse>("/")
                .await
                .unwrap_err();
            assert_eq!(err.status, status);
            assert_eq!(err.message, expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        // Bind then drop to get a port nothing is listening on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(&ApiConfig {
            base_url: format!("http://127.0.0.1:{port}"),
            timeout_ms: 2_000,
        })
        .unwrap();

        let err = client.get_json::<HealthResponse>("/").await.unwrap_err();
        assert_eq!(err.status, 500);
        assert!(!err.message.is_empty());
        assert!(err.detail.is_none());
    }

    #[tokio::test]
    async fn per_call_timeout_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"result": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .post_form::<crate::types::MarkdownResponse>(
                "/api/text-to-bullets",
                Form::new().text("text", "x"),
                RequestOptions::with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "Request timed out");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_json::<HealthResponse>("/")
            .await
            .unwrap_err();
        assert_eq!(err.status, 200);
        assert!(err.message.starts_with("Invalid response from server"));
    }
}
