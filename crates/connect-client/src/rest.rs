//! hyper-backed implementation of the Connect REST client.
//!
//! One pooled HTTP/1 client per [`HttpConnectClient`]; clones share the
//! pool. Each call is bounded by [`ClientOptions::request_timeout`].

use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::{ApiFuture, ConnectApi};
use crate::error::{ConnectError, ConnectResult};
use crate::types::*;

const USER_AGENT_VALUE: &str = concat!("connect-client/", env!("CARGO_PKG_VERSION"));

/// Tunables for [`HttpConnectClient`].
#[derive(Clone)]
pub struct ClientOptions {
    /// Upper bound for one request, including reading the body.
    pub request_timeout: Duration,
    /// Sent with every request, e.g. `authorization` for secured workers.
    pub default_headers: HeaderMap,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientOptions {
    /// Add a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> ConnectResult<Self> {
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| ConnectError::Protocol(format!("invalid header name {name:?}: {e}")))?;
        let mut value = HeaderValue::from_str(value.trim())
            .map_err(|e| ConnectError::Protocol(format!("invalid value for header {name}: {e}")))?;
        value.set_sensitive(true);
        self.default_headers.append(name, value);
        Ok(self)
    }
}

// Header values may carry credentials; only names are printed.
impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("request_timeout", &self.request_timeout)
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Client for one Kafka Connect cluster.
#[derive(Clone)]
pub struct HttpConnectClient {
    /// Base URL without trailing slash, e.g. `http://connect:8083`.
    base_url: String,
    options: ClientOptions,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl std::fmt::Debug for HttpConnectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnectClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish()
    }
}

impl HttpConnectClient {
    /// Create a client for the cluster at `base_url` (`http://host:port[/prefix]`).
    pub fn new(base_url: &str, options: ClientOptions) -> ConnectResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let uri: Uri = trimmed
            .parse()
            .map_err(|e| ConnectError::Protocol(format!("invalid base URL {trimmed:?}: {e}")))?;

        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(ConnectError::Protocol(format!(
                "base URL must be http://host[:port], got {trimmed:?}"
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            base_url: trimmed.to_string(),
            options,
            client,
        })
    }

    /// The normalized base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Connectors ─────────────────────────────────────────────────

    /// `GET /connectors`
    pub async fn list_connectors(&self) -> ConnectResult<Vec<ConnectorName>> {
        self.get_json("/connectors", "connectors").await
    }

    /// `GET /connectors/{name}`
    pub async fn connector_info(&self, name: &str) -> ConnectResult<ConnectorInfo> {
        self.get_json(&connector_path(name, ""), name).await
    }

    /// `GET /connectors/{name}/config`
    pub async fn connector_config(&self, name: &str) -> ConnectResult<ConnectorConfig> {
        self.get_json(&connector_path(name, "/config"), name).await
    }

    /// `GET /connectors/{name}/status`
    pub async fn connector_status(&self, name: &str) -> ConnectResult<ConnectorStatus> {
        self.get_json(&connector_path(name, "/status"), name).await
    }

    /// `POST /connectors`
    pub async fn create_connector(&self, request: &NewConnector) -> ConnectResult<ConnectorInfo> {
        self.send_json(Method::POST, "/connectors", request, &request.name)
            .await
    }

    /// `PUT /connectors/{name}/config` — creates the connector if absent.
    pub async fn update_connector_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> ConnectResult<ConnectorInfo> {
        self.send_json(Method::PUT, &connector_path(name, "/config"), config, name)
            .await
    }

    /// `DELETE /connectors/{name}`
    pub async fn delete_connector(&self, name: &str) -> ConnectResult<()> {
        self.send_empty(Method::DELETE, &connector_path(name, ""), name)
            .await
    }

    /// `PUT /connectors/{name}/pause`
    pub async fn pause_connector(&self, name: &str) -> ConnectResult<()> {
        self.send_empty(Method::PUT, &connector_path(name, "/pause"), name)
            .await
    }

    /// `PUT /connectors/{name}/resume`
    pub async fn resume_connector(&self, name: &str) -> ConnectResult<()> {
        self.send_empty(Method::PUT, &connector_path(name, "/resume"), name)
            .await
    }

    /// `POST /connectors/{name}/restart`
    pub async fn restart_connector(&self, name: &str) -> ConnectResult<()> {
        self.send_empty(Method::POST, &connector_path(name, "/restart"), name)
            .await
    }

    /// `POST /connectors/{name}/tasks/{id}/restart`
    pub async fn restart_task(&self, name: &str, task_id: u32) -> ConnectResult<()> {
        let path = connector_path(name, &format!("/tasks/{task_id}/restart"));
        self.send_empty(Method::POST, &path, &format!("{name}/tasks/{task_id}"))
            .await
    }

    // ── Plugins ────────────────────────────────────────────────────

    /// `GET /connector-plugins`
    pub async fn list_connector_plugins(&self) -> ConnectResult<Vec<ConnectorPlugin>> {
        self.get_json("/connector-plugins", "connector-plugins").await
    }

    /// `PUT /connector-plugins/{plugin}/config/validate`
    pub async fn validate_connector_config(
        &self,
        plugin: &str,
        config: &ConnectorConfig,
    ) -> ConnectResult<ConfigValidation> {
        let path = format!("/connector-plugins/{}/config/validate", encode_segment(plugin));
        self.send_json(Method::PUT, &path, config, plugin).await
    }

    // ── Plumbing ───────────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> ConnectResult<T> {
        let body = self.execute(Method::GET, path, None, resource).await?;
        decode(&body)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
        resource: &str,
    ) -> ConnectResult<T> {
        let encoded = serde_json::to_vec(payload)
            .map_err(|e| ConnectError::Protocol(format!("failed to encode request: {e}")))?;
        let body = self.execute(method, path, Some(encoded), resource).await?;
        decode(&body)
    }

    async fn send_empty(&self, method: Method, path: &str, resource: &str) -> ConnectResult<()> {
        self.execute(method, path, None, resource).await.map(|_| ())
    }

    /// Issue one request and return the body of a 2xx response.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        resource: &str,
    ) -> ConnectResult<Bytes> {
        let uri = format!("{}{}", self.base_url, path);

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE);
        for (name, value) in &self.options.default_headers {
            builder = builder.header(name, value);
        }
        if payload.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let req = builder
            .body(Full::new(Bytes::from(payload.unwrap_or_default())))
            .map_err(|e| ConnectError::Protocol(format!("invalid request {uri}: {e}")))?;

        let timeout = self.options.request_timeout;
        let exchange = async {
            let resp: http::Response<Incoming> = self
                .client
                .request(req)
                .await
                .map_err(|e| ConnectError::Transport(format!("{method} {uri}: {e}")))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| ConnectError::Transport(format!("{method} {uri}: {e}")))?
                .to_bytes();
            Ok::<_, ConnectError>((status, body))
        };

        let (status, body) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ConnectError::DeadlineExceeded(timeout))??;

        debug!(%method, %uri, status = status.as_u16(), bytes = body.len(), "connect request completed");
        check_status(status, body, resource)
    }
}

impl ConnectApi for HttpConnectClient {
    fn list_connectors(&self) -> ApiFuture<'_, Vec<ConnectorName>> {
        Box::pin(HttpConnectClient::list_connectors(self))
    }

    fn connector_status<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ConnectorStatus> {
        Box::pin(HttpConnectClient::connector_status(self, name))
    }
}

/// Translate an HTTP status into the client's error taxonomy.
fn check_status(status: StatusCode, body: Bytes, resource: &str) -> ConnectResult<Bytes> {
    if status.is_success() {
        return Ok(body);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ConnectError::NotFound(resource.to_string()));
    }

    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());

    Err(ConnectError::Api {
        status: status.as_u16(),
        message,
    })
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ConnectResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| ConnectError::Protocol(format!("unexpected response body: {e}")))
}

fn connector_path(name: &str, suffix: &str) -> String {
    format!("/connectors/{}{}", encode_segment(name), suffix)
}

/// Percent-encode a single path segment (RFC 3986 unreserved set kept as-is).
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
