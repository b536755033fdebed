//! Forwarder adapter — the thin contract over the external HTTP
//! reverse-proxy facility this crate deliberately doesn't reimplement
//! (connection pooling, HTTP/1.1 framing, trailers, websockets; `reqwest`
//! already owns them).

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use proxy_core::ProxyError;

#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Forward `req` to `target`, preserving method, path+query, headers
    /// (with `X-Forwarded-*` injected) and body; stream the upstream
    /// response back unmodified. Upstream connection/stream failures must
    /// come back as `ProxyError::Forwarder` so the dispatcher can emit 502.
    async fn forward(
        &self,
        req: Request<Body>,
        client_addr: &str,
        target: &str,
    ) -> Result<Response<Body>, ProxyError>;
}

pub struct ReqwestForwarder {
    client: reqwest::Client,
}

impl ReqwestForwarder {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forwarder for ReqwestForwarder {
    async fn forward(
        &self,
        req: Request<Body>,
        client_addr: &str,
        target: &str,
    ) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = req.into_parts();

        let mut url = target.trim_end_matches('/').to_string();
        if let Some(path_and_query) = parts.uri.path_and_query() {
            url.push_str(path_and_query.as_str());
        }

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
            .map_err(|e| ProxyError::Forwarder(format!("invalid method: {e}")))?;

        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ProxyError::Forwarder(format!("failed to buffer request body: {e}")))?;

        let mut builder = self.client.request(method, &url);
        for (name, value) in parts.headers.iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            builder = builder.header(name, value);
        }
        builder = builder
            .header("x-forwarded-for", client_addr)
            .header("x-forwarded-proto", "http");

        let upstream_response = builder
            .body(body_bytes)
            .send()
            .await
            .map_err(|e| ProxyError::Forwarder(e.to_string()))?;

        let status = StatusCode::from_u16(upstream_response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        let mut response = Response::builder().status(status);
        for (name, value) in upstream_response.headers().iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            response = response.header(name, value);
        }

        let stream = upstream_response.bytes_stream();
        let body = Body::from_stream(stream);

        response
            .body(body)
            .map_err(|e| ProxyError::Forwarder(format!("failed to build response: {e}")))
    }
}

fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
            | "host"
    )
}
