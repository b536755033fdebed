//! Request dispatcher — glues matcher, authenticator, authorizer,
//! and forwarder together and emits the proxy's own status codes plus
//! observability signals.

use crate::authn::authenticate;
use crate::authz::authorize;
use crate::forwarder::Forwarder;
use crate::matcher::match_route;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use proxy_core::SnapshotHandle;
use proxy_observability::MetricsSink;
use std::sync::Arc;
use tracing::{debug, error, warn};

const ANONYMOUS_USER: &str = "anonymous";

pub struct Dispatcher {
    snapshots: SnapshotHandle,
    auth_headers: Vec<String>,
    forwarder: Arc<dyn Forwarder>,
    metrics: Arc<MetricsSink>,
}

impl Dispatcher {
    pub fn new(
        snapshots: SnapshotHandle,
        auth_headers: Vec<String>,
        forwarder: Arc<dyn Forwarder>,
        metrics: Arc<MetricsSink>,
    ) -> Self {
        Self {
            snapshots,
            auth_headers,
            forwarder,
            metrics,
        }
    }

    pub async fn dispatch(&self, req: Request<Body>, client_addr: String) -> Response<Body> {
        let snapshot = self.snapshots.load();

        let method = req.method().as_str().to_string();
        let host = req
            .headers()
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();

        let route = match match_route(&snapshot, &method, &path, &host) {
            Some(r) => r,
            None => {
                self.metrics.record_request(404, "");
                debug!(resource = "", code = 404, method = %method, path = %path, "dispatch: no route matched");
                return error_response(StatusCode::NOT_FOUND, "no route matched");
            }
        };
        let resource = route.resource.clone();
        let target = route.target.clone();

        let user = if route.anonymous {
            ANONYMOUS_USER.to_string()
        } else {
            match authenticate(&snapshot, req.headers(), &self.auth_headers) {
                Some(u) => u,
                None => {
                    self.metrics.record_request(401, &resource);
                    debug!(resource = %resource, code = 401, "dispatch: unauthenticated");
                    return error_response(StatusCode::UNAUTHORIZED, "unauthenticated");
                }
            }
        };

        if !route.anonymous && !authorize(&snapshot, &user, &resource, &method) {
            self.metrics.record_request(403, &resource);
            debug!(resource = %resource, code = 403, user = %user, "dispatch: forbidden");
            return error_response(StatusCode::FORBIDDEN, "forbidden");
        }

        drop(snapshot);

        match self.forwarder.forward(req, &client_addr, &target).await {
            Ok(response) => {
                self.metrics.record_request(302, &resource);
                debug!(resource = %resource, code = 302, user = %user, "dispatch: proxied");
                response
            }
            Err(e) => {
                warn!(error = %e, resource = %resource, "upstream forward failed");
                self.metrics.record_request(502, &resource);
                debug!(resource = %resource, code = 502, "dispatch: forward failed");
                error_response(StatusCode::BAD_GATEWAY, "upstream error")
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    let body = format!(r#"{{"error":"{message}","status":{}}}"#, status.as_u16());
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|e| {
            error!(error = %e, "failed to build error response");
            Response::new(Body::empty())
        })
}
