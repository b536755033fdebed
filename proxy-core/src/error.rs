use thiserror::Error;

/// Unified error type for the proxy's config and dispatch paths.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("forwarder error: {0}")]
    Forwarder(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ProxyError::Config(msg.into())
    }

    /// Map to the HTTP status code a request handler should emit. `Config`
    /// never surfaces from a request handler — only from the reload path —
    /// so its mapping here is nominal.
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::Forwarder(_) => 502,
            ProxyError::Internal(_) | ProxyError::Io(_) | ProxyError::Config(_) => 500,
        }
    }

    /// JSON error body for a request-handler failure.
    pub fn to_json_body(&self) -> Vec<u8> {
        let status = self.status_code();
        let msg = self.to_string().replace('"', "'");
        format!(r#"{{"error":"{}","status":{}}}"#, msg, status).into_bytes()
    }
}
