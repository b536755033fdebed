use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// `proxy_requests_total{code,resource}` and `internal_errors_total{code}` —
/// the two counters the dispatcher emits, exposed as Prometheus text
/// exposition on the metrics port.
pub struct MetricsSink {
    registry: Registry,
    requests_total: IntCounterVec,
    internal_errors_total: IntCounterVec,
}

impl MetricsSink {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("proxy_requests_total", "Total requests handled by the proxy"),
            &["code", "resource"],
        )?;
        let internal_errors_total = IntCounterVec::new(
            Opts::new("internal_errors_total", "Total internal errors raised by the proxy"),
            &["code"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(internal_errors_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            internal_errors_total,
        })
    }

    /// Record one dispatched request outcome. `resource` is `""` for routes
    /// that never resolved (404) — there's no resource label to attach yet.
    pub fn record_request(&self, code: u16, resource: &str) {
        self.requests_total
            .with_label_values(&[&code.to_string(), resource])
            .inc();
    }

    pub fn record_internal_error(&self, code: u16) {
        self.internal_errors_total
            .with_label_values(&[&code.to_string()])
            .inc();
    }

    pub fn gather_text(&self) -> String {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer).unwrap_or_default();
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_appears_in_text_exposition() {
        let sink = MetricsSink::new().unwrap();
        sink.record_request(200, "api");
        let text = sink.gather_text();
        assert!(text.contains("proxy_requests_total"));
        assert!(text.contains("code=\"200\""));
        assert!(text.contains("resource=\"api\""));
    }

    #[test]
    fn test_record_internal_error_appears_in_text_exposition() {
        let sink = MetricsSink::new().unwrap();
        sink.record_internal_error(500);
        let text = sink.gather_text();
        assert!(text.contains("internal_errors_total"));
        assert!(text.contains("code=\"500\""));
    }

    #[test]
    fn test_multiple_requests_accumulate() {
        let sink = MetricsSink::new().unwrap();
        sink.record_request(200, "api");
        sink.record_request(200, "api");
        let text = sink.gather_text();
        assert!(text.contains("proxy_requests_total{code=\"200\",resource=\"api\"} 2"));
    }
}
