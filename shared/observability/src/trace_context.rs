//! Trace id propagation for requests entering a kgbridge service.
//!
//! Supports W3C `traceparent` and the plain `x-trace-id` / `x-request-id` headers.

use actix_web::{HttpMessage, HttpRequest};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const SPAN_ID_HEADER: &str = "x-span-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const W3C_TRACEPARENT_HEADER: &str = "traceparent";

/// Trace context attached to every request
#[derive(Debug, Clone, Serialize)]
pub struct TraceContext {
    /// Id shared by every span of the trace
    pub trace_id: String,
    /// Id of the current span
    pub span_id: String,
    /// Span id supplied by the caller, if any
    pub parent_span_id: Option<String>,
    pub request_id: String,
}

impl TraceContext {
    /// Fresh context with newly generated ids
    pub fn new() -> Self {
        let trace_id = Uuid::new_v4().to_string();
        Self {
            trace_id: trace_id.clone(),
            span_id: generate_span_id(),
            parent_span_id: None,
            request_id: trace_id,
        }
    }

    /// Extract trace context from incoming headers, generating ids that are absent.
    pub fn from_request(req: &HttpRequest) -> Self {
        let headers = req.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        if let Some(ctx) = header(W3C_TRACEPARENT_HEADER).and_then(|tp| Self::parse_traceparent(&tp)) {
            return ctx;
        }

        let trace_id = header(TRACE_ID_HEADER).unwrap_or_else(|| Uuid::new_v4().to_string());
        let request_id = header(REQUEST_ID_HEADER).unwrap_or_else(|| trace_id.clone());

        Self {
            trace_id,
            span_id: generate_span_id(),
            parent_span_id: header(SPAN_ID_HEADER),
            request_id,
        }
    }

    /// Format: version-trace_id-parent_id-flags (e.g., "00-xxx-yyy-01")
    fn parse_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.split('-');
        let _version = parts.next()?;
        let trace_id = parts.next().filter(|p| !p.is_empty())?.to_string();
        let parent_span_id = parts.next().filter(|p| !p.is_empty())?.to_string();

        Some(Self {
            trace_id: trace_id.clone(),
            span_id: generate_span_id(),
            parent_span_id: Some(parent_span_id),
            request_id: trace_id,
        })
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trace_id={} span_id={}", self.trace_id, self.span_id)
    }
}

/// 16-character span id
fn generate_span_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

/// Trace context stored by [`crate::RequestLogging`], or a fresh one.
pub fn get_trace_context(req: &HttpRequest) -> TraceContext {
    req.extensions()
        .get::<TraceContext>()
        .cloned()
        .unwrap_or_else(TraceContext::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_traceparent_preferred() {
        let req = TestRequest::default()
            .insert_header((W3C_TRACEPARENT_HEADER, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"))
            .insert_header((TRACE_ID_HEADER, "ignored"))
            .to_http_request();

        let ctx = TraceContext::from_request(&req);
        assert_eq!(ctx.trace_id, "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(ctx.parent_span_id.as_deref(), Some("00f067aa0ba902b7"));
        assert_eq!(ctx.span_id.len(), 16);
    }

    #[test]
    fn test_custom_headers() {
        let req = TestRequest::default()
            .insert_header((TRACE_ID_HEADER, "trace-abc"))
            .to_http_request();

        let ctx = TraceContext::from_request(&req);
        assert_eq!(ctx.trace_id, "trace-abc");
        assert_eq!(ctx.request_id, "trace-abc");
        assert!(ctx.parent_span_id.is_none());
    }

    #[test]
    fn test_generated_when_absent() {
        let req = TestRequest::default().to_http_request();
        let ctx = TraceContext::from_request(&req);
        assert!(!ctx.trace_id.is_empty());
        assert_eq!(ctx.trace_id, ctx.request_id);
    }
}
