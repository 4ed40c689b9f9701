//! HTTP request logging middleware.
//!
//! Attaches a [`TraceContext`] to every request, runs the handler inside an
//! `http_request` span, echoes the trace id back in `x-trace-id`, and logs the
//! outcome with a level chosen from status code and duration.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    time::Instant,
};
use tracing::{debug, error, info, span, warn, Instrument, Level};

use crate::trace_context::{TraceContext, TRACE_ID_HEADER};

#[derive(Debug, Clone)]
pub struct RequestLoggingConfig {
    /// Service name for log attribution
    pub service_name: String,
    /// Path prefixes that are passed through without logging
    pub exclude_paths: Vec<String>,
    /// Threshold in ms for slow request warnings
    pub slow_request_threshold_ms: u64,
}

impl Default for RequestLoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "kgbridge".to_string(),
            exclude_paths: vec!["/favicon.ico".to_string()],
            slow_request_threshold_ms: 1000,
        }
    }
}

impl RequestLoggingConfig {
    pub fn for_service(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Default::default()
        }
    }

    /// Like [`for_service`](Self::for_service), with the slow threshold taken
    /// from `SLOW_REQUEST_MS` when it parses.
    pub fn from_env(name: impl Into<String>) -> Self {
        let config = Self::for_service(name);
        match std::env::var("SLOW_REQUEST_MS").ok().and_then(|v| v.trim().parse().ok()) {
            Some(ms) => config.with_slow_threshold(ms),
            None => config,
        }
    }

    pub fn with_slow_threshold(mut self, ms: u64) -> Self {
        self.slow_request_threshold_ms = ms;
        self
    }
}

#[derive(Clone)]
pub struct RequestLogging {
    config: RequestLoggingConfig,
}

impl RequestLogging {
    pub fn new(config: RequestLoggingConfig) -> Self {
        Self { config }
    }

    pub fn for_service(name: impl Into<String>) -> Self {
        Self::new(RequestLoggingConfig::for_service(name))
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggingService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct RequestLoggingService<S> {
    service: Rc<S>,
    config: RequestLoggingConfig,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = self.config.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            let method = req.method().to_string();

            if config.exclude_paths.iter().any(|p| path.starts_with(p.as_str())) {
                return service.call(req).await;
            }

            let trace_ctx = TraceContext::from_request(req.request());
            req.extensions_mut().insert(trace_ctx.clone());

            debug!(
                trace_id = %trace_ctx.trace_id,
                method = %method,
                path = %path,
                query = %req.query_string(),
                "→ request"
            );

            let request_span = span!(
                Level::INFO,
                "http_request",
                trace_id = %trace_ctx.trace_id,
                span_id = %trace_ctx.span_id,
                method = %method,
                path = %path,
                service = %config.service_name,
            );

            let start = Instant::now();
            let result = service.call(req).instrument(request_span).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(mut res) => {
                    let status_code = res.status().as_u16();

                    if let Ok(value) = HeaderValue::from_str(&trace_ctx.trace_id) {
                        res.headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }

                    if status_code >= 500 {
                        error!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← {} {} {} {}ms", method, path, status_code, duration_ms);
                    } else if status_code >= 400 {
                        warn!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← {} {} {} {}ms", method, path, status_code, duration_ms);
                    } else if duration_ms > config.slow_request_threshold_ms {
                        warn!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← SLOW {} {} {} {}ms", method, path, status_code, duration_ms);
                    } else {
                        info!(trace_id = %trace_ctx.trace_id, status = status_code, duration_ms,
                            "← {} {} {} {}ms", method, path, status_code, duration_ms);
                    }

                    Ok(res)
                }
                Err(e) => {
                    error!(
                        trace_id = %trace_ctx.trace_id,
                        duration_ms,
                        error = %e,
                        "← {} {} ERROR {}ms", method, path, duration_ms
                    );
                    Err(e)
                }
            }
        })
    }
}

/// Request logging middleware for a service
pub fn request_logging(service_name: impl Into<String>) -> RequestLogging {
    RequestLogging::new(RequestLoggingConfig::from_env(service_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_context::get_trace_context;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    async fn echo_trace(req: HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body(get_trace_context(&req).trace_id)
    }

    #[actix_web::test]
    async fn test_trace_id_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(request_logging("test"))
                .route("/echo", web::get().to(echo_trace)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/echo")
            .insert_header((TRACE_ID_HEADER, "trace-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(TRACE_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("trace-123")
        );
        let body = test::read_body(resp).await;
        assert_eq!(body, "trace-123");
    }

    #[actix_web::test]
    async fn test_excluded_path_passes_through_untraced() {
        let app = test::init_service(
            App::new()
                .wrap(request_logging("test"))
                .route("/favicon.ico", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/favicon.ico")
            .insert_header((TRACE_ID_HEADER, "trace-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert!(resp.headers().get(TRACE_ID_HEADER).is_none());
    }
}
