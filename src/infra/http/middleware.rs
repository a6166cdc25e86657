use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Level, debug, error, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

const REQUEST_ID_HEADER: &str = "x-request-id";
const TARGET: &str = "vitrine::http::response";
const MAX_INBOUND_REQUEST_ID_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Reuse a caller-supplied request id when it is short and printable,
    /// otherwise mint a fresh one.
    fn from_request(request: &Request<Body>) -> Self {
        let inbound = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| {
                !id.is_empty()
                    && id.len() <= MAX_INBOUND_REQUEST_ID_LEN
                    && id
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            });

        Self {
            request_id: inbound
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::from_request(&request);
    let span = info_span!(
        "request",
        request_id = %ctx.request_id,
        method = %request.method(),
    );
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    // Route templates keep record ids out of the log key.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    let Some(level) = failure_level(status) else {
        debug!(
            target = TARGET,
            status = status.as_u16(),
            method = %method,
            route = %route,
            elapsed_ms,
            "request completed"
        );
        return response;
    };

    let (source, chain) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = chain.first().map(String::as_str).unwrap_or("no diagnostic available");

    if level == Level::ERROR {
        error!(
            target = TARGET,
            status = status.as_u16(),
            method = %method,
            route = %route,
            path = %path,
            elapsed_ms,
            source,
            detail,
            chain = ?chain,
            request_id = %request_id,
            "request failed"
        );
    } else {
        warn!(
            target = TARGET,
            status = status.as_u16(),
            method = %method,
            route = %route,
            path = %path,
            elapsed_ms,
            source,
            detail,
            chain = ?chain,
            request_id = %request_id,
            "client request error"
        );
    }

    response
}

fn failure_level(status: StatusCode) -> Option<Level> {
    if status.is_server_error() {
        Some(Level::ERROR)
    } else if status.is_client_error() {
        Some(Level::WARN)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_id(id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/settings");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn inbound_request_id_is_reused_when_well_formed() {
        let ctx = RequestContext::from_request(&request_with_id(Some("edge-42.a_b")));
        assert_eq!(ctx.request_id, "edge-42.a_b");
    }

    #[test]
    fn malformed_or_missing_request_id_is_replaced() {
        let long = "x".repeat(MAX_INBOUND_REQUEST_ID_LEN + 1);
        for id in [None, Some(""), Some("has space"), Some(long.as_str())] {
            let ctx = RequestContext::from_request(&request_with_id(id));
            assert!(Uuid::parse_str(&ctx.request_id).is_ok(), "{id:?}");
        }
    }

    #[test]
    fn only_error_statuses_are_escalated() {
        assert_eq!(failure_level(StatusCode::OK), None);
        assert_eq!(failure_level(StatusCode::NOT_FOUND), Some(Level::WARN));
        assert_eq!(failure_level(StatusCode::BAD_GATEWAY), Some(Level::ERROR));
    }
}
