//! Request/response observation
//!
//! Connections report every parsed request and every response they send to
//! an [`Observer`] handed to them at construction. The default observer turns
//! these into structured `tracing` events; tests substitute their own to
//! inspect traffic without capturing log output.

use crate::http::request::Request;
use crate::http::response::Response;

/// Longest body prefix included in a log event.
const BODY_PREVIEW_LIMIT: usize = 200;

pub trait Observer: Send + Sync {
    /// Called once a request has been parsed, before it is routed.
    fn on_request(&self, peer: &str, request: &Request, raw_len: usize);

    /// Called after a response has been written to the client.
    fn on_response(&self, peer: &str, response: &Response);
}

/// Emits each request and response as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_request(&self, peer: &str, request: &Request, raw_len: usize) {
        tracing::info!(
            client = peer,
            method = %request.method,
            path = %request.path,
            version = %request.version,
            size = raw_len,
            "--> request"
        );
        tracing::debug!(
            client = peer,
            headers = ?request.headers,
            body = %body_preview(&request.body),
            "request detail"
        );
    }

    fn on_response(&self, peer: &str, response: &Response) {
        tracing::info!(
            client = peer,
            status = response.status.as_u16(),
            version = %response.version,
            size = response.body.len(),
            "<-- response"
        );
        tracing::debug!(
            client = peer,
            headers = ?response.headers,
            body = %body_preview(&response.body),
            "response detail"
        );
    }
}

/// Renders at most the first 200 bytes of a body for logging.
pub fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "(empty)".to_string();
    }

    let shown = &body[..body.len().min(BODY_PREVIEW_LIMIT)];
    let mut preview = String::from_utf8_lossy(shown).into_owned();

    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("... (truncated)");
    }
    preview
}
