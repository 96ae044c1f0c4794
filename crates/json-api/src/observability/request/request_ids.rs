//! Request IDs: reuse the edge's identifier when it is sane, otherwise mint one.

use salvo::http::{HeaderMap, StatusCode, header::HeaderValue};
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ray ID stamped on every request that passed through Cloudflare.
pub(super) const CF_RAY_HEADER: &str = "cf-ray";

const MAX_REQUEST_ID_LEN: usize = 128;

/// The first acceptable id from `x-request-id` then `cf-ray`, or a fresh UUIDv7.
pub(super) fn resolve_request_id(headers: &HeaderMap) -> String {
    [REQUEST_ID_HEADER, CF_RAY_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name)?.to_str().ok())
        .map(str::trim)
        .find(|value| is_acceptable(value))
        .map_or_else(generate_request_id, str::to_string)
}

pub(super) fn request_id_header(request_id: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(request_id).ok()
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

fn is_acceptable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|byte| byte.is_ascii_graphic())
}

fn generate_request_id() -> String {
    Uuid::now_v7().to_string()
}
