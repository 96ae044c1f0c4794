//! HTTP span helpers.

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = route_template(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Collapse dynamic segments so metric labels stay low-cardinality.
fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let template = match segments.as_slice() {
        [] => return "/".to_owned(),
        ["batch", _, _] => "/batch/{batch}/{bottle}".to_owned(),
        ["api", "batches", _] => "/api/batches/{batch}".to_owned(),
        ["refer", _] => "/refer/{code}".to_owned(),
        _ => format!("/{}", segments.join("/")),
    };

    template
}
