use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};

use crate::config::MuxOptions;
use crate::error::Status;
use crate::route::{Metadata, Route};

pub(crate) struct MuxEntry {
    pub(crate) prefix: String,
    pub(crate) routes: Vec<Route>,
}

/// Dispatches HTTP requests to registered routes.
pub struct Mux {
    options: MuxOptions,
    entries: Vec<MuxEntry>,
}

impl Mux {
    pub(crate) fn new(mut options: MuxOptions, mut entries: Vec<MuxEntry>) -> Self {
        // Header names are lowercase once parsed.
        options.metadata_prefix = options.metadata_prefix.to_ascii_lowercase();
        // Longest prefix first so `/api/users` wins over `/api`.
        entries.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { options, entries }
    }

    pub fn handle(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let path = req.uri().path().to_string();
        let route = match self.route(req.method(), &path) {
            Ok(route) => route,
            Err(status) => {
                tracing::debug!(method = %req.method(), %path, code = %status.code, "no route");
                return status_response(&status);
            }
        };

        let metadata = extract_metadata(&req, &self.options.metadata_prefix);
        match route.handler.handle(&req, &metadata) {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(status) => {
                tracing::warn!(method = %req.method(), %path, code = %status.code, message = %status.message, "call failed");
                status_response(&status)
            }
        }
    }

    fn route(&self, method: &http::Method, path: &str) -> Result<&Route, Status> {
        let mut path_matched = false;
        for entry in &self.entries {
            let Some(rest) = strip_prefix(path, &entry.prefix) else {
                continue;
            };
            for route in &entry.routes {
                if route.path == rest {
                    if route.method == *method {
                        return Ok(route);
                    }
                    path_matched = true;
                }
            }
        }
        if path_matched {
            Err(Status::unimplemented(format!("method {method} not supported for {path}")))
        } else {
            Err(Status::not_found(format!("no route for {path}")))
        }
    }
}

/// Remove `prefix` from `path`, keeping the leading `/` of the remainder.
fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn extract_metadata<T>(req: &Request<T>, prefix: &str) -> Metadata {
    req.headers()
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix)?;
            value
                .to_str()
                .ok()
                .map(|v| (key.to_string(), v.to_string()))
        })
        .collect()
}

fn json_response(status: StatusCode, body: impl Into<Vec<u8>>) -> Response<Vec<u8>> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn status_response(status: &Status) -> Response<Vec<u8>> {
    let body = serde_json::json!({ "error": status.message, "code": status.code });
    json_response(status.http_status(), body.to_string().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_keeping_slash() {
        assert_eq!(strip_prefix("/api/users/list", "/api/users"), Some("/list"));
        assert_eq!(strip_prefix("/api/users", "/api/users"), Some("/"));
        assert_eq!(strip_prefix("/api/users/", "/api/users"), Some("/"));
        assert_eq!(strip_prefix("/api/usersx", "/api/users"), None);
        assert_eq!(strip_prefix("/other", "/api"), None);
        assert_eq!(strip_prefix("/anything", ""), Some("/anything"));
    }

    #[test]
    fn metadata_uses_prefix() {
        let req = Request::builder()
            .header("x-meta-tenant", "acme")
            .header("x-meta-trace-id", "abc")
            .header("authorization", "secret")
            .body(())
            .unwrap();
        let metadata = extract_metadata(&req, "x-meta-");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("tenant").map(String::as_str), Some("acme"));
        assert_eq!(metadata.get("trace-id").map(String::as_str), Some("abc"));
    }

    #[test]
    fn error_body_shape() {
        let response = status_response(&Status::not_found("no route for /x"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "no route for /x", "code": "not_found" }));
    }
}
