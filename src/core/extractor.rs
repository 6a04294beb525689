use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::{BytesRejection, FormRejection, JsonRejection},
        ConnectInfo, FromRequest, FromRequestParts, Request,
    },
    http::{header, request::Parts, HeaderMap, StatusCode},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

fn bytes_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read body: {}", rejection.body_text()))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            AppError::BadRequest(format!("Invalid JSON data: {}", err))
        }
        JsonRejection::JsonSyntaxError(err) => {
            AppError::BadRequest(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(err) => {
            AppError::BadRequest(format!("Missing JSON content type: {}", err))
        }
        JsonRejection::BytesRejection(err) => bytes_rejection(err),
        _ => AppError::BadRequest("Failed to parse JSON body".to_string()),
    }
}

fn form_rejection(rejection: FormRejection) -> AppError {
    match rejection {
        FormRejection::FailedToDeserializeForm(err) => {
            AppError::BadRequest(format!("Invalid form data: {}", err))
        }
        FormRejection::FailedToDeserializeFormBody(err) => {
            AppError::BadRequest(format!("Invalid form data: {}", err))
        }
        FormRejection::BytesRejection(err) => bytes_rejection(err),
        _ => AppError::BadRequest("Failed to parse form body".to_string()),
    }
}

/// Body extractor for endpoints posted to by both scripts and HTML forms.
///
/// `application/x-www-form-urlencoded` bodies are decoded as a form, anything
/// else as JSON. A request without a content type and without a body yields
/// the payload's defaults, so a bare POST is a valid submission.
pub struct AppPayload<T>(pub T);

impl<T, S> FromRequest<S> for AppPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        match content_type {
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                Form::<T>::from_request(req, state)
                    .await
                    .map(|Form(value)| Self(value))
                    .map_err(form_rejection)
            }
            Some(_) => Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| Self(value))
                .map_err(json_rejection),
            None => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(bytes_rejection)?;
                if !body.is_empty() {
                    return Err(AppError::BadRequest(
                        "Missing content type for request body".to_string(),
                    ));
                }
                serde_json::from_slice(b"{}")
                    .map(Self)
                    .map_err(|e| AppError::BadRequest(format!("Missing request body: {}", e)))
            }
        }
    }
}

/// What a handler may know about the request that carried a submission:
/// who sent it, from where, and with which headers.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// `None` for anonymous requests
    pub user: Option<AuthenticatedUser>,
    pub headers: HeaderMap,
    /// Peer address, present when the server was started with connect info
    pub remote_addr: Option<SocketAddr>,
    /// Request arrived over TLS, directly or through a proxy
    pub is_secure: bool,
    pub path: String,
}

impl RequestMeta {
    /// Raw `X-Forwarded-For` value whenever the header is present, even when
    /// it is blank or not valid UTF-8
    pub fn forwarded_for(&self) -> Option<Cow<'_, str>> {
        self.headers
            .get("x-forwarded-for")
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
    }

    /// Script-driven request (`X-Requested-With: XMLHttpRequest`)
    pub fn is_ajax(&self) -> bool {
        self.headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    }

    /// A browser navigating with a regular form post rather than a script
    pub fn is_browser_navigation(&self) -> bool {
        !self.is_ajax()
            && self
                .headers
                .get(header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains("text/html"))
    }

    pub fn scheme(&self) -> &'static str {
        if self.is_secure {
            "https"
        } else {
            "http"
        }
    }
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthenticatedUser>().cloned();
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let forwarded_https = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("https"));
        let is_secure = forwarded_https || parts.uri.scheme_str() == Some("https");

        Ok(Self {
            user,
            headers: parts.headers.clone(),
            remote_addr,
            is_secure,
            path: parts.uri.path().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        comment: Option<String>,
    }

    fn post(content_type: Option<&'static str>, body: &'static str) -> Request<Body> {
        let mut builder = axum::http::Request::builder()
            .method("POST")
            .uri("/api/concerns/report");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn extract(req: Request<Body>) -> Result<Payload, AppError> {
        AppPayload::<Payload>::from_request(req, &())
            .await
            .map(|AppPayload(p)| p)
    }

    #[tokio::test]
    async fn test_payload_reads_json_and_form() {
        let json = extract(post(Some("application/json"), r#"{"comment":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(json.comment.as_deref(), Some("hi"));

        let form = extract(post(
            Some("application/x-www-form-urlencoded"),
            "comment=hello+there",
        ))
        .await
        .unwrap();
        assert_eq!(form.comment.as_deref(), Some("hello there"));
    }

    #[tokio::test]
    async fn test_payload_without_body_uses_defaults() {
        let payload = extract(post(None, "")).await.unwrap();
        assert_eq!(payload.comment, None);
    }

    #[tokio::test]
    async fn test_payload_rejects_malformed_json() {
        let result = extract(post(Some("application/json"), "{not json")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = extract(post(None, "comment=x")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_payload_over_body_limit_is_413() {
        async fn echo(AppPayload(payload): AppPayload<Payload>) -> String {
            payload.comment.unwrap_or_default()
        }

        let app = axum::Router::new()
            .route("/echo", axum::routing::post(echo))
            .layer(axum::extract::DefaultBodyLimit::max(64));
        let server = axum_test::TestServer::new(app).unwrap();
        let long = "x".repeat(256);

        let response = server
            .post("/echo")
            .json(&serde_json::json!({ "comment": long }))
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let response = server
            .post("/echo")
            .form(&[("comment", long.as_str())])
            .await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let response = server
            .post("/echo")
            .json(&serde_json::json!({ "comment": "short" }))
            .await;
        response.assert_status_ok();
        response.assert_text("short");
    }

    fn meta_with(headers: &[(&'static str, &'static str)]) -> RequestMeta {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(value));
        }
        RequestMeta {
            user: None,
            headers: map,
            remote_addr: None,
            is_secure: false,
            path: "/".to_string(),
        }
    }

    #[test]
    fn test_forwarded_for_is_returned_verbatim() {
        assert_eq!(meta_with(&[]).forwarded_for(), None);
        assert_eq!(
            meta_with(&[("x-forwarded-for", "")]).forwarded_for().as_deref(),
            Some("")
        );
        assert_eq!(
            meta_with(&[("x-forwarded-for", " 10.1.1.1")])
                .forwarded_for()
                .as_deref(),
            Some(" 10.1.1.1")
        );

        let mut meta = meta_with(&[]);
        meta.headers.insert(
            "x-forwarded-for",
            HeaderValue::from_bytes(b"10.1.1.1\xff").unwrap(),
        );
        assert_eq!(meta.forwarded_for().as_deref(), Some("10.1.1.1\u{fffd}"));
    }

    #[test]
    fn test_browser_navigation_detection() {
        assert!(meta_with(&[("accept", "text/html,application/xhtml+xml")])
            .is_browser_navigation());
        assert!(!meta_with(&[
            ("accept", "text/html"),
            ("x-requested-with", "XMLHttpRequest")
        ])
        .is_browser_navigation());
        assert!(!meta_with(&[("accept", "application/json")]).is_browser_navigation());
    }

    #[test]
    fn test_scheme_follows_security_context() {
        let mut meta = meta_with(&[]);
        assert_eq!(meta.scheme(), "http");
        meta.is_secure = true;
        assert_eq!(meta.scheme(), "https");
    }
}
