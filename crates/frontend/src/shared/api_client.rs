//! HTTP client for the assessment backend.
//!
//! Every call carries the session's bearer token and a hard timeout. Failures
//! come back as [`ApiError`] with a human-readable message; a 401 clears the
//! session and sends the browser to the login page instead.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use contracts::dashboards::d400_program_results::ResultsError;
use contracts::domain::a002_indicator_response::evidence::EvidenceError;
use contracts::shared::validation::ValidationError;
use gloo_timers::callback::Timeout;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Blob, FormData, Request, RequestInit, RequestMode, Response};

use crate::shared::api_utils::api_url;
use crate::shared::config::ApiConfig;
use crate::system::auth::session::Session;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("The server did not respond within {after_ms} ms")]
    Timeout { after_ms: u32 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    /// Stale write: somebody else saved the record first
    #[error("{0}")]
    Conflict(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Results(#[from] ResultsError),
    #[error(transparent)]
    Evidence(#[from] EvidenceError),
}

impl ApiError {
    /// Short category tag for callers that branch on the kind of failure
    pub fn details_type(&self) -> &'static str {
        match self {
            ApiError::Timeout { .. } => "timeout",
            ApiError::Network(_) => "network",
            ApiError::Http { .. } => "http",
            ApiError::Conflict(_) => "conflict",
            ApiError::Decode(_) => "decode",
            ApiError::Validation(_) | ApiError::Results(_) | ApiError::Evidence(_) => {
                "validation"
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Conflict(_) => Some(409),
            _ => None,
        }
    }
}

/// Message for a failed response: the JSON body's `message`, `error` or
/// `detail` field when present, otherwise "HTTP error: {status}".
pub fn http_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error: {}", status))
}

pub fn error_for_status(status: u16, body: &str) -> ApiError {
    let message = http_error_message(status, body);
    if status == 409 {
        ApiError::Conflict(message)
    } else {
        ApiError::Http { status, message }
    }
}

/// Maps a rejected fetch promise. An abort triggered by our own timer is a
/// timeout; anything else is a transport failure.
pub fn transport_error(timed_out: bool, timeout_ms: u32, err: &JsValue) -> ApiError {
    classify_failure(timed_out, timeout_ms, || {
        err.dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| err.as_string())
            .unwrap_or_else(|| "server unreachable".to_string())
    })
}

/// `detail` is only read for network failures
fn classify_failure(
    timed_out: bool,
    timeout_ms: u32,
    detail: impl FnOnce() -> String,
) -> ApiError {
    if timed_out {
        ApiError::Timeout {
            after_ms: timeout_ms,
        }
    } else {
        ApiError::Network(detail())
    }
}

fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

fn js_error(context: &str, err: JsValue) -> ApiError {
    ApiError::Network(format!("{}: {:?}", context, err))
}

enum RequestBody<'a> {
    Empty,
    Json(String),
    Form(&'a FormData),
}

/// Response whose body has not been read yet. Keeps the timeout armed until
/// the body is consumed.
struct InFlight {
    response: Response,
    timed_out: Rc<Cell<bool>>,
    timeout_ms: u32,
    _timer: Timeout,
}

impl InFlight {
    async fn text(self) -> Result<String, ApiError> {
        let promise = self
            .response
            .text()
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;
        let value = JsFuture::from(promise)
            .await
            .map_err(|e| transport_error(self.timed_out.get(), self.timeout_ms, &e))?;
        value
            .as_string()
            .ok_or_else(|| ApiError::Decode("response body is not text".to_string()))
    }

    async fn blob(self) -> Result<Blob, ApiError> {
        let promise = self
            .response
            .blob()
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;
        let value = JsFuture::from(promise)
            .await
            .map_err(|e| transport_error(self.timed_out.get(), self.timeout_ms, &e))?;
        value
            .dyn_into::<Blob>()
            .map_err(|_| ApiError::Decode("response body is not a blob".to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    session: Session,
    config: Arc<ApiConfig>,
}

impl ApiClient {
    pub fn new(session: Session, config: ApiConfig) -> Self {
        Self {
            session,
            config: Arc::new(config),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send("GET", path, RequestBody::Empty).await?.text().await?;
        decode_json(&text)
    }

    /// Untyped GET for payloads that go through boundary validation
    pub async fn get_value(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(path).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::Decode(format!("serialize error: {}", e)))?;
        let text = self
            .send("POST", path, RequestBody::Json(body))
            .await?
            .text()
            .await?;
        decode_json(&text)
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &FormData,
    ) -> Result<T, ApiError> {
        let text = self
            .send("POST", path, RequestBody::Form(form))
            .await?
            .text()
            .await?;
        decode_json(&text)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        // Body is drained so the timeout also covers it
        self.send("DELETE", path, RequestBody::Empty).await?.text().await?;
        Ok(())
    }

    pub async fn get_blob(&self, path: &str) -> Result<Blob, ApiError> {
        self.send("GET", path, RequestBody::Empty).await?.blob().await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: RequestBody<'_>,
    ) -> Result<InFlight, ApiError> {
        let url = api_url(&self.config, path);
        let controller = AbortController::new().map_err(|e| js_error("abort controller", e))?;

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        opts.set_signal(Some(&controller.signal()));
        let is_json = matches!(body, RequestBody::Json(_));
        match body {
            RequestBody::Empty => {}
            RequestBody::Json(text) => opts.set_body(&JsValue::from_str(&text)),
            RequestBody::Form(form) => opts.set_body(form),
        }

        let request =
            Request::new_with_str_and_init(&url, &opts).map_err(|e| js_error("request", e))?;
        let headers = request.headers();
        headers
            .set("Accept", "application/json")
            .map_err(|e| js_error("headers", e))?;
        if is_json {
            headers
                .set("Content-Type", "application/json")
                .map_err(|e| js_error("headers", e))?;
        }
        if let Some(auth) = self.session.authorization_header() {
            headers
                .set("Authorization", &auth)
                .map_err(|e| js_error("headers", e))?;
        }

        let window =
            web_sys::window().ok_or_else(|| ApiError::Network("no window".to_string()))?;

        let timeout_ms = self.config.request_timeout_ms;
        let timed_out = Rc::new(Cell::new(false));
        let timer = {
            let timed_out = timed_out.clone();
            let controller = controller.clone();
            Timeout::new(timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let response: Response = match JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(value) => value
                .dyn_into()
                .map_err(|_| ApiError::Decode("fetch did not return a Response".to_string()))?,
            Err(err) => {
                let error = transport_error(timed_out.get(), timeout_ms, &err);
                log::warn!("{} {} failed: {}", method, path, error);
                return Err(error);
            }
        };

        if response.status() == 401 {
            self.redirect_to_login();
            // The caller's future is abandoned: no error reaches it
            return std::future::pending().await;
        }

        let in_flight = InFlight {
            response,
            timed_out,
            timeout_ms,
            _timer: timer,
        };

        if !in_flight.response.ok() {
            let status = in_flight.response.status();
            let body = in_flight.text().await.unwrap_or_default();
            let error = error_for_status(status, &body);
            log::warn!("{} {} -> {}: {}", method, path, status, error);
            return Err(error);
        }

        Ok(in_flight)
    }

    fn redirect_to_login(&self) {
        log::warn!("Session rejected by the server, redirecting to login");
        self.session.clear();
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.location().set_href(&self.config.login_path) {
                log::error!("Failed to redirect to login: {:?}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_prefers_json_body() {
        assert_eq!(
            http_error_message(422, r#"{"message":"Evaluation is required"}"#),
            "Evaluation is required"
        );
        assert_eq!(
            http_error_message(400, r#"{"error":"Bad program id"}"#),
            "Bad program id"
        );
        assert_eq!(http_error_message(500, "<html>oops</html>"), "HTTP error: 500");
        assert_eq!(http_error_message(404, r#"{"message":""}"#), "HTTP error: 404");
    }

    #[test]
    fn test_conflict_status_becomes_conflict_error() {
        let error = error_for_status(409, r#"{"message":"Response was changed by another user"}"#);
        assert_eq!(
            error,
            ApiError::Conflict("Response was changed by another user".to_string())
        );
        assert_eq!(error.details_type(), "conflict");
        assert_eq!(error.status(), Some(409));
    }

    #[test]
    fn test_details_type_distinguishes_timeout() {
        let timeout = ApiError::Timeout { after_ms: 10_000 };
        assert_eq!(timeout.details_type(), "timeout");
        assert_eq!(
            timeout.to_string(),
            "The server did not respond within 10000 ms"
        );
        assert_eq!(ApiError::Network("down".into()).details_type(), "network");
        assert_eq!(
            error_for_status(503, "").details_type(),
            "http"
        );
    }

    #[test]
    fn test_aborted_fetch_after_deadline_is_a_timeout() {
        let error = transport_error(true, 10_000, &JsValue::UNDEFINED);
        assert_eq!(error, ApiError::Timeout { after_ms: 10_000 });
        assert_eq!(error.details_type(), "timeout");
    }

    #[test]
    fn test_failed_fetch_before_deadline_is_a_network_error() {
        let error = classify_failure(false, 10_000, || "Failed to fetch".to_string());
        assert_eq!(error, ApiError::Network("Failed to fetch".to_string()));
        assert_eq!(error.details_type(), "network");

        let timeout = classify_failure(true, 10_000, || unreachable!("detail is not needed"));
        assert_eq!(timeout.details_type(), "timeout");
    }

    #[test]
    fn test_validation_errors_keep_their_message() {
        let error: ApiError = EvidenceError::EmptyUrl.into();
        assert_eq!(error.details_type(), "validation");
        assert_eq!(error.to_string(), "Please enter a URL");
    }
}
