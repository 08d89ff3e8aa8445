//! Shared fixtures for the router tests: a ready-made app over the in-memory ports.

#![allow(dead_code)]

use api_lib::{
    config::Config,
    services::{
        AuthService, EvaluationService, FlashcardCache, FlashcardService, TranscriptionService,
    },
    testing::{MemoryDb, ScriptedLlm},
    web::{build_router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use study_cards_core::ports::{PortError, PortResult, SpeechToTextService};
use tower::ServiceExt;

pub const CARDS_REPLY: &str = "Question: What is the powerhouse of the cell?\nAnswer: The mitochondria.\n\
Question: What do ribosomes make?\nAnswer: Proteins from amino acids.\n\
Question: What surrounds an animal cell?\nAnswer: The plasma membrane.";

pub struct EchoStt;

#[async_trait]
impl SpeechToTextService for EchoStt {
    /// Treats the uploaded bytes as UTF-8 and splits them into segments on `|`.
    async fn transcribe_file(&self, path: &Path) -> PortResult<Vec<String>> {
        let text = std::fs::read_to_string(path).map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(text.split('|').map(str::to_string).collect())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<MemoryDb>,
    pub llm: Arc<ScriptedLlm>,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        gemini_api_key: None,
        llm_api_base: "http://localhost".to_string(),
        llm_model: "test-model".to_string(),
        llm_timeout: Duration::from_secs(5),
        openai_api_key: None,
        stt_model: "test-stt".to_string(),
        flashcard_cache_capacity: None,
        session_ttl: chrono::Duration::days(30),
        session_cookie_secure: false,
        cors_origin: "http://localhost:5173".parse().unwrap(),
    }
}

pub fn test_app(llm_reply: &str) -> TestApp {
    test_app_with_config(llm_reply, test_config())
}

pub fn test_app_with_config(llm_reply: &str, config: Config) -> TestApp {
    let config = Arc::new(config);
    let db = Arc::new(MemoryDb::default());
    let llm = Arc::new(ScriptedLlm::replying(llm_reply));

    let state = Arc::new(AppState {
        config: config.clone(),
        auth: Arc::new(AuthService::new(db.clone(), config.session_ttl)),
        flashcards: Arc::new(FlashcardService::new(
            Some(llm.clone()),
            FlashcardCache::unbounded(),
        )),
        transcription: Arc::new(TranscriptionService::new(Some(Arc::new(EchoStt)))),
        evaluation: Arc::new(EvaluationService::new(Some(llm.clone()))),
    });

    TestApp {
        router: build_router(state),
        db,
        llm,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registers and logs in a user, returning the `Cookie` header value to send back.
    pub async fn login_as(&self, email: &str) -> String {
        let body = serde_json::json!({ "username": "tester", "email": email, "password": "s3cret-pass" });
        let response = self.send(json_request("POST", "/api/register", &body, None)).await;
        assert_eq!(response.status(), 200);

        let body = serde_json::json!({ "email": email, "password": "s3cret-pass" });
        let response = self.send(json_request("POST", "/api/login", &body, None)).await;
        assert_eq!(response.status(), 200);
        session_cookie(&response).expect("login sets a session cookie")
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn multipart_request(uri: &str, field_name: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let boundary = "study-cards-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// The `name=value` part of the response's `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
