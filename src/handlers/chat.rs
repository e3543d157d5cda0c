use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
};

use crate::constants::STREAM_CONTENT_TYPE;
use crate::error::ChatError;
use crate::models::App;
use crate::services::{validate_chat_request, GenerateParams, StreamBridge};

/// `POST /api/chat`: validate, call the upstream, stream its text back as `text/plain`.
///
/// Every failure up to and including the upstream call is turned into a JSON error
/// response. Once the body is returned, failures can only end the stream.
pub async fn chat(
    State(app): State<App>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ChatError> {
    let api_key = app.settings.credential()?;
    let body = body.map_err(|rejection| {
        log::warn!(
            "❌ Request body rejected ({}): {}",
            rejection.status(),
            rejection.body_text()
        );
        ChatError::InvalidRequest(rejection.body_text())
    })?;
    let chat = validate_chat_request(&body)?;

    let client = app.backend.connect(api_key)?;

    let model = app.settings.model.clone();
    log::info!(
        "📨 Request: model={}, contents={}, system_instruction={}",
        model,
        chat.contents.len(),
        chat.system_instruction.is_some()
    );

    let upstream = client
        .stream_generate(GenerateParams {
            model,
            contents: chat.contents,
            system_instruction: chat.system_instruction,
        })
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(StreamBridge::new(upstream)),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::constants::*;
    use crate::error::{ChatError, StreamError};
    use crate::models::{App, GenerationChunk, Message};
    use crate::services::testing::{Script, ScriptedBackend};
    use crate::services::{GenerationBackend, GenerationClient};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tower::ServiceExt;

    const TEST_KEY: &str = "AIza-unit-test-key";

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    fn configured() -> Settings {
        settings(&[(API_KEY_ENV, TEST_KEY)])
    }

    async fn post_chat(app: App, body: &str) -> Response {
        crate::build_router(app)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn texts(items: &[&str]) -> Script {
        Script::Chunks(
            items
                .iter()
                .map(|t| Ok(GenerationChunk::with_text(t)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn streams_upstream_text_as_plain_text() {
        let null_text = json!({ "candidates": [{ "content": { "parts": [{ "text": null }] } }] });
        let backend = ScriptedBackend::new(Script::Chunks(vec![
            Ok(GenerationChunk::with_text("A")),
            Ok(GenerationChunk::with_text("")),
            Ok(GenerationChunk::new(null_text)),
            Ok(GenerationChunk::with_text("B")),
        ]));
        let response = post_chat(App::new(configured(), backend), r#"{"message":"hi"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], STREAM_CONTENT_TYPE);
        assert_eq!(response.headers()["cache-control"], "no-cache");
        assert_eq!(body_text(response).await, "AB");
    }

    #[tokio::test]
    async fn message_only_request_sends_one_user_turn_with_default_model() {
        let backend = ScriptedBackend::new(texts(&["ok"]));
        let calls = backend.calls.clone();
        let keys = backend.keys.clone();

        let response = post_chat(App::new(configured(), backend), r#"{"message":"hello"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, DEFAULT_MODEL);
        assert_eq!(calls[0].contents, vec![Message::user("hello")]);
        assert_eq!(calls[0].system_instruction, None);
        assert_eq!(keys.lock().unwrap().as_slice(), [TEST_KEY.to_string()]);
    }

    #[tokio::test]
    async fn model_override_and_system_instruction_reach_upstream() {
        let backend = ScriptedBackend::new(texts(&["ok"]));
        let calls = backend.calls.clone();
        let app = App::new(
            settings(&[(API_KEY_ENV, TEST_KEY), (MODEL_ENV, "gemini-2.5-pro")]),
            backend,
        );

        let response = post_chat(
            app,
            r#"{"history":[{"role":"user","parts":[{"text":"q1"}]},{"role":"model","parts":[{"text":"a1"}]}],
                "message":"q2","systemInstruction":"be nice"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].model, "gemini-2.5-pro");
        assert_eq!(calls[0].contents.len(), 3);
        assert_eq!(calls[0].system_instruction.as_deref(), Some("be nice"));
    }

    #[tokio::test]
    async fn missing_message_and_history_is_400() {
        for body in [
            r#"{}"#,
            r#"{"history":[]}"#,
            r#"{"history":"nope"}"#,
            r#"{"message":""}"#,
            "not json",
        ] {
            let backend = ScriptedBackend::new(texts(&["unused"]));
            let calls = backend.calls.clone();
            let response = post_chat(App::new(configured(), backend), body).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
            assert_eq!(response.headers()["content-type"], "application/json");
            let json = body_json(response).await;
            assert!(json["error"].as_str().unwrap().starts_with("Invalid request"));
            assert!(calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn oversized_body_is_400_json() {
        let backend = ScriptedBackend::new(texts(&["unused"]));
        let calls = backend.calls.clone();
        let oversized = format!(r#"{{"message":"{}"}}"#, "x".repeat(MAX_BODY_SIZE));
        let response = post_chat(App::new(configured(), backend), &oversized).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_is_500_regardless_of_body() {
        for body in [r#"{"message":"hi"}"#, r#"{}"#] {
            let backend = ScriptedBackend::new(texts(&["unused"]));
            let keys = backend.keys.clone();
            let app = App::new(
                settings(&[(MODEL_ENV, "secret-model-name"), (API_KEY_ENV, "")]),
                backend,
            );
            let response = post_chat(app, body).await;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let text = body_text(response).await;
            assert!(text.contains("API_KEY environment variable not set"));
            assert!(!text.contains("secret-model-name"));
            assert!(keys.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn client_init_failure_is_500() {
        let backend = ScriptedBackend::new(Script::FailInit);
        let response = post_chat(App::new(configured(), backend), r#"{"message":"hi"}"#).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to initialize generation client"));
        assert!(!json.to_string().contains(TEST_KEY));
    }

    #[tokio::test]
    async fn upstream_rejection_is_500_with_its_message_and_no_stream() {
        let backend = ScriptedBackend::new(Script::RejectCall("quota exceeded".into()));
        let response = post_chat(App::new(configured(), backend), r#"{"message":"hi"}"#).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(body_json(response).await, json!({ "error": "quota exceeded" }));
    }

    #[tokio::test]
    async fn mid_stream_failure_errors_the_body_after_status_200() {
        let backend = ScriptedBackend::new(Script::Chunks(vec![
            Ok(GenerationChunk::with_text("A")),
            Ok(GenerationChunk::with_text("B")),
            Err(StreamError::Upstream("overloaded".into())),
        ]));
        let response = post_chat(App::new(configured(), backend), r#"{"message":"hi"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        let collected = axum::body::to_bytes(response.into_body(), usize::MAX).await;
        assert!(collected.is_err());
    }

    struct PanickingBackend;

    impl GenerationBackend for PanickingBackend {
        fn connect(&self, _api_key: &str) -> Result<Box<dyn GenerationClient>, ChatError> {
            panic!("backend exploded");
        }
    }

    #[tokio::test]
    async fn panics_become_500_json() {
        let app = App::new(configured(), PanickingBackend);
        let response = post_chat(app, r#"{"message":"hi"}"#).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "backend exploded" }));
    }

    #[tokio::test]
    async fn health_reports_model_and_credential_presence_only() {
        let app = App::new(configured(), ScriptedBackend::new(texts(&[])));
        let response = crate::build_router(app)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json,
            json!({ "status": "healthy", "model": DEFAULT_MODEL, "credential_configured": true })
        );
    }
}
