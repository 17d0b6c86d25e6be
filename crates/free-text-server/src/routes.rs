//! HTTP endpoints

use crate::engine::FreeTextEngine;
use crate::error::{Result, ServerError};
use agent_suql::executor::{AnswerRequest, FreeTextReply, SummaryRequest, TypePrompt};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FreeTextEngine>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/answer", post(answer))
        .route("/summary", post(summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<FreeTextReply>> {
    let text = request.text.ok_or(ServerError::MissingField("text"))?;
    let question = request.question.ok_or(ServerError::MissingField("question"))?;
    let type_prompt = request.type_prompt.as_deref().and_then(TypePrompt::parse);

    let result = state.engine.answer(text, &question, type_prompt).await?;
    Ok(Json(FreeTextReply { result }))
}

pub async fn summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<FreeTextReply>> {
    let text = request.text.ok_or(ServerError::MissingField("text"))?;
    let result = state.engine.summary(text).await?;
    Ok(Json(FreeTextReply { result }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::engine::NO_INFORMATION;
    use crate::engine::tests::{RecordingGenerator, engine};
    use agent_suql::executor::TextInput;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn state(reply: &str) -> (AppState, Arc<RecordingGenerator>) {
        let generator = RecordingGenerator::new(reply);
        let engine = engine(generator.clone(), ServerConfig::default());
        (
            AppState {
                engine: Arc::new(engine),
            },
            generator,
        )
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await.0, HealthResponse { status: "ok" });
    }

    #[tokio::test]
    async fn test_answer_endpoint() {
        let (state, generator) = state("2023-11-20");
        let request = AnswerRequest {
            text: Some(TextInput::One("Listed on 2023-11-20".into())),
            question: Some("When was it listed?".into()),
            type_prompt: Some("date".into()),
        };

        let Json(reply) = answer(State(state), Json(request)).await.unwrap();
        assert_eq!(reply.result, "2023-11-20");
        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].bindings["type_prompt"].as_str().unwrap().contains("date format"));
    }

    #[tokio::test]
    async fn test_unknown_type_prompt_is_ignored() {
        let (state, generator) = state("yes");
        let request = AnswerRequest {
            text: Some(TextInput::One("doc".into())),
            question: Some("q".into()),
            type_prompt: Some("boolean".into()),
        };

        answer(State(state), Json(request)).await.unwrap();
        assert_eq!(generator.requests.lock().unwrap()[0].bindings["type_prompt"], "");
    }

    #[tokio::test]
    async fn test_missing_question_is_bad_request() {
        let (state, _) = state("x");
        let request = AnswerRequest {
            text: Some(TextInput::One("doc".into())),
            question: None,
            type_prompt: None,
        };

        let err = answer(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summary_endpoint() {
        let (state, _) = state("A summary");
        let Json(reply) = summary(
            State(state.clone()),
            Json(SummaryRequest {
                text: Some(TextInput::Many(Vec::new())),
            }),
        )
        .await
        .unwrap();
        assert_eq!(reply.result, NO_INFORMATION);

        let err = summary(State(state), Json(SummaryRequest { text: None }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generation_failure_is_bad_gateway() {
        let (state, _) = state("");
        let request = AnswerRequest {
            text: Some(TextInput::One("doc".into())),
            question: Some("q".into()),
            type_prompt: None,
        };

        let err = answer(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_router_builds() {
        let (state, _) = state("x");
        let _router = build_router(state);
    }
}
