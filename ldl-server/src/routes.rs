//! Route definitions and request handlers.
//!
//! Four endpoints: home, the two liveness probes, chat, and upload. Handlers
//! validate input, delegate to the session store / generator / extractor,
//! and serialize the result. Failures are logged with full detail and
//! reported to the client as generic messages only.

use crate::extract;
use crate::generate::ResponseGenerator;
use crate::session::{SessionStore, DEFAULT_USER_ID};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub generator: Arc<ResponseGenerator>,
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// The user's message; no length validation is applied.
    pub message: String,
    /// Caller identity; unidentified callers share one conversation.
    #[serde(rename = "userId", default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Chat response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Upload response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadReply {
    pub message: String,
}

/// Error response body for JSON errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Build the application router.
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/chat-health", get(chat_health_handler))
        .route("/upload-health", get(upload_health_handler))
        .route("/chat", post(chat_handler))
        .route("/upload", post(upload_handler))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Home and Health Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn home_handler() -> &'static str {
    "Hello World"
}

async fn chat_health_handler() -> &'static str {
    "Chat route is working"
}

async fn upload_health_handler() -> &'static str {
    "Upload route is working"
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Handle a chat message.
///
/// Holds the user's session lock for the whole read-generate-record
/// sequence, so concurrent requests for the same user serialize and the
/// conversation stays coherent. The generator picks the document-aware
/// prompt automatically when the session holds uploaded text.
async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorResponse>)> {
    let session = state.sessions.session(&body.user_id).await;
    let mut session = session.lock().await;

    let response = state
        .generator
        .generate(&mut session, &body.message)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %body.user_id, "Failed to generate response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error generating response.".into(),
                    code: "GENERATION_ERROR".into(),
                }),
            )
        })?;

    Ok(Json(ChatReply { response }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Upload Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Handle a document upload.
///
/// Expects a multipart field named `document` holding PDF bytes, plus an
/// optional `userId` field. The extracted text replaces any previously
/// stored document for that user.
async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut user_id = default_user_id();
    let mut document: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed multipart upload");
                return (StatusCode::BAD_REQUEST, "No files were uploaded.").into_response();
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("userId") => {
                if let Ok(value) = field.text().await {
                    if !value.is_empty() {
                        user_id = value;
                    }
                }
            }
            Some("document") => match field.bytes().await {
                Ok(bytes) => document = Some(bytes.to_vec()),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read uploaded document");
                    return processing_error();
                }
            },
            _ => {}
        }
    }

    let Some(bytes) = document else {
        return (StatusCode::BAD_REQUEST, "No files were uploaded.").into_response();
    };

    // PDF parsing is synchronous and CPU-bound; keep it off the runtime.
    let extracted = tokio::task::spawn_blocking(move || extract::extract_from_bytes(&bytes)).await;

    match extracted {
        Ok(Ok(text)) => {
            state.sessions.set_document(&user_id, text).await;
            tracing::info!(user_id = %user_id, "Document uploaded and processed");
            Json(UploadReply {
                message: "Document uploaded and processed successfully.".into(),
            })
            .into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, user_id = %user_id, "Error processing document");
            processing_error()
        }
        Err(e) => {
            tracing::error!(error = %e, "Extraction task failed");
            processing_error()
        }
    }
}

fn processing_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Error processing document.".into(),
            code: "DOCUMENT_ERROR".into(),
        }),
    )
        .into_response()
}
