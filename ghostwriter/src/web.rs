//! HTTP routes: the generate endpoint and server-hosted stories.
//!
//! Each story is a [`TurnController`] behind its own async mutex. The map of
//! stories is bounded by [`AppState::max_stories`] and stories are removed
//! with `DELETE /api/stories/{id}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use completion::Client;
use ghostwriter_core::{
    api::{ErrorBody, ErrorDetail, GenerateRequest, GenerateResponse, GenerateResult},
    CompletionWriter, Locale, LocaleStrings, LocaleSwitch, Sentence, TranscriptEntry,
    TurnController, TurnError, TurnOutcome, TurnState, WriterError,
};

use crate::config::Upstream;

const GENERIC_ERROR: &str = "An error occurred during your request.";
const MISSING_KEY: &str = "API key not configured";

/// Stories hosted at once unless configured otherwise.
pub const DEFAULT_MAX_STORIES: usize = 1024;

/// Stories in progress, one controller each.
pub type StoryMap = HashMap<Uuid, Arc<Mutex<TurnController>>>;

/// State shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<Upstream>,
    pub stories: Arc<RwLock<StoryMap>>,
    pub max_stories: usize,
}

impl AppState {
    pub fn new(upstream: Upstream) -> Self {
        Self {
            upstream: Arc::new(upstream),
            stories: Arc::new(RwLock::new(HashMap::new())),
            max_stories: DEFAULT_MAX_STORIES,
        }
    }

    pub fn with_max_stories(mut self, max_stories: usize) -> Self {
        self.max_stories = max_stories;
        self
    }

    /// A writer that calls upstream with the caller's key.
    fn writer(&self, api_key: &str) -> CompletionWriter {
        let client = Client::new(api_key).with_base_url(&self.upstream.api_base);
        CompletionWriter::new(client).with_config(self.upstream.writer.clone())
    }

    async fn story(&self, id: Uuid) -> Result<Arc<Mutex<TurnController>>, ApiError> {
        self.stories
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("No story with id {id}")))
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/generate", post(generate))
        .route("/api/locales", get(locales))
        .route("/api/stories", post(create_story))
        .route("/api/stories/{id}", get(get_story).delete(delete_story))
        .route("/api/stories/{id}/turns", post(submit_turn))
        .route("/api/stories/{id}/locale", post(switch_locale))
        .with_state(state)
}

const INDEX: &str = "Ghost writer
POST /api/generate
GET /api/locales
POST /api/stories
GET /api/stories/{id}
DELETE /api/stories/{id}
POST /api/stories/{id}/turns
POST /api/stories/{id}/locale
";

pub async fn index() -> &'static str {
    info!("index requested");
    INDEX
}

/// Forward one window to the completion API.
///
/// Errors keep the upstream status and message when there is one.
pub async fn generate(State(state): State<AppState>, Json(req): Json<GenerateRequest>) -> Response {
    if req.api_key.trim().is_empty() {
        warn!("generate called without an API key");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MISSING_KEY);
    }

    let writer = state.writer(&req.api_key);
    match writer.generate(&req.sentence, req.language).await {
        Ok(generation) => {
            info!(language = %req.language, "generated continuation");
            let body = GenerateResponse {
                result: GenerateResult {
                    completion: generation.response,
                    prompt: generation.prompt,
                },
            };
            Json(body).into_response()
        }
        Err(WriterError::Completion(completion::Error::Api { status, message })) => {
            error!(status, %message, "completion API rejected request");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, message)
        }
        Err(e) => {
            error!(error = %e, "error with completion API request");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR)
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub language: Locale,
    pub input_limit: usize,
    pub strings: &'static LocaleStrings,
}

/// Supported languages and their UI strings.
pub async fn locales() -> Json<Vec<LocaleInfo>> {
    Json(
        Locale::ALL
            .iter()
            .map(|&language| LocaleInfo {
                language,
                input_limit: language.input_limit(),
                strings: language.strings(),
            })
            .collect(),
    )
}

/// What a client needs to render a story.
#[derive(Debug, Clone, Serialize)]
pub struct StorySnapshot {
    pub id: Uuid,
    pub language: Locale,
    pub round: u32,
    pub rounds_remaining: u32,
    pub state: TurnState,
    pub input_hint: String,
    pub story: String,
    pub sentences: Vec<Sentence>,
    pub transcript: Vec<TranscriptEntry>,
}

impl StorySnapshot {
    pub fn new(id: Uuid, controller: &TurnController) -> Self {
        let session = controller.session();
        Self {
            id,
            language: session.locale(),
            round: session.round(),
            rounds_remaining: controller.rounds_remaining(),
            state: controller.state(),
            input_hint: controller.input_hint(),
            story: session.story_text(),
            sentences: session.sentences().to_vec(),
            transcript: session.transcript().to_vec(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateStory {
    #[serde(default)]
    pub language: Locale,
}

/// Start a story. Refused with 503 once `max_stories` are hosted.
pub async fn create_story(
    State(state): State<AppState>,
    Json(req): Json<CreateStory>,
) -> Result<(StatusCode, Json<StorySnapshot>), ApiError> {
    let id = Uuid::new_v4();
    let controller = TurnController::new(req.language);
    let snapshot = StorySnapshot::new(id, &controller);

    let mut stories = state.stories.write().await;
    if stories.len() >= state.max_stories {
        warn!(hosted = stories.len(), "story limit reached");
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many stories in progress",
        ));
    }
    stories.insert(id, Arc::new(Mutex::new(controller)));
    info!(%id, language = %req.language, hosted = stories.len(), "story created");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Forget a story. A turn already running finishes against its own handle.
pub async fn delete_story(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match state.stories.write().await.remove(&id) {
        Some(_) => {
            info!(%id, "story deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("No story with id {id}"),
        )),
    }
}

/// Current state of a story. Waits for a turn in flight to finish.
pub async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StorySnapshot>, ApiError> {
    let story = state.story(id).await?;
    let controller = story.lock().await;
    Ok(Json(StorySnapshot::new(id, &controller)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTurn {
    pub sentence: String,
    #[serde(default, alias = "credential")]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub outcome: TurnOutcome,
    pub story: StorySnapshot,
}

/// Play one round.
///
/// The round runs in its own task so a dropped connection cannot abandon it
/// halfway. A second submission while one is running gets 409.
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitTurn>,
) -> Result<Json<TurnResponse>, ApiError> {
    let story = state.story(id).await?;
    let mut controller = story
        .try_lock_owned()
        .map_err(|_| ApiError::new(StatusCode::CONFLICT, TurnError::Busy.to_string()))?;
    let writer = state.writer(&req.api_key);

    let round = tokio::spawn(async move {
        let result = controller.submit(&req.sentence, &writer).await;
        let locale = controller.session().locale();
        (result, locale, StorySnapshot::new(id, &controller))
    });
    let (result, locale, story) = round.await.map_err(|e| {
        error!(%id, error = %e, "turn task failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR)
    })?;

    match result {
        Ok(outcome) => Ok(Json(TurnResponse { outcome, story })),
        Err(e) => {
            warn!(%id, error = %e, "turn rejected");
            Err(ApiError::new(turn_status(&e), e.user_message(locale)).with_story(story))
        }
    }
}

fn turn_status(e: &TurnError) -> StatusCode {
    match e {
        TurnError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TurnError::Busy | TurnError::StoryComplete => StatusCode::CONFLICT,
        TurnError::Writer(_) => StatusCode::BAD_GATEWAY,
        TurnError::RetriesExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Deserialize)]
pub struct SwitchLocale {
    pub language: Locale,
    #[serde(default)]
    pub confirm: bool,
}

/// Change a story's language. Discarding a non-empty story needs `confirm`.
pub async fn switch_locale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SwitchLocale>,
) -> Result<Json<StorySnapshot>, ApiError> {
    let story = state.story(id).await?;
    let mut controller = story
        .try_lock()
        .map_err(|_| ApiError::new(StatusCode::CONFLICT, TurnError::Busy.to_string()))?;

    match controller.switch_locale(req.language, req.confirm) {
        Ok(LocaleSwitch::NeedsConfirmation { message }) => {
            Err(ApiError::new(StatusCode::CONFLICT, message)
                .with_story(StorySnapshot::new(id, &controller)))
        }
        Ok(_) => Ok(Json(StorySnapshot::new(id, &controller))),
        Err(e) => {
            let locale = controller.session().locale();
            Err(ApiError::new(turn_status(&e), e.user_message(locale)))
        }
    }
}

/// Error reply carrying a status, a message and optionally the story as it
/// stands.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    story: Option<StorySnapshot>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: ErrorDetail {
                    message: message.into(),
                },
                story: None,
            },
        }
    }

    pub fn with_story(mut self, story: StorySnapshot) -> Self {
        self.body.story = Some(story);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.body.error.message
    }

    pub fn story(&self) -> Option<&StorySnapshot> {
        self.body.story.as_ref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
