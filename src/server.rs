use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::trace::TraceLayer;

use crate::api::{
    ApiFeedbackEvent, ApiLearnRequest, ApiLearnResponse, ApiProfileResponse, ApiScoreRequest,
    ApiScoreResponse, AugmentationStatus,
};
use engagement_patterns::EngagementEngine;

type Channels = Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>;
type Completed = Arc<Mutex<HashMap<String, StreamEvent>>>;

#[derive(Clone)]
struct AppState {
    engine: EngagementEngine,
    channels: Channels,
    completed: Completed,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, engine: EngagementEngine) -> Result<(), String> {
    let state = AppState {
        engine,
        channels: Arc::new(Mutex::new(HashMap::new())),
        completed: Arc::new(Mutex::new(HashMap::new())),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/patterns/learn", post(learn_handler))
        .route("/api/patterns/:user_id", get(profile_handler))
        .route("/api/score", post(score_handler))
        .route("/api/score/stream", get(stream_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn learn_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiLearnRequest>,
) -> Result<Json<ApiLearnResponse>, (StatusCode, String)> {
    let user_id = request
        .user_id
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "user_id is required".to_string()))?;

    let result = state.engine.learn(&user_id).await;
    Ok(Json(ApiLearnResponse::from_result(result)))
}

async fn profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiProfileResponse>, (StatusCode, String)> {
    let profile = state
        .engine
        .learned_profile(&user_id)
        .await
        .map_err(|err| (StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;
    Ok(Json(ApiProfileResponse::from_profile(profile)))
}

async fn score_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiScoreRequest>,
) -> Result<Json<ApiScoreResponse>, (StatusCode, String)> {
    let draft = request.to_draft().map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let user_id = request.user_id.clone().filter(|value| !value.trim().is_empty());

    let result = state.engine.score_draft(user_id.as_deref(), &draft).await;

    let augmentation = if !request.use_ai.unwrap_or(false) {
        AugmentationStatus::Disabled
    } else if !state.engine.has_augmenter() {
        AugmentationStatus::Unavailable
    } else {
        let sender = create_channel(&state.channels, &request_id).await;
        send_event(&sender, "scored", "Numeric score ready, requesting feedback", None);

        let task_state = state.clone();
        let task_request_id = request_id.clone();
        tokio::spawn(async move {
            let event = match task_state
                .engine
                .augment_draft(user_id.as_deref(), &draft)
                .await
            {
                Ok(feedback) => {
                    let payload = serde_json::to_value(ApiFeedbackEvent {
                        request_id: task_request_id.clone(),
                        feedback,
                    })
                    .ok();
                    stream_event("feedback", "Qualitative feedback ready", payload)
                }
                Err(_) => stream_event("feedback_unavailable", "Qualitative feedback unavailable", None),
            };
            let _ = sender.send(event.clone());
            task_state
                .completed
                .lock()
                .await
                .insert(task_request_id.clone(), event);
            schedule_cleanup(task_state.channels, task_state.completed, task_request_id);
        });
        AugmentationStatus::Pending
    };

    Ok(Json(ApiScoreResponse::from_result(result, request_id, augmentation)))
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    // Channels only exist for scored requests with pending feedback.
    let sender = lookup_channel(&state.channels, &query.request_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| {
        match event {
            Ok(event) => {
                let data = serde_json::to_string(&event).unwrap_or_default();
                Some(Ok(Event::default().event(event.event.clone()).data(data)))
            }
            Err(_) => None,
        }
    });

    send_event(&sender, "connected", "Streaming qualitative feedback", None);
    // Feedback may have finished before the client subscribed.
    if let Some(done) = state.completed.lock().await.get(&query.request_id).cloned() {
        let _ = sender.send(done);
    }
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn lookup_channel(channels: &Channels, request_id: &str) -> Option<broadcast::Sender<StreamEvent>> {
    channels.lock().await.get(request_id).cloned()
}

async fn create_channel(channels: &Channels, request_id: &str) -> broadcast::Sender<StreamEvent> {
    let mut guard = channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn stream_event(event: &str, message: &str, payload: Option<serde_json::Value>) -> StreamEvent {
    StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        payload,
        timestamp_ms: now_ms(),
    }
}

fn send_event(
    sender: &broadcast::Sender<StreamEvent>,
    event: &str,
    message: &str,
    payload: Option<serde_json::Value>,
) {
    let _ = sender.send(stream_event(event, message, payload));
}

fn schedule_cleanup(channels: Channels, completed: Completed, request_id: String) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        channels.lock().await.remove(&request_id);
        completed.lock().await.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagement_patterns::config::EngineConfig;
    use engagement_patterns::profile::JsonProfileStore;

    async fn test_state(dir: &std::path::Path) -> AppState {
        let store = JsonProfileStore::load(dir.join("profiles.json")).await.unwrap();
        AppState {
            engine: EngagementEngine::new(EngineConfig::default(), Arc::new(store)),
            channels: Arc::new(Mutex::new(HashMap::new())),
            completed: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[tokio::test]
    async fn unknown_stream_ids_are_rejected_without_allocating() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;

        for idx in 0..1000 {
            let query = StreamQuery {
                request_id: format!("unknown-{}", idx),
            };
            let result = stream_handler(State(state.clone()), Query(query)).await;
            assert_eq!(result.err(), Some(StatusCode::NOT_FOUND));
        }
        assert!(state.channels.lock().await.is_empty());
    }

    #[tokio::test]
    async fn scored_requests_can_be_streamed() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        create_channel(&state.channels, "req-1").await;

        let query = StreamQuery {
            request_id: "req-1".to_string(),
        };
        let result = stream_handler(State(state.clone()), Query(query)).await;
        assert!(result.is_ok());
        assert_eq!(state.channels.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn cleaned_up_requests_are_not_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        create_channel(&state.channels, "req-2").await;
        state.channels.lock().await.remove("req-2");

        let query = StreamQuery {
            request_id: "req-2".to_string(),
        };
        let result = stream_handler(State(state.clone()), Query(query)).await;
        assert_eq!(result.err(), Some(StatusCode::NOT_FOUND));
        assert!(state.channels.lock().await.is_empty());
    }
}
