use super::messages::{self, open_app_url};
use super::reminder::run_sweep;
use super::server::RelayState;
use super::store::TaskSnapshot;
use super::RelayError;
use crate::domain::ActiveHours;
use crate::sync::AUTH_HEADER;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

/// Ids arrive as numbers from the bot platform and as strings from clients
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_from_value))
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Incoming bot platform event
#[derive(Debug, Deserialize)]
pub struct WebhookUpdate {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "id_string")]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `tasks_update` payload sent by the mini-app
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TasksUpdate {
    #[serde(default)]
    tasks: Vec<TaskSnapshot>,
    #[serde(default)]
    active_hours: Option<ActiveHours>,
    #[serde(default)]
    incomplete_tasks: u32,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn webhook(State(state): State<RelayState>, Json(body): Json<Value>) -> Response {
    match handle_update(&state, body).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            error!("Webhook error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response()
        }
    }
}

async fn handle_update(state: &RelayState, body: Value) -> Result<(), RelayError> {
    let update: WebhookUpdate = serde_json::from_value(body)?;
    debug!("Webhook update: {}", update.kind);

    match update.kind.as_str() {
        "bot_started" => {
            let Some(chat_id) = update.chat_id.as_deref() else {
                warn!("bot_started without chat_id");
                return Ok(());
            };
            let app_url = app_link(state, update.user_id.as_deref(), chat_id);
            state.messenger.send(chat_id, &messages::welcome(&app_url)).await
        }
        "message" => {
            let Some(chat_id) = update.chat_id.as_deref() else {
                warn!("message without chat_id");
                return Ok(());
            };
            let app_url = app_link(state, update.user_id.as_deref(), chat_id);
            let reply = match update.text.as_deref().map(str::trim).unwrap_or("") {
                "/start" | "/старт" => messages::welcome(&app_url),
                "/app" | "/приложение" => messages::open_app(&app_url),
                "/help" | "/помощь" => messages::help(),
                _ => messages::start_hint(),
            };
            state.messenger.send(chat_id, &reply).await
        }
        "webapp_data" => store_webapp_data(state, update).await,
        other => {
            debug!("Ignoring update type {}", other);
            Ok(())
        }
    }
}

fn app_link(state: &RelayState, user_id: Option<&str>, chat_id: &str) -> String {
    match user_id {
        Some(user_id) => open_app_url(&state.webapp_url, user_id, chat_id),
        None => state.webapp_url.clone(),
    }
}

async fn store_webapp_data(state: &RelayState, update: WebhookUpdate) -> Result<(), RelayError> {
    let Some(data) = update.data else {
        return Ok(());
    };
    if data.get("type").and_then(Value::as_str) != Some("tasks_update") {
        debug!("Ignoring webapp data without tasks_update");
        return Ok(());
    }
    let Some(user_id) = update.user_id else {
        warn!("tasks_update without user_id");
        return Ok(());
    };

    let payload: TasksUpdate = serde_json::from_value(data)?;
    let mut record = state.store.get(&user_id).await?.unwrap_or_default();
    if update.chat_id.is_some() {
        record.chat_id = update.chat_id;
    }
    record.tasks = payload.tasks;
    record.active_hours = payload.active_hours.unwrap_or_default();
    record.incomplete_tasks = payload.incomplete_tasks;
    state.store.put(&user_id, record).await?;

    info!("Stored {} incomplete tasks for user {}", payload.incomplete_tasks, user_id);
    Ok(())
}

/// Launch auth check. Token verification is not implemented yet, so every token passes.
fn verify_launch_auth(_token: &str) -> bool {
    true
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

pub async fn sync(State(state): State<RelayState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(token) = headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok()) {
        if !verify_launch_auth(token) {
            return failure(StatusCode::UNAUTHORIZED, "Bad auth");
        }
    }

    let Some(user_id) = body.get("userId").or_else(|| body.get("user_id")).and_then(id_from_value) else {
        return failure(StatusCode::BAD_REQUEST, "user_id required");
    };
    let chat_id = body.get("chatId").or_else(|| body.get("chat_id")).and_then(id_from_value);

    match merge_sync(&state, &user_id, chat_id, &body).await {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(e) => {
            error!("Sync failed for user {}: {}", user_id, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error")
        }
    }
}

fn present(body: &Value, key: &str) -> Option<Value> {
    body.get(key).filter(|v| !v.is_null()).cloned()
}

async fn merge_sync(state: &RelayState, user_id: &str, chat_id: Option<String>, body: &Value) -> Result<Map<String, Value>, RelayError> {
    let mut record = state.store.get(user_id).await?.unwrap_or_default();
    if chat_id.is_some() {
        record.chat_id = chat_id;
    }
    if let Some(settings) = present(body, "settings") {
        record.settings = Some(settings);
    }
    if let Some(tasks) = present(body, "tasks") {
        record.task_blob = Some(tasks);
    }
    if let Some(stats) = present(body, "stats") {
        record.stats = Some(stats);
    }
    record.derive_snapshot();

    let mut data = Map::new();
    if let Some(settings) = &record.settings {
        data.insert("settings".to_string(), settings.clone());
    }
    if let Some(tasks) = &record.task_blob {
        data.insert("tasks".to_string(), tasks.clone());
    }
    if let Some(stats) = &record.stats {
        data.insert("stats".to_string(), stats.clone());
    }

    state.store.put(user_id, record).await?;
    debug!("Synced user {}", user_id);
    Ok(data)
}

pub async fn cron(State(state): State<RelayState>) -> Response {
    match run_sweep(
        state.store.as_ref(),
        state.messenger.as_ref(),
        &state.webapp_url,
        Local::now(),
        state.cooldown,
    )
    .await
    {
        Ok(sent) => Json(json!({ "success": true, "sent": sent })).into_response(),
        Err(e) => {
            error!("Reminder sweep failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::messenger::testing::RecordingMessenger;
    use crate::relay::server::router;
    use crate::relay::store::{MemoryUserStore, UserStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> (RelayState, Arc<MemoryUserStore>, Arc<RecordingMessenger>) {
        let store = Arc::new(MemoryUserStore::new());
        let messenger = Arc::new(RecordingMessenger::default());
        let state = RelayState {
            store: store.clone(),
            messenger: messenger.clone(),
            webapp_url: "https://app.example/webapp".to_string(),
            cooldown: chrono::Duration::hours(2),
        };
        (state, store, messenger)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _, _) = test_state();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bot_started_sends_welcome() {
        let (state, _, messenger) = test_state();
        let response = router(state)
            .oneshot(post("/webhook", json!({"type": "bot_started", "user_id": 7, "chat_id": 99})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
        let sent = messenger.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "99");
        assert!(sent[0].1.text.starts_with("🎯 Добро пожаловать"));
        assert_eq!(
            sent[0].1.attachments[0].payload.buttons[0].action.url,
            "https://app.example/webapp?user_id=7&chat_id=99"
        );
    }

    #[tokio::test]
    async fn test_message_commands() {
        let (state, _, messenger) = test_state();
        let app = router(state);
        for text in ["/help", "/приложение", "hello"] {
            let response = app
                .clone()
                .oneshot(post("/webhook", json!({"type": "message", "user_id": 7, "chat_id": 99, "text": text})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let sent = messenger.sent.lock().await;
        assert!(sent[0].1.text.starts_with("🤖 Команды бота"));
        assert_eq!(sent[1].1.text, "Открыть мини-приложение:");
        assert!(sent[2].1.text.contains("/start"));
    }

    #[tokio::test]
    async fn test_send_failure_returns_error() {
        let store = Arc::new(MemoryUserStore::new());
        let state = RelayState {
            store,
            messenger: Arc::new(RecordingMessenger {
                fail: true,
                ..RecordingMessenger::default()
            }),
            webapp_url: "https://app.example".to_string(),
            cooldown: chrono::Duration::hours(2),
        };
        let response = router(state)
            .oneshot(post("/webhook", json!({"type": "message", "chat_id": 1, "text": "/start"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error");
    }

    #[tokio::test]
    async fn test_webapp_tasks_update_stored() {
        let (state, store, _) = test_state();
        let body = json!({
            "type": "webapp_data",
            "user_id": 7,
            "chat_id": 99,
            "data": {
                "type": "tasks_update",
                "tasks": [{"id": "task-1", "title": "Exam", "progress": 40}],
                "incompleteTasks": 1
            }
        });
        let response = router(state).oneshot(post("/webhook", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let record = store.get("7").await.unwrap().unwrap();
        assert_eq!(record.chat_id.as_deref(), Some("99"));
        assert_eq!(record.incomplete_tasks, 1);
        assert_eq!(record.active_hours, ActiveHours::new(9, 22));
        assert_eq!(record.tasks[0].title, "Exam");
    }

    #[tokio::test]
    async fn test_update_without_type_is_ignored() {
        let (state, _, messenger) = test_state();
        let response = router(state)
            .oneshot(post("/webhook", json!({"chat_id": 99, "text": "/start"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
        assert!(messenger.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_with_huge_daily_hours_clamps_window() {
        let (state, store, _) = test_state();
        let settings = json!({
            "dailyHours": u32::MAX,
            "productiveTime": "evening",
            "pomodoroLength": 25,
            "breakLength": 5,
            "isOnboarded": true
        });
        let response = router(state)
            .oneshot(post("/api/sync", json!({"userId": "7", "settings": settings})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let record = store.get("7").await.unwrap().unwrap();
        assert_eq!(record.active_hours, ActiveHours::new(17, 24));
    }

    #[tokio::test]
    async fn test_sync_requires_user_id() {
        let (state, _, _) = test_state();
        let response = router(state).oneshot(post("/api/sync", json!({"chatId": "1"}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sync_merges_and_echoes_blobs() {
        let (state, store, _) = test_state();
        let app = router(state);

        let first = app
            .clone()
            .oneshot(post("/api/sync", json!({"userId": "7", "chatId": "99", "stats": {"xp": 10}})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(post("/api/sync", json!({"user_id": 7, "tasks": []})))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_text(second).await).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["stats"]["xp"], 10);
        assert_eq!(body["data"]["tasks"], json!([]));

        let record = store.get("7").await.unwrap().unwrap();
        assert_eq!(record.chat_id.as_deref(), Some("99"));
        assert_eq!(record.incomplete_tasks, 0);
    }

    #[tokio::test]
    async fn test_cron_runs_sweep() {
        let (state, _, _) = test_state();
        let response = router(state).oneshot(post("/api/cron", json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["sent"], 0);
    }
}
