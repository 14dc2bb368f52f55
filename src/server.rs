//! Mock backend: serves the sample catalog over REST and pushes realtime
//! frames to `/ws` subscribers.

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRef, Multipart, Path, State,
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::auth::{JwtKeys, OperatorClaims};
use crate::config::ServerConfig;
use crate::errors;
use crate::realtime::{EventFrame, RealtimeEvent};
use crate::services::{AdminError, FileUpload, InMemoryService, Record, ServiceResult};
use crate::session::{Credentials, Operator, Session};

const EVENT_BUFFER: usize = 64;

#[derive(Clone)]
pub struct ServerState {
    pub store: InMemoryService,
    pub events: broadcast::Sender<EventFrame>,
    pub keys: JwtKeys,
    pub config: Arc<ServerConfig>,
}

impl ServerState {
    pub fn new(store: InMemoryService, config: ServerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            store,
            events,
            keys: JwtKeys::from_secret(&config.jwt_secret),
            config: Arc::new(config),
        }
    }

    pub fn with_sample(config: ServerConfig) -> Self {
        Self::new(InMemoryService::new_with_sample(), config)
    }

    /// Sends a frame to every connected socket. No subscribers is not an error.
    pub fn publish(&self, event: RealtimeEvent, data: Value) {
        let frame = EventFrame::new(event, data);
        if self.events.send(frame).is_err() {
            tracing::debug!(event = event.name(), "no realtime subscribers");
        }
    }
}

impl FromRef<ServerState> for JwtKeys {
    fn from_ref(state: &ServerState) -> Self {
        state.keys.clone()
    }
}

pub fn app(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/upload", post(upload))
        .route("/api/payment/transactions/:id/refund", post(refund))
        .fallback(resource_handler)
        .with_state(state)
}

fn error_response(error: AdminError) -> Response {
    let status =
        StatusCode::from_u16(errors::status_code(&error)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"status": "error", "message": error.to_string()})),
    )
        .into_response()
}

fn parse_body(body: &Bytes) -> ServiceResult<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| AdminError::Validation(format!("invalid JSON body: {err}")))
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "service": "ok",
            "resources": state.store.resources().len(),
            "timestamp": Utc::now()
        })),
    )
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn login(State(state): State<ServerState>, Json(request): Json<LoginRequest>) -> Response {
    let credentials = Credentials::new(&request.email, &request.password);
    if let Some(message) = credentials.validate().into_values().next() {
        return error_response(AdminError::Validation(message));
    }
    if let Some(expected) = &state.config.admin_password {
        if *expected != credentials.password {
            warn!(email = %credentials.email, "rejected login");
            return error_response(AdminError::PermissionDenied("invalid credentials".into()));
        }
    }
    let operator = Operator {
        name: credentials
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
        email: credentials.email.clone(),
        role: "admin".into(),
    };
    match state.keys.issue(&operator, state.config.token_ttl_hours) {
        Ok((token, exp)) => {
            info!(email = %operator.email, "issued operator token");
            Json(Session {
                token,
                operator,
                expires_at: Some(exp),
            })
            .into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn me(claims: OperatorClaims) -> Json<Operator> {
    Json(claims.operator())
}

async fn upload(State(state): State<ServerState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return error_response(AdminError::Validation(err.to_string())),
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return error_response(AdminError::Validation(err.to_string())),
        };
        return match state.store.store_upload(FileUpload {
            filename,
            content_type,
            bytes,
        }) {
            Ok(receipt) => {
                info!(filename = %receipt.filename, "stored upload");
                (StatusCode::CREATED, Json(receipt)).into_response()
            }
            Err(err) => error_response(err),
        };
    }
    error_response(AdminError::Validation("missing file field".into()))
}

async fn refund(State(state): State<ServerState>, Path(id): Path<String>, body: Bytes) -> Response {
    let result = parse_body(&body).and_then(|body| {
        state
            .store
            .perform_action(&format!("payment/transactions/{id}/refund"), &body)
    });
    match result {
        Ok(transaction) => Json(transaction).into_response(),
        Err(err) => error_response(err),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, events))
}

async fn stream_events(socket: WebSocket, mut events: broadcast::Receiver<EventFrame>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            frame = events.recv() => match frame {
                Ok(frame) => {
                    if sender.send(Message::Text(frame.to_text())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "realtime subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Splits `/api/<resource>[/<id>]` against the collections the store knows.
fn route_target(store: &InMemoryService, uri: &Uri) -> Option<(String, Option<String>)> {
    let rest = uri.path().strip_prefix("/api/")?.trim_end_matches('/');
    if store.has_collection(rest) {
        return Some((rest.to_string(), None));
    }
    let (resource, id) = rest.rsplit_once('/')?;
    store
        .has_collection(resource)
        .then(|| (resource.to_string(), Some(id.to_string())))
}

async fn resource_handler(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let Some((resource, id)) = route_target(&state.store, &uri) else {
        return error_response(AdminError::NotFound(uri.path().to_string()));
    };
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(err) => return error_response(err),
    };
    let result = match id {
        None => collection_request(&state, &method, &resource, body),
        Some(id) => item_request(&state, &method, &resource, &id, body),
    };
    match result {
        Ok((status, value)) => (status, Json(value)).into_response(),
        Err(err) => {
            crate::logging::log_failure(&resource, method.as_str(), &err);
            error_response(err)
        }
    }
}

type Handled = ServiceResult<(StatusCode, Value)>;

fn collection_request(state: &ServerState, method: &Method, resource: &str, body: Value) -> Handled {
    match *method {
        Method::GET => {
            let records = state.store.list_records(resource)?;
            Ok((StatusCode::OK, json!(records)))
        }
        Method::POST => match body {
            Value::Array(values) => {
                let mut created = Vec::with_capacity(values.len());
                for value in values {
                    created.push(state.store.insert_record(resource, Record::from_value(value)?)?);
                }
                announce_bulk(state, resource, BulkChange::Created, &created);
                Ok((StatusCode::CREATED, json!(created)))
            }
            value => {
                let created = state.store.insert_record(resource, Record::from_value(value)?)?;
                announce_one(state, resource, OneChange::Created, &created);
                Ok((StatusCode::CREATED, created.into_value()))
            }
        },
        Method::PATCH => {
            let ids: Vec<String> = body
                .get("ids")
                .and_then(Value::as_array)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| match id {
                            Value::String(id) => Some(id.clone()),
                            Value::Number(id) => Some(id.to_string()),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let changes = Record::from_value(body.get("changes").cloned().unwrap_or(Value::Null))?;
            let updated = state.store.patch_many(resource, &ids, &changes)?;
            announce_bulk(state, resource, BulkChange::Updated, &updated);
            Ok((StatusCode::OK, json!(updated)))
        }
        _ => Err(AdminError::Validation(format!("{method} not allowed on {resource}"))),
    }
}

fn item_request(state: &ServerState, method: &Method, resource: &str, id: &str, body: Value) -> Handled {
    match *method {
        Method::GET => Ok((StatusCode::OK, state.store.find_record(resource, id)?.into_value())),
        Method::PUT => {
            let updated = state.store.replace_record(resource, id, Record::from_value(body)?)?;
            announce_one(state, resource, OneChange::Updated, &updated);
            Ok((StatusCode::OK, updated.into_value()))
        }
        Method::PATCH => {
            let updated = state.store.patch_record(resource, id, &Record::from_value(body)?)?;
            announce_one(state, resource, OneChange::Updated, &updated);
            Ok((StatusCode::OK, updated.into_value()))
        }
        Method::DELETE => {
            let removed = state.store.remove_record(resource, id)?;
            announce_one(state, resource, OneChange::Deleted, &removed);
            Ok((StatusCode::OK, json!({"status": "ok", "id": id})))
        }
        Method::POST => {
            let path = format!("{resource}/{id}");
            Ok((StatusCode::OK, state.store.perform_action(&path, &body)?))
        }
        _ => Err(AdminError::Validation(format!("{method} not allowed on {resource}/{id}"))),
    }
}

#[derive(Clone, Copy)]
enum OneChange {
    Created,
    Updated,
    Deleted,
}

#[derive(Clone, Copy)]
enum BulkChange {
    Created,
    Updated,
}

fn announce_one(state: &ServerState, resource: &str, change: OneChange, record: &Record) {
    let event = match (resource, change) {
        ("orders", OneChange::Created) => Some(RealtimeEvent::OrderCreated),
        ("orders", OneChange::Updated) => Some(RealtimeEvent::OrderUpdated),
        ("customers", OneChange::Created) => Some(RealtimeEvent::UsersCreated),
        ("customers", OneChange::Updated) => Some(RealtimeEvent::UserProfileUpdated),
        ("products", OneChange::Created) => Some(RealtimeEvent::ProductsCreated),
        ("products", OneChange::Updated) => Some(RealtimeEvent::ProductsUpdated),
        ("products", OneChange::Deleted) => Some(RealtimeEvent::ProductsDeleted),
        ("deliveries", OneChange::Updated) => Some(RealtimeEvent::DeliveryStatusUpdated),
        _ => None,
    };
    let Some(event) = event else {
        return;
    };
    let data = match event {
        RealtimeEvent::UsersCreated | RealtimeEvent::ProductsCreated | RealtimeEvent::ProductsUpdated => {
            json!([record])
        }
        RealtimeEvent::ProductsDeleted => json!({"ids": [record.id()]}),
        _ => record.clone().into_value(),
    };
    state.publish(event, data);
}

fn announce_bulk(state: &ServerState, resource: &str, change: BulkChange, records: &[Record]) {
    let event = match (resource, change) {
        ("orders", BulkChange::Created) => RealtimeEvent::OrdersCreated,
        ("orders", BulkChange::Updated) => RealtimeEvent::OrdersUpdated,
        ("customers", BulkChange::Created) => RealtimeEvent::UsersCreated,
        ("products", BulkChange::Created) => RealtimeEvent::ProductsCreated,
        ("products", BulkChange::Updated) => RealtimeEvent::ProductsUpdated,
        _ => return,
    };
    state.publish(event, json!(records));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_split_collection_and_id() {
        let store = InMemoryService::new_with_sample();
        let uri: Uri = "/api/payment/methods/met-1".parse().unwrap();
        assert_eq!(
            route_target(&store, &uri),
            Some(("payment/methods".to_string(), Some("met-1".to_string())))
        );
        let uri: Uri = "/api/orders/".parse().unwrap();
        assert_eq!(route_target(&store, &uri), Some(("orders".to_string(), None)));
        let uri: Uri = "/api/nothing/here".parse().unwrap();
        assert_eq!(route_target(&store, &uri), None);
    }

    #[tokio::test]
    async fn order_writes_are_broadcast() {
        let state = ServerState::with_sample(ServerConfig::local("secret"));
        let mut events = state.events.subscribe();
        collection_request(
            &state,
            &Method::POST,
            "orders",
            json!({"order_number": "LUM-2000", "total": 10.0}),
        )
        .unwrap();
        let frame = events.recv().await.unwrap();
        assert_eq!(frame.event, "order_created");
        assert_eq!(frame.data["order_number"], "LUM-2000");

        collection_request(&state, &Method::POST, "orders", json!([{"total": 1}, {"total": 2}])).unwrap();
        let frame = events.recv().await.unwrap();
        assert_eq!(frame.event, "orders_created");
        assert_eq!(frame.data.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn delivery_patch_announces_status() {
        let state = ServerState::with_sample(ServerConfig::local("secret"));
        let mut events = state.events.subscribe();
        item_request(&state, &Method::PATCH, "deliveries", "del-2", json!({"status": "delivered"})).unwrap();
        let frame = events.recv().await.unwrap();
        assert_eq!(frame.event, "delivery_status_updated");
        assert_eq!(frame.data["tracking_number"], "7489 2200 1180");
    }
}
