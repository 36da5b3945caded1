//! Stand-in telemetry service for integration tests.
//!
//! Serves the same routes as the real service from in-memory state, bound
//! to an ephemeral local port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use evolab::experiment::{Experiment, ExperimentStatus};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Default)]
pub struct ServiceState {
    pub experiments: Mutex<HashMap<String, Experiment>>,
    pub submissions: Mutex<Vec<Value>>,
    pub commands: Mutex<Vec<(String, String, Option<Value>)>>,
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub stream_frames: Mutex<Vec<Value>>,
    pub close_replies: AtomicUsize,
    next_id: AtomicUsize,
}

impl ServiceState {
    fn note_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(value);
    }

    pub fn insert_experiment(&self, experiment: Experiment) {
        self.experiments
            .lock()
            .unwrap()
            .insert(experiment.id().to_string(), experiment);
    }
}

/// Start the service and return its base URL.
pub async fn spawn(state: Arc<ServiceState>) -> String {
    let app = Router::new()
        .route("/telemetry/submit", post(submit))
        .route("/telemetry/history", get(history))
        .route("/telemetry/:id/latest", get(latest))
        .route("/telemetry/:id/convergence", get(convergence))
        .route("/telemetry/:id/mutations", get(mutations))
        .route("/telemetry/:id/export", get(export))
        .route("/telemetry/:id/stream", get(stream))
        .route("/evolution/:id/:action", post(command).put(command_with_body))
        .route("/experiments", get(list_experiments).post(create_experiment))
        .route(
            "/experiments/:id",
            get(get_experiment).delete(delete_experiment),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn submit(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.note_auth(&headers);
    if body["experimentId"] == "reject" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "storage offline").into_response();
    }
    state.submissions.lock().unwrap().push(body);
    Json(json!({"success": true})).into_response()
}

#[derive(Deserialize)]
struct HistoryQuery {
    experiment_id: String,
    include_genomes: bool,
}

fn records_for(state: &ServiceState, experiment_id: &str) -> Vec<Value> {
    state
        .submissions
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r["experimentId"] == experiment_id)
        .cloned()
        .collect()
}

async fn history(
    State(state): State<Arc<ServiceState>>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let mut records = records_for(&state, &query.experiment_id);
    if records.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    if !query.include_genomes {
        for record in &mut records {
            if let Some(map) = record.as_object_mut() {
                map.remove("genome");
            }
        }
    }
    Json(records).into_response()
}

async fn latest(State(state): State<Arc<ServiceState>>, Path(id): Path<String>) -> Json<Value> {
    Json(records_for(&state, &id).pop().unwrap_or(Value::Null))
}

async fn convergence(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"experimentId": id, "convergence_rate": 0.87, "window": 20}))
}

async fn mutations(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"experimentId": id, "mutation_rate": 0.05, "mutations": 1234}))
}

#[derive(Deserialize)]
struct ExportQuery {
    format: String,
}

async fn export(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let records = records_for(&state, &id);
    match query.format.as_str() {
        "json" => Json(records).into_response(),
        "csv" => {
            let mut csv = String::from("generation,fitness\n");
            for record in records {
                csv.push_str(&format!("{},{}\n", record["generation"], record["fitness"]));
            }
            ([(header::CONTENT_TYPE, "text/csv")], csv).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unsupported format").into_response(),
    }
}

async fn stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.note_auth(&headers);
    let frames = state.stream_frames.lock().unwrap().clone();
    ws.on_upgrade(move |socket| push_frames(socket, state, id, frames))
}

async fn push_frames(
    mut socket: WebSocket,
    state: Arc<ServiceState>,
    id: String,
    frames: Vec<Value>,
) {
    for frame in frames {
        if socket.send(Message::Text(frame.to_string())).await.is_err() {
            return;
        }
    }
    if id == "garbled" {
        let _ = socket.send(Message::Text("{not json".to_string())).await;
    }
    let _ = socket.send(Message::Close(None)).await;
    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            state.close_replies.fetch_add(1, Ordering::SeqCst);
            break;
        }
    }
}

fn set_status(state: &ServiceState, id: &str, status: ExperimentStatus) -> bool {
    let mut experiments = state.experiments.lock().unwrap();
    let Some(current) = experiments.get(id) else {
        return false;
    };
    let updated = Experiment::builder(current.id(), current.name())
        .status(status)
        .generation(current.generation())
        .population_size(current.population_size())
        .created_at(current.created_at())
        .build();
    experiments.insert(id.to_string(), updated);
    true
}

async fn command(
    State(state): State<Arc<ServiceState>>,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    let status = match action.as_str() {
        "pause" => Some(ExperimentStatus::Paused),
        "resume" => Some(ExperimentStatus::Running),
        "select" => None,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let known = match status {
        Some(status) => set_status(&state, &id, status),
        None => state.experiments.lock().unwrap().contains_key(&id),
    };
    if !known {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.commands.lock().unwrap().push((id, action, None));
    StatusCode::NO_CONTENT.into_response()
}

async fn command_with_body(
    State(state): State<Arc<ServiceState>>,
    Path((id, action)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if action != "mutation-rate" {
        return StatusCode::NOT_FOUND.into_response();
    }
    if !state.experiments.lock().unwrap().contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let rate = body["rate"].as_f64().unwrap_or(f64::NAN);
    if !(0.0..=1.0).contains(&rate) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "rate must be within [0, 1]").into_response();
    }
    state.commands.lock().unwrap().push((id, action, Some(body)));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_experiments(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
) -> Json<Vec<Experiment>> {
    state.note_auth(&headers);
    let mut experiments: Vec<Experiment> =
        state.experiments.lock().unwrap().values().cloned().collect();
    experiments.sort_by(|a, b| a.id().cmp(b.id()));
    Json(experiments)
}

#[derive(Deserialize)]
struct CreateBody {
    name: String,
    config: Value,
}

async fn create_experiment(
    State(state): State<Arc<ServiceState>>,
    Json(body): Json<CreateBody>,
) -> Response {
    let population = body.config["population_size"].as_u64().unwrap_or(0);
    let n = state.next_id.fetch_add(1, Ordering::SeqCst);
    let experiment = Experiment::builder(format!("exp-{n}"), body.name)
        .population_size(population)
        .build();
    state.insert_experiment(experiment.clone());
    (StatusCode::CREATED, Json(experiment)).into_response()
}

async fn get_experiment(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<String>,
) -> Response {
    match state.experiments.lock().unwrap().get(&id) {
        Some(experiment) => Json(experiment.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_experiment(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.experiments.lock().unwrap().remove(&id).is_some() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
