use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, Response},
    routing::{get, post, put},
};
use engine::{EngineCommand, EngineOutput, GraphragCli, QueryMethod};
use project::{ProjectStore, Session};
use query::{LabelQuoting, QueryCycle, QueryOutcome};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};

const DEFAULT_CHUNK_SIZE: u32 = 100;

pub struct AppState {
    pub store: ProjectStore,
    pub engine: GraphragCli,
    pub artifact_path: PathBuf,
    pub quoting: LabelQuoting,
    pub metrics: Arc<Metrics>,
    /// Held across an artifact write and the read that follows it, never
    /// across an engine run.
    pub artifact_lock: Mutex<()>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            store: ProjectStore::new(config.projects.root.clone()),
            engine: config.engine(),
            artifact_path: config.visualization.artifact_path.clone(),
            quoting: config.label_quoting(),
            metrics: Metrics::new(),
            artifact_lock: Mutex::new(()),
        }
    }

    async fn run_engine(&self, command: EngineCommand) -> Result<EngineOutput, ApiError> {
        let timer = TimedOperation::start();
        let result = self.engine.run(&command).await;
        self.metrics
            .record_engine(command.name(), timer.elapsed(), result.is_ok());
        Ok(result?)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:name/files", get(list_files))
        .route(
            "/projects/:name/files/:file",
            put(upload_file).delete(delete_file),
        )
        .route("/projects/:name/prompt-tune", post(prompt_tune))
        .route("/projects/:name/index", post(index_project))
        .route("/projects/:name/update", post(update_project))
        .route("/projects/:name/query", post(query_project))
        .route("/visualization", get(get_visualization))
        .route("/metrics", get(get_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    state
        .metrics
        .record_request(!(response.status().is_server_error() || response.status().is_client_error()));
    response
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    engine: String,
    projects_root: String,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        engine: state.engine.program().to_string(),
        projects_root: state.store.root().display().to_string(),
    })
}

async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.store.list_projects().await?))
}

#[derive(Deserialize)]
struct CreateProjectRequest {
    name: String,
}

#[derive(Serialize)]
struct CreateProjectResponse {
    name: String,
    root: String,
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("please enter a project name".to_string()));
    }

    let project = state.store.project(&req.name)?;
    state.store.ensure_root().await?;

    state
        .run_engine(EngineCommand::Init {
            root: project.dir().to_path_buf(),
        })
        .await?;

    info!(project = project.name(), "Initialized project");
    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            name: project.name().to_string(),
            root: project.dir().display().to_string(),
        }),
    ))
}

async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let project = state.store.open(&name).await?;
    Ok(Json(project.list_uploads().await?))
}

#[derive(Serialize)]
struct UploadResponse {
    file: String,
    bytes: usize,
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path((name, file)): Path<(String, String)>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let project = state.store.open(&name).await?;
    project.save_upload(&file, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file,
            bytes: body.len(),
        }),
    ))
}

async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((name, file)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let project = state.store.open(&name).await?;
    project.delete_upload(&file).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct EngineRunResponse {
    command: &'static str,
    stdout: String,
}

#[derive(Deserialize)]
struct PromptTuneRequest {
    domain: String,
    #[serde(default = "default_chunk_size")]
    chunk_size: u32,
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

async fn prompt_tune(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<PromptTuneRequest>,
) -> Result<Json<EngineRunResponse>, ApiError> {
    let project = state.store.open(&name).await?;
    if req.domain.trim().is_empty() {
        return Err(ApiError::BadRequest("please enter a domain".to_string()));
    }

    let output = state
        .run_engine(EngineCommand::PromptTune {
            root: project.dir().to_path_buf(),
            domain: req.domain,
            chunk_size: req.chunk_size,
        })
        .await?;

    Ok(Json(EngineRunResponse {
        command: "prompt-tune",
        stdout: output.stdout,
    }))
}

async fn index_project(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<EngineRunResponse>, ApiError> {
    let project = state.store.open(&name).await?;
    let output = state
        .run_engine(EngineCommand::Index {
            root: project.dir().to_path_buf(),
        })
        .await?;

    Ok(Json(EngineRunResponse {
        command: "index",
        stdout: output.stdout,
    }))
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<EngineRunResponse>, ApiError> {
    let project = state.store.open(&name).await?;
    let output = state
        .run_engine(EngineCommand::Update {
            root: project.dir().to_path_buf(),
        })
        .await?;

    Ok(Json(EngineRunResponse {
        command: "update",
        stdout: output.stdout,
    }))
}

#[derive(Deserialize)]
struct QueryRequest {
    question: String,
    #[serde(default)]
    method: QueryMethod,
}

async fn query_project(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let session = Session::with_project(state.store.open(&name).await?);
    let cycle = QueryCycle::new(&state.engine, &state.artifact_path, state.quoting)
        .with_artifact_lock(&state.artifact_lock);

    let timer = TimedOperation::start();
    let result = cycle.run(&session, &req.question, req.method).await;

    // Validation failures never reached the engine.
    if !matches!(result, Err(query::QueryError::EmptyQuestion)) {
        state
            .metrics
            .record_engine("query", timer.elapsed(), result.is_ok());
    }

    let outcome = result?;
    state.metrics.record_references(
        outcome.references.entities.len(),
        outcome.references.relationships.len(),
        outcome.visualization.is_some(),
    );
    Ok(Json(outcome))
}

async fn get_visualization(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let _artifact = state.artifact_lock.lock().await;
    match tokio::fs::read_to_string(&state.artifact_path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::NotFound(
            "no visualization has been generated yet".to_string(),
        )),
        Err(e) => Err(ApiError::Internal(format!(
            "cannot read {}: {}",
            state.artifact_path.display(),
            e
        ))),
    }
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// State over a temp projects root, with `script` standing in for the engine.
    fn test_state(tmp: &tempfile::TempDir, script: &str) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.projects.root = tmp.path().join("projects");
        config.visualization.artifact_path = tmp.path().join("graph.html");
        config.engine.program = "sh".to_string();
        config.engine.base_args = vec!["-c".to_string(), script.to_string(), "graphrag".to_string()];
        Arc::new(AppState::from_config(&config))
    }

    fn make_project(tmp: &tempfile::TempDir, name: &str) {
        std::fs::create_dir_all(tmp.path().join("projects").join(name)).unwrap();
    }

    async fn send(state: &Arc<AppState>, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json_body(value: Value) -> Body {
        Body::from(value.to_string())
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "true");

        let (status, body) = send(&state, "GET", "/health", Body::empty()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_project_runs_init() {
        let tmp = tempfile::tempdir().unwrap();
        // $1=init $2=--root $3=<dir>
        let state = test_state(&tmp, r#"mkdir -p "$3""#);

        let (status, body) = send(&state, "POST", "/projects", json_body(json!({"name": "Solana"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(parse(&body)["name"], "Solana");

        let (status, body) = send(&state, "GET", "/projects", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!(["Solana"]));
        assert_eq!(state.metrics.snapshot().init.runs, 1);
    }

    #[tokio::test]
    async fn test_create_project_rejects_blank_and_traversal_names() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "true");

        let (status, _) = send(&state, "POST", "/projects", json_body(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "POST", "/projects", json_body(json!({"name": "../etc"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.metrics.snapshot().init.runs, 0);
    }

    #[tokio::test]
    async fn test_upload_list_and_delete_files() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "true");
        make_project(&tmp, "demo");

        let (status, _) = send(&state, "PUT", "/projects/demo/files/notes.txt", Body::from("hello")).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&state, "PUT", "/projects/demo/files/paper.pdf", Body::from("%PDF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&state, "GET", "/projects/demo/files", Body::empty()).await;
        assert_eq!(parse(&body), json!(["notes.txt"]));

        let (status, _) = send(&state, "DELETE", "/projects/demo/files/notes.txt", Body::empty()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&state, "DELETE", "/projects/demo/files/notes.txt", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_project_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "true");

        let (status, body) = send(&state, "POST", "/projects/ghost/index", Body::empty()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(parse(&body)["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_prompt_tune_validates_domain_and_passes_chunk_size() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, r#"printf '%s ' "$@""#);
        make_project(&tmp, "demo");

        let (status, _) = send(
            &state,
            "POST",
            "/projects/demo/prompt-tune",
            json_body(json!({"domain": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &state,
            "POST",
            "/projects/demo/prompt-tune",
            json_body(json!({"domain": "blockchain"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let stdout = parse(&body)["stdout"].as_str().unwrap().to_string();
        assert!(stdout.starts_with("prompt-tune --root "));
        assert!(stdout.ends_with("--domain blockchain --chunk-size 100 "));
    }

    #[tokio::test]
    async fn test_engine_failure_is_502_with_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "echo 'no settings.yaml' >&2; exit 1");
        make_project(&tmp, "demo");

        let (status, body) = send(&state, "POST", "/projects/demo/update", Body::empty()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(parse(&body)["error"].as_str().unwrap().contains("no settings.yaml"));
        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.update.failures, 1);
        assert_eq!(snapshot.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_query_without_marker_has_no_visualization() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "printf 'the index is still building'");
        make_project(&tmp, "demo");

        let (status, body) = send(
            &state,
            "POST",
            "/projects/demo/query",
            json_body(json!({"question": "What is SOL?", "method": "global"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let outcome = parse(&body);
        assert_eq!(outcome["response"], "");
        assert!(outcome["visualization"].is_null());

        let (status, _) = send(&state, "GET", "/visualization", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_keeps_answer_when_tables_are_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "printf 'SUCCESS: SOL is the native token [Data: Entities(3)]'");
        make_project(&tmp, "demo");

        let (status, body) = send(
            &state,
            "POST",
            "/projects/demo/query",
            json_body(json!({"question": "What is SOL?"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let outcome = parse(&body);
        assert_eq!(outcome["response"], "SUCCESS:SOL is the native token [Data: Entities(3)]");
        assert_eq!(outcome["references"]["entities"], json!([3]));
        assert!(outcome["visualization"].is_null());
        assert!(
            outcome["visualization_error"]
                .as_str()
                .unwrap()
                .contains("create_final_entities.parquet")
        );
        assert_eq!(state.metrics.snapshot().query.failures, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_queries_run_engine_in_parallel() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "sleep 1; printf 'still indexing'");
        make_project(&tmp, "demo");

        let query = || {
            send(
                &state,
                "POST",
                "/projects/demo/query",
                json_body(json!({"question": "What is SOL?"})),
            )
        };

        let started = std::time::Instant::now();
        let ((first, _), (second, _)) = tokio::join!(query(), query());
        let elapsed = started.elapsed();

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert!(elapsed < std::time::Duration::from_millis(1800), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_empty_question_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "true");
        make_project(&tmp, "demo");

        let (status, _) = send(
            &state,
            "POST",
            "/projects/demo/query",
            json_body(json!({"question": ""})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.metrics.snapshot().query.runs, 0);
    }

    #[tokio::test]
    async fn test_visualization_serves_latest_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp, "true");
        std::fs::write(&state.artifact_path, "<html>graph</html>").unwrap();

        let (status, body) = send(&state, "GET", "/visualization", Body::empty()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>graph</html>");
    }
}
