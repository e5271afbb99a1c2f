use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::EngineError;
use project::ProjectError;
use query::QueryError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// The engine could not be started or exited non-zero; carries its stderr.
    Engine(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Engine(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<ProjectError> for ApiError {
    fn from(e: ProjectError) -> Self {
        match e {
            ProjectError::NotFound(_) | ProjectError::FileNotFound(_) => ApiError::NotFound(e.to_string()),
            ProjectError::InvalidName(_)
            | ProjectError::InvalidFileName(_)
            | ProjectError::UnsupportedFormat(_)
            | ProjectError::NoProjectSelected => ApiError::BadRequest(e.to_string()),
            ProjectError::Io { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Failed { stderr, .. } => ApiError::Engine(stderr),
            EngineError::Spawn { .. } => ApiError::Engine(e.to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::EmptyQuestion => ApiError::BadRequest(e.to_string()),
            QueryError::Project(e) => e.into(),
            QueryError::Engine(e) => e.into(),
            QueryError::Visualize(_) | QueryError::ReadArtifact { .. } | QueryError::Join(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}
