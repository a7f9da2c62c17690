//! Local dashboard: a JSON API over generation, persistence and downloads.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::catalog::{Catalog, CheckPhase, FacilityType, FocusArea};
use crate::config::Config;
use crate::error::{ChecklistError, Result};
use crate::export::{self, ExportFormat};
use crate::pipeline::{ChecklistGenerator, GenerationRequest};
use crate::providers::ProviderSet;
use crate::store::{NewProject, Project, ProjectStore};

/// Shared state for the dashboard
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ProjectStore>,
    pub generator: Arc<ChecklistGenerator>,
}

impl AppState {
    pub fn new(config: Config, store: ProjectStore, providers: ProviderSet) -> Self {
        let generator = ChecklistGenerator::new(providers)
            .with_timeout(Duration::from_secs(config.provider_timeout_secs));
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            generator: Arc::new(generator),
        }
    }
}

/// Error wrapper mapping the taxonomy onto HTTP status codes.
pub struct ApiError(ChecklistError);

impl From<ChecklistError> for ApiError {
    fn from(e: ChecklistError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ChecklistError::Validation { .. } => StatusCode::BAD_REQUEST,
            ChecklistError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (
            status,
            Json(json!({"success": false, "error": self.0.to_string()})),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/options", get(options_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/projects", get(list_projects_handler))
        .route(
            "/api/projects/:id",
            get(get_project_handler).delete(delete_project_handler),
        )
        .route("/api/stats", get(stats_handler))
        .route("/download/:id/:format", get(download_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Dashboard listening on http://{}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn options_handler() -> Json<Value> {
    let catalog = Catalog::global();
    Json(json!({
        "facility_types": FacilityType::ALL.iter().map(|f| f.label()).collect::<Vec<_>>(),
        "check_phases": CheckPhase::ALL.iter().map(|p| p.label()).collect::<Vec<_>>(),
        "focus_areas": FocusArea::ALL.iter().map(|f| f.label()).collect::<Vec<_>>(),
        "categories": catalog.categories().collect::<Vec<_>>(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub keyword: String,
    #[serde(default = "default_facility_type")]
    pub facility_type: String,
    #[serde(default = "default_check_phase")]
    pub check_phase: String,
    #[serde(default)]
    pub focus_area: Option<String>,
    #[serde(default = "default_collect_data")]
    pub collect_data: bool,
}

fn default_facility_type() -> String {
    FacilityType::Other.label().to_string()
}

fn default_check_phase() -> String {
    CheckPhase::Regular.label().to_string()
}

fn default_collect_data() -> bool {
    true
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> ApiResult<Json<Value>> {
    let request = GenerationRequest::new(body.keyword, body.facility_type, body.check_phase)
        .with_focus(body.focus_area)
        .with_collect(body.collect_data);

    let result = state.generator.generate(&request).await?;

    let out_dir = PathBuf::from(&state.config.output_dir);
    let md = export::export_markdown(&result, &out_dir, None)?;
    let json_path = export::export_json(&result, &out_dir, None)?;

    let project = NewProject::new(result, request.collect).with_paths(
        Some(md.display().to_string()),
        Some(json_path.display().to_string()),
    );
    let id = state.store.create(&project)?;

    Ok(Json(json!({
        "success": true,
        "project_id": id,
        "question_count": project.result.question_count(),
        "total_resources": project.result.research_summary.total_resources,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub keyword: Option<String>,
}

fn default_limit() -> usize {
    20
}

/// List rows without the full result payload.
fn project_summary(project: &Project) -> Value {
    json!({
        "id": project.id,
        "keyword": project.keyword,
        "facility_type": project.facility_type,
        "check_phase": project.check_phase,
        "focus_area": project.focus_area,
        "data_collected": project.data_collected,
        "created_at": project.created_at,
        "question_count": project.result.question_count(),
        "total_resources": project.result.research_summary.total_resources,
    })
}

async fn list_projects_handler(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Json<Value>> {
    let keyword = query.keyword.as_deref();
    let projects = state.store.list(query.limit, query.offset, keyword)?;
    let total = state.store.count(keyword)?;
    Ok(Json(json!({
        "success": true,
        "projects": projects.iter().map(project_summary).collect::<Vec<_>>(),
        "total": total,
        "limit": query.limit,
        "offset": query.offset,
    })))
}

async fn get_project_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let project = state.store.get(id)?;
    Ok(Json(json!({"success": true, "project": project})))
}

async fn delete_project_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    if !state.store.delete(id)? {
        return Err(ChecklistError::NotFound { id }.into());
    }
    Ok(Json(json!({"success": true})))
}

async fn stats_handler(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let stats = state.store.stats()?;
    Ok(Json(json!({"success": true, "stats": stats})))
}

/// `filename` carries an ASCII fallback, `filename*` the exact UTF-8 name.
fn attachment_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

async fn download_handler(
    State(state): State<AppState>,
    Path((id, format)): Path<(i64, String)>,
) -> ApiResult<Response> {
    let format = match format.as_str() {
        "markdown" => ExportFormat::Markdown,
        "json" => ExportFormat::Json,
        other => {
            return Err(ChecklistError::validation(format!(
                "unknown download format '{}' (expected markdown or json)",
                other
            ))
            .into())
        }
    };

    let project = state.store.get(id)?;
    let (content_type, body) = match format {
        ExportFormat::Markdown => (
            "text/markdown; charset=utf-8",
            export::to_document(&project.result),
        ),
        ExportFormat::Json => (
            "application/json",
            export::to_structured(&project.result)?,
        ),
    };
    let disposition = attachment_disposition(&export::default_file_name(&project.result, format));

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
