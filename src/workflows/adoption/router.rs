use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::announcements::{AnnouncementDirectory, AnnouncementFilter, AnnouncementPatch};
use super::domain::{AdopterId, AnnouncementId, ApplicationId, ReportId, ReportTarget, ShelterId};
use super::error::WorkflowError;
use super::notifications::NotificationDispatcher;
use super::pagination::{paginate, PageError};
use super::reports::{ReportDecision, ReportDesk};
use super::repository::AdoptionStore;
use super::service::AdoptionWorkflow;
use super::verification::VerificationGate;

/// Shared handler state bundling the workflow components.
pub struct AdoptionState<S, N> {
    pub workflow: AdoptionWorkflow<S, N>,
    pub directory: AnnouncementDirectory<S>,
    pub gate: VerificationGate<S>,
    pub reports: ReportDesk<S>,
}

/// Router exposing the workflow operations to HTTP callers. Typed workflow
/// results are mapped here: `NotFound` to 404, `InvalidOperation` to 400,
/// store failures to 500.
pub fn adoption_router<S, N>(state: Arc<AdoptionState<S, N>>) -> Router
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(create_application::<S, N>))
        .route("/api/v1/applications/:id", get(get_application::<S, N>))
        .route(
            "/api/v1/applications/:id/withdraw",
            post(withdraw_application::<S, N>),
        )
        .route(
            "/api/v1/applications/:id/reject",
            post(reject_application::<S, N>),
        )
        .route(
            "/api/v1/applications/:id/accept",
            post(accept_application::<S, N>),
        )
        .route(
            "/api/v1/announcements/search",
            post(search_announcements::<S, N>),
        )
        .route("/api/v1/announcements/:id", get(get_announcement::<S, N>))
        .route(
            "/api/v1/announcements/:id",
            patch(update_announcement::<S, N>),
        )
        .route(
            "/api/v1/shelters/:id/announcements",
            get(shelter_announcements::<S, N>),
        )
        .route(
            "/api/v1/announcements/:id/likes/:adopter_id",
            put(set_like::<S, N>),
        )
        .route(
            "/api/v1/announcements/:id/likes/:adopter_id",
            delete(clear_like::<S, N>),
        )
        .route("/api/v1/verifications", post(grant_verification::<S, N>))
        .route(
            "/api/v1/verifications/:shelter_id/:adopter_id",
            get(check_verification::<S, N>),
        )
        .route("/api/v1/reports", post(file_report::<S, N>))
        .route("/api/v1/reports/:id/resolve", post(resolve_report::<S, N>))
        .with_state(state)
}

fn error_response(err: WorkflowError) -> Response {
    match err {
        WorkflowError::NotFound { entity, ref id } => {
            let payload = json!({
                "error": err.to_string(),
                "entity": entity,
                "id": id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        WorkflowError::InvalidOperation(message) => {
            let payload = json!({ "error": message });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        WorkflowError::Store(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn page_error_response(err: PageError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct CreateApplicationRequest {
    announcement_id: AnnouncementId,
    adopter_id: AdopterId,
}

async fn create_application<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Json(request): Json<CreateApplicationRequest>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state
        .workflow
        .create(request.announcement_id, request.adopter_id)
    {
        Ok(details) => (StatusCode::CREATED, Json(details.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_application<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.workflow.get(&ApplicationId(id)) {
        Ok(details) => (StatusCode::OK, Json(details.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn withdraw_application<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.workflow.withdraw(&ApplicationId(id)) {
        Ok(details) => (StatusCode::OK, Json(details.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn reject_application<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.workflow.reject(&ApplicationId(id)) {
        Ok(details) => (StatusCode::OK, Json(details.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn accept_application<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.workflow.accept(&ApplicationId(id)) {
        Ok(details) => (StatusCode::OK, Json(details.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(flatten)]
    filter: AnnouncementFilter,
    #[serde(default)]
    page_number: i64,
    #[serde(default = "default_page_size")]
    page_size: i64,
}

fn default_page_size() -> i64 {
    20
}

async fn search_announcements<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Json(request): Json<SearchRequest>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let cards = match state.directory.query(&request.filter) {
        Ok(cards) => cards,
        Err(err) => return error_response(err),
    };
    match paginate(cards, request.page_number, request.page_size) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => page_error_response(err),
    }
}

async fn get_announcement<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let id = AnnouncementId(id);
    match state.directory.get_by_id(&id) {
        Ok(Some(announcement)) => (StatusCode::OK, Json(announcement)).into_response(),
        Ok(None) => error_response(WorkflowError::not_found(
            super::domain::EntityKind::Announcement,
            &id,
        )),
        Err(err) => error_response(err),
    }
}

async fn update_announcement<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
    Json(patch): Json<AnnouncementPatch>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let id = AnnouncementId(id);
    match state.directory.update(&id, patch) {
        Ok(Some(announcement)) => (StatusCode::OK, Json(announcement)).into_response(),
        Ok(None) => error_response(WorkflowError::not_found(
            super::domain::EntityKind::Announcement,
            &id,
        )),
        Err(err) => error_response(err),
    }
}

async fn shelter_announcements<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.directory.list_for_shelter(&ShelterId(id)) {
        Ok(announcements) => (StatusCode::OK, Json(announcements)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn set_like<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path((id, adopter_id)): Path<(String, String)>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state
        .directory
        .set_like(&AdopterId(adopter_id), &AnnouncementId(id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn clear_like<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path((id, adopter_id)): Path<(String, String)>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state
        .directory
        .clear_like(&AdopterId(adopter_id), &AnnouncementId(id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct GrantRequest {
    adopter_id: AdopterId,
    shelter_id: ShelterId,
}

async fn grant_verification<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Json(request): Json<GrantRequest>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.gate.grant(&request.adopter_id, &request.shelter_id) {
        Ok(verification) => (StatusCode::CREATED, Json(verification)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn check_verification<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path((shelter_id, adopter_id)): Path<(String, String)>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state
        .gate
        .is_verified(&AdopterId(adopter_id), &ShelterId(shelter_id))
    {
        Ok(verified) => (StatusCode::OK, Json(json!({ "verified": verified }))).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct FileReportRequest {
    target: ReportTarget,
    message: String,
}

async fn file_report<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Json(request): Json<FileReportRequest>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.reports.file(request.target, request.message) {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct ResolveReportRequest {
    decision: ReportDecision,
}

async fn resolve_report<S, N>(
    State(state): State<Arc<AdoptionState<S, N>>>,
    Path(id): Path<String>,
    Json(request): Json<ResolveReportRequest>,
) -> Response
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match state.reports.resolve(&ReportId(id), request.decision) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}
