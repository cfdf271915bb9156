use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::access::{AccessGuard, AccessRequirement, GuardDecision, Menu};
use crate::persistence::Store;
use crate::session::{IdentityDirectory, NewIdentity, Session, SessionContext};
use crate::workflows::{
    ApplicationId, ApplicationStatus, HiringRequestId, HiringRequestStatus, NewAgency,
    NewHiringRequest, TransitionRequest, WorkflowEngine, WorkflowError,
};

/// Header carrying the opaque id of the already-authenticated caller.
pub const IDENTITY_HEADER: &str = "x-identity-id";

/// Everything the HTTP handlers share.
pub struct ApiState<S> {
    pub engine: WorkflowEngine<S>,
    pub directory: IdentityDirectory<S>,
    pub guard: AccessGuard,
    pub menu: Menu,
}

impl<S: Store> ApiState<S> {
    pub fn new(store: Arc<S>, guard: AccessGuard) -> Self {
        Self {
            engine: WorkflowEngine::new(store.clone()),
            directory: IdentityDirectory::new(store),
            guard,
            menu: Menu::standard(),
        }
    }

    /// A fresh session for this request; unknown or missing ids are anonymous.
    fn session(&self, headers: &HeaderMap) -> Session {
        let identity_id = headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        SessionContext::new(self.directory.provider(identity_id)).session()
    }
}

/// Router exposing identity provisioning, access checks and both workflows.
pub fn api_router<S>(state: Arc<ApiState<S>>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/api/v1/identities", post(provision_handler::<S>))
        .route("/api/v1/menu", get(menu_handler::<S>))
        .route("/api/v1/access/check", post(access_check_handler::<S>))
        .route("/api/v1/agencies", post(register_agency_handler::<S>))
        .route(
            "/api/v1/hiring-requests",
            post(create_hiring_request_handler::<S>).get(agency_requests_handler::<S>),
        )
        .route(
            "/api/v1/hiring-requests/open",
            get(open_requests_handler::<S>),
        )
        .route(
            "/api/v1/hiring-requests/:hiring_request_id/transitions",
            post(hiring_request_transition_handler::<S>),
        )
        .route(
            "/api/v1/hiring-requests/:hiring_request_id/applications",
            post(apply_handler::<S>).get(request_applications_handler::<S>),
        )
        .route(
            "/api/v1/applications/mine",
            get(my_applications_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/transitions",
            post(application_transition_handler::<S>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TargetStatus<T> {
    to: T,
}

pub(crate) async fn provision_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
    Json(request): Json<NewIdentity>,
) -> Response {
    let session = state.session(&headers);
    respond(StatusCode::CREATED, state.directory.provision(&session, request))
}

pub(crate) async fn menu_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    let items = state.menu.list_for(&state.guard, &session);
    (StatusCode::OK, Json(json!({ "items": items }))).into_response()
}

pub(crate) async fn access_check_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
    Json(requirement): Json<AccessRequirement>,
) -> Response {
    let session = state.session(&headers);
    let payload = match state.guard.guard(&session, &requirement) {
        GuardDecision::Granted => json!({ "granted": true }),
        GuardDecision::Denied(denial) => json!({
            "granted": false,
            "kind": denial.kind(),
            "requirement": denial.requirement(),
            "reason": denial.reason(),
        }),
    };
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn register_agency_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
    Json(request): Json<NewAgency>,
) -> Response {
    let session = state.session(&headers);
    respond(
        StatusCode::CREATED,
        state.engine.register_agency(&session, request),
    )
}

pub(crate) async fn create_hiring_request_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
    Json(request): Json<NewHiringRequest>,
) -> Response {
    let session = state.session(&headers);
    respond(
        StatusCode::CREATED,
        state.engine.create_hiring_request(&session, request),
    )
}

pub(crate) async fn agency_requests_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    respond(
        StatusCode::OK,
        state.engine.hiring_requests_for_agency(&session),
    )
}

pub(crate) async fn open_requests_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    respond(StatusCode::OK, state.engine.open_hiring_requests(&session))
}

pub(crate) async fn hiring_request_transition_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(hiring_request_id): Path<String>,
    headers: HeaderMap,
    Json(target): Json<TargetStatus<HiringRequestStatus>>,
) -> Response {
    let session = state.session(&headers);
    let transition = TransitionRequest::HiringRequest {
        id: HiringRequestId(hiring_request_id),
        to: target.to,
    };
    respond(
        StatusCode::OK,
        state.engine.request_transition(&session, transition),
    )
}

pub(crate) async fn apply_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(hiring_request_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    respond(
        StatusCode::CREATED,
        state
            .engine
            .apply(&session, &HiringRequestId(hiring_request_id)),
    )
}

pub(crate) async fn request_applications_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(hiring_request_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    respond(
        StatusCode::OK,
        state
            .engine
            .applications_for_request(&session, &HiringRequestId(hiring_request_id)),
    )
}

pub(crate) async fn my_applications_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    respond(
        StatusCode::OK,
        state.engine.applications_for_candidate(&session),
    )
}

pub(crate) async fn application_transition_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    Json(target): Json<TargetStatus<ApplicationStatus>>,
) -> Response {
    let session = state.session(&headers);
    let transition = TransitionRequest::Application {
        id: ApplicationId(application_id),
        to: target.to,
    };
    respond(
        StatusCode::OK,
        state.engine.request_transition(&session, transition),
    )
}

fn respond<T: serde::Serialize>(success: StatusCode, result: Result<T, WorkflowError>) -> Response {
    match result {
        Ok(body) => (success, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Kind plus machine-readable detail; callers choose their own wording.
pub(crate) fn error_response(err: WorkflowError) -> Response {
    let kind = err.kind();
    let mut payload = json!({
        "error": err.to_string(),
        "kind": kind,
    });
    match &err {
        WorkflowError::AuthorizationDenied { reason } => {
            payload["reason"] = json!(reason);
        }
        WorkflowError::InvalidTransition { entity, rejection } => {
            payload["entity"] = json!(entity);
            payload["rejection"] = json!(rejection);
        }
        WorkflowError::DuplicateApplication { existing } => {
            payload["existing_application_id"] = json!(existing);
        }
        WorkflowError::InvalidInput { field, .. } => {
            payload["field"] = json!(field);
        }
        _ => {}
    }
    (kind.status_code(), Json(payload)).into_response()
}
