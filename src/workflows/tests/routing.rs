use super::common::*;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::access::{AccessGuard, Menu, PermissionEvaluator, Role, RoleRegistry};
use crate::clock::FixedClock;
use crate::persistence::InMemoryStore;
use crate::router::{api_router, ApiState, IDENTITY_HEADER};
use crate::session::{IdentityDirectory, Session};
use crate::workflows::WorkflowEngine;

struct Api {
    router: Router,
    state: Arc<ApiState<InMemoryStore>>,
}

fn api() -> Api {
    let store = Arc::new(InMemoryStore::new());
    let state = Arc::new(ApiState {
        engine: WorkflowEngine::with_clock(store.clone(), Arc::new(FixedClock::on(today()))),
        directory: IdentityDirectory::new(store),
        guard: AccessGuard::new(PermissionEvaluator::new(Arc::new(RoleRegistry::standard()))),
        menu: Menu::standard(),
    });
    Api {
        router: api_router(state.clone()),
        state,
    }
}

fn identity_id(session: &Session) -> String {
    session.identity().expect("authenticated").id.0.clone()
}

async fn send(router: &Router, method: &str, uri: &str, as_id: Option<&str>, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(id) = as_id {
        request = request.header(IDENTITY_HEADER, id);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn hiring_flow_over_http() {
    let api = api();
    let admin = api.state.directory.bootstrap_admin(ADMIN_EMAIL).unwrap();

    let response = send(
        &api.router,
        "POST",
        "/api/v1/identities",
        None,
        Some(json!({ "email": "a@agency.test", "role": "agency", "display_name": "Acme" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let agency_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &api.router,
        "POST",
        "/api/v1/agencies",
        Some(&agency_id),
        Some(json!({ "name": "Acme Staffing", "subscription_tier": "starter" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["subscription_status"], "trialing");

    let response = send(
        &api.router,
        "POST",
        "/api/v1/hiring-requests",
        Some(&agency_id),
        Some(json!({
            "job_title": "Welder",
            "quantity": 50,
            "destination_country": "Germany",
            "deadline": deadline().to_string(),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["status"], "pending");
    let request_id = created["id"].as_str().unwrap().to_string();

    let transitions = format!("/api/v1/hiring-requests/{request_id}/transitions");
    let response = send(
        &api.router,
        "POST",
        &transitions,
        Some(&admin.id.0),
        Some(json!({ "to": "in_progress" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let moved = json_body(response).await;
    assert_eq!(moved["entity"], "hiring_request");
    assert_eq!(moved["status"], "in_progress");

    let response = send(
        &api.router,
        "POST",
        &transitions,
        Some(&agency_id),
        Some(json!({ "to": "fulfilled" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "authorization_denied");
    assert_eq!(body["reason"]["reason"], "role_not_accepted");
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let api = api();
    let harness_store = api.state.engine.store().clone();
    let harness = harness_on(harness_store);
    let agency = harness.agency("a@agency.test");
    let talent = harness.talent("t@talent.test");
    let request = harness.pending_request(&agency, 2);
    let talent_id = identity_id(&talent);

    let apply = format!("/api/v1/hiring-requests/{}/applications", request.id);
    let response = send(&api.router, "POST", &apply, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&api.router, "POST", &apply, Some(&talent_id), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let application_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = send(&api.router, "POST", &apply, Some(&talent_id), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "duplicate_application");
    assert_eq!(body["existing_application_id"], application_id.as_str());

    let response = send(
        &api.router,
        "POST",
        &format!("/api/v1/applications/{application_id}/transitions"),
        Some(&identity_id(&harness.admin())),
        Some(json!({ "to": "accepted" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_transition");
    assert_eq!(body["rejection"]["rule"], "no_edge");

    let response = send(
        &api.router,
        "POST",
        "/api/v1/hiring-requests/hr-missing/applications",
        Some(&talent_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&api.router, "GET", "/api/v1/applications/mine", Some(&talent_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn menu_and_access_check_follow_the_role_table() {
    let api = api();
    let harness = harness_on(api.state.engine.store().clone());
    let talent = identity_id(&harness.talent("t@talent.test"));

    let response = send(&api.router, "GET", "/api/v1/menu", None, None).await;
    assert_eq!(json_body(response).await["items"], json!([]));

    let response = send(&api.router, "GET", "/api/v1/menu", Some(&talent), None).await;
    let ids: Vec<String> = json_body(response).await["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["dashboard", "open_positions", "my_applications"]);

    let response = send(
        &api.router,
        "POST",
        "/api/v1/access/check",
        Some(&talent),
        Some(json!({ "roles": [Role::Admin.label()] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["granted"], false);
    assert_eq!(body["kind"], "authorization_denied");

    let response = send(
        &api.router,
        "POST",
        "/api/v1/access/check",
        Some(&talent),
        Some(json!({ "permission": "canApply" })),
    )
    .await;
    assert_eq!(json_body(response).await["granted"], true);

    let response = send(
        &api.router,
        "POST",
        "/api/v1/access/check",
        Some("user-unknown"),
        Some(json!({})),
    )
    .await;
    let body = json_body(response).await;
    assert_eq!(body["granted"], false);
    assert_eq!(body["kind"], "authentication_required");
}

#[tokio::test]
async fn staff_accounts_need_an_admin_caller() {
    let api = api();

    let response = send(
        &api.router,
        "POST",
        "/api/v1/identities",
        None,
        Some(json!({ "email": "ops@hireflow.test", "role": "team", "display_name": "Ops" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = api.state.directory.bootstrap_admin(ADMIN_EMAIL).unwrap();
    let response = send(
        &api.router,
        "POST",
        "/api/v1/identities",
        Some(&admin.id.0),
        Some(json!({ "email": "ops@hireflow.test", "role": "team", "display_name": "Ops" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["role"], "team");
}
