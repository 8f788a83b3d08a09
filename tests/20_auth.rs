mod common;

use axum::http::StatusCode;
use reflect_api::database::Store;
use reflect_api::policy::Role;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new();
    let (status, body) = app.get("/profile", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_tokens_are_rejected() {
    let app = TestApp::new();
    let (status, _) = app.get("/reflections", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Signed with another secret
    let mut other = app.config.security.clone();
    other.jwt_secret = "someone-else".into();
    let claims = reflect_api::auth::Claims::new(Uuid::new_v4(), Some("x@example.com".into()), None, &other);
    let token = reflect_api::auth::generate_jwt(&claims, &other).unwrap();
    let (status, _) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn first_sign_in_provisions_a_learner() {
    let app = TestApp::new();
    let id = Uuid::new_v4();
    let token = app.token_for(id, Some("new.person@example.com"), None);

    let (status, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.to_string());
    assert_eq!(body["data"]["role"], "learner");
    assert_eq!(body["data"]["name"], "new.person");
    let learner = app.store.find_learner_by_user(id).await.unwrap().expect("learner record");
    assert!(learner.active);
    assert_eq!(learner.team_id, None);
}

#[tokio::test]
async fn first_sign_in_needs_an_email() {
    let app = TestApp::new();
    let token = app.token_for(Uuid::new_v4(), None, Some("Nobody"));
    let (status, _) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_prefix_is_guarded_by_role() {
    let app = TestApp::new();
    let learner = app.sign_in("Lou Learner").await;
    let coach = app.user_with_role("Cam Coach", Role::Coach).await;
    let admin = app.user_with_role("Avery Admin", Role::Admin).await;

    let (status, body) = app.get("/admin/users", Some(&learner.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.get("/admin/users", Some(&coach.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/admin/users", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn profile_update_validates_name() {
    let app = TestApp::new();
    let user = app.sign_in("Pat Profile").await;

    let (status, body) = app.patch("/profile/update", Some(&user.token), json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["name"].is_string());

    let (status, body) = app.patch("/profile/update", Some(&user.token), json!({ "name": "Pat P." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Pat P.");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let user = app.sign_in("Jay Json").await;

    let request = axum::http::Request::builder()
        .method("PATCH")
        .uri("/profile/update")
        .header("authorization", format!("Bearer {}", user.token))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{ not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn oversized_body_gets_a_json_error() {
    let mut config = reflect_api::config::AppConfig::development();
    config.api.max_request_size_bytes = 512;
    let app = TestApp::with_config(config);
    let learner = app.sign_in("Bo Bulk").await;

    let mut body = common::reflection_body("Long week");
    body["content"] = json!("x".repeat(2_000));
    let (status, body) = app.post("/reflections", Some(&learner.token), body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}
