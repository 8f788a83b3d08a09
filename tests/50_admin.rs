mod common;

use axum::http::StatusCode;
use reflect_api::policy::Role;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn team_lifecycle() {
    let app = TestApp::new();
    let admin = app.user_with_role("Ari Admin", Role::Admin).await;
    let coach = app.user_with_role("Cole Coach", Role::Coach).await;
    let learner = app.sign_in("Tess Team").await;

    let (status, team) = app.post("/admin/teams", Some(&admin.token), json!({ "name": "Cohort 7" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(team["data"]["active"], true);
    let team_id = team["data"]["id"].as_str().unwrap().to_string();

    let (status, assigned) = app
        .post(
            "/admin/assign-learner-team",
            Some(&admin.token),
            json!({ "user_id": learner.id, "team_id": team_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["data"]["team_id"], team_id.as_str());

    let (status, members) = app.get(&format!("/teams/{}/members", team_id), Some(&coach.token)).await;
    assert_eq!(status, StatusCode::OK);
    let members = members["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["email"], learner.email.as_str());

    let (status, removed) = app
        .post("/admin/remove-learner-team", Some(&admin.token), json!({ "user_id": learner.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(removed["data"]["team_id"].is_null());
    assert_eq!(removed["data"]["id"], assigned["data"]["id"]);
    assert_eq!(removed["data"]["active"], assigned["data"]["active"]);
    assert_eq!(removed["data"]["user_id"], assigned["data"]["user_id"]);
}

#[tokio::test]
async fn removal_requires_user_id() {
    let app = TestApp::new();
    let admin = app.user_with_role("Ari Admin", Role::Admin).await;

    let (status, body) = app.post("/admin/remove-learner-team", Some(&admin.token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["user_id"].is_string());
}

#[tokio::test]
async fn teams_are_hidden_from_learners() {
    let app = TestApp::new();
    let learner = app.sign_in("Lex Learner").await;
    let (status, _) = app.get("/teams", Some(&learner.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_changes_roles() {
    let app = TestApp::new();
    let admin = app.user_with_role("Ari Admin", Role::Admin).await;
    let learner = app.sign_in("Pro Motion").await;

    let (status, body) = app
        .post(&format!("/admin/users/{}/role", learner.id), Some(&admin.token), json!({ "role": "coach" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "coach");

    // The new role applies on the next request
    let (status, _) = app.get("/coaching-logs", Some(&learner.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(&format!("/admin/users/{}/role", learner.id), Some(&admin.token), json!({ "role": "owner" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["role"].is_string());
}

#[tokio::test]
async fn deactivated_members_lose_write_access() {
    let app = TestApp::new();
    let admin = app.user_with_role("Ari Admin", Role::Admin).await;
    let coach = app.user_with_role("Cass Coach", Role::Coach).await;
    let learner = app.sign_in("Lou Learner").await;

    let (status, body) = app
        .post(&format!("/admin/users/{}/deactivate", learner.id), Some(&admin.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["learner"]["active"], false);

    let (status, _) = app.post("/reflections", Some(&learner.token), common::reflection_body("Paused")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(&format!("/admin/users/{}/activate", learner.id), Some(&admin.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/reflections", Some(&learner.token), common::reflection_body("Back")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(&format!("/admin/users/{}/deactivate", coach.id), Some(&admin.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["coach"]["active"], false);

    let learner_id = app.learner_record_id(&learner).await;
    let (status, _) = app
        .post(
            "/coaching-logs",
            Some(&coach.token),
            json!({ "learner_id": learner_id, "session_date": "2025-03-04", "session_type": "one_on_one", "notes": "Catch-up" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins have no membership to toggle; coaches cannot reach /admin at all
    let (status, _) = app
        .post(&format!("/admin/users/{}/deactivate", admin.id), Some(&admin.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .post(&format!("/admin/users/{}/activate", coach.id), Some(&coach.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
