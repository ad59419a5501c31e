/// Integration tests for the Taskboard API
///
/// These tests exercise the full request path: router, auth middleware,
/// handlers, database, and the realtime fan-out. They require a running
/// PostgreSQL instance (`DATABASE_URL`) and a `JWT_SECRET`, like the
/// server itself.
mod common;

use axum::http::StatusCode;
use chrono::Duration as ChronoDuration;
use common::TestContext;
use serde_json::json;
use std::time::Duration;
use taskboard_shared::auth::jwt;
use taskboard_shared::events::{RealtimeEvent, Topic};
use taskboard_shared::models::activity::ActivityEntry;
use taskboard_shared::models::notification::Notification;
use taskboard_shared::models::task::Task;
use tower::Service as _;
use uuid::Uuid;

/// Registration returns 201 and a token whose claims match the row
#[tokio::test]
async fn test_register_returns_matching_token() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("alice-{}@example.com", Uuid::new_v4());
    let request = common::json_request(
        "POST",
        "/api/users",
        None,
        json!({
            "name": "Alice",
            "email": email,
            "password": "hunter2hunter2",
            "role": "manager"
        }),
    );

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::response_json(response).await;
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "manager");
    assert!(body.get("password_hash").is_none());

    // The embedded identity matches the created row.
    let claims =
        jwt::verify_token(body["token"].as_str().unwrap(), &ctx.config.jwt.secret).unwrap();
    assert_eq!(claims.uid.to_string(), body["uid"].as_str().unwrap());
    assert_eq!(claims.role, "manager");

    // Cleanup the registered user, then the seeded one.
    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Registering the same email twice fails and performs no second write
#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("dup-{}@example.com", Uuid::new_v4());
    let payload = json!({
        "name": "Bob",
        "email": email,
        "password": "hunter2hunter2",
        "role": "member"
    });

    let first = ctx
        .app
        .clone()
        .call(common::json_request("POST", "/api/users", None, payload.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = ctx
        .app
        .clone()
        .call(common::json_request("POST", "/api/users", None, payload))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let body = common::response_json(second).await;
    assert_eq!(body["error"], "Email already exists");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Missing fields are reported together, before any store access
#[tokio::test]
async fn test_register_missing_fields() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request("POST", "/api/users", None, json!({ "name": "NoEmail" }));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::response_json(response).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password", "role"]);

    ctx.cleanup().await.unwrap();
}

/// Wrong password and unknown email fail identically
#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();

    let wrong_password = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": ctx.user.email, "password": "not-the-password" }),
        ))
        .await
        .unwrap();

    let unknown_email = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "whatever" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let body_a = common::response_json(wrong_password).await;
    let body_b = common::response_json(unknown_email).await;
    assert_eq!(body_a, body_b);

    ctx.cleanup().await.unwrap();
}

/// A successful login returns a usable token
#[tokio::test]
async fn test_login_success() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": ctx.user.email, "password": common::TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    assert_eq!(body["uid"], ctx.user.uid.to_string());
    assert_eq!(body["role"], ctx.user.role);

    let claims =
        jwt::verify_token(body["token"].as_str().unwrap(), &ctx.config.jwt.secret).unwrap();
    assert_eq!(claims.uid, ctx.user.uid);

    ctx.cleanup().await.unwrap();
}

/// Authenticated routes reject missing and invalid tokens differently
#[tokio::test]
async fn test_bearer_auth_rejections() {
    let ctx = TestContext::new().await.unwrap();

    let no_token = ctx
        .app
        .clone()
        .call(common::empty_request("GET", "/api/projects", None))
        .await
        .unwrap();
    assert_eq!(no_token.status(), StatusCode::UNAUTHORIZED);

    let bad_token = ctx
        .app
        .clone()
        .call(common::empty_request(
            "GET",
            "/api/projects",
            Some("Bearer not-a-token"),
        ))
        .await
        .unwrap();
    assert_eq!(bad_token.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// A status update writes exactly one audit row with the true prior status
/// and broadcasts the event
#[tokio::test]
async fn test_update_status_audit_and_broadcast() {
    let ctx = TestContext::new().await.unwrap();
    let project = common::create_test_project(&ctx).await.unwrap();
    let task = common::create_test_task(&ctx, project.uid).await.unwrap();

    let mut rx = ctx.state.events.subscribe();

    let response = ctx
        .app
        .clone()
        .call(common::json_request(
            "PATCH",
            &format!("/api/tasks/{}/status", task.uid),
            Some(&ctx.auth_header()),
            json!({ "status": "in_progress" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    assert_eq!(body["status"], "in_progress");

    // Exactly one audit row, recording the prior status.
    let entries = ActivityEntry::list_by_task(&ctx.db, task.uid).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "updated_status");
    assert_eq!(entries[0].details["from"], "to_do");
    assert_eq!(entries[0].details["to"], "in_progress");
    assert_eq!(entries[0].user_uid, ctx.user.uid);

    // The event went out on the task topic (and again on the project topic).
    let envelope = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(envelope.topic, Topic::Task(task.uid));
    match envelope.event {
        RealtimeEvent::TaskStatusUpdated(payload) => {
            assert_eq!(payload.task_uid, task.uid);
            assert_eq!(payload.status, "in_progress");
        }
        other => panic!("Expected task_status_updated, got {}", other.name()),
    }

    let envelope = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(envelope.topic, Topic::Project(project.uid));

    ctx.cleanup().await.unwrap();
}

/// Updating an unknown task reports 400
#[tokio::test]
async fn test_update_status_unknown_task() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(common::json_request(
            "PATCH",
            &format!("/api/tasks/{}/status", Uuid::new_v4()),
            Some(&ctx.auth_header()),
            json!({ "status": "done" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::response_json(response).await;
    assert_eq!(body["error"], "Task not found");

    ctx.cleanup().await.unwrap();
}

/// Two concurrent status updates both succeed, both audit, both broadcast
#[tokio::test]
async fn test_concurrent_status_updates() {
    let ctx = TestContext::new().await.unwrap();
    let project = common::create_test_project(&ctx).await.unwrap();
    let task = common::create_test_task(&ctx, project.uid).await.unwrap();

    let mut rx = ctx.state.events.subscribe();

    let request_a = common::json_request(
        "PATCH",
        &format!("/api/tasks/{}/status", task.uid),
        Some(&ctx.auth_header()),
        json!({ "status": "in_progress" }),
    );
    let request_b = common::json_request(
        "PATCH",
        &format!("/api/tasks/{}/status", task.uid),
        Some(&ctx.auth_header()),
        json!({ "status": "done" }),
    );

    let (response_a, response_b) = tokio::join!(
        ctx.app.clone().call(request_a),
        ctx.app.clone().call(request_b),
    );

    assert_eq!(response_a.unwrap().status(), StatusCode::OK);
    assert_eq!(response_b.unwrap().status(), StatusCode::OK);

    // Both writes are audited independently.
    let entries = ActivityEntry::list_by_task(&ctx.db, task.uid).await.unwrap();
    assert_eq!(entries.len(), 2);

    // The stored status is whichever write committed last.
    let stored = Task::find_by_uid(&ctx.db, task.uid).await.unwrap().unwrap();
    assert!(stored.status == "in_progress" || stored.status == "done");

    // Two task-topic events (each update also publishes on the project
    // topic).
    let mut task_topic_events = 0;
    for _ in 0..4 {
        let envelope = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        if envelope.topic == Topic::Task(task.uid) {
            task_topic_events += 1;
        }
    }
    assert_eq!(task_topic_events, 2);

    ctx.cleanup().await.unwrap();
}

/// A comment broadcasts on the task topic and notifies mentioned users
#[tokio::test]
async fn test_add_comment_broadcast_and_mentions() {
    let ctx = TestContext::new().await.unwrap();
    let project = common::create_test_project(&ctx).await.unwrap();
    let task = common::create_test_task(&ctx, project.uid).await.unwrap();

    let mut rx = ctx.state.events.subscribe();

    let response = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            &format!("/api/tasks/{}/comments", task.uid),
            Some(&ctx.auth_header()),
            json!({
                "content": "Looks good",
                "mentions": [ctx.user.uid.to_string()]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::response_json(response).await;
    assert_eq!(body["content"], "Looks good");
    assert_eq!(body["task_uid"], task.uid.to_string());

    // First the comment event on the task topic.
    let envelope = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(envelope.topic, Topic::Task(task.uid));
    assert_eq!(envelope.event.name(), "new_comment_added");

    // Then the mention notification on the user topic.
    let envelope = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(envelope.topic, Topic::User(ctx.user.uid));
    match envelope.event {
        RealtimeEvent::NotificationCreated(notification) => {
            assert_eq!(notification.user_uid, ctx.user.uid);
            assert_eq!(notification.notification_type, "mention");
            assert!(!notification.is_read);
        }
        other => panic!("Expected notification_created, got {}", other.name()),
    }

    // The row is queryable through the REST surface, newest first.
    let notifications = Notification::list_by_user(&ctx.db, ctx.user.uid)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);

    ctx.cleanup().await.unwrap();
}

/// Notifications list and read-marking round trip
#[tokio::test]
async fn test_notifications_endpoints() {
    let ctx = TestContext::new().await.unwrap();
    let project = common::create_test_project(&ctx).await.unwrap();
    let task = common::create_test_task(&ctx, project.uid).await.unwrap();

    // Mention ourselves to create a notification.
    ctx.app
        .clone()
        .call(common::json_request(
            "POST",
            &format!("/api/tasks/{}/comments", task.uid),
            Some(&ctx.auth_header()),
            json!({ "content": "ping", "mentions": [ctx.user.uid.to_string()] }),
        ))
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(common::empty_request(
            "GET",
            "/api/notifications",
            Some(&ctx.auth_header()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["is_read"], false);
    let notification_uid = list[0]["uid"].as_str().unwrap().to_string();

    let response = ctx
        .app
        .clone()
        .call(common::empty_request(
            "PATCH",
            &format!("/api/notifications/{}/read", notification_uid),
            Some(&ctx.auth_header()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    assert_eq!(body["is_read"], true);

    ctx.cleanup().await.unwrap();
}

/// Realtime handshake rejects missing and expired tokens distinguishably
#[tokio::test]
async fn test_realtime_handshake_rejections() {
    let ctx = TestContext::new().await.unwrap();

    let missing = ctx
        .app
        .clone()
        .call(common::ws_handshake_request("/api/realtime"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let expired_token = jwt::sign_claims(
        &jwt::Claims::with_ttl(ctx.user.uid, "member", ChronoDuration::seconds(-3600)),
        &ctx.config.jwt.secret,
    )
    .unwrap();

    let expired = ctx
        .app
        .clone()
        .call(common::ws_handshake_request(&format!(
            "/api/realtime?token={}",
            expired_token
        )))
        .await
        .unwrap();
    assert_eq!(expired.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Team roster CRUD round trip
#[tokio::test]
async fn test_team_members_crud() {
    let ctx = TestContext::new().await.unwrap();

    let created = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/team/members",
            Some(&ctx.auth_header()),
            json!({ "name": "Carol", "role": "Member" }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let member = common::response_json(created).await;
    let member_uid = member["uid"].as_str().unwrap().to_string();

    let updated = ctx
        .app
        .clone()
        .call(common::json_request(
            "PUT",
            &format!("/api/team/members/{}", member_uid),
            Some(&ctx.auth_header()),
            json!({ "role": "Manager" }),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(common::response_json(updated).await["role"], "Manager");

    let deleted = ctx
        .app
        .clone()
        .call(common::empty_request(
            "DELETE",
            &format!("/api/team/members/{}", member_uid),
            Some(&ctx.auth_header()),
        ))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = ctx
        .app
        .clone()
        .call(common::empty_request(
            "DELETE",
            &format!("/api/team/members/{}", member_uid),
            Some(&ctx.auth_header()),
        ))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// End-to-end scenario: register, login, project, task, status change,
/// audit row, and broadcast
#[tokio::test]
async fn test_end_to_end_flow() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("alice-{}@example.com", Uuid::new_v4());
    let registered = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/users",
            None,
            json!({
                "name": "Alice",
                "email": email,
                "password": "hunter2hunter2",
                "role": "manager"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::CREATED);

    let login = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let session = common::response_json(login).await;
    let auth = format!("Bearer {}", session["token"].as_str().unwrap());

    let project = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/projects",
            Some(&auth),
            json!({
                "title": "Launch",
                "description": "Product launch",
                "due_date": "2025-01-01",
                "priority": "High"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(project.status(), StatusCode::CREATED);
    let project = common::response_json(project).await;
    assert_eq!(project["status"], "active");

    let task = ctx
        .app
        .clone()
        .call(common::json_request(
            "POST",
            "/api/tasks",
            Some(&auth),
            json!({
                "project_uid": project["uid"],
                "title": "Ship it"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(task.status(), StatusCode::CREATED);
    let task = common::response_json(task).await;
    assert_eq!(task["status"], "to_do");
    let task_uid = Uuid::parse_str(task["uid"].as_str().unwrap()).unwrap();

    let mut rx = ctx.state.events.subscribe();

    let updated = ctx
        .app
        .clone()
        .call(common::json_request(
            "PATCH",
            &format!("/api/tasks/{}/status", task_uid),
            Some(&auth),
            json!({ "status": "in_progress" }),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);

    let entries = ActivityEntry::list_by_task(&ctx.db, task_uid).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].details["from"], "to_do");
    assert_eq!(entries[0].details["to"], "in_progress");

    let envelope = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    match envelope.event {
        RealtimeEvent::TaskStatusUpdated(payload) => {
            assert_eq!(payload.task_uid, task_uid);
            assert_eq!(payload.status, "in_progress");
        }
        other => panic!("Expected task_status_updated, got {}", other.name()),
    }

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}
