use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use taskmanager::auth::{IdentityFilter, PasswordHasher, TokenCodec};
use taskmanager::models::Task;
use taskmanager::store::MemoryStore;
use taskmanager::{routes, AppState};

fn hasher() -> PasswordHasher {
    PasswordHasher::new(4).expect("bcrypt cost 4 is valid")
}

fn codec() -> TokenCodec {
    TokenCodec::new(b"tasks-integration-secret", Duration::hours(24))
}

async fn register_and_sign_in(state: &AppState, username: &str, password: &str) -> String {
    state
        .auth
        .sign_up(username, password)
        .await
        .expect("Failed to register test user");
    let (_, token) = state
        .auth
        .sign_in(username, password)
        .await
        .expect("Failed to sign in test user");
    token
}

async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
    token: &str,
) -> (StatusCode, Vec<u8>) {
    let req = req
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    (status, test::read_body(resp).await.to_vec())
}

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let state = web::Data::new(AppState::in_memory(hasher(), codec()));
    let token = register_and_sign_in(&state, "crud_user", "PasswordCrud123!").await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(IdentityFilter)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    // 1. Create
    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/user/new-task").set_json(json!({
            "title": "Write report",
            "deadline": "2023-12-05T01:16:30",
            "context": "quarterly numbers"
        })),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8_lossy(&body), "Task Write report was created");

    // 2. List
    let (status, body) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token).await;
    assert_eq!(status, StatusCode::OK);
    let tasks: Vec<Task> = serde_json::from_slice(&body).unwrap();
    assert_eq!(tasks.len(), 1);
    let created = tasks[0].clone();
    assert_eq!(created.title, "Write report");
    assert_eq!(created.context.as_deref(), Some("quarterly numbers"));
    assert_eq!(
        created.deadline,
        Some("2023-12-05T01:16:30".parse().unwrap())
    );
    assert!(!created.is_completed);
    assert!(!created.is_expired);

    // 3. Partial update
    let (status, body) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/user/edit-task/{}", created.id))
            .set_json(json!({ "isCompleted": "true", "title": "Report sent" })),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Task = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Report sent");
    assert!(updated.is_completed);
    assert!(!updated.is_expired);
    assert_eq!(updated.context, created.context);
    assert_eq!(updated.deadline, created.deadline);
    assert_eq!(updated.created_time, created.created_time);
    assert_eq!(updated.user_id, created.user_id);

    // 4. Empty update is a no-op that still succeeds
    let (status, body) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/user/edit-task/{}", created.id))
            .set_json(json!({})),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let unchanged: Task = serde_json::from_slice(&body).unwrap();
    assert_eq!(unchanged, updated);

    // 5. Delete
    let (status, body) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/user/delete-task/{}", created.id)),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8_lossy(&body), "Successfully deleted");

    let (_, body) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token).await;
    let tasks: Vec<Task> = serde_json::from_slice(&body).unwrap();
    assert!(tasks.is_empty());

    // 6. Deleting again is not an error
    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/user/delete-task/{}", created.id)),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_task_pagination() {
    let state = web::Data::new(AppState::in_memory(hasher(), codec()));
    let token = register_and_sign_in(&state, "pager", "pw").await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(IdentityFilter)
            .configure(routes::config),
    )
    .await;

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/user/tasks?from=1&to=10"),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8_lossy(&body), "[]");

    for i in 1..=12 {
        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri("/user/new-task")
                .set_json(json!({ "title": format!("task {}", i) })),
            &token,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let titles = |body: Vec<u8>| -> Vec<String> {
        serde_json::from_slice::<Vec<Task>>(&body)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect()
    };

    let (_, body) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token).await;
    assert_eq!(titles(body).len(), 10, "defaults to from=1, to=10");

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/user/tasks?from=3&to=5"),
        &token,
    )
    .await;
    assert_eq!(titles(body), vec!["task 3", "task 4", "task 5"]);

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/user/tasks?from=11&to=20"),
        &token,
    )
    .await;
    assert_eq!(titles(body), vec!["task 11", "task 12"]);

    for query in ["from=5&to=3", "from=-1&to=10", "from=0&to=10", "from=1&to=0"] {
        let (status, body) = send(
            &app,
            test::TestRequest::get().uri(&format!("/user/tasks?{}", query)),
            &token,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert!(body.is_empty());
    }
}

#[actix_rt::test]
async fn test_update_missing_task_is_not_found() {
    let state = web::Data::new(AppState::in_memory(hasher(), codec()));
    let token = register_and_sign_in(&state, "editor", "pw").await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(IdentityFilter)
            .configure(routes::config),
    )
    .await;

    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri("/user/edit-task/999")
            .set_json(json!({ "title": "nope" })),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_task_ownership() {
    let state = web::Data::new(AppState::in_memory(hasher(), codec()));
    let token_a = register_and_sign_in(&state, "owner_a", "pw-a").await;
    let token_b = register_and_sign_in(&state, "other_b", "pw-b").await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(IdentityFilter)
            .configure(routes::config),
    )
    .await;

    send(
        &app,
        test::TestRequest::post()
            .uri("/user/new-task")
            .set_json(json!({ "title": "A's task" })),
        &token_a,
    )
    .await;
    let (_, body) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token_a).await;
    let task_a: Task = serde_json::from_slice::<Vec<Task>>(&body).unwrap().remove(0);

    // B does not see A's task
    let (_, body) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token_b).await;
    assert_eq!(String::from_utf8_lossy(&body), "[]");

    // B cannot edit it
    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/user/edit-task/{}", task_a.id))
            .set_json(json!({ "title": "Hijacked" })),
        &token_b,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // B's delete answers as usual but removes nothing
    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/user/delete-task/{}", task_a.id)),
        &token_b,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token_a).await;
    let tasks_a: Vec<Task> = serde_json::from_slice(&body).unwrap();
    assert_eq!(tasks_a, vec![task_a]);
}

#[actix_rt::test]
async fn test_task_routes_require_session() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::in_memory(hasher(), codec())))
            .wrap(IdentityFilter)
            .configure(routes::config),
    )
    .await;

    let requests = vec![
        test::TestRequest::get().uri("/user/tasks"),
        test::TestRequest::post()
            .uri("/user/new-task")
            .set_json(json!({ "title": "anon" })),
        test::TestRequest::patch()
            .uri("/user/edit-task/1")
            .set_json(json!({})),
        test::TestRequest::delete().uri("/user/delete-task/1"),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_rt::test]
async fn test_token_of_removed_user_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let state = web::Data::new(AppState::new(store.clone(), store.clone(), hasher(), codec()));
    let token = register_and_sign_in(&state, "ghost", "pw").await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(IdentityFilter)
            .configure(routes::config),
    )
    .await;

    let (status, _) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token).await;
    assert_eq!(status, StatusCode::OK);

    store.remove_user("ghost").await;

    let (status, _) = send(&app, test::TestRequest::get().uri("/user/tasks"), &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
