mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use image::GenericImageView;
use serde_json::{json, Value};

use common::{
    bearer, jpeg, multipart_body, multipart_content_type, settle, signup_user, test_state,
};
use taskmate::models::TaskListQuery;
use taskmate::routes;
use taskmate::store::{TaskStore, UserStore};

#[actix_rt::test]
async fn test_signup_then_me() {
    let (state, mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&json!({ "name": "Dacs", "email": "a@b.com", "password": "longpass1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["name"], "Dacs");
    assert_eq!(body["user"]["email"], "a@b.com");
    for hidden in ["password", "passwordHash", "tokens", "avatar"] {
        assert!(body["user"].get(hidden).is_none(), "{} leaked", hidden);
    }
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/users/me")
        .append_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["id"], body["user"]["id"]);

    settle().await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.com");
    assert_eq!(sent[0].subject, "Welcome!");
}

#[actix_rt::test]
async fn test_signup_rejections() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let cases = [
        json!({ "name": "Other", "email": "A@B.com", "password": "longpass1" }),
        json!({ "name": "Other", "email": "not-an-email", "password": "longpass1" }),
        json!({ "name": "Other", "email": "c@d.com", "password": "short" }),
        json!({ "name": "Other", "email": "c@d.com", "password": "mypassword1" }),
        json!({ "name": "Other", "email": "c@d.com", "password": "longpass1", "age": -3 }),
        json!({ "email": "c@d.com", "password": "longpass1" }),
    ];
    for case in cases {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(&case)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "accepted {}", case);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_rt::test]
async fn test_login_and_failures() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(&json!({ "email": "a@b.com", "password": "longpass1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert_ne!(body["token"], user.token.as_str());

    for (email, password) in [("a@b.com", "wrongpass1"), ("x@y.com", "longpass1")] {
        let req = test::TestRequest::post()
            .uri("/users/login")
            .set_json(&json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unable to login");
    }
}

#[actix_rt::test]
async fn test_logout_revokes_only_current_token() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let first = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(&json!({ "email": "a@b.com", "password": "longpass1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let second = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/users/logout")
        .append_header(bearer(&first.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/users/me")
        .append_header(bearer(&first.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Please authenticate." }));

    let req = test::TestRequest::get()
        .uri("/users/me")
        .append_header(bearer(&second))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_logout_all_revokes_every_token() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let first = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(&json!({ "email": "a@b.com", "password": "longpass1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let second = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/users/logoutAll")
        .append_header(bearer(&second))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for token in [first.token.as_str(), second.as_str()] {
        let req = test::TestRequest::get()
            .uri("/users/me")
            .append_header(bearer(token))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}

#[actix_rt::test]
async fn test_auth_gate_rejections() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let forged = taskmate::auth::generate_token(uuid::Uuid::new_v4(), "some-other-secret").unwrap();
    let unknown_user =
        taskmate::auth::generate_token(uuid::Uuid::new_v4(), common::JWT_SECRET).unwrap();

    let headers = [
        None,
        Some((header::AUTHORIZATION, "Token abc".to_string())),
        Some(bearer("not-a-jwt")),
        Some(bearer(&forged)),
        Some(bearer(&unknown_user)),
    ];
    for header in headers {
        let mut req = test::TestRequest::get().uri("/users/me");
        if let Some(header) = header {
            req = req.append_header(header);
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Please authenticate.");
    }
}

#[actix_rt::test]
async fn test_update_me_allow_list() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let req = test::TestRequest::patch()
        .uri("/users/me")
        .append_header(bearer(&user.token))
        .set_json(&json!({ "name": "Luis", "height": 120 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get()
        .uri("/users/me")
        .append_header(bearer(&user.token))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["name"], "Dacs");

    let req = test::TestRequest::patch()
        .uri("/users/me")
        .append_header(bearer(&user.token))
        .set_json(&json!({ "name": "Luis", "age": 31, "password": "newsecret9" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["name"], "Luis");
    assert_eq!(updated["age"], 31);

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(&json!({ "email": "a@b.com", "password": "newsecret9" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_delete_me_removes_tasks_and_says_goodbye() {
    let (state, mailer) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::config),
    )
    .await;
    let user = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    for description in ["one", "two"] {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .append_header(bearer(&user.token))
            .set_json(&json!({ "description": description }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::delete()
        .uri("/users/me")
        .append_header(bearer(&user.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = test::read_body_json(resp).await;
    assert_eq!(deleted["id"], user.id.as_str());

    let owner: uuid::Uuid = user.id.parse().unwrap();
    let remaining = state
        .store
        .list_tasks(owner, &TaskListQuery::default())
        .await
        .unwrap();
    assert!(remaining.is_empty());
    assert!(state.store.find_user(owner).await.unwrap().is_none());

    let req = test::TestRequest::get()
        .uri("/users/me")
        .append_header(bearer(&user.token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    settle().await;
    let subjects: Vec<String> = mailer.sent().into_iter().map(|e| e.subject).collect();
    assert_eq!(subjects, vec!["Welcome!".to_string(), "Goodbye!".to_string()]);
}

#[actix_rt::test]
async fn test_avatar_upload_and_fetch() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/users/me/avatar")
        .append_header(bearer(&user.token))
        .append_header(multipart_content_type())
        .set_payload(multipart_body("avatar", "me.jpg", &jpeg(10, 10)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/avatar", user.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let png = test::read_body(resp).await;
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.dimensions(), (250, 250));

    let req = test::TestRequest::delete()
        .uri("/users/me/avatar")
        .append_header(bearer(&user.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/avatar", user.id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_avatar_rejections() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;
    let user = signup_user(&app, "Dacs", "a@b.com", "longpass1").await.unwrap();

    let oversized = vec![0u8; 1_000_001];
    let cases: Vec<(&str, &str, Vec<u8>)> = vec![
        ("avatar", "x.gif", jpeg(10, 10)),
        ("avatar", "x.jpg", oversized),
        ("avatar", "x.png", b"not an image at all".to_vec()),
        ("picture", "x.jpg", jpeg(10, 10)),
    ];
    for (field, filename, content) in cases {
        let req = test::TestRequest::post()
            .uri("/users/me/avatar")
            .append_header(bearer(&user.token))
            .append_header(multipart_content_type())
            .set_payload(multipart_body(field, filename, &content))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::BAD_REQUEST,
            "accepted {} as {}",
            filename,
            field
        );
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/avatar", user.id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_avatar_fetch_with_malformed_id() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    for id in ["not-a-uuid", "00000000-0000-0000-0000-000000000000"] {
        let req = test::TestRequest::get()
            .uri(&format!("/users/{}/avatar", id))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}

#[actix_rt::test]
async fn test_avatar_upload_requires_auth() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/users/me/avatar")
        .append_header(multipart_content_type())
        .set_payload(multipart_body("avatar", "me.jpg", &jpeg(10, 10)))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_password_whitespace_is_trimmed() {
    let (state, _mailer) = test_state();
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&json!({ "name": "Short", "email": "short@b.com", "password": "  abc12  " }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let user = signup_user(&app, "Dacs", "a@b.com", " longpass1 ").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(&json!({ "email": "a@b.com", "password": "longpass1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["id"], user.id.as_str());
}
