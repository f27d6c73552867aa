//! End-to-end HTTP tests against a server running on an ephemeral port.

use serde_json::{json, Value};

use agora::db::RepositoryFactory;
use agora::http::{create_router, AppState};

/// Start a server over a fresh in-memory repository and return its base URL.
async fn spawn_app() -> String {
    let repo = RepositoryFactory::create_local();
    let uploads_dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(repo).with_uploads_dir(uploads_dir.path());
    // The directory must outlive the server task.
    std::mem::forget(uploads_dir);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}", addr)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client")
}

async fn register(base: &str, client: &reqwest::Client, nickname: &str, email: &str) -> Value {
    let resp = client
        .post(format!("{base}/api/accounts"))
        .json(&json!({
            "nickname": nickname,
            "email": email,
            "password": "password486",
        }))
        .send()
        .await
        .expect("register");
    assert!(resp.status().is_success());
    resp.json().await.expect("register body")
}

async fn login(base: &str, client: &reqwest::Client, email: &str) {
    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": email, "password": "password486" }))
        .send()
        .await
        .expect("login");
    assert!(resp.status().is_success());
}

#[tokio::test]
async fn health_reports_connected_storage() {
    let base = spawn_app().await;
    let body: Value = client()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "connected");
}

#[tokio::test]
async fn login_sets_both_identity_cookies() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "silvia", "s@example.com").await;

    let resp = c
        .post(format!("{base}/login"))
        .json(&json!({ "email": "s@example.com", "password": "password486" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let cookies: Vec<String> = resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("isLogined=true")));
    assert!(cookies.iter().any(|c| c.starts_with("userId=1")));
}

#[tokio::test]
async fn bad_credentials_are_rejected_with_401() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "silvia", "s@example.com").await;

    let resp = c
        .post(format!("{base}/login"))
        .json(&json!({ "email": "s@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "silvia", "s@example.com").await;

    let resp = c
        .post(format!("{base}/api/accounts"))
        .json(&json!({
            "nickname": "other",
            "email": "s@example.com",
            "password": "pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn creating_a_post_requires_the_identity_cookie() {
    let base = spawn_app().await;
    let resp = client()
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "t", "contents": "c" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn author_rules_apply_over_http() {
    let base = spawn_app().await;

    let author = client();
    register(&base, &author, "a", "a@example.com").await;
    login(&base, &author, "a@example.com").await;

    let stranger = client();
    register(&base, &stranger, "b", "b@example.com").await;
    login(&base, &stranger, "b@example.com").await;

    // The author creates a post with the cookie identity.
    let post: Value = author
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "hello", "contents": "world" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post_id = post["post_id"].as_i64().unwrap();
    assert_eq!(post["author_id"], 1);

    // A different logged-in user cannot edit or delete it.
    let resp = stranger
        .put(format!("{base}/api/posts/{post_id}"))
        .json(&json!({ "title": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "FORBIDDEN");

    let resp = stranger
        .delete(format!("{base}/api/posts/{post_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // checkEditPermission mirrors the same rule without mutating.
    let resp = stranger
        .get(format!("{base}/api/posts/{post_id}/checkEditPermission"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let resp = author
        .get(format!("{base}/api/posts/{post_id}/checkEditPermission"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The author's partial update only touches the supplied field.
    let updated: Value = author
        .put(format!("{base}/api/posts/{post_id}"))
        .json(&json!({ "title": "renamed" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["title"], "renamed");
    assert_eq!(updated["contents"], "world");

    let resp = author
        .delete(format!("{base}/api/posts/{post_id}"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = author
        .get(format!("{base}/api/posts/{post_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn views_count_up_per_request() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "a", "a@example.com").await;
    login(&base, &c, "a@example.com").await;

    let post: Value = c
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "t", "contents": "c" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post_id = post["post_id"].as_i64().unwrap();

    for expected in 1..=2 {
        let body: Value = c
            .put(format!("{base}/api/posts/{post_id}/views"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["views"], expected);
    }
}

#[tokio::test]
async fn comment_flow_over_http() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "a", "a@example.com").await;
    login(&base, &c, "a@example.com").await;

    let post: Value = c
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "t", "contents": "c" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post_id = post["post_id"].as_i64().unwrap();

    // Missing author is a validation failure, not an auth failure.
    let resp = c
        .post(format!("{base}/api/posts/{post_id}/comments"))
        .json(&json!({ "content": "no author" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let comment: Value = c
        .post(format!("{base}/api/posts/{post_id}/comments"))
        .json(&json!({ "comment_content": "hello", "user_id": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comment["comment_id"], 1);
    assert_eq!(comment["content"], "hello");

    let edited: Value = c
        .put(format!("{base}/api/posts/{post_id}/comments/1"))
        .json(&json!({ "comment_content": "edited" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited["content"], "edited");

    let listed: Value = c
        .get(format!("{base}/api/posts/{post_id}/comments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let resp = c
        .delete(format!("{base}/api/posts/{post_id}/comments/1"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = c
        .get(format!("{base}/api/posts/{post_id}/comments/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn deleting_an_account_cascades_and_clears_cookies() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "a", "a@example.com").await;
    login(&base, &c, "a@example.com").await;

    c.post(format!("{base}/api/posts"))
        .json(&json!({ "title": "t", "contents": "c" }))
        .send()
        .await
        .unwrap();

    let resp = c
        .delete(format!("{base}/api/accounts/1"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let cookies: Vec<String> = resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.contains("userId=;")));

    let posts: Value = c
        .get(format!("{base}/api/posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(posts.as_array().unwrap().is_empty());

    let resp = c
        .get(format!("{base}/api/accounts/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn logout_clears_the_identity() {
    let base = spawn_app().await;
    let c = client();
    register(&base, &c, "a", "a@example.com").await;
    login(&base, &c, "a@example.com").await;

    let resp = c.post(format!("{base}/logout")).send().await.unwrap();
    assert!(resp.status().is_success());

    // With the cookies gone, creating a post is unauthenticated again.
    let resp = c
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "t", "contents": "c" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
