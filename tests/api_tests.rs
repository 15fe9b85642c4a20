//! End-to-end API tests: registration, login, session cookies and the
//! owner-gated fruit CRUD surface, driven over a real listener with a
//! cookie-jar HTTP client.

use std::net::SocketAddr;

use fruitstand::server::{router, AppState};
use fruitstand::session::SessionKeys;
use serde_json::{json, Value};

/// Spawn a server on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let state = AppState::new(SessionKeys::new(vec!["test-key-1".into(), "test-key-2".into()]));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client")
}

async fn register(client: &reqwest::Client, base: &str, email: &str, password: &str) -> Value {
    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("register request");
    assert_eq!(resp.status(), 200);
    resp.json().await.expect("register body")
}

async fn login(client: &reqwest::Client, base: &str, email: &str, password: &str) {
    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status(), 200);
}

async fn create_fruit(client: &reqwest::Client, base: &str, name: &str, color: &str, emoji: &str) -> reqwest::Response {
    client
        .post(format!("{base}/api/fruits"))
        .json(&json!({ "name": name, "color": color, "emoji": emoji }))
        .send()
        .await
        .expect("create request")
}

#[tokio::test]
async fn register_login_create_assigns_ownership() {
    let base = spawn_server().await;
    let c = client();

    let registered = register(&c, &base, "a@x.com", "pw1").await;
    let user_id = registered["user"]["id"].as_str().expect("user id").to_string();
    // The hash must never be exposed.
    assert!(registered["user"].get("password_hash").is_none());
    assert!(registered["user"].get("passwordHash").is_none());

    login(&c, &base, "a@x.com", "pw1").await;

    let resp = create_fruit(&c, &base, "mango", "yellow", "🥭").await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Created!");
    assert_eq!(body["fruit"]["ownerId"].as_str(), Some(user_id.as_str()));
    assert_eq!(body["fruit"]["name"], "mango");
}

#[tokio::test]
async fn mutating_without_a_session_is_unauthorized() {
    let base = spawn_server().await;
    let c = client();
    let resp = create_fruit(&c, &base, "mango", "yellow", "🥭").await;
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "You need to be logged in to create a fruit");
}

#[tokio::test]
async fn non_owner_mutations_are_forbidden() {
    let base = spawn_server().await;

    // User A creates a fruit.
    let a = client();
    register(&a, &base, "a@x.com", "pw1").await;
    login(&a, &base, "a@x.com", "pw1").await;
    let created: Value = create_fruit(&a, &base, "mango", "yellow", "🥭")
        .await
        .json()
        .await
        .unwrap();
    let fruit_id = created["fruit"]["id"].as_str().unwrap().to_string();

    // User B, with a valid session of their own, may neither update nor delete it.
    let b = client();
    register(&b, &base, "b@x.com", "pw2").await;
    login(&b, &base, "b@x.com", "pw2").await;

    let put = b
        .put(format!("{base}/api/fruits/{fruit_id}"))
        .json(&json!({ "name": "grape", "color": "purple", "emoji": "🍇" }))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), 403);
    let body: Value = put.json().await.unwrap();
    assert_eq!(body["message"], "You are not the owner of this fruit");

    let del = b
        .delete(format!("{base}/api/fruits/{fruit_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(del.status(), 403);

    // The record is untouched and still publicly readable.
    let got: Value = b
        .get(format!("{base}/api/fruits/{fruit_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["fruit"]["name"], "mango");
}

#[tokio::test]
async fn owner_can_update_and_delete() {
    let base = spawn_server().await;
    let c = client();
    register(&c, &base, "a@x.com", "pw1").await;
    login(&c, &base, "a@x.com", "pw1").await;

    let created: Value = create_fruit(&c, &base, "mango", "yellow", "🥭")
        .await
        .json()
        .await
        .unwrap();
    let fruit_id = created["fruit"]["id"].as_str().unwrap().to_string();

    let put = c
        .put(format!("{base}/api/fruits/{fruit_id}"))
        .json(&json!({ "name": "grape", "color": "purple", "emoji": "🍇" }))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), 201);
    let updated: Value = put.json().await.unwrap();
    assert_eq!(updated["message"], "Updated!");
    assert_eq!(updated["fruit"]["name"], "grape");
    assert_eq!(updated["fruit"]["id"].as_str(), Some(fruit_id.as_str()));

    let del = c
        .delete(format!("{base}/api/fruits/{fruit_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(del.status(), 204);
    assert!(del.content_length().unwrap_or(0) == 0);

    let gone = c
        .get(format!("{base}/api/fruits/{fruit_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
    let body: Value = gone.json().await.unwrap();
    assert_eq!(body["message"], "Sorry, fruit not found");
}

#[tokio::test]
async fn mutations_on_missing_ids_are_not_found() {
    let base = spawn_server().await;
    let c = client();
    register(&c, &base, "a@x.com", "pw1").await;
    login(&c, &base, "a@x.com", "pw1").await;

    let put = c
        .put(format!("{base}/api/fruits/nope"))
        .json(&json!({ "name": "grape", "color": "purple", "emoji": "🍇" }))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), 404);

    let del = c.delete(format!("{base}/api/fruits/nope")).send().await.unwrap();
    assert_eq!(del.status(), 404);
}

#[tokio::test]
async fn create_with_missing_fields_is_rejected() {
    let base = spawn_server().await;
    let c = client();
    register(&c, &base, "a@x.com", "pw1").await;
    login(&c, &base, "a@x.com", "pw1").await;

    let resp = c
        .post(format!("{base}/api/fruits"))
        .json(&json!({ "name": "mango" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Provide name, color and emoji to create a fruit");
}

#[tokio::test]
async fn logout_invalidates_the_client_session() {
    let base = spawn_server().await;
    let c = client();
    register(&c, &base, "a@x.com", "pw1").await;
    login(&c, &base, "a@x.com", "pw1").await;

    // Sanity: the session works before logout.
    assert_eq!(create_fruit(&c, &base, "mango", "yellow", "🥭").await.status(), 201);

    let out = c.post(format!("{base}/api/auth/logout")).send().await.unwrap();
    assert_eq!(out.status(), 200);

    // The cookie jar honoured the clearing Set-Cookie, so the next mutating
    // call carries no session.
    assert_eq!(create_fruit(&c, &base, "mango", "yellow", "🥭").await.status(), 401);

    // Logging out again is not an error.
    let again = c.post(format!("{base}/api/auth/logout")).send().await.unwrap();
    assert_eq!(again.status(), 200);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let base = spawn_server().await;
    let c = client();
    register(&c, &base, "a@x.com", "pw1").await;

    let unknown = c
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "nobody@x.com", "password": "pw1" }))
        .send()
        .await
        .unwrap();
    let unknown_status = unknown.status();
    let unknown_body: Value = unknown.json().await.unwrap();

    let wrong_pw = c
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "a@x.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let wrong_status = wrong_pw.status();
    let wrong_body: Value = wrong_pw.json().await.unwrap();

    assert_eq!(unknown_status, 400);
    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["message"], "Invalid credentials");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let base = spawn_server().await;
    let c = client();
    register(&c, &base, "a@x.com", "pw1").await;

    let resp = c
        .post(format!("{base}/api/auth/register"))
        .json(&json!({ "email": "a@x.com", "password": "other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn reads_are_public() {
    let base = spawn_server().await;
    let owner = client();
    register(&owner, &base, "a@x.com", "pw1").await;
    login(&owner, &base, "a@x.com", "pw1").await;
    create_fruit(&owner, &base, "mango", "yellow", "🥭").await;

    // A client with no session can list and fetch.
    let anon = client();
    let listed: Value = anon
        .get(format!("{base}/api/fruits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["message"], "List of all fruits!");
    let fruits = listed["fruits"].as_object().unwrap();
    assert_eq!(fruits.len(), 1);
    let id = fruits.keys().next().unwrap().clone();

    let got = anon.get(format!("{base}/api/fruits/{id}")).send().await.unwrap();
    assert_eq!(got.status(), 200);
    let body: Value = got.json().await.unwrap();
    assert_eq!(body["message"], "Here is your fruit!");
}

#[tokio::test]
async fn banner_routes_respond_in_plain_text() {
    let base = spawn_server().await;
    let c = client();

    let root = c.get(&base).send().await.unwrap();
    assert_eq!(root.status(), 200);
    assert_eq!(root.text().await.unwrap(), "fruitstand ok");

    let home = c.get(format!("{base}/home")).send().await.unwrap();
    assert_eq!(home.status(), 200);
    assert_eq!(home.text().await.unwrap(), "Homepage!");
}

#[tokio::test]
async fn unmatched_routes_fall_back_to_404() {
    let base = spawn_server().await;
    let c = client();
    let resp = c.get(format!("{base}/api/veggies")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "URL Not found");
}
