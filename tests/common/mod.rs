use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ledgerbook_server::{
    AppState, auth, budgets, categories, database, entries, expenses, operations, users,
};
use serde_json::Value;
use time::Duration;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_TOKEN_SECRET: &str = "test_secret_key_at_least_32_chars_long_0000";
pub const TEST_TOKEN_TTL_SECS: i64 = 300;

#[derive(Clone)]
pub struct TestConfig {
    pub temp_dir_path: String,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let temp_dir_path = temp_dir.path().to_string_lossy().to_string();
        std::mem::forget(temp_dir);
        Ok(Self { temp_dir_path })
    }

    pub fn data_path(&self) -> String {
        self.temp_dir_path.clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let test_config = TestConfig::new()?;

    let data_path = test_config.data_path();
    std::fs::create_dir_all(&data_path)?;

    let db = database::init_db(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize database: {}", e))?;

    let tokens = auth::TokenAuthority::new(
        TEST_TOKEN_SECRET.as_bytes(),
        Duration::seconds(TEST_TOKEN_TTL_SECS),
    );

    let app_state = AppState { db, tokens };

    let protected = Router::new()
        .route("/api/user", axum::routing::get(users::get_users))
        .route(
            "/api/user/{id}",
            axum::routing::get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/operation",
            axum::routing::post(operations::create_operation).get(operations::get_operations),
        )
        .route(
            "/api/operation/{id}",
            axum::routing::get(operations::get_operation)
                .put(operations::update_operation)
                .delete(operations::delete_operation),
        )
        .route(
            "/api/operationByUser/{id}",
            axum::routing::get(operations::get_operations_by_user),
        )
        .route(
            "/api/category",
            axum::routing::post(categories::create_category).get(categories::get_categories),
        )
        .route(
            "/api/category/{id}",
            axum::routing::get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/api/entry",
            axum::routing::post(entries::create_entry).get(entries::get_entries),
        )
        .route(
            "/api/entry/{id}",
            axum::routing::get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route(
            "/api/entry/byIdOperation/{id}",
            axum::routing::get(entries::get_entries_by_operation),
        )
        .route(
            "/api/expense",
            axum::routing::post(expenses::create_expense).get(expenses::get_expenses),
        )
        .route(
            "/api/expense/{id}",
            axum::routing::get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route(
            "/api/expense/byIdOperation/{id}",
            axum::routing::get(expenses::get_expenses_by_operation),
        )
        .route(
            "/api/budget",
            axum::routing::post(budgets::create_budget).get(budgets::get_budgets),
        )
        .route(
            "/api/budget/{id}",
            axum::routing::get(budgets::get_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
        .route(
            "/api/budget/byIdOperation/{id}",
            axum::routing::get(budgets::get_budgets_by_operation),
        )
        .route(
            "/api/budgetByExpense",
            axum::routing::get(budgets::budget_by_expense),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_token,
        ));

    let public = Router::new()
        .route("/", axum::routing::get(root_handler))
        .route("/api/auth", axum::routing::post(auth::login))
        .route("/api/user", axum::routing::post(users::create_user));

    let router = Router::new()
        .merge(protected)
        .merge(public)
        .with_state(app_state.clone());

    Ok(TestApp {
        router,
        state: app_state,
    })
}

async fn root_handler() -> axum::response::Html<&'static str> {
    axum::response::Html("<h1>Test Server</h1>")
}

#[allow(dead_code)]
pub async fn create_test_user(
    app_state: &AppState,
    login: &str,
    password: &str,
) -> anyhow::Result<String> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString},
    };
    use password_hash::rand_core::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4().to_string();
    let email = format!("{}@example.com", login);

    let conn = app_state.db.write().await;
    conn.execute(
        "INSERT INTO users (id, login, name, email, password_hash, created) \
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            user_id.as_str(),
            login,
            login,
            email.as_str(),
            hash.as_str(),
            "2024-01-01T00:00:00Z",
        ),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create test user: {}", e))?;

    Ok(user_id)
}

pub async fn login_user(app: &Router, login: &str, password: &str) -> anyhow::Result<String> {
    let payload = serde_json::json!({
        "user": login,
        "password": password
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .map_err(|e| anyhow::anyhow!("Failed to build request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to execute request: {}", e))?;

    let token = response
        .headers()
        .get("authorization")
        .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
        .ok_or_else(|| anyhow::anyhow!("No authorization header in response"))?;

    Ok(token.to_string())
}

#[allow(dead_code)]
pub async fn auth_request(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
) -> anyhow::Result<(StatusCode, String)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", token)
        .body(Body::empty())
        .map_err(|e| anyhow::anyhow!("Failed to build request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to execute request: {}", e))?;

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response body: {}", e))?;
    let body_str = String::from_utf8(body.to_vec())?;

    Ok((status, body_str))
}

#[allow(dead_code)]
pub fn parse_body_as_json_or_string(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8(bytes.to_vec()).expect("utf8 body")),
    }
}

#[allow(dead_code)]
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    payload: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", token)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build json request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("execute json request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let json = parse_body_as_json_or_string(&body);
    (status, json)
}
