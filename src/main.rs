use axum::{
    Router, middleware,
    response::Html,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

// Import everything from the library crate (no duplicate module declarations)
use ledgerbook_server::{
    AppState, auth, budgets, categories, config::Config, database, entries, expenses, operations,
    users,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load and validate configuration
    let config = Config::from_env().map_err(|e| format!("Configuration error: {}", e))?;

    // Initialize ledger database
    let db = database::init_db(&config.data_path)
        .await
        .map_err(|e| format!("Failed to initialize database: {}", e))?;

    // The signing secret and TTL are injected here once; nothing reads the
    // environment after this point.
    let tokens = auth::TokenAuthority::new(config.token_secret.as_bytes(), config.token_ttl);

    // Create application state
    let app_state = AppState { db, tokens };

    // Everything under /api requires a token except login and registration.
    let protected = Router::new()
        .route("/api/user", get(users::get_users))
        .route(
            "/api/user/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/operation",
            post(operations::create_operation).get(operations::get_operations),
        )
        .route(
            "/api/operation/{id}",
            get(operations::get_operation)
                .put(operations::update_operation)
                .delete(operations::delete_operation),
        )
        .route(
            "/api/operationByUser/{id}",
            get(operations::get_operations_by_user),
        )
        .route(
            "/api/category",
            post(categories::create_category).get(categories::get_categories),
        )
        .route(
            "/api/category/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/api/entry",
            post(entries::create_entry).get(entries::get_entries),
        )
        .route(
            "/api/entry/{id}",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route(
            "/api/entry/byIdOperation/{id}",
            get(entries::get_entries_by_operation),
        )
        .route(
            "/api/expense",
            post(expenses::create_expense).get(expenses::get_expenses),
        )
        .route(
            "/api/expense/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route(
            "/api/expense/byIdOperation/{id}",
            get(expenses::get_expenses_by_operation),
        )
        .route(
            "/api/budget",
            post(budgets::create_budget).get(budgets::get_budgets),
        )
        .route(
            "/api/budget/{id}",
            get(budgets::get_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
        .route(
            "/api/budget/byIdOperation/{id}",
            get(budgets::get_budgets_by_operation),
        )
        .route("/api/budgetByExpense", get(budgets::budget_by_expense))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_token,
        ));

    let public = Router::new()
        .route("/", get(root))
        .route("/api/auth", post(auth::login))
        .route("/api/user", post(users::create_user));

    // Build application router
    let app = Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Create TCP listener with proper error handling
    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", bind_address, e))?;

    tracing::info!("Server running on http://{}", bind_address);

    // Start server with proper error handling
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}

async fn root() -> Html<&'static str> {
    Html("<h1>Ledgerbook Server</h1><p>API Ready</p>")
}
