pub mod auth;
pub mod budgets;
pub mod categories;
pub mod config;
pub mod constants;
pub mod database;
pub mod entries;
pub mod error;
pub mod expenses;
pub mod models;
pub mod operations;
pub mod users;
pub mod utils;

// Re-export types at crate root for convenient importing
pub use crate::database::Db;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Ledger database holding every collection
    pub db: Db,
    /// Token signer/verifier, read-only after startup
    pub tokens: auth::TokenAuthority,
}
