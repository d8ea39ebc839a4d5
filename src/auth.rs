use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::AppState;
use crate::database::Db;
use crate::error::ApiError;
use crate::models::{LoginPayload, LoginResponse, User};
use crate::users::extract_user_from_row;
use crate::utils::db_error;

/// Token payload. Carries the login and display name only; the full
/// user record (hash included) never leaves the server inside a token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens. The secret and TTL are injected at
/// construction, so tests can run with a fixed secret and a short TTL.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: a token is invalid the moment its TTL elapses.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.login.clone(),
            name: user.name.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Storage(format!("failed to sign token: {}", e)))
    }

    /// Checks signature and expiry. Every failure collapses into
    /// `InvalidToken`; callers never learn which check rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::InvalidToken)
    }
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Storage(format!("failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Storage(format!("stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn find_user_by_login(db: &Db, login: &str) -> Result<Option<User>, ApiError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, login, name, email, password_hash, created FROM users WHERE login = ?",
            [login],
        )
        .await
        .map_err(|e| db_error("failed to look up user by login", e))?;

    match rows.next().await? {
        Some(row) => Ok(Some(extract_user_from_row(row)?)),
        None => Ok(None),
    }
}

/// POST /api/auth. Unknown login and wrong password answer the same
/// generic failure. The token rides in the body and in an
/// `authorization` response header.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<LoginResponse>), ApiError> {
    let user = match find_user_by_login(&state.db, payload.user.trim()).await? {
        Some(user) => user,
        None => return Err(ApiError::InvalidCredentials),
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user)?;

    Ok((
        StatusCode::OK,
        [(header::AUTHORIZATION, token.clone())],
        Json(LoginResponse { user, token }),
    ))
}

/// Middleware gating every protected route. A missing header is rejected
/// before any verification work; a `Bearer ` prefix is tolerated but not
/// required.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(raw) => raw,
        None => return Err(ApiError::MissingToken),
    };

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(ApiError::MissingToken);
    }

    state.tokens.verify(token)?;

    Ok(next.run(request).await)
}
