use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::auth::hash_password;
use crate::constants::*;
use crate::error::ApiError;
use crate::models::{CreateUserPayload, UpdateUserPayload, User};
use crate::utils::{db_error, now_rfc3339, validate_string_length};

pub fn validate_login(login: &str) -> Result<(), ApiError> {
    validate_string_length(login, "Login", MAX_LOGIN_LENGTH)?;
    if login.trim().len() < MIN_LOGIN_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Login must be at least {} characters",
            MIN_LOGIN_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    validate_string_length(email, "Email", MAX_NAME_LENGTH)?;
    if !email.contains('@') {
        return Err(ApiError::BadRequest(
            "Email must be a valid address".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_user_from_row(row: libsql::Row) -> Result<User, ApiError> {
    Ok(User {
        id: row.get(0)?,
        login: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        created: row.get(5)?,
    })
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    validate_login(&payload.login)?;
    validate_string_length(&payload.name, "Name", MAX_NAME_LENGTH)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let password_hash = hash_password(&payload.password)?;
    let id = Uuid::new_v4().to_string();
    let created = now_rfc3339()?;
    let login = payload.login.trim().to_string();

    // The write guard spans the uniqueness check and the insert.
    let conn = state.db.write().await;

    let mut existing = conn
        .query("SELECT id FROM users WHERE login = ?", [login.as_str()])
        .await
        .map_err(|e| db_error("failed to check login uniqueness", e))?;
    if existing.next().await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Login '{}' is already taken",
            login
        )));
    }

    conn.execute(
        "INSERT INTO users (id, login, name, email, password_hash, created) \
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            login.as_str(),
            payload.name.trim(),
            payload.email.trim(),
            password_hash.as_str(),
            created.as_str(),
        ),
    )
    .await
    .map_err(|e| db_error("failed to create user", e))?;

    Ok((
        StatusCode::CREATED,
        Json(User {
            id,
            login,
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_string(),
            password_hash,
            created,
        }),
    ))
}

pub async fn get_users(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<User>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, login, name, email, password_hash, created FROM users",
            (),
        )
        .await
        .map_err(|e| db_error("failed to query users", e))?;

    let mut users = Vec::new();
    while let Some(row) = rows.next().await? {
        users.push(extract_user_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, login, name, email, password_hash, created FROM users WHERE id = ?",
            [user_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query user", e))?;

    match rows.next().await? {
        Some(row) => Ok((StatusCode::OK, Json(extract_user_from_row(row)?))),
        None => Err(ApiError::NotFound("User")),
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if payload.login.is_none()
        && payload.name.is_none()
        && payload.email.is_none()
        && payload.password.is_none()
    {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    if let Some(ref login) = payload.login {
        validate_login(login)?;
    }
    if let Some(ref name) = payload.name {
        validate_string_length(name, "Name", MAX_NAME_LENGTH)?;
    }
    if let Some(ref email) = payload.email {
        validate_email(email)?;
    }
    if let Some(ref password) = payload.password {
        validate_password(password)?;
    }

    let conn = state.db.write().await;

    let mut existing_rows = conn
        .query(
            "SELECT id, login, name, email, password_hash, created FROM users WHERE id = ?",
            [user_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query existing user", e))?;

    let existing_user = match existing_rows.next().await? {
        Some(row) => extract_user_from_row(row)?,
        None => return Err(ApiError::NotFound("User")),
    };

    let updated_login = payload
        .login
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing_user.login);
    let updated_name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing_user.name);
    let updated_email = payload
        .email
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing_user.email);

    if updated_login != existing_user.login {
        let mut taken = conn
            .query(
                "SELECT id FROM users WHERE login = ? AND id != ?",
                (updated_login, user_id.as_str()),
            )
            .await
            .map_err(|e| db_error("failed to check login uniqueness", e))?;
        if taken.next().await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "Login '{}' is already taken",
                updated_login
            )));
        }
    }

    let updated_hash = match payload.password {
        Some(ref password) => hash_password(password)?,
        None => existing_user.password_hash.clone(),
    };

    let affected_rows = conn
        .execute(
            "UPDATE users SET login = ?, name = ?, email = ?, password_hash = ? WHERE id = ?",
            (
                updated_login,
                updated_name,
                updated_email,
                updated_hash.as_str(),
                user_id.as_str(),
            ),
        )
        .await
        .map_err(|e| db_error("failed to update user", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("User"));
    }

    Ok((
        StatusCode::OK,
        Json(User {
            id: user_id,
            login: updated_login.to_string(),
            name: updated_name.to_string(),
            email: updated_email.to_string(),
            password_hash: updated_hash,
            created: existing_user.created,
        }),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.db.write().await;

    let affected_rows = conn
        .execute("DELETE FROM users WHERE id = ?", [user_id.as_str()])
        .await
        .map_err(|e| db_error("failed to delete user", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("User"));
    }

    Ok(StatusCode::NO_CONTENT)
}
