use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::error::ApiError;
use crate::models::{CreateOperationPayload, Operation, UpdateOperationPayload};
use crate::utils::{db_error, now_rfc3339, validate_string_length};

pub fn extract_operation_from_row(row: libsql::Row) -> Result<Operation, ApiError> {
    Ok(Operation {
        id: row.get(0)?,
        name: row.get(1)?,
        id_user: row.get(2)?,
        created: row.get(3)?,
    })
}

pub async fn create_operation(
    State(state): State<AppState>,
    Json(payload): Json<CreateOperationPayload>,
) -> Result<(StatusCode, Json<Operation>), ApiError> {
    validate_string_length(&payload.name, "Operation name", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.id_user, "User ID", MAX_NAME_LENGTH)?;

    let id = Uuid::new_v4().to_string();
    let created = now_rfc3339()?;

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO operations (id, name, id_user, created) VALUES (?, ?, ?, ?)",
        (
            id.as_str(),
            payload.name.trim(),
            payload.id_user.trim(),
            created.as_str(),
        ),
    )
    .await
    .map_err(|e| db_error("failed to create operation", e))?;

    Ok((
        StatusCode::CREATED,
        Json(Operation {
            id,
            name: payload.name.trim().to_string(),
            id_user: payload.id_user.trim().to_string(),
            created,
        }),
    ))
}

pub async fn get_operations(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Operation>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query("SELECT id, name, id_user, created FROM operations", ())
        .await
        .map_err(|e| db_error("failed to query operations", e))?;

    let mut operations = Vec::new();
    while let Some(row) = rows.next().await? {
        operations.push(extract_operation_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(operations)))
}

pub async fn get_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<(StatusCode, Json<Operation>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, name, id_user, created FROM operations WHERE id = ?",
            [operation_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query operation", e))?;

    match rows.next().await? {
        Some(row) => Ok((StatusCode::OK, Json(extract_operation_from_row(row)?))),
        None => Err(ApiError::NotFound("Operation")),
    }
}

pub async fn get_operations_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<Vec<Operation>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, name, id_user, created FROM operations WHERE id_user = ?",
            [user_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query operations by user", e))?;

    let mut operations = Vec::new();
    while let Some(row) = rows.next().await? {
        operations.push(extract_operation_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(operations)))
}

pub async fn update_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
    Json(payload): Json<UpdateOperationPayload>,
) -> Result<(StatusCode, Json<Operation>), ApiError> {
    if payload.name.is_none() && payload.id_user.is_none() {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    if let Some(ref name) = payload.name {
        validate_string_length(name, "Operation name", MAX_NAME_LENGTH)?;
    }
    if let Some(ref id_user) = payload.id_user {
        validate_string_length(id_user, "User ID", MAX_NAME_LENGTH)?;
    }

    let conn = state.db.write().await;

    let mut existing_rows = conn
        .query(
            "SELECT id, name, id_user, created FROM operations WHERE id = ?",
            [operation_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query existing operation", e))?;

    let existing = match existing_rows.next().await? {
        Some(row) => extract_operation_from_row(row)?,
        None => return Err(ApiError::NotFound("Operation")),
    };

    let updated_name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.name);
    let updated_id_user = payload
        .id_user
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.id_user);

    let affected_rows = conn
        .execute(
            "UPDATE operations SET name = ?, id_user = ? WHERE id = ?",
            (updated_name, updated_id_user, operation_id.as_str()),
        )
        .await
        .map_err(|e| db_error("failed to update operation", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Operation"));
    }

    Ok((
        StatusCode::OK,
        Json(Operation {
            id: operation_id,
            name: updated_name.to_string(),
            id_user: updated_id_user.to_string(),
            created: existing.created,
        }),
    ))
}

pub async fn delete_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.db.write().await;

    let affected_rows = conn
        .execute(
            "DELETE FROM operations WHERE id = ?",
            [operation_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to delete operation", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Operation"));
    }

    Ok(StatusCode::NO_CONTENT)
}
