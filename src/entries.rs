use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::error::ApiError;
use crate::models::{CreateEntryPayload, Entry, UpdateEntryPayload};
use crate::utils::{db_error, now_rfc3339, validate_amount, validate_string_length};

const ENTRY_COLUMNS: &str = "id, id_operation, name, amount, created, updated";

pub fn extract_entry_from_row(row: libsql::Row) -> Result<Entry, ApiError> {
    Ok(Entry {
        id: row.get(0)?,
        id_operation: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        created: row.get(4)?,
        updated: row.get(5)?,
    })
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<CreateEntryPayload>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    validate_string_length(&payload.id_operation, "Operation ID", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.name, "Entry name", MAX_NAME_LENGTH)?;
    validate_amount(payload.amount, "Entry amount")?;

    let id = Uuid::new_v4().to_string();
    let created = now_rfc3339()?;

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO entries (id, id_operation, name, amount, created, updated) \
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.id_operation.trim(),
            payload.name.trim(),
            payload.amount,
            created.as_str(),
            created.as_str(),
        ),
    )
    .await
    .map_err(|e| db_error("failed to create entry", e))?;

    Ok((
        StatusCode::CREATED,
        Json(Entry {
            id,
            id_operation: payload.id_operation.trim().to_string(),
            name: payload.name.trim().to_string(),
            amount: payload.amount,
            created: created.clone(),
            updated: created,
        }),
    ))
}

pub async fn get_entries(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Entry>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(&format!("SELECT {} FROM entries", ENTRY_COLUMNS), ())
        .await
        .map_err(|e| db_error("failed to query entries", e))?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(extract_entry_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(entries)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM entries WHERE id = ?", ENTRY_COLUMNS),
            [entry_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query entry", e))?;

    match rows.next().await? {
        Some(row) => Ok((StatusCode::OK, Json(extract_entry_from_row(row)?))),
        None => Err(ApiError::NotFound("Entry")),
    }
}

pub async fn get_entries_by_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<(StatusCode, Json<Vec<Entry>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {} FROM entries WHERE id_operation = ?",
                ENTRY_COLUMNS
            ),
            [operation_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query entries by operation", e))?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(extract_entry_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(entries)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(payload): Json<UpdateEntryPayload>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    if payload.id_operation.is_none() && payload.name.is_none() && payload.amount.is_none() {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    if let Some(ref id_operation) = payload.id_operation {
        validate_string_length(id_operation, "Operation ID", MAX_NAME_LENGTH)?;
    }
    if let Some(ref name) = payload.name {
        validate_string_length(name, "Entry name", MAX_NAME_LENGTH)?;
    }
    if let Some(amount) = payload.amount {
        validate_amount(amount, "Entry amount")?;
    }

    let conn = state.db.write().await;

    let mut existing_rows = conn
        .query(
            &format!("SELECT {} FROM entries WHERE id = ?", ENTRY_COLUMNS),
            [entry_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query existing entry", e))?;

    let existing = match existing_rows.next().await? {
        Some(row) => extract_entry_from_row(row)?,
        None => return Err(ApiError::NotFound("Entry")),
    };

    let updated_id_operation = payload
        .id_operation
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.id_operation);
    let updated_name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.name);
    let updated_amount = payload.amount.unwrap_or(existing.amount);
    let updated = now_rfc3339()?;

    let affected_rows = conn
        .execute(
            "UPDATE entries SET id_operation = ?, name = ?, amount = ?, updated = ? WHERE id = ?",
            (
                updated_id_operation,
                updated_name,
                updated_amount,
                updated.as_str(),
                entry_id.as_str(),
            ),
        )
        .await
        .map_err(|e| db_error("failed to update entry", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Entry"));
    }

    Ok((
        StatusCode::OK,
        Json(Entry {
            id: entry_id,
            id_operation: updated_id_operation.to_string(),
            name: updated_name.to_string(),
            amount: updated_amount,
            created: existing.created,
            updated,
        }),
    ))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.db.write().await;

    let affected_rows = conn
        .execute("DELETE FROM entries WHERE id = ?", [entry_id.as_str()])
        .await
        .map_err(|e| db_error("failed to delete entry", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Entry"));
    }

    Ok(StatusCode::NO_CONTENT)
}
