use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::error::ApiError;
use crate::models::{CreateExpensePayload, Expense, UpdateExpensePayload};
use crate::utils::{db_error, now_rfc3339, validate_amount, validate_datetime, validate_string_length};

pub(crate) const EXPENSE_COLUMNS: &str =
    "id, id_operation, category_name, category_icon, name, kind, amount, date_amount, created, updated";

pub fn extract_expense_from_row(row: libsql::Row) -> Result<Expense, ApiError> {
    Ok(Expense {
        id: row.get(0)?,
        id_operation: row.get(1)?,
        category_name: row.get(2)?,
        category_icon: row.get(3)?,
        name: row.get(4)?,
        kind: row.get(5)?,
        amount: row.get(6)?,
        date_amount: row.get(7)?,
        created: row.get(8)?,
        updated: row.get(9)?,
    })
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    validate_string_length(&payload.id_operation, "Operation ID", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.category_name, "Category name", MAX_CATEGORY_NAME_LENGTH)?;
    validate_string_length(&payload.name, "Expense name", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.kind, "Expense type", MAX_NAME_LENGTH)?;
    validate_amount(payload.amount, "Expense amount")?;
    validate_datetime(&payload.date_amount, "Expense date")?;

    let id = Uuid::new_v4().to_string();
    let created = now_rfc3339()?;

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO expenses \
         (id, id_operation, category_name, category_icon, name, kind, amount, date_amount, created, updated) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.id_operation.trim(),
            payload.category_name.trim(),
            payload.category_icon.trim(),
            payload.name.trim(),
            payload.kind.trim(),
            payload.amount,
            payload.date_amount.trim(),
            created.as_str(),
            created.as_str(),
        ),
    )
    .await
    .map_err(|e| db_error("failed to create expense", e))?;

    Ok((
        StatusCode::CREATED,
        Json(Expense {
            id,
            id_operation: payload.id_operation.trim().to_string(),
            category_name: payload.category_name.trim().to_string(),
            category_icon: payload.category_icon.trim().to_string(),
            name: payload.name.trim().to_string(),
            kind: payload.kind.trim().to_string(),
            amount: payload.amount,
            date_amount: payload.date_amount.trim().to_string(),
            created: created.clone(),
            updated: created,
        }),
    ))
}

pub async fn get_expenses(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Expense>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(&format!("SELECT {} FROM expenses", EXPENSE_COLUMNS), ())
        .await
        .map_err(|e| db_error("failed to query expenses", e))?;

    let mut expenses = Vec::new();
    while let Some(row) = rows.next().await? {
        expenses.push(extract_expense_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(expenses)))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
            [expense_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query expense", e))?;

    match rows.next().await? {
        Some(row) => Ok((StatusCode::OK, Json(extract_expense_from_row(row)?))),
        None => Err(ApiError::NotFound("Expense")),
    }
}

pub async fn get_expenses_by_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<(StatusCode, Json<Vec<Expense>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {} FROM expenses WHERE id_operation = ?",
                EXPENSE_COLUMNS
            ),
            [operation_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query expenses by operation", e))?;

    let mut expenses = Vec::new();
    while let Some(row) = rows.next().await? {
        expenses.push(extract_expense_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(expenses)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
    Json(payload): Json<UpdateExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    if payload.id_operation.is_none()
        && payload.category_name.is_none()
        && payload.category_icon.is_none()
        && payload.name.is_none()
        && payload.kind.is_none()
        && payload.amount.is_none()
        && payload.date_amount.is_none()
    {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    if let Some(ref id_operation) = payload.id_operation {
        validate_string_length(id_operation, "Operation ID", MAX_NAME_LENGTH)?;
    }
    if let Some(ref category_name) = payload.category_name {
        validate_string_length(category_name, "Category name", MAX_CATEGORY_NAME_LENGTH)?;
    }
    if let Some(ref name) = payload.name {
        validate_string_length(name, "Expense name", MAX_NAME_LENGTH)?;
    }
    if let Some(ref kind) = payload.kind {
        validate_string_length(kind, "Expense type", MAX_NAME_LENGTH)?;
    }
    if let Some(amount) = payload.amount {
        validate_amount(amount, "Expense amount")?;
    }
    if let Some(ref date_amount) = payload.date_amount {
        validate_datetime(date_amount, "Expense date")?;
    }

    let conn = state.db.write().await;

    let mut existing_rows = conn
        .query(
            &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
            [expense_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query existing expense", e))?;

    let existing = match existing_rows.next().await? {
        Some(row) => extract_expense_from_row(row)?,
        None => return Err(ApiError::NotFound("Expense")),
    };

    let updated_id_operation = payload
        .id_operation
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.id_operation);
    let updated_category_name = payload
        .category_name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.category_name);
    let updated_category_icon = payload
        .category_icon
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.category_icon);
    let updated_name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.name);
    let updated_kind = payload
        .kind
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.kind);
    let updated_amount = payload.amount.unwrap_or(existing.amount);
    let updated_date_amount = payload
        .date_amount
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.date_amount);
    let updated = now_rfc3339()?;

    let affected_rows = conn
        .execute(
            "UPDATE expenses SET id_operation = ?, category_name = ?, category_icon = ?, \
             name = ?, kind = ?, amount = ?, date_amount = ?, updated = ? WHERE id = ?",
            (
                updated_id_operation,
                updated_category_name,
                updated_category_icon,
                updated_name,
                updated_kind,
                updated_amount,
                updated_date_amount,
                updated.as_str(),
                expense_id.as_str(),
            ),
        )
        .await
        .map_err(|e| db_error("failed to update expense", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Expense"));
    }

    Ok((
        StatusCode::OK,
        Json(Expense {
            id: expense_id,
            id_operation: updated_id_operation.to_string(),
            category_name: updated_category_name.to_string(),
            category_icon: updated_category_icon.to_string(),
            name: updated_name.to_string(),
            kind: updated_kind.to_string(),
            amount: updated_amount,
            date_amount: updated_date_amount.to_string(),
            created: existing.created,
            updated,
        }),
    ))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.db.write().await;

    let affected_rows = conn
        .execute("DELETE FROM expenses WHERE id = ?", [expense_id.as_str()])
        .await
        .map_err(|e| db_error("failed to delete expense", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Expense"));
    }

    Ok(StatusCode::NO_CONTENT)
}
