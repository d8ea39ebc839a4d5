use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::error::ApiError;
use crate::expenses::{EXPENSE_COLUMNS, extract_expense_from_row};
use crate::models::{Budget, BudgetReportLine, CreateBudgetPayload, Expense, UpdateBudgetPayload};
use crate::utils::{db_error, validate_amount, validate_string_length};

const BUDGET_COLUMNS: &str =
    "id, id_operation, id_category, category_name, category_ref, kind, amount";

/// Splits the legacy `"<categoryName>|<suffix>"` composite into its typed
/// halves. Without a delimiter the whole string is the name and the
/// reference is empty. Runs once when a budget row is written; queries
/// never parse the composite.
pub fn split_category_key(composite: &str) -> (String, String) {
    match composite.split_once('|') {
        Some((name, suffix)) => (name.to_string(), suffix.to_string()),
        None => (composite.to_string(), String::new()),
    }
}

/// Joins every budget line against the expense collection by category name
/// and reports the actual spend per line.
///
/// A budget matching no expenses still yields a line with a zero total;
/// `exceeded` uses strict less-than, so spending exactly the budgeted
/// amount does not flag the line. Lines are sorted ascending by type, and
/// the stable sort keeps the input order for equal types.
pub fn compute_budget_report(budgets: &[Budget], expenses: &[Expense]) -> Vec<BudgetReportLine> {
    let mut lines: Vec<BudgetReportLine> = budgets
        .iter()
        .map(|budget| {
            let total: f64 = expenses
                .iter()
                .filter(|expense| expense.category_name == budget.category_name)
                .map(|expense| expense.amount)
                .sum();
            BudgetReportLine {
                name: budget.category_name.clone(),
                budget_amount: budget.amount,
                kind: budget.kind.clone(),
                amount: total,
                exceeded: budget.amount < total,
            }
        })
        .collect();

    lines.sort_by(|a, b| a.kind.cmp(&b.kind));
    lines
}

pub fn extract_budget_from_row(row: libsql::Row) -> Result<Budget, ApiError> {
    Ok(Budget {
        id: row.get(0)?,
        id_operation: row.get(1)?,
        id_category: row.get(2)?,
        category_name: row.get(3)?,
        category_ref: row.get(4)?,
        kind: row.get(5)?,
        amount: row.get(6)?,
    })
}

pub async fn create_budget(
    State(state): State<AppState>,
    Json(payload): Json<CreateBudgetPayload>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    validate_string_length(&payload.id_operation, "Operation ID", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.id_category, "Category ID", MAX_NAME_LENGTH)?;
    validate_string_length(&payload.kind, "Budget type", MAX_NAME_LENGTH)?;
    validate_amount(payload.amount, "Budget amount")?;

    let id = Uuid::new_v4().to_string();
    let id_category = payload.id_category.trim().to_string();
    let (category_name, category_ref) = split_category_key(&id_category);

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO budgets \
         (id, id_operation, id_category, category_name, category_ref, kind, amount) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            payload.id_operation.trim(),
            id_category.as_str(),
            category_name.as_str(),
            category_ref.as_str(),
            payload.kind.trim(),
            payload.amount,
        ),
    )
    .await
    .map_err(|e| db_error("failed to create budget", e))?;

    Ok((
        StatusCode::CREATED,
        Json(Budget {
            id,
            id_operation: payload.id_operation.trim().to_string(),
            id_category,
            category_name,
            category_ref,
            kind: payload.kind.trim().to_string(),
            amount: payload.amount,
        }),
    ))
}

pub async fn get_budgets(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Budget>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM budgets ORDER BY rowid", BUDGET_COLUMNS),
            (),
        )
        .await
        .map_err(|e| db_error("failed to query budgets", e))?;

    let mut budgets = Vec::new();
    while let Some(row) = rows.next().await? {
        budgets.push(extract_budget_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(budgets)))
}

pub async fn get_budget(
    State(state): State<AppState>,
    Path(budget_id): Path<String>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
            [budget_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query budget", e))?;

    match rows.next().await? {
        Some(row) => Ok((StatusCode::OK, Json(extract_budget_from_row(row)?))),
        None => Err(ApiError::NotFound("Budget")),
    }
}

pub async fn get_budgets_by_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<(StatusCode, Json<Vec<Budget>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {} FROM budgets WHERE id_operation = ? ORDER BY rowid",
                BUDGET_COLUMNS
            ),
            [operation_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query budgets by operation", e))?;

    let mut budgets = Vec::new();
    while let Some(row) = rows.next().await? {
        budgets.push(extract_budget_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(budgets)))
}

pub async fn update_budget(
    State(state): State<AppState>,
    Path(budget_id): Path<String>,
    Json(payload): Json<UpdateBudgetPayload>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    if payload.id_operation.is_none()
        && payload.id_category.is_none()
        && payload.kind.is_none()
        && payload.amount.is_none()
    {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    if let Some(ref id_operation) = payload.id_operation {
        validate_string_length(id_operation, "Operation ID", MAX_NAME_LENGTH)?;
    }
    if let Some(ref id_category) = payload.id_category {
        validate_string_length(id_category, "Category ID", MAX_NAME_LENGTH)?;
    }
    if let Some(ref kind) = payload.kind {
        validate_string_length(kind, "Budget type", MAX_NAME_LENGTH)?;
    }
    if let Some(amount) = payload.amount {
        validate_amount(amount, "Budget amount")?;
    }

    let conn = state.db.write().await;

    let mut existing_rows = conn
        .query(
            &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
            [budget_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query existing budget", e))?;

    let existing = match existing_rows.next().await? {
        Some(row) => extract_budget_from_row(row)?,
        None => return Err(ApiError::NotFound("Budget")),
    };

    let updated_id_operation = payload
        .id_operation
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.id_operation);

    // A new composite is re-split here; rows never go stale.
    let (updated_id_category, updated_category_name, updated_category_ref) =
        match payload.id_category {
            Some(ref composite) => {
                let composite = composite.trim().to_string();
                let (name, suffix) = split_category_key(&composite);
                (composite, name, suffix)
            }
            None => (
                existing.id_category,
                existing.category_name,
                existing.category_ref,
            ),
        };

    let updated_kind = payload
        .kind
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.kind);
    let updated_amount = payload.amount.unwrap_or(existing.amount);

    let affected_rows = conn
        .execute(
            "UPDATE budgets SET id_operation = ?, id_category = ?, category_name = ?, \
             category_ref = ?, kind = ?, amount = ? WHERE id = ?",
            (
                updated_id_operation,
                updated_id_category.as_str(),
                updated_category_name.as_str(),
                updated_category_ref.as_str(),
                updated_kind,
                updated_amount,
                budget_id.as_str(),
            ),
        )
        .await
        .map_err(|e| db_error("failed to update budget", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Budget"));
    }

    Ok((
        StatusCode::OK,
        Json(Budget {
            id: budget_id,
            id_operation: updated_id_operation.to_string(),
            id_category: updated_id_category,
            category_name: updated_category_name,
            category_ref: updated_category_ref,
            kind: updated_kind.to_string(),
            amount: updated_amount,
        }),
    ))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    Path(budget_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.db.write().await;

    let affected_rows = conn
        .execute("DELETE FROM budgets WHERE id = ?", [budget_id.as_str()])
        .await
        .map_err(|e| db_error("failed to delete budget", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Budget"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/budgetByExpense. Reads both collections in full under a single
/// read guard and joins them in memory; the result is a point-in-time
/// snapshot with no consistency guarantee against concurrent writers.
/// Budgets iterate in insertion order so equal types keep a stable order.
pub async fn budget_by_expense(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<BudgetReportLine>>), ApiError> {
    let conn = state.db.read().await;

    let mut budget_rows = conn
        .query(
            &format!("SELECT {} FROM budgets ORDER BY rowid", BUDGET_COLUMNS),
            (),
        )
        .await
        .map_err(|e| db_error("failed to query budgets for report", e))?;

    let mut budgets = Vec::new();
    while let Some(row) = budget_rows.next().await? {
        budgets.push(extract_budget_from_row(row)?);
    }

    let mut expense_rows = conn
        .query(&format!("SELECT {} FROM expenses", EXPENSE_COLUMNS), ())
        .await
        .map_err(|e| db_error("failed to query expenses for report", e))?;

    let mut expenses = Vec::new();
    while let Some(row) = expense_rows.next().await? {
        expenses.push(extract_expense_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(compute_budget_report(&budgets, &expenses))))
}
