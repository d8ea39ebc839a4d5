use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::error::ApiError;
use crate::models::{Category, CreateCategoryPayload, UpdateCategoryPayload};
use crate::utils::{db_error, now_rfc3339, opt_text, text_or_none, validate_string_length};

const CATEGORY_COLUMNS: &str = "id, kind, name, description, icon, created, updated";

pub fn validate_category_name(name: &str) -> Result<(), ApiError> {
    validate_string_length(name, "Category name", MAX_CATEGORY_NAME_LENGTH)
}

pub fn extract_category_from_row(row: libsql::Row) -> Result<Category, ApiError> {
    Ok(Category {
        id: row.get(0)?,
        kind: text_or_none(&row, 1)?,
        name: row.get(2)?,
        description: text_or_none(&row, 3)?,
        icon: text_or_none(&row, 4)?,
        created: row.get(5)?,
        updated: row.get(6)?,
    })
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    validate_category_name(&payload.name)?;

    let id = Uuid::new_v4().to_string();
    let created = now_rfc3339()?;
    let name = payload.name.trim().to_string();

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO categories (id, kind, name, description, icon, created, updated) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            id.as_str(),
            opt_text(payload.kind.as_deref()),
            name.as_str(),
            opt_text(payload.description.as_deref()),
            opt_text(payload.icon.as_deref()),
            created.as_str(),
            created.as_str(),
        ),
    )
    .await
    .map_err(|e| db_error("failed to create category", e))?;

    Ok((
        StatusCode::CREATED,
        Json(Category {
            id,
            kind: payload.kind,
            name,
            description: payload.description,
            icon: payload.icon,
            created: created.clone(),
            updated: created,
        }),
    ))
}

pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Category>>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM categories", CATEGORY_COLUMNS),
            (),
        )
        .await
        .map_err(|e| db_error("failed to query categories", e))?;

    let mut categories = Vec::new();
    while let Some(row) = rows.next().await? {
        categories.push(extract_category_from_row(row)?);
    }

    Ok((StatusCode::OK, Json(categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let conn = state.db.read().await;
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
            [category_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query category", e))?;

    match rows.next().await? {
        Some(row) => Ok((StatusCode::OK, Json(extract_category_from_row(row)?))),
        None => Err(ApiError::NotFound("Category")),
    }
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    if payload.kind.is_none()
        && payload.name.is_none()
        && payload.description.is_none()
        && payload.icon.is_none()
    {
        return Err(ApiError::BadRequest(
            "At least one field must be provided for update".to_string(),
        ));
    }

    if let Some(ref name) = payload.name {
        validate_category_name(name)?;
    }

    let conn = state.db.write().await;

    let mut existing_rows = conn
        .query(
            &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
            [category_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to query existing category", e))?;

    let existing = match existing_rows.next().await? {
        Some(row) => extract_category_from_row(row)?,
        None => return Err(ApiError::NotFound("Category")),
    };

    // Absent fields keep their stored values; there is no way to null a
    // field out through this endpoint.
    let updated_kind = payload.kind.or(existing.kind);
    let updated_name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.name)
        .to_string();
    let updated_description = payload.description.or(existing.description);
    let updated_icon = payload.icon.or(existing.icon);
    let updated = now_rfc3339()?;

    let affected_rows = conn
        .execute(
            "UPDATE categories SET kind = ?, name = ?, description = ?, icon = ?, updated = ? \
             WHERE id = ?",
            (
                opt_text(updated_kind.as_deref()),
                updated_name.as_str(),
                opt_text(updated_description.as_deref()),
                opt_text(updated_icon.as_deref()),
                updated.as_str(),
                category_id.as_str(),
            ),
        )
        .await
        .map_err(|e| db_error("failed to update category", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Category"));
    }

    Ok((
        StatusCode::OK,
        Json(Category {
            id: category_id,
            kind: updated_kind,
            name: updated_name,
            description: updated_description,
            icon: updated_icon,
            created: existing.created,
            updated,
        }),
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.db.write().await;

    let affected_rows = conn
        .execute(
            "DELETE FROM categories WHERE id = ?",
            [category_id.as_str()],
        )
        .await
        .map_err(|e| db_error("failed to delete category", e))?;

    if affected_rows == 0 {
        return Err(ApiError::NotFound("Category"));
    }

    Ok(StatusCode::NO_CONTENT)
}
