use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::ApiError;

pub fn db_error(context: &str, e: libsql::Error) -> ApiError {
    ApiError::Storage(format!("{}: {}", context, e))
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "{} cannot be empty",
            field_name
        )));
    }
    if value.len() > max_length {
        return Err(ApiError::BadRequest(format!(
            "{} must be less than {} characters",
            field_name, max_length
        )));
    }
    Ok(())
}

pub fn validate_amount(value: f64, field_name: &str) -> Result<(), ApiError> {
    if !value.is_finite() {
        return Err(ApiError::BadRequest(format!(
            "{} must be a valid finite number",
            field_name
        )));
    }
    Ok(())
}

pub fn validate_datetime(value: &str, field_name: &str) -> Result<(), ApiError> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).map_err(|_| {
        ApiError::BadRequest(format!("{} must be an RFC 3339 timestamp", field_name))
    })?;
    Ok(())
}

pub fn now_rfc3339() -> Result<String, ApiError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| ApiError::Storage(format!("failed to format timestamp: {}", e)))
}

/// Bind parameter for a nullable TEXT column.
pub fn opt_text(value: Option<&str>) -> libsql::Value {
    match value {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Reads a nullable TEXT column. `Row::get` has no Option support, so
/// match on the raw value instead.
pub fn text_or_none(row: &libsql::Row, idx: i32) -> Result<Option<String>, ApiError> {
    match row.get_value(idx)? {
        libsql::Value::Text(s) => Ok(Some(s)),
        libsql::Value::Null => Ok(None),
        other => Err(ApiError::Storage(format!(
            "unexpected column type at index {}: {:?}",
            idx, other
        ))),
    }
}
