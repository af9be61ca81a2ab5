use crate::error::{HrError, HrResult};

pub(crate) fn required(field: &str, value: &str, max: usize) -> HrResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HrError::validation(format!("{field} is required")));
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trims free text; blank input collapses to `None`.
pub(crate) fn optional(field: &str, value: Option<String>, max: usize) -> HrResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => {
            check_length(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
        _ => Ok(None),
    }
}

fn check_length(field: &str, value: &str, max: usize) -> HrResult<()> {
    if value.chars().count() > max {
        return Err(HrError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
