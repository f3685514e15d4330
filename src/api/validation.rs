use crate::constants::limits;

use super::ApiError;

pub fn validate_search_term(term: &str) -> Result<&str, ApiError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search term cannot be empty"));
    }
    Ok(trimmed)
}

pub fn validate_limit_per_source(limit: u32) -> Result<u32, ApiError> {
    if !(1..=limits::MAX_LIMIT_PER_SOURCE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit,
            limits::MAX_LIMIT_PER_SOURCE
        )));
    }
    Ok(limit)
}
