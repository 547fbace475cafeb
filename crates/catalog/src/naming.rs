use stockroom_core::{DomainError, DomainResult};

/// Canonical form used for unique names: trimmed, single-spaced, lowercase.
pub fn normalize_name(raw: &str) -> DomainResult<String> {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalized.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(normalized)
}
