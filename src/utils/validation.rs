//! Centralized validation and helper functions.

/// Maximum number of queries allowed in a single report (DOS protection)
pub const MAX_QUERIES: usize = 1_000_000;

/// Check whether a report declares more queries than allowed.
///
/// Returns an error message if the count exceeds the limit, None if safe.
///
/// # Example
/// ```
/// use pseudofinder::utils::validation::check_query_limit;
///
/// assert!(check_query_limit(10).is_none());
/// assert!(check_query_limit(2_000_000).is_some());
/// ```
#[must_use]
pub fn check_query_limit(count: usize) -> Option<String> {
    if count > MAX_QUERIES {
        Some(format!(
            "Too many queries: {count} exceeds maximum of {MAX_QUERIES}"
        ))
    } else {
        None
    }
}

/// Validation error types for user-supplied settings
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{name} must be a fraction in (0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[error("Output prefix must not be empty")]
    EmptyOutputPrefix,
}

/// Validate a cutoff expressed as a fraction in `(0, 1]`.
///
/// # Errors
///
/// Returns `ValidationError::FractionOutOfRange` for zero, negative, NaN or
/// values above one.
///
/// # Examples
///
/// ```
/// use pseudofinder::utils::validation::validate_fraction;
///
/// assert!(validate_fraction("length_cutoff", 0.6).is_ok());
/// assert!(validate_fraction("length_cutoff", 1.0).is_ok());
/// assert!(validate_fraction("length_cutoff", 0.0).is_err());
/// assert!(validate_fraction("length_cutoff", 60.0).is_err());
/// ```
pub fn validate_fraction(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(ValidationError::FractionOutOfRange { name, value })
    }
}

/// Validate an output file prefix.
///
/// # Errors
///
/// Returns `ValidationError::EmptyOutputPrefix` if the prefix is blank.
pub fn validate_output_prefix(prefix: &str) -> Result<&str, ValidationError> {
    let trimmed = prefix.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyOutputPrefix)
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_query_limit() {
        assert!(check_query_limit(0).is_none());
        assert!(check_query_limit(MAX_QUERIES).is_none());
        assert!(check_query_limit(MAX_QUERIES + 1).is_some());
    }

    #[test]
    fn test_validate_fraction_rejects_nan() {
        assert!(validate_fraction("shared_hits_cutoff", f64::NAN).is_err());
        assert!(validate_fraction("shared_hits_cutoff", -0.3).is_err());
        assert_eq!(validate_fraction("shared_hits_cutoff", 0.3).unwrap(), 0.3);
    }

    #[test]
    fn test_validate_output_prefix() {
        assert!(validate_output_prefix("  ").is_err());
        assert_eq!(validate_output_prefix(" run1 ").unwrap(), "run1");
    }
}
