use crate::utils::error::{TimelinessError, Result};
use chrono::format::{Item, StrftimeItems};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Whether `pattern` is a usable strftime pattern.
pub fn is_valid_strftime(pattern: &str) -> bool {
    !pattern.is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

pub fn validate_strftime_pattern(field_name: &str, pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(TimelinessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: "Format cannot be empty".to_string(),
        });
    }

    if !is_valid_strftime(pattern) {
        return Err(TimelinessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: "Invalid strftime pattern".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| TimelinessError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TimelinessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_strftime_pattern() {
        assert!(validate_strftime_pattern("format", "%Y-%m-%d").is_ok());
        assert!(validate_strftime_pattern("format", "%d/%m/%Y %H:%M").is_ok());
        assert!(validate_strftime_pattern("format", "").is_err());
        assert!(validate_strftime_pattern("format", "%Q").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("starts_on".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("attribute", &present).unwrap(), "starts_on");
        assert!(validate_required_field("attribute", &missing).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("attribute", "starts_on").is_ok());
        assert!(validate_non_empty_string("attribute", "  ").is_err());
    }
}
