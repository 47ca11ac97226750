use crate::domain::model::{MessageKey, TemporalType};
use crate::domain::ports::Translator;
use crate::utils::error::{Result, TimelinessError};
use crate::utils::validation::validate_strftime_pattern;
use std::collections::HashMap;

/// 訊息目錄：內建英文訊息，可逐項覆蓋
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<MessageKey, String>,
    error_value_formats: HashMap<TemporalType, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message(&mut self, key: MessageKey, template: impl Into<String>) {
        self.messages.insert(key, template.into());
    }

    pub fn set_error_value_format(&mut self, temporal_type: TemporalType, pattern: impl Into<String>) {
        self.error_value_formats.insert(temporal_type, pattern.into());
    }

    /// Builds a catalog from `[messages]` and `[error_value_formats]` tables
    /// keyed by translation key (`before`, `invalid_date`) and type name.
    pub fn from_tables(
        messages: &HashMap<String, String>,
        error_value_formats: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut catalog = Self::new();

        for (key, template) in messages {
            let message_key = MessageKey::from_translation_key(key).ok_or_else(|| {
                TimelinessError::InvalidConfigValueError {
                    field: format!("messages.{}", key),
                    value: template.clone(),
                    reason: "Unknown message key".to_string(),
                }
            })?;
            catalog.set_message(message_key, template.clone());
        }

        for (type_name, pattern) in error_value_formats {
            let temporal_type: TemporalType = type_name.parse()?;
            validate_strftime_pattern(&format!("error_value_formats.{}", type_name), pattern)?;
            catalog.set_error_value_format(temporal_type, pattern.clone());
        }

        Ok(catalog)
    }
}

impl Translator for MessageCatalog {
    fn message(&self, key: MessageKey) -> Option<String> {
        Some(
            self.messages
                .get(&key)
                .cloned()
                .unwrap_or_else(|| key.default_template().to_string()),
        )
    }

    fn error_value_format(&self, temporal_type: TemporalType) -> Option<String> {
        self.error_value_formats.get(&temporal_type).cloned()
    }
}

/// Replaces `%{name}` placeholders.
pub fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("%{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RestrictionKind;

    #[test]
    fn test_default_messages() {
        let catalog = MessageCatalog::default();
        assert_eq!(
            catalog.message(MessageKey::Invalid(TemporalType::Date)).unwrap(),
            "is not a valid date"
        );
        assert_eq!(
            catalog.message(MessageKey::Restriction(RestrictionKind::OnOrAfter)).unwrap(),
            "must be on or after %{restriction}"
        );
        assert_eq!(catalog.error_value_format(TemporalType::Date), None);
    }

    #[test]
    fn test_from_tables() {
        let mut messages = HashMap::new();
        messages.insert("before".to_string(), "must come before %{restriction}".to_string());
        let mut formats = HashMap::new();
        formats.insert("date".to_string(), "%d.%m.%Y".to_string());

        let catalog = MessageCatalog::from_tables(&messages, &formats).unwrap();
        assert_eq!(
            catalog.message(MessageKey::Restriction(RestrictionKind::Before)).unwrap(),
            "must come before %{restriction}"
        );
        assert_eq!(catalog.error_value_format(TemporalType::Date).unwrap(), "%d.%m.%Y");
    }

    #[test]
    fn test_from_tables_rejects_unknown_keys() {
        let mut messages = HashMap::new();
        messages.insert("between".to_string(), "nope".to_string());
        assert!(MessageCatalog::from_tables(&messages, &HashMap::new()).is_err());

        let mut formats = HashMap::new();
        formats.insert("week".to_string(), "%W".to_string());
        assert!(MessageCatalog::from_tables(&HashMap::new(), &formats).is_err());
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(
            interpolate("%{attribute} must be before %{restriction}", &[
                ("restriction", "2020-01-01"),
                ("attribute", "starts_on"),
            ]),
            "starts_on must be before 2020-01-01"
        );
    }
}
