use crate::domain::model::{Errors, RawValue};
use crate::domain::ports::{RawValueAccess, Record, TimezoneAwareness};
use crate::utils::error::{Result, TimelinessError};
use std::collections::{HashMap, HashSet};

/// 以 JSON 物件為資料的記錄
///
/// JSON carries no typecast layer, so the raw value of an attribute is the
/// value itself.
#[derive(Debug, Clone, Default)]
pub struct JsonRecord {
    pub data: HashMap<String, serde_json::Value>,
    timezone_aware: HashSet<String>,
    errors: Errors,
}

impl JsonRecord {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(obj) => Ok(Self::new(obj.into_iter().collect())),
            other => Err(TimelinessError::ConfigError {
                message: format!("record must be a JSON object, got {}", other),
            }),
        }
    }

    pub fn with_timezone_aware<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timezone_aware.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Record for JsonRecord {
    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn read_attribute(&self, name: &str) -> Option<RawValue> {
        self.data.get(name).map(RawValue::from)
    }

    fn raw_value_access(&self) -> Option<&dyn RawValueAccess> {
        Some(self)
    }

    fn timezone_awareness(&self) -> Option<&dyn TimezoneAwareness> {
        Some(self)
    }
}

impl RawValueAccess for JsonRecord {
    fn raw_value_for(&self, attribute: &str) -> Option<RawValue> {
        self.data.get(attribute).map(RawValue::from)
    }
}

impl TimezoneAwareness for JsonRecord {
    fn is_timezone_aware(&self, attribute: &str) -> bool {
        self.timezone_aware.contains(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let record = JsonRecord::from_json(json!({"starts_on": "2020-01-01", "count": 3, "ends_on": null}))
            .unwrap()
            .with_timezone_aware(["published_at"]);

        assert_eq!(record.read_attribute("starts_on"), Some(RawValue::from("2020-01-01")));
        assert_eq!(record.read_attribute("count"), Some(RawValue::Other("3".to_string())));
        assert_eq!(record.read_attribute("ends_on"), Some(RawValue::Nil));
        assert_eq!(record.read_attribute("missing"), None);
        assert!(record.is_timezone_aware("published_at"));
        assert!(!record.is_timezone_aware("starts_on"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(JsonRecord::from_json(json!([1, 2])).is_err());
    }
}
