use crate::domain::model::{Errors, MessageKey, RawValue, TemporalType};
use chrono::{DateTime, Utc};

/// 被驗證的資料記錄
///
/// Optional capabilities are probed through the `*_access` methods; records
/// that do not expose them keep the defaults.
pub trait Record {
    /// Error sink the validator appends to.
    fn errors_mut(&mut self) -> &mut Errors;

    /// Current (typecast) value of an attribute, `None` when the record has no
    /// such attribute.
    fn read_attribute(&self, name: &str) -> Option<RawValue>;

    fn raw_value_access(&self) -> Option<&dyn RawValueAccess> {
        None
    }

    fn timezone_awareness(&self) -> Option<&dyn TimezoneAwareness> {
        None
    }
}

/// Access to the value as entered, before any typecasting.
pub trait RawValueAccess {
    fn raw_value_for(&self, attribute: &str) -> Option<RawValue>;
}

pub trait TimezoneAwareness {
    fn is_timezone_aware(&self, attribute: &str) -> bool;
}

/// 訊息與錯誤值格式的翻譯查詢
pub trait Translator: Send + Sync {
    fn message(&self, key: MessageKey) -> Option<String>;
    fn error_value_format(&self, temporal_type: TemporalType) -> Option<String>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
