use crate::utils::error::{Result, TimelinessError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 驗證目標的時間型別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalType {
    Date,
    Time,
    #[default]
    Datetime,
}

impl TemporalType {
    pub const ALL: [TemporalType; 3] = [TemporalType::Date, TemporalType::Time, TemporalType::Datetime];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalType::Date => "date",
            TemporalType::Time => "time",
            TemporalType::Datetime => "datetime",
        }
    }

    /// Pattern used to render restriction values when no override is registered.
    pub fn default_error_value_format(&self) -> &'static str {
        match self {
            TemporalType::Date => "%Y-%m-%d",
            TemporalType::Time => "%H:%M:%S",
            TemporalType::Datetime => "%Y-%m-%d %H:%M:%S",
        }
    }
}

impl fmt::Display for TemporalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemporalType {
    type Err = TimelinessError;

    fn from_str(s: &str) -> Result<Self> {
        TemporalType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TimelinessError::InvalidConfigValueError {
                field: "type".to_string(),
                value: s.to_string(),
                reason: "Unsupported type. Valid types: date, time, datetime".to_string(),
            })
    }
}

/// 正規化後的時間值，所有比較都在此表示上進行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TemporalValue {
    Date(NaiveDate),
    Time(NaiveTime),
    Datetime(DateTime<FixedOffset>),
}

impl TemporalValue {
    pub fn temporal_type(&self) -> TemporalType {
        match self {
            TemporalValue::Date(_) => TemporalType::Date,
            TemporalValue::Time(_) => TemporalType::Time,
            TemporalValue::Datetime(_) => TemporalType::Datetime,
        }
    }

    /// Values of different types are not comparable.
    pub fn compare(&self, other: &TemporalValue) -> Option<Ordering> {
        match (self, other) {
            (TemporalValue::Date(a), TemporalValue::Date(b)) => Some(a.cmp(b)),
            (TemporalValue::Time(a), TemporalValue::Time(b)) => Some(a.cmp(b)),
            (TemporalValue::Datetime(a), TemporalValue::Datetime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalValue::Date(d) => write!(f, "{}", d),
            TemporalValue::Time(t) => write!(f, "{}", t),
            TemporalValue::Datetime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<NaiveDate> for TemporalValue {
    fn from(value: NaiveDate) -> Self {
        TemporalValue::Date(value)
    }
}

impl From<NaiveTime> for TemporalValue {
    fn from(value: NaiveTime) -> Self {
        TemporalValue::Time(value)
    }
}

impl From<DateTime<FixedOffset>> for TemporalValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TemporalValue::Datetime(value)
    }
}

/// 屬性的原始輸入值（型別轉換之前）
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Nil,
    Text(String),
    Temporal(TemporalValue),
    /// Any other non-temporal input, kept in its textual form for diagnostics.
    Other(String),
}

impl RawValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, RawValue::Nil)
    }

    /// Nil and whitespace-only text are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Nil => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RawValue::Text(_))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl<T: Into<TemporalValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Nil, |v| RawValue::Temporal(v.into()))
    }
}

impl From<TemporalValue> for RawValue {
    fn from(value: TemporalValue) -> Self {
        RawValue::Temporal(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(value: NaiveDate) -> Self {
        RawValue::Temporal(value.into())
    }
}

impl From<NaiveTime> for RawValue {
    fn from(value: NaiveTime) -> Self {
        RawValue::Temporal(value.into())
    }
}

impl From<DateTime<FixedOffset>> for RawValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RawValue::Temporal(value.into())
    }
}

impl From<&serde_json::Value> for RawValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Nil,
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            other => RawValue::Other(other.to_string()),
        }
    }
}

/// Symbolic operands read from the clock at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockReading {
    Now,
    Today,
}

/// 限制條件的比較對象
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(TemporalValue),
    /// Parsed with the validator's type and format when evaluated.
    Text(String),
    Attribute(String),
    Clock(ClockReading),
}

impl Operand {
    pub fn attribute(name: impl Into<String>) -> Self {
        Operand::Attribute(name.into())
    }

    /// Maps configuration strings onto operands: `now` and `today` are clock
    /// readings, anything else is text parsed at evaluation time.
    pub fn from_config_str(s: &str) -> Self {
        match s.trim() {
            "now" => Operand::Clock(ClockReading::Now),
            "today" => Operand::Clock(ClockReading::Today),
            other => Operand::Text(other.to_string()),
        }
    }

    pub fn as_literal(&self) -> Option<&TemporalValue> {
        match self {
            Operand::Literal(v) => Some(v),
            _ => None,
        }
    }
}

impl From<TemporalValue> for Operand {
    fn from(value: TemporalValue) -> Self {
        Operand::Literal(value)
    }
}

impl From<NaiveDate> for Operand {
    fn from(value: NaiveDate) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<NaiveTime> for Operand {
    fn from(value: NaiveTime) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<DateTime<FixedOffset>> for Operand {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Operand::Literal(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    IsAt,
    Before,
    After,
    OnOrBefore,
    OnOrAfter,
}

impl RestrictionKind {
    pub const ALL: [RestrictionKind; 5] = [
        RestrictionKind::IsAt,
        RestrictionKind::Before,
        RestrictionKind::After,
        RestrictionKind::OnOrBefore,
        RestrictionKind::OnOrAfter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionKind::IsAt => "is_at",
            RestrictionKind::Before => "before",
            RestrictionKind::After => "after",
            RestrictionKind::OnOrBefore => "on_or_before",
            RestrictionKind::OnOrAfter => "on_or_after",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        RestrictionKind::ALL.into_iter().find(|k| k.as_str() == name)
    }

    pub fn operator(&self) -> &'static str {
        match self {
            RestrictionKind::IsAt => "==",
            RestrictionKind::Before => "<",
            RestrictionKind::After => ">",
            RestrictionKind::OnOrBefore => "<=",
            RestrictionKind::OnOrAfter => ">=",
        }
    }

    /// Whether `subject <op> operand` holds given `subject.cmp(operand)`.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            RestrictionKind::IsAt => ordering == Ordering::Equal,
            RestrictionKind::Before => ordering == Ordering::Less,
            RestrictionKind::After => ordering == Ordering::Greater,
            RestrictionKind::OnOrBefore => ordering != Ordering::Greater,
            RestrictionKind::OnOrAfter => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 錯誤訊息的查詢鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Invalid(TemporalType),
    Restriction(RestrictionKind),
}

impl MessageKey {
    /// Key used by translation catalogs, e.g. `invalid_date` or `on_or_after`.
    pub fn translation_key(&self) -> String {
        match self {
            MessageKey::Invalid(t) => format!("invalid_{}", t),
            MessageKey::Restriction(r) => r.as_str().to_string(),
        }
    }

    /// Validator option carrying a per-validation override, e.g. `before_message`.
    pub fn option_name(&self) -> String {
        format!("{}_message", self.translation_key())
    }

    pub fn from_translation_key(key: &str) -> Option<Self> {
        if let Some(r) = RestrictionKind::from_name(key) {
            return Some(MessageKey::Restriction(r));
        }
        key.strip_prefix("invalid_")
            .and_then(|t| t.parse::<TemporalType>().ok())
            .map(MessageKey::Invalid)
    }

    pub fn from_option_name(name: &str) -> Option<Self> {
        name.strip_suffix("_message")
            .and_then(MessageKey::from_translation_key)
    }

    pub fn default_template(&self) -> &'static str {
        match self {
            MessageKey::Invalid(TemporalType::Date) => "is not a valid date",
            MessageKey::Invalid(TemporalType::Time) => "is not a valid time",
            MessageKey::Invalid(TemporalType::Datetime) => "is not a valid datetime",
            MessageKey::Restriction(RestrictionKind::IsAt) => "must be at %{restriction}",
            MessageKey::Restriction(RestrictionKind::Before) => "must be before %{restriction}",
            MessageKey::Restriction(RestrictionKind::After) => "must be after %{restriction}",
            MessageKey::Restriction(RestrictionKind::OnOrBefore) => {
                "must be on or before %{restriction}"
            }
            MessageKey::Restriction(RestrictionKind::OnOrAfter) => {
                "must be on or after %{restriction}"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid(TemporalType),
    Restriction(RestrictionKind),
    /// Resolving or normalizing the restriction's operand failed.
    RestrictionError(RestrictionKind),
}

impl ErrorKind {
    pub fn code(&self) -> String {
        match self {
            ErrorKind::Invalid(t) => format!("invalid_{}", t),
            ErrorKind::Restriction(r) => r.as_str().to_string(),
            ErrorKind::RestrictionError(r) => format!("{}_error", r),
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

/// 單一屬性錯誤
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction: Option<String>,
}

/// Errors accumulated on a record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Errors {
    entries: Vec<(String, AttributeError)>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: &str, error: AttributeError) {
        self.entries.push((attribute.to_string(), error));
    }

    pub fn get(&self, attribute: &str) -> Vec<&AttributeError> {
        self.entries
            .iter()
            .filter(|(attr, _)| attr == attribute)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeError)> {
        self.entries.iter().map(|(attr, e)| (attr.as_str(), e))
    }

    /// Messages prefixed with their attribute name.
    pub fn full_messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(attr, e)| format!("{} {}", attr, e.message))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restriction_operators() {
        assert!(RestrictionKind::IsAt.holds(Ordering::Equal));
        assert!(!RestrictionKind::IsAt.holds(Ordering::Less));
        assert!(RestrictionKind::Before.holds(Ordering::Less));
        assert!(!RestrictionKind::Before.holds(Ordering::Equal));
        assert!(RestrictionKind::After.holds(Ordering::Greater));
        assert!(RestrictionKind::OnOrBefore.holds(Ordering::Equal));
        assert!(!RestrictionKind::OnOrBefore.holds(Ordering::Greater));
        assert!(RestrictionKind::OnOrAfter.holds(Ordering::Equal));
        assert!(!RestrictionKind::OnOrAfter.holds(Ordering::Less));
    }

    #[test]
    fn test_message_key_names() {
        let key = MessageKey::Invalid(TemporalType::Date);
        assert_eq!(key.translation_key(), "invalid_date");
        assert_eq!(key.option_name(), "invalid_date_message");
        assert_eq!(MessageKey::from_option_name("invalid_date_message"), Some(key));
        assert_eq!(
            MessageKey::from_option_name("on_or_after_message"),
            Some(MessageKey::Restriction(RestrictionKind::OnOrAfter))
        );
        assert_eq!(MessageKey::from_option_name("between_message"), None);
    }

    #[test]
    fn test_blank_values() {
        assert!(RawValue::Nil.is_blank());
        assert!(RawValue::from("   ").is_blank());
        assert!(!RawValue::from("2020-01-01").is_blank());
        assert!(!RawValue::Other("0".to_string()).is_blank());
    }

    #[test]
    fn test_values_of_different_types_do_not_compare() {
        let date = TemporalValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let time = TemporalValue::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(date.compare(&time), None);
        assert_eq!(date.compare(&date), Some(Ordering::Equal));
    }

    #[test]
    fn test_errors_full_messages() {
        let mut errors = Errors::new();
        errors.add(
            "starts_on",
            AttributeError {
                kind: ErrorKind::Invalid(TemporalType::Date),
                message: "is not a valid date".to_string(),
                restriction: None,
            },
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("starts_on").len(), 1);
        assert!(errors.get("ends_on").is_empty());
        assert_eq!(errors.full_messages(), vec!["starts_on is not a valid date"]);
    }
}
