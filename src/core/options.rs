use crate::domain::model::{MessageKey, Operand, RestrictionKind, TemporalType, TemporalValue};
use crate::utils::error::{Result, TimelinessError};
use chrono::{DateTime, NaiveDate, NaiveTime};

/// 驗證器選項的值
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
    Operand(Operand),
    Range(Operand, Operand),
    Sequence(Vec<Operand>),
    /// Anything else, kept untouched for pass-through.
    Other(toml::Value),
}

/// Validator options in declaration order. Setting a key twice replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorOptions {
    entries: Vec<(String, OptionValue)>,
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: String, value: OptionValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn temporal_type(self, temporal_type: TemporalType) -> Self {
        self.set("type", OptionValue::Text(temporal_type.as_str().to_string()))
    }

    pub fn allow_nil(self, allow: bool) -> Self {
        self.set("allow_nil", OptionValue::Flag(allow))
    }

    pub fn allow_blank(self, allow: bool) -> Self {
        self.set("allow_blank", OptionValue::Flag(allow))
    }

    pub fn ignore_usec(self, ignore: bool) -> Self {
        self.set("ignore_usec", OptionValue::Flag(ignore))
    }

    pub fn format(self, pattern: impl Into<String>) -> Self {
        self.set("format", OptionValue::Text(pattern.into()))
    }

    pub fn restriction(self, kind: RestrictionKind, operand: impl Into<Operand>) -> Self {
        self.set(kind.as_str(), OptionValue::Operand(operand.into()))
    }

    pub fn is_at(self, operand: impl Into<Operand>) -> Self {
        self.restriction(RestrictionKind::IsAt, operand)
    }

    pub fn before(self, operand: impl Into<Operand>) -> Self {
        self.restriction(RestrictionKind::Before, operand)
    }

    pub fn after(self, operand: impl Into<Operand>) -> Self {
        self.restriction(RestrictionKind::After, operand)
    }

    pub fn on_or_before(self, operand: impl Into<Operand>) -> Self {
        self.restriction(RestrictionKind::OnOrBefore, operand)
    }

    pub fn on_or_after(self, operand: impl Into<Operand>) -> Self {
        self.restriction(RestrictionKind::OnOrAfter, operand)
    }

    pub fn between(self, first: impl Into<Operand>, last: impl Into<Operand>) -> Self {
        self.set("between", OptionValue::Range(first.into(), last.into()))
    }

    pub fn message(self, key: MessageKey, template: impl Into<String>) -> Self {
        self.set(key.option_name(), OptionValue::Text(template.into()))
    }

    /// Converts one `[[validations]]` table; `skip` lists keys that are not
    /// validator options (such as `attribute`).
    pub fn from_toml_table(table: &toml::Table, skip: &[&str]) -> Result<Self> {
        let mut options = Self::new();
        for (key, value) in table {
            if skip.contains(&key.as_str()) {
                continue;
            }
            options.insert(key.clone(), option_value_from_toml(key, value)?);
        }
        Ok(options)
    }
}

fn option_value_from_toml(key: &str, value: &toml::Value) -> Result<OptionValue> {
    Ok(match value {
        toml::Value::Boolean(b) => OptionValue::Flag(*b),
        toml::Value::String(s) => OptionValue::Text(s.clone()),
        toml::Value::Datetime(dt) => OptionValue::Operand(operand_from_toml_datetime(key, dt)?),
        toml::Value::Table(t) if t.contains_key("attribute") => {
            OptionValue::Operand(operand_from_toml(key, value)?)
        }
        toml::Value::Array(items) => match items
            .iter()
            .map(|item| operand_from_toml(key, item))
            .collect::<Result<Vec<_>>>()
        {
            Ok(operands) => OptionValue::Sequence(operands),
            Err(_) => OptionValue::Other(value.clone()),
        },
        other => OptionValue::Other(other.clone()),
    })
}

fn operand_from_toml(key: &str, value: &toml::Value) -> Result<Operand> {
    match value {
        toml::Value::String(s) => Ok(Operand::from_config_str(s)),
        toml::Value::Datetime(dt) => operand_from_toml_datetime(key, dt),
        toml::Value::Table(t) => match t.get("attribute") {
            Some(toml::Value::String(name)) if !name.trim().is_empty() => {
                Ok(Operand::Attribute(name.clone()))
            }
            _ => Err(TimelinessError::InvalidConfigValueError {
                field: key.to_string(),
                value: value.to_string(),
                reason: "Attribute reference must be { attribute = \"name\" }".to_string(),
            }),
        },
        other => Err(TimelinessError::InvalidConfigValueError {
            field: key.to_string(),
            value: other.to_string(),
            reason: "Expected a date, time, datetime, string or attribute reference".to_string(),
        }),
    }
}

/// TOML local datetimes carry no offset, so they stay text and are
/// interpreted in the attribute's zone at evaluation time.
fn operand_from_toml_datetime(key: &str, dt: &toml::value::Datetime) -> Result<Operand> {
    let text = dt.to_string();
    let literal = match (dt.date.is_some(), dt.time.is_some(), dt.offset.is_some()) {
        (true, false, _) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .ok()
            .map(TemporalValue::Date),
        (false, true, _) => NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M"))
            .ok()
            .map(TemporalValue::Time),
        (true, true, true) => DateTime::parse_from_rfc3339(&text).ok().map(TemporalValue::Datetime),
        (true, true, false) => return Ok(Operand::Text(text)),
        (false, false, _) => None,
    };

    literal
        .map(Operand::Literal)
        .ok_or_else(|| TimelinessError::InvalidConfigValueError {
            field: key.to_string(),
            value: text,
            reason: "Unsupported TOML datetime".to_string(),
        })
}
