use crate::core::options::{OptionValue, ValidatorOptions};
use crate::domain::model::{MessageKey, Operand, RestrictionKind, TemporalType};
use crate::utils::error::{Result, TimelinessError};
use crate::utils::validation::validate_strftime_pattern;
use std::cmp::Ordering;
use std::collections::HashMap;

/// 編譯後的驗證規格，建立後不再變動
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSpec {
    pub temporal_type: TemporalType,
    pub allow_nil: bool,
    pub allow_blank: bool,
    pub ignore_usec: bool,
    pub format: Option<String>,
    /// Restrictions in declaration order; `between` is already expanded.
    pub restrictions: Vec<(RestrictionKind, Operand)>,
    pub messages: HashMap<MessageKey, String>,
    /// Options this validator does not recognize, left for the caller.
    pub passthrough: Vec<(String, OptionValue)>,
}

impl Default for ValidationSpec {
    fn default() -> Self {
        Self {
            temporal_type: TemporalType::Datetime,
            allow_nil: false,
            allow_blank: false,
            ignore_usec: false,
            format: None,
            restrictions: Vec::new(),
            messages: HashMap::new(),
            passthrough: Vec::new(),
        }
    }
}

impl ValidationSpec {
    pub fn restriction(&self, kind: RestrictionKind) -> Option<&Operand> {
        self.restrictions
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, operand)| operand)
    }

    /// Per-validation message override, if one was configured.
    pub fn message(&self, key: MessageKey) -> Option<&str> {
        self.messages.get(&key).map(String::as_str)
    }

    fn set_restriction(&mut self, kind: RestrictionKind, operand: Operand) {
        match self.restrictions.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = operand,
            None => self.restrictions.push((kind, operand)),
        }
    }
}

/// Compiles validator options into a [`ValidationSpec`].
///
/// `between` is applied after every other option, so it overrides explicit
/// `on_or_after` / `on_or_before` entries wherever they were declared.
pub fn compile(options: &ValidatorOptions) -> Result<ValidationSpec> {
    let mut spec = ValidationSpec::default();
    let mut between = None;

    for (key, value) in options.iter() {
        match key {
            "type" => spec.temporal_type = expect_text(key, value)?.parse()?,
            "allow_nil" => spec.allow_nil = expect_flag(key, value)?,
            "allow_blank" => spec.allow_blank = expect_flag(key, value)?,
            "ignore_usec" => spec.ignore_usec = expect_flag(key, value)?,
            "format" => {
                let pattern = expect_text(key, value)?;
                validate_strftime_pattern(key, pattern)?;
                spec.format = Some(pattern.to_string());
            }
            "between" => between = Some(expand_between(value)?),
            _ => {
                if let Some(kind) = RestrictionKind::from_name(key) {
                    spec.set_restriction(kind, expect_operand(key, value)?);
                } else if let Some(message_key) = MessageKey::from_option_name(key) {
                    spec.messages
                        .insert(message_key, expect_text(key, value)?.to_string());
                } else {
                    spec.passthrough.push((key.to_string(), value.clone()));
                }
            }
        }
    }

    if let Some((first, last)) = between {
        spec.set_restriction(RestrictionKind::OnOrAfter, first);
        spec.set_restriction(RestrictionKind::OnOrBefore, last);
    }

    tracing::debug!(
        "Compiled {} validation with restrictions: {:?}",
        spec.temporal_type,
        spec.restrictions.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
    );

    Ok(spec)
}

fn expand_between(value: &OptionValue) -> Result<(Operand, Operand)> {
    let (first, last) = match value {
        OptionValue::Range(first, last) => (first.clone(), last.clone()),
        OptionValue::Sequence(items) if items.len() == 2 => (items[0].clone(), items[1].clone()),
        OptionValue::Sequence(items) => {
            return Err(TimelinessError::ConfigError {
                message: format!(":between must have exactly two values, got {}", items.len()),
            })
        }
        OptionValue::Other(toml::Value::Array(_)) => {
            return Err(TimelinessError::ConfigError {
                message: ":between values must be dates, times or datetimes".to_string(),
            })
        }
        _ => {
            return Err(TimelinessError::ConfigError {
                message: ":between must be a Range or an Array".to_string(),
            })
        }
    };

    if let (Some(a), Some(b)) = (first.as_literal(), last.as_literal()) {
        if a.compare(b) == Some(Ordering::Greater) {
            return Err(TimelinessError::ConfigError {
                message: format!(":between range is descending ({} > {})", a, b),
            });
        }
    }

    Ok((text_operand(first), text_operand(last)))
}

/// Plain strings inside a range may still name the clock.
fn text_operand(operand: Operand) -> Operand {
    match operand {
        Operand::Text(s) => Operand::from_config_str(&s),
        other => other,
    }
}

fn expect_flag(key: &str, value: &OptionValue) -> Result<bool> {
    match value {
        OptionValue::Flag(b) => Ok(*b),
        other => Err(invalid(key, other, "Expected true or false")),
    }
}

fn expect_text<'a>(key: &str, value: &'a OptionValue) -> Result<&'a str> {
    match value {
        OptionValue::Text(s) => Ok(s),
        other => Err(invalid(key, other, "Expected a string")),
    }
}

fn expect_operand(key: &str, value: &OptionValue) -> Result<Operand> {
    match value {
        OptionValue::Operand(operand) => Ok(text_operand(operand.clone())),
        OptionValue::Text(s) => Ok(Operand::from_config_str(s)),
        other => Err(invalid(
            key,
            other,
            "Expected a date, time, datetime, string or attribute reference",
        )),
    }
}

fn invalid(key: &str, value: &OptionValue, reason: &str) -> TimelinessError {
    TimelinessError::InvalidConfigValueError {
        field: key.to_string(),
        value: format!("{:?}", value),
        reason: reason.to_string(),
    }
}
