use crate::adapters::clock::SystemClock;
use crate::adapters::i18n::{interpolate, MessageCatalog};
use crate::config::Settings;
use crate::core::compiler::{compile, ValidationSpec};
use crate::core::formatter::format_error_value;
use crate::core::normalizer::Normalizer;
use crate::core::options::ValidatorOptions;
use crate::domain::model::{
    AttributeError, ClockReading, ErrorKind, MessageKey, Operand, RawValue, RestrictionKind,
    TemporalType, TemporalValue,
};
use crate::domain::ports::{Clock, Record, Translator};
use crate::utils::error::{Result, TimelinessError};
use chrono::{NaiveTime, TimeZone};
use serde::Serialize;
use std::sync::Arc;

/// Terminal state of one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    /// Nil or blank value accepted by `allow_nil` / `allow_blank`.
    Skipped,
    InvalidType {
        temporal_type: TemporalType,
    },
    RestrictionViolated {
        restriction: RestrictionKind,
        restriction_value: String,
    },
}

/// A restriction whose operand could not be resolved or normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestrictionFailure {
    pub restriction: RestrictionKind,
    pub error: String,
    /// Whether an error was added to the record; false when suppressed by
    /// `ignore_restriction_errors`.
    pub surfaced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub attribute: String,
    #[serde(flatten)]
    pub outcome: ValidationOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RestrictionFailure>,
}

impl ValidationReport {
    fn new(attribute: &str, outcome: ValidationOutcome, failures: Vec<RestrictionFailure>) -> Self {
        Self {
            attribute: attribute.to_string(),
            outcome,
            failures,
        }
    }

    /// True when no error was added to the record.
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, ValidationOutcome::Valid | ValidationOutcome::Skipped)
            && self.failures.iter().all(|f| !f.surfaced)
    }
}

/// Result of checking a single restriction.
#[derive(Debug)]
pub enum RestrictionOutcome {
    Satisfied,
    Violated { restriction_value: TemporalValue },
    Failed(TimelinessError),
}

/// 時間屬性驗證器
///
/// Runs one pass per (record, attribute, value): fetch the raw value, accept
/// nil/blank when allowed, normalize to the configured type, then check the
/// restrictions in declaration order. The first violated restriction ends the
/// pass. A restriction whose operand cannot be evaluated is reported (or
/// skipped when `ignore_restriction_errors` is on) and the pass continues.
pub struct TimelinessValidator {
    spec: ValidationSpec,
    settings: Arc<Settings>,
    translator: Arc<dyn Translator>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TimelinessValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelinessValidator")
            .field("spec", &self.spec)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TimelinessValidator {
    pub const KIND: &'static str = "timeliness";

    pub fn new(spec: ValidationSpec, settings: Arc<Settings>) -> Self {
        Self {
            spec,
            settings,
            translator: Arc::new(MessageCatalog::default()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_options(options: &ValidatorOptions, settings: Arc<Settings>) -> Result<Self> {
        Ok(Self::new(compile(options)?, settings))
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn spec(&self) -> &ValidationSpec {
        &self.spec
    }

    /// Validates the attribute's current value as read from the record.
    pub fn validate<R: Record + ?Sized>(&self, record: &mut R, attribute: &str) -> ValidationReport {
        let value = record.read_attribute(attribute).unwrap_or_default();
        self.validate_each(record, attribute, &value)
    }

    pub fn validate_each<R: Record + ?Sized>(
        &self,
        record: &mut R,
        attribute: &str,
        value: &RawValue,
    ) -> ValidationReport {
        let raw = record
            .raw_value_access()
            .and_then(|access| access.raw_value_for(attribute))
            .filter(|raw| !raw.is_nil())
            .unwrap_or_else(|| value.clone());

        if (self.spec.allow_nil && raw.is_nil()) || (self.spec.allow_blank && raw.is_blank()) {
            tracing::debug!("{}: empty value allowed, skipping", attribute);
            return ValidationReport::new(attribute, ValidationOutcome::Skipped, Vec::new());
        }

        let normalizer = self.normalizer(&*record, attribute);
        let subject = if raw.is_text() || self.spec.format.is_some() {
            normalizer.parse(&raw)
        } else {
            value.clone()
        };

        let Some(subject) = normalizer.type_cast(&subject) else {
            let temporal_type = self.spec.temporal_type;
            tracing::debug!("{}: {:?} is not a valid {}", attribute, raw, temporal_type);
            let message = self.message(MessageKey::Invalid(temporal_type), attribute, None);
            record.errors_mut().add(
                attribute,
                AttributeError {
                    kind: ErrorKind::Invalid(temporal_type),
                    message,
                    restriction: None,
                },
            );
            return ValidationReport::new(
                attribute,
                ValidationOutcome::InvalidType { temporal_type },
                Vec::new(),
            );
        };

        let mut failures = Vec::new();
        for (kind, operand) in &self.spec.restrictions {
            match self.evaluate_restriction(&*record, *kind, operand, &subject, &normalizer) {
                RestrictionOutcome::Satisfied => {}
                RestrictionOutcome::Violated { restriction_value } => {
                    let formatted = format_error_value(
                        &restriction_value,
                        self.spec.temporal_type,
                        self.translator.as_ref(),
                    );
                    tracing::debug!("{}: {} {} violated", attribute, kind, formatted);
                    let message = self.message(MessageKey::Restriction(*kind), attribute, Some(&formatted));
                    record.errors_mut().add(
                        attribute,
                        AttributeError {
                            kind: ErrorKind::Restriction(*kind),
                            message,
                            restriction: Some(formatted.clone()),
                        },
                    );
                    return ValidationReport::new(
                        attribute,
                        ValidationOutcome::RestrictionViolated {
                            restriction: *kind,
                            restriction_value: formatted,
                        },
                        failures,
                    );
                }
                RestrictionOutcome::Failed(err) => {
                    let surfaced = !self.settings.ignore_restriction_errors();
                    if surfaced {
                        tracing::warn!("{}: could not evaluate {} restriction: {}", attribute, kind, err);
                        record.errors_mut().add(
                            attribute,
                            AttributeError {
                                kind: ErrorKind::RestrictionError(*kind),
                                message: format!(
                                    "Error occurred validating {} for :{} restriction:\n{}",
                                    attribute, kind, err
                                ),
                                restriction: None,
                            },
                        );
                    } else {
                        tracing::debug!("{}: ignoring {} restriction error: {}", attribute, kind, err);
                    }
                    failures.push(RestrictionFailure {
                        restriction: *kind,
                        error: err.to_string(),
                        surfaced,
                    });
                }
            }
        }

        ValidationReport::new(attribute, ValidationOutcome::Valid, failures)
    }

    /// Resolves the operand, normalizes it like the subject and compares.
    pub fn evaluate_restriction<R: Record + ?Sized>(
        &self,
        record: &R,
        kind: RestrictionKind,
        operand: &Operand,
        subject: &TemporalValue,
        normalizer: &Normalizer<'_>,
    ) -> RestrictionOutcome {
        let restriction_value = match self.resolve_operand(record, operand, normalizer) {
            Ok(value) => value,
            Err(err) => return RestrictionOutcome::Failed(err),
        };

        let Some(ordering) = subject.compare(&restriction_value) else {
            return RestrictionOutcome::Failed(TimelinessError::UnparsableOperand {
                value: restriction_value.to_string(),
                temporal_type: subject.temporal_type().to_string(),
            });
        };

        tracing::debug!("{} {} {} -> {:?}", subject, kind.operator(), restriction_value, ordering);
        if kind.holds(ordering) {
            RestrictionOutcome::Satisfied
        } else {
            RestrictionOutcome::Violated { restriction_value }
        }
    }

    fn resolve_operand<R: Record + ?Sized>(
        &self,
        record: &R,
        operand: &Operand,
        normalizer: &Normalizer<'_>,
    ) -> Result<TemporalValue> {
        let temporal_type = normalizer.temporal_type().to_string();
        let unparsable = |value: String| TimelinessError::UnparsableOperand {
            value,
            temporal_type: temporal_type.clone(),
        };

        match operand {
            Operand::Literal(value) => normalizer
                .type_cast(&RawValue::Temporal(*value))
                .ok_or_else(|| unparsable(value.to_string())),
            Operand::Text(text) => {
                let parsed = normalizer.parse(&RawValue::Text(text.clone()));
                normalizer
                    .type_cast(&parsed)
                    .ok_or_else(|| unparsable(text.clone()))
            }
            Operand::Attribute(name) => {
                let value = record
                    .read_attribute(name)
                    .ok_or_else(|| TimelinessError::MissingAttribute {
                        attribute: name.clone(),
                    })?;
                normalizer
                    .type_cast(&normalizer.parse(&value))
                    .ok_or_else(|| TimelinessError::BlankOperand {
                        attribute: name.clone(),
                        temporal_type: temporal_type.clone(),
                    })
            }
            Operand::Clock(reading) => {
                let now = self.clock.now();
                let value = match reading {
                    ClockReading::Now => TemporalValue::Datetime(normalizer.current(now)),
                    ClockReading::Today => {
                        // read and widened in the application zone
                        let zone = self.settings.time_zone();
                        let today = now.with_timezone(&zone).date_naive();
                        match normalizer.temporal_type() {
                            TemporalType::Datetime => zone
                                .from_local_datetime(&today.and_time(NaiveTime::MIN))
                                .single()
                                .map_or(TemporalValue::Date(today), TemporalValue::Datetime),
                            _ => TemporalValue::Date(today),
                        }
                    }
                };
                normalizer
                    .type_cast(&RawValue::Temporal(value))
                    .ok_or_else(|| unparsable(value.to_string()))
            }
        }
    }

    fn normalizer<R: Record + ?Sized>(&self, record: &R, attribute: &str) -> Normalizer<'_> {
        let timezone_aware = record
            .timezone_awareness()
            .is_some_and(|awareness| awareness.is_timezone_aware(attribute));

        let normalizer = Normalizer::new(self.spec.temporal_type)
            .with_format(self.spec.format.as_deref())
            .ignore_usec(self.spec.ignore_usec);
        if timezone_aware {
            normalizer.timezone_aware(self.settings.time_zone())
        } else {
            normalizer
        }
    }

    /// Override from the options, else the translator, else the built-in text.
    fn message(&self, key: MessageKey, attribute: &str, restriction: Option<&str>) -> String {
        let template = self
            .spec
            .message(key)
            .map(str::to_string)
            .or_else(|| self.translator.message(key))
            .unwrap_or_else(|| key.default_template().to_string());

        interpolate(
            &template,
            &[("restriction", restriction.unwrap_or_default()), ("attribute", attribute)],
        )
    }
}
