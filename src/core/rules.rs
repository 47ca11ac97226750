use crate::core::evaluator::{TimelinessValidator, ValidationReport};
use crate::domain::ports::Record;

/// 單一屬性的驗證器
#[derive(Debug)]
pub struct AttributeValidator {
    pub attribute: String,
    pub validator: TimelinessValidator,
}

/// Validators run against each record in the order they were added.
#[derive(Debug, Default)]
pub struct RuleSet {
    validators: Vec<AttributeValidator>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<String>, validator: TimelinessValidator) {
        self.validators.push(AttributeValidator {
            attribute: attribute.into(),
            validator,
        });
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn validate_record<R: Record + ?Sized>(&self, record: &mut R) -> Vec<ValidationReport> {
        let reports: Vec<ValidationReport> = self
            .validators
            .iter()
            .map(|v| v.validator.validate(record, &v.attribute))
            .collect();

        tracing::debug!(
            "Validated {} attributes, {} invalid",
            reports.len(),
            reports.iter().filter(|r| !r.is_valid()).count()
        );
        reports
    }
}

impl FromIterator<AttributeValidator> for RuleSet {
    fn from_iter<I: IntoIterator<Item = AttributeValidator>>(iter: I) -> Self {
        Self {
            validators: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_record::JsonRecord;
    use crate::config::Settings;
    use crate::core::options::ValidatorOptions;
    use crate::domain::model::{Operand, TemporalType};
    use serde_json::json;

    #[test]
    fn test_validate_record_runs_every_validator() {
        let settings = Settings::default().shared();
        let mut rules = RuleSet::new();
        rules.add(
            "starts_on",
            TimelinessValidator::from_options(
                &ValidatorOptions::new()
                    .temporal_type(TemporalType::Date)
                    .before(Operand::attribute("ends_on")),
                settings.clone(),
            )
            .unwrap(),
        );
        rules.add(
            "ends_on",
            TimelinessValidator::from_options(
                &ValidatorOptions::new().temporal_type(TemporalType::Date),
                settings,
            )
            .unwrap(),
        );
        assert_eq!(rules.len(), 2);
        assert!(!rules.is_empty());
        assert!(RuleSet::new().is_empty());

        let mut record =
            JsonRecord::from_json(json!({"starts_on": "2020-05-01", "ends_on": "2020-04-01"})).unwrap();
        let reports = rules.validate_record(&mut record);

        assert_eq!(reports.len(), 2);
        assert!(!reports[0].is_valid());
        assert!(reports[1].is_valid());
        assert_eq!(record.errors().full_messages(), vec!["starts_on must be before 2020-04-01"]);
    }
}
