use crate::adapters::clock::SystemClock;
use crate::adapters::i18n::MessageCatalog;
use crate::config::{parse_time_zone, Settings};
use crate::core::evaluator::TimelinessValidator;
use crate::core::options::ValidatorOptions;
use crate::core::rules::{AttributeValidator, RuleSet};
use crate::domain::ports::{Clock, Translator};
use crate::utils::error::{Result, TimelinessError};
use crate::utils::validation::{validate_non_empty_string, validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub messages: HashMap<String, String>,
    #[serde(default)]
    pub error_value_formats: HashMap<String, String>,
    /// Attributes whose datetimes are interpreted in `settings.time_zone`.
    #[serde(default)]
    pub timezone_aware: Vec<String>,
    #[serde(default)]
    pub validations: Vec<toml::Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub time_zone: Option<String>,
    pub ignore_restriction_errors: Option<bool>,
}

impl RulesConfig {
    /// 從 TOML 檔案載入規則
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TimelinessError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析規則
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TimelinessError::TomlError {
            message: e.to_string(),
        })
    }

    /// 替換環境變數 (例如 ${APP_TIME_ZONE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn settings(&self) -> Result<Settings> {
        let time_zone = match &self.settings.time_zone {
            Some(zone) => parse_time_zone(zone)?,
            None => Settings::default().time_zone(),
        };
        Ok(Settings::new(
            time_zone,
            self.settings.ignore_restriction_errors.unwrap_or(false),
        ))
    }

    pub fn message_catalog(&self) -> Result<MessageCatalog> {
        MessageCatalog::from_tables(&self.messages, &self.error_value_formats)
    }

    /// Compiles every `[[validations]]` entry.
    pub fn rule_set(&self, settings: Arc<Settings>, translator: Arc<dyn Translator>) -> Result<RuleSet> {
        self.rule_set_with_clock(settings, translator, Arc::new(SystemClock))
    }

    pub fn rule_set_with_clock(
        &self,
        settings: Arc<Settings>,
        translator: Arc<dyn Translator>,
        clock: Arc<dyn Clock>,
    ) -> Result<RuleSet> {
        self.validations
            .iter()
            .enumerate()
            .map(|(index, table)| {
                let attribute = Self::attribute_name(index, table)?;
                let options = ValidatorOptions::from_toml_table(table, &["attribute"])?;
                let validator = TimelinessValidator::from_options(&options, Arc::clone(&settings))
                    .map_err(|e| TimelinessError::ConfigError {
                        message: format!("validations[{}] ({}): {}", index, attribute, e),
                    })?
                    .with_translator(Arc::clone(&translator))
                    .with_clock(Arc::clone(&clock));

                for (key, _) in &validator.spec().passthrough {
                    tracing::debug!("validations[{}]: passing through option '{}'", index, key);
                }

                Ok(AttributeValidator {
                    attribute,
                    validator,
                })
            })
            .collect()
    }

    fn attribute_name(index: usize, table: &toml::Table) -> Result<String> {
        let field = format!("validations[{}].attribute", index);
        let value = table.get("attribute").and_then(|v| v.as_str()).map(str::to_string);
        let name = validate_required_field(&field, &value)?;
        validate_non_empty_string(&field, name)?;
        Ok(name.clone())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.settings()?;
        self.message_catalog()?;

        for (index, table) in self.validations.iter().enumerate() {
            Self::attribute_name(index, table)?;
        }

        for (index, attribute) in self.timezone_aware.iter().enumerate() {
            validate_non_empty_string(&format!("timezone_aware[{}]", index), attribute)?;
        }

        Ok(())
    }
}

impl Validate for RulesConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_record::JsonRecord;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RULES: &str = r#"
timezone_aware = ["published_at"]

[settings]
time_zone = "+08:00"
ignore_restriction_errors = false

[messages]
on_or_after = "cannot be earlier than %{restriction}"

[error_value_formats]
date = "%d/%m/%Y"

[[validations]]
attribute = "starts_on"
type = "date"
on_or_after = 2020-01-01

[[validations]]
attribute = "ends_on"
type = "date"
allow_nil = true
after = { attribute = "starts_on" }
"#;

    #[test]
    fn test_parse_rules() {
        let config = RulesConfig::from_toml_str(RULES).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.validations.len(), 2);
        assert_eq!(config.timezone_aware, vec!["published_at"]);

        let settings = config.settings().unwrap();
        assert_eq!(settings.time_zone().local_minus_utc(), 8 * 3600);
        assert!(!settings.ignore_restriction_errors());
    }

    #[test]
    fn test_rule_set_uses_catalog() {
        let config = RulesConfig::from_toml_str(RULES).unwrap();
        let catalog: Arc<dyn Translator> = Arc::new(config.message_catalog().unwrap());
        let rules = config.rule_set(config.settings().unwrap().shared(), catalog).unwrap();
        assert_eq!(rules.len(), 2);

        let mut record = JsonRecord::from_json(serde_json::json!({
            "starts_on": "2019-12-31",
            "ends_on": null
        }))
        .unwrap();
        rules.validate_record(&mut record);
        assert_eq!(
            record.errors().full_messages(),
            vec!["starts_on cannot be earlier than 01/01/2020"]
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TIMELINESS_TEST_ZONE", "-05:00");

        let config = RulesConfig::from_toml_str(
            r#"
[settings]
time_zone = "${TIMELINESS_TEST_ZONE}"
"#,
        )
        .unwrap();
        assert_eq!(config.settings().unwrap().time_zone().local_minus_utc(), -5 * 3600);

        std::env::remove_var("TIMELINESS_TEST_ZONE");
    }

    #[test]
    fn test_config_validation() {
        let missing_attribute = RulesConfig::from_toml_str(
            r#"
[[validations]]
type = "date"
"#,
        )
        .unwrap();
        assert!(missing_attribute.validate().is_err());

        let bad_zone = RulesConfig::from_toml_str(
            r#"
[settings]
time_zone = "Mars/Olympus"
"#,
        )
        .unwrap();
        assert!(bad_zone.validate().is_err());

        let bad_message = RulesConfig::from_toml_str(
            r#"
[messages]
between = "nope"
"#,
        )
        .unwrap();
        assert!(bad_message.validate().is_err());
    }

    #[test]
    fn test_bad_between_fails_at_setup() {
        let config = RulesConfig::from_toml_str(
            r#"
[[validations]]
attribute = "starts_on"
between = "2020-01-01"
"#,
        )
        .unwrap();
        let err = config
            .rule_set(Settings::default().shared(), Arc::new(MessageCatalog::default()))
            .unwrap_err();
        assert!(err.to_string().contains(":between must be a Range or an Array"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(RULES.as_bytes()).unwrap();

        let config = RulesConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.validations.len(), 2);
    }
}
