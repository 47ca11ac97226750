use crate::domain::model::{TemporalType, TemporalValue};
use crate::domain::ports::Translator;
use crate::utils::validation::is_valid_strftime;
use std::fmt::Write;

/// 將限制值格式化，用於錯誤訊息
///
/// The pattern comes from the translator when it registers one for the type,
/// otherwise the type's default pattern is used. A registered pattern that
/// cannot render the value also falls back to the default.
pub fn format_error_value(
    value: &TemporalValue,
    temporal_type: TemporalType,
    translator: &dyn Translator,
) -> String {
    let default = temporal_type.default_error_value_format();
    let pattern = translator
        .error_value_format(temporal_type)
        .filter(|p| is_valid_strftime(p));

    pattern
        .and_then(|p| render(value, &p))
        .or_else(|| render(value, default))
        .unwrap_or_else(|| value.to_string())
}

fn render(value: &TemporalValue, pattern: &str) -> Option<String> {
    let mut out = String::new();
    let written = match value {
        TemporalValue::Date(d) => write!(out, "{}", d.format(pattern)),
        TemporalValue::Time(t) => write!(out, "{}", t.format(pattern)),
        TemporalValue::Datetime(dt) => write!(out, "{}", dt.format(pattern)),
    };
    written.ok().map(|_| out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::i18n::MessageCatalog;
    use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};

    #[test]
    fn test_default_patterns() {
        let catalog = MessageCatalog::default();
        let date = TemporalValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let time = TemporalValue::Time(NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        let dt = TemporalValue::Datetime(
            FixedOffset::east_opt(3600).unwrap().with_ymd_and_hms(2020, 1, 1, 9, 5, 0).unwrap(),
        );

        assert_eq!(format_error_value(&date, TemporalType::Date, &catalog), "2020-01-01");
        assert_eq!(format_error_value(&time, TemporalType::Time, &catalog), "09:05:00");
        assert_eq!(format_error_value(&dt, TemporalType::Datetime, &catalog), "2020-01-01 09:05:00");
    }

    #[test]
    fn test_override_pattern() {
        let mut catalog = MessageCatalog::default();
        catalog.set_error_value_format(TemporalType::Date, "%d/%m/%Y");
        let date = TemporalValue::Date(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
        assert_eq!(format_error_value(&date, TemporalType::Date, &catalog), "31/01/2020");
    }

    #[test]
    fn test_unrenderable_override_falls_back() {
        let mut catalog = MessageCatalog::default();
        // A date has no hour to render.
        catalog.set_error_value_format(TemporalType::Date, "%H:%M");
        let date = TemporalValue::Date(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
        assert_eq!(format_error_value(&date, TemporalType::Date, &catalog), "2020-01-31");
    }
}
