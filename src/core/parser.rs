use crate::domain::model::TemporalType;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p", "%I:%M%p"];

const ZONED_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// 解析結果，尚未套用時區
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed {
    Date(NaiveDate),
    Time(NaiveTime),
    /// Date and time without an offset; the caller decides the zone.
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

/// Parses `text` for `temporal_type`.
///
/// Without an explicit format the formats of the requested type are tried
/// first, then the other types' formats, so a datetime string still yields a
/// date for a date attribute. With an explicit format only that pattern is
/// used.
pub fn parse(text: &str, temporal_type: TemporalType, format: Option<&str>) -> Option<Parsed> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(format) = format {
        return parse_with_format(text, temporal_type, format);
    }

    match temporal_type {
        TemporalType::Date => parse_date(text).or_else(|| parse_datetime(text)),
        TemporalType::Time => parse_time(text).or_else(|| parse_datetime(text)),
        TemporalType::Datetime => parse_datetime(text).or_else(|| parse_date(text)),
    }
}

fn parse_with_format(text: &str, temporal_type: TemporalType, format: &str) -> Option<Parsed> {
    match temporal_type {
        TemporalType::Date => NaiveDate::parse_from_str(text, format).ok().map(Parsed::Date),
        TemporalType::Time => NaiveTime::parse_from_str(text, format).ok().map(Parsed::Time),
        TemporalType::Datetime => DateTime::parse_from_str(text, format)
            .ok()
            .map(Parsed::Zoned)
            .or_else(|| NaiveDateTime::parse_from_str(text, format).ok().map(Parsed::Naive))
            .or_else(|| NaiveDate::parse_from_str(text, format).ok().map(Parsed::Date)),
    }
}

fn parse_date(text: &str) -> Option<Parsed> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .map(Parsed::Date)
}

fn parse_time(text: &str) -> Option<Parsed> {
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(text, f).ok())
        .map(Parsed::Time)
}

fn parse_datetime(text: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Parsed::Zoned(dt));
    }
    if let Some(dt) = ZONED_DATETIME_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(text, f).ok())
    {
        return Some(Parsed::Zoned(dt));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(Parsed::Naive)
}
