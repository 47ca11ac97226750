use crate::core::parser::{self, Parsed};
use crate::domain::model::{RawValue, TemporalType, TemporalValue};
use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike,
};

/// Date that time values are placed on when widened to a date or datetime.
pub fn dummy_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// 將原始輸入轉換為正規化的時間值
///
/// One normalizer is built per validation call: whether the attribute is
/// timezone-aware depends on the record and attribute being validated.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    temporal_type: TemporalType,
    /// Zone applied when the attribute is timezone-aware.
    zone: Option<FixedOffset>,
    format: Option<&'a str>,
    ignore_usec: bool,
}

impl<'a> Normalizer<'a> {
    pub fn new(temporal_type: TemporalType) -> Self {
        Self {
            temporal_type,
            zone: None,
            format: None,
            ignore_usec: false,
        }
    }

    pub fn timezone_aware(mut self, zone: FixedOffset) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_format(mut self, format: Option<&'a str>) -> Self {
        self.format = format;
        self
    }

    pub fn ignore_usec(mut self, ignore_usec: bool) -> Self {
        self.ignore_usec = ignore_usec;
        self
    }

    pub fn temporal_type(&self) -> TemporalType {
        self.temporal_type
    }

    /// Parse then coerce; `None` means blank.
    pub fn normalize(&self, raw: &RawValue) -> Option<TemporalValue> {
        let value = if raw.is_text() || self.format.is_some() {
            self.parse(raw)
        } else {
            raw.clone()
        };
        self.type_cast(&value)
    }

    /// Parses text input. Unparsable text becomes `Nil`; non-text input is
    /// returned unchanged.
    pub fn parse(&self, raw: &RawValue) -> RawValue {
        let RawValue::Text(text) = raw else {
            return raw.clone();
        };

        let parsed = match parser::parse(text, self.temporal_type, self.format) {
            Some(parsed) => parsed,
            None => return RawValue::Nil,
        };

        let value = match parsed {
            Parsed::Date(d) => Some(TemporalValue::Date(d)),
            Parsed::Time(t) => Some(TemporalValue::Time(t)),
            Parsed::Naive(naive) => self.localize(naive).map(TemporalValue::Datetime),
            Parsed::Zoned(dt) => Some(TemporalValue::Datetime(dt)),
        };
        value.map_or(RawValue::Nil, RawValue::Temporal)
    }

    /// Coerces a typed value to the configured temporal type. Anything that
    /// is not a temporal value is blank.
    pub fn type_cast(&self, raw: &RawValue) -> Option<TemporalValue> {
        let RawValue::Temporal(value) = raw else {
            return None;
        };

        let value = match *value {
            TemporalValue::Datetime(dt) => TemporalValue::Datetime(self.in_zone(dt)),
            other => other,
        };

        let cast = match (self.temporal_type, value) {
            (TemporalType::Date, TemporalValue::Date(d)) => TemporalValue::Date(d),
            (TemporalType::Date, TemporalValue::Datetime(dt)) => TemporalValue::Date(dt.date_naive()),
            (TemporalType::Date, TemporalValue::Time(_)) => TemporalValue::Date(dummy_date()),
            (TemporalType::Time, TemporalValue::Time(t)) => TemporalValue::Time(t),
            (TemporalType::Time, TemporalValue::Datetime(dt)) => TemporalValue::Time(dt.time()),
            (TemporalType::Time, TemporalValue::Date(_)) => TemporalValue::Time(NaiveTime::MIN),
            (TemporalType::Datetime, TemporalValue::Datetime(dt)) => TemporalValue::Datetime(dt),
            (TemporalType::Datetime, TemporalValue::Date(d)) => {
                TemporalValue::Datetime(self.localize(d.and_time(NaiveTime::MIN))?)
            }
            (TemporalType::Datetime, TemporalValue::Time(t)) => {
                TemporalValue::Datetime(self.localize(dummy_date().and_time(t))?)
            }
        };

        Some(if self.ignore_usec { truncate_usec(cast) } else { cast })
    }

    /// Interprets a wall-clock datetime in the attribute's zone, or in the
    /// local zone when the attribute is not timezone-aware. Local times that
    /// do not exist (DST gaps) are blank.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self.zone {
            Some(zone) => zone.from_local_datetime(&naive).single(),
            None => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&dt.offset().fix())),
        }
    }

    /// Current instant in the zone this normalizer interprets datetimes in.
    pub fn current(&self, now: DateTime<chrono::Utc>) -> DateTime<FixedOffset> {
        self.in_zone(now)
    }

    /// Same instant, expressed in the attribute's zone or the local zone.
    fn in_zone<Tz: TimeZone>(&self, dt: DateTime<Tz>) -> DateTime<FixedOffset> {
        match self.zone {
            Some(zone) => dt.with_timezone(&zone),
            None => {
                let local = dt.with_timezone(&Local);
                local.with_timezone(&local.offset().fix())
            }
        }
    }
}

fn truncate_usec(value: TemporalValue) -> TemporalValue {
    match value {
        TemporalValue::Time(t) => TemporalValue::Time(t.with_nanosecond(0).unwrap_or(t)),
        TemporalValue::Datetime(dt) => TemporalValue::Datetime(dt.with_nanosecond(0).unwrap_or(dt)),
        date => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn test_text_is_parsed_for_type() {
        let normalizer = Normalizer::new(TemporalType::Date);
        assert_eq!(
            normalizer.normalize(&RawValue::from("2020-01-01")),
            Some(TemporalValue::Date(date(2020, 1, 1)))
        );
        assert_eq!(normalizer.normalize(&RawValue::from("not-a-date")), None);
        assert_eq!(normalizer.normalize(&RawValue::from("")), None);
        assert_eq!(normalizer.normalize(&RawValue::Nil), None);
        assert_eq!(normalizer.normalize(&RawValue::Other("42".to_string())), None);
    }

    #[test]
    fn test_datetime_narrowed_to_date_and_time() {
        let dt = offset(2).with_ymd_and_hms(2020, 5, 17, 23, 45, 10).unwrap();
        let raw = RawValue::from(dt);

        assert_eq!(
            Normalizer::new(TemporalType::Date).timezone_aware(offset(2)).normalize(&raw),
            Some(TemporalValue::Date(date(2020, 5, 17)))
        );
        assert_eq!(
            Normalizer::new(TemporalType::Time).timezone_aware(offset(2)).normalize(&raw),
            Some(TemporalValue::Time(NaiveTime::from_hms_opt(23, 45, 10).unwrap()))
        );
    }

    #[test]
    fn test_timezone_aware_conversion_changes_date() {
        let dt = offset(2).with_ymd_and_hms(2020, 5, 17, 23, 45, 10).unwrap();
        let normalizer = Normalizer::new(TemporalType::Date).timezone_aware(offset(8));
        assert_eq!(
            normalizer.normalize(&RawValue::from(dt)),
            Some(TemporalValue::Date(date(2020, 5, 18)))
        );
    }

    #[test]
    fn test_date_widened_to_midnight_in_zone() {
        let normalizer = Normalizer::new(TemporalType::Datetime).timezone_aware(offset(8));
        let expected = offset(8).with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            normalizer.normalize(&RawValue::from(date(2020, 1, 1))),
            Some(TemporalValue::Datetime(expected))
        );
        assert_eq!(
            normalizer.normalize(&RawValue::from("2020-01-01")),
            Some(TemporalValue::Datetime(expected))
        );
    }

    #[test]
    fn test_naive_text_uses_zone_when_aware() {
        let normalizer = Normalizer::new(TemporalType::Datetime).timezone_aware(offset(-5));
        let value = normalizer.normalize(&RawValue::from("2020-01-01 09:00:00")).unwrap();
        let expected = offset(-5).with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap();
        assert_eq!(value, TemporalValue::Datetime(expected));
    }

    #[test]
    fn test_time_widened_onto_dummy_date() {
        let normalizer = Normalizer::new(TemporalType::Datetime).timezone_aware(offset(0));
        let t = NaiveTime::from_hms_opt(6, 30, 0).unwrap();
        let expected = offset(0).with_ymd_and_hms(2000, 1, 1, 6, 30, 0).unwrap();
        assert_eq!(normalizer.normalize(&RawValue::from(t)), Some(TemporalValue::Datetime(expected)));
    }

    fn local(naive: NaiveDateTime) -> DateTime<FixedOffset> {
        let dt = Local.from_local_datetime(&naive).earliest().unwrap();
        dt.with_timezone(&dt.offset().fix())
    }

    /// 非時區感知的屬性一律以本地時區表示
    #[test]
    fn test_not_aware_datetimes_share_local_offset() {
        let normalizer = Normalizer::new(TemporalType::Datetime);
        let instant = offset(8).with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
        let expected = instant.with_timezone(&Local);
        let expected = expected.with_timezone(&expected.offset().fix());

        let zoned = normalizer.normalize(&RawValue::from("2020-01-01T10:00:00+08:00")).unwrap();
        assert_eq!(zoned, TemporalValue::Datetime(expected));
        assert_eq!(normalizer.normalize(&RawValue::from(instant)), Some(zoned));

        // the same wall clock reading, written without an offset, lands in the same zone
        let naive_text = expected.format("%Y-%m-%d %H:%M:%S").to_string();
        let naive = normalizer.normalize(&RawValue::from(naive_text)).unwrap();
        assert_eq!(naive, TemporalValue::Datetime(local(expected.naive_local())));
        assert_eq!(naive.compare(&zoned), Some(std::cmp::Ordering::Equal));
    }

    #[test]
    fn test_ignore_usec_truncates() {
        let normalizer = Normalizer::new(TemporalType::Time).ignore_usec(true);
        assert_eq!(
            normalizer.normalize(&RawValue::from("12:00:00.999")),
            Some(TemporalValue::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_explicit_format_passes_typed_values_through() {
        let normalizer = Normalizer::new(TemporalType::Date).with_format(Some("%d/%m/%Y"));
        assert_eq!(
            normalizer.normalize(&RawValue::from("31/12/2019")),
            Some(TemporalValue::Date(date(2019, 12, 31)))
        );
        assert_eq!(normalizer.normalize(&RawValue::from("2019-12-31")), None);
        assert_eq!(
            normalizer.normalize(&RawValue::from(date(2019, 12, 31))),
            Some(TemporalValue::Date(date(2019, 12, 31)))
        );
    }
}
