#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{Result, TimelinessError};
use chrono::{FixedOffset, Offset, Utc};
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// 全域設定，由嵌入的應用程式共享
///
/// `ignore_restriction_errors` is read on every validation call, so toggling it
/// affects validators that were already built.
#[derive(Debug)]
pub struct Settings {
    ignore_restriction_errors: AtomicBool,
    time_zone: FixedOffset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore_restriction_errors: AtomicBool::new(false),
            time_zone: utc(),
        }
    }
}

impl Settings {
    pub fn new(time_zone: FixedOffset, ignore_restriction_errors: bool) -> Self {
        Self {
            ignore_restriction_errors: AtomicBool::new(ignore_restriction_errors),
            time_zone,
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn ignore_restriction_errors(&self) -> bool {
        self.ignore_restriction_errors.load(Ordering::Relaxed)
    }

    pub fn set_ignore_restriction_errors(&self, ignore: bool) {
        self.ignore_restriction_errors.store(ignore, Ordering::Relaxed);
    }

    /// Zone applied to timezone-aware attributes and to `today`.
    pub fn time_zone(&self) -> FixedOffset {
        self.time_zone
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+-])(\d{2}):?(\d{2})$").unwrap()
    })
}

/// 解析時區設定，例如 `UTC`、`Z`、`+08:00` 或 `-0530`
pub fn parse_time_zone(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return Ok(utc());
    }

    let invalid = |reason: &str| TimelinessError::InvalidConfigValueError {
        field: "settings.time_zone".to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let caps = offset_pattern()
        .captures(value)
        .ok_or_else(|| invalid("Expected UTC or an offset like +08:00"))?;
    let hours: i32 = caps[2].parse().map_err(|_| invalid("Invalid hours"))?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid("Invalid minutes"))?;
    if minutes >= 60 {
        return Err(invalid("Minutes must be below 60"));
    }

    let seconds = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(|| invalid("Offset out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_zone() {
        assert_eq!(parse_time_zone("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_time_zone("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_time_zone("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_time_zone("-0530").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert!(parse_time_zone("Europe/Paris").is_err());
        assert!(parse_time_zone("+08:75").is_err());
        assert!(parse_time_zone("+25:00").is_err());
    }

    #[test]
    fn test_ignore_switch_is_shared() {
        let settings = Settings::default().shared();
        let handle = Arc::clone(&settings);
        assert!(!settings.ignore_restriction_errors());
        handle.set_ignore_restriction_errors(true);
        assert!(settings.ignore_restriction_errors());
    }
}
