//! Time Source - wall clock and timezone reduced to dial fields
//!
//! Provides the calendar snapshot taken once per draw and the clock
//! abstraction the engine reads "now" from.

use std::cell::Cell;

use chrono::{DateTime, Local, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::ConfigError;

/// Dial fields for a single draw call
///
/// Built fresh for every frame and dropped afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSnapshot {
    /// Hour on the dial (0-11)
    pub hour: u32,
    /// Minute (0-59)
    pub minute: u32,
    /// Second (0-59)
    pub second: u32,
    /// Timezone the fields were computed in
    pub timezone: Tz,
}

impl CalendarSnapshot {
    /// Hour as printed on the numeral badge (1-12, midnight and noon are 12)
    pub fn display_hour(&self) -> u32 {
        match self.hour {
            0 => 12,
            h => h,
        }
    }

    /// Format the time as "h:mm:ss"
    pub fn format_time(&self) -> String {
        format!(
            "{}:{:02}:{:02}",
            self.display_hour(),
            self.minute,
            self.second
        )
    }
}

/// Compute the snapshot for a given timezone at a specific instant
pub fn snapshot_at(tz: Tz, now_utc: DateTime<Utc>) -> CalendarSnapshot {
    let local = now_utc.with_timezone(&tz);

    CalendarSnapshot {
        hour: local.hour() % 12,
        minute: local.minute(),
        // Leap seconds surface as 60 in chrono; clamp onto the dial
        second: local.second().min(59),
        timezone: tz,
    }
}

/// Source of the current instant
///
/// The engine never calls `Utc::now()` directly so hosts and tests can drive
/// it with their own clock.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// The zone the host system is set to right now
    fn system_timezone(&self) -> Option<Tz> {
        system_timezone()
    }
}

/// The real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Useful for hosts that replay recorded sessions and for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    zone: Cell<Option<Tz>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
            zone: Cell::new(None),
        }
    }

    /// Zone reported as the system zone; `None` until set
    pub fn set_system_timezone(&self, zone: Option<Tz>) {
        self.zone.set(zone);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now
            .set(self.now.get() + chrono::Duration::milliseconds(millis));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn system_timezone(&self) -> Option<Tz> {
        self.zone.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }

    fn system_timezone(&self) -> Option<Tz> {
        (**self).system_timezone()
    }
}

/// Get the system's local timezone as a chrono-tz Tz
pub fn system_timezone() -> Option<Tz> {
    // `TZ` carries an IANA name on most unix hosts
    if let Ok(name) = std::env::var("TZ") {
        if let Ok(tz) = name.trim_start_matches(':').parse::<Tz>() {
            return Some(tz);
        }
    }

    // Abbreviations like "UTC" occasionally parse; anything else falls through
    Local::now().format("%Z").to_string().parse::<Tz>().ok()
}

/// Parse a timezone string into a Tz
pub fn parse_timezone(tz_str: &str) -> Result<Tz, ConfigError> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(tz_str.to_string()))
}

/// Parse a configured zone name, warning about and dropping a bad one
pub fn configured_timezone(configured: Option<&str>) -> Option<Tz> {
    configured.and_then(|name| match parse_timezone(name) {
        Ok(tz) => Some(tz),
        Err(e) => {
            tracing::warn!(%e, "ignoring configured timezone");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_folds_hour_onto_dial() {
        let tz: Tz = "UTC".parse().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 15, 42, 7).unwrap();
        let snap = snapshot_at(tz, at);
        assert_eq!(snap.hour, 3);
        assert_eq!(snap.minute, 42);
        assert_eq!(snap.second, 7);
        assert_eq!(snap.format_time(), "3:42:07");
    }

    #[test]
    fn test_snapshot_respects_timezone() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap();
        let snap = snapshot_at(tz, at);
        assert_eq!(snap.hour, 9);
        assert_eq!(snap.minute, 30);
        assert_eq!(snap.timezone, tz);
    }

    #[test]
    fn test_display_hour_midnight_and_noon() {
        let tz: Tz = "UTC".parse().unwrap();
        let midnight = snapshot_at(tz, Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap());
        let noon = snapshot_at(tz, Utc.with_ymd_and_hms(2024, 1, 1, 12, 5, 0).unwrap());
        assert_eq!(midnight.hour, 0);
        assert_eq!(midnight.display_hour(), 12);
        assert_eq!(noon.display_hour(), 12);
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance_millis(1500);
        assert_eq!(clock.now_millis(), start.timestamp_millis() + 1500);
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Europe/London").is_ok());
        assert!(matches!(
            parse_timezone("Not/AZone"),
            Err(ConfigError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_manual_clock_reports_its_system_zone() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(clock.system_timezone(), None);
        clock.set_system_timezone(Some(Tz::Europe__London));
        assert_eq!((&clock).system_timezone(), Some(Tz::Europe__London));
    }

    #[test]
    fn test_bad_configured_zone_is_dropped() {
        assert_eq!(configured_timezone(Some("Not/AZone")), None);
        assert_eq!(configured_timezone(None), None);
        assert_eq!(configured_timezone(Some("Asia/Tokyo")), Some(Tz::Asia__Tokyo));
    }
}
