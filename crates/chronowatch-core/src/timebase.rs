//! Wall-clock breakdown and readout formatting.

use crate::text::{DateText, TimeText};

const SECS_PER_DAY: i64 = 86_400;
/// The chronometer readout shows two hour digits and wraps after 99:59:59.
const CHRONO_HOUR_WRAP: u32 = 100;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Wall-clock time broken into calendar fields (UTC-agnostic local time).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CivilTime {
    pub year: i32,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CivilTime {
    /// Breaks seconds since 1970-01-01T00:00:00 into calendar fields.
    pub fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(SECS_PER_DAY);
        let time_of_day = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        Self {
            year,
            month,
            day,
            // 1970-01-01 was a Thursday.
            weekday: (days + 4).rem_euclid(7) as u8,
            hour: (time_of_day / 3_600) as u8,
            minute: ((time_of_day % 3_600) / 60) as u8,
            second: (time_of_day % 60) as u8,
        }
    }

    pub fn weekday_name(&self) -> &'static str {
        WEEKDAYS[(self.weekday % 7) as usize]
    }

    pub fn month_name(&self) -> &'static str {
        MONTHS[(self.month.clamp(1, 12) - 1) as usize]
    }
}

// Howard Hinnant's civil_from_days.
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month as u8, day as u8)
}

/// Hours, minutes and seconds of an elapsed count, hours already wrapped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Hms {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Hms {
    pub const fn from_elapsed(elapsed_secs: u32) -> Self {
        let real_hours = elapsed_secs / 3_600;
        Self {
            hours: real_hours % CHRONO_HOUR_WRAP,
            minutes: (elapsed_secs % 3_600) / 60,
            seconds: elapsed_secs % 60,
        }
    }
}

/// Chronometer readout: space-padded two-digit hours, `" 0:00:00"`.
pub fn chrono_text(elapsed_secs: u32) -> TimeText {
    let hms = Hms::from_elapsed(elapsed_secs);
    TimeText::from_fmt(format_args!(
        "{:>2}:{:02}:{:02}",
        hms.hours, hms.minutes, hms.seconds
    ))
}

/// Wall-clock readout. Without the 24-hour preference hours past noon drop
/// by twelve; midnight reads as `0`.
pub fn clock_text(now: &CivilTime, clock_24h: bool) -> TimeText {
    let hour = if !clock_24h && now.hour > 12 {
        now.hour - 12
    } else {
        now.hour
    };
    TimeText::from_fmt(format_args!("{}:{:02}:{:02}", hour, now.minute, now.second))
}

/// Date line shown under the clock, `"Wed Sep 30"`.
pub fn date_text(now: &CivilTime) -> DateText {
    DateText::from_fmt(format_args!(
        "{} {} {}",
        now.weekday_name(),
        now.month_name(),
        now.day
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_a_thursday_at_midnight() {
        let t = CivilTime::from_unix(0);
        assert_eq!((t.year, t.month, t.day), (1970, 1, 1));
        assert_eq!(t.weekday_name(), "Thu");
        assert_eq!((t.hour, t.minute, t.second), (0, 0, 0));
    }

    #[test]
    fn leap_day_is_resolved() {
        // 2024-02-29T13:45:30Z
        let t = CivilTime::from_unix(1_709_214_330);
        assert_eq!((t.year, t.month, t.day), (2024, 2, 29));
        assert_eq!((t.hour, t.minute, t.second), (13, 45, 30));
        assert_eq!(t.weekday_name(), "Thu");
    }

    #[test]
    fn times_before_epoch_floor_toward_previous_day() {
        let t = CivilTime::from_unix(-1);
        assert_eq!((t.year, t.month, t.day), (1969, 12, 31));
        assert_eq!((t.hour, t.minute, t.second), (23, 59, 59));
        assert_eq!(t.weekday_name(), "Wed");
    }

    #[test]
    fn chrono_readout_pads_hours_and_wraps_after_99() {
        assert_eq!(chrono_text(0), " 0:00:00");
        assert_eq!(chrono_text(3_661), " 1:01:01");
        assert_eq!(chrono_text(99 * 3_600 + 59 * 60 + 59), "99:59:59");
        assert_eq!(chrono_text(100 * 3_600), " 0:00:00");
        assert_eq!(chrono_text(123 * 3_600 + 5), "23:00:05");
    }

    #[test]
    fn clock_readout_uses_twelve_hour_form_by_default() {
        let afternoon = CivilTime::from_unix(13 * 3_600 + 5 * 60 + 9);
        assert_eq!(clock_text(&afternoon, false), "1:05:09");
        assert_eq!(clock_text(&afternoon, true), "13:05:09");

        let noon = CivilTime::from_unix(12 * 3_600);
        assert_eq!(clock_text(&noon, false), "12:00:00");

        let midnight = CivilTime::from_unix(0);
        assert_eq!(clock_text(&midnight, false), "0:00:00");
    }

    #[test]
    fn date_line_names_weekday_month_and_day() {
        // 2020-09-30 was a Wednesday.
        let t = CivilTime::from_unix(1_601_467_200);
        assert_eq!(date_text(&t), "Wed Sep 30");
    }
}
