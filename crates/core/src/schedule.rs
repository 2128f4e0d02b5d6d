#![forbid(unsafe_code)]

//! Calendar arithmetic for routines and energy-budget day windows.
//!
//! Timestamps are integer milliseconds since the Unix epoch. Calendar math is
//! done in the owner's local frame by shifting with a fixed UTC offset in
//! minutes; the results are converted back to UTC before they are stored.

pub const MINUTE_MS: i64 = 60_000;
pub const DAY_MS: i64 = 86_400_000;

/// A calendar date without a time zone, as the owner sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateError {
    Format,
    OutOfRange,
}

impl CivilDate {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, DateError> {
        if !(1..=12).contains(&month) {
            return Err(DateError::OutOfRange);
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(DateError::OutOfRange);
        }
        Ok(Self { year, month, day })
    }

    /// Strict `YYYY-MM-DD` parse.
    pub fn parse(value: &str) -> Result<Self, DateError> {
        let bytes = value.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(DateError::Format);
        }
        let year = value[0..4].parse::<i32>().map_err(|_| DateError::Format)?;
        let month = value[5..7].parse::<u8>().map_err(|_| DateError::Format)?;
        let day = value[8..10].parse::<u8>().map_err(|_| DateError::Format)?;
        Self::new(year, month, day)
    }

    pub fn format(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Days since 1970-01-01.
    pub fn to_days(self) -> i64 {
        days_from_civil(self.year, self.month, self.day)
    }

    pub fn from_days(days: i64) -> Self {
        let (year, month, day) = civil_from_days(days);
        Self { year, month, day }
    }

    /// UTC instant range `[start, end)` covering this calendar day for an
    /// owner at the given UTC offset.
    pub fn day_window_ms(self, utc_offset_min: i64) -> (i64, i64) {
        let start = self.to_days() * DAY_MS - utc_offset_min * MINUTE_MS;
        (start, start + DAY_MS)
    }

    /// The calendar date a UTC instant falls on for an owner at the given
    /// UTC offset.
    pub fn of_ms(ts_ms: i64, utc_offset_min: i64) -> Self {
        Self::from_days((ts_ms + utc_offset_min * MINUTE_MS).div_euclid(DAY_MS))
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Weekday of a day number, Monday = 0 .. Sunday = 6.
pub fn weekday_mon0(days: i64) -> u8 {
    // 1970-01-01 was a Thursday.
    (days + 3).rem_euclid(7) as u8
}

fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(year) - if month <= 2 { 1 } else { 0 };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 {
        i64::from(month) - 3
    } else {
        i64::from(month) + 9
    };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i32, u8, u8) {
    let z = z + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = (y + if month <= 2 { 1 } else { 0 }) as i32;
    (year, month, day)
}

/// Recurrence rule for a routine. Canonical string forms:
/// `daily`, `weekdays`, `weekly:mon`..`weekly:sun`, `every:<n>d`,
/// `monthly:<day>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekdays,
    /// Monday = 0 .. Sunday = 6.
    Weekly {
        weekday: u8,
    },
    EveryNDays {
        n: u32,
    },
    /// Day of month 1..=31, clamped to the month's length.
    Monthly {
        day: u8,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecurrenceError {
    Unknown,
    BadWeekday,
    BadInterval,
    BadMonthDay,
}

const WEEKDAY_TOKENS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

impl Recurrence {
    pub fn parse(value: &str) -> Result<Self, RecurrenceError> {
        match value {
            "daily" => return Ok(Recurrence::Daily),
            "weekdays" => return Ok(Recurrence::Weekdays),
            _ => {}
        }
        if let Some(token) = value.strip_prefix("weekly:") {
            let weekday = WEEKDAY_TOKENS
                .iter()
                .position(|t| *t == token)
                .ok_or(RecurrenceError::BadWeekday)?;
            return Ok(Recurrence::Weekly {
                weekday: weekday as u8,
            });
        }
        if let Some(token) = value.strip_prefix("every:") {
            let digits = token.strip_suffix('d').ok_or(RecurrenceError::BadInterval)?;
            let n = digits
                .parse::<u32>()
                .map_err(|_| RecurrenceError::BadInterval)?;
            if n == 0 {
                return Err(RecurrenceError::BadInterval);
            }
            return Ok(Recurrence::EveryNDays { n });
        }
        if let Some(token) = value.strip_prefix("monthly:") {
            let day = token
                .parse::<u8>()
                .map_err(|_| RecurrenceError::BadMonthDay)?;
            if !(1..=31).contains(&day) {
                return Err(RecurrenceError::BadMonthDay);
            }
            return Ok(Recurrence::Monthly { day });
        }
        Err(RecurrenceError::Unknown)
    }

    pub fn as_string(self) -> String {
        match self {
            Recurrence::Daily => "daily".to_string(),
            Recurrence::Weekdays => "weekdays".to_string(),
            Recurrence::Weekly { weekday } => {
                format!("weekly:{}", WEEKDAY_TOKENS[usize::from(weekday) % 7])
            }
            Recurrence::EveryNDays { n } => format!("every:{n}d"),
            Recurrence::Monthly { day } => format!("monthly:{day}"),
        }
    }

    /// First occurrence strictly after `after_ms`, at `time_of_day_min`
    /// minutes past local midnight.
    pub fn next_occurrence(self, after_ms: i64, time_of_day_min: i64, utc_offset_min: i64) -> i64 {
        let local_after = after_ms + utc_offset_min * MINUTE_MS;
        let tod_ms = time_of_day_min * MINUTE_MS;
        let after_day = local_after.div_euclid(DAY_MS);

        let day = match self {
            Recurrence::Daily => {
                if after_day * DAY_MS + tod_ms > local_after {
                    after_day
                } else {
                    after_day + 1
                }
            }
            Recurrence::Weekdays => {
                next_day_matching(after_day, local_after, tod_ms, |d| weekday_mon0(d) < 5)
            }
            Recurrence::Weekly { weekday } => {
                next_day_matching(after_day, local_after, tod_ms, |d| {
                    weekday_mon0(d) == weekday % 7
                })
            }
            Recurrence::EveryNDays { n } => after_day + i64::from(n),
            Recurrence::Monthly { day } => next_monthly_day(after_day, local_after, tod_ms, day),
        };

        day * DAY_MS + tod_ms - utc_offset_min * MINUTE_MS
    }
}

fn next_day_matching(
    after_day: i64,
    local_after: i64,
    tod_ms: i64,
    matches: impl Fn(i64) -> bool,
) -> i64 {
    for day in after_day..=after_day + 7 {
        if matches(day) && day * DAY_MS + tod_ms > local_after {
            return day;
        }
    }
    // Unreachable: every rule above matches at least once per 7 days.
    after_day + 7
}

fn next_monthly_day(after_day: i64, local_after: i64, tod_ms: i64, day_of_month: u8) -> i64 {
    let start = CivilDate::from_days(after_day);
    let mut year = start.year;
    let mut month = start.month;
    for _ in 0..14 {
        let day = day_of_month.min(days_in_month(year, month));
        let candidate = CivilDate { year, month, day }.to_days();
        if candidate * DAY_MS + tod_ms > local_after {
            return candidate;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    after_day + 31
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(date: &str, hour: i64, minute: i64) -> i64 {
        CivilDate::parse(date).expect("date").to_days() * DAY_MS
            + hour * 60 * MINUTE_MS
            + minute * MINUTE_MS
    }

    #[test]
    fn civil_round_trip() {
        for raw in ["1970-01-01", "1999-12-31", "2024-02-29", "2026-08-07"] {
            let date = CivilDate::parse(raw).expect("parse");
            assert_eq!(CivilDate::from_days(date.to_days()), date);
            assert_eq!(date.format(), raw);
        }
    }

    #[test]
    fn parse_rejects_bad_dates() {
        assert_eq!(CivilDate::parse("2026-13-01"), Err(DateError::OutOfRange));
        assert_eq!(CivilDate::parse("2025-02-29"), Err(DateError::OutOfRange));
        assert_eq!(CivilDate::parse("2026/08/07"), Err(DateError::Format));
        assert_eq!(CivilDate::parse("26-08-07"), Err(DateError::Format));
    }

    #[test]
    fn weekday_known_anchors() {
        // 1970-01-01 Thursday, 2026-08-07 Friday.
        assert_eq!(weekday_mon0(0), 3);
        let friday = CivilDate::parse("2026-08-07").expect("date").to_days();
        assert_eq!(weekday_mon0(friday), 4);
    }

    #[test]
    fn day_window_respects_offset() {
        let date = CivilDate::parse("2026-08-07").expect("date");
        let (start_utc, end_utc) = date.day_window_ms(0);
        assert_eq!(end_utc - start_utc, DAY_MS);
        // UTC+120min: local midnight is two hours earlier in UTC.
        let (start_east, _) = date.day_window_ms(120);
        assert_eq!(start_utc - start_east, 120 * MINUTE_MS);
    }

    #[test]
    fn recurrence_string_round_trip() {
        for rule in [
            Recurrence::Daily,
            Recurrence::Weekdays,
            Recurrence::Weekly { weekday: 2 },
            Recurrence::EveryNDays { n: 3 },
            Recurrence::Monthly { day: 31 },
        ] {
            assert_eq!(Recurrence::parse(&rule.as_string()), Ok(rule));
        }
        assert_eq!(Recurrence::parse("hourly"), Err(RecurrenceError::Unknown));
        assert_eq!(
            Recurrence::parse("every:0d"),
            Err(RecurrenceError::BadInterval)
        );
        assert_eq!(
            Recurrence::parse("weekly:monday"),
            Err(RecurrenceError::BadWeekday)
        );
    }

    #[test]
    fn daily_next_occurrence() {
        // 09:00 slot, asked at 08:00: same day. Asked at 10:00: next day.
        let at_8 = ms("2026-08-07", 8, 0);
        let at_10 = ms("2026-08-07", 10, 0);
        let nine = Recurrence::Daily.next_occurrence(at_8, 9 * 60, 0);
        assert_eq!(nine, ms("2026-08-07", 9, 0));
        let next = Recurrence::Daily.next_occurrence(at_10, 9 * 60, 0);
        assert_eq!(next, ms("2026-08-08", 9, 0));
    }

    #[test]
    fn daily_is_strictly_after() {
        let at_9 = ms("2026-08-07", 9, 0);
        let next = Recurrence::Daily.next_occurrence(at_9, 9 * 60, 0);
        assert_eq!(next, ms("2026-08-08", 9, 0));
    }

    #[test]
    fn weekdays_skip_weekend() {
        // 2026-08-07 is a Friday; after its slot the next weekday is Monday.
        let friday_noon = ms("2026-08-07", 12, 0);
        let next = Recurrence::Weekdays.next_occurrence(friday_noon, 9 * 60, 0);
        assert_eq!(next, ms("2026-08-10", 9, 0));
    }

    #[test]
    fn weekly_targets_one_weekday() {
        // Next Wednesday after Friday 2026-08-07 is 2026-08-12.
        let friday = ms("2026-08-07", 12, 0);
        let next = Recurrence::Weekly { weekday: 2 }.next_occurrence(friday, 7 * 60, 0);
        assert_eq!(next, ms("2026-08-12", 7, 0));
    }

    #[test]
    fn every_n_days_steps_from_previous_occurrence() {
        let occurrence = ms("2026-08-07", 9, 0);
        let next = Recurrence::EveryNDays { n: 3 }.next_occurrence(occurrence, 9 * 60, 0);
        assert_eq!(next, ms("2026-08-10", 9, 0));
    }

    #[test]
    fn monthly_clamps_short_months() {
        // 31st scheduled; February yields the 28th (2027 is not a leap year).
        let jan_31 = ms("2027-01-31", 9, 0);
        let next = Recurrence::Monthly { day: 31 }.next_occurrence(jan_31, 9 * 60, 0);
        assert_eq!(next, ms("2027-02-28", 9, 0));
    }

    #[test]
    fn next_occurrence_converts_offset_back_to_utc() {
        // Owner at UTC+60: a 09:00 local slot is 08:00 UTC.
        let at_7_utc = ms("2026-08-07", 7, 0);
        let next = Recurrence::Daily.next_occurrence(at_7_utc, 9 * 60, 60);
        assert_eq!(next, ms("2026-08-07", 8, 0));
    }
}
