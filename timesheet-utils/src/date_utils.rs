use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::*;

use time::macros::format_description;
use time::{Date, Duration, Weekday};

#[derive(Debug, Error)]
pub enum TimesheetDateUtilsError {
    #[error("Unparseable date: {0:?}")]
    Unparseable(Arc<str>),

    #[error("Week must start on a Saturday, got {0}")]
    NotASaturday(Date),
}

/// Day of the business week.
///
/// The business week starts on Saturday, so [`DayOfWeek::week_offset`] is 0 for
/// Saturday and 6 for Friday.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => Self::Monday,
            Weekday::Tuesday => Self::Tuesday,
            Weekday::Wednesday => Self::Wednesday,
            Weekday::Thursday => Self::Thursday,
            Weekday::Friday => Self::Friday,
            Weekday::Saturday => Self::Saturday,
            Weekday::Sunday => Self::Sunday,
        }
    }
}
impl From<DayOfWeek> for Weekday {
    fn from(day_of_week: DayOfWeek) -> Self {
        match day_of_week {
            DayOfWeek::Monday => Self::Monday,
            DayOfWeek::Tuesday => Self::Tuesday,
            DayOfWeek::Wednesday => Self::Wednesday,
            DayOfWeek::Thursday => Self::Thursday,
            DayOfWeek::Friday => Self::Friday,
            DayOfWeek::Saturday => Self::Saturday,
            DayOfWeek::Sunday => Self::Sunday,
        }
    }
}

impl Display for DayOfWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DayOfWeek::Monday => "Monday",
                DayOfWeek::Tuesday => "Tuesday",
                DayOfWeek::Wednesday => "Wednesday",
                DayOfWeek::Thursday => "Thursday",
                DayOfWeek::Friday => "Friday",
                DayOfWeek::Saturday => "Saturday",
                DayOfWeek::Sunday => "Sunday",
            }
        )
    }
}

impl DayOfWeek {
    pub fn week_offset(&self) -> u8 {
        match self {
            DayOfWeek::Saturday => 0,
            DayOfWeek::Sunday => 1,
            DayOfWeek::Monday => 2,
            DayOfWeek::Tuesday => 3,
            DayOfWeek::Wednesday => 4,
            DayOfWeek::Thursday => 5,
            DayOfWeek::Friday => 6,
        }
    }

    pub fn from_week_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(DayOfWeek::Saturday),
            1 => Some(DayOfWeek::Sunday),
            2 => Some(DayOfWeek::Monday),
            3 => Some(DayOfWeek::Tuesday),
            4 => Some(DayOfWeek::Wednesday),
            5 => Some(DayOfWeek::Thursday),
            6 => Some(DayOfWeek::Friday),
            _ => None,
        }
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }
}

/// The Saturday on or before `date`.
pub fn anchor_saturday(date: Date) -> Date {
    let offset = DayOfWeek::from(date.weekday()).week_offset();
    date.saturating_sub(Duration::days(offset as i64))
}

/// Parses the leading `YYYY-MM-DD` of a backend date string.
///
/// Anything after the calendar part (`T00:00:00Z`, ` 18:30:00+05:30`) is
/// ignored, so the date never shifts by a day through a time zone conversion.
pub fn parse_calendar_date(raw: &str) -> Result<Date, TimesheetDateUtilsError> {
    let unparseable = || TimesheetDateUtilsError::Unparseable(raw.into());
    let trimmed = raw.trim();
    let (calendar_part, rest) = match (trimmed.get(..10), trimmed.get(10..)) {
        (Some(part), Some(rest)) => (part, rest),
        _ => return Err(unparseable()),
    };
    if !matches!(rest.chars().next(), None | Some('T' | 't' | ' ')) {
        return Err(unparseable());
    }
    Date::parse(calendar_part, format_description!("[year]-[month]-[day]")).map_err(|_| unparseable())
}

/// `2024-06-01`
pub fn format_iso_date(date: Date) -> String {
    date
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// `Jun 01, 2024`
pub fn format_display_date(date: Date) -> String {
    date.format(format_description!("[month repr:short] [day], [year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// A Saturday-to-Friday business week, identified by its Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimesheetWeek {
    start: Date,
}

impl TimesheetWeek {
    pub fn containing(date: Date) -> Self {
        Self {
            start: anchor_saturday(date),
        }
    }

    pub fn starting(start: Date) -> Result<Self, TimesheetDateUtilsError> {
        if start.weekday() != Weekday::Saturday {
            return Err(TimesheetDateUtilsError::NotASaturday(start));
        }
        Ok(Self { start })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.start.saturating_add(Duration::days(6))
    }

    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && date <= self.end()
    }

    /// Day offset inside the week, 0 for Saturday to 6 for Friday.
    pub fn offset_of(&self, date: Date) -> Option<u8> {
        if self.contains(date) {
            Some((date - self.start).whole_days() as u8)
        } else {
            None
        }
    }

    pub fn days(&self) -> [Date; 7] {
        std::array::from_fn(|offset| self.start.saturating_add(Duration::days(offset as i64)))
    }

    pub fn iter_until(&self, end: &Self) -> TimesheetWeekIterator {
        TimesheetWeekIterator::new(*self, *end)
    }
}

impl From<Date> for TimesheetWeek {
    fn from(date: Date) -> Self {
        TimesheetWeek::containing(date)
    }
}

impl Display for TimesheetWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            format_display_date(self.start),
            format_display_date(self.end())
        )
    }
}

pub struct TimesheetWeekIterator {
    current: Option<TimesheetWeek>,
    end: TimesheetWeek,
}

impl TimesheetWeekIterator {
    pub fn new(start: TimesheetWeek, end: TimesheetWeek) -> Self {
        Self {
            current: Some(start),
            end,
        }
    }
}

impl Iterator for TimesheetWeekIterator {
    type Item = TimesheetWeek;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.filter(|current| *current <= self.end)?;
        self.current = current
            .start
            .checked_add(Duration::days(7))
            .map(|start| TimesheetWeek { start });
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::date;

    #[test]
    fn test_anchor_saturday() {
        assert_eq!(anchor_saturday(date!(2024 - 06 - 03)), date!(2024 - 06 - 01));
        assert_eq!(anchor_saturday(date!(2024 - 06 - 07)), date!(2024 - 06 - 01));
        assert_eq!(anchor_saturday(date!(2024 - 06 - 01)), date!(2024 - 06 - 01));
        assert_eq!(anchor_saturday(date!(2024 - 06 - 08)), date!(2024 - 06 - 08));
        assert_eq!(anchor_saturday(date!(2024 - 01 - 02)), date!(2023 - 12 - 30));
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2024-06-03").unwrap(),
            date!(2024 - 06 - 03)
        );
        assert_eq!(
            parse_calendar_date("2024-06-03T00:00:00.000Z").unwrap(),
            date!(2024 - 06 - 03)
        );
        assert_eq!(
            parse_calendar_date("2024-06-03T23:30:00-11:00").unwrap(),
            date!(2024 - 06 - 03)
        );
        assert_eq!(
            parse_calendar_date(" 2024-06-03 18:30:00+05:30").unwrap(),
            date!(2024 - 06 - 03)
        );
    }

    #[test]
    fn test_parse_calendar_date_rejects_garbage() {
        for raw in [
            "",
            "yesterday",
            "2024-6-3",
            "03/06/2024",
            "2024-13-01",
            "2024-02-30",
            "2024-06-03X",
            "+024-06-03",
        ] {
            assert!(
                parse_calendar_date(raw).is_err(),
                "Expected {:?} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_iso_date(date!(2024 - 06 - 01)), "2024-06-01");
        assert_eq!(format_display_date(date!(2024 - 06 - 01)), "Jun 01, 2024");
        assert_eq!(
            TimesheetWeek::containing(date!(2024 - 06 - 05)).to_string(),
            "Jun 01, 2024 - Jun 07, 2024"
        );
    }

    #[test]
    fn test_dates_across_boundaries() {
        assert_eq!(
            parse_calendar_date("2024-02-29").unwrap(),
            date!(2024 - 02 - 29)
        );
        assert!(parse_calendar_date("2023-02-29").is_err());
        assert_eq!(format_display_date(date!(2023 - 12 - 30)), "Dec 30, 2023");
        assert_eq!(format_iso_date(date!(0987 - 01 - 05)), "0987-01-05");
    }

    #[test]
    fn test_week_starting_requires_saturday() {
        assert!(TimesheetWeek::starting(date!(2024 - 06 - 01)).is_ok());
        match TimesheetWeek::starting(date!(2024 - 06 - 02)) {
            Err(TimesheetDateUtilsError::NotASaturday(d)) => assert_eq!(d, date!(2024 - 06 - 02)),
            _ => panic!("Expected NotASaturday"),
        }
    }

    #[test]
    fn test_week_offsets() {
        let week = TimesheetWeek::containing(date!(2024 - 06 - 04));
        assert_eq!(week.end(), date!(2024 - 06 - 07));
        assert_eq!(week.offset_of(date!(2024 - 06 - 01)), Some(0));
        assert_eq!(week.offset_of(date!(2024 - 06 - 07)), Some(6));
        assert_eq!(week.offset_of(date!(2024 - 06 - 08)), None);
        assert_eq!(week.days()[2], date!(2024 - 06 - 03));
        assert_eq!(week.days()[6], date!(2024 - 06 - 07));
        for (offset, day) in week.days().iter().enumerate() {
            assert_eq!(
                DayOfWeek::from(day.weekday()).week_offset() as usize,
                offset
            );
        }
    }

    #[test]
    fn test_week_iterator() {
        let first = TimesheetWeek::containing(date!(2023 - 12 - 20));
        let last = TimesheetWeek::containing(date!(2024 - 01 - 10));
        let weeks: Vec<Date> = first.iter_until(&last).map(|w| w.start()).collect();
        assert_eq!(
            weeks,
            vec![
                date!(2023 - 12 - 16),
                date!(2023 - 12 - 23),
                date!(2023 - 12 - 30),
                date!(2024 - 01 - 06),
            ]
        );
        assert_eq!(last.iter_until(&first).count(), 0);
    }

    #[test]
    fn test_day_of_week_offsets_round_trip() {
        for offset in 0..7 {
            let day = DayOfWeek::from_week_offset(offset).unwrap();
            assert_eq!(day.week_offset(), offset);
        }
        assert_eq!(DayOfWeek::from_week_offset(7), None);
        assert!(DayOfWeek::Saturday.is_weekend());
        assert!(DayOfWeek::Sunday.is_weekend());
        assert!(!DayOfWeek::Friday.is_weekend());
    }

    proptest! {
        #[test]
        fn anchor_is_a_saturday_within_the_last_seven_days(julian in 2_000_000i32..2_600_000i32) {
            let date = Date::from_julian_day(julian).unwrap();
            let anchor = anchor_saturday(date);
            prop_assert_eq!(anchor.weekday(), Weekday::Saturday);
            prop_assert!(anchor <= date);
            prop_assert!(date < anchor + Duration::days(7));
        }

        #[test]
        fn iso_format_parses_back(julian in 2_000_000i32..2_600_000i32) {
            let date = Date::from_julian_day(julian).unwrap();
            prop_assert_eq!(parse_calendar_date(&format_iso_date(date)).unwrap(), date);
        }
    }
}
