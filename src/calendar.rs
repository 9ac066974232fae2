//! Calendar arithmetic for the month grid.
//!
//! chrono only covers a limited range of years, so dates are reduced into a
//! single 400 year Gregorian cycle before they are handed to it. A cycle is
//! exactly 146097 days (20871 weeks), which keeps weekdays and leap days
//! unchanged, so everything here holds for any `i32` year and never panics.

use chrono::{Datelike, Duration, Local, Month, NaiveDate};
use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};
use num_traits::FromPrimitive;
use serde::Deserialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

const YEARS_PER_CYCLE: i64 = 400;
const DAYS_PER_CYCLE: i64 = 146_097;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: Month) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// Weekday of the first day of `month`, 0 = Sunday .. 6 = Saturday.
pub fn first_weekday_offset(year: i32, month: Month) -> u32 {
    cycle_date(year, month, 1)
        .map(|(_, date)| date.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn month0(month: Month) -> u32 {
    month.number_from_month() - 1
}

pub fn month_from0(index: u32) -> Option<Month> {
    Month::from_u32(index + 1)
}

/// Splits `year` into its 400 year cycle and the matching year in `0..400`.
fn split_cycle(year: i64) -> (i64, i32) {
    (
        year.div_euclid(YEARS_PER_CYCLE),
        year.rem_euclid(YEARS_PER_CYCLE) as i32,
    )
}

fn cycle_date(year: i32, month: Month, day: u32) -> Option<(i64, NaiveDate)> {
    let (cycle, year_of_cycle) = split_cycle(year as i64);
    NaiveDate::from_ymd_opt(year_of_cycle, month.number_from_month(), day)
        .map(|date| (cycle, date))
}

/// Identifies a single calendar day.
///
/// The key packs `(year, month0, day)` as `year * 512 + month0 * 32 + day`.
/// Month indices stay below 16 and days below 32, so distinct dates can never
/// share a key, and comparing keys compares dates chronologically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct DateKey(i64);

impl DateKey {
    const MONTH_FACTOR: i64 = 32;
    const YEAR_FACTOR: i64 = 512;

    pub fn new(year: i32, month: Month, day: u32) -> Option<Self> {
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }

        Some(DateKey(
            year as i64 * Self::YEAR_FACTOR
                + month0(month) as i64 * Self::MONTH_FACTOR
                + day as i64,
        ))
    }

    pub fn today() -> Self {
        DateKey::from(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.div_euclid(Self::YEAR_FACTOR) as i32
    }

    pub fn month0(&self) -> u32 {
        (self.0.rem_euclid(Self::YEAR_FACTOR) / Self::MONTH_FACTOR) as u32
    }

    pub fn month(&self) -> Month {
        month_from0(self.month0()).unwrap_or(Month::January)
    }

    pub fn day(&self) -> u32 {
        (self.0.rem_euclid(Self::MONTH_FACTOR)) as u32
    }

    pub fn period(&self) -> Period {
        Period::new(self.year(), self.month())
    }

    /// 0 = Sunday .. 6 = Saturday
    pub fn weekday(&self) -> u32 {
        self.cycle_date()
            .map(|(_, date)| date.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    /// Stays on `self` when the result would leave the `i32` year range.
    pub fn add_days(&self, days: i64) -> Self {
        self.checked_add_days(days).unwrap_or(*self)
    }

    fn checked_add_days(&self, days: i64) -> Option<Self> {
        let (cycle, date) = self.cycle_date()?;
        let shifted = date.checked_add_signed(Duration::days(days.rem_euclid(DAYS_PER_CYCLE)))?;
        let (carry, year_of_cycle) = split_cycle(shifted.year() as i64);

        let cycles = cycle
            .checked_add(days.div_euclid(DAYS_PER_CYCLE))?
            .checked_add(carry)?;
        let year = cycles
            .checked_mul(YEARS_PER_CYCLE)?
            .checked_add(year_of_cycle as i64)?;
        let month = month_from0(shifted.month0())?;

        DateKey::new(i32::try_from(year).ok()?, month, shifted.day())
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month().number_from_month(), self.day())
    }

    fn cycle_date(&self) -> Option<(i64, NaiveDate)> {
        cycle_date(self.year(), self.month(), self.day())
    }
}

impl<T: Datelike> From<T> for DateKey {
    fn from(date: T) -> Self {
        let month = month_from0(date.month0()).unwrap_or(Month::January);
        DateKey::new(date.year(), month, date.day())
            .unwrap_or_else(|| Period::new(date.year(), month).first_day())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month().number_from_month(),
            self.day()
        )
    }
}

fn date_triple(input: &str) -> IResult<&str, (i32, u32, u32)> {
    tuple((
        map_res(recognize(pair(opt(char('-')), digit1)), i32::from_str),
        preceded(char('-'), map_res(digit1, u32::from_str)),
        preceded(char('-'), map_res(digit1, u32::from_str)),
    ))(input)
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, (year, month, day)) = all_consuming(date_triple)(s.trim())
            .map_err(|_| Error::new(ErrorKind::DateParse, s))?;

        Month::from_u32(month)
            .and_then(|month| DateKey::new(year, month, day))
            .ok_or_else(|| Error::new(ErrorKind::DateParse, &format!("'{}' is not a date", s)))
    }
}

/// The (year, month) pair shown by the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    year: i32,
    month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Period { year, month }
    }

    pub fn from_month0(year: i32, index: u32) -> Option<Self> {
        month_from0(index).map(|month| Period::new(year, month))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn month0(&self) -> u32 {
        month0(self.month)
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_weekday_offset(&self) -> u32 {
        first_weekday_offset(self.year, self.month)
    }

    pub fn date_key(&self, day: u32) -> Option<DateKey> {
        DateKey::new(self.year, self.month, day)
    }

    pub fn first_day(&self) -> DateKey {
        DateKey(
            self.year as i64 * DateKey::YEAR_FACTOR
                + self.month0() as i64 * DateKey::MONTH_FACTOR
                + 1,
        )
    }

    /// Shifts by `delta` months, carrying into adjacent years. Stops at the
    /// first or last month of the `i32` year range.
    pub fn advance(&self, delta: i32) -> Self {
        let index = self.year as i64 * 12 + self.month0() as i64 + delta as i64;
        let month = month_from0(index.rem_euclid(12) as u32).unwrap_or(Month::January);

        match i32::try_from(index.div_euclid(12)) {
            Ok(year) => Period::new(year, month),
            Err(_) if delta < 0 => Period::new(i32::MIN, Month::January),
            Err(_) => Period::new(i32::MAX, Month::December),
        }
    }

    pub fn next(&self) -> Self {
        self.advance(1)
    }

    pub fn prev(&self) -> Self {
        self.advance(-1)
    }
}

impl Default for Period {
    fn default() -> Self {
        DateKey::today().period()
    }
}

impl From<DateKey> for Period {
    fn from(date: DateKey) -> Self {
        date.period()
    }
}

impl Add<u32> for Period {
    type Output = Period;
    fn add(self, rhs: u32) -> Self::Output {
        self.advance(i32::try_from(rhs).unwrap_or(i32::MAX))
    }
}

impl Sub<u32> for Period {
    type Output = Period;
    fn sub(self, rhs: u32) -> Self::Output {
        self.advance(-i32::try_from(rhs).unwrap_or(i32::MAX))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month0()).cmp(&(other.year, other.month0()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Past,
    Today,
    Upcoming,
}

impl DayKind {
    pub fn name(&self) -> &'static str {
        match self {
            DayKind::Past => "Past days",
            DayKind::Today => "Today",
            DayKind::Upcoming => "Upcoming",
        }
    }
}

pub fn is_today(date: &DateKey, today: &DateKey) -> bool {
    date == today
}

pub fn classify(date: &DateKey, today: &DateKey) -> DayKind {
    match date.cmp(today) {
        Ordering::Less => DayKind::Past,
        Ordering::Equal => DayKind::Today,
        Ordering::Greater => DayKind::Upcoming,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl Default for WeekStart {
    fn default() -> Self {
        WeekStart::Sunday
    }
}

impl WeekStart {
    const SUNDAY_HEADER: [&'static str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    const MONDAY_HEADER: [&'static str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    pub fn header(&self) -> &'static [&'static str; 7] {
        match self {
            WeekStart::Sunday => &Self::SUNDAY_HEADER,
            WeekStart::Monday => &Self::MONDAY_HEADER,
        }
    }

    /// Column of a Sunday-based weekday in a grid starting on `self`.
    pub fn column(&self, weekday: u32) -> u32 {
        match self {
            WeekStart::Sunday => weekday % 7,
            WeekStart::Monday => (weekday + 6) % 7,
        }
    }

    /// Number of empty cells before day 1 of the month.
    pub fn offset(&self, year: i32, month: Month) -> u32 {
        self.column(first_weekday_offset(year, month))
    }

    pub fn week_of(&self, date: &DateKey) -> DateKey {
        date.add_days(-(self.column(date.weekday()) as i64))
    }
}
