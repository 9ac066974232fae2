use std::fmt;

use crate::calendar::{classify, DateKey, DayKind, Period, WeekStart};
use crate::meals::{progress_fraction, total_calories, MealCategory, MealStore};

/// What a single grid cell shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySummary {
    pub date: DateKey,
    pub calories: f64,
    pub kind: DayKind,
}

impl DaySummary {
    pub fn new(date: DateKey, store: &MealStore, today: &DateKey) -> Self {
        DaySummary {
            date,
            calories: total_calories(&date, store),
            kind: classify(&date, today),
        }
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn is_today(&self) -> bool {
        self.kind == DayKind::Today
    }
}

pub struct MonthOverview {
    period: Period,
    week_start: WeekStart,
    offset: usize,
    days: Vec<DaySummary>,
}

impl MonthOverview {
    pub fn new(period: Period, store: &MealStore, today: &DateKey, week_start: WeekStart) -> Self {
        let days = (1..=period.days())
            .filter_map(|day| period.date_key(day))
            .map(|date| DaySummary::new(date, store, today))
            .collect();

        MonthOverview {
            period,
            week_start,
            offset: week_start.offset(period.year(), period.month()) as usize,
            days,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Empty cells in front of day 1.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn days(&self) -> &[DaySummary] {
        &self.days
    }

    pub fn day(&self, day: u32) -> Option<&DaySummary> {
        self.days.get((day as usize).checked_sub(1)?)
    }

    pub fn cell_count(&self) -> usize {
        self.offset + self.days.len()
    }

    /// Rows of seven cells, with `None` before day 1 and after the last day.
    pub fn weeks(&self) -> Vec<Vec<Option<&DaySummary>>> {
        let padded = (self.cell_count() + 6) / 7 * 7;

        std::iter::repeat(None)
            .take(self.offset)
            .chain(self.days.iter().map(Some))
            .chain(std::iter::repeat(None))
            .take(padded)
            .collect::<Vec<_>>()
            .chunks(7)
            .map(|week| week.to_vec())
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.days.iter().map(|day| day.calories).sum()
    }
}

impl fmt::Display for MonthOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CELL_WIDTH: usize = 7;

        writeln!(
            f,
            "{:^width$}",
            self.period.to_string(),
            width = CELL_WIDTH * 7
        )?;

        for name in self.week_start.header().iter() {
            write!(f, "{:>width$}", name, width = CELL_WIDTH)?;
        }
        writeln!(f)?;

        for week in self.weeks() {
            for cell in week.iter() {
                match cell {
                    Some(day) if day.is_today() => {
                        write!(f, "{:>width$}", format!("*{}", day.day()), width = CELL_WIDTH)?
                    }
                    Some(day) => write!(f, "{:>width$}", day.day(), width = CELL_WIDTH)?,
                    None => write!(f, "{:width$}", "", width = CELL_WIDTH)?,
                }
            }
            writeln!(f)?;

            for cell in week.iter() {
                match cell {
                    Some(day) if day.calories > 0.0 => {
                        write!(f, "{:>width$.0}", day.calories, width = CELL_WIDTH)?
                    }
                    _ => write!(f, "{:width$}", "", width = CELL_WIDTH)?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekDay {
    pub summary: DaySummary,
    pub meals: [(MealCategory, f64); 4],
}

pub struct WeekOverview {
    days: Vec<WeekDay>,
}

impl WeekOverview {
    pub fn new(date: &DateKey, store: &MealStore, today: &DateKey, week_start: WeekStart) -> Self {
        let first = week_start.week_of(date);

        let days = (0..7)
            .map(|offset| first.add_days(offset))
            .map(|date| {
                let record = store.get(&date);
                let mut meals = [(MealCategory::Breakfast, 0.0); 4];
                for (slot, category) in meals.iter_mut().zip(MealCategory::ALL.iter()) {
                    *slot = (
                        *category,
                        record.map_or(0.0, |record| record.calories_of(*category)),
                    );
                }

                WeekDay {
                    summary: DaySummary::new(date, store, today),
                    meals,
                }
            })
            .collect();

        WeekOverview { days }
    }

    pub fn days(&self) -> &[WeekDay] {
        &self.days
    }

    pub fn first(&self) -> Option<DateKey> {
        self.days.first().map(|day| day.summary.date)
    }

    pub fn total(&self) -> f64 {
        self.days.iter().map(|day| day.summary.calories).sum()
    }
}

pub fn today_progress(store: &MealStore, today: &DateKey, goal: f64) -> f64 {
    progress_fraction(total_calories(today, store), goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::{MealEntry, MealRecord};
    use chrono::Month;

    fn date(year: i32, month: Month, day: u32) -> DateKey {
        DateKey::new(year, month, day).unwrap()
    }

    fn leap_day_store() -> MealStore {
        let mut store = MealStore::new();
        store.insert(
            date(2024, Month::February, 15),
            MealRecord::new()
                .with(MealCategory::Breakfast, MealEntry::new(400.0))
                .with(MealCategory::Lunch, MealEntry::new(600.0))
                .with(MealCategory::Dinner, MealEntry::new(650.0))
                .with(MealCategory::Snacks, MealEntry::new(150.0)),
        );
        store
    }

    #[test]
    fn february_2024_end_to_end() {
        let today = date(2024, Month::February, 15);
        let store = leap_day_store();
        let overview = MonthOverview::new(
            Period::new(2024, Month::February),
            &store,
            &today,
            WeekStart::Sunday,
        );

        assert_eq!(overview.days().len(), 29);
        assert_eq!(overview.offset(), 4);
        assert_eq!(overview.cell_count(), 33);

        let fifteenth = overview.day(15).unwrap();
        assert!(fifteenth.is_today());
        assert_eq!(fifteenth.calories, 1800.0);

        let others = overview.days().iter().filter(|day| day.day() != 15);
        for day in others {
            assert!(!day.is_today());
            assert_eq!(day.calories, 0.0);
        }

        assert_eq!(overview.total(), 1800.0);
        assert_eq!(today_progress(&store, &today, 2000.0), 0.9);
    }

    #[test]
    fn weeks_are_seven_wide_and_padded() {
        let today = date(2024, Month::February, 15);
        let overview = MonthOverview::new(
            Period::new(2024, Month::February),
            &MealStore::new(),
            &today,
            WeekStart::Sunday,
        );

        let weeks = overview.weeks();
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|week| week.len() == 7));
        assert!(weeks[4][..5].iter().all(Option::is_some));
        assert!(weeks[4][5..].iter().all(Option::is_none));
        assert_eq!(weeks[4][4].map(DaySummary::day), Some(29));
        assert!(weeks[0][..4].iter().all(Option::is_none));
        assert_eq!(weeks[0][4].map(DaySummary::day), Some(1));
    }

    #[test]
    fn day_kinds_split_around_today() {
        let today = date(2024, Month::February, 15);
        let overview = MonthOverview::new(
            Period::new(2024, Month::February),
            &MealStore::new(),
            &today,
            WeekStart::Monday,
        );

        assert_eq!(overview.offset(), 3);
        assert_eq!(overview.day(14).unwrap().kind, DayKind::Past);
        assert_eq!(overview.day(16).unwrap().kind, DayKind::Upcoming);

        let next_month = MonthOverview::new(
            Period::new(2024, Month::March),
            &MealStore::new(),
            &today,
            WeekStart::Monday,
        );
        assert!(next_month
            .days()
            .iter()
            .all(|day| day.kind == DayKind::Upcoming));
    }

    #[test]
    fn day_lookup_out_of_range() {
        let overview = MonthOverview::new(
            Period::new(2023, Month::February),
            &MealStore::new(),
            &date(2023, Month::February, 1),
            WeekStart::Sunday,
        );
        assert!(overview.day(0).is_none());
        assert!(overview.day(29).is_none());
        assert!(overview.day(28).is_some());
    }

    #[test]
    fn progress_uses_todays_date() {
        let store = leap_day_store();
        let today = date(2024, Month::February, 16);
        assert_eq!(today_progress(&store, &today, 2000.0), 0.0);
        assert_eq!(
            today_progress(&store, &date(2024, Month::February, 15), 0.0),
            0.0
        );
    }

    #[test]
    fn week_spans_month_boundary() {
        let store = leap_day_store();
        let today = date(2024, Month::February, 15);
        let week = WeekOverview::new(
            &date(2024, Month::March, 1),
            &store,
            &today,
            WeekStart::Sunday,
        );

        assert_eq!(week.days().len(), 7);
        assert_eq!(week.first(), Some(date(2024, Month::February, 25)));
        assert_eq!(
            week.days()[6].summary.date,
            date(2024, Month::March, 2)
        );
        assert_eq!(week.total(), 0.0);
    }

    #[test]
    fn week_breaks_down_categories() {
        let store = leap_day_store();
        let today = date(2024, Month::February, 15);
        let week = WeekOverview::new(&today, &store, &today, WeekStart::Monday);

        let thursday = week
            .days()
            .iter()
            .find(|day| day.summary.is_today())
            .unwrap();
        assert_eq!(thursday.meals[0], (MealCategory::Breakfast, 400.0));
        assert_eq!(thursday.meals[3], (MealCategory::Snacks, 150.0));
        assert_eq!(thursday.summary.calories, 1800.0);
        assert_eq!(week.total(), 1800.0);
    }

    #[test]
    fn text_grid_marks_today_and_totals() {
        let today = date(2024, Month::February, 15);
        let overview = MonthOverview::new(
            Period::new(2024, Month::February),
            &leap_day_store(),
            &today,
            WeekStart::Sunday,
        );
        let text = overview.to_string();

        assert!(text.contains("February 2024"));
        assert!(text.contains("*15"));
        assert!(text.contains("1800"));
        assert!(text.lines().nth(1).unwrap().trim_start().starts_with("Sun"));
        // title, header and two lines per week
        assert_eq!(text.lines().count(), 2 + 2 * 5);
    }
}
