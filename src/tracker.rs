use serde::Deserialize;
use std::str::FromStr;

use crate::calendar::{DateKey, Period, WeekStart};
use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::meals::{total_calories, MealStore};
use crate::overview::{self, MonthOverview, WeekOverview};
use crate::provider::MealSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Month,
    Week,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Month
    }
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Month => "Monthly",
            ViewMode::Week => "Weekly",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::Month => ViewMode::Week,
            ViewMode::Week => ViewMode::Month,
        }
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(ViewMode::Month),
            "week" | "weekly" => Ok(ViewMode::Week),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("unknown view '{}'", other),
            )),
        }
    }
}

/// Owns the displayed period, the selected day, the calorie goal and the
/// meals. All changes go through the methods below.
pub struct Tracker {
    period: Period,
    cursor: DateKey,
    today: DateKey,
    calorie_goal: f64,
    view: ViewMode,
    week_start: WeekStart,
    meals: MealStore,
}

impl Tracker {
    pub fn new(today: DateKey, calorie_goal: f64) -> Self {
        Tracker {
            period: today.period(),
            cursor: today,
            today,
            calorie_goal,
            view: ViewMode::default(),
            week_start: WeekStart::default(),
            meals: MealStore::new(),
        }
    }

    pub fn from_config(config: &Config, today: DateKey) -> Self {
        let mut tracker = Tracker::new(today, config.calorie_goal);
        tracker.view = config.view;
        tracker.week_start = config.week_start;
        tracker
    }

    pub fn with_meals(mut self, meals: MealStore) -> Self {
        self.replace_meals(meals);
        self
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn cursor(&self) -> DateKey {
        self.cursor
    }

    pub fn today(&self) -> DateKey {
        self.today
    }

    pub fn calorie_goal(&self) -> f64 {
        self.calorie_goal
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn meals(&self) -> &MealStore {
        &self.meals
    }

    pub fn next_month(&mut self, n: u32) {
        self.show_period(self.period + n);
    }

    pub fn prev_month(&mut self, n: u32) {
        self.show_period(self.period - n);
    }

    // Keeps the cursor on the same day of month where possible.
    fn show_period(&mut self, period: Period) {
        let day = self.cursor.day().min(period.days());
        self.period = period;
        self.cursor = period.date_key(day).unwrap_or_else(|| period.first_day());
    }

    pub fn move_cursor(&mut self, days: i64) {
        self.cursor = self.cursor.add_days(days);
        self.period = self.cursor.period();
    }

    pub fn select_today(&mut self) {
        self.cursor = self.today;
        self.period = self.today.period();
    }

    /// Returns whether the date actually changed.
    pub fn set_today(&mut self, today: DateKey) -> bool {
        if self.today == today {
            return false;
        }

        self.today = today;
        true
    }

    pub fn set_goal(&mut self, goal: f64) -> Result<()> {
        if !goal.is_finite() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "calorie goal must be a finite number",
            ));
        }

        if goal <= 0.0 {
            log::warn!("Calorie goal of {} will never show any progress", goal);
        }

        self.calorie_goal = goal;
        Ok(())
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    pub fn replace_meals(&mut self, meals: MealStore) {
        log::debug!("Tracking meals of {} days", meals.len());
        self.meals = meals;
    }

    /// On failure the current meals are kept.
    pub fn reload(&mut self, source: &dyn MealSource) -> Result<()> {
        let meals = source.load()?;
        log::info!("Reloaded meals from {}", source.name());
        self.replace_meals(meals);
        Ok(())
    }

    pub fn month_overview(&self) -> MonthOverview {
        MonthOverview::new(self.period, &self.meals, &self.today, self.week_start)
    }

    pub fn week_overview(&self) -> WeekOverview {
        WeekOverview::new(&self.cursor, &self.meals, &self.today, self.week_start)
    }

    pub fn today_total(&self) -> f64 {
        total_calories(&self.today, &self.meals)
    }

    pub fn today_progress(&self) -> f64 {
        overview::today_progress(&self.meals, &self.today, self.calorie_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::{MealCategory, MealEntry, MealRecord};
    use chrono::Month;

    fn date(year: i32, month: Month, day: u32) -> DateKey {
        DateKey::new(year, month, day).unwrap()
    }

    fn meals_on(date: DateKey, calories: f64) -> MealStore {
        let mut store = MealStore::new();
        store.insert(
            date,
            MealRecord::new().with(MealCategory::Dinner, MealEntry::new(calories)),
        );
        store
    }

    struct FailingSource;

    impl MealSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn load(&self) -> Result<MealStore> {
            Err(Error::new(ErrorKind::MealLogParse, "broken"))
        }
    }

    #[test]
    fn starts_on_todays_month() {
        let today = date(2024, Month::February, 15);
        let tracker = Tracker::new(today, 2000.0);

        assert_eq!(tracker.period(), Period::new(2024, Month::February));
        assert_eq!(tracker.cursor(), today);
        assert_eq!(tracker.view(), ViewMode::Month);
    }

    #[test]
    fn month_navigation_rolls_over_and_clamps_cursor() {
        let mut tracker = Tracker::new(date(2024, Month::January, 31), 2000.0);

        tracker.next_month(1);
        assert_eq!(tracker.period(), Period::new(2024, Month::February));
        assert_eq!(tracker.cursor(), date(2024, Month::February, 29));

        tracker.prev_month(2);
        assert_eq!(tracker.period(), Period::new(2023, Month::December));
        assert_eq!(tracker.cursor(), date(2023, Month::December, 29));

        tracker.next_month(13);
        assert_eq!(tracker.period(), Period::new(2025, Month::January));
    }

    #[test]
    fn cursor_drags_period_along() {
        let mut tracker = Tracker::new(date(2024, Month::February, 28), 2000.0);

        tracker.move_cursor(2);
        assert_eq!(tracker.cursor(), date(2024, Month::March, 1));
        assert_eq!(tracker.period(), Period::new(2024, Month::March));

        tracker.move_cursor(-7);
        assert_eq!(tracker.period(), Period::new(2024, Month::February));

        tracker.next_month(3);
        tracker.select_today();
        assert_eq!(tracker.cursor(), date(2024, Month::February, 28));
        assert_eq!(tracker.period(), Period::new(2024, Month::February));
    }

    #[test]
    fn goal_drives_progress() {
        let today = date(2024, Month::February, 15);
        let mut tracker = Tracker::new(today, 2000.0).with_meals(meals_on(today, 1800.0));

        assert_eq!(tracker.today_total(), 1800.0);
        assert_eq!(tracker.today_progress(), 0.9);

        tracker.set_goal(1500.0).unwrap();
        assert_eq!(tracker.today_progress(), 1.0);

        tracker.set_goal(0.0).unwrap();
        assert_eq!(tracker.today_progress(), 0.0);

        assert!(tracker.set_goal(f64::NAN).is_err());
        assert_eq!(tracker.calorie_goal(), 0.0);
    }

    #[test]
    fn progress_ignores_displayed_month() {
        let today = date(2024, Month::February, 15);
        let mut tracker = Tracker::new(today, 2000.0).with_meals(meals_on(today, 500.0));

        tracker.next_month(1);
        assert_eq!(tracker.today_total(), 500.0);
        assert_eq!(tracker.today_progress(), 0.25);
    }

    #[test]
    fn day_change_is_reported_once() {
        let mut tracker = Tracker::new(date(2024, Month::February, 15), 2000.0);
        assert!(!tracker.set_today(date(2024, Month::February, 15)));
        assert!(tracker.set_today(date(2024, Month::February, 16)));
        assert_eq!(tracker.today(), date(2024, Month::February, 16));
    }

    #[test]
    fn reload_replaces_or_keeps_meals() {
        let today = date(2024, Month::February, 15);
        let mut tracker = Tracker::new(today, 2000.0).with_meals(meals_on(today, 100.0));

        assert!(tracker.reload(&FailingSource).is_err());
        assert_eq!(tracker.today_total(), 100.0);

        tracker.reload(&meals_on(today, 700.0)).unwrap();
        assert_eq!(tracker.today_total(), 700.0);
    }

    #[test]
    fn view_mode_parses_and_toggles() {
        assert_eq!("week".parse::<ViewMode>().unwrap(), ViewMode::Week);
        assert_eq!("Monthly".parse::<ViewMode>().unwrap(), ViewMode::Month);
        assert!("daily".parse::<ViewMode>().is_err());

        let mut tracker = Tracker::new(date(2024, Month::February, 15), 2000.0);
        tracker.toggle_view();
        assert_eq!(tracker.view(), ViewMode::Week);
        assert_eq!(
            tracker.week_overview().first(),
            Some(date(2024, Month::February, 11))
        );
    }
}
