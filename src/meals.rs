use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calendar::DateKey;
use crate::error::{Error, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealCategory {
    pub const ALL: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snacks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "breakfast",
            MealCategory::Lunch => "lunch",
            MealCategory::Dinner => "dinner",
            MealCategory::Snacks => "snacks",
        }
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for MealCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealCategory::ALL
            .iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    &format!("'{}' is not a meal category", s),
                )
            })
    }
}

/// A single meal. Only calories are tracked; a missing value counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MealEntry {
    calories: Option<f64>,
}

impl MealEntry {
    pub fn new(calories: f64) -> Self {
        MealEntry {
            calories: Some(calories),
        }
    }

    pub fn unknown() -> Self {
        MealEntry { calories: None }
    }

    /// Contribution to the daily total. Negative and non-finite values are
    /// treated like a missing entry.
    pub fn calories(&self) -> f64 {
        match self.calories {
            Some(calories) if calories.is_finite() && calories > 0.0 => calories,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealRecord {
    meals: BTreeMap<MealCategory, MealEntry>,
}

impl MealRecord {
    pub fn new() -> Self {
        MealRecord::default()
    }

    pub fn with(mut self, category: MealCategory, entry: MealEntry) -> Self {
        self.insert(category, entry);
        self
    }

    pub fn insert(&mut self, category: MealCategory, entry: MealEntry) -> Option<MealEntry> {
        self.meals.insert(category, entry)
    }

    pub fn get(&self, category: MealCategory) -> Option<&MealEntry> {
        self.meals.get(&category)
    }

    pub fn calories_of(&self, category: MealCategory) -> f64 {
        self.get(category).map_or(0.0, MealEntry::calories)
    }

    pub fn total(&self) -> f64 {
        MealCategory::ALL
            .iter()
            .map(|category| self.calories_of(*category))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    /// Adds the meals of `other`. Calories of a category present in both are
    /// summed.
    pub fn merge(&mut self, other: MealRecord) {
        for (category, entry) in other.meals {
            match self.meals.entry(category) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    let merged = match (slot.get().calories, entry.calories) {
                        (None, None) => MealEntry::unknown(),
                        _ => MealEntry::new(slot.get().calories() + entry.calories()),
                    };
                    slot.insert(merged);
                }
            }
        }
    }
}

/// Meal records indexed by day. Days without a record are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealStore {
    days: BTreeMap<DateKey, MealRecord>,
}

impl MealStore {
    pub fn new() -> Self {
        MealStore::default()
    }

    pub fn insert(&mut self, date: DateKey, record: MealRecord) -> Option<MealRecord> {
        self.days.insert(date, record)
    }

    pub fn get(&self, date: &DateKey) -> Option<&MealRecord> {
        self.days.get(date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Like `insert`, but keeps the meals already recorded for `date`.
    /// Returns whether `date` had a record before.
    pub fn merge(&mut self, date: DateKey, record: MealRecord) -> bool {
        match self.days.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                false
            }
            Entry::Occupied(mut slot) => {
                slot.get_mut().merge(record);
                true
            }
        }
    }
}

impl std::iter::FromIterator<(DateKey, MealRecord)> for MealStore {
    fn from_iter<I: IntoIterator<Item = (DateKey, MealRecord)>>(iter: I) -> Self {
        let mut store = MealStore::new();
        for (date, record) in iter {
            store.merge(date, record);
        }
        store
    }
}

pub fn total_calories(date: &DateKey, store: &MealStore) -> f64 {
    store.get(date).map_or(0.0, MealRecord::total)
}

/// Share of `goal` reached by `total`, clamped to `[0, 1]`.
///
/// A goal that is not strictly positive yields 0.
pub fn progress_fraction(total: f64, goal: f64) -> f64 {
    if !(goal > 0.0) || !total.is_finite() || total <= 0.0 {
        return 0.0;
    }

    (total / goal).min(1.0)
}
