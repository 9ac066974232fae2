use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::{Error, ErrorKind, MealSource, Result};
use crate::calendar::DateKey;
use crate::events::Event;
use crate::meals::{MealCategory, MealEntry, MealRecord, MealStore};

// The log is written by other tools, so every level accepts anything and
// unusable values end up as `Other`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMeal {
    Fields(BTreeMap<String, RawValue>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDay {
    Meals(BTreeMap<String, RawMeal>),
    Other(IgnoredAny),
}

impl RawMeal {
    fn into_entry(self) -> MealEntry {
        match self {
            RawMeal::Fields(fields) => match fields.get("calories") {
                Some(RawValue::Number(calories)) => MealEntry::new(*calories),
                _ => MealEntry::unknown(),
            },
            RawMeal::Other(_) => MealEntry::unknown(),
        }
    }
}

fn parse_record(date: &DateKey, meals: BTreeMap<String, RawMeal>) -> MealRecord {
    meals
        .into_iter()
        .filter_map(|(name, meal)| match name.parse::<MealCategory>() {
            Ok(category) => Some((category, meal.into_entry())),
            Err(_) => {
                log::debug!("Ignoring unknown meal '{}' on {}", name, date);
                None
            }
        })
        .fold(MealRecord::new(), |record, (category, entry)| {
            record.with(category, entry)
        })
}

/// Parses a meal log:
///
/// ```toml
/// ["2024-02-15"]
/// breakfast = { calories = 300, protein = 12 }
/// lunch = { calories = 450 }
/// ```
pub fn parse_meal_log(text: &str) -> Result<MealStore> {
    let raw: BTreeMap<String, RawDay> = toml::from_str(text)
        .map_err(|err| Error::new(ErrorKind::MealLogParse, &err.to_string()))?;

    let mut store = MealStore::new();

    for (day, raw_day) in raw {
        let date = match day.parse::<DateKey>() {
            Ok(date) => date,
            Err(err) => {
                log::warn!("Skipping meals of '{}': {}", day, err);
                continue;
            }
        };

        match raw_day {
            RawDay::Meals(meals) => {
                // "2024-2-5" and "2024-02-05" name the same day
                if store.merge(date, parse_record(&date, meals)) {
                    log::warn!("Meals of {} are listed more than once, merging", date);
                }
            }
            RawDay::Other(_) => log::warn!("Skipping meals of {}: not a table", date),
        }
    }

    Ok(store)
}

pub struct MealLog {
    path: PathBuf,
    name: String,
    watcher: Option<RecommendedWatcher>,
}

impl MealLog {
    pub fn new(path: &Path) -> Self {
        MealLog {
            path: path.to_owned(),
            name: path.display().to_string(),
            watcher: None,
        }
    }

    pub fn is_watched(&self) -> bool {
        self.watcher.is_some()
    }

    /// Sends `Event::ExternalModification` whenever the log changes on disk.
    ///
    /// The parent directory is watched instead of the file itself, so editors
    /// that replace the file on save are picked up as well.
    pub fn watch(&mut self, sink: Sender<Event>) -> Result<()> {
        let file_name: Option<OsString> = self.path.file_name().map(|name| name.to_owned());
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
            _ => PathBuf::from("."),
        };

        fn is_relevant(event: &notify::Event, file_name: Option<&OsStr>) -> bool {
            matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) && event
                .paths
                .iter()
                .any(|path| path.file_name() == file_name)
        }

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if is_relevant(&event, file_name.as_deref())
                        && sink.send(Event::ExternalModification).is_err()
                    {
                        log::debug!("Event sink closed, dropping meal log change");
                    }
                }
                Err(err) => log::error!("watch error: {:?}", err),
            })?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        log::info!("Watching {} for changes", self.name);

        self.watcher = Some(watcher);
        Ok(())
    }
}

impl MealSource for MealLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<MealStore> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_meal_log(&text).map_err(|err| {
                let message = format!("{}: {}", self.name, err.message.as_deref().unwrap_or(""));
                err.with_msg(&message)
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No meal log at {}, starting empty", self.name);
                Ok(MealStore::new())
            }
            Err(err) => Err(Error::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;
    use crate::meals::total_calories;

    fn date(day: u32) -> DateKey {
        DateKey::new(2024, Month::February, day).unwrap()
    }

    #[test]
    fn reads_calories_per_category() {
        let store = parse_meal_log(
            r#"
            ["2024-02-15"]
            breakfast = { calories = 300, protein = 12.5 }
            lunch = { calories = 450.5 }

            ["2024-02-16".dinner]
            calories = 900
            "#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(total_calories(&date(15), &store), 750.5);
        assert_eq!(total_calories(&date(16), &store), 900.0);
        assert_eq!(total_calories(&date(17), &store), 0.0);
    }

    #[test]
    fn tolerates_malformed_entries() {
        let store = parse_meal_log(
            r#"
            "2024-02-14" = 5
            "not a date" = { lunch = { calories = 100 } }

            ["2024-02-15"]
            breakfast = { calories = "lots" }
            lunch = 12
            dinner = { protein = 40 }
            snacks = { calories = 200 }
            brunch = { calories = 1000 }
            "#,
        )
        .unwrap();

        assert_eq!(store.len(), 1);
        let record = store.get(&date(15)).unwrap();
        assert_eq!(record.total(), 200.0);
        assert_eq!(record.get(MealCategory::Lunch), Some(&MealEntry::unknown()));
    }

    #[test]
    fn merges_days_spelled_differently() {
        let store = parse_meal_log(
            r#"
            ["2024-02-15"]
            breakfast = { calories = 300 }

            ["2024-2-15"]
            lunch = { calories = 450 }
            breakfast = { calories = 100 }
            "#,
        )
        .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(total_calories(&date(15), &store), 850.0);
    }

    #[test]
    fn rejects_invalid_toml() {
        let err = parse_meal_log("[[[").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MealLogParse));
    }

    #[test]
    fn missing_file_is_empty() {
        let log = MealLog::new(Path::new("/nonexistent/morsel/meals.toml"));
        assert!(log.load().unwrap().is_empty());
        assert!(!log.is_watched());
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("morsel-meals-{}.toml", std::process::id()));
        fs::write(&path, "[\"2024-02-15\"]\nsnacks = { calories = 250 }\n").unwrap();

        let store = MealLog::new(&path).load();
        fs::remove_file(&path).unwrap();

        assert_eq!(total_calories(&date(15), &store.unwrap()), 250.0);
    }
}
