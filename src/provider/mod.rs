use std::path::Path;
use std::sync::mpsc::Sender;

mod meal_log;

pub use crate::error::{Error, ErrorKind, Result};
pub use meal_log::{parse_meal_log, MealLog};

use crate::events::Event;
use crate::meals::MealStore;

/// Somewhere recorded meals come from. Sources are read-only.
pub trait MealSource {
    fn name(&self) -> &str;
    fn load(&self) -> Result<MealStore>;
}

impl MealSource for MealStore {
    fn name(&self) -> &str {
        "in-memory meals"
    }

    fn load(&self) -> Result<MealStore> {
        Ok(self.clone())
    }
}

/// Opens the meal log at `path` and, if `sink` is given, starts watching it
/// for modifications by other programs.
pub fn load_meal_log(path: &Path, sink: Option<&Sender<Event>>) -> Result<MealLog> {
    let mut log = MealLog::new(path);

    if let Some(sink) = sink {
        log.watch(sink.clone())?;
    }

    Ok(log)
}
