pub mod app;
mod calendar_window;
mod command;
mod context;
mod goal_window;

pub use app::App;
pub use calendar_window::{CalendarWindow, MonthPane, WeekPane};
pub use command::CommandParser;
pub use context::{Context, Mode, Theme};
pub use goal_window::{progress_bar, GoalWindow};
