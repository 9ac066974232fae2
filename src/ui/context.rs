use std::fmt::Display;

use crate::calendar::{DateKey, DayKind};
use crate::error::Result;
use crate::provider::MealSource;
use crate::tracker::Tracker;

use unsegen::base::style::*;
use unsegen::widget::builtin::PromptLine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub day_style: StyleModifier,
    pub past_day_style: StyleModifier,
    pub upcoming_day_style: StyleModifier,
    pub today_day_style: StyleModifier,
    pub today_day_text_style: TextFormatModifier,
    pub today_day_char: Option<char>,
    pub focus_day_style: StyleModifier,
    pub focus_day_char: Option<char>,
    pub calories_style: StyleModifier,
    pub month_header_style: StyleModifier,
    pub month_header_text_style: TextFormatModifier,
    pub weekday_header_style: StyleModifier,
    pub progress_style: StyleModifier,
    pub progress_full_style: StyleModifier,
    pub error_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            day_style: StyleModifier::default(),
            past_day_style: StyleModifier::default().fg_color(Color::Cyan),
            upcoming_day_style: StyleModifier::default().fg_color(Color::Blue),
            today_day_style: StyleModifier::default().fg_color(Color::Green).invert(true),
            today_day_text_style: TextFormatModifier::default().italic(true),
            today_day_char: Some('*'),
            focus_day_style: StyleModifier::default().bg_color(Color::Blue),
            focus_day_char: None,
            calories_style: StyleModifier::default().fg_color(Color::Magenta),
            month_header_style: StyleModifier::default().fg_color(Color::Yellow),
            month_header_text_style: TextFormatModifier::default().bold(true),
            weekday_header_style: StyleModifier::default().fg_color(Color::Yellow),
            progress_style: StyleModifier::default().fg_color(Color::Green),
            progress_full_style: StyleModifier::default().fg_color(Color::LightRed),
            error_style: StyleModifier::default().fg_color(Color::LightRed),
        }
    }
}

impl Theme {
    pub fn day_kind_style(&self, kind: DayKind) -> StyleModifier {
        match kind {
            DayKind::Past => self.past_day_style,
            DayKind::Today => self.today_day_style.format(self.today_day_text_style),
            DayKind::Upcoming => self.upcoming_day_style,
        }
    }
}

pub struct Context {
    pub mode: Mode,
    pub theme: Theme,
    pub command_line: PromptLine,
    pub last_error_message: Option<String>,
    tracker: Tracker,
    source: Option<Box<dyn MealSource>>,
}

impl Context {
    pub fn new(tracker: Tracker) -> Self {
        Context {
            mode: Mode::Normal,
            theme: Theme::default(),
            command_line: PromptLine::with_prompt(":".to_owned()),
            last_error_message: None,
            tracker,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Box<dyn MealSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn update(&mut self) {
        let today = DateKey::today();
        if self.tracker.set_today(today) {
            log::info!("Day changed to {}", today);
        }
    }

    pub fn reload_meals(&mut self) -> Result<()> {
        match &self.source {
            Some(source) => self.tracker.reload(source.as_ref()),
            None => Ok(()),
        }
    }

    pub fn report_error<E: Display>(&mut self, error: E) {
        self.last_error_message = Some(format!("{}", error));
    }

    pub fn clear_error(&mut self) {
        self.last_error_message = None;
    }
}
