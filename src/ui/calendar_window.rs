use std::fmt::Display;

use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::DateKey;
use crate::overview::{DaySummary, MonthOverview, WeekOverview};
use crate::tracker::ViewMode;

use super::{Context, Theme};

fn calorie_label(calories: f64) -> String {
    if calories > 0.0 {
        format!("{:.0}", calories)
    } else {
        String::new()
    }
}

pub struct DayCell<'a> {
    summary: &'a DaySummary,
    selected: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    const CELL_HEIGHT: usize = 2;
    const CELL_WIDTH: usize = 7;

    fn new(summary: &'a DaySummary, theme: &'a Theme) -> Self {
        DayCell {
            summary,
            selected: false,
            theme,
        }
    }

    fn select(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn style(&self) -> StyleModifier {
        self.theme.day_kind_style(self.summary.kind)
    }
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arg_today = if self.summary.is_today() {
            self.theme.today_day_char.unwrap_or(' ')
        } else {
            ' '
        };

        let arg_focus = if self.selected {
            self.theme.focus_day_char.unwrap_or(' ')
        } else {
            ' '
        };

        write!(
            f,
            "{:>width$}",
            format!("{}{}{:>2}", arg_today, arg_focus, self.summary.day()),
            width = Self::CELL_WIDTH
        )
    }
}

pub struct MonthPane<'a> {
    overview: MonthOverview,
    selected: DateKey,
    theme: &'a Theme,
}

impl<'a> MonthPane<'a> {
    const COLUMNS: usize = 7;
    const ROWS: usize = 6;
    const HEADER_ROWS: usize = 2;

    pub fn new(context: &'a Context) -> Self {
        MonthPane {
            overview: context.tracker().month_overview(),
            selected: context.tracker().cursor(),
            theme: context.theme(),
        }
    }

    fn width() -> usize {
        Self::COLUMNS * DayCell::CELL_WIDTH
    }
}

impl Widget for MonthPane<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(Self::width()),
            height: RowDemand::exact(Self::HEADER_ROWS + Self::ROWS * DayCell::CELL_HEIGHT),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = self.theme;

        let mut cursor = Cursor::new(&mut window)
            .wrapping_mode(WrappingMode::Wrap)
            .style_modifier(
                theme
                    .month_header_style
                    .format(theme.month_header_text_style),
            );

        cursor.write(&format!(
            "{:^width$}",
            self.overview.period().to_string(),
            width = Self::width()
        ));
        cursor.fill_and_wrap_line();

        cursor.set_style_modifier(theme.weekday_header_style);
        for head in self.overview.week_start().header().iter() {
            cursor.write(&format!("{:>width$}", head, width = DayCell::CELL_WIDTH));
        }
        cursor.fill_and_wrap_line();

        for week in self.overview.weeks() {
            for slot in week.iter() {
                match slot {
                    Some(summary) => {
                        let cell =
                            DayCell::new(summary, theme).select(summary.date == self.selected);
                        cursor.set_style_modifier(cell.style());
                        if cell.selected {
                            cursor.apply_style_modifier(theme.focus_day_style);
                        }
                        cursor.write(&cell.to_string());
                    }
                    None => {
                        cursor.set_style_modifier(theme.day_style);
                        cursor.write(&" ".repeat(DayCell::CELL_WIDTH));
                    }
                }
            }
            cursor.set_style_modifier(theme.day_style);
            cursor.fill_and_wrap_line();

            cursor.set_style_modifier(theme.calories_style);
            for slot in week.iter() {
                let label = slot
                    .map(|summary| calorie_label(summary.calories))
                    .unwrap_or_default();
                cursor.write(&format!("{:>width$}", label, width = DayCell::CELL_WIDTH));
            }
            cursor.set_style_modifier(theme.day_style);
            cursor.fill_and_wrap_line();
        }
    }
}

pub struct WeekPane<'a> {
    overview: WeekOverview,
    selected: DateKey,
    context: &'a Context,
}

impl<'a> WeekPane<'a> {
    const DAY_LABEL_WIDTH: usize = 16;
    const MEAL_WIDTH: usize = 17;

    pub fn new(context: &'a Context) -> Self {
        WeekPane {
            overview: context.tracker().week_overview(),
            selected: context.tracker().cursor(),
            context,
        }
    }
}

impl Widget for WeekPane<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(Self::DAY_LABEL_WIDTH + 4 * Self::MEAL_WIDTH),
            height: RowDemand::exact(1 + self.overview.days().len()),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = self.context.theme();
        let week_start = self.context.tracker().week_start();

        let mut cursor = Cursor::new(&mut window).style_modifier(
            theme
                .month_header_style
                .format(theme.month_header_text_style),
        );

        if let Some(first) = self.overview.first() {
            cursor.write(&format!(
                "Week of {} ({:.0} kcal)",
                first,
                self.overview.total()
            ));
        }
        cursor.fill_and_wrap_line();

        for (column, day) in self.overview.days().iter().enumerate() {
            let summary = &day.summary;
            let cell = DayCell::new(summary, theme).select(summary.date == self.selected);

            cursor.set_style_modifier(cell.style());
            if cell.selected {
                cursor.apply_style_modifier(theme.focus_day_style);
            }
            cursor.write(&format!(
                "{:<width$}",
                format!("{} {}", week_start.header()[column], summary.date),
                width = Self::DAY_LABEL_WIDTH
            ));

            cursor.set_style_modifier(theme.calories_style);
            for (category, calories) in day.meals.iter() {
                cursor.write(&format!(
                    "{:>10} {:>6}",
                    category,
                    calorie_label(*calories)
                ));
            }
            cursor.write(&format!(" = {:>6}", calorie_label(summary.calories)));

            cursor.set_style_modifier(theme.day_style);
            cursor.fill_and_wrap_line();
        }
    }
}

/// Shows either the month grid or the week breakdown, depending on the
/// current view mode.
pub struct CalendarWindow<'a> {
    context: &'a Context,
}

impl<'a> CalendarWindow<'a> {
    pub fn new(context: &'a Context) -> Self {
        CalendarWindow { context }
    }
}

impl Widget for CalendarWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        match self.context.tracker().view() {
            ViewMode::Month => MonthPane::new(self.context).space_demand(),
            ViewMode::Week => WeekPane::new(self.context).space_demand(),
        }
    }

    fn draw(&self, window: Window, hints: RenderingHints) {
        match self.context.tracker().view() {
            ViewMode::Month => MonthPane::new(self.context).draw(window, hints),
            ViewMode::Week => WeekPane::new(self.context).draw(window, hints),
        }
    }
}
