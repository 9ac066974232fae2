use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::DayKind;

use super::Context;

const BAR_WIDTH: usize = 30;

/// Renders `fraction` (clamped to 0..=1) as a bar of `width` cells.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.max(0.0).min(1.0)
    } else {
        0.0
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);

    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub struct GoalWindow<'a> {
    context: &'a Context,
}

impl<'a> GoalWindow<'a> {
    pub fn new(context: &'a Context) -> Self {
        GoalWindow { context }
    }
}

impl Widget for GoalWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(BAR_WIDTH + 2),
            height: RowDemand::exact(3),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = self.context.theme();
        let tracker = self.context.tracker();
        let progress = tracker.today_progress();

        let mut cursor = Cursor::new(&mut window);

        cursor.set_style_modifier(
            theme
                .month_header_style
                .format(theme.month_header_text_style),
        );
        cursor.write(&format!(
            "Today {}: {:.0} / {:.0} kcal ({:.0}%)",
            tracker.today(),
            tracker.today_total(),
            tracker.calorie_goal(),
            progress * 100.0
        ));
        cursor.fill_and_wrap_line();

        cursor.set_style_modifier(if progress >= 1.0 {
            theme.progress_full_style
        } else {
            theme.progress_style
        });
        cursor.write(&progress_bar(progress, BAR_WIDTH));
        cursor.fill_and_wrap_line();

        for kind in [DayKind::Today, DayKind::Past, DayKind::Upcoming].iter() {
            cursor.set_style_modifier(theme.day_kind_style(*kind));
            cursor.write(&format!(" {} ", kind.name()));
            cursor.set_style_modifier(theme.day_style);
            cursor.write(" ");
        }
        cursor.fill_and_wrap_line();
    }
}
