use crate::events::{Dispatcher, Event};

use super::{CalendarWindow, Context, GoalWindow, Mode};

use unsegen::base::{Cursor, GraphemeCluster, Terminal, Window};
use unsegen::input::{
    EditBehavior, Key, Navigatable, NavigateBehavior, OperationResult, ScrollBehavior,
};
use unsegen::widget::*;

use super::command::CommandParser;

const NORMAL_MODE_HINT: &str =
    "h/l day  j/k week  H/L month  t today  v view  : command  q quit";

struct StatusLine<'a> {
    context: &'a Context,
}

impl Widget for StatusLine<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let mut cursor = Cursor::new(&mut window);

        match &self.context.last_error_message {
            Some(message) => {
                cursor.set_style_modifier(self.context.theme().error_style);
                cursor.write(message);
            }
            None => {
                cursor.set_style_modifier(self.context.theme().day_style);
                cursor.write(&format!(
                    "[{}] {}",
                    self.context.tracker().view().name(),
                    NORMAL_MODE_HINT
                ));
            }
        }
    }
}

pub struct App {
    context: Context,
}

impl App {
    pub fn new(context: Context) -> App {
        App { context }
    }

    fn bottom_bar<'w>(&'w self) -> impl Widget + 'w {
        let spacer = " ".with_demand(|_| Demand2D {
            width: ColDemand::exact(1),
            height: RowDemand::exact(1),
        });

        let mut layout = HLayout::new()
            .separator(GraphemeCluster::try_from(' ').unwrap())
            .widget(spacer);

        if self.context.mode == Mode::Command {
            layout = layout.widget(self.context.command_line.as_widget());
        } else {
            layout = layout.widget(StatusLine {
                context: &self.context,
            });
        }

        layout
    }

    fn as_widget<'w>(&'w self) -> impl Widget + 'w {
        VLayout::new()
            .widget(GoalWindow::new(&self.context))
            .widget(CalendarWindow::new(&self.context))
            .widget(self.bottom_bar())
    }

    fn reload_meals(&mut self) {
        if let Err(err) = self.context.reload_meals() {
            log::warn!("Keeping previous meals: {}", err);
            self.context.report_error(err);
        }
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut run = true;

        while run {
            // Handle events
            match dispatcher.next() {
                Ok(Event::Update) => self.context.update(),
                Ok(Event::ExternalModification) => self.reload_meals(),
                Ok(Event::Signal(signal)) => log::debug!("Received {:?}", signal),
                Ok(Event::Input(input)) => {
                    if input.matches(Key::Esc) {
                        self.context.mode = Mode::Normal;
                        self.context.clear_error();
                    } else {
                        match self.context.mode {
                            Mode::Normal => {
                                input
                                    .chain((Key::Char('q'), || run = false))
                                    .chain((Key::Char(':'), || {
                                        self.context.mode = Mode::Command
                                    }))
                                    .chain((Key::Char('t'), || {
                                        self.context.tracker_mut().select_today()
                                    }))
                                    .chain((Key::Char('v'), || {
                                        self.context.tracker_mut().toggle_view()
                                    }))
                                    .chain((Key::Char('L'), || {
                                        self.context.tracker_mut().next_month(1)
                                    }))
                                    .chain((Key::Char('H'), || {
                                        self.context.tracker_mut().prev_month(1)
                                    }))
                                    .chain(
                                        NavigateBehavior::new(&mut CursorBehaviour(
                                            &mut self.context,
                                        ))
                                        .down_on(Key::Char('j'))
                                        .up_on(Key::Char('k'))
                                        .left_on(Key::Char('h'))
                                        .right_on(Key::Char('l')),
                                    )
                                    .finish();
                            }
                            Mode::Command => {
                                input
                                    .chain(CommandParser::new(&mut self.context))
                                    .chain(
                                        EditBehavior::new(&mut self.context.command_line)
                                            .delete_forwards_on(Key::Delete)
                                            .delete_backwards_on(Key::Backspace)
                                            .left_on(Key::Left)
                                            .right_on(Key::Right),
                                    )
                                    .chain(
                                        ScrollBehavior::new(&mut self.context.command_line)
                                            .backwards_on(Key::Up)
                                            .forwards_on(Key::Down),
                                    )
                                    .finish();
                            }
                        }
                    }
                }
                Err(_) => {
                    log::info!("Event sources closed, exiting");
                    run = false;
                }
            }

            // Draw
            let root = term.create_root_window();
            self.as_widget().draw(root, RenderingHints::new());
            term.present();
        }

        Ok(())
    }
}

struct CursorBehaviour<'a>(&'a mut Context);

impl Navigatable for CursorBehaviour<'_> {
    fn move_down(&mut self) -> OperationResult {
        self.0.tracker_mut().move_cursor(7);
        Ok(())
    }

    fn move_left(&mut self) -> OperationResult {
        self.0.tracker_mut().move_cursor(-1);
        Ok(())
    }

    fn move_right(&mut self) -> OperationResult {
        self.0.tracker_mut().move_cursor(1);
        Ok(())
    }

    fn move_up(&mut self) -> OperationResult {
        self.0.tracker_mut().move_cursor(-7);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateKey;
    use crate::tracker::Tracker;
    use chrono::Month;

    #[test]
    fn cursor_moves_by_days_and_weeks() {
        let today = DateKey::new(2024, Month::February, 28).unwrap();
        let mut context = Context::new(Tracker::new(today, 2000.0));

        {
            let mut behaviour = CursorBehaviour(&mut context);
            behaviour.move_right().unwrap();
            behaviour.move_right().unwrap();
        }
        assert_eq!(
            context.tracker().cursor(),
            DateKey::new(2024, Month::March, 1).unwrap()
        );
        assert_eq!(context.tracker().period().month(), Month::March);

        {
            let mut behaviour = CursorBehaviour(&mut context);
            behaviour.move_up().unwrap();
            behaviour.move_left().unwrap();
        }
        assert_eq!(
            context.tracker().cursor(),
            DateKey::new(2024, Month::February, 22).unwrap()
        );

        CursorBehaviour(&mut context).move_down().unwrap();
        assert_eq!(
            context.tracker().cursor(),
            DateKey::new(2024, Month::February, 29).unwrap()
        );
    }
}
