use unsegen::input::*;

use nom::{
    character::complete::*,
    combinator::*,
    sequence::{preceded, tuple},
    IResult,
};

use super::context::{Context, Mode};
use crate::error::{Error, ErrorKind, Result};
use crate::tracker::ViewMode;

pub struct CommandParser<'a> {
    context: &'a mut Context,
}

/// Splits `[count]name [argument]`.
fn command_line(input: &str) -> IResult<&str, (&str, &str, Option<&str>)> {
    all_consuming(tuple((
        digit0,
        alpha1,
        opt(preceded(space1, rest)),
    )))(input)
}

fn find_action(name: &str) -> Option<&'static Action> {
    COMMANDS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, action)| action)
}

impl<'a> CommandParser<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        CommandParser { context }
    }

    pub fn run_command(&mut self, cmd: &str) -> Result<()> {
        let (_, (repeat, name, arg)) = command_line(cmd.trim())?;
        let arg = arg.map(str::trim).filter(|arg| !arg.is_empty());

        let action = find_action(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownCommand, name))?;

        match (action, arg) {
            (Action::Repeatable(a), None) => {
                let repeats = if repeat.is_empty() {
                    1
                } else {
                    repeat.parse::<u32>().map_err(|_| {
                        Error::new(ErrorKind::InvalidArgument, &format!("bad count '{}'", repeat))
                    })?
                };
                a(self.context, repeats)
            }
            (Action::Arg(a), Some(arg)) if repeat.is_empty() => a(self.context, arg),
            (Action::NoArg(a), None) if repeat.is_empty() => a(self.context),
            (Action::Arg(_), None) => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("'{}' needs an argument", name),
            )),
            _ => Err(Error::new(
                ErrorKind::CommandParse,
                &format!("'{}' takes no count or argument", name),
            )),
        }
    }
}

impl Behavior for CommandParser<'_> {
    fn input(mut self, input: Input) -> Option<Input> {
        if let Event::Key(key) = input.event {
            match key {
                Key::Char('\n') => {
                    let cmd = self.context.command_line.finish_line().to_owned();
                    if let Err(e) = self.run_command(&cmd) {
                        log::debug!("Command '{}' failed: {}", cmd, e);
                        self.context.report_error(e);
                    } else {
                        self.context.clear_error();
                        self.context.mode = Mode::Normal;
                    }
                    None
                }
                _ => Some(input),
            }
        } else {
            Some(input)
        }
    }
}

pub type ActionResult = Result<()>;

pub enum Action {
    Arg(fn(&mut Context, &str) -> ActionResult),
    NoArg(fn(&mut Context) -> ActionResult),
    Repeatable(fn(&mut Context, u32) -> ActionResult),
}

static COMMANDS: &[(&str, Action)] = &[
    (
        "next",
        Action::Repeatable(|c, n| {
            c.tracker_mut().next_month(n);
            Ok(())
        }),
    ),
    (
        "prev",
        Action::Repeatable(|c, n| {
            c.tracker_mut().prev_month(n);
            Ok(())
        }),
    ),
    (
        "today",
        Action::NoArg(|c| {
            c.tracker_mut().select_today();
            Ok(())
        }),
    ),
    (
        "goal",
        Action::Arg(|c, arg| {
            let goal = arg.parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    &format!("'{}' is not a number", arg),
                )
            })?;
            c.tracker_mut().set_goal(goal)
        }),
    ),
    (
        "view",
        Action::Arg(|c, arg| {
            let view = arg.parse::<ViewMode>()?;
            c.tracker_mut().set_view(view);
            Ok(())
        }),
    ),
    ("reload", Action::NoArg(|c| c.reload_meals())),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DateKey, Period};
    use crate::tracker::Tracker;
    use chrono::Month;

    fn context() -> Context {
        let today = DateKey::new(2024, Month::February, 15).unwrap();
        Context::new(Tracker::new(today, 2000.0))
    }

    #[test]
    fn splits_command_lines() {
        assert_eq!(command_line("next"), Ok(("", ("", "next", None))));
        assert_eq!(command_line("3prev"), Ok(("", ("3", "prev", None))));
        assert_eq!(
            command_line("goal 1800"),
            Ok(("", ("", "goal", Some("1800"))))
        );
        assert!(command_line("").is_err());
        assert!(command_line("12").is_err());
    }

    #[test]
    fn navigates_months() {
        let mut context = context();

        CommandParser::new(&mut context).run_command("next").unwrap();
        assert_eq!(
            context.tracker().period(),
            Period::new(2024, Month::March)
        );

        CommandParser::new(&mut context).run_command("14prev").unwrap();
        assert_eq!(
            context.tracker().period(),
            Period::new(2023, Month::January)
        );

        CommandParser::new(&mut context).run_command("today").unwrap();
        assert_eq!(
            context.tracker().period(),
            Period::new(2024, Month::February)
        );
    }

    #[test]
    fn changes_goal_and_view() {
        let mut context = context();

        CommandParser::new(&mut context)
            .run_command("goal 1800")
            .unwrap();
        assert_eq!(context.tracker().calorie_goal(), 1800.0);

        CommandParser::new(&mut context)
            .run_command("view week")
            .unwrap();
        assert_eq!(context.tracker().view(), ViewMode::Week);
    }

    #[test]
    fn rejects_bad_commands() {
        let mut context = context();
        let mut parser = CommandParser::new(&mut context);

        let err = parser.run_command("jump").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownCommand));

        let err = parser.run_command("goal lots").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidArgument));

        let err = parser.run_command("goal").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidArgument));

        assert!(parser.run_command("goal nan").is_err());
        assert!(parser.run_command("2today").is_err());
        assert!(parser.run_command("view sideways").is_err());
        assert!(parser.run_command("").is_err());

        assert_eq!(context.tracker().calorie_goal(), 2000.0);
    }

    #[test]
    fn reload_without_source_is_noop() {
        let mut context = context();
        CommandParser::new(&mut context)
            .run_command("reload")
            .unwrap();
        assert!(context.tracker().meals().is_empty());
    }
}
