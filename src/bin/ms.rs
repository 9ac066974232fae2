extern crate morsel as lib;

use flexi_logger::{FileSpec, Logger};
use lib::calendar::DateKey;
use lib::events::Dispatcher;
use lib::provider::{self, MealLog, MealSource};
use lib::tracker::Tracker;
use lib::ui::{app::App, progress_bar, Context};
use nix::sys::{signal, termios};
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ms",
    about = "Morsel - A calendar based calorie tracker for the terminal."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "m",
        long = "meals",
        help = "path to the meal log",
        parse(from_os_str)
    )]
    pub meals: Option<PathBuf>,

    #[structopt(short = "g", long = "goal", help = "daily calorie goal")]
    pub goal: Option<f64>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the current month non-interactively"
    )]
    pub show: bool,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn print_overview(tracker: &Tracker) {
    let overview = tracker.month_overview();
    println!("{}", overview);
    println!("Month: {:.0} kcal", overview.total());
    println!(
        "Today: {:.0} / {:.0} kcal {} {:.0}%",
        tracker.today_total(),
        tracker.calorie_goal(),
        progress_bar(tracker.today_progress(), 20),
        tracker.today_progress() * 100.0
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    let mut config = lib::config::load_suitable_config(args.configfile.as_deref())?;
    if let Some(meals) = args.meals {
        config.meal_log = meals;
    }

    let mut tracker = Tracker::from_config(&config, DateKey::today());
    if let Some(goal) = args.goal {
        tracker.set_goal(goal)?;
    }

    if args.show {
        let meals = MealLog::new(&config.meal_log).load()?;
        print_overview(&tracker.with_meals(meals));
        return Ok(());
    }

    const STDIN: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(termios::tcgetattr(STDIN)?);

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDIN, termios::SetArg::TCSANOW, &attr);
        }

        println!("Morsel ran into a fatal error!");
        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let mut signals_to_wait = signal::SigSet::empty();
    signals_to_wait.add(signal::SIGWINCH);

    let dispatcher = Dispatcher::from_config(&config, signals_to_wait);

    let meal_log = match provider::load_meal_log(&config.meal_log, Some(dispatcher.event_sink())) {
        Ok(meal_log) => meal_log,
        Err(err) => {
            log::warn!("Not watching meal log: {}", err);
            MealLog::new(&config.meal_log)
        }
    };

    let mut context = Context::new(tracker).with_source(Box::new(meal_log));
    if let Err(err) = context.reload_meals() {
        log::error!("Could not load meals: {}", err);
        context.report_error(err);
    }

    // Setup unsegen terminal
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    let mut app = App::new(context);

    app.run(dispatcher, term)
}
