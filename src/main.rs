//! tcurses-demo - small programs exercising the tcurses library
//!
//! # Usage
//!
//! ```text
//! tcurses-demo print     # centered text and the screen size
//! tcurses-demo color     # color pairs and backgrounds
//! tcurses-demo pad       # scroll a pad larger than the screen
//! tcurses-demo mouse     # report mouse clicks until 'q'
//! ```
//!
//! Settings are read from `~/.tcurses/config.toml`; logs go to
//! `~/.tcurses/tcurses.log`.

use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tcurses::{
    color_pair, curses_version, Attr, Color, Config, CursesError, CrosstermBackend, Input, Key, MouseMask,
    PadView, Screen,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Demo {
    Print,
    Color,
    Pad,
    Mouse,
}

fn print_help() {
    eprintln!("{} - curses library demos", curses_version());
    eprintln!();
    eprintln!("Usage: tcurses-demo [DEMO]");
    eprintln!();
    eprintln!("Demos:");
    eprintln!("  print (default)       Print text at computed positions");
    eprintln!("  color                 Color pairs, backgrounds and a rejected pair");
    eprintln!("  pad                   Scroll a 100-line pad with the arrow keys");
    eprintln!("  mouse                 Report mouse clicks");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Log level: [log] level in config.toml, or TCURSES_LOG");
}

fn parse_args() -> Result<Option<Demo>, String> {
    let mut demo = Demo::Print;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "print" => demo = Demo::Print,
            "color" => demo = Demo::Color,
            "pad" => demo = Demo::Pad,
            "mouse" => demo = Demo::Mouse,
            "-v" | "--version" => {
                eprintln!("{}", curses_version());
                return Ok(None);
            }
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(Some(demo))
}

fn init_logging(config: &Config) {
    let Some(log_path) = Config::log_path() else {
        return;
    };
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("TCURSES_LOG")
            .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let demo = match parse_args() {
        Ok(Some(demo)) => demo,
        Ok(None) => return Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let config = Config::load();
    init_logging(&config);
    info!("tcurses-demo starting: {:?}", demo);

    let screen = Screen::init_with(CrosstermBackend::new(), &config)
        .context("Failed to enter curses mode")?;
    let result = match demo {
        Demo::Print => run_print(&screen),
        Demo::Color => run_color(&screen),
        Demo::Pad => run_pad(&screen),
        Demo::Mouse => run_mouse(&screen),
    };
    screen.end().context("Failed to restore the terminal")?;

    if let Err(ref e) = result {
        error!("Demo failed: {:#}", e);
    }
    result
}

fn run_print(screen: &Screen) -> anyhow::Result<()> {
    let stdscr = screen.stdscr();
    let (rows, cols) = stdscr.max_yx();
    let msg = "Just a string ";
    stdscr.print((rows / 2, (cols - msg.len() as i32) / 2), msg)?;
    stdscr.print(
        rows - 3,
        format_args!("This screen has {} rows and {} columns. ", rows, cols),
    )?;
    stdscr.print(
        rows - 2,
        "Try resizing your terminal window and then run this program again.",
    )?;
    stdscr.refresh()?;
    stdscr.get_char(())?;
    Ok(())
}

fn run_color(screen: &Screen) -> anyhow::Result<()> {
    let stdscr = screen.stdscr();
    if !screen.has_colors() {
        stdscr.print((), "This terminal has no colors.")?;
        stdscr.refresh()?;
        stdscr.get_char(())?;
        return Ok(());
    }
    screen.start_color()?;
    screen.raw(true)?;
    screen.echo(true);
    screen.init_pair(1, Color::BLUE, Color::WHITE)?;
    screen.init_pair(2, Color::BLACK, Color::CYAN)?;

    if let Err(e) = screen.init_pair(screen.color_pairs(), Color::BLACK, Color::CYAN) {
        stdscr.print((), format_args!("An intentional error: {}", e))?;
    }

    stdscr.keypad(true);
    stdscr.print((12, 30), "Hello, World!!!")?;
    stdscr.refresh()?;
    stdscr.get_char(())?;

    stdscr.background(color_pair(2))?;
    stdscr.color_on(1)?;
    stdscr.print((13, 30), "Hello, World in Color!!!")?;
    stdscr.color_off(1)?;
    stdscr.attr_on(Attr::BOLD)?;
    stdscr.print((14, 30), "...and in bold.")?;
    stdscr.attr_off(Attr::BOLD)?;
    stdscr.refresh()?;
    stdscr.get_char(())?;
    Ok(())
}

fn run_pad(screen: &Screen) -> anyhow::Result<()> {
    const PAD_LINES: i32 = 100;

    let stdscr = screen.stdscr();
    screen.cbreak(true)?;
    screen.echo(false);
    stdscr.keypad(true);
    stdscr.print(0, "Arrow keys or PgUp/PgDn scroll, 'q' quits")?;
    stdscr.refresh()?;

    let (rows, cols) = (screen.lines(), screen.cols());
    let pad = screen.new_pad(PAD_LINES, cols)?;
    for y in 0..PAD_LINES {
        if y % 10 == 0 {
            pad.attr_on(Attr::REVERSE)?;
        }
        pad.print(y, format_args!("{:3}: pad line", y))?;
        pad.attr_off(Attr::REVERSE)?;
    }

    let visible = (rows - 1).max(1);
    let max_top = (PAD_LINES - visible).max(0);
    let mut top = 0;
    loop {
        pad.refresh(PadView::new(top, 0, 1, 0, rows - 1, cols - 1))?;
        let input = match stdscr.get_char(()) {
            Err(CursesError::NoEvent) => continue,
            other => other?,
        };
        match input {
            Input::Char('q') => break,
            Input::Key(Key::UP) => top = (top - 1).max(0),
            Input::Key(Key::DOWN) => top = (top + 1).min(max_top),
            Input::Key(Key::PAGE_UP) => top = (top - visible).max(0),
            Input::Key(Key::PAGE_DOWN) => top = (top + visible).min(max_top),
            Input::Key(Key::RESIZE) => return Ok(()),
            _ => {}
        }
    }
    pad.delete()?;
    Ok(())
}

fn run_mouse(screen: &Screen) -> anyhow::Result<()> {
    let stdscr = screen.stdscr();
    screen.cbreak(true)?;
    screen.echo(false);
    stdscr.keypad(true);
    if !screen.has_mouse() {
        stdscr.print((), "This terminal reports no mouse events.")?;
        stdscr.refresh()?;
        stdscr.get_char(())?;
        return Ok(());
    }

    let granted = screen.mouse_mask(MouseMask::ALL);
    stdscr.print(0, format_args!("Mouse events granted: {:?}", granted))?;
    stdscr.print(1, "Click anywhere, 'q' quits")?;
    stdscr.refresh()?;

    loop {
        let input = match stdscr.get_char(()) {
            Err(CursesError::NoEvent) => continue,
            other => other?,
        };
        match input {
            Input::Char('q') => break,
            Input::Key(Key::MOUSE) => {
                let event = screen.get_mouse()?;
                stdscr.print(3, format_args!("{:?} at ({}, {})", event.bstate, event.y, event.x))?;
                stdscr.clear_to_eol()?;
                if stdscr.enclose(event.y, event.x) {
                    stdscr.add_char((event.y, event.x), '*')?;
                }
                stdscr.refresh()?;
            }
            _ => {}
        }
    }
    Ok(())
}
