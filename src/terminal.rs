//! Line-command front-end: reads commands from stdin, renders the countdown
//! and mirrors it into the terminal title.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};

use crate::{
    cycles::{commands, window_title, Controls, Countdown, CycleEvent, Remaining},
    history::{duration_label, HistoryRow},
    AppState,
};

// Set to true to log shell activity in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub const APP_NAME: &str = "Pomodoro";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellStyle {
    /// Write the countdown into the terminal title.
    pub mirror_title: bool,
    /// Colour the history status column.
    pub colors: bool,
}

const HELP: &str = "\
Commands:
  start [minutes] <task>   start a cycle (1-60 minutes)
  stop                     interrupt the running cycle
  status                   show the countdown
  history                  list cycles from this run
  help                     show this message
  quit                     exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Start { minutes: Option<u32>, task: String },
    Stop,
    Status,
    History,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => Ok(ShellCommand::Empty),
        "start" => {
            let (minutes, task) = match rest.split_once(char::is_whitespace) {
                Some((first, task)) => match first.parse::<u32>() {
                    Ok(minutes) => (Some(minutes), task.trim()),
                    Err(_) => (None, rest),
                },
                None => match rest.parse::<u32>() {
                    Ok(minutes) => (Some(minutes), ""),
                    Err(_) => (None, rest),
                },
            };
            Ok(ShellCommand::Start {
                minutes,
                task: task.to_string(),
            })
        }
        "stop" => Ok(ShellCommand::Stop),
        "status" => Ok(ShellCommand::Status),
        "history" => Ok(ShellCommand::History),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("Unknown command `{other}`. Type `help`.")),
    }
}

pub async fn run_shell(state: &AppState) -> Result<()> {
    let mut stdout = io::stdout();
    let style = ShellStyle {
        mirror_title: state.settings.timer().mirror_title,
        colors: stdout.is_terminal(),
    };
    let renderer = tokio::spawn(render_events(state.cycles.subscribe(), style));

    writeln!(stdout, "{HELP}")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(command) => {
                        if !handle_command(state, command, &mut stdout, style).await? {
                            break;
                        }
                    }
                    Err(message) => writeln!(stdout, "{message}")?,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                writeln!(stdout)?;
                break;
            }
        }
    }

    renderer.abort();
    if style.mirror_title {
        set_title(&mut stdout, APP_NAME)?;
    }
    Ok(())
}

/// Returns `false` when the shell should exit.
async fn handle_command<W: Write>(
    state: &AppState,
    command: ShellCommand,
    out: &mut W,
    style: ShellStyle,
) -> io::Result<bool> {
    log_debug!("shell command: {:?}", command);

    match command {
        ShellCommand::Empty => {}
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(false),
        ShellCommand::Start { minutes, task } => {
            let running = commands::get_cycle_state(state)
                .await
                .map(|snapshot| Controls::from_snapshot(&snapshot).inputs_disabled)
                .unwrap_or(false);
            if running {
                writeln!(out, "A cycle is already running. Type `stop` first.")?;
                return Ok(true);
            }

            let minutes = match minutes {
                Some(minutes) => minutes,
                None => match commands::get_timer_settings(state) {
                    Ok(settings) => settings.default_minutes,
                    Err(err) => {
                        writeln!(out, "{err}")?;
                        return Ok(true);
                    }
                },
            };
            if let Err(err) = commands::start_cycle(state, task, minutes).await {
                writeln!(out, "{err}")?;
            }
        }
        ShellCommand::Stop => {
            let was_running = commands::get_cycle_state(state)
                .await
                .map(|snapshot| snapshot.is_active())
                .unwrap_or(false);
            if !was_running {
                writeln!(out, "No cycle running.")?;
            } else if let Err(err) = commands::interrupt_cycle(state).await {
                writeln!(out, "{err}")?;
            }
        }
        ShellCommand::Status => match commands::get_cycle_state(state).await {
            Ok(snapshot) => match snapshot.active_cycle.as_ref() {
                Some(cycle) => writeln!(
                    out,
                    "{}  {}",
                    Countdown::from_snapshot(&snapshot).to_clock(),
                    cycle.task
                )?,
                None => writeln!(out, "No cycle running.")?,
            },
            Err(err) => writeln!(out, "{err}")?,
        },
        ShellCommand::History => match commands::list_history(state).await {
            Ok(rows) if rows.is_empty() => writeln!(out, "No cycles yet.")?,
            Ok(rows) => writeln!(out, "{}", format_history(&rows, style.colors))?,
            Err(err) => writeln!(out, "{err}")?,
        },
    }
    Ok(true)
}

async fn render_events(mut events: broadcast::Receiver<CycleEvent>, style: ShellStyle) {
    let mut stdout = io::stdout();
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(err) = render_event(&event, &mut stdout, style) {
                    log_warn!("failed to render cycle event: {err}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                log_warn!("renderer skipped {} cycle events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn render_event<W: Write>(event: &CycleEvent, out: &mut W, style: ShellStyle) -> io::Result<()> {
    match event {
        CycleEvent::Tick { remaining_secs, .. } => {
            let countdown = Countdown::from_remaining(Remaining::from_secs(*remaining_secs));
            write!(out, "\r{}  ", countdown.to_clock())?;
            if style.mirror_title {
                set_title(out, &countdown.to_clock())?;
            }
        }
        CycleEvent::CycleFinished { cycle } => {
            writeln!(
                out,
                "\rDone: {} ({})",
                cycle.task,
                duration_label(cycle.duration_minutes)
            )?;
        }
        CycleEvent::CycleInterrupted { cycle } => {
            writeln!(out, "\rInterrupted: {}", cycle.task)?;
        }
        CycleEvent::StateChanged { snapshot } => {
            if style.mirror_title {
                set_title(out, &window_title(snapshot, APP_NAME))?;
            }
            if Controls::from_snapshot(snapshot).show_stop {
                writeln!(out, "Type `stop` to interrupt.")?;
            }
        }
    }
    out.flush()
}

/// OSC 0 sets the window and icon title.
fn set_title<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    write!(out, "\x1b]0;{title}\x07")?;
    out.flush()
}

pub fn format_history(rows: &[HistoryRow], colors: bool) -> String {
    let headers = ["Task", "Duration", "Start"];
    let cells: Vec<[&str; 3]> = rows
        .iter()
        .map(|row| [row.task.as_str(), row.duration.as_str(), row.started.as_str()])
        .collect();

    let mut widths = headers.map(|header| header.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // Status is the last column, so it is never padded and escape codes
    // cannot skew the alignment.
    let format_line = |values: &[&str; 3], status: &str| {
        let mut line = values
            .iter()
            .zip(widths.iter())
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        line.push_str("  ");
        line.push_str(status);
        line
    };

    let mut lines = vec![format_line(&headers, "Status")];
    for (values, row) in cells.iter().zip(rows) {
        let status = if colors {
            format!(
                "\x1b[{}m{}\x1b[0m",
                row.status_color.ansi_code(),
                row.status_label
            )
        } else {
            row.status_label.to_string()
        };
        lines.push(format_line(values, &status));
    }
    lines.join("\n")
}
