// UI layer: console report for the stats and the evaluation, plus the
// interactive prompt for the day's log (`dialoguer`) and a spinner while
// the model call blocks (`indicatif`).
//
// The `*_lines` functions only build text, so they can be tested without a
// terminal; the `print_*` functions write it to stdout.

use crossterm::style::Stylize;
use console::Term;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use crate::api::ApiError;
use crate::parser::{LineOutcome, ParseReport};
use crate::session::Evaluation;
use crate::stats::{LoadNotice, StatRecord};

pub const STATS_HEADER: &str = "--- Current Persona Stats ---";
pub const STATS_FOOTER: &str = "---------------------------";
pub const NO_UPDATES: &str = "No valid stat updates were parsed from AI's response.";

/// Bordered block with one `Name: value` line per entry, in record order.
pub fn stats_lines(record: &StatRecord) -> Vec<String> {
    let mut lines = Vec::with_capacity(record.len() + 2);
    lines.push(STATS_HEADER.to_string());
    for (name, value) in record.iter() {
        lines.push(format!("{}: {}", name, value));
    }
    lines.push(STATS_FOOTER.to_string());
    lines
}

pub fn outcome_line(outcome: &LineOutcome) -> String {
    match outcome {
        LineOutcome::Updated { stat, delta } => format!("Updated {}: {:+} points.", stat, delta),
        LineOutcome::UnknownStat { name } => {
            format!("Warning: AI suggested unknown stat '{}'. Skipping.", name)
        }
        LineOutcome::BadValue { line } => format!("Warning: Could not parse line '{}'. Skipping.", line),
        LineOutcome::Info { line } => format!("Info: {}", line),
    }
}

/// One line per outcome, then the "nothing applied" notice if no stat moved.
pub fn report_lines(report: &ParseReport) -> Vec<String> {
    let mut lines: Vec<String> = report.outcomes.iter().map(outcome_line).collect();
    if !report.updated_any() {
        lines.push(NO_UPDATES.to_string());
    }
    lines
}

pub fn load_notice_line(notice: &LoadNotice, path: &Path) -> String {
    match notice {
        LoadNotice::Missing => format!(
            "No existing stats found. Creating {} with default stats.",
            path.display()
        ),
        LoadNotice::Corrupted { reason } => format!(
            "Warning: {} is corrupted ({}). Starting with default stats.",
            path.display(),
            reason
        ),
        LoadNotice::InvalidValue { stat } => format!(
            "Warning: {} in {} is not a number. Resetting it to 0.",
            stat,
            path.display()
        ),
        LoadNotice::Adjusted {
            stat,
            original,
            value,
        } => format!(
            "Warning: {} in {} was {}. Using {} instead.",
            stat,
            path.display(),
            original,
            value
        ),
    }
}

/// Error plus the advice lines for a failed evaluation.
pub fn failure_lines(error: &ApiError, advice_lines: Vec<String>) -> Vec<String> {
    let mut lines = vec![format!("An API error occurred: {}", error)];
    lines.extend(advice_lines);
    lines
}

fn is_warning(line: &str) -> bool {
    line.starts_with("Warning:") || line.starts_with("Error")
}

/// Print a line, coloring warnings and errors.
pub fn say(line: &str) {
    if is_warning(line) {
        println!("{}", line.yellow());
    } else {
        println!("{}", line);
    }
}

pub fn print_stats(record: &StatRecord) {
    println!();
    for line in stats_lines(record) {
        println!("{}", line);
    }
}

pub fn print_load_notices(notices: &[LoadNotice], path: &Path) {
    for notice in notices {
        say(&load_notice_line(notice, path));
    }
}

/// Print the raw reply and per-line results, or the failure and its advice.
pub fn print_evaluation(evaluation: &Evaluation, model: &str) {
    match evaluation {
        Evaluation::Applied { reply, report, .. } => {
            println!("\n--- AI Evaluation Result ---");
            println!("{}", reply);
            println!("--------------------------");
            for line in report_lines(report) {
                say(&line);
            }
        }
        Evaluation::Failed { error, advice, .. } => {
            println!();
            for line in failure_lines(error, advice.lines(model)) {
                say(&line);
            }
        }
    }
}

pub const LOG_PROMPT: &str = "Enter your log of the day to determine stat increase";

/// Ask for the day's log. Empty input is allowed and returned as-is.
///
/// `dialoguer` reads through the stderr terminal and yields nothing when
/// there isn't one, so piped input is read straight from stdin instead.
pub fn read_log() -> io::Result<String> {
    println!();
    if Term::stderr().is_term() {
        return Input::<String>::new()
            .with_prompt(LOG_PROMPT)
            .allow_empty(true)
            .interact_text();
    }
    println!("{}: ", LOG_PROMPT);
    read_log_line(io::stdin().lock())
}

/// One line from `reader` without its line ending. End of input gives an
/// empty string.
pub fn read_log_line<R: BufRead>(mut reader: R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// Run `f` with a spinner showing `message`.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}
