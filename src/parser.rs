// Response parser: turns the model's `Stat = Points` reply into deltas
// applied to a record. Nothing here prints; the caller gets a report of
// what happened on each line and decides how to show it.

use crate::stats::{Stat, StatRecord};

/// Separates the stat name from its points on a reply line.
pub const SEPARATOR: char = '=';

/// What the parser made of one non-empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A known stat received a delta.
    Updated { stat: Stat, delta: i64 },
    /// Well-formed line naming a stat we don't track.
    UnknownStat { name: String },
    /// The right-hand side is not an integer.
    BadValue { line: String },
    /// No separator: explanatory text from the model.
    Info { line: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub outcomes: Vec<LineOutcome>,
}

impl ParseReport {
    /// True when at least one line changed a stat.
    pub fn updated_any(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, LineOutcome::Updated { .. }))
    }

    /// Deltas in the order they were applied.
    pub fn updates(&self) -> impl Iterator<Item = (Stat, i64)> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            LineOutcome::Updated { stat, delta } => Some((*stat, *delta)),
            _ => None,
        })
    }
}

/// Classify a single line without touching any record. Blank lines yield
/// `None`.
pub fn parse_line(raw: &str) -> Option<LineOutcome> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let Some((name, points)) = line.split_once(SEPARATOR) else {
        return Some(LineOutcome::Info { line: line.to_string() });
    };

    let delta = match points.trim().parse::<i64>() {
        Ok(d) => d,
        Err(_) => return Some(LineOutcome::BadValue { line: line.to_string() }),
    };

    let name = name.trim();
    Some(match Stat::from_name(name) {
        Some(stat) => LineOutcome::Updated { stat, delta },
        None => LineOutcome::UnknownStat { name: name.to_string() },
    })
}

/// Apply every recognised line of `text` to `record`. Repeated mentions of
/// a stat accumulate; values are not checked against any rubric.
pub fn apply_response(text: &str, record: &mut StatRecord) -> ParseReport {
    let mut report = ParseReport::default();
    for outcome in text.lines().filter_map(parse_line) {
        match &outcome {
            LineOutcome::Updated { stat, delta } => record.add(*stat, *delta),
            LineOutcome::UnknownStat { name } => {
                log::debug!("Model suggested unknown stat '{}'", name)
            }
            LineOutcome::BadValue { line } => log::debug!("Unparsable reply line '{}'", line),
            LineOutcome::Info { .. } => {}
        }
        report.outcomes.push(outcome);
    }
    report
}
