// One evaluation: prompt the model with the day's log and apply its reply
// to a copy of the stats. The caller's record is never modified, so a
// failed call leaves nothing half-applied.

use crate::advice::Advice;
use crate::api::{ApiError, TextModel};
use crate::parser::{apply_response, ParseReport};
use crate::prompt::build_prompt;
use crate::stats::StatRecord;

#[derive(Debug, Clone)]
pub enum Evaluation {
    /// The model replied; `record` has the parsed deltas applied.
    Applied {
        reply: String,
        report: ParseReport,
        record: StatRecord,
    },
    /// The call failed; `record` is the input, unchanged.
    Failed {
        error: ApiError,
        advice: Advice,
        record: StatRecord,
    },
}

impl Evaluation {
    pub fn record(&self) -> &StatRecord {
        match self {
            Evaluation::Applied { record, .. } | Evaluation::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> StatRecord {
        match self {
            Evaluation::Applied { record, .. } | Evaluation::Failed { record, .. } => record,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, Evaluation::Applied { .. })
    }
}

/// Makes exactly one call to `model`.
pub fn evaluate_and_update<M>(model: &M, activity_log: &str, stats: &StatRecord) -> Evaluation
where
    M: TextModel + ?Sized,
{
    let prompt = build_prompt(activity_log);
    match model.generate(&prompt) {
        Ok(reply) => {
            let mut record = stats.clone();
            let report = apply_response(&reply, &mut record);
            log::debug!(
                "Applied {} update(s) from {}",
                report.updates().count(),
                model.model_name()
            );
            Evaluation::Applied {
                reply,
                report,
                record,
            }
        }
        Err(error) => {
            log::debug!("Call to {} failed: {}", model.model_name(), error);
            Evaluation::Failed {
                advice: Advice::for_error(&error),
                error,
                record: stats.clone(),
            }
        }
    }
}
