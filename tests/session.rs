//! Integration tests for one evaluation: prompt, call, parse, apply.

use persona_stats::advice::Advice;
use persona_stats::api::{ApiError, ApiErrorKind, TextModel};
use persona_stats::parser::{apply_response, LineOutcome};
use persona_stats::prompt::INSTRUCTIONS;
use persona_stats::session::{evaluate_and_update, Evaluation};
use persona_stats::stats::{Stat, StatRecord};
use std::cell::RefCell;

/// Stand-in model that returns a canned reply and records the prompts it saw.
struct FakeModel {
    reply: Result<String, ApiError>,
    prompts: RefCell<Vec<String>>,
}

impl FakeModel {
    fn replying(text: &str) -> Self {
        FakeModel {
            reply: Ok(text.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    fn failing(err: ApiError) -> Self {
        FakeModel {
            reply: Err(err),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl TextModel for FakeModel {
    fn model_name(&self) -> &str {
        "fake-model"
    }

    fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.reply.clone()
    }
}

fn sample_stats() -> StatRecord {
    let mut record = StatRecord::default();
    record.set(Stat::Knowledge, 5);
    record.set(Stat::Charm, 3);
    record.set(Stat::Guts, 2);
    record.set(Stat::Health, 4);
    record.set(Stat::Kindness, 1);
    record
}

#[test]
fn valid_reply_updates_named_stats() {
    let mut record = sample_stats();
    let report = apply_response("Knowledge = 2\nCharm = 1", &mut record);

    assert!(report.updated_any());
    assert_eq!(record.get(Stat::Knowledge), 7);
    assert_eq!(record.get(Stat::Charm), 4);
    assert_eq!(record.get(Stat::Guts), 2);
    assert_eq!(record.get(Stat::Health), 4);
    assert_eq!(record.get(Stat::Kindness), 1);
}

#[test]
fn unknown_stat_is_reported_and_skipped() {
    let mut record = sample_stats();
    let report = apply_response("InvalidStat = 2", &mut record);

    assert_eq!(record, sample_stats());
    assert!(!report.updated_any());
    assert_eq!(
        report.outcomes,
        vec![LineOutcome::UnknownStat { name: "InvalidStat".into() }]
    );
}

#[test]
fn non_integer_value_is_reported_and_skipped() {
    let mut record = sample_stats();
    let report = apply_response("Knowledge = abc\nCharm = 1", &mut record);

    assert_eq!(record.get(Stat::Knowledge), 5);
    assert_eq!(record.get(Stat::Charm), 4);
    assert_eq!(
        report.outcomes[0],
        LineOutcome::BadValue { line: "Knowledge = abc".into() }
    );
}

#[test]
fn free_text_is_informational_only() {
    let mut record = sample_stats();
    let report = apply_response(
        "This is just explanatory text\nNo valid stat updates here",
        &mut record,
    );

    assert_eq!(record, sample_stats());
    assert!(!report.updated_any());
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o, LineOutcome::Info { .. })));
}

#[test]
fn mixed_reply_applies_only_valid_lines() {
    let mut record = sample_stats();
    let report = apply_response(
        "Knowledge = 2\nThis is explanation\nCharm = 1\nInvalidStat = 3",
        &mut record,
    );

    assert_eq!(record.get(Stat::Knowledge), 7);
    assert_eq!(record.get(Stat::Charm), 4);
    assert_eq!(record.get(Stat::Guts), 2);
    assert_eq!(report.updates().collect::<Vec<_>>(), vec![(Stat::Knowledge, 2), (Stat::Charm, 1)]);
    assert_eq!(report.outcomes.len(), 4);
}

#[test]
fn evaluation_sends_instructions_and_log_once() {
    let model = FakeModel::replying("Guts = 3\nHealth = 2");
    let stats = sample_stats();

    let evaluation = evaluate_and_update(&model, "Ran a half marathon in the rain", &stats);

    let prompts = model.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with(INSTRUCTIONS));
    assert!(prompts[0].ends_with("User log: Ran a half marathon in the rain"));

    assert!(evaluation.succeeded());
    assert_eq!(evaluation.record().get(Stat::Guts), 5);
    assert_eq!(evaluation.record().get(Stat::Health), 6);
    // the caller's record is untouched
    assert_eq!(stats, sample_stats());
}

#[test]
fn failed_call_returns_original_record() {
    let model = FakeModel::failing(ApiError::from_response_body(
        429,
        r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
    ));
    let stats = sample_stats();

    let evaluation = evaluate_and_update(&model, "Read a book", &stats);

    match &evaluation {
        Evaluation::Failed { advice, error, .. } => {
            assert_eq!(*advice, Advice::RateLimited);
            assert_eq!(error.kind, ApiErrorKind::RateLimited);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(evaluation.into_record(), sample_stats());
}

#[test]
fn error_messages_map_to_advice() {
    let rate = ApiError::new(ApiErrorKind::Unknown, "RESOURCE_EXHAUSTED: Rate limit exceeded");
    let denied = ApiError::new(ApiErrorKind::Unknown, "PERMISSION_DENIED: API key not valid");
    let missing = ApiError::new(ApiErrorKind::Unknown, "model is not found");

    assert_eq!(
        Advice::for_error(&rate).lines("m"),
        vec!["You might have hit a rate limit. Wait a bit and try again."]
    );
    assert_eq!(
        Advice::for_error(&denied).lines("m"),
        vec!["Your API key might have issues. Verify permissions in Google AI Studio."]
    );
    let lines = Advice::for_error(&missing).lines("gemini-1.5-flash-latest");
    assert!(lines.iter().any(|l| l.contains("no longer be available")));
}

#[test]
fn empty_reply_error_gets_generic_advice() {
    let model = FakeModel::failing(ApiError::new(
        ApiErrorKind::EmptyResponse,
        "response contained no text",
    ));
    let evaluation = evaluate_and_update(&model, "Slept all day", &sample_stats());
    match evaluation {
        Evaluation::Failed { advice, .. } => assert_eq!(advice, Advice::Generic),
        other => panic!("expected failure, got {:?}", other),
    }
}
