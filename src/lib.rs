// Library root
// ------------
// The two binaries (`persona-stats` and `apicheck`) are thin wrappers over
// these modules.
//
// Module responsibilities:
// - `config`: environment / `.env` settings for one run.
// - `stats`: the five persona stats and their JSON file.
// - `prompt`: the instruction block sent with the user's log.
// - `api`: blocking Gemini client and its structured errors.
// - `advice`: turns a failed call into a hint for the user.
// - `parser`: applies the model's `Stat = Points` reply to a record.
// - `session`: one prompt, one call, one parse.
// - `ui`: console output and the interactive prompt.
pub mod advice;
pub mod api;
pub mod config;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod stats;
pub mod ui;
