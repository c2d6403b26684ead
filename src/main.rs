// Entrypoint for the daily session.
// - Keeps `main` small: load config, build the client, run one session.
// - Configuration problems end the process; everything after that is
//   reported and the run carries on to save and print.

use anyhow::Result;
use persona_stats::api::GeminiClient;
use persona_stats::config::{Config, API_KEY_VAR};
use persona_stats::session::evaluate_and_update;
use persona_stats::stats::StatStore;
use persona_stats::ui;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::debug!("{}", e);
            ui::say(&format!("Error: {} not found in .env file.", API_KEY_VAR));
            println!(
                "Please ensure your .env file contains: {}=\"YOUR_ACTUAL_API_KEY\"",
                API_KEY_VAR
            );
            std::process::exit(1);
        }
    };

    let client = match GeminiClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            ui::say(&format!("Error configuring Gemini API: {}", e));
            println!("Your API key might be invalid or there's an issue with the configuration.");
            std::process::exit(1);
        }
    };

    run(&config, &client)
}

fn run(config: &Config, client: &GeminiClient) -> Result<()> {
    let store = StatStore::new(&config.stats_file);
    let loaded = store.load();
    ui::print_load_notices(&loaded.notices, store.path());
    ui::print_stats(&loaded.record);

    let activity_log = match ui::read_log() {
        Ok(text) => text,
        Err(e) => {
            log::debug!("Prompt aborted: {}", e);
            println!("\nExiting...");
            return Ok(());
        }
    };
    if activity_log.trim().is_empty() {
        println!("No activity logged. Exiting.");
        return Ok(());
    }

    println!();
    let evaluation = ui::with_spinner("Sending log to AI for evaluation...", || {
        evaluate_and_update(client, &activity_log, &loaded.record)
    });
    ui::print_evaluation(&evaluation, &config.model);
    let succeeded = evaluation.succeeded();
    let record = evaluation.into_record();

    println!();
    match store.save(&record) {
        Ok(()) => println!("Stats saved to {}", store.path().display()),
        Err(e) => ui::say(&format!("Error saving stats to {}: {}", store.path().display(), e)),
    }
    ui::print_stats(&record);

    if succeeded {
        println!("\nSession complete. Your stats have been updated!");
    } else {
        println!("\nSession complete. Your stats were left unchanged.");
    }
    Ok(())
}
