// Checks which Gemini models the configured key can use for text
// generation, then makes one small test call against the best match.

use anyhow::{Context, Result};
use persona_stats::advice::Advice;
use persona_stats::api::{
    find_compatible_model, model_id, ApiError, ApiErrorKind, GeminiClient, ModelInfo, TextModel,
    PREFERRED_MODELS,
};
use persona_stats::config::{Config, API_KEY_VAR};
use persona_stats::ui;

const TEST_PROMPT: &str = "Hello, Gemini!";
const PREVIEW_CHARS: usize = 50;

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
    let client = GeminiClient::new(&config).context("Error configuring Gemini API")?;

    println!("Attempting to list available Gemini models...");
    let found = match client.list_models() {
        Ok(models) => report_models(&models),
        Err(e) => {
            report_listing_error(&e);
            None
        }
    };

    println!("\n--- Test a simple Gemini API call (if a compatible model was found) ---");
    match found {
        Some(name) => test_call(&config, &name)?,
        None => println!(
            "No suitable Gemini model was found to test content generation. \
             Please check your API key and access in Google AI Studio."
        ),
    }
    Ok(())
}

/// Print what the key can see; returns the chosen model's name.
fn report_models(models: &[ModelInfo]) -> Option<String> {
    if let Some(m) = find_compatible_model(models, &PREFERRED_MODELS) {
        println!("Access to compatible model found: {}", m.name);
        return Some(m.name.clone());
    }

    println!(
        "Your API key does NOT appear to have access to any of the recommended or \
         common Gemini models for text generation."
    );
    println!("Tried to find: {}", PREFERRED_MODELS.join(", "));
    println!("Available models:");
    for m in models {
        println!("- {}", m.summary());
    }
    println!("\nPossible reasons for no access:");
    println!("1. Your API key is incorrect or expired.");
    println!("2. You might not have been granted access to newer models.");
    println!("3. Check the Google AI Studio for your API key and its associated access.");
    println!("4. There might be region restrictions or a temporary service issue.");
    None
}

fn report_listing_error(err: &ApiError) {
    println!();
    ui::say(&format!("Error: API call failed: {}", err));
    if err.kind == ApiErrorKind::Transport {
        println!("This could be a network issue or another problem.");
        return;
    }
    match Advice::for_error(err) {
        Advice::Credential => println!("This strongly suggests your API key is invalid or lacks permissions for listing models."),
        Advice::RateLimited => println!("You've likely hit a rate limit. Try again in a few minutes."),
        _ => println!("An unexpected client error occurred."),
    }
}

fn test_call(config: &Config, name: &str) -> Result<()> {
    let client = GeminiClient::with_model(config, name).context("Error configuring Gemini API")?;
    match client.generate(TEST_PROMPT) {
        Ok(text) => {
            let preview: String = text.chars().take(PREVIEW_CHARS).collect();
            println!("Simple call to '{}' successful!", model_id(name));
            println!("Response (first {} chars): {}...", PREVIEW_CHARS, preview);
            println!("Your API key is active and has access to a compatible Gemini model for text generation.");
        }
        Err(e) if e.kind == ApiErrorKind::NotFound => {
            ui::say(&format!(
                "Error: The model '{}' could not be found or is not supported for text generation.",
                model_id(name)
            ));
            println!("Details: {}", e);
        }
        Err(e) => {
            ui::say(&format!("Error: Failed to make a simple call to {}: {}", model_id(name), e));
            match Advice::for_error(&e) {
                Advice::Credential => println!(
                    "Even though listing models might work, direct content generation might have \
                     stricter permissions or an invalid key."
                ),
                _ if e.kind == ApiErrorKind::InvalidArgument => println!(
                    "There might be an issue with the arguments provided to `generateContent` for this model."
                ),
                advice => {
                    for line in advice.lines(model_id(name)) {
                        println!("{}", line);
                    }
                }
            }
        }
    }
    Ok(())
}
