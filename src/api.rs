// API client module: a small blocking HTTP client for the Gemini
// text-generation REST endpoint. One client is built per run from the
// `Config` and handed to whatever needs to talk to the model.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MODELS_PAGE_SIZE: u32 = 1000;

/// Coarse category of a failed call, taken from the structured error body
/// when the server sends one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    RateLimited,
    PermissionDenied,
    NotFound,
    InvalidArgument,
    /// The call succeeded but carried no text.
    EmptyResponse,
    /// Connection, TLS or timeout failure before a response arrived.
    Transport,
    Unknown,
}

impl ApiErrorKind {
    /// Map a Google RPC status name (`error.status` in the body).
    pub fn from_rpc_status(status: &str) -> Option<Self> {
        match status {
            "RESOURCE_EXHAUSTED" => Some(ApiErrorKind::RateLimited),
            "PERMISSION_DENIED" | "UNAUTHENTICATED" => Some(ApiErrorKind::PermissionDenied),
            "NOT_FOUND" => Some(ApiErrorKind::NotFound),
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" => Some(ApiErrorKind::InvalidArgument),
            _ => None,
        }
    }

    pub fn from_http_status(code: u16) -> Self {
        match code {
            429 => ApiErrorKind::RateLimited,
            401 | 403 => ApiErrorKind::PermissionDenied,
            404 => ApiErrorKind::NotFound,
            400 => ApiErrorKind::InvalidArgument,
            _ => ApiErrorKind::Unknown,
        }
    }
}

/// Error returned by the text-generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status code, if a response arrived.
    pub http_status: Option<u16>,
    /// RPC status name from the error body, e.g. `RESOURCE_EXHAUSTED`.
    pub rpc_status: Option<String>,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.http_status {
            write!(f, "{} ", code)?;
        }
        if let Some(status) = &self.rpc_status {
            write!(f, "{}: ", status)?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            http_status: None,
            rpc_status: None,
            message: message.into(),
        }
    }

    /// Build an error from a non-success response. The RPC status in the
    /// body wins over the HTTP code; a body that isn't the usual JSON
    /// envelope is kept verbatim as the message.
    pub fn from_response_body(http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(env) => {
                let kind = env
                    .error
                    .status
                    .as_deref()
                    .and_then(ApiErrorKind::from_rpc_status)
                    .unwrap_or_else(|| ApiErrorKind::from_http_status(http_status));
                ApiError {
                    kind,
                    http_status: Some(http_status),
                    rpc_status: env.error.status,
                    message: env.error.message,
                }
            }
            Err(_) => ApiError {
                kind: ApiErrorKind::from_http_status(http_status),
                http_status: Some(http_status),
                rpc_status: None,
                message: body.trim().to_string(),
            },
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        ApiError::new(ApiErrorKind::Transport, err.to_string())
    }
}

/// Anything that can turn a prompt into text. The session only depends on
/// this, so tests can stand in for the network.
pub trait TextModel {
    /// Model identifier, used in diagnostics.
    fn model_name(&self) -> &str;

    /// Send one prompt and return the reply text, trimmed.
    fn generate(&self, prompt: &str) -> std::result::Result<String, ApiError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartOut<'a>>,
}

#[derive(Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Deserialize, Debug)]
struct PartIn {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> std::result::Result<String, ApiError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let why = match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => format!("response contained no text (blocked: {})", reason),
                None => "response contained no text".to_string(),
            };
            return Err(ApiError::new(ApiErrorKind::EmptyResponse, why));
        }
        Ok(text.trim().to_string())
    }
}

/// A model entry from the `models` listing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }

    /// One-line description for listings.
    pub fn summary(&self) -> String {
        let methods = self.supported_generation_methods.join(", ");
        match self.display_name.as_deref().filter(|d| !d.is_empty()) {
            Some(display) => format!("{} [{}] (Methods: {})", self.name, display, methods),
            None => format!("{} (Methods: {})", self.name, methods),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Blocking Gemini client: the reqwest client (with the key baked into its
/// default headers), the API base URL and the model to call.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_model(config, &config.model)
    }

    /// Same credentials and endpoint, different model.
    pub fn with_model(config: &Config, model: &str) -> Result<Self> {
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::Config("API key contains characters not allowed in a header".into()))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(GeminiClient {
            client,
            base_url: config.api_base.clone(),
            model: model_id(model).to_string(),
        })
    }

    /// List every model the key can see, following pagination.
    pub fn list_models(&self) -> std::result::Result<Vec<ModelInfo>, ApiError> {
        let url = format!("{}/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .get(&url)
                .query(&[("pageSize", MODELS_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }
            log::debug!("GET {} (page token: {:?})", url, page_token);

            let res = req.send().map_err(ApiError::transport)?;
            let page: ListModelsResponse = read_json(res)?;
            models.extend(page.models);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(models)
    }
}

impl TextModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> std::result::Result<String, ApiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![PartOut { text: prompt }],
            }],
        };
        log::debug!("POST {} ({} prompt bytes)", url, prompt.len());

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(ApiError::transport)?;
        let reply: GenerateResponse = read_json(res)?;
        reply.into_text()
    }
}

/// Models `apicheck` looks for, in order of preference.
pub const PREFERRED_MODELS: [&str; 3] = ["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"];

pub const GENERATE_METHOD: &str = "generateContent";

/// First model, by preference order, whose name contains a preferred name
/// and which supports text generation.
pub fn find_compatible_model<'a>(models: &'a [ModelInfo], preferred: &[&str]) -> Option<&'a ModelInfo> {
    preferred.iter().find_map(|target| {
        models
            .iter()
            .find(|m| m.name.contains(*target) && m.supports(GENERATE_METHOD))
    })
}

/// Strip an optional `models/` prefix so both spellings work.
pub fn model_id(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

fn read_json<T: for<'de> Deserialize<'de>>(res: Response) -> std::result::Result<T, ApiError> {
    let status = res.status();
    let body = res.text().map_err(ApiError::transport)?;
    if !status.is_success() {
        log::debug!("Request failed with {}: {}", status, body);
        return Err(ApiError::from_response_body(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| {
        ApiError::new(
            ApiErrorKind::Unknown,
            format!("failed to parse response json: {}", e),
        )
    })
}
