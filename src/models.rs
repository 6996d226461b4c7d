//! Data models and structures
//!
//! Defines chat history, image sizing, the learner profile injected into the
//! tutor prompt, Together API payloads, and runtime configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Target pixel dimensions for a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

/// One exchange in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user_message: String,
    pub assistant_text: String,
}

/// Append-only record of a chat session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    pub fn push(&mut self, user_message: String, assistant_text: String) {
        self.turns.push(ChatTurn {
            user_message,
            assistant_text,
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// What the tutor is told about the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerProfile {
    pub language: String,
    pub proficiency: String,
    pub recent_challenges: String,
    pub follow_up_topics: String,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            proficiency: "Intermediate".to_string(),
            recent_challenges: "not_recorded_any_yet".to_string(),
            follow_up_topics: "not_predicted_any_yet".to_string(),
        }
    }
}

// Together API Request/Response models (OpenAI-compatible)
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub steps: u32,
    pub n: u32,
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz";
pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct-Lite";
pub const DEFAULT_IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";
pub const DEFAULT_IMAGE_STEPS: u32 = 2;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_steps: u32,
    pub image_size: ImageSize,
    pub scratch_image: PathBuf,
    pub results_dir: PathBuf,
    pub prompts_dir: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
    pub learner: LearnerProfile,
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// An explicit `api_key` (from the command line) wins over
    /// `TOGETHER_API_KEY`.
    pub fn from_env(api_key: Option<String>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(api_key, |key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(api_key: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| var("TOGETHER_API_KEY"))
            .ok_or_else(|| {
                Error::Config("API key not set (pass --api-key or set TOGETHER_API_KEY)".to_string())
            })?;

        let defaults = LearnerProfile::default();
        let learner = LearnerProfile {
            language: var("LEARNER_LANGUAGE").unwrap_or(defaults.language),
            proficiency: var("LEARNER_PROFICIENCY").unwrap_or(defaults.proficiency),
            recent_challenges: var("LEARNER_RECENT_CHALLENGES")
                .unwrap_or(defaults.recent_challenges),
            follow_up_topics: var("LEARNER_FOLLOW_UP_TOPICS").unwrap_or(defaults.follow_up_topics),
        };

        let default_size = ImageSize::default();

        Ok(Self {
            api_key,
            base_url: var("TOGETHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            chat_model: var("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model: var("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            image_steps: parse_positive(var("IMAGE_STEPS"), "IMAGE_STEPS")?
                .unwrap_or(DEFAULT_IMAGE_STEPS),
            image_size: ImageSize {
                width: parse_positive(var("IMAGE_WIDTH"), "IMAGE_WIDTH")?
                    .unwrap_or(default_size.width),
                height: parse_positive(var("IMAGE_HEIGHT"), "IMAGE_HEIGHT")?
                    .unwrap_or(default_size.height),
            },
            scratch_image: var("SCRATCH_IMAGE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("image.png")),
            results_dir: var("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("results")),
            prompts_dir: var("PROMPTS_DIR").map(PathBuf::from),
            request_timeout: parse_number::<u64>(
                var("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
            )?
            .map(Duration::from_secs),
            learner,
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, name: &str) -> Result<Option<T>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", name, raw)))
        })
        .transpose()
}

fn parse_positive(value: Option<String>, name: &str) -> Result<Option<u32>> {
    match parse_number::<u32>(value, name)? {
        Some(0) => Err(Error::Config(format!("{} must be greater than zero", name))),
        parsed => Ok(parsed),
    }
}
