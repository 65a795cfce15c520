//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`vignette.toml` shipped with the library)
//! 2. `~/.config/vignette/vignette.toml`
//! 3. `./vignette.toml`

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vignette_error::{ConfigError, VignetteError, VignetteResult};

/// Generation provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct RunwayConfig {
    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Value of the `X-Runway-Version` header
    #[serde(default = "default_api_version")]
    api_version: String,
    /// Text-to-image model
    #[serde(default = "default_image_model")]
    image_model: String,
    /// Image-to-video model
    #[serde(default = "default_video_model")]
    video_model: String,
    /// Output aspect ratio for both images and clips
    #[serde(default = "default_ratio")]
    ratio: String,
    /// Clip length in seconds
    #[serde(default = "default_video_duration_secs")]
    video_duration_secs: u32,
    /// Delay between task status polls
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    /// Polls before a task counts as timed out
    #[serde(default = "default_max_polls")]
    max_polls: usize,
    /// Client-side pacing; `None` disables it
    #[serde(default = "default_requests_per_minute")]
    requests_per_minute: Option<u32>,
}

fn default_base_url() -> String {
    "https://api.dev.runwayml.com/v1".to_string()
}

fn default_api_version() -> String {
    "2024-11-06".to_string()
}

fn default_image_model() -> String {
    "gen4_image".to_string()
}

fn default_video_model() -> String {
    "gen4_turbo".to_string()
}

fn default_ratio() -> String {
    "1280:720".to_string()
}

fn default_video_duration_secs() -> u32 {
    5
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_max_polls() -> usize {
    300
}

fn default_requests_per_minute() -> Option<u32> {
    Some(20)
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            image_model: default_image_model(),
            video_model: default_video_model(),
            ratio: default_ratio(),
            video_duration_secs: default_video_duration_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

/// Generation pipeline tuning.
///
/// # Example
///
/// ```
/// use vignette_rate_limit::PipelineConfigBuilder;
///
/// let config = PipelineConfigBuilder::default()
///     .scene_delay_ms(1000u64)
///     .build()
///     .unwrap();
/// assert_eq!(*config.max_prompt_chars(), 990);
/// assert_eq!(*config.scene_delay_ms(), 1000);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct PipelineConfig {
    /// Prompts longer than this are truncated
    #[serde(default = "default_max_prompt_chars")]
    max_prompt_chars: usize,
    /// Characters kept before the `...` marker when truncating
    #[serde(default = "default_truncated_prompt_chars")]
    truncated_prompt_chars: usize,
    /// Comma-separated clauses kept by the simplified-prompt retry
    #[serde(default = "default_retry_clause_count")]
    retry_clause_count: usize,
    /// Context characters kept for the retry's video prompt
    #[serde(default = "default_retry_context_chars")]
    retry_context_chars: usize,
    /// Pause between scenes
    #[serde(default)]
    scene_delay_ms: u64,
    /// Feed scene 1's image to later scenes as a style reference
    #[serde(default)]
    use_reference_image: bool,
}

fn default_max_prompt_chars() -> usize {
    990
}

fn default_truncated_prompt_chars() -> usize {
    897
}

fn default_retry_clause_count() -> usize {
    3
}

fn default_retry_context_chars() -> usize {
    100
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: default_max_prompt_chars(),
            truncated_prompt_chars: default_truncated_prompt_chars(),
            retry_clause_count: default_retry_clause_count(),
            retry_context_chars: default_retry_context_chars(),
            scene_delay_ms: 0,
            use_reference_image: false,
        }
    }
}

/// History store limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StorageConfig {
    /// Conversations kept before the oldest are evicted
    #[serde(default = "default_max_conversations")]
    max_conversations: usize,
    /// Personas kept before the oldest are evicted
    #[serde(default = "default_max_personas")]
    max_personas: usize,
}

fn default_max_conversations() -> usize {
    50
}

fn default_max_personas() -> usize {
    100
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_conversations: default_max_conversations(),
            max_personas: default_max_personas(),
        }
    }
}

/// Language-model context budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatConfig {
    /// Token budget for system prompt plus history
    #[serde(default = "default_max_context_tokens")]
    max_context_tokens: usize,
    /// Characters counted as one token when estimating
    #[serde(default = "default_chars_per_token")]
    chars_per_token: usize,
}

fn default_max_context_tokens() -> usize {
    3000
}

fn default_chars_per_token() -> usize {
    4
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            chars_per_token: default_chars_per_token(),
        }
    }
}

/// Top-level Vignette configuration.
///
/// # Example
///
/// ```no_run
/// use vignette_rate_limit::VignetteConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = VignetteConfig::load()?;
/// println!("Image model: {}", config.runway().image_model());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct VignetteConfig {
    /// Generation provider
    #[serde(default)]
    runway: RunwayConfig,
    /// Pipeline tuning
    #[serde(default)]
    pipeline: PipelineConfig,
    /// History store limits
    #[serde(default)]
    storage: StorageConfig,
    /// Context window budget
    #[serde(default)]
    chat: ChatConfig,
}

impl VignetteConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> VignetteResult<Self> {
        debug!("Loading configuration from file");
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                VignetteError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                VignetteError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and skipped when missing.
    #[instrument]
    pub fn load() -> VignetteResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../vignette.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/vignette/vignette.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("vignette").required(false));

        builder
            .build()
            .map_err(|e| {
                VignetteError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                VignetteError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Replace the pipeline section.
    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the provider section.
    pub fn with_runway(mut self, runway: RunwayConfig) -> Self {
        self.runway = runway;
        self
    }
}
