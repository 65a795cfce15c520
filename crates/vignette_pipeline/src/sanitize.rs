//! Prompt preparation for the generation service.

use derive_getters::Getters;
use vignette_core::Scene;
use vignette_rate_limit::PipelineConfig;

const TRUNCATION_MARKER: &str = "...";

/// Turns scene text into prompts the provider accepts.
///
/// Lengths are counted in characters, not bytes.
///
/// # Examples
///
/// ```
/// use vignette_core::Scene;
/// use vignette_pipeline::PromptSanitizer;
///
/// let sanitizer = PromptSanitizer::default();
/// let scene = Scene::new(1, "The Docks", "", "Ships unload at dawn.");
/// assert_eq!(sanitizer.sanitize(&scene), "The Docks - historical scene");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PromptSanitizer {
    max_prompt_chars: usize,
    truncated_prompt_chars: usize,
    retry_clause_count: usize,
    retry_context_chars: usize,
}

impl PromptSanitizer {
    /// Build a sanitizer from pipeline settings.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_prompt_chars: *config.max_prompt_chars(),
            truncated_prompt_chars: *config.truncated_prompt_chars(),
            retry_clause_count: *config.retry_clause_count(),
            retry_context_chars: *config.retry_context_chars(),
        }
    }

    /// Image prompt for a scene.
    ///
    /// A blank prompt becomes `"{title} - historical scene"`. Prompts above the
    /// ceiling keep their leading characters followed by `...`.
    pub fn sanitize(&self, scene: &Scene) -> String {
        let prompt = scene.visual_prompt.trim();
        if prompt.is_empty() {
            return format!("{} - historical scene", scene.title.trim());
        }
        self.truncate(prompt)
    }

    /// Enforce the provider's prompt ceiling.
    pub fn truncate(&self, prompt: &str) -> String {
        if prompt.chars().count() <= self.max_prompt_chars {
            return prompt.to_string();
        }
        let mut truncated: String = prompt.chars().take(self.truncated_prompt_chars).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    }

    /// Reduced prompt for the bad-output retry: the leading comma-separated clauses.
    ///
    /// ```
    /// use vignette_pipeline::PromptSanitizer;
    ///
    /// let simplified = PromptSanitizer::default()
    ///     .simplify("A harbor at dawn, fog over masts , gulls circling, oil lamps, 1906");
    /// assert_eq!(simplified, "A harbor at dawn, fog over masts, gulls circling");
    /// ```
    pub fn simplify(&self, prompt: &str) -> String {
        let simplified = prompt
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .take(self.retry_clause_count)
            .collect::<Vec<_>>()
            .join(", ");
        if simplified.is_empty() {
            prompt.trim().to_string()
        } else {
            simplified
        }
    }

    /// Motion prompt for the video step.
    pub fn video_prompt(&self, scene: &Scene) -> String {
        self.truncate(&format!("Cinematic view: {}", scene.context.trim()))
    }

    /// Motion prompt for the video step of a bad-output retry.
    pub fn retry_video_prompt(&self, scene: &Scene) -> String {
        scene
            .context
            .trim()
            .chars()
            .take(self.retry_context_chars)
            .collect()
    }
}

impl Default for PromptSanitizer {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
