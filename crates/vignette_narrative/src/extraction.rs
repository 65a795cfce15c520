//! Scene extraction from assistant replies.
//!
//! The language model is asked to write scenes as
//!
//! ```text
//! **Scene 1: Title**
//! Visual Prompt: rendering instruction, possibly
//! wrapped over several lines
//! Context: narrative text, possibly multi-line
//! ```
//!
//! The output is not contractually structured, so extraction is best-effort:
//! well-formed blocks become [`Scene`]s, everything else is skipped silently.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, instrument, trace};
use vignette_core::Scene;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Scene (\d+): ([^*]+)\*\*").expect("Valid heading regex"));

// "Context:" optionally preceded by up to two label words, e.g. "Historical Learning Context:".
static CONTEXT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z]+ ){0,2}Context:(.*)$").expect("Valid context label regex")
});

const VISUAL_LABEL: &str = "Visual Prompt:";
const HEADING_PREFIX: &str = "**Scene";

/// Parses `**Scene N: Title**` / `Visual Prompt:` / `Context:` blocks.
///
/// # Examples
///
/// ```
/// use vignette_narrative::SceneExtractor;
///
/// let text = "**Scene 1: Dawn at the Docks**\n\
///             Visual Prompt: A fisherman mending nets, 1906\n\
///             Context: The city wakes before the quake.";
/// let scenes = SceneExtractor::new().extract(text);
/// assert_eq!(scenes.len(), 1);
/// assert_eq!(scenes[0].title, "Dawn at the Docks");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneExtractor;

impl SceneExtractor {
    /// Create an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract every well-formed scene block in order of appearance.
    ///
    /// Returns an empty list when nothing matches. Blocks missing their visual
    /// prompt or context are dropped, as are repeats of an already-seen scene number.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn extract(&self, text: &str) -> Vec<Scene> {
        let headings: Vec<_> = HEADING.captures_iter(text).collect();
        let mut scenes = Vec::with_capacity(headings.len());
        let mut seen = HashSet::new();

        for (index, caps) in headings.iter().enumerate() {
            let (Some(whole), Some(number), Some(title)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let block_end = headings
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            let block = &text[whole.end()..block_end];

            let Ok(scene_number) = number.as_str().parse::<u32>() else {
                debug!(raw = number.as_str(), "Scene number out of range, skipping");
                continue;
            };
            if scene_number == 0 {
                debug!("Scene number 0 is not a valid position, skipping");
                continue;
            }
            let title = collapse(title.as_str());
            if title.is_empty() {
                continue;
            }

            let Some((visual_prompt, context)) = parse_block(block) else {
                debug!(scene_number, "Incomplete scene block, skipping");
                continue;
            };
            if !seen.insert(scene_number) {
                debug!(scene_number, "Duplicate scene number, keeping first");
                continue;
            }

            trace!(scene_number, title = %title, "Extracted scene");
            scenes.push(Scene::new(scene_number, title, visual_prompt, context));
        }

        debug!(count = scenes.len(), "Scene extraction finished");
        scenes
    }
}

/// Split a heading's trailing block into its visual prompt and context paragraphs.
fn parse_block(block: &str) -> Option<(String, String)> {
    let rest = block.trim_start().strip_prefix(VISUAL_LABEL)?;
    let mut lines = rest.lines();

    let first = lines.next()?.trim();
    if first.is_empty() {
        return None;
    }
    let mut visual = vec![first];

    // Visual paragraph runs until the context label; a blank line may separate them.
    let mut context_head = None;
    let mut paragraph_closed = false;
    for line in lines.by_ref() {
        let trimmed = line.trim();
        if let Some(caps) = CONTEXT_LABEL.captures(trimmed) {
            context_head = caps.get(1).map(|m| m.as_str().trim().to_string());
            break;
        }
        if trimmed.is_empty() {
            paragraph_closed = true;
            continue;
        }
        if paragraph_closed || trimmed.starts_with(HEADING_PREFIX) {
            return None;
        }
        visual.push(trimmed);
    }

    let context_head = context_head.filter(|head| !head.is_empty())?;
    let mut context = vec![context_head];
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(HEADING_PREFIX) {
            break;
        }
        context.push(trimmed.to_string());
    }

    Some((visual.join(" "), context.join(" ")))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
