//! Persona name resolution.
//!
//! The persona's display name is inferred from unstructured assistant text with an
//! ordered chain of matchers. The first matcher that produces a name wins; when none
//! does, the resolver falls back to a generic placeholder. The order of matchers and
//! of the patterns inside them is part of the observable behavior.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};
use vignette_core::{Message, Role};

/// Name used when no matcher finds one.
pub const DEFAULT_PERSONA_NAME: &str = "Character";

/// Directive the assistant emits when it is ready to render a persona.
pub const VISUALS_DIRECTIVE: &str = "GENERATE_VISUALS:";

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)GENERATE_VISUALS:[ \t]*([^\n]+)").expect("Valid directive regex")
});

// Capitalized name of up to three words, optionally led by an article.
const NAME: &str = r"((?:(?:[Tt]he|[Aa]n?)\s+)?[A-Z][\w-]*(?:[ \t]+[A-Z][\w-]*){0,2})";

static NARRATIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i:bring)\s+([^\n.!?]+?)'s\s+(?i:story)\s+(?i:to\s+life)".to_string(),
        format!(r"(?i:visual\s+story\s+(?:of|for))\s+{NAME}"),
        format!(r"(?i:through\s+the\s+eyes\s+of)\s+{NAME}"),
        format!(r"\bI\s+am\s+{NAME}"),
        format!(r"(?i:my\s+name\s+is)\s+{NAME}"),
        format!(r"{NAME}'s\s+(?i:story|journey|perspective)"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Valid narrative regex"))
    .collect()
});

static CAPITALIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?\b").expect("Valid capitalized regex")
});

static USER_REQUEST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i:show|tell)\s+(?i:me\s+)?(?i:about\s+)?([A-Z][\w-]*(?:[ \t]+[A-Z][\w-]*)?)'s",
        r"(?i:about)\s+([A-Z][\w-]*(?:[ \t]+[A-Z][\w-]*)?)'s",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Valid request regex"))
    .collect()
});

const STOPLIST: &[&str] = &[
    "Scene", "Scenes", "Visual", "Prompt", "Context", "Historical", "History", "Learning",
    "Emperor", "Empress", "King", "Queen", "Prince", "Princess", "Lord", "Lady", "Sir",
    "Dynasty", "Empire", "Kingdom", "Phase", "Chapter", "Part", "The", "This", "That",
    "These", "Those", "Here", "There", "Ready", "Let", "Lets", "Who", "What", "When",
    "Where", "Why", "How", "Which", "My", "Our", "Your", "Their", "His", "Her", "Its",
    "We", "You", "They", "In", "On", "At", "As", "And", "But", "For", "From", "With",
    "Today", "Now", "Then", "Generate", "Visuals", "Identity", "Daily", "Life", "Impact",
    "Consequences", "Moment", "Story", "Great", "Welcome",
];

/// Strip wrapping punctuation, a trailing possessive and a leading article.
fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '*' | '"' | '\'' | '.' | ',' | '!' | '?' | ':' | ';'))
        .trim();
    let trimmed = trimmed.strip_suffix("'s").unwrap_or(trimmed);
    let mut words = trimmed.split_whitespace().peekable();
    if words
        .peek()
        .is_some_and(|first| matches!(first.to_lowercase().as_str(), "the" | "a" | "an"))
    {
        words.next();
    }
    let name = words.collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

fn directive_name(text: &str) -> Option<String> {
    DIRECTIVE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| clean_name(m.as_str()))
}

/// One rule in the resolver chain.
pub trait NameMatcher: Send + Sync {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// Try to find a name in `text`, optionally consulting earlier turns.
    fn find(&self, text: &str, conversation: &[Message]) -> Option<String>;
}

/// `GENERATE_VISUALS: <name>` directive in the reply itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveMatcher;

impl NameMatcher for DirectiveMatcher {
    fn label(&self) -> &'static str {
        "directive"
    }

    fn find(&self, text: &str, _conversation: &[Message]) -> Option<String> {
        directive_name(text)
    }
}

/// Fixed, ordered narrative phrases ("bring X's story to life", "I am X", ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativePatternMatcher;

impl NameMatcher for NarrativePatternMatcher {
    fn label(&self) -> &'static str {
        "narrative_pattern"
    }

    fn find(&self, text: &str, _conversation: &[Message]) -> Option<String> {
        NARRATIVE_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| clean_name(m.as_str()))
        })
    }
}

/// First capitalized one- or two-word phrase in the opening paragraph that is not a
/// generic noun.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedPhraseMatcher;

impl NameMatcher for CapitalizedPhraseMatcher {
    fn label(&self) -> &'static str {
        "capitalized_phrase"
    }

    fn find(&self, text: &str, _conversation: &[Message]) -> Option<String> {
        let paragraph = text.split("\n\n").find(|p| !p.trim().is_empty())?;
        CAPITALIZED
            .find_iter(paragraph)
            .map(|m| m.as_str())
            .find(|candidate| {
                candidate
                    .split_whitespace()
                    .all(|word| !STOPLIST.contains(&word))
            })
            .and_then(clean_name)
    }
}

/// Earlier turns, newest first: a directive in any turn, or "show/tell/about X's" from
/// the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationMatcher;

impl NameMatcher for ConversationMatcher {
    fn label(&self) -> &'static str {
        "conversation"
    }

    fn find(&self, _text: &str, conversation: &[Message]) -> Option<String> {
        conversation.iter().rev().find_map(|message| {
            directive_name(&message.content).or_else(|| {
                (message.role == Role::User)
                    .then(|| {
                        USER_REQUEST.iter().find_map(|pattern| {
                            pattern
                                .captures(&message.content)
                                .and_then(|caps| caps.get(1))
                                .and_then(|m| clean_name(m.as_str()))
                        })
                    })
                    .flatten()
            })
        })
    }
}

/// Ordered chain of [`NameMatcher`]s with a placeholder fallback.
///
/// # Examples
///
/// ```
/// use vignette_narrative::PersonaNameResolver;
///
/// let resolver = PersonaNameResolver::new();
/// assert_eq!(resolver.resolve("GENERATE_VISUALS: Mei Lin", &[]), "Mei Lin");
/// assert_eq!(resolver.resolve("nothing useful here", &[]), "Character");
/// ```
pub struct PersonaNameResolver {
    matchers: Vec<Box<dyn NameMatcher>>,
    fallback: String,
}

impl Default for PersonaNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PersonaNameResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaNameResolver")
            .field(
                "matchers",
                &self.matchers.iter().map(|m| m.label()).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl PersonaNameResolver {
    /// The standard chain: directive, narrative patterns, capitalized phrase,
    /// conversation history.
    pub fn new() -> Self {
        Self {
            matchers: vec![
                Box::new(DirectiveMatcher),
                Box::new(NarrativePatternMatcher),
                Box::new(CapitalizedPhraseMatcher),
                Box::new(ConversationMatcher),
            ],
            fallback: DEFAULT_PERSONA_NAME.to_string(),
        }
    }

    /// A resolver with a custom chain.
    pub fn with_matchers(matchers: Vec<Box<dyn NameMatcher>>) -> Self {
        Self {
            matchers,
            fallback: DEFAULT_PERSONA_NAME.to_string(),
        }
    }

    /// Resolve a display name; never empty.
    #[instrument(skip(self, text, conversation), fields(text_len = text.len(), turns = conversation.len()))]
    pub fn resolve(&self, text: &str, conversation: &[Message]) -> String {
        for matcher in &self.matchers {
            if let Some(name) = matcher.find(text, conversation) {
                debug!(matcher = matcher.label(), name = %name, "Persona name resolved");
                return name;
            }
        }
        debug!("No persona name found, using placeholder");
        self.fallback.clone()
    }
}
