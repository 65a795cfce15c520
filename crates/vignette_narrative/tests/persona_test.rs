//! Tests for persona name resolution order.

use vignette_core::Message;
use vignette_narrative::{DEFAULT_PERSONA_NAME, PersonaNameResolver};

#[test]
fn test_directive_wins_over_everything() {
    let text = "I am Charles Thorton.\nGENERATE_VISUALS: Mei Lin";
    assert_eq!(PersonaNameResolver::new().resolve(text, &[]), "Mei Lin");
}

#[test]
fn test_bring_story_to_life_strips_article() {
    let text = "Let's bring the Silk Weaver's story to life.";
    assert_eq!(PersonaNameResolver::new().resolve(text, &[]), "Silk Weaver");
}

#[test]
fn test_i_am_pattern() {
    let text = "scene notes follow. I am Li Hua, a merchant's daughter.";
    assert_eq!(PersonaNameResolver::new().resolve(text, &[]), "Li Hua");
}

#[test]
fn test_my_name_is_pattern() {
    let text = "greetings, traveler. my name is Tomas Ortega and I farm near the river.";
    assert_eq!(PersonaNameResolver::new().resolve(text, &[]), "Tomas Ortega");
}

#[test]
fn test_capitalized_fallback_skips_stoplist() {
    let text = "Historical Scene overview: Emperor rule was harsh. Ana Souza worked the docks.\n\nSecond paragraph with Other Names.";
    assert_eq!(PersonaNameResolver::new().resolve(text, &[]), "Ana Souza");
}

#[test]
fn test_capitalized_fallback_only_reads_first_paragraph() {
    let text = "nothing capitalized here.\n\nJohn Smith appears later.";
    let conversation = vec![Message::user("tell me about Rosa's life")];
    assert_eq!(
        PersonaNameResolver::new().resolve(text, &conversation),
        "Rosa"
    );
}

#[test]
fn test_conversation_is_searched_newest_first() {
    let conversation = vec![
        Message::assistant("GENERATE_VISUALS: Old Name"),
        Message::user("show me Maria's story"),
    ];
    assert_eq!(
        PersonaNameResolver::new().resolve("no names here", &conversation),
        "Maria"
    );
}

#[test]
fn test_assistant_turns_only_count_for_directives() {
    let conversation = vec![Message::assistant("tell me about Rosa's life")];
    assert_eq!(
        PersonaNameResolver::new().resolve("no names here", &conversation),
        DEFAULT_PERSONA_NAME
    );
}

#[test]
fn test_placeholder_when_nothing_matches() {
    assert_eq!(
        PersonaNameResolver::new().resolve("", &[]),
        DEFAULT_PERSONA_NAME
    );
}
