//! Tests for scene extraction.

use vignette_narrative::SceneExtractor;

const THREE_SCENES: &str = "\
Here is Mei Lin's story in three scenes.

**Scene 1: Morning in Chinatown**
Visual Prompt: Mei Lin, 24, oval face, dark brown eyes, black hair in a low bun,
wearing a cotton samfu, sweeping the step of a Dupont Street shop, 1906, soft morning light
Context: Chinese immigrants were confined to a few crowded blocks by law and custom.

**Scene 2: The Earthquake**
Visual Prompt: Mei Lin, 24, oval face, dark brown eyes, clutching a doorframe as bricks fall, dust, dawn
Context: At 5:12 a.m. on April 18 the ground shook for nearly a minute.
Fires followed within hours.

**Scene 3: The Refugee Camp**
Visual Prompt: Mei Lin, 24, oval face, in a canvas tent at the Presidio, relief workers, overcast
Context: Officials tried to move Chinatown's residents to the edge of the city.

GENERATE_VISUALS: Mei Lin
";

#[test]
fn test_extracts_all_well_formed_blocks_in_order() {
    let scenes = SceneExtractor::new().extract(THREE_SCENES);

    assert_eq!(scenes.len(), 3);
    let numbers: Vec<_> = scenes.iter().map(|s| s.scene_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    for scene in &scenes {
        assert!(!scene.title.is_empty());
        assert!(!scene.visual_prompt.is_empty());
        assert!(!scene.context.is_empty());
        assert!(!scene.visual_prompt.contains('\n'));
        assert!(!scene.context.contains('\n'));
    }
    assert_eq!(scenes[0].title, "Morning in Chinatown");
    assert!(scenes[0].visual_prompt.ends_with("soft morning light"));
    assert_eq!(
        scenes[1].context,
        "At 5:12 a.m. on April 18 the ground shook for nearly a minute. Fires followed within hours."
    );
}

#[test]
fn test_empty_and_unstructured_text_yield_nothing() {
    let extractor = SceneExtractor::new();

    assert!(extractor.extract("").is_empty());
    assert!(extractor.extract("no scenes here").is_empty());
    assert!(extractor.extract("**Scene one: Not a number**").is_empty());
}

#[test]
fn test_source_order_is_kept_even_when_numbers_are_not_sorted() {
    let text = "**Scene 2: Second**\nVisual Prompt: b\nContext: y\n\n**Scene 1: First**\nVisual Prompt: a\nContext: x";
    let scenes = SceneExtractor::new().extract(text);

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].scene_number, 2);
    assert_eq!(scenes[1].scene_number, 1);
}

#[test]
fn test_gaps_in_numbering_are_tolerated() {
    let text = "**Scene 1: A**\nVisual Prompt: a\nContext: x\n\n**Scene 4: D**\nVisual Prompt: d\nContext: w";
    let scenes = SceneExtractor::new().extract(text);

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[1].scene_number, 4);
}

#[test]
fn test_truncated_trailing_block_is_dropped() {
    let text = "**Scene 1: A**\nVisual Prompt: a\nContext: x\n\n**Scene 2: B**\nVisual Prompt: cut off mid-";
    let scenes = SceneExtractor::new().extract(text);

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].title, "A");
}

#[test]
fn test_empty_visual_prompt_line_is_dropped() {
    let text = "**Scene 1: A**\nVisual Prompt:\nContext: x";
    assert!(SceneExtractor::new().extract(text).is_empty());
}
