//! Annotation lifecycle example
//!
//! Demonstrates the full loop: annotate a document, render the overlay,
//! resolve a pointer position, and apply a suggestion.

use prose_core::{
    Annotation, AnnotationKind, AnnotationRange, AnnotationSet, EngineStateManager,
    MonospaceMeasure, PointerPoint, ResolveOptions,
};

fn main() {
    let mut manager = EngineStateManager::new("The big dog ran. The big cat also ran big.", 80);

    manager.subscribe(|change| {
        println!(
            "  state change: {:?} (version {} -> {})",
            change.change_type, change.old_version, change.new_version
        );
    });

    // Hand-built set; `prose-core-rules` produces these from its rule set.
    let set = AnnotationSet::new(
        manager.buffer_version(),
        vec![Annotation {
            id: 1,
            range: AnnotationRange::new(4, 7),
            kind: AnnotationKind::Vocabulary,
            message: "'big' is a basic word; consider a stronger alternative.".to_string(),
            suggestions: vec![
                "enormous".to_string(),
                "massive".to_string(),
                "substantial".to_string(),
            ],
            rule_id: "vocabulary.big".to_string(),
        }],
    );

    println!("1. Applying annotation set:");
    manager.replace_annotations(set);

    println!("\n2. Overlay spans:");
    for span in &manager.render_overlay().spans {
        match span.highlight {
            Some(h) => println!("  [{:?}] {:?}", h.kind, span.text),
            None => println!("  [plain] {:?}", span.text),
        }
    }

    println!("\n3. Pointer at column 5:");
    let measure = MonospaceMeasure::default();
    let hit = manager
        .resolve_pointer(&measure, PointerPoint::new(5, 0), ResolveOptions::default())
        .expect("pointer should hit the annotation");
    println!("  span: {:?}", hit.span_text);
    println!("  message: {}", hit.annotation.message);
    println!("  suggestions: {:?}", hit.annotation.suggestions);
    println!("  popup anchor: ({}, {})", hit.anchor.x, hit.anchor.y);

    println!("\n4. Applying suggestion {:?}:", hit.annotation.suggestions[0]);
    manager
        .apply_suggestion(hit.annotation.id, &hit.annotation.suggestions[0])
        .expect("annotation is current");

    println!("\n5. Result: {:?}", manager.text());
    println!(
        "   annotations present: {} (discarded, awaiting re-analysis)",
        manager.annotations().is_some()
    );
}
