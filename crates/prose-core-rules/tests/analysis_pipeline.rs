use prose_core::{AnnotationKind, EngineStateManager, StateChangeType};
use prose_core_rules::AnalysisProcessor;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[test]
fn test_debounced_analysis_through_state_manager() {
    let mut manager = EngineStateManager::new("", 80);
    manager.set_analysis_delay(Duration::from_millis(100));
    let mut processor = AnalysisProcessor::with_default_rules().unwrap();

    let seen = Arc::new(Mutex::new(Vec::<StateChangeType>::new()));
    let seen_clone = Arc::clone(&seen);
    manager.subscribe(move |change| {
        seen_clone.lock().unwrap().push(change.change_type);
    });

    // A burst of keystrokes; analysis must not run per keystroke.
    manager.insert(0, "The big ");
    manager.insert(8, "dog");
    let after_burst = Instant::now();
    assert!(!manager.poll_analysis(&mut processor, after_burst).unwrap());

    // Once the quiet window elapses, exactly one analysis pass runs.
    let ran = manager
        .poll_analysis(&mut processor, after_burst + Duration::from_secs(2))
        .unwrap();
    assert!(ran);

    let annotations = manager.annotations().unwrap();
    assert!(annotations.is_current(manager.buffer()));
    assert_eq!(
        annotations
            .annotations()
            .iter()
            .filter(|a| a.kind == AnnotationKind::Vocabulary)
            .count(),
        1
    );

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            StateChangeType::DocumentModified,
            StateChangeType::DocumentModified,
            StateChangeType::AnnotationsChanged,
        ]
    );
}

#[test]
fn test_suggestion_application_and_reanalysis() {
    let text = "The big dog ran. The big cat also ran big.";
    let mut manager = EngineStateManager::new(text, 80);
    let mut processor = AnalysisProcessor::with_default_rules().unwrap();

    // Initial analysis.
    manager.apply_processor(&mut processor).unwrap();
    let first_big = manager
        .annotations()
        .unwrap()
        .annotations()
        .iter()
        .find(|a| a.kind == AnnotationKind::Vocabulary)
        .cloned()
        .unwrap();
    assert_eq!((first_big.range.start, first_big.range.end), (4, 7));

    manager
        .apply_suggestion(first_big.id, &first_big.suggestions[0])
        .unwrap();
    assert_eq!(
        manager.text(),
        "The enormous dog ran. The big cat also ran big."
    );
    assert!(manager.annotations().is_none());

    // Re-analysis no longer flags the applied location; the remaining
    // occurrences are reported at their recomputed offsets.
    manager.apply_processor(&mut processor).unwrap();
    let offsets: Vec<(usize, usize)> = manager
        .annotations()
        .unwrap()
        .annotations()
        .iter()
        .filter(|a| a.kind == AnnotationKind::Vocabulary)
        .map(|a| (a.range.start, a.range.end))
        .collect();
    assert_eq!(offsets, vec![(26, 29), (43, 46)]);
    for (start, end) in offsets {
        assert_eq!(manager.buffer().slice(start, end), "big");
    }
}

#[test]
fn test_overlay_renders_analysis_results() {
    let mut manager = EngineStateManager::new("i recieve letters", 80);
    let mut processor = AnalysisProcessor::with_default_rules().unwrap();
    manager.apply_processor(&mut processor).unwrap();

    let overlay = manager.render_overlay();
    assert_eq!(overlay.text(), "i recieve letters");

    let highlighted: Vec<AnnotationKind> = overlay
        .spans
        .iter()
        .filter_map(|s| s.highlight.map(|h| h.kind))
        .collect();
    assert_eq!(
        highlighted,
        vec![AnnotationKind::Grammar, AnnotationKind::Spelling]
    );
}
