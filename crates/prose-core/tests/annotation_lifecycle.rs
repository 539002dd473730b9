use prose_core::{
    Annotation, AnnotationKind, AnnotationRange, AnnotationSet, EngineStateManager, ProcessingEdit,
    ReconcileError, StateChangeType,
};
use std::sync::{Arc, Mutex};

fn big_annotations(buffer_version: u64) -> AnnotationSet {
    // Each "big" in "The big dog ran. The big cat also ran big."
    let spans = [(4usize, 7usize), (21, 24), (38, 41)];
    let annotations = spans
        .iter()
        .enumerate()
        .map(|(i, (start, end))| Annotation {
            id: i as u64 + 1,
            range: AnnotationRange::new(*start, *end),
            kind: AnnotationKind::Vocabulary,
            message: "'big' is a basic word".to_string(),
            suggestions: vec![
                "enormous".to_string(),
                "massive".to_string(),
                "substantial".to_string(),
            ],
            rule_id: "vocabulary.big".to_string(),
        })
        .collect();
    AnnotationSet::new(buffer_version, annotations)
}

#[test]
fn test_suggestion_application_invalidates_and_recomputes() {
    let text = "The big dog ran. The big cat also ran big.";
    let mut manager = EngineStateManager::new(text, 80);

    // Sanity-check the fixture offsets against the document.
    let set = big_annotations(manager.buffer_version());
    for a in set.annotations() {
        assert_eq!(
            manager.buffer().slice(a.range.start, a.range.end),
            "big",
            "fixture offset mismatch for annotation {}",
            a.id
        );
    }

    manager.apply_processing_edits(vec![ProcessingEdit::ReplaceAnnotations { set }]);
    assert_eq!(manager.get_annotations_state().annotation_count, 3);

    let applied = manager.apply_suggestion(1, "enormous").unwrap();
    assert_eq!(
        manager.text(),
        "The enormous dog ran. The big cat also ran big."
    );
    assert_eq!(applied.splice.deleted_text, "big");

    // The whole prior set is gone, not shifted.
    assert!(manager.annotations().is_none());

    // A recomputed set against the new buffer lands at the recomputed offsets.
    let recomputed = AnnotationSet::new(
        manager.buffer_version(),
        vec![
            Annotation {
                id: 1,
                range: AnnotationRange::new(26, 29),
                kind: AnnotationKind::Vocabulary,
                message: "'big' is a basic word".to_string(),
                suggestions: vec!["enormous".to_string()],
                rule_id: "vocabulary.big".to_string(),
            },
            Annotation {
                id: 2,
                range: AnnotationRange::new(43, 46),
                kind: AnnotationKind::Vocabulary,
                message: "'big' is a basic word".to_string(),
                suggestions: vec!["enormous".to_string()],
                rule_id: "vocabulary.big".to_string(),
            },
        ],
    );
    for a in recomputed.annotations() {
        assert_eq!(manager.buffer().slice(a.range.start, a.range.end), "big");
    }
    assert!(manager.replace_annotations(recomputed));
}

#[test]
fn test_stale_application_rejected_after_intervening_edit() {
    let text = "The big dog ran. The big cat also ran big.";
    let mut manager = EngineStateManager::new(text, 80);
    manager.replace_annotations(big_annotations(0));

    // Intervening edit invalidates the set; the manager can no longer resolve
    // annotation ids, so application fails without mutating the buffer.
    manager.insert(0, "Oh. ");
    let text_after_edit = manager.text();

    let err = manager.apply_suggestion(1, "enormous").unwrap_err();
    assert!(matches!(err, ReconcileError::UnknownAnnotation { .. }));
    assert_eq!(manager.text(), text_after_edit);
}

#[test]
fn test_change_notifications_for_full_cycle() {
    let mut manager = EngineStateManager::new("The big dog", 80);

    let seen = Arc::new(Mutex::new(Vec::<StateChangeType>::new()));
    let seen_clone = Arc::clone(&seen);
    manager.subscribe(move |change| {
        seen_clone.lock().unwrap().push(change.change_type);
    });

    manager.replace_annotations(big_annotations(0));
    manager.apply_suggestion(1, "enormous").unwrap();
    manager.clear_annotations();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            StateChangeType::AnnotationsChanged,
            StateChangeType::DocumentModified,
            StateChangeType::AnnotationsChanged,
        ]
    );
}
