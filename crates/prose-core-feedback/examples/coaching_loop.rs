//! Minimal feedback loop example
//!
//! Wires a `FeedbackCoordinator` to a mock service over the threaded client
//! and drives one autonomous cycle plus one explicit question.

use prose_core_feedback::{
    CoordinatorEvent, CoordinatorOptions, FeedbackClient, FeedbackCoordinator, FeedbackError,
    FeedbackRequest, FeedbackService,
};
use serde_json::{Value, json};
use std::time::{Duration, Instant};

struct MockService;

impl FeedbackService for MockService {
    fn generate_feedback(&mut self, request: &FeedbackRequest) -> Result<Value, FeedbackError> {
        let text = match &request.question {
            Some(q) => format!("About \"{}\": start with the action.", q),
            None => "Strong verbs would make this draft more vivid.".to_string(),
        };
        Ok(json!({
            "overallComment": "A promising draft.",
            "feedbackItems": [
                {"type": "suggestion", "area": "word choice", "text": text}
            ],
            "focusForNextTime": ["verbs", "openings"],
        }))
    }
}

fn pump_until_quiet(client: &FeedbackClient, coordinator: &mut FeedbackCoordinator) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if !client.pump(coordinator, Instant::now()).is_empty() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn main() {
    let client = FeedbackClient::spawn(Box::new(MockService));
    let mut coordinator = FeedbackCoordinator::new(CoordinatorOptions::default());

    let draft: String = (0..60)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ");

    // Autonomous path: content change, quiet window, request, merge.
    let start = Instant::now();
    coordinator.handle_event(CoordinatorEvent::ContentChanged { content: draft.clone() }, start);
    let effects = coordinator.poll(start + Duration::from_secs(3));
    client.dispatch_effects(&mut coordinator, &effects, start);
    pump_until_quiet(&client, &mut coordinator);

    // Question path: immediate, tagged, prepended.
    let effects = coordinator.handle_event(
        CoordinatorEvent::QuestionAsked {
            question: "Is my opening strong?".to_string(),
            content: draft,
        },
        Instant::now(),
    );
    client.dispatch_effects(&mut coordinator, &effects, Instant::now());
    pump_until_quiet(&client, &mut coordinator);

    println!(
        "overall: {}",
        coordinator.model().overall_comment.as_deref().unwrap_or("-")
    );
    for entry in &coordinator.model().entries {
        println!("[{:?}] {}: {}", entry.origin, entry.item.area, entry.item.text);
    }
    println!("focus next time: {:?}", coordinator.model().focus_for_next_time);
    println!("history size: {}", coordinator.history().len());
}
