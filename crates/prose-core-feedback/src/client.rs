//! Threaded feedback transport.
//!
//! [`FeedbackClient`] runs a [`FeedbackService`] on a background worker thread
//! and shuttles generation-tagged jobs/outcomes over channels, so the host's
//! event loop never blocks on the service. The transport never cancels
//! in-flight work: supersession is cooperative, and the coordinator discards
//! outdated outcomes on arrival.

use crate::coordinator::{CoordinatorEffect, CoordinatorEvent, FeedbackCoordinator};
use crate::service::{FeedbackError, FeedbackRequest, FeedbackService};
use serde_json::Value;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

/// A generation-tagged request job.
#[derive(Debug, Clone)]
pub struct FeedbackJob {
    /// Generation captured by the coordinator at send time.
    pub generation: u64,
    /// The request payload.
    pub request: FeedbackRequest,
}

/// A generation-tagged outcome from the worker.
#[derive(Debug)]
pub struct FeedbackOutcome {
    /// Generation echoed from the job.
    pub generation: u64,
    /// The raw payload, or the transport/service error.
    pub payload: Result<Value, FeedbackError>,
}

/// A feedback service running on a background worker thread.
pub struct FeedbackClient {
    tx: mpsc::Sender<FeedbackJob>,
    rx: mpsc::Receiver<FeedbackOutcome>,
}

impl FeedbackClient {
    /// Spawn the worker thread around `service`.
    pub fn spawn(service: Box<dyn FeedbackService + Send>) -> Self {
        let (tx_job, rx_job) = mpsc::channel::<FeedbackJob>();
        let (tx_out, rx_out) = mpsc::channel::<FeedbackOutcome>();

        thread::spawn(move || feedback_worker_loop(service, rx_job, tx_out));

        Self {
            tx: tx_job,
            rx: rx_out,
        }
    }

    /// Submit a job to the worker.
    ///
    /// A dead worker surfaces as [`FeedbackError::RequestFailed`], which hosts
    /// route into the coordinator like any other transport failure.
    pub fn submit(&self, job: FeedbackJob) -> Result<(), FeedbackError> {
        self.tx
            .send(job)
            .map_err(|_| FeedbackError::RequestFailed("feedback worker stopped".to_string()))
    }

    /// Try to receive the next outcome without blocking.
    pub fn try_recv(&self) -> Option<FeedbackOutcome> {
        self.rx.try_recv().ok()
    }

    /// Forward any [`CoordinatorEffect::SendRequest`] effects to the worker.
    ///
    /// Submit failures are fed straight back into `coordinator` as failed
    /// responses, so the fallback path engages without waiting for a timeout.
    pub fn dispatch_effects(
        &self,
        coordinator: &mut FeedbackCoordinator,
        effects: &[CoordinatorEffect],
        now: Instant,
    ) -> Vec<CoordinatorEffect> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            let CoordinatorEffect::SendRequest {
                generation,
                request,
            } = effect
            else {
                continue;
            };

            if let Err(err) = self.submit(FeedbackJob {
                generation: *generation,
                request: request.clone(),
            }) {
                follow_ups.extend(coordinator.handle_event(
                    CoordinatorEvent::ResponseArrived {
                        generation: *generation,
                        payload: Err(err),
                    },
                    now,
                ));
            }
        }
        follow_ups
    }

    /// Drain worker outcomes into `coordinator`, returning the applied effects.
    pub fn pump(&self, coordinator: &mut FeedbackCoordinator, now: Instant) -> Vec<CoordinatorEffect> {
        let mut effects = Vec::new();
        while let Some(outcome) = self.try_recv() {
            effects.extend(coordinator.handle_event(
                CoordinatorEvent::ResponseArrived {
                    generation: outcome.generation,
                    payload: outcome.payload,
                },
                now,
            ));
        }
        effects
    }
}

fn feedback_worker_loop(
    mut service: Box<dyn FeedbackService + Send>,
    rx: mpsc::Receiver<FeedbackJob>,
    tx: mpsc::Sender<FeedbackOutcome>,
) {
    for job in rx {
        let payload = service.generate_feedback(&job.request);
        log::debug!(
            "feedback worker finished generation {} ({})",
            job.generation,
            if payload.is_ok() { "ok" } else { "err" }
        );
        if tx
            .send(FeedbackOutcome {
                generation: job.generation,
                payload,
            })
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    struct ScriptedService {
        replies: Vec<Result<Value, FeedbackError>>,
    }

    impl FeedbackService for ScriptedService {
        fn generate_feedback(
            &mut self,
            _request: &FeedbackRequest,
        ) -> Result<Value, FeedbackError> {
            if self.replies.is_empty() {
                Err(FeedbackError::RequestFailed("script exhausted".to_string()))
            } else {
                self.replies.remove(0)
            }
        }
    }

    #[test]
    fn test_worker_echoes_generation() {
        let client = FeedbackClient::spawn(Box::new(ScriptedService {
            replies: vec![Ok(json!({"ok": true}))],
        }));

        client
            .submit(FeedbackJob {
                generation: 7,
                request: FeedbackRequest {
                    content: "content".to_string(),
                    text_type: "story".to_string(),
                    assistance_level: Default::default(),
                    history: Vec::new(),
                    question: None,
                },
            })
            .unwrap();

        let outcome = wait_for_outcome(&client);
        assert_eq!(outcome.generation, 7);
        assert_eq!(outcome.payload.unwrap()["ok"], true);
    }

    fn wait_for_outcome(client: &FeedbackClient) -> FeedbackOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = client.try_recv() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "worker did not respond");
            thread::sleep(Duration::from_millis(5));
        }
    }
}
