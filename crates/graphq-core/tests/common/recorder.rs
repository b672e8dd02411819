//! Observer that keeps an owned copy of every event.

use std::sync::Mutex;
use std::time::Duration;

use graphq_core::observer::{Observer, QueryEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Submitted { index: usize, attempt: u32 },
    Succeeded { index: usize, attempt: u32, results: usize },
    RetryWait { index: usize, attempt: u32, delay: Duration },
    Aborted { index: usize, attempt: u32, classification: String },
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::RetryWait { delay, .. } => Some(delay),
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &QueryEvent<'_>) {
        let recorded = match *event {
            QueryEvent::Submitted { index, attempt, .. } => Recorded::Submitted { index, attempt },
            QueryEvent::Succeeded {
                index,
                attempt,
                results,
                ..
            } => Recorded::Succeeded {
                index,
                attempt,
                results: results.len(),
            },
            QueryEvent::RetryWait {
                index,
                attempt,
                delay,
                ..
            } => Recorded::RetryWait {
                index,
                attempt,
                delay,
            },
            QueryEvent::Aborted { index, attempt, .. } => Recorded::Aborted {
                index,
                attempt,
                classification: event.classification(),
            },
        };
        self.events.lock().unwrap().push(recorded);
    }
}
