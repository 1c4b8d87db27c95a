use std::future::Future;

use crate::common::{SwagError, SwagResult};

/// How a task-list step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped(String),
}

/// Receives task-list progress, e.g. to drive spinners
pub trait StepObserver: Send + Sync {
    fn step_started(&self, title: &str);
    fn step_finished(&self, title: &str, outcome: &StepOutcome);
    fn step_failed(&self, title: &str, error: &SwagError);
}

/// Observer that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl StepObserver for LoggingObserver {
    fn step_started(&self, title: &str) {
        tracing::info!(step = title, "step started");
    }

    fn step_finished(&self, title: &str, outcome: &StepOutcome) {
        tracing::info!(step = title, ?outcome, "step finished");
    }

    fn step_failed(&self, title: &str, error: &SwagError) {
        tracing::info!(step = title, %error, "step failed");
    }
}

/// Run one step, reporting its start and end to `observer`
pub async fn run_step<F>(observer: &dyn StepObserver, title: &str, step: F) -> SwagResult<StepOutcome>
where
    F: Future<Output = SwagResult<StepOutcome>>,
{
    observer.step_started(title);
    match step.await {
        Ok(outcome) => {
            observer.step_finished(title, &outcome);
            Ok(outcome)
        }
        Err(error) => {
            observer.step_failed(title, &error);
            Err(error)
        }
    }
}

/// Titles and outcomes of the steps a use case ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub steps: Vec<(String, StepOutcome)>,
}

impl StepReport {
    pub fn push(&mut self, title: impl Into<String>, outcome: StepOutcome) {
        self.steps.push((title.into(), outcome));
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|(title, outcome)| match outcome {
            StepOutcome::Skipped(_) => Some(title.as_str()),
            StepOutcome::Done => None,
        })
    }
}
