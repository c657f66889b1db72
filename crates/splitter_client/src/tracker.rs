use std::sync::mpsc;

use splitter_core::{
    update, Effect, JobFailure, JobHandle, JobOutcome, JobSession, Msg, ProgressEvent,
};
use splitter_logging::{splitter_debug, splitter_info, splitter_warn};
use tokio_util::sync::CancellationToken;

/// Receives tracker notifications. Called from the job's task, in order.
pub trait JobObserver: Send + Sync {
    fn on_update(&self, message: &str, percentage: f64);
    /// Called exactly once per job.
    fn on_done(&self, outcome: &JobOutcome);
}

/// Notification forwarded by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum JobNotice {
    Update { message: String, percentage: f64 },
    Done(JobOutcome),
}

/// Observer that forwards notifications to a channel, e.g. a UI thread.
pub struct ChannelObserver {
    tx: mpsc::Sender<JobNotice>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<JobNotice>) -> Self {
        Self { tx }
    }
}

impl JobObserver for ChannelObserver {
    fn on_update(&self, message: &str, percentage: f64) {
        let _ = self.tx.send(JobNotice::Update {
            message: message.to_string(),
            percentage,
        });
    }

    fn on_done(&self, outcome: &JobOutcome) {
        let _ = self.tx.send(JobNotice::Done(outcome.clone()));
    }
}

/// Owns the [`JobSession`] of one job and runs the effects of each transition.
///
/// Reaching a terminal state cancels [`Tracker::cancellation`], which the
/// active transport watches to stop reading or polling.
pub struct Tracker<'a> {
    session: JobSession,
    observer: &'a dyn JobObserver,
    cancel: CancellationToken,
}

impl<'a> Tracker<'a> {
    pub fn new(observer: &'a dyn JobObserver) -> Self {
        Self {
            session: JobSession::new(),
            observer,
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn session(&self) -> &JobSession {
        &self.session
    }

    pub fn is_terminal(&self) -> bool {
        self.session.is_terminal()
    }

    pub fn into_session(self) -> JobSession {
        self.session
    }

    pub fn submit(&mut self) {
        self.dispatch(Msg::Submit);
    }

    pub fn accept(&mut self, handle: JobHandle) {
        self.dispatch(Msg::Accepted(handle));
    }

    pub fn apply(&mut self, event: ProgressEvent) {
        splitter_debug!("event {:?}", event);
        self.dispatch(Msg::Event(event));
    }

    pub fn transport_failed(&mut self, failure: JobFailure) {
        splitter_warn!("transport failed: {}", failure);
        self.dispatch(Msg::TransportFailed(failure));
    }

    pub fn transport_closed(&mut self) {
        self.dispatch(Msg::TransportClosed);
    }

    fn dispatch(&mut self, msg: Msg) {
        let session = std::mem::take(&mut self.session);
        let (session, effects) = update(session, msg);
        self.session = session;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::PublishProgress {
                message,
                percentage,
            } => self.observer.on_update(&message, percentage),
            Effect::Finish(outcome) => {
                match &outcome {
                    JobOutcome::Artifacts(artifacts) => {
                        splitter_info!("job succeeded with {} artifacts", artifacts.len())
                    }
                    JobOutcome::NoArtifacts => splitter_info!("job succeeded without artifacts"),
                    JobOutcome::Failed(failure) => splitter_info!("job failed: {}", failure),
                }
                self.observer.on_done(&outcome);
            }
            Effect::StopTransport => self.cancel.cancel(),
        }
    }
}
