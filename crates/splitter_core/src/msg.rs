use crate::{ArtifactDescriptor, JobFailure, JobHandle};

/// One decoded progress event for a job.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Message(String),
    /// Raw percentage as reported; clamping happens in the tracker.
    Progress(f64),
    Error(String),
    ArtifactsReady(Vec<ArtifactDescriptor>),
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Error(_) | ProgressEvent::ArtifactsReady(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The upload request is about to be sent.
    Submit,
    /// The server accepted the upload and named the task (poll deployment).
    Accepted(JobHandle),
    /// A decoded event or a synthesized poll event.
    Event(ProgressEvent),
    /// The transport failed before a terminal event arrived.
    TransportFailed(JobFailure),
    /// The transport closed; fatal only when no terminal event was seen.
    TransportClosed,
}
