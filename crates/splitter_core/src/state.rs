use std::fmt;

use crate::{present, ArtifactDescriptor, Presentation};

/// Identifies one server-side task and its cleanup scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    task_id: String,
    session_id: Option<String>,
}

impl JobHandle {
    pub fn new(task_id: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            task_id: task_id.into(),
            session_id,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server reported the failure (error frame, FAILURE state, bad terminal payload).
    Reported,
    Network,
    HttpStatus(u16),
    Timeout,
    UnexpectedStreamEnd,
}

/// A fatal failure, delivered to observers as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn reported(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Reported, message)
    }

    pub fn unexpected_end() -> Self {
        Self::new(FailureKind::UnexpectedStreamEnd, "stream ended unexpectedly")
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Reported | FailureKind::UnexpectedStreamEnd => {
                write!(f, "{}", self.message)
            }
            FailureKind::Network => write!(f, "connection to the server failed: {}", self.message),
            FailureKind::HttpStatus(code) => {
                write!(f, "server responded with status {code}: {}", self.message)
            }
            FailureKind::Timeout => write!(f, "server stopped responding: {}", self.message),
        }
    }
}

/// Terminal result handed to `on_done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Non-empty artifact list in server order.
    Artifacts(Vec<ArtifactDescriptor>),
    /// The job succeeded but produced nothing.
    NoArtifacts,
    Failed(JobFailure),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Submitting,
    Running {
        message: String,
        percentage: f64,
    },
    Succeeded(Vec<ArtifactDescriptor>),
    Failed(JobFailure),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded(_) | JobState::Failed(_))
    }
}

/// All state for one submitted job, owned by a single tracker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSession {
    handle: Option<JobHandle>,
    state: JobState,
}

impl JobSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Last published message and percentage while running.
    pub fn progress(&self) -> Option<(&str, f64)> {
        match &self.state {
            JobState::Running {
                message,
                percentage,
            } => Some((message.as_str(), *percentage)),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<JobOutcome> {
        match &self.state {
            JobState::Succeeded(artifacts) if artifacts.is_empty() => Some(JobOutcome::NoArtifacts),
            JobState::Succeeded(artifacts) => Some(JobOutcome::Artifacts(artifacts.clone())),
            JobState::Failed(failure) => Some(JobOutcome::Failed(failure.clone())),
            _ => None,
        }
    }

    /// Presentation of the artifact list once the job has succeeded.
    pub fn presentation(&self) -> Option<Presentation> {
        match &self.state {
            JobState::Succeeded(artifacts) => Some(present(artifacts)),
            _ => None,
        }
    }

    pub(crate) fn set_handle(&mut self, handle: JobHandle) {
        self.handle = Some(handle);
    }

    pub(crate) fn set_state(&mut self, state: JobState) {
        self.state = state;
    }
}

/// Clamp a reported percentage into `[0, 100]`.
pub fn clamp_percentage(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
