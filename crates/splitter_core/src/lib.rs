//! Splitter core: pure job-tracking state machine and presentation helpers.
mod artifact;
mod effect;
mod msg;
mod present;
mod state;
mod update;

pub use artifact::{last_path_segment, ArtifactDescriptor};
pub use effect::Effect;
pub use msg::{Msg, ProgressEvent};
pub use present::{present, ArtifactEntry, Presentation};
pub use state::{
    clamp_percentage, FailureKind, JobFailure, JobHandle, JobOutcome, JobSession, JobState,
};
pub use update::update;
