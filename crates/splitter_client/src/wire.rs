//! JSON bodies exchanged with the processing service.
use serde::{Deserialize, Serialize};
use splitter_core::{ArtifactDescriptor, ProgressEvent};

/// `202` body of `POST /api/split_video` in the poll deployment.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitAccepted {
    pub task_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `GET /api/task_status/{task_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<ProgressValue>,
    #[serde(default)]
    pub fragments: Option<Vec<FragmentEntry>>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Pending,
    Progress,
    Success,
    Failure,
    #[serde(other)]
    Other,
}

/// `progress` is either `"42.50%"` or a bare number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProgressValue {
    Number(f64),
    Text(String),
}

impl ProgressValue {
    pub fn percentage(&self) -> Option<f64> {
        let value = match self {
            ProgressValue::Number(value) => Some(*value),
            ProgressValue::Text(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        };
        value.filter(|value: &f64| !value.is_nan())
    }
}

/// One entry of a fragment list: a bare URL or a described file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FragmentEntry {
    Url(String),
    Described(DescribedFragment),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescribedFragment {
    #[serde(alias = "download_url")]
    pub url: String,
    #[serde(default, alias = "filename")]
    pub name: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CleanupResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DownloadAllRequest<'a> {
    pub filenames: &'a [String],
}

/// Turn a fragment list into artifacts, keeping server order.
pub fn artifacts_from_fragments(entries: Vec<FragmentEntry>) -> Vec<ArtifactDescriptor> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            FragmentEntry::Url(url) => ArtifactDescriptor::positional(index, url),
            FragmentEntry::Described(fragment) => {
                let artifact = match fragment.name {
                    Some(name) => ArtifactDescriptor::named(fragment.url, name),
                    None => ArtifactDescriptor::positional(index, fragment.url),
                };
                match fragment.preview_url {
                    Some(preview) => artifact.with_preview(preview),
                    None => artifact,
                }
            }
        })
        .collect()
}

impl TaskStatus {
    /// Events synthesized from one poll response, in the order they apply.
    pub fn into_events(self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        match self.state {
            TaskState::Success => {
                if let Some(status) = self.status {
                    events.push(ProgressEvent::Message(status));
                }
                let fragments = self.fragments.unwrap_or_default();
                events.push(ProgressEvent::ArtifactsReady(artifacts_from_fragments(
                    fragments,
                )));
            }
            TaskState::Failure => {
                let status = self
                    .status
                    .unwrap_or_else(|| "Task failed!".to_string());
                events.push(ProgressEvent::Error(status));
            }
            TaskState::Pending | TaskState::Progress | TaskState::Other => {
                if let Some(status) = self.status {
                    events.push(ProgressEvent::Message(status));
                }
                if let Some(percentage) = self.progress.as_ref().and_then(ProgressValue::percentage)
                {
                    events.push(ProgressEvent::Progress(percentage));
                }
                // A bare answer still means the job is running; the tracker
                // keeps the higher percentage it already has.
                if events.is_empty() {
                    events.push(ProgressEvent::Progress(0.0));
                }
            }
        }
        events
    }
}
