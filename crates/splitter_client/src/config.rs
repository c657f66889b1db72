use std::time::Duration;

/// Which transport the service deployment offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deployment {
    /// Submission returns a task id; status is polled.
    Poll,
    /// Submission response body is the event stream.
    #[default]
    Stream,
}

impl Deployment {
    /// Multipart field carrying the segment duration.
    pub fn duration_field(self) -> &'static str {
        match self {
            Deployment::Poll => "chunkDuration",
            Deployment::Stream => "segment_duration",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub deployment: Deployment,
    pub connect_timeout: Duration,
    /// Upload plus response headers of the submission request.
    pub submit_timeout: Duration,
    /// Longest silence tolerated at any suspension point while observing a job.
    pub idle_timeout: Duration,
    pub poll_interval: Duration,
    /// Gap between sequential individual downloads.
    pub download_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            deployment: Deployment::default(),
            connect_timeout: Duration::from_secs(10),
            submit_timeout: Duration::from_secs(600),
            idle_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
            download_delay: Duration::from_secs(1),
        }
    }
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>, deployment: Deployment) -> Self {
        Self {
            base_url: base_url.into(),
            deployment,
            ..Self::default()
        }
    }
}
