use splitter_logging::splitter_debug;

use crate::{SplitterClient, Tracker, Transport, VideoUpload};

/// Submits, then reads `/api/task_status/{task_id}` on a fixed interval.
///
/// Any failed poll ends the observation; there is no retry.
#[derive(Debug, Clone)]
pub struct PollTransport {
    client: SplitterClient,
}

impl PollTransport {
    pub fn new(client: SplitterClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for PollTransport {
    async fn observe(&self, upload: &VideoUpload, tracker: &mut Tracker<'_>) {
        let handle = match self.client.submit(upload).await {
            Ok(handle) => handle,
            Err(err) => {
                tracker.transport_failed(err.into_failure());
                return;
            }
        };
        let task_id = handle.task_id().to_string();
        tracker.accept(handle);

        let cancel = tracker.cancellation();
        let interval = self.client.settings().poll_interval;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }

            match self.client.task_status(&task_id).await {
                Ok(status) => {
                    splitter_debug!("task {} state {:?}", task_id, status.state);
                    for event in status.into_events() {
                        tracker.apply(event);
                    }
                }
                Err(err) => tracker.transport_failed(err.into_failure()),
            }
        }
    }
}
