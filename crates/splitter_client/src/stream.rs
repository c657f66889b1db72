use futures_util::StreamExt;
use splitter_core::{FailureKind, JobFailure};
use splitter_logging::{splitter_debug, splitter_trace};

use crate::types::map_reqwest_error;
use crate::{FrameDecoder, SplitterClient, Tracker, Transport, VideoUpload};

/// Submits and reads the response body as an event stream until it closes.
#[derive(Debug, Clone)]
pub struct StreamTransport {
    client: SplitterClient,
}

impl StreamTransport {
    pub fn new(client: SplitterClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for StreamTransport {
    async fn observe(&self, upload: &VideoUpload, tracker: &mut Tracker<'_>) {
        let response = match self.client.open_stream(upload).await {
            Ok(response) => response,
            Err(err) => {
                tracker.transport_failed(err.into_failure());
                return;
            }
        };

        let cancel = tracker.cancellation();
        let idle = self.client.settings().idle_timeout;
        let mut decoder = FrameDecoder::new();
        let mut body = response.bytes_stream();

        // Returning drops `body`, which abandons any in-flight read.
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                next = tokio::time::timeout(idle, body.next()) => next,
            };

            match next {
                Ok(Some(Ok(chunk))) => {
                    splitter_trace!("received {} bytes", chunk.len());
                    decoder.push(&chunk);
                    for event in decoder.events() {
                        tracker.apply(event);
                        if cancel.is_cancelled() {
                            return;
                        }
                    }
                }
                Ok(Some(Err(err))) => {
                    tracker.transport_failed(map_reqwest_error(err, idle).into_failure());
                    return;
                }
                Ok(None) => {
                    splitter_debug!(
                        "stream closed with {} undelimited bytes",
                        decoder.pending()
                    );
                    tracker.transport_closed();
                    return;
                }
                Err(_) => {
                    tracker.transport_failed(JobFailure::new(
                        FailureKind::Timeout,
                        format!("no progress received for {idle:?}"),
                    ));
                    return;
                }
            }
        }
    }
}
