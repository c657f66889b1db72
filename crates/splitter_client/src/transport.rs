use splitter_core::JobSession;

use crate::{
    Deployment, JobObserver, PollTransport, SplitterClient, StreamTransport, Tracker, VideoUpload,
};

/// A way of observing one remote job from submission to a terminal state.
///
/// Implementations report everything through the tracker, including their
/// own failures, and stop as soon as the tracker's cancellation fires.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn observe(&self, upload: &VideoUpload, tracker: &mut Tracker<'_>);
}

/// Pick the strategy matching the client's configured deployment.
pub fn transport_for(client: &SplitterClient) -> Box<dyn Transport> {
    match client.settings().deployment {
        Deployment::Poll => Box::new(PollTransport::new(client.clone())),
        Deployment::Stream => Box::new(StreamTransport::new(client.clone())),
    }
}

/// Submit `upload` and track the job to its terminal state.
///
/// Never leaves the session running: if the transport returns without a
/// terminal event, the job fails as an unexpected stream end.
pub async fn run_job(
    transport: &dyn Transport,
    upload: &VideoUpload,
    observer: &dyn JobObserver,
) -> JobSession {
    let mut tracker = Tracker::new(observer);
    tracker.submit();
    transport.observe(upload, &mut tracker).await;
    if !tracker.is_terminal() {
        tracker.transport_closed();
    }
    tracker.into_session()
}
