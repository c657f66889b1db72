use crate::JobOutcome;

/// Side effects requested by [`crate::update`]; executed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Notify observers of the latest message/percentage pair.
    PublishProgress { message: String, percentage: f64 },
    /// Deliver the terminal result. Emitted at most once per session.
    Finish(JobOutcome),
    /// The active transport must stop delivering events.
    StopTransport,
}
