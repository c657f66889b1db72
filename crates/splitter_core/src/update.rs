use crate::{clamp_percentage, Effect, JobFailure, JobSession, JobState, Msg, ProgressEvent};

/// Pure update function: applies a message to the session and returns any effects.
///
/// Once the session is terminal every further message is ignored, so `Finish`
/// is emitted at most once per session.
pub fn update(mut session: JobSession, msg: Msg) -> (JobSession, Vec<Effect>) {
    if session.is_terminal() {
        return (session, Vec::new());
    }

    let effects = match msg {
        Msg::Submit => {
            if *session.state() == JobState::Idle {
                session.set_state(JobState::Submitting);
            }
            Vec::new()
        }
        Msg::Accepted(handle) => {
            // The handle is immutable once known.
            if session.handle().is_none() {
                session.set_handle(handle);
            }
            Vec::new()
        }
        Msg::Event(event) => apply_event(&mut session, event),
        Msg::TransportFailed(failure) => fail(&mut session, failure),
        Msg::TransportClosed => fail(&mut session, JobFailure::unexpected_end()),
    };

    (session, effects)
}

fn apply_event(session: &mut JobSession, event: ProgressEvent) -> Vec<Effect> {
    let (message, percentage) = session
        .progress()
        .map(|(message, percentage)| (message.to_string(), percentage))
        .unwrap_or_default();

    match event {
        ProgressEvent::Message(text) => set_running(session, text, percentage),
        ProgressEvent::Progress(value) if value.is_nan() => Vec::new(),
        ProgressEvent::Progress(value) => {
            // Published progress never moves backwards.
            let percentage = percentage.max(clamp_percentage(value));
            set_running(session, message, percentage)
        }
        ProgressEvent::ArtifactsReady(artifacts) => {
            session.set_state(JobState::Succeeded(artifacts));
            finish(session)
        }
        ProgressEvent::Error(text) => fail(session, JobFailure::reported(text)),
    }
}

fn set_running(session: &mut JobSession, message: String, percentage: f64) -> Vec<Effect> {
    let effect = Effect::PublishProgress {
        message: message.clone(),
        percentage,
    };
    session.set_state(JobState::Running {
        message,
        percentage,
    });
    vec![effect]
}

fn fail(session: &mut JobSession, failure: JobFailure) -> Vec<Effect> {
    session.set_state(JobState::Failed(failure));
    finish(session)
}

fn finish(session: &JobSession) -> Vec<Effect> {
    match session.outcome() {
        Some(outcome) => vec![Effect::Finish(outcome), Effect::StopTransport],
        None => Vec::new(),
    }
}
