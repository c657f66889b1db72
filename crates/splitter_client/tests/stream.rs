use std::num::NonZeroU32;
use std::sync::{Mutex, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use splitter_client::{
    run_job, transport_for, ClientSettings, Deployment, JobNotice, JobObserver, SplitterClient,
    StreamTransport, VideoUpload,
};
use splitter_core::{ArtifactDescriptor, FailureKind, JobFailure, JobOutcome, JobState};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(splitter_logging::initialize_for_tests);
}

#[derive(Default)]
struct Recorder {
    notices: Mutex<Vec<JobNotice>>,
}

impl Recorder {
    fn take(&self) -> Vec<JobNotice> {
        self.notices.lock().unwrap().drain(..).collect()
    }
}

impl JobObserver for Recorder {
    fn on_update(&self, message: &str, percentage: f64) {
        self.notices.lock().unwrap().push(JobNotice::Update {
            message: message.to_string(),
            percentage,
        });
    }

    fn on_done(&self, outcome: &JobOutcome) {
        self.notices
            .lock()
            .unwrap()
            .push(JobNotice::Done(outcome.clone()));
    }
}

fn upload() -> VideoUpload {
    VideoUpload::new("clip.mp4", b"not really a video".to_vec(), NonZeroU32::new(3).unwrap())
}

fn stream_client(server: &MockServer) -> SplitterClient {
    SplitterClient::new(ClientSettings::new(server.uri(), Deployment::Stream)).unwrap()
}

async fn mount_stream(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/split_video"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/event-stream"))
        .expect(1)
        .mount(server)
        .await;
}

/// Accepts one upload, answers with `head`, then holds the connection open silently.
async fn stalling_server(head: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !(request.ends_with(b"--\r\n") || request.ends_with(b"0\r\n\r\n")) {
            let read = socket.read(&mut buf).await.unwrap();
            if read == 0 {
                return;
            }
            request.extend_from_slice(&buf[..read]);
        }
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    format!("http://{addr}")
}

fn stalling_settings(base_url: String) -> ClientSettings {
    ClientSettings {
        submit_timeout: Duration::from_millis(300),
        idle_timeout: Duration::from_millis(300),
        ..ClientSettings::new(base_url, Deployment::Stream)
    }
}

fn update(message: &str, percentage: f64) -> JobNotice {
    JobNotice::Update {
        message: message.to_string(),
        percentage,
    }
}

#[tokio::test]
async fn streamed_job_reports_progress_then_artifacts() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: message:Starting\n\ndata: overall_progress:0\n\ndata: overall_progress:55.5\n\ndata: fragments:[\"a.mp4\",\"b.mp4\"]\n\n",
    )
    .await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(stream_client(&server));
    let session = run_job(&transport, &upload(), &recorder).await;

    let artifacts = vec![
        ArtifactDescriptor::positional(0, "a.mp4"),
        ArtifactDescriptor::positional(1, "b.mp4"),
    ];
    assert_eq!(
        recorder.take(),
        vec![
            update("Starting", 0.0),
            update("Starting", 0.0),
            update("Starting", 55.5),
            JobNotice::Done(JobOutcome::Artifacts(artifacts.clone())),
        ]
    );
    assert_eq!(*session.state(), JobState::Succeeded(artifacts));
    assert!(session.handle().is_none());
}

#[tokio::test]
async fn upload_carries_video_and_segment_duration() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/split_video"))
        .and(body_string_contains("name=\"segment_duration\""))
        .and(body_string_contains("filename=\"clip.mp4\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("data: fragments:[]\n\n", "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Recorder::default();
    let client = stream_client(&server);
    let transport = transport_for(&client);
    let session = run_job(transport.as_ref(), &upload(), &recorder).await;

    assert_eq!(recorder.take(), vec![JobNotice::Done(JobOutcome::NoArtifacts)]);
    assert_eq!(session.outcome(), Some(JobOutcome::NoArtifacts));
}

#[tokio::test]
async fn error_frame_fails_once_and_ignores_the_rest() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: message: Procesando fragmento 1 de 2...\n\n\
         data: error: Error al procesar el video: codec\n\n\
         data: overall_progress: 100.00\n\n\
         data: fragments:[\"a.mp4\"]\n\n",
    )
    .await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(stream_client(&server));
    let session = run_job(&transport, &upload(), &recorder).await;

    let failure = JobFailure::reported("Error al procesar el video: codec");
    assert_eq!(
        recorder.take(),
        vec![
            update("Procesando fragmento 1 de 2...", 0.0),
            JobNotice::Done(JobOutcome::Failed(failure.clone())),
        ]
    );
    assert_eq!(*session.state(), JobState::Failed(failure));
}

#[tokio::test]
async fn stream_closing_without_terminal_frame_fails() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: message: Todos los fragmentos creados.\n\ndata: overall_progress: 100.00\n\ndata: fragm",
    )
    .await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(stream_client(&server));
    let session = run_job(&transport, &upload(), &recorder).await;

    let notices = recorder.take();
    assert_eq!(
        notices.last(),
        Some(&JobNotice::Done(JobOutcome::Failed(JobFailure::unexpected_end())))
    );
    assert_eq!(notices.len(), 3);
    assert_eq!(
        *session.state(),
        JobState::Failed(JobFailure::unexpected_end())
    );
}

#[tokio::test]
async fn invalid_fragment_list_fails_the_job() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(&server, "data: fragments:{not json\n\n").await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(stream_client(&server));
    let session = run_job(&transport, &upload(), &recorder).await;

    match session.outcome() {
        Some(JobOutcome::Failed(failure)) => assert_eq!(failure.kind, FailureKind::Reported),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_upload_surfaces_server_error() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/split_video"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "Formato de archivo no permitido"})),
        )
        .mount(&server)
        .await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(stream_client(&server));
    let session = run_job(&transport, &upload(), &recorder).await;

    let failure = JobFailure::new(FailureKind::HttpStatus(400), "Formato de archivo no permitido");
    assert_eq!(
        recorder.take(),
        vec![JobNotice::Done(JobOutcome::Failed(failure.clone()))]
    );
    assert_eq!(*session.state(), JobState::Failed(failure));
}

#[tokio::test]
async fn slow_submission_times_out() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/split_video"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_raw("data: fragments:[]\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        submit_timeout: Duration::from_millis(50),
        ..ClientSettings::new(server.uri(), Deployment::Stream)
    };
    let recorder = Recorder::default();
    let transport = StreamTransport::new(SplitterClient::new(settings).unwrap());
    let session = run_job(&transport, &upload(), &recorder).await;

    match session.outcome() {
        Some(JobOutcome::Failed(failure)) => assert_eq!(failure.kind, FailureKind::Timeout),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    init_logging();
    let settings = ClientSettings {
        connect_timeout: Duration::from_millis(200),
        ..ClientSettings::new("http://127.0.0.1:9", Deployment::Stream)
    };
    let recorder = Recorder::default();
    let transport = StreamTransport::new(SplitterClient::new(settings).unwrap());
    let session = run_job(&transport, &upload(), &recorder).await;

    match session.outcome() {
        Some(JobOutcome::Failed(failure)) => assert_eq!(failure.kind, FailureKind::Network),
        other => panic!("expected network failure, got {other:?}"),
    }
}

#[tokio::test]
async fn stalled_error_body_times_out() {
    init_logging();
    let base_url = stalling_server(
        "HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{",
    )
    .await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(SplitterClient::new(stalling_settings(base_url)).unwrap());
    let session = tokio::time::timeout(
        Duration::from_secs(5),
        run_job(&transport, &upload(), &recorder),
    )
    .await
    .expect("job must end within its timeouts");

    match session.outcome() {
        Some(JobOutcome::Failed(failure)) => assert_eq!(failure.kind, FailureKind::Timeout),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(recorder.take().len(), 1);
}

#[tokio::test]
async fn silent_stream_times_out_after_progress() {
    init_logging();
    let base_url = stalling_server(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nTransfer-Encoding: chunked\r\n\r\n\
         18\r\ndata: message:Starting\n\n\r\n",
    )
    .await;

    let recorder = Recorder::default();
    let transport = StreamTransport::new(SplitterClient::new(stalling_settings(base_url)).unwrap());
    let session = tokio::time::timeout(
        Duration::from_secs(5),
        run_job(&transport, &upload(), &recorder),
    )
    .await
    .expect("job must end within its timeouts");

    let failure = JobFailure::new(FailureKind::Timeout, "no progress received for 300ms");
    assert_eq!(
        recorder.take(),
        vec![
            update("Starting", 0.0),
            JobNotice::Done(JobOutcome::Failed(failure.clone())),
        ]
    );
    assert_eq!(*session.state(), JobState::Failed(failure));
}
