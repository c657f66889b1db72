use bytes::BytesMut;
use splitter_core::ProgressEvent;
use splitter_logging::splitter_trace;

use crate::wire::{artifacts_from_fragments, FragmentEntry};

const FRAME_DELIMITER: &[u8] = b"\n\n";
const DATA_TAG: &str = "data:";
const MESSAGE_TAG: &str = "message:";
const PROGRESS_TAG: &str = "overall_progress:";
const ERROR_TAG: &str = "error:";
const FRAGMENTS_TAG: &str = "fragments:";

/// Incremental decoder for the `data:` event stream.
///
/// Chunks may split or batch frames arbitrarily; bytes after the last
/// delimiter stay buffered until a later chunk completes them. Framing works
/// on raw bytes, so a chunk boundary inside a multi-byte character is fine.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
    // Bytes already searched for a delimiter without success.
    scanned: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one transport chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete frame with its delimiter stripped, if one is buffered.
    pub fn next_frame(&mut self) -> Option<String> {
        // Step back one byte so a delimiter split across chunks is found.
        let start = self.scanned.saturating_sub(FRAME_DELIMITER.len() - 1);
        let found = self.buffer[start..]
            .windows(FRAME_DELIMITER.len())
            .position(|window| window == FRAME_DELIMITER);

        match found {
            Some(offset) => {
                let end = start + offset;
                let frame = self.buffer.split_to(end + FRAME_DELIMITER.len());
                self.scanned = 0;
                Some(String::from_utf8_lossy(&frame[..end]).into_owned())
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Lazily decode every complete frame currently buffered.
    pub fn events(&mut self) -> impl Iterator<Item = ProgressEvent> + '_ {
        std::iter::from_fn(move || self.next_frame()).filter_map(|frame| decode_frame(&frame))
    }

    /// Append `chunk` and collect the events it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ProgressEvent> {
        self.push(chunk);
        self.events().collect()
    }
}

/// Classify one frame. Returns `None` for frames that are dropped silently.
pub fn decode_frame(frame: &str) -> Option<ProgressEvent> {
    let frame = frame.trim_start_matches(&['\r', '\n'][..]);
    let Some(payload) = frame.strip_prefix(DATA_TAG) else {
        splitter_trace!("dropping untagged frame ({} bytes)", frame.len());
        return None;
    };
    let payload = payload.trim_start();

    if let Some(text) = payload.strip_prefix(MESSAGE_TAG) {
        return Some(ProgressEvent::Message(text.trim().to_string()));
    }
    if let Some(raw) = payload.strip_prefix(PROGRESS_TAG) {
        return match raw.trim().parse::<f64>() {
            Ok(value) if !value.is_nan() => Some(ProgressEvent::Progress(value)),
            _ => {
                splitter_trace!("dropping unparsable progress {:?}", raw.trim());
                None
            }
        };
    }
    if let Some(text) = payload.strip_prefix(ERROR_TAG) {
        return Some(ProgressEvent::Error(text.trim().to_string()));
    }
    if let Some(raw) = payload.strip_prefix(FRAGMENTS_TAG) {
        return Some(decode_fragments(raw.trim()));
    }

    splitter_trace!("dropping frame with unknown tag");
    None
}

// The fragment list is the terminal payload; a bad one must fail the job.
fn decode_fragments(raw: &str) -> ProgressEvent {
    match serde_json::from_str::<Vec<FragmentEntry>>(raw) {
        Ok(entries) => ProgressEvent::ArtifactsReady(artifacts_from_fragments(entries)),
        Err(_) => ProgressEvent::Error("The server sent an unreadable fragment list.".to_string()),
    }
}
