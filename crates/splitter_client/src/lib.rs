//! Splitter client: service API, event stream decoding, and job transports.
mod api;
mod config;
mod decode;
mod download;
mod filename;
mod persist;
mod poll;
mod stream;
mod tracker;
mod transport;
mod types;
mod wire;

pub use api::SplitterClient;
pub use config::{ClientSettings, Deployment};
pub use decode::{decode_frame, FrameDecoder};
pub use download::{save_archive, save_each, ARCHIVE_FILE_NAME};
pub use filename::safe_file_name;
pub use persist::{ensure_target_dir, AtomicFileWriter, PersistError};
pub use poll::PollTransport;
pub use stream::StreamTransport;
pub use tracker::{ChannelObserver, JobNotice, JobObserver, Tracker};
pub use transport::{run_job, transport_for, Transport};
pub use types::{ApiError, VideoUpload};
pub use wire::{
    artifacts_from_fragments, DescribedFragment, FragmentEntry, ProgressValue, TaskState,
    TaskStatus,
};
