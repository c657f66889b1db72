use std::path::PathBuf;

use splitter_core::ArtifactEntry;
use splitter_logging::splitter_info;

use crate::{safe_file_name, ApiError, AtomicFileWriter, SplitterClient};

pub const ARCHIVE_FILE_NAME: &str = "fragments.zip";

/// Request the server-side archive of `manifest` and save it in the writer's directory.
pub async fn save_archive(
    client: &SplitterClient,
    manifest: &[String],
    writer: &AtomicFileWriter,
) -> Result<PathBuf, ApiError> {
    let archive = client.download_all(manifest).await?;
    let path = writer.write(ARCHIVE_FILE_NAME, &archive)?;
    splitter_info!(
        "saved archive of {} files ({} bytes) to {:?}",
        manifest.len(),
        archive.len(),
        path
    );
    Ok(path)
}

/// Download every entry in order, pausing `download_delay` between files.
///
/// Stops at the first failure; files already saved are kept.
pub async fn save_each(
    client: &SplitterClient,
    entries: &[ArtifactEntry],
    writer: &AtomicFileWriter,
) -> Result<Vec<PathBuf>, ApiError> {
    let delay = client.settings().download_delay;
    let mut saved = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }
        let bytes = client.download(&entry.download_url).await?;
        let path = writer.write(&safe_file_name(&entry.download_name), &bytes)?;
        splitter_info!("saved {} ({} bytes)", entry.label, bytes.len());
        saved.push(path);
    }
    Ok(saved)
}
