use crate::ArtifactDescriptor;

/// Preview plus individual download affordance for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub label: String,
    pub preview_url: String,
    pub download_url: String,
    pub download_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Entries in server emission order and the matching bulk-download manifest.
    Artifacts {
        entries: Vec<ArtifactEntry>,
        manifest: Vec<String>,
    },
    /// The job succeeded without producing any artifact.
    NoArtifacts,
}

/// Build the presentation for a terminal artifact list.
pub fn present(artifacts: &[ArtifactDescriptor]) -> Presentation {
    if artifacts.is_empty() {
        return Presentation::NoArtifacts;
    }

    let entries: Vec<ArtifactEntry> = artifacts
        .iter()
        .map(|artifact| ArtifactEntry {
            label: artifact.name.clone(),
            preview_url: artifact.preview_url().to_string(),
            download_url: artifact.url.clone(),
            download_name: artifact.file_name.clone(),
        })
        .collect();
    let manifest = entries
        .iter()
        .map(|entry| entry.download_name.clone())
        .collect();

    Presentation::Artifacts { entries, manifest }
}
