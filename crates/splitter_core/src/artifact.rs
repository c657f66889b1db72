use url::Url;

/// One output file of a finished job, in server emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Absolute or root-relative locator of the file.
    pub url: String,
    /// Display name shown next to the preview.
    pub name: String,
    /// Name the file is saved under and listed in bulk-download manifests.
    pub file_name: String,
    /// Separate preview locator when the server supplies one.
    pub preview_url: Option<String>,
}

impl ArtifactDescriptor {
    /// Artifact reported as a bare URL at `index` (0-based) of the server list.
    ///
    /// The display name is synthesized as `Part {index + 1}` while the saved
    /// file keeps the URL's last path segment.
    pub fn positional(index: usize, url: impl Into<String>) -> Self {
        let url = url.into();
        let name = format!("Part {}", index + 1);
        let file_name = last_path_segment(&url).unwrap_or_else(|| name.clone());
        Self {
            url,
            name,
            file_name,
            preview_url: None,
        }
    }

    /// Artifact for which the server supplied its own file name.
    pub fn named(url: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            url: url.into(),
            file_name: name.clone(),
            name,
            preview_url: None,
        }
    }

    pub fn with_preview(mut self, preview_url: impl Into<String>) -> Self {
        self.preview_url = Some(preview_url.into());
        self
    }

    pub fn preview_url(&self) -> &str {
        self.preview_url.as_deref().unwrap_or(&self.url)
    }
}

/// Last non-empty path segment of an absolute, root-relative, or relative URL.
pub fn last_path_segment(url: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let parsed = Url::parse(url).or_else(|_| base.join(url)).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(ToOwned::to_owned)
}
