use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Transient storage for uploaded images. Files are never removed here.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Creates the upload directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the bytes as `<timestamp>_<uuid>_<sanitized name>`.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(unique_name(filename));

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;

        log::info!("💾 Saved upload: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

fn unique_name(filename: &str) -> String {
    format!(
        "{}_{}_{}",
        chrono::Utc::now().format("%Y%m%d%H%M%S"),
        uuid::Uuid::new_v4().simple(),
        sanitize_filename(filename)
    )
}

/// Keeps only the last path component and replaces spaces with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .replace(' ', "_");

    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base
    }
}
