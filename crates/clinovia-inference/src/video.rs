use crate::error::InferenceError;

/// File extensions accepted for echocardiogram uploads.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "m4v", "mkv"];

/// Default upload cap: 100 MiB.
pub const DEFAULT_MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// An uploaded echocardiogram, held in memory for the length of one request.
#[derive(Debug, Clone)]
pub struct VideoArtifact {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl VideoArtifact {
    pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }

    /// Accept by extension or by a `video/*` content type.
    pub fn has_video_format(&self) -> bool {
        let by_extension = self
            .extension()
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()));
        let by_content_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("video/"));
        by_extension || by_content_type
    }

    pub fn check(&self, max_bytes: usize) -> Result<(), InferenceError> {
        if self.bytes.is_empty() {
            return Err(InferenceError::UnsupportedArtifact(
                "video upload is empty".into(),
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(InferenceError::UnsupportedArtifact(format!(
                "video is {} bytes; limit is {max_bytes}",
                self.bytes.len()
            )));
        }
        if !self.has_video_format() {
            return Err(InferenceError::UnsupportedArtifact(format!(
                "unsupported video format (accepted: {})",
                VIDEO_EXTENSIONS.join(", ")
            )));
        }
        Ok(())
    }

    /// Name sent upstream; the service keys format detection off it.
    pub fn upload_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| "echo.avi".to_string())
    }
}
