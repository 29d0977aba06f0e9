//! Local filesystem storage for recorded OSCE videos.
//!
//! Files live flat under a single directory. Names are validated so a request
//! can never address anything outside it.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Extensions accepted for upload, with the MIME type served back
const VIDEO_TYPES: &[(&str, &str)] = &[
    ("webm", "video/webm"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
];

/// Distinguishes temporary files of overlapping uploads
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("Invalid video file name: {0}")]
    InvalidFileName(String),

    #[error("Unsupported video type: {0}")]
    UnsupportedType(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Video exceeds the maximum upload size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of interpreting a `Range` header against a file length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// Serve the whole file (no header, or a header we do not honour)
    Full,
    /// Inclusive byte range
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

impl RangeRequest {
    /// Parses a single `bytes=` range.
    ///
    /// Malformed headers, other units and multi-range requests fall back to
    /// [`RangeRequest::Full`].
    pub fn parse(header: Option<&str>, len: u64) -> Self {
        let Some(byte_range) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };
        if byte_range.contains(',') {
            return Self::Full;
        }
        let Some((start, end)) = byte_range.trim().split_once('-') else {
            return Self::Full;
        };

        match (start.trim(), end.trim()) {
            ("", "") => Self::Full,
            ("", suffix) => match suffix.parse::<u64>() {
                Ok(0) => Self::Unsatisfiable,
                Ok(_) if len == 0 => Self::Unsatisfiable,
                Ok(n) => Self::Partial {
                    start: len.saturating_sub(n),
                    end: len - 1,
                },
                Err(_) => Self::Full,
            },
            (start, "") => match start.parse::<u64>() {
                Ok(s) if s >= len => Self::Unsatisfiable,
                Ok(s) => Self::Partial {
                    start: s,
                    end: len - 1,
                },
                Err(_) => Self::Full,
            },
            (start, end) => match (start.parse::<u64>(), end.parse::<u64>()) {
                (Ok(s), Ok(e)) if s > e => Self::Full,
                (Ok(s), Ok(_)) if s >= len => Self::Unsatisfiable,
                (Ok(s), Ok(e)) => Self::Partial {
                    start: s,
                    end: e.min(len - 1),
                },
                _ => Self::Full,
            },
        }
    }
}

/// Validates a bare file name and returns its MIME type.
pub fn video_content_type(file_name: &str) -> Result<&'static str, VideoError> {
    let invalid = file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\', '\0'])
        || file_name.contains("..");
    if invalid {
        return Err(VideoError::InvalidFileName(file_name.to_string()));
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| VideoError::UnsupportedType(file_name.to_string()))?;

    VIDEO_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or(VideoError::UnsupportedType(extension))
}

#[derive(Debug, Clone)]
pub struct VideoStore {
    root: PathBuf,
    max_upload_bytes: u64,
}

impl VideoStore {
    pub fn new(root: impl Into<PathBuf>, max_upload_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    fn path_for(&self, file_name: &str) -> Result<PathBuf, VideoError> {
        video_content_type(file_name)?;
        Ok(self.root.join(file_name))
    }

    /// Streams `body` into `file_name`, replacing any existing file.
    ///
    /// Each upload writes its own hidden temporary file and renames it into
    /// place, so concurrent uploads to one name never share bytes and a failed
    /// upload never leaves a partial video behind.
    pub async fn save<S, E>(&self, file_name: &str, body: S) -> Result<u64, VideoError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let target = self.path_for(file_name)?;
        fs::create_dir_all(&self.root).await?;

        let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .root
            .join(format!(".{file_name}.{}-{seq}.part", std::process::id()));

        let outcome = async {
            let written = self.write_upload(&temp, body).await?;
            fs::rename(&temp, &target).await?;
            Ok::<_, VideoError>(written)
        }
        .await;

        match outcome {
            Ok(written) => {
                tracing::info!(file_name = %file_name, bytes = written, "Stored video");
                Ok(written)
            }
            Err(e) => {
                match fs::remove_file(&temp).await {
                    Err(remove_err) if remove_err.kind() != std::io::ErrorKind::NotFound => {
                        tracing::warn!(
                            path = %temp.display(),
                            error = %remove_err,
                            "Failed to remove partial upload"
                        );
                    }
                    _ => {}
                }
                Err(e)
            }
        }
    }

    async fn write_upload<S, E>(&self, temp: &Path, mut body: S) -> Result<u64, VideoError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let mut file = File::create(temp).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                VideoError::Io(std::io::Error::other(format!("upload interrupted: {e}")))
            })?;

            written += chunk.len() as u64;
            if written > self.max_upload_bytes {
                return Err(VideoError::TooLarge {
                    limit: self.max_upload_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }

    /// Opens a stored video, returning the handle and its length.
    pub async fn open(&self, file_name: &str) -> Result<(File, u64), VideoError> {
        let path = self.path_for(file_name)?;
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VideoError::NotFound(file_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(VideoError::NotFound(file_name.to_string()));
        }
        Ok((file, metadata.len()))
    }
}
