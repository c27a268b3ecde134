/// Uploaded media held for the duration of one ingestion request.
///
/// Parts up to the memory threshold stay in memory; anything larger is
/// spilled to a temp file that is removed when the upload is dropped.
use bytes::{Bytes, BytesMut};
use std::io;
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;

#[derive(Debug)]
pub enum MediaBody {
    Memory(Bytes),
    Spilled { path: TempPath, len: u64 },
}

#[derive(Debug)]
pub struct MediaUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub body: MediaBody,
}

impl MediaUpload {
    pub fn from_bytes(bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        Self {
            filename: None,
            content_type: content_type.map(str::to_string),
            body: MediaBody::Memory(bytes.into()),
        }
    }

    pub fn len(&self) -> u64 {
        match &self.body {
            MediaBody::Memory(bytes) => bytes.len() as u64,
            MediaBody::Spilled { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_spilled(&self) -> bool {
        matches!(self.body, MediaBody::Spilled { .. })
    }

    /// Path of the spill file, if any.
    pub fn spill_path(&self) -> Option<&Path> {
        match &self.body {
            MediaBody::Spilled { path, .. } => Some(&**path),
            MediaBody::Memory(_) => None,
        }
    }

    /// Full content, read back from disk when spilled.
    pub async fn read_all(&self) -> io::Result<Bytes> {
        match &self.body {
            MediaBody::Memory(bytes) => Ok(bytes.clone()),
            MediaBody::Spilled { path, .. } => {
                tokio::fs::read(&**path).await.map(Bytes::from)
            }
        }
    }
}

/// Incremental writer implementing the memory/spill policy.
pub struct MediaBuffer {
    threshold: usize,
    memory: BytesMut,
    spill: Option<(tokio::fs::File, TempPath)>,
    len: u64,
}

impl MediaBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            memory: BytesMut::new(),
            spill: None,
            len: 0,
        }
    }

    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.len += chunk.len() as u64;

        if let Some((file, _)) = self.spill.as_mut() {
            return file.write_all(chunk).await;
        }

        if self.memory.len() + chunk.len() <= self.threshold {
            self.memory.extend_from_slice(chunk);
            return Ok(());
        }

        let (file, path) = NamedTempFile::new()?.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        file.write_all(&self.memory).await?;
        file.write_all(chunk).await?;
        tracing::debug!(
            path = %path.display(),
            threshold = self.threshold,
            "media part exceeded memory threshold, spilled to disk"
        );

        self.memory = BytesMut::new();
        self.spill = Some((file, path));
        Ok(())
    }

    pub async fn finish(self) -> io::Result<MediaBody> {
        match self.spill {
            Some((mut file, path)) => {
                file.flush().await?;
                file.sync_all().await?;
                Ok(MediaBody::Spilled {
                    path,
                    len: self.len,
                })
            }
            None => Ok(MediaBody::Memory(self.memory.freeze())),
        }
    }
}
