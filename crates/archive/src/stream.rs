//! Lazy zip-container byte stream over a directory's files.
//!
//! The encoder task writes through [`async_zip`]'s streaming writer into a
//! bounded in-process pipe; [`ArchiveStream::next_fragment`] pulls from the
//! other end. Backpressure from the pipe keeps the producer suspended while
//! the consumer is off uploading, so memory stays bounded regardless of
//! archive size.

use std::path::{Path, PathBuf};

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{AttributeCompatibility, Compression, ZipDateTime, ZipEntryBuilder};
use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;
use tokio_util::compat::FuturesAsyncWriteCompatExt;
use tracing::debug;

use crate::ArchiveError;

/// Upper bound on a single read while feeding file contents to the
/// encoder. Files larger than this are fed in multiple reads so they are
/// never resident in full.
pub const FILE_READ_CHUNK: usize = 1024 * 1024 * 1024;

/// Permission bits stamped on every archive entry.
pub const ENTRY_PERMISSIONS: u16 = 0o600;

/// Capacity of the pipe between the encoder task and the consumer. This is
/// the only producer/consumer overlap: once it fills, the encoder suspends
/// until the consumer pulls again.
const PIPE_CAPACITY: usize = 64 * 1024;

/// Scratch size for fragments handed to the consumer.
const FRAGMENT_SIZE: usize = 64 * 1024;

/// Compression applied to archive entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    #[default]
    Deflate,
    /// No compression. Entry payloads appear verbatim in the stream.
    Stored,
}

impl CompressionMode {
    fn compression(self) -> Compression {
        match self {
            CompressionMode::Deflate => Compression::Deflate,
            CompressionMode::Stored => Compression::Stored,
        }
    }
}

/// A lazy, finite, non-restartable stream of zip-container bytes covering
/// every regular file directly inside a directory (non-recursive).
///
/// Entries are sorted by file name and all carry the same modification
/// timestamp, captured once when the stream is opened. The 64-bit size and
/// offset format is selected unconditionally so archives past 4 GiB encode
/// correctly.
///
/// Once [`next_fragment`](Self::next_fragment) has returned `None` the
/// stream is exhausted; re-streaming means opening a new one.
pub struct ArchiveStream {
    reader: DuplexStream,
    producer: Option<JoinHandle<Result<(), ArchiveError>>>,
    buf: Vec<u8>,
}

impl ArchiveStream {
    /// Opens a stream over `dir`. The directory is not touched until the
    /// first fragment is pulled.
    pub fn open(dir: impl Into<PathBuf>, mode: CompressionMode) -> Self {
        let dir = dir.into();
        // One timestamp for every entry, captured at stream start.
        let modified_at = Utc::now();
        let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
        let producer = tokio::spawn(async move { encode(&dir, mode, modified_at, writer).await });
        Self {
            reader,
            producer: Some(producer),
            buf: vec![0u8; FRAGMENT_SIZE],
        }
    }

    /// Returns the next byte fragment, or `None` once the archive is
    /// complete. A file that vanishes or becomes unreadable mid-stream
    /// surfaces here as an error; the stream is unusable afterwards.
    pub async fn next_fragment(&mut self) -> Result<Option<&[u8]>, ArchiveError> {
        let n = self.reader.read(&mut self.buf).await?;
        if n == 0 {
            // EOF also covers the encoder bailing out early, so surface its
            // result before reporting completion.
            if let Some(handle) = self.producer.take() {
                handle
                    .await
                    .map_err(|e| ArchiveError::Task(e.to_string()))??;
            }
            return Ok(None);
        }
        Ok(Some(&self.buf[..n]))
    }
}

async fn encode(
    dir: &Path,
    mode: CompressionMode,
    modified_at: chrono::DateTime<Utc>,
    sink: DuplexStream,
) -> Result<(), ArchiveError> {
    // 64-bit sizes and offsets unconditionally, so the container stays
    // valid past 4 GiB no matter what the bag holds.
    let mut writer = ZipFileWriter::with_tokio(sink).force_zip64();

    let mut names = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name());
        }
    }
    names.sort();

    debug!(dir = %dir.display(), files = names.len(), "streaming archive");

    for name in names {
        let entry_name = name.to_string_lossy().into_owned();
        let builder = ZipEntryBuilder::new(entry_name.into(), mode.compression())
            .attribute_compatibility(AttributeCompatibility::Unix)
            .unix_permissions(ENTRY_PERMISSIONS)
            .last_modification_date(ZipDateTime::from_chrono(&modified_at));

        let mut entry_writer = writer.write_entry_stream(builder).await?.compat_write();
        copy_file(&dir.join(&name), &mut entry_writer).await?;
        entry_writer.into_inner().close().await?;
    }

    writer.close().await?;
    Ok(())
}

/// Feeds one file into the encoder in bounded reads.
async fn copy_file(
    path: &Path,
    sink: &mut (impl AsyncWrite + Unpin),
) -> Result<(), ArchiveError> {
    let mut file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let mut buf = vec![0u8; FILE_READ_CHUNK.min(len.max(1) as usize)];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await?;
    }
    Ok(())
}
