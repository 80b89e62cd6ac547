//! Content store for document bytes on the local filesystem.
//!
//! Uploaded bytes land under a single content root, bucketed by ingestion
//! date (`YYYY/MM/DD`). Filenames are sanitized and deduplicated with a
//! numeric suffix before the extension, so two uploads of `scan.png` on the
//! same day become `scan.png` and `scan_1.png` without overwriting each
//! other.

use std::path::{Path, PathBuf};

use jiff::civil::Date;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::TRACING_TARGET_FS;

/// A file persisted by the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Final path of the stored bytes, collision suffix included.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size_bytes: u64,
}

impl StoredFile {
    /// Returns the stored path as a UTF-8 string.
    ///
    /// Paths are built from a sanitized filename and a date bucket, both of
    /// which are valid UTF-8, so this never loses information.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Strips any directory components from a caller-supplied filename.
///
/// Returns an invalid input error for empty names and names that resolve to
/// no final path component (`.`, `..`, trailing separators).
pub fn sanitize_filename(filename: &str) -> Result<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() || trimmed.contains('\0') {
        return Err(Error::invalid_input().with_message("filename must not be empty"));
    }

    let name = Path::new(trimmed)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::invalid_input().with_message(format!("invalid filename: {trimmed}"))
        })?;

    if name == "." || name == ".." {
        return Err(Error::invalid_input().with_message(format!("invalid filename: {trimmed}")));
    }

    Ok(name.to_owned())
}

/// Filesystem content store rooted at a single directory.
///
/// Cheap to clone; all state is the root path.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Creates a content store rooted at `root`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the content root directory.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under the date bucket for `date`, avoiding collisions.
    ///
    /// The write uses `create_new`, so the existence check and the file
    /// creation are a single atomic filesystem operation; concurrent stores
    /// of the same filename each land on their own suffixed path.
    #[tracing::instrument(skip(self, bytes), target = TRACING_TARGET_FS)]
    pub async fn store(&self, filename: &str, date: Date, bytes: &[u8]) -> Result<StoredFile> {
        let filename = sanitize_filename(filename)?;
        let bucket = self.date_bucket(date);
        fs::create_dir_all(&bucket).await.map_err(|e| {
            Error::io()
                .with_message(format!("failed to create {}", bucket.display()))
                .with_source(e)
        })?;

        let (stem, extension) = split_filename(&filename);

        let mut counter = 0u32;
        loop {
            let candidate = if counter == 0 {
                filename.clone()
            } else if extension.is_empty() {
                format!("{stem}_{counter}")
            } else {
                format!("{stem}_{counter}.{extension}")
            };
            let path = bucket.join(&candidate);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await.map_err(|e| {
                        Error::io()
                            .with_message(format!("failed to write {}", path.display()))
                            .with_source(e)
                    })?;
                    file.flush().await.map_err(Error::from)?;

                    tracing::debug!(
                        target: TRACING_TARGET_FS,
                        path = %path.display(),
                        size_bytes = bytes.len(),
                        collisions = counter,
                        "stored content file"
                    );

                    return Ok(StoredFile {
                        path,
                        size_bytes: bytes.len() as u64,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    counter += 1;
                }
                Err(e) => {
                    return Err(Error::io()
                        .with_message(format!("failed to create {}", path.display()))
                        .with_source(e));
                }
            }
        }
    }

    /// Reads a stored file back into memory.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_FS)]
    pub async fn read(&self, path: impl AsRef<Path> + std::fmt::Debug) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).await.map_err(|e| {
            Error::io()
                .with_message(format!("failed to read {}", path.display()))
                .with_source(e)
        })
    }

    /// Removes a stored file, best effort.
    ///
    /// Returns whether the file was actually removed; a missing file or a
    /// filesystem error both yield `false` rather than an error, since
    /// metadata deletion must not depend on byte removal.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_FS)]
    pub async fn remove(&self, path: impl AsRef<Path> + std::fmt::Debug) -> bool {
        let path = path.as_ref();
        match fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    target: TRACING_TARGET_FS,
                    path = %path.display(),
                    error = %e,
                    "content file not removed"
                );
                false
            }
        }
    }

    /// Returns whether a stored file exists on disk.
    pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
        fs::try_exists(path.as_ref()).await.unwrap_or(false)
    }

    fn date_bucket(&self, date: Date) -> PathBuf {
        self.root.join(format!(
            "{:04}/{:02}/{:02}",
            date.year(),
            date.month(),
            date.day()
        ))
    }
}

/// Splits a filename into stem and extension, both without the dot.
fn split_filename(filename: &str) -> (&str, &str) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (filename, ""),
    }
}

/// Guesses the MIME type of a stored file from its extension.
///
/// Unknown extensions map to `application/octet-stream`; the OCR request
/// validator decides whether that is acceptable.
pub fn mime_type_for_path(path: impl AsRef<Path>) -> &'static str {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("scan.png").unwrap(), "scan.png");
        assert_eq!(sanitize_filename("/etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("a/b/../c.txt").unwrap(), "c.txt");
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("   ").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn guesses_mime_type_from_extension() {
        assert_eq!(mime_type_for_path("a/scan.PNG"), "image/png");
        assert_eq!(mime_type_for_path("doc.pdf"), "application/pdf");
        assert_eq!(mime_type_for_path("unknown.xyz"), "application/octet-stream");
        assert_eq!(mime_type_for_path("no_extension"), "application/octet-stream");
    }

    #[test]
    fn split_keeps_last_extension() {
        assert_eq!(split_filename("scan.png"), ("scan", "png"));
        assert_eq!(split_filename("archive.tar.gz"), ("archive.tar", "gz"));
        assert_eq!(split_filename("README"), ("README", ""));
        assert_eq!(split_filename(".hidden"), (".hidden", ""));
    }

    #[tokio::test]
    async fn store_buckets_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());

        let stored = store
            .store("scan.png", date(2026, 3, 14), b"bytes")
            .await
            .unwrap();

        assert!(stored.path.ends_with("2026/03/14/scan.png"));
        assert_eq!(stored.size_bytes, 5);
        assert!(store.exists(&stored.path).await);
    }

    #[tokio::test]
    async fn store_avoids_collisions_with_numeric_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let day = date(2026, 3, 14);

        let first = store.store("scan.png", day, b"first").await.unwrap();
        let second = store.store("scan.png", day, b"second").await.unwrap();
        let third = store.store("scan.png", day, b"third").await.unwrap();

        assert!(first.path.ends_with("scan.png"));
        assert!(second.path.ends_with("scan_1.png"));
        assert!(third.path.ends_with("scan_2.png"));

        // No overwrite happened.
        assert_eq!(tokio::fs::read(&first.path).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(&second.path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn remove_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());

        let stored = store
            .store("doc.pdf", date(2026, 1, 2), b"pdf")
            .await
            .unwrap();

        assert!(store.remove(&stored.path).await);
        assert!(!store.remove(&stored.path).await);
        assert!(!store.exists(&stored.path).await);
    }
}
