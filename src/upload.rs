//! Multipart file uploads.

use std::fs;
use std::io;
use std::path::Path;

/// A single file extracted from a `multipart/form-data` body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

impl UploadedFile {
    pub(crate) fn new(name: String, filename: String, content_type: String, data: Vec<u8>) -> Self {
        UploadedFile { name, filename, content_type, data }
    }

    /// The form field name this file was submitted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The filename the client reported.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The part's `Content-Type`, or `application/octet-stream` if absent.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The raw file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Writes the file's bytes to `path`, creating parent directories as
    /// needed. Returns `false` (rather than propagating the error) on any
    /// failure, mirroring the save-failures-are-non-fatal behavior of the
    /// original upload helper.
    pub fn save(&self, path: impl AsRef<Path>) -> bool {
        self.try_save(path).is_ok()
    }

    fn try_save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deep/avatar.png");
        let file = UploadedFile::new(
            "avatar".into(),
            "avatar.png".into(),
            "image/png".into(),
            vec![1, 2, 3, 4],
        );
        assert!(file.save(&target));
        assert_eq!(std::fs::read(&target).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn save_reports_failure_instead_of_panicking() {
        let file = UploadedFile::new("f".into(), "f.txt".into(), "text/plain".into(), vec![]);
        // A path under a file (not a directory) cannot be created.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(!file.save(blocker.join("inside.txt")));
    }
}
