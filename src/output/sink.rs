//! Filesystem document sink

use crate::output::traits::{DocumentSink, OutputError, OutputResult};
use std::path::{Path, PathBuf};

/// Builds the sink key of a document
///
/// Characters that would turn the title into a path are replaced, so every
/// key stays a single file name.
///
/// # Example
///
/// ```
/// use esaj_crawler::output::document_key;
///
/// assert_eq!(
///     document_key("1029989-06.2022.8.26.0053", "Páginas 1 - 1"),
///     "1029989-06.2022.8.26.0053_Páginas 1 - 1.pdf"
/// );
/// assert_eq!(document_key("1", "a/b"), "1_a-b.pdf");
/// ```
pub fn document_key(process_id: &str, title: &str) -> String {
    let safe_title: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    format!("{}_{}.pdf", process_id.trim(), safe_title)
}

/// Writes every document as a file under one directory
#[derive(Debug, Clone)]
pub struct FsDocumentSink {
    dir: PathBuf,
}

impl FsDocumentSink {
    /// Creates the sink, creating `dir` when missing
    pub fn new(dir: impl Into<PathBuf>) -> OutputResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl DocumentSink for FsDocumentSink {
    fn store(&mut self, process_id: &str, title: &str, bytes: &[u8]) -> OutputResult<String> {
        if process_id.trim().is_empty() {
            return Err(OutputError::Write("empty process id".to_string()));
        }

        let key = document_key(process_id, title);
        let path = self.path_for(&key);
        std::fs::write(&path, bytes)?;

        tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_replaces_separators() {
        assert_eq!(
            document_key("1029989-06.2022.8.26.0053", "Certidão 1/2"),
            "1029989-06.2022.8.26.0053_Certidão 1-2.pdf"
        );
        assert_eq!(document_key("1", "a\\b\nc"), "1_a-b c.pdf");
    }

    #[test]
    fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsDocumentSink::new(dir.path().join("docs")).unwrap();

        let key = sink
            .store("1029989-06.2022.8.26.0053", "Páginas 1 - 1", b"%PDF-1.4")
            .unwrap();

        assert_eq!(key, "1029989-06.2022.8.26.0053_Páginas 1 - 1.pdf");
        let written = std::fs::read(sink.path_for(&key)).unwrap();
        assert_eq!(written, b"%PDF-1.4");
    }

    #[test]
    fn test_store_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsDocumentSink::new(dir.path()).unwrap();

        sink.store("1", "t", b"old").unwrap();
        let key = sink.store("1", "t", b"new").unwrap();

        assert_eq!(std::fs::read(sink.path_for(&key)).unwrap(), b"new");
    }

    #[test]
    fn test_store_rejects_empty_process_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsDocumentSink::new(dir.path()).unwrap();
        assert!(matches!(
            sink.store(" ", "t", b""),
            Err(OutputError::Write(_))
        ));
    }
}
