//! Output module for what a crawl produces
//!
//! This module handles:
//! - Writing downloaded documents through a `DocumentSink`
//! - Exporting collected records as JSON
//! - Reporting collection statistics

mod json;
mod sink;
pub mod stats;
mod traits;

pub use json::{basic_info_to_json, write_basic_info_json};
pub use sink::{document_key, FsDocumentSink};
pub use stats::{print_statistics, CollectionStatistics};
pub use traits::{DocumentSink, OutputError, OutputResult};

use crate::crawler::DownloadedDocument;

/// Hands every document of a crawl to `sink`, returning the keys in order
pub fn store_documents(
    sink: &mut dyn DocumentSink,
    process_id: &str,
    documents: &[DownloadedDocument],
) -> OutputResult<Vec<String>> {
    documents
        .iter()
        .map(|doc| sink.store(process_id, &doc.title, &doc.bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemorySink {
        stored: Vec<(String, usize)>,
    }

    impl DocumentSink for MemorySink {
        fn store(&mut self, process_id: &str, title: &str, bytes: &[u8]) -> OutputResult<String> {
            let key = document_key(process_id, title);
            self.stored.push((key.clone(), bytes.len()));
            Ok(key)
        }
    }

    #[test]
    fn test_store_documents_keeps_order() {
        let mut sink = MemorySink::default();
        let documents = vec![
            DownloadedDocument {
                title: "Páginas 17 - 17".to_string(),
                bytes: vec![1, 2],
            },
            DownloadedDocument {
                title: "Páginas 17 - 17 (2)".to_string(),
                bytes: vec![3],
            },
        ];

        let keys = store_documents(&mut sink, "1", &documents).unwrap();
        assert_eq!(keys, vec!["1_Páginas 17 - 17.pdf", "1_Páginas 17 - 17 (2).pdf"]);
        assert_eq!(sink.stored[1].1, 1);
    }
}
