//! Crawler module for the e-SAJ portal
//!
//! This module contains the scraping logic, including:
//! - HTTP fetching under a deadline and cancellation token
//! - HTML and embedded JSON extraction
//! - The authenticated crawl client (process → documents)
//! - The unauthenticated OAB listing enumerator

mod client;
mod context;
mod fetcher;
mod folder;
mod pagination;
mod parser;

pub use client::{DownloadedDocument, EsajClient};
pub use context::CrawlContext;
pub use fetcher::{build_http_client, fetch_bytes, fetch_text};
pub use folder::{DigitalFolderNode, NodeData, StatusAllowList};
pub use pagination::OabEnumerator;
pub use parser::{
    collapse_whitespace, extract_basic_info, extract_folder_path, extract_penultimate_page,
    extract_process_code, extract_request_scope, extract_seeds, strip_whitespace,
    BasicInfoFields, LINKED_DOCUMENT_HREF,
};
