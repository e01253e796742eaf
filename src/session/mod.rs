//! Session handling
//!
//! # Components
//!
//! - `SessionCredentials`: the two externally minted cookies
//! - `sentinel`: classification of HTTP 200 bodies that actually mean
//!   "your session is gone"

mod credentials;
pub mod sentinel;

pub use credentials::SessionCredentials;
pub use sentinel::{
    detect, detect_bytes, detect_html, ensure_session, ensure_session_bytes, Sentinel,
};
