//! Process identifiers and the records produced by crawling
//!
//! - `ProcessId` / `decompose`: the pure identifier codec
//! - `ProcessSeed`: one listing entry found by OAB enumeration
//! - `ProcessBasicInfo`: header data read from a process page

mod identifier;
mod model;

pub use identifier::{decompose, ProcessId};
pub use model::{ProcessBasicInfo, ProcessSeed};
