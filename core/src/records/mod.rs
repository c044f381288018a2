//! The records catalog: key coding plus list/download/head/upload/delete.

mod catalog;
mod key;
mod models;

pub use catalog::RecordsCatalog;
pub use key::{make_key, make_prefix, parse_key, RecordKey};
pub use models::{ListRequest, ListResponse, Record, RecordContent, SortOrder};
