//! On-disk persistence for the local store and account files.
//!
//! Each file holds one Automerge document in the data directory:
//! - `store.automerge`: every document of the local store, keyed by its path
//! - `accounts.automerge`: email -> account record for the local auth provider

mod doc_type;
mod storage;

pub use doc_type::DocType;
pub use storage::{DocumentStorage, FileStamp, StorageError};
