//! The documents kept in a data directory.

use std::fmt;

const EXTENSION: &str = "automerge";

/// One Automerge file in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    /// Collections and documents of the local store.
    Store,
    /// Registered accounts and their password hashes.
    Accounts,
}

impl DocType {
    fn stem(self) -> &'static str {
        match self {
            DocType::Store => "store",
            DocType::Accounts => "accounts",
        }
    }

    /// `store.automerge`, `accounts.automerge`
    pub fn file_name(self) -> String {
        format!("{}.{}", self.stem(), EXTENSION)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}
