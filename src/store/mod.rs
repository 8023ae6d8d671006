//! Storage adapters: the persisted credential slot and the local phonebook.

pub mod credential;
pub mod phonebook;

pub use credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use phonebook::{JsonPhonebook, Phonebook, PhonebookSnapshot};

use std::path::{Path, PathBuf};

/// Sibling path used for write-then-rename, keeping the full file name so
/// stores sharing a stem never share a temp file.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
