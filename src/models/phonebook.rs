//! Local phonebook entries.

use serde::{Deserialize, Serialize};

/// Tag applied to every contact the job creates.
pub const FAVORITE_TAG: &str = "Favorite";
/// Device kind for directory devices.
pub const VIDEO_DEVICE: &str = "Video";
/// Dial protocol for workspace identifiers.
pub const SPARK_PROTOCOL: &str = "Spark";

/// A folder in the local phonebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFolder {
    pub folder_id: String,
    pub name: String,
}

/// A contact stored in the local phonebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalContact {
    pub contact_id: String,
    pub folder_id: String,
    pub name: String,
    pub number: String,
    pub device: String,
    pub protocol: String,
    pub tag: String,
}

/// Arguments for adding a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub folder_id: String,
    pub name: String,
    pub number: String,
    pub device: &'static str,
    pub protocol: &'static str,
    pub tag: &'static str,
}

impl NewContact {
    /// A favorite video contact dialed by workspace identifier.
    pub fn favorite(folder_id: &str, name: &str, number: &str) -> Self {
        Self {
            folder_id: folder_id.to_string(),
            name: name.to_string(),
            number: number.to_string(),
            device: VIDEO_DEVICE,
            protocol: SPARK_PROTOCOL,
            tag: FAVORITE_TAG,
        }
    }
}
