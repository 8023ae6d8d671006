//! Directory device records and the per-cycle favorites map.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Webex IDs are standard base64 but often arrive without padding.
const WORKSPACE_ID_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A device that should appear as a favorite contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Display name, used as the contact name
    pub name: String,
    /// Dialable identifier derived from the workspace reference
    pub contact_id: String,
}

/// Mapping of tag to the devices carrying it, in configured tag order.
pub type FavoritesMap = Vec<(String, Vec<DeviceRecord>)>;

/// One item of the directory `devices` listing. Only the fields we use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDevice {
    #[serde(default)]
    pub display_name: String,
    pub workspace_id: Option<String>,
}

/// Directory `devices` listing body.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryListing {
    #[serde(default)]
    pub items: Vec<DirectoryDevice>,
}

/// Decode a workspace reference and return its final path segment.
///
/// `Y2lzY29zcGFyazovL3VzL1BMQUNFL2FiYzEyMw` decodes to
/// `ciscospark://us/PLACE/abc123`, yielding `abc123`.
pub fn contact_id_from_workspace_id(workspace_id: &str) -> Option<String> {
    let bytes = WORKSPACE_ID_ENGINE.decode(workspace_id.trim()).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let id = decoded.rsplit('/').next()?;
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

impl DirectoryDevice {
    /// Normalize into a [`DeviceRecord`], or `None` if the workspace reference
    /// is missing or undecodable.
    pub fn to_record(&self) -> Option<DeviceRecord> {
        let contact_id = contact_id_from_workspace_id(self.workspace_id.as_deref()?)?;
        Some(DeviceRecord {
            name: self.display_name.clone(),
            contact_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

    #[test]
    fn test_contact_id_padded_and_unpadded() {
        let reference = "ciscospark://us/PLACE/abc123";
        assert_eq!(
            contact_id_from_workspace_id(&STANDARD.encode(reference)).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            contact_id_from_workspace_id(&STANDARD_NO_PAD.encode(reference)).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_contact_id_without_slashes_is_whole_value() {
        assert_eq!(
            contact_id_from_workspace_id(&STANDARD.encode("plain-id")).as_deref(),
            Some("plain-id")
        );
    }

    #[test]
    fn test_contact_id_rejects_bad_input() {
        assert_eq!(contact_id_from_workspace_id("***"), None);
        assert_eq!(
            contact_id_from_workspace_id(&STANDARD.encode("ciscospark://us/PLACE/")),
            None
        );
    }

    #[test]
    fn test_to_record_skips_missing_reference() {
        let device = DirectoryDevice {
            display_name: "Board Room".to_string(),
            workspace_id: None,
        };
        assert_eq!(device.to_record(), None);
    }

    #[test]
    fn test_listing_deserializes_webex_shape() {
        let body = serde_json::json!({
            "items": [{
                "id": "Y2lzY29zcGFyazovL3VzL0RFVklDRS8x",
                "displayName": "Board Room",
                "workspaceId": STANDARD.encode("ciscospark://us/PLACE/abc123"),
                "tags": ["testing"]
            }]
        });
        let listing: DirectoryListing = serde_json::from_value(body).unwrap();
        assert_eq!(
            listing.items[0].to_record(),
            Some(DeviceRecord {
                name: "Board Room".to_string(),
                contact_id: "abc123".to_string(),
            })
        );
    }
}
