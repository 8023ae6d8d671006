// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token credential and its persisted encoding.

use crate::error::{Result, SyncError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Margin before expiry when a token is no longer considered usable (1 hour).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60 * 60;

/// Access token plus its expiry.
///
/// Stored in the credential slot as base64-encoded JSON with camelCase keys
/// and the expiry in epoch milliseconds, so slots written by the on-device
/// macro still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(
        rename = "expiresDate",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential for a freshly redeemed token.
    ///
    /// Fails if `expires_in_secs` is negative or puts the expiry out of range.
    pub fn issued(
        access_token: String,
        now: DateTime<Utc>,
        expires_in_secs: i64,
    ) -> Result<Self> {
        let expires_at = (expires_in_secs >= 0)
            .then(|| Duration::try_seconds(expires_in_secs))
            .flatten()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                SyncError::Auth(format!("Invalid token lifetime: {} seconds", expires_in_secs))
            })?;
        Ok(Self {
            access_token: Some(access_token),
            expires_at: Some(expires_at),
        })
    }

    /// A token is usable only if it exists and expires more than the refresh
    /// margin after `now`. Exactly at the margin counts as expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => {
                expires_at - now > Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
            }
            _ => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Serialize into the opaque string kept in the credential slot.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| SyncError::Storage(format!("Failed to serialize credential: {}", e)))?;
        Ok(BASE64.encode(json))
    }

    /// Parse a blob previously produced by [`Credential::encode`].
    pub fn decode(blob: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(blob.trim())
            .map_err(|e| SyncError::Storage(format!("Credential is not base64: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SyncError::Storage(format!("Credential is not valid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 27, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_token_and_expiry() {
        let expires_at = now() + Duration::milliseconds(1_209_599_123);
        let credential = Credential {
            access_token: Some("abc.def".to_string()),
            expires_at: Some(expires_at),
        };

        let decoded = Credential::decode(&credential.encode().unwrap()).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn test_decodes_macro_format() {
        // btoa(JSON.stringify({accessToken, expiresDate}))
        let blob = BASE64.encode(r#"{"accessToken":"tok","expiresDate":1777291200000}"#);
        let credential = Credential::decode(&blob).unwrap();

        assert_eq!(credential.access_token.as_deref(), Some("tok"));
        assert_eq!(
            credential.expires_at.unwrap().timestamp_millis(),
            1_777_291_200_000
        );
    }

    #[test]
    fn test_decodes_empty_macro_state() {
        let blob = BASE64.encode(r#"{"accessToken":null,"expiresDate":null}"#);
        assert_eq!(Credential::decode(&blob).unwrap(), Credential::default());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            Credential::decode("not base64 at all!"),
            Err(SyncError::Storage(_))
        ));
        assert!(matches!(
            Credential::decode(&BASE64.encode("[1,2,3]")),
            Err(SyncError::Storage(_))
        ));
    }

    #[test]
    fn test_validity_margin_boundary() {
        let token = |secs: i64| Credential {
            access_token: Some("tok".to_string()),
            expires_at: Some(now() + Duration::seconds(secs)),
        };

        assert!(!token(3600).is_valid_at(now()), "exactly one hour is invalid");
        assert!(token(3601).is_valid_at(now()));
        assert!(!token(1800).is_valid_at(now()));
        assert!(!token(-10).is_valid_at(now()));
    }

    #[test]
    fn test_missing_parts_are_invalid() {
        assert!(!Credential::default().is_valid_at(now()));

        let no_token = Credential {
            access_token: None,
            expires_at: Some(now() + Duration::days(14)),
        };
        assert!(!no_token.is_valid_at(now()));

        let no_expiry = Credential {
            access_token: Some("tok".to_string()),
            expires_at: None,
        };
        assert!(!no_expiry.is_valid_at(now()));
    }

    #[test]
    fn test_issued_sets_expiry_from_now() {
        let credential = Credential::issued("tok".to_string(), now(), 1_209_599).unwrap();
        assert_eq!(
            credential.expires_at,
            Some(now() + Duration::seconds(1_209_599))
        );
        assert!(credential.is_valid_at(now()));
    }

    #[test]
    fn test_issued_rejects_unusable_lifetime() {
        for secs in [-1, i64::MAX, 1_000_000_000_000_000] {
            assert!(
                matches!(
                    Credential::issued("tok".to_string(), now(), secs),
                    Err(SyncError::Auth(_))
                ),
                "expires_in {} should be rejected",
                secs
            );
        }
    }
}
