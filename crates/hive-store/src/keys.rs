//! Key validation.
//!
//! A key becomes the name of a published attribute, so every byte must be
//! printable ASCII (0x20..=0x7E). The check exists for the publication
//! surface, not for the table itself: any byte sequence would hash and chain
//! fine structurally.

use crate::error::{StoreError, StoreResult};

/// Validate a key before it is admitted to the store.
///
/// # Examples
///
/// ```
/// use hive_store::keys::validate_key;
///
/// assert!(validate_key(b"alpha").is_ok());
/// assert!(validate_key(b"with space").is_ok());
/// assert!(validate_key(b"").is_err());
/// assert!(validate_key(b"tab\there").is_err());
/// ```
pub fn validate_key(key: &[u8]) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            reason: "key must not be empty".into(),
        });
    }
    for &b in key {
        if !(b.is_ascii_graphic() || b == b' ') {
            return Err(StoreError::InvalidKey {
                reason: format!("key contains non-printable byte 0x{b:02x}"),
            });
        }
    }
    Ok(())
}
