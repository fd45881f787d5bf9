use std::fmt::Display;

use blake2::{Blake2b512, Digest};

use crate::db_types::ClientId;

/// Identifies a logical order submission: the same client asking for the same kind of site under the same contact
/// details. It deliberately contains no timestamp, so a double-click produces the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionFingerprint([u8; 64]);

impl SubmissionFingerprint {
    pub fn new(client_id: &ClientId, purpose_type: &str, email: &str, name: &str) -> Self {
        let email = email.trim().to_lowercase();
        let mut hasher = Blake2b512::new();
        // length-prefix every field so that field boundaries cannot be shifted
        for field in [client_id.as_str(), purpose_type.trim(), email.as_str(), name.trim()] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for SubmissionFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // a short prefix is plenty for log lines
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}
