//! Verification of the payment provider's webhook signature header.
//!
//! The header looks like `t=1717171717,v1=5257a869...,v1=...`. Each `v1` entry is a hex HMAC-SHA256 of
//! `"{t}." + raw body` keyed with the webhook signing secret. More than one `v1` entry is sent while a secret is
//! being rolled. Unknown schemes (e.g. `v0`) are ignored.
//!
//! The signature covers the raw request bytes, so verification must happen before the body is parsed.
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use thiserror::Error;
use wop_common::Secret;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("No signature header was provided")]
    MissingHeader,
    #[error("The signature header is malformed: {0}")]
    MalformedHeader(String),
    #[error("The signature timestamp is outside the tolerance window ({skew}s old, {tolerance}s allowed)")]
    TimestampOutsideTolerance { skew: u64, tolerance: u64 },
    #[error("No signature matches the payload")]
    Mismatch,
    #[error("No webhook signing secret has been configured")]
    SecretNotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for item in header.split(',') {
            let Some((key, value)) = item.trim().split_once('=') else {
                return Err(SignatureError::MalformedHeader(format!("'{item}' is not a key=value pair")));
            };
            match key {
                "t" => {
                    let t = value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader(format!("'{value}' is not a timestamp")))?;
                    timestamp = Some(t);
                },
                // undecodable entries cannot match anything, so they are simply dropped
                "v1" => match hex::decode(value) {
                    Ok(sig) => signatures.push(sig),
                    Err(_) => debug!("💳️ Ignoring a v1 signature that is not valid hex"),
                },
                _ => trace!("💳️ Ignoring signature scheme {key}"),
            }
        }
        let timestamp = timestamp.ok_or_else(|| SignatureError::MalformedHeader("no timestamp".into()))?;
        if signatures.is_empty() {
            return Err(SignatureError::MalformedHeader("no v1 signature".into()));
        }
        Ok(Self { timestamp, signatures })
    }
}

/// Checks webhook signatures against the signing secret.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: Secret<String>,
    tolerance: Duration,
}

impl SignatureVerifier {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret, tolerance: DEFAULT_TOLERANCE }
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// As [`Self::verify`], with an explicit clock (unix seconds).
    pub fn verify_at(&self, payload: &[u8], header: Option<&str>, now: i64) -> Result<(), SignatureError> {
        if self.secret.is_unset() {
            return Err(SignatureError::SecretNotConfigured);
        }
        let header = header.filter(|h| !h.trim().is_empty()).ok_or(SignatureError::MissingHeader)?;
        let header = SignatureHeader::parse(header)?;
        let skew = now.abs_diff(header.timestamp);
        let tolerance = self.tolerance.as_secs();
        if skew > tolerance {
            return Err(SignatureError::TimestampOutsideTolerance { skew, tolerance });
        }
        let mac = signed_payload_mac(self.secret.reveal(), header.timestamp, payload)?;
        // verify_slice compares in constant time
        if header.signatures.iter().any(|sig| mac.clone().verify_slice(sig).is_ok()) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::SecretNotConfigured)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produces a signature header for `payload`, in the provider's format. Used to build test deliveries and local
/// replays.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_payload_mac(secret, timestamp, payload)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes())))
}
