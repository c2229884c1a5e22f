//! L2 authentication: HMAC-signing every API call with derived credentials.

use alloy_primitives::Address;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::l1::{POLY_ADDRESS, POLY_SIGNATURE, POLY_TIMESTAMP};
use crate::{Error, Result};

pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";

/// API credentials for authenticated CLOB requests.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ApiCredentials {
    /// API key (derived from wallet).
    #[serde(rename = "apiKey")]
    pub key: String,
    /// Base64 secret for HMAC signing.
    pub secret: String,
    /// Passphrase sent alongside the key.
    pub passphrase: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

impl ApiCredentials {
    /// Create new API credentials.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| Error::config(format!("{name} environment variable not set")))
        };

        Ok(Self::new(
            var("POLY_API_KEY")?,
            var("POLY_API_SECRET")?,
            var("POLY_API_PASSPHRASE")?,
        ))
    }
}

/// Per-request authentication material. Built fresh for every call.
#[derive(Clone)]
pub struct L2Signature {
    pub address: Address,
    /// URL-safe base64 HMAC-SHA256, padding kept.
    pub signature: String,
    pub timestamp_secs: u64,
    pub api_key: String,
    pub passphrase: String,
}

impl L2Signature {
    /// Sign `(timestamp, method, path, body)` for `address`.
    ///
    /// `timestamp_secs` defaults to the current wall clock.
    pub fn new(
        address: Address,
        credentials: &ApiCredentials,
        method: &str,
        path: &str,
        body: Option<&str>,
        timestamp_secs: Option<u64>,
    ) -> Result<Self> {
        let timestamp_secs = timestamp_secs.unwrap_or_else(current_timestamp);
        let signature = sign_request(&credentials.secret, timestamp_secs, method, path, body)?;

        Ok(Self {
            address,
            signature,
            timestamp_secs,
            api_key: credentials.key.clone(),
            passphrase: credentials.passphrase.clone(),
        })
    }

    /// Headers carried by every authenticated request.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (POLY_ADDRESS, self.address.to_string()),
            (POLY_SIGNATURE, self.signature.clone()),
            (POLY_TIMESTAMP, self.timestamp_secs.to_string()),
            (POLY_API_KEY, self.api_key.clone()),
            (POLY_PASSPHRASE, self.passphrase.clone()),
        ]
    }
}

impl std::fmt::Debug for L2Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L2Signature")
            .field("address", &self.address)
            .field("timestamp_secs", &self.timestamp_secs)
            .field("api_key", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Sign a request with HMAC-SHA256 for L2 authentication.
///
/// Message is `timestamp || METHOD || path || body`. The result is URL-safe
/// base64 with `=` padding retained, which the CLOB requires.
pub fn sign_request(
    secret: &str,
    timestamp_secs: u64,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<String> {
    let message = format!(
        "{}{}{}{}",
        timestamp_secs,
        method.to_uppercase(),
        path,
        body.unwrap_or_default()
    );

    // Secrets are handed out URL-safe encoded; accept standard base64 too.
    let secret_bytes = base64::engine::general_purpose::URL_SAFE
        .decode(secret)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(secret))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(secret))
        .map_err(|e| Error::signing(format!("Invalid API secret encoding: {e}")))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&secret_bytes)
        .map_err(|e| Error::signing(format!("Failed to create HMAC: {e}")))?;
    mac.update(message.as_bytes());

    // URL_SAFE substitutes '+' -> '-' and '/' -> '_' and keeps padding.
    Ok(base64::engine::general_purpose::URL_SAFE.encode(mac.finalize().into_bytes()))
}
