//! L1 authentication: proving control of a wallet.
//!
//! An [`L1Attestation`] is an EIP-712 `ClobAuth` signature over the wallet
//! address, a millisecond timestamp and a random nonce. It is only ever sent
//! as request headers to mint or retrieve API credentials and never goes
//! on-chain.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use chrono::Utc;
use serde_json::{json, Map};

use super::domain::Eip712Domain;
use super::typed_data::TypedData;
use crate::wallet::WalletSigner;
use crate::Result;

/// Fixed statement every attestation signs.
pub const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";
pub const POLY_NONCE: &str = "POLY_NONCE";

const CLOB_AUTH_FIELDS: &[(&str, &str)] = &[
    ("address", "address"),
    ("timestamp", "string"),
    ("nonce", "uint256"),
    ("message", "string"),
];

/// Signed proof of wallet control. Built fresh for every credential call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Attestation {
    /// Wallet address being attested.
    pub address: Address,
    /// 0x-hex, 65-byte EIP-712 signature.
    pub signature: String,
    /// Wall-clock milliseconds at signing time.
    pub timestamp_millis: u64,
    /// Random 32-bit nonce.
    pub nonce: u32,
}

impl L1Attestation {
    /// Attest with a fresh timestamp and nonce.
    pub async fn generate(signer: &WalletSigner, chain_id: u64) -> Result<Self> {
        let timestamp_millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let nonce: u32 = rand::random();
        Self::sign(signer, chain_id, timestamp_millis, nonce).await
    }

    /// Attest with caller-supplied timestamp and nonce.
    ///
    /// Reusing a `(timestamp, nonce)` pair is allowed but weakens replay
    /// resistance; prefer [`L1Attestation::generate`].
    pub async fn sign(
        signer: &WalletSigner,
        chain_id: u64,
        timestamp_millis: u64,
        nonce: u32,
    ) -> Result<Self> {
        let address = signer.address()?;
        let payload = clob_auth_typed_data(address, chain_id, timestamp_millis, nonce);
        let signature = signer.sign_typed_data(&payload).await?;

        Ok(Self {
            address,
            signature,
            timestamp_millis,
            nonce,
        })
    }

    /// Headers carried by the unauthenticated credential endpoints.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (POLY_ADDRESS, self.address.to_string()),
            (POLY_SIGNATURE, self.signature.clone()),
            (POLY_TIMESTAMP, self.timestamp_millis.to_string()),
            (POLY_NONCE, self.nonce.to_string()),
        ]
    }
}

/// The `ClobAuth` record for an attestation.
///
/// ClobAuth(address address, string timestamp, uint256 nonce, string message)
pub fn clob_auth_typed_data(
    address: Address,
    chain_id: u64,
    timestamp_millis: u64,
    nonce: u32,
) -> TypedData {
    let timestamp = timestamp_millis.to_string();

    let mut message = Map::new();
    message.insert("address".to_string(), json!(address.to_string()));
    message.insert("timestamp".to_string(), json!(timestamp));
    message.insert("nonce".to_string(), json!(nonce));
    message.insert("message".to_string(), json!(CLOB_AUTH_MESSAGE));

    TypedData {
        domain: Eip712Domain::clob_auth(chain_id),
        primary_type: "ClobAuth",
        fields: CLOB_AUTH_FIELDS,
        message,
        struct_hash: clob_auth_struct_hash(address, &timestamp, nonce),
    }
}

/// Compute the EIP-712 struct hash for ClobAuth.
///
/// Strings are hashed; the address is left-padded to a 32-byte word.
fn clob_auth_struct_hash(address: Address, timestamp: &str, nonce: u32) -> B256 {
    let type_hash = keccak256(
        b"ClobAuth(address address,string timestamp,uint256 nonce,string message)",
    );

    let encoded = (
        type_hash,
        B256::left_padding_from(address.as_slice()),
        keccak256(timestamp.as_bytes()),
        U256::from(nonce),
        keccak256(CLOB_AUTH_MESSAGE.as_bytes()),
    )
        .abi_encode_packed();

    keccak256(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::domain::POLYGON_CHAIN_ID;
    use crate::wallet::tests::test_signer;

    #[tokio::test]
    async fn test_attestation_recovers_to_signer() {
        let signer = test_signer();
        let attestation = L1Attestation::sign(&signer, POLYGON_CHAIN_ID, 1_700_000_000_000, 42)
            .await
            .unwrap();

        assert_eq!(attestation.signature.len(), 132);
        let payload = clob_auth_typed_data(
            attestation.address,
            POLYGON_CHAIN_ID,
            attestation.timestamp_millis,
            attestation.nonce,
        );
        assert_eq!(
            payload.recover_signer(&attestation.signature).unwrap(),
            signer.address().unwrap()
        );
    }

    #[tokio::test]
    async fn test_same_inputs_same_signature() {
        let signer = test_signer();
        let a = L1Attestation::sign(&signer, POLYGON_CHAIN_ID, 1_700_000_000_000, 7)
            .await
            .unwrap();
        let b = L1Attestation::sign(&signer, POLYGON_CHAIN_ID, 1_700_000_000_000, 7)
            .await
            .unwrap();
        assert_eq!(a, b);

        let c = L1Attestation::sign(&signer, POLYGON_CHAIN_ID, 1_700_000_000_000, 8)
            .await
            .unwrap();
        assert_ne!(a.signature, c.signature);
    }

    #[tokio::test]
    async fn test_generate_uses_millisecond_clock() {
        let before = Utc::now().timestamp_millis() as u64;
        let attestation = L1Attestation::generate(&test_signer(), POLYGON_CHAIN_ID)
            .await
            .unwrap();
        let after = Utc::now().timestamp_millis() as u64;

        assert!(attestation.timestamp_millis >= before);
        assert!(attestation.timestamp_millis <= after);
    }

    #[tokio::test]
    async fn test_headers() {
        let attestation = L1Attestation::sign(&test_signer(), POLYGON_CHAIN_ID, 1_700_000_000_123, 9)
            .await
            .unwrap();
        let headers = attestation.headers();

        let names: Vec<&str> = headers.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec![POLY_ADDRESS, POLY_SIGNATURE, POLY_TIMESTAMP, POLY_NONCE]);
        assert_eq!(headers[2].1, "1700000000123");
        assert_eq!(headers[3].1, "9");
    }

    #[test]
    fn test_typed_data_message() {
        let address: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let payload = clob_auth_typed_data(address, POLYGON_CHAIN_ID, 1, 2).to_json();

        assert_eq!(payload["primaryType"], "ClobAuth");
        assert_eq!(payload["domain"]["name"], "ClobAuthDomain");
        assert_eq!(payload["message"]["timestamp"], "1");
        assert_eq!(payload["message"]["message"], CLOB_AUTH_MESSAGE);
    }

    mod reference {
        alloy_sol_types::sol! {
            struct ClobAuth {
                address address;
                string timestamp;
                uint256 nonce;
                string message;
            }
        }
    }

    #[test]
    fn test_signing_hash_matches_alloy_eip712() {
        use alloy_sol_types::SolStruct;

        let address: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let expected = reference::ClobAuth {
            address,
            timestamp: "1700000000000".to_string(),
            nonce: U256::from(42u64),
            message: "This message attests that I control the given wallet".to_string(),
        }
        .eip712_signing_hash(&alloy_sol_types::eip712_domain! {
            name: "ClobAuthDomain",
            version: "1",
            chain_id: 137,
        });

        let payload = clob_auth_typed_data(address, POLYGON_CHAIN_ID, 1_700_000_000_000, 42);
        assert_eq!(payload.signing_hash(), expected);
    }
}
