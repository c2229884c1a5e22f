//! Structured-data payloads handed to a wallet for EIP-712 signing.
//!
//! A [`TypedData`] carries both forms of the same record: the digest a local
//! key signs directly, and the `eth_signTypedData_v4` JSON a browser or
//! remote wallet expects. Both are derived from the same struct hash so the
//! two signing paths can never disagree on what was signed.

use alloy_primitives::{keccak256, Address, Signature, B256};
use serde_json::{json, Map, Value};

use super::domain::Eip712Domain;
use crate::{Error, Result};

/// A typed, domain-scoped record ready to be signed.
#[derive(Debug, Clone)]
pub struct TypedData {
    /// Domain the signature is bound to.
    pub domain: Eip712Domain,
    /// Name of the primary struct type.
    pub primary_type: &'static str,
    /// `(name, solidity type)` pairs of the primary struct, in order.
    pub fields: &'static [(&'static str, &'static str)],
    /// Field values as a wallet would display them.
    pub message: Map<String, Value>,
    /// `hashStruct(message)`.
    pub struct_hash: B256,
}

impl TypedData {
    /// `keccak256("\x19\x01" ++ domainSeparator ++ structHash)`.
    pub fn signing_hash(&self) -> B256 {
        signing_hash(self.domain.separator(), self.struct_hash)
    }

    /// Recover the address that produced a 0x-hex signature over this payload.
    pub fn recover_signer(&self, signature: &str) -> Result<Address> {
        let bytes = hex::decode(signature.trim_start_matches("0x"))
            .map_err(|e| Error::signing(format!("Invalid signature hex: {e}")))?;
        let signature = Signature::from_raw(&bytes)
            .map_err(|e| Error::signing(format!("Invalid signature: {e}")))?;

        signature
            .recover_address_from_prehash(&self.signing_hash())
            .map_err(|e| Error::signing(format!("Signature recovery failed: {e}")))
    }

    /// Render the `eth_signTypedData_v4` payload.
    pub fn to_json(&self) -> Value {
        let mut domain_fields = vec![
            json!({ "name": "name", "type": "string" }),
            json!({ "name": "version", "type": "string" }),
            json!({ "name": "chainId", "type": "uint256" }),
        ];
        let chain_id = match u64::try_from(self.domain.chain_id) {
            Ok(id) => json!(id),
            Err(_) => json!(self.domain.chain_id.to_string()),
        };
        let mut domain = json!({
            "name": self.domain.name,
            "version": self.domain.version,
            "chainId": chain_id,
        });
        if let Some(contract) = self.domain.verifying_contract {
            domain_fields.push(json!({ "name": "verifyingContract", "type": "address" }));
            domain["verifyingContract"] = json!(format!("{contract}"));
        }

        let primary_fields: Vec<Value> = self
            .fields
            .iter()
            .map(|(name, ty)| json!({ "name": name, "type": ty }))
            .collect();

        let mut types = Map::new();
        types.insert("EIP712Domain".to_string(), Value::Array(domain_fields));
        types.insert(self.primary_type.to_string(), Value::Array(primary_fields));

        json!({
            "types": types,
            "primaryType": self.primary_type,
            "domain": domain,
            "message": Value::Object(self.message.clone()),
        })
    }
}

/// Compute the EIP-712 typed data hash.
pub(crate) fn signing_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = [0u8; 66];
    data[0] = 0x19;
    data[1] = 0x01;
    data[2..34].copy_from_slice(domain_separator.as_slice());
    data[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(data)
}
