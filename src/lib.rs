//! clob-signer: Polymarket CLOB order construction and authentication.
//!
//! This is the root crate that provides benchmark and integration-test
//! access to the member crates. For actual functionality, use them directly:
//!
//! - `clob-core`: wallet attestation, API credentials, request signing, orders
//! - `clob-cli`: the `clob-signer` command-line tool

pub use clob_core as clob;
pub use clob_core::*;
