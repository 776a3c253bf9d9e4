//! # Shared Crypto - Consensus Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Address derivation, state roots |
//! | `ecdsa` | secp256k1 (recoverable) | Block sealing and signer recovery |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Keccak-256**: Ethereum variant, not NIST SHA3-256

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{
    recover_address, recover_public_key, RecoverableSignature, Secp256k1KeyPair,
    Secp256k1PublicKey, SIGNATURE_LENGTH,
};
pub use errors::CryptoError;
pub use hashing::{keccak256, Keccak256Hasher};
