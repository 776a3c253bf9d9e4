//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable ECDSA over secp256k1, Ethereum conventions.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2), recovery id adjusted accordingly
//! - Signatures are 65 bytes: `r (32) || s (32) || v (1)`
//!
//! ## Use Cases
//!
//! - Block sealing: the producer signs the header seal hash
//! - Signer authentication: validators recover the producer's public key

use crate::hashing::keccak256;
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// 20-byte address derived from a public key.
pub type Address = [u8; 20];

/// Uncompressed secp256k1 public key (65 bytes, `0x04 || x || y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey([u8; 65]);

impl Secp256k1PublicKey {
    /// Create from uncompressed SEC1 bytes.
    pub fn from_bytes(bytes: [u8; 65]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Get raw uncompressed bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Derive the address: last 20 bytes of keccak256(x || y).
    pub fn to_address(&self) -> Address {
        let hash = keccak256(&self.0[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        address
    }
}

/// Recoverable ECDSA signature (`r || s || v`, v in {0, 1}).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Parse from a 65-byte slice. Accepts v as 0/1 or 27/28.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureLength {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut raw = [0u8; SIGNATURE_LENGTH];
        raw.copy_from_slice(bytes);
        raw[64] = match raw[64] {
            0 | 27 => 0,
            1 | 28 => 1,
            v => return Err(CryptoError::InvalidRecoveryId(v)),
        };
        Ok(Self(raw))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Owned copy of the raw bytes, as stored in a header.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Recover the signer's public key from a 32-byte prehash.
    pub fn recover(&self, prehash: &[u8; 32]) -> Result<Secp256k1PublicKey, CryptoError> {
        let recovery_id =
            RecoveryId::try_from(self.0[64]).map_err(|_| CryptoError::InvalidRecoveryId(self.0[64]))?;
        let signature =
            Signature::from_slice(&self.0[..64]).map_err(|_| CryptoError::InvalidSignature)?;
        let key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;
        Ok(Secp256k1PublicKey::from_verifying_key(&key))
    }
}

/// Recover the public key that produced `signature` over `prehash`.
pub fn recover_public_key(
    prehash: &[u8; 32],
    signature: &[u8],
) -> Result<Secp256k1PublicKey, CryptoError> {
    RecoverableSignature::from_slice(signature)?.recover(prehash)
}

/// Recover the signer address of `signature` over `prehash`.
pub fn recover_address(prehash: &[u8; 32], signature: &[u8]) -> Result<Address, CryptoError> {
    recover_public_key(prehash, signature).map(|key| key.to_address())
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key (uncompressed, 65 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Address of this keypair.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Sign a 32-byte prehash (deterministic RFC 6979, low-S).
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte();
        Ok(RecoverableSignature(bytes))
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_recover() {
        let keypair = Secp256k1KeyPair::generate();
        let prehash = keccak256(b"header seal hash");

        let signature = keypair.sign_prehash(&prehash).unwrap();
        let recovered = recover_public_key(&prehash, signature.as_bytes()).unwrap();

        assert_eq!(recovered, keypair.public_key());
        assert_eq!(recovered.to_address(), keypair.address());
    }

    #[test]
    fn test_wrong_prehash_recovers_other_key() {
        let keypair = Secp256k1KeyPair::generate();
        let signature = keypair.sign_prehash(&keccak256(b"message1")).unwrap();

        // Still a valid signature for SOME key, just not this one
        let recovered = recover_address(&keccak256(b"message2"), signature.as_bytes()).unwrap();
        assert_ne!(recovered, keypair.address());
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = Secp256k1KeyPair::from_bytes([0xABu8; 32]).unwrap();
        let prehash = keccak256(b"deterministic test");

        let sig1 = keypair.sign_prehash(&prehash).unwrap();
        let sig2 = keypair.sign_prehash(&prehash).unwrap();

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_legacy_recovery_id_accepted() {
        let keypair = Secp256k1KeyPair::generate();
        let prehash = keccak256(b"legacy v");
        let mut bytes = keypair.sign_prehash(&prehash).unwrap().to_vec();
        bytes[64] += 27;

        assert_eq!(recover_address(&prehash, &bytes).unwrap(), keypair.address());
    }

    #[test]
    fn test_rejects_bad_length() {
        let prehash = keccak256(b"x");
        assert_eq!(
            recover_public_key(&prehash, &[0u8; 64]),
            Err(CryptoError::InvalidSignatureLength {
                expected: 65,
                actual: 64
            })
        );
    }

    #[test]
    fn test_rejects_bad_recovery_id() {
        let prehash = keccak256(b"x");
        let mut bytes = [0x11u8; 65];
        bytes[64] = 5;
        assert_eq!(
            recover_public_key(&prehash, &bytes),
            Err(CryptoError::InvalidRecoveryId(5))
        );
    }

    #[test]
    fn test_zero_signature_fails() {
        let prehash = keccak256(b"x");
        assert!(recover_public_key(&prehash, &[0u8; 65]).is_err());
    }

    #[test]
    fn test_public_key_roundtrip_bytes() {
        let keypair = Secp256k1KeyPair::generate();
        let bytes = *keypair.public_key().as_bytes();

        assert_eq!(bytes[0], 0x04);
        assert_eq!(Secp256k1PublicKey::from_bytes(bytes).unwrap(), keypair.public_key());
        assert!(Secp256k1PublicKey::from_bytes([0x04; 65]).is_err());
    }

    #[test]
    fn test_roundtrip_secret_bytes() {
        let original = Secp256k1KeyPair::generate();
        let restored = Secp256k1KeyPair::from_bytes(original.to_bytes()).unwrap();

        assert_eq!(original.public_key(), restored.public_key());
    }
}
