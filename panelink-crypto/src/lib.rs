//! ITv2 session encryption.
//!
//! Provides the two panel key-derivation schemes (Type1 and Type2) over a
//! shared AES-128 ECB core. Each direction of a session is keyed
//! independently by a 16-byte initializer exchanged during the handshake:
//!
//! * the peer's `RequestAccess` initializer keys *our outbound* traffic
//!   ([`EncryptionHandler::configure_outbound`]);
//! * our own generated initializer keys *inbound* traffic
//!   ([`EncryptionHandler::configure_inbound`]).
//!
//! Plaintexts are zero-padded to the 16-byte block boundary before
//! encryption; the ITv2 framing layer's length field governs the logical
//! size, so padding is discarded there after decryption.

#![deny(unsafe_code)]

use std::fmt;

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use sha2::{Digest, Sha256};

/// ECB block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Required initializer length in bytes.
pub const INITIALIZER_LEN: usize = 16;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors from configuring or running a session cipher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncryptionError {
    /// The configured access code is empty.
    EmptyAccessCode,
    /// An initializer was not exactly [`INITIALIZER_LEN`] bytes.
    BadInitializer { len: usize },
    /// The named direction was configured twice.
    AlreadyConfigured { direction: &'static str },
    /// The named direction was used before being configured.
    NotConfigured { direction: &'static str },
    /// Ciphertext length was not a multiple of [`BLOCK_SIZE`].
    MisalignedCiphertext { len: usize },
}

impl fmt::Display for EncryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAccessCode => write!(f, "access code is empty"),
            Self::BadInitializer { len } => {
                write!(f, "initializer must be {INITIALIZER_LEN} bytes, got {len}")
            }
            Self::AlreadyConfigured { direction } => {
                write!(f, "{direction} key already configured")
            }
            Self::NotConfigured { direction } => write!(f, "{direction} key not configured"),
            Self::MisalignedCiphertext { len } => {
                write!(f, "ciphertext length {len} is not a multiple of {BLOCK_SIZE}")
            }
        }
    }
}

impl std::error::Error for EncryptionError {}

// ─── Key derivation ──────────────────────────────────────────────────────────

/// Which of the two panel key schedules a handler runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyDerivation {
    /// `pad16(access_code) XOR initializer`.
    Type1,
    /// `SHA-256(access_code ‖ initializer)[..16]`.
    Type2,
}

fn derive_key(
    derivation: KeyDerivation,
    access_code: &[u8],
    initializer: &[u8],
) -> [u8; BLOCK_SIZE] {
    match derivation {
        KeyDerivation::Type1 => {
            let mut key = [0u8; BLOCK_SIZE];
            for (i, slot) in key.iter_mut().enumerate() {
                *slot = access_code.get(i).copied().unwrap_or(0) ^ initializer[i];
            }
            key
        }
        KeyDerivation::Type2 => {
            let mut hasher = Sha256::new();
            hasher.update(access_code);
            hasher.update(initializer);
            let digest = hasher.finalize();
            let mut key = [0u8; BLOCK_SIZE];
            key.copy_from_slice(&digest[..BLOCK_SIZE]);
            key
        }
    }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// Per-session cipher state: one AES-128 ECB key per direction.
pub struct EncryptionHandler {
    derivation: KeyDerivation,
    access_code: Vec<u8>,
    outbound: Option<Aes128>,
    inbound: Option<Aes128>,
}

impl EncryptionHandler {
    /// Create a Type1 handler for the given access code.
    pub fn type1(access_code: &[u8]) -> Result<Self, EncryptionError> {
        Self::new(KeyDerivation::Type1, access_code)
    }

    /// Create a Type2 handler for the given access code.
    pub fn type2(access_code: &[u8]) -> Result<Self, EncryptionError> {
        Self::new(KeyDerivation::Type2, access_code)
    }

    fn new(derivation: KeyDerivation, access_code: &[u8]) -> Result<Self, EncryptionError> {
        if access_code.is_empty() {
            return Err(EncryptionError::EmptyAccessCode);
        }
        Ok(Self { derivation, access_code: access_code.to_vec(), outbound: None, inbound: None })
    }

    /// Key the outbound direction from the peer's initializer.
    ///
    /// Must be called exactly once, before the first encrypted send.
    pub fn configure_outbound(&mut self, initializer: &[u8]) -> Result<(), EncryptionError> {
        if self.outbound.is_some() {
            return Err(EncryptionError::AlreadyConfigured { direction: "outbound" });
        }
        if initializer.len() != INITIALIZER_LEN {
            return Err(EncryptionError::BadInitializer { len: initializer.len() });
        }
        let key = derive_key(self.derivation, &self.access_code, initializer);
        self.outbound = Some(Aes128::new(GenericArray::from_slice(&key)));
        Ok(())
    }

    /// Generate our initializer, key the inbound direction from it, and
    /// return it for transmission in `RequestAccess`.
    ///
    /// Must be called exactly once.
    pub fn configure_inbound(&mut self) -> Result<Vec<u8>, EncryptionError> {
        if self.inbound.is_some() {
            return Err(EncryptionError::AlreadyConfigured { direction: "inbound" });
        }
        let mut initializer = [0u8; INITIALIZER_LEN];
        getrandom::getrandom(&mut initializer).expect("getrandom");
        let key = derive_key(self.derivation, &self.access_code, &initializer);
        self.inbound = Some(Aes128::new(GenericArray::from_slice(&key)));
        Ok(initializer.to_vec())
    }

    /// Whether the outbound direction is keyed.
    pub fn outbound_active(&self) -> bool {
        self.outbound.is_some()
    }

    /// Whether the inbound direction is keyed.
    pub fn inbound_active(&self) -> bool {
        self.inbound.is_some()
    }

    /// Zero-pad `plaintext` to the block boundary and encrypt it.
    pub fn encrypt_outbound(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let cipher = self
            .outbound
            .as_ref()
            .ok_or(EncryptionError::NotConfigured { direction: "outbound" })?;
        let mut data = plaintext.to_vec();
        data.resize(plaintext.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, 0);
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
        Ok(data)
    }

    /// Decrypt `ciphertext`; the caller's framing layer trims the padding.
    pub fn decrypt_inbound(&self, ciphertext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let cipher = self
            .inbound
            .as_ref()
            .ok_or(EncryptionError::NotConfigured { direction: "inbound" })?;
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(EncryptionError::MisalignedCiphertext { len: ciphertext.len() });
        }
        let mut data = ciphertext.to_vec();
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
        }
        Ok(data)
    }
}

impl fmt::Debug for EncryptionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionHandler")
            .field("derivation", &self.derivation)
            .field("outbound", &self.outbound.is_some())
            .field("inbound", &self.inbound.is_some())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn handler_with_outbound(code: &[u8], initializer: &[u8; 16]) -> EncryptionHandler {
        let mut h = EncryptionHandler::type1(code).unwrap();
        h.configure_outbound(initializer).unwrap();
        h
    }

    #[test]
    fn type1_key_is_xor_of_padded_code_and_initializer() {
        // FIPS-197 appendix C.1: with this key the well-known vector must hold.
        let key: [u8; 16] = (0u8..16).collect::<Vec<_>>().try_into().unwrap();
        // access_code XOR initializer == key when initializer == code XOR key.
        let code = [0x5Au8; 16];
        let initializer: [u8; 16] = std::array::from_fn(|i| code[i] ^ key[i]);
        let h = handler_with_outbound(&code, &initializer);

        let plaintext: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ];
        let expected: [u8; 16] = [
            0x69, 0xC4, 0xE0, 0xD8, 0x6A, 0x7B, 0x04, 0x30, 0xD8, 0xCD, 0xB7, 0x80, 0x70, 0xB4,
            0xC5, 0x5A,
        ];
        assert_eq!(h.encrypt_outbound(&plaintext).unwrap(), expected);
    }

    #[test]
    fn type1_short_access_code_is_zero_padded() {
        let initializer = [0u8; 16];
        let h = handler_with_outbound(&[0xAB, 0xCD], &initializer);
        // key = AB CD 00 .. 00; encrypting two identical blocks must match
        // a handler built from the explicit padded code.
        let mut padded_code = [0u8; 16];
        padded_code[0] = 0xAB;
        padded_code[1] = 0xCD;
        let reference = handler_with_outbound(&padded_code, &initializer);
        let block = [0x42u8; 16];
        assert_eq!(
            h.encrypt_outbound(&block).unwrap(),
            reference.encrypt_outbound(&block).unwrap()
        );
    }

    #[test]
    fn type2_differs_from_type1_for_same_inputs() {
        let initializer = [7u8; 16];
        let code = b"123456";
        let mut t1 = EncryptionHandler::type1(code).unwrap();
        let mut t2 = EncryptionHandler::type2(code).unwrap();
        t1.configure_outbound(&initializer).unwrap();
        t2.configure_outbound(&initializer).unwrap();
        let block = [0u8; 16];
        assert_ne!(t1.encrypt_outbound(&block).unwrap(), t2.encrypt_outbound(&block).unwrap());
    }

    #[test]
    fn encrypt_pads_to_block_boundary() {
        let h = handler_with_outbound(b"code", &[1u8; 16]);
        assert_eq!(h.encrypt_outbound(&[]).unwrap().len(), 0);
        assert_eq!(h.encrypt_outbound(&[1]).unwrap().len(), 16);
        assert_eq!(h.encrypt_outbound(&[0; 16]).unwrap().len(), 16);
        assert_eq!(h.encrypt_outbound(&[0; 17]).unwrap().len(), 32);
    }

    #[test]
    fn both_directions_roundtrip_through_a_peer() {
        // Two handlers with the same access code, cross-wired the way the
        // handshake wires them: our outbound key comes from their inbound
        // initializer and vice versa.
        let code = b"987654";
        let mut ours = EncryptionHandler::type2(code).unwrap();
        let mut theirs = EncryptionHandler::type2(code).unwrap();

        let to_them = theirs.configure_inbound().unwrap();
        ours.configure_outbound(&to_them).unwrap();
        let to_us = ours.configure_inbound().unwrap();
        theirs.configure_outbound(&to_us).unwrap();

        let payload = b"zone 12 restored".to_vec();
        let ciphertext = ours.encrypt_outbound(&payload).unwrap();
        assert_ne!(ciphertext, payload);
        assert_eq!(theirs.decrypt_inbound(&ciphertext).unwrap(), payload);

        let reply = b"ack".to_vec();
        let ciphertext = theirs.encrypt_outbound(&reply).unwrap();
        let plaintext = ours.decrypt_inbound(&ciphertext).unwrap();
        // ECB padding survives decryption; framing trims it upstream.
        assert_eq!(&plaintext[..reply.len()], &reply[..]);
        assert!(plaintext[reply.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn configuration_contract_is_enforced() {
        assert_eq!(
            EncryptionHandler::type1(&[]).unwrap_err(),
            EncryptionError::EmptyAccessCode
        );

        let mut h = EncryptionHandler::type1(b"code").unwrap();
        assert_eq!(
            h.configure_outbound(&[0; 8]).unwrap_err(),
            EncryptionError::BadInitializer { len: 8 }
        );
        assert_eq!(
            h.encrypt_outbound(&[0; 16]).unwrap_err(),
            EncryptionError::NotConfigured { direction: "outbound" }
        );

        h.configure_outbound(&[0; 16]).unwrap();
        assert_eq!(
            h.configure_outbound(&[0; 16]).unwrap_err(),
            EncryptionError::AlreadyConfigured { direction: "outbound" }
        );

        h.configure_inbound().unwrap();
        assert_eq!(
            h.configure_inbound().unwrap_err(),
            EncryptionError::AlreadyConfigured { direction: "inbound" }
        );
    }

    #[test]
    fn misaligned_ciphertext_is_rejected() {
        let mut h = EncryptionHandler::type1(b"code").unwrap();
        h.configure_inbound().unwrap();
        assert_eq!(
            h.decrypt_inbound(&[0; 15]).unwrap_err(),
            EncryptionError::MisalignedCiphertext { len: 15 }
        );
    }
}
