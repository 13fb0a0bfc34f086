//! Encrypted container codec: salt ‖ IV ‖ AES-256-CBC/PKCS#7 ciphertext.
//!
//! The format is inherited from the legacy deployment and is byte-exact:
//! 16-byte random salt, 16-byte random IV, then the padded ciphertext.
//! There is no length prefix, no checksum, and - deliberately - no MAC:
//! archives already issued in this format must stay decryptable, so the
//! weak authentication (padding failure as the only wrong-password signal)
//! is preserved rather than fixed. A wrong password that happens to unpad
//! cleanly yields garbage that fails later as a ZIP.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use secrecy::zeroize::Zeroize;
use serde::Serialize;

use crate::error::PackError;
use crate::kdf::{self, SALT_LEN};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
/// Smallest buffer the legacy reader accepted: salt + IV + at least one
/// ciphertext byte. Real containers carry a full 16-byte block after the
/// header, but the 33-byte gate is the wire contract.
pub const MIN_CONTAINER_LEN: usize = SALT_LEN + IV_LEN + 1;

/// Header peek for operator tooling. Never contains key material.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub salt: String,
    pub iv: String,
    pub ciphertext_len: usize,
    pub total_len: usize,
}

/// Encrypt `plaintext` under `password` and frame it as a container.
///
/// Fresh random salt and IV every call; the ciphertext is always a block
/// multiple and strictly longer than the plaintext (PKCS#7 pads at least
/// one byte).
pub fn seal(plaintext: &[u8], password: &str) -> Result<Vec<u8>, PackError> {
    if plaintext.is_empty() {
        return Err(PackError::InvalidInput("plaintext must not be empty".into()));
    }
    if password.is_empty() {
        return Err(PackError::InvalidInput("password must not be empty".into()));
    }

    let salt_vec = kdf::random_bytes(SALT_LEN);
    let iv = kdf::random_bytes(IV_LEN);
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&salt_vec);

    let mut key = kdf::derive_key(password, &salt)?;
    let encryptor = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|e| PackError::InvalidInput(format!("cipher init: {}", e)))?;
    key.zeroize();

    // Buffer sized for the padded ciphertext: PKCS#7 always adds 1..=16 bytes
    let padded_len = plaintext.len() + (BLOCK_LEN - plaintext.len() % BLOCK_LEN);
    let mut buf = vec![0u8; padded_len];
    buf[..plaintext.len()].copy_from_slice(plaintext);
    let ciphertext = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
        .map_err(|e| PackError::InvalidInput(format!("AES-CBC encryption failed: {}", e)))?;

    let mut container = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    container.extend_from_slice(&salt);
    container.extend_from_slice(&iv);
    container.extend_from_slice(ciphertext);
    Ok(container)
}

/// Unframe and decrypt a container.
///
/// `InvalidInput` for structurally impossible buffers (shorter than 33
/// bytes) and empty passwords; `DecryptionFailed` when the cipher or the
/// padding rejects the ciphertext - the only signal the format offers for
/// "wrong password or corrupted file".
pub fn open(container: &[u8], password: &str) -> Result<Vec<u8>, PackError> {
    if password.is_empty() {
        return Err(PackError::InvalidInput("password must not be empty".into()));
    }
    if container.len() < MIN_CONTAINER_LEN {
        return Err(PackError::InvalidInput(format!(
            "container too short: {} bytes, need at least {}",
            container.len(),
            MIN_CONTAINER_LEN
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&container[..SALT_LEN]);
    let iv = &container[SALT_LEN..SALT_LEN + IV_LEN];
    let ciphertext = &container[SALT_LEN + IV_LEN..];

    if ciphertext.len() % BLOCK_LEN != 0 {
        // Truncated or extended in transit; CBC cannot even start
        return Err(PackError::DecryptionFailed);
    }

    let mut key = kdf::derive_key(password, &salt)?;
    let decryptor = Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|_| PackError::DecryptionFailed)?;
    key.zeroize();

    let mut buf = ciphertext.to_vec();
    let plaintext = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| PackError::DecryptionFailed)?;
    Ok(plaintext.to_vec())
}

/// Split a container into its header fields without deriving any key.
pub fn inspect(container: &[u8]) -> Result<ContainerInfo, PackError> {
    if container.len() < MIN_CONTAINER_LEN {
        return Err(PackError::InvalidInput(format!(
            "container too short: {} bytes, need at least {}",
            container.len(),
            MIN_CONTAINER_LEN
        )));
    }
    Ok(ContainerInfo {
        salt: hex::encode(&container[..SALT_LEN]),
        iv: hex::encode(&container[SALT_LEN..SALT_LEN + IV_LEN]),
        ciphertext_len: container.len() - SALT_LEN - IV_LEN,
        total_len: container.len(),
    })
}
