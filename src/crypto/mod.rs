//! Kerberos encryption types.
//!
//! Every supported algorithm implements [`EType`] and is registered once in a
//! process-wide table keyed by its encryption-type number. Callers normally go
//! through [`get_encrypted_data`] and [`decrypt_enc_part`], which pick the
//! transform from the key or envelope they are given.

pub mod aes_cts_hmac_sha1;
pub mod des_cbc_crc;
pub mod des_cbc_md5;
pub mod kdf;
pub mod rfc3961;
pub mod rfc3962;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use getrandom::fill;

pub use aes_cts_hmac_sha1::{Aes128CtsHmacSha196, Aes256CtsHmacSha196};
pub use des_cbc_crc::DesCbcCrc;
pub use des_cbc_md5::DesCbcMd5;
pub use kdf::S2kParams;

use crate::error::{AlgorithmId, KrbError};
use crate::types::{Checksum, EncryptedData, EncryptedMessage, EncryptionKey};

/// Constant parameters of one encryption type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ETypeDescriptor {
    pub name: &'static str,
    pub etype: i32,
    pub checksum_type: i32,
    pub key_byte_size: usize,
    pub key_seed_bit_length: usize,
    pub message_block_byte_size: usize,
    pub confounder_byte_size: usize,
    pub hmac_bit_length: usize,
    pub cypher_block_bit_length: usize,
    pub default_string_to_key_params: &'static str,
}

/// The capability interface every encryption type provides.
///
/// Keys are borrowed for the duration of a call and never retained. All
/// outputs are freshly allocated.
pub trait EType: Send + Sync {
    fn descriptor(&self) -> &'static ETypeDescriptor;

    fn etype_id(&self) -> i32 {
        self.descriptor().etype
    }

    fn checksum_type_id(&self) -> i32 {
        self.descriptor().checksum_type
    }

    /// (encryption type, checksum type)
    fn identity(&self) -> (i32, i32) {
        (self.etype_id(), self.checksum_type_id())
    }

    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    fn key_byte_size(&self) -> usize {
        self.descriptor().key_byte_size
    }

    fn key_seed_bit_length(&self) -> usize {
        self.descriptor().key_seed_bit_length
    }

    fn message_block_byte_size(&self) -> usize {
        self.descriptor().message_block_byte_size
    }

    fn confounder_byte_size(&self) -> usize {
        self.descriptor().confounder_byte_size
    }

    fn cypher_block_bit_length(&self) -> usize {
        self.descriptor().cypher_block_bit_length
    }

    fn hmac_bit_length(&self) -> usize {
        self.descriptor().hmac_bit_length
    }

    fn default_string_to_key_params(&self) -> &'static str {
        self.descriptor().default_string_to_key_params
    }

    fn string_to_key(&self, secret: &str, salt: &str, params: &str) -> Result<Vec<u8>, KrbError>;

    /// Maps `key_seed_bit_length` bits of randomness to a usable key.
    fn random_to_key(&self, seed: &[u8]) -> Vec<u8>;

    fn derive_random(&self, protocol_key: &[u8], usage: &[u8]) -> Result<Vec<u8>, KrbError>;

    fn derive_key(&self, protocol_key: &[u8], usage: &[u8]) -> Result<Vec<u8>, KrbError>;

    /// Raw cipher operation. Returns the ciphertext and the IV that was used.
    fn encrypt_data(&self, key: &[u8], data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), KrbError>;

    fn decrypt_data(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError>;

    fn encrypt_message(
        &self,
        key: &[u8],
        message: &[u8],
        usage: u32,
    ) -> Result<EncryptedMessage, KrbError>;

    fn decrypt_message(&self, key: &[u8], ciphertext: &[u8], usage: u32)
    -> Result<Vec<u8>, KrbError>;

    fn verify_integrity(
        &self,
        protocol_key: &[u8],
        ciphertext: &[u8],
        plaintext: &[u8],
        usage: u32,
    ) -> bool;

    fn checksum_hash(&self, protocol_key: &[u8], data: &[u8], usage: u32)
    -> Result<Vec<u8>, KrbError>;

    fn verify_checksum(&self, protocol_key: &[u8], data: &[u8], checksum: &[u8], usage: u32) -> bool {
        match self.checksum_hash(protocol_key, data, usage) {
            Ok(expected) => rfc3961::checksum::constant_time_eq(&expected, checksum),
            Err(_) => false,
        }
    }
}

static REGISTRY: LazyLock<BTreeMap<i32, Box<dyn EType>>> = LazyLock::new(|| {
    let etypes: [Box<dyn EType>; 4] = [
        Box::new(DesCbcCrc),
        Box::new(DesCbcMd5),
        Box::new(Aes128CtsHmacSha196),
        Box::new(Aes256CtsHmacSha196),
    ];
    etypes.into_iter().map(|e| (e.etype_id(), e)).collect()
});

/// Looks up the transform for an encryption-type number.
///
/// # Errors
///
/// Returns `UnsupportedAlgorithm` if no transform is registered for `id`.
/// No other transform is substituted.
pub fn get_etype(id: i32) -> Result<&'static dyn EType, KrbError> {
    match REGISTRY.get(&id) {
        Some(e) => Ok(e.as_ref()),
        None => {
            tracing::debug!(etype = id, "no transform registered for encryption type");
            Err(KrbError::UnsupportedAlgorithm(AlgorithmId::EncryptionType(id)))
        }
    }
}

/// Looks up the transform whose checksum type is `id`.
pub fn get_checksum_etype(id: i32) -> Result<&'static dyn EType, KrbError> {
    REGISTRY
        .values()
        .find(|e| e.checksum_type_id() == id)
        .map(|e| e.as_ref())
        .ok_or_else(|| {
            tracing::debug!(cksumtype = id, "no transform registered for checksum type");
            KrbError::UnsupportedAlgorithm(AlgorithmId::ChecksumType(id))
        })
}

/// Looks up a transform by name (`"des-cbc-md5"`) or by its decimal number.
pub fn get_etype_by_name(name: &str) -> Result<&'static dyn EType, KrbError> {
    if let Ok(id) = name.parse::<i32>() {
        return get_etype(id);
    }
    REGISTRY
        .values()
        .find(|e| e.name().eq_ignore_ascii_case(name))
        .map(|e| e.as_ref())
        .ok_or_else(|| KrbError::UnsupportedAlgorithm(AlgorithmId::Name(name.to_string())))
}

/// All registered transforms in ascending encryption-type order.
pub fn etypes() -> impl Iterator<Item = &'static dyn EType> {
    REGISTRY.values().map(|e| e.as_ref())
}

/// Fresh bytes from the OS random generator.
pub(crate) fn random_bytes(len: usize) -> Result<Vec<u8>, KrbError> {
    let mut buf = vec![0u8; len];
    fill(&mut buf).map_err(|_| KrbError::RandomSource)?;
    Ok(buf)
}

/// Encrypts `plaintext` under `key` for `usage` and wraps it in an envelope.
pub fn get_encrypted_data(
    plaintext: &[u8],
    key: &EncryptionKey,
    usage: u32,
    kvno: Option<i32>,
) -> Result<EncryptedData, KrbError> {
    let etype = get_etype(key.key_type())?;
    let msg = etype.encrypt_message(key.key_value(), plaintext, usage)?;
    Ok(EncryptedData {
        etype: etype.etype_id(),
        kvno,
        cipher: msg.ciphertext,
    })
}

/// Decrypts an envelope. The envelope's etype must match the key's.
///
/// # Errors
///
/// Returns `UnsupportedAlgorithm` for an unknown envelope etype and
/// `AlgorithmMismatch` when the key belongs to another etype; neither
/// attempts decryption. Otherwise fails as the etype's `decrypt_message`.
pub fn decrypt_enc_part(
    ed: &EncryptedData,
    key: &EncryptionKey,
    usage: u32,
) -> Result<Vec<u8>, KrbError> {
    let etype = get_etype(ed.etype)?;
    if ed.etype != key.key_type() {
        tracing::debug!(
            data = ed.etype,
            key = key.key_type(),
            "refusing to decrypt with a key of another encryption type"
        );
        return Err(KrbError::AlgorithmMismatch {
            data: ed.etype,
            key: key.key_type(),
        });
    }
    etype.decrypt_message(key.key_value(), &ed.cipher, usage)
}

/// Computes the checksum of `data` for `usage` with the key's checksum type.
pub fn get_checksum(data: &[u8], key: &EncryptionKey, usage: u32) -> Result<Checksum, KrbError> {
    let etype = get_etype(key.key_type())?;
    Ok(Checksum {
        cksumtype: etype.checksum_type_id(),
        checksum: etype.checksum_hash(key.key_value(), data, usage)?,
    })
}

/// Verifies `cksum` over `data` with the key's own checksum type.
///
/// # Errors
///
/// Returns `UnsupportedAlgorithm` if the key's etype or the checksum type is
/// unknown, `AlgorithmMismatch` if the checksum type belongs to another
/// etype than the key, and `Integrity` if the checksum does not verify.
pub fn verify_checksum(
    data: &[u8],
    key: &EncryptionKey,
    usage: u32,
    cksum: &Checksum,
) -> Result<(), KrbError> {
    let etype = get_etype(key.key_type())?;
    if cksum.cksumtype != etype.checksum_type_id() {
        let other = get_checksum_etype(cksum.cksumtype)?;
        tracing::debug!(
            cksumtype = cksum.cksumtype,
            key = key.key_type(),
            "refusing to verify a checksum of another encryption type"
        );
        return Err(KrbError::AlgorithmMismatch {
            data: other.etype_id(),
            key: key.key_type(),
        });
    }
    if etype.verify_checksum(key.key_value(), data, &cksum.checksum, usage) {
        Ok(())
    } else {
        tracing::debug!(cksumtype = cksum.cksumtype, usage, "checksum verification failed");
        Err(KrbError::Integrity)
    }
}
