//! des-cbc-md5, RFC 3961 section 6.2.1.

use super::rfc3961::checksum::ChecksumHash;
use super::rfc3961::{self, des};
use super::{EType, ETypeDescriptor};
use crate::error::KrbError;
use crate::iana::{chksum_type, etype_id};
use crate::types::EncryptedMessage;

const HASH: ChecksumHash = ChecksumHash::Md5;
const ZERO_IV: [u8; des::BLOCK_SIZE] = [0u8; des::BLOCK_SIZE];

static DESCRIPTOR: ETypeDescriptor = ETypeDescriptor {
    name: "des-cbc-md5",
    etype: etype_id::DES_CBC_MD5,
    checksum_type: chksum_type::RSA_MD5,
    key_byte_size: des::BLOCK_SIZE,
    key_seed_bit_length: 64,
    message_block_byte_size: des::BLOCK_SIZE,
    confounder_byte_size: des::BLOCK_SIZE,
    hmac_bit_length: 128,
    cypher_block_bit_length: des::BLOCK_SIZE * 8,
    default_string_to_key_params: "",
};

/// DES in CBC mode with a zero IV, framed with an MD5 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesCbcMd5;

impl EType for DesCbcMd5 {
    fn descriptor(&self) -> &'static ETypeDescriptor {
        &DESCRIPTOR
    }

    fn string_to_key(&self, secret: &str, salt: &str, params: &str) -> Result<Vec<u8>, KrbError> {
        if !params.is_empty() {
            return Err(KrbError::InvalidParameter(
                "des-cbc-md5 takes no string-to-key parameters".into(),
            ));
        }
        des::string_to_key(secret, salt)
    }

    fn random_to_key(&self, seed: &[u8]) -> Vec<u8> {
        des::random_to_key(seed)
    }

    fn derive_random(&self, protocol_key: &[u8], usage: &[u8]) -> Result<Vec<u8>, KrbError> {
        Ok(rfc3961::derive_random(self, protocol_key, usage)?.to_vec())
    }

    fn derive_key(&self, protocol_key: &[u8], _usage: &[u8]) -> Result<Vec<u8>, KrbError> {
        Ok(protocol_key.to_vec())
    }

    fn encrypt_data(&self, key: &[u8], data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), KrbError> {
        let ciphertext = des::cbc_encrypt(key, &ZERO_IV, data)?;
        Ok((ciphertext, ZERO_IV.to_vec()))
    }

    fn decrypt_data(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError> {
        des::cbc_decrypt(key, &ZERO_IV, data)
    }

    fn encrypt_message(
        &self,
        key: &[u8],
        message: &[u8],
        _usage: u32,
    ) -> Result<EncryptedMessage, KrbError> {
        des::encrypt_message(self, HASH, key, message)
    }

    fn decrypt_message(
        &self,
        key: &[u8],
        ciphertext: &[u8],
        usage: u32,
    ) -> Result<Vec<u8>, KrbError> {
        des::decrypt_message(self, HASH, key, ciphertext, usage)
    }

    fn verify_integrity(
        &self,
        _protocol_key: &[u8],
        _ciphertext: &[u8],
        plaintext: &[u8],
        _usage: u32,
    ) -> bool {
        des::verify_integrity(HASH, self.confounder_byte_size(), plaintext)
    }

    fn checksum_hash(
        &self,
        _protocol_key: &[u8],
        data: &[u8],
        _usage: u32,
    ) -> Result<Vec<u8>, KrbError> {
        Ok(HASH.digest(data))
    }
}
