//! des-cbc-crc, RFC 3961 section 6.2.3.

use super::rfc3961::checksum::ChecksumHash;
use super::rfc3961::{self, des};
use super::{EType, ETypeDescriptor};
use crate::error::KrbError;
use crate::iana::{chksum_type, etype_id};
use crate::types::EncryptedMessage;

const HASH: ChecksumHash = ChecksumHash::Crc32;

static DESCRIPTOR: ETypeDescriptor = ETypeDescriptor {
    name: "des-cbc-crc",
    etype: etype_id::DES_CBC_CRC,
    checksum_type: chksum_type::CRC32,
    key_byte_size: des::BLOCK_SIZE,
    key_seed_bit_length: 64,
    message_block_byte_size: des::BLOCK_SIZE,
    confounder_byte_size: des::BLOCK_SIZE,
    hmac_bit_length: 32,
    cypher_block_bit_length: des::BLOCK_SIZE * 8,
    default_string_to_key_params: "",
};

/// DES in CBC mode with the key doubling as IV, framed with a CRC-32.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesCbcCrc;

impl EType for DesCbcCrc {
    fn descriptor(&self) -> &'static ETypeDescriptor {
        &DESCRIPTOR
    }

    fn string_to_key(&self, secret: &str, salt: &str, params: &str) -> Result<Vec<u8>, KrbError> {
        if !params.is_empty() {
            return Err(KrbError::InvalidParameter(
                "des-cbc-crc takes no string-to-key parameters".into(),
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

    /// Single DES has no derivation layer: the protocol key is used as is.
    fn derive_key(&self, protocol_key: &[u8], _usage: &[u8]) -> Result<Vec<u8>, KrbError> {
        Ok(protocol_key.to_vec())
    }

    fn encrypt_data(&self, key: &[u8], data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), KrbError> {
        // The legacy profile uses the key itself as the IV.
        let iv = key.to_vec();
        let ciphertext = des::cbc_encrypt(key, &iv, data)?;
        Ok((ciphertext, iv))
    }

    fn decrypt_data(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError> {
        des::cbc_decrypt(key, key, data)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iana::key_usage;

    const KEY: [u8; 8] = [0xcb, 0xc2, 0x2f, 0xae, 0x23, 0x52, 0x98, 0xe3];

    #[test]
    fn identity_and_sizes() {
        let e = DesCbcCrc;
        assert_eq!(e.identity(), (1, 1));
        assert_eq!(e.key_byte_size(), 8);
        assert_eq!(e.key_seed_bit_length(), 64);
        assert_eq!(e.confounder_byte_size(), 8);
        assert_eq!(e.message_block_byte_size(), 8);
        assert_eq!(e.cypher_block_bit_length(), 64);
        assert_eq!(e.hmac_bit_length(), 32);
        assert_eq!(e.default_string_to_key_params(), "");
    }

    #[test]
    fn iv_is_the_key() {
        let (ct, iv) = DesCbcCrc.encrypt_data(&KEY, &[0u8; 16]).unwrap();
        assert_eq!(iv, KEY);
        assert_eq!(des::cbc_encrypt(&KEY, &KEY, &[0u8; 16]).unwrap(), ct);
        assert_ne!(des::cbc_encrypt(&KEY, &[0u8; 8], &[0u8; 16]).unwrap(), ct);
    }

    #[test]
    fn derive_key_is_a_copy() {
        let k = DesCbcCrc.derive_key(&KEY, &[0, 0, 0, 3, 0xaa]).unwrap();
        assert_eq!(k, KEY);
    }

    #[test]
    fn message_roundtrip_with_checksum_framing() {
        let msg = b"0123456789abcdef0123";
        let out = DesCbcCrc
            .encrypt_message(&KEY, msg, key_usage::AP_REP_ENCPART)
            .unwrap();
        // confounder + crc + 20 byte message = 32 bytes, already aligned.
        assert_eq!(out.ciphertext.len(), 32);
        assert_eq!(out.checksum.len(), 4);

        let plain = DesCbcCrc
            .decrypt_message(&KEY, &out.ciphertext, key_usage::AP_REP_ENCPART)
            .unwrap();
        assert_eq!(plain, msg);

        let raw = DesCbcCrc.decrypt_data(&KEY, &out.ciphertext).unwrap();
        assert_eq!(&raw[8..12], out.checksum.as_slice());
        assert!(DesCbcCrc.verify_integrity(&KEY, &out.ciphertext, &raw, 0));
    }

    #[test]
    fn checksum_is_plain_crc() {
        let c = DesCbcCrc.checksum_hash(&KEY, b"foo", 0).unwrap();
        assert_eq!(c, vec![0x33, 0xbc, 0x32, 0x73]);
        assert!(DesCbcCrc.verify_checksum(&KEY, b"foo", &c, 0));
        assert!(!DesCbcCrc.verify_checksum(&KEY, b"fo0", &c, 0));
    }

    #[test]
    fn rejects_string_to_key_params() {
        assert!(matches!(
            DesCbcCrc.string_to_key("password", "salt", "00001000"),
            Err(KrbError::InvalidParameter(_))
        ));
    }
}
