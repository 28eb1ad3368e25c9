//! aes128-cts-hmac-sha1-96 and aes256-cts-hmac-sha1-96 (RFC 3962).
//!
//! Both variants share every operation and differ only in the block
//! cipher and the key size, so they are stamped out by one macro.

use aes::{Aes128, Aes256};

use super::rfc3961::{self, usage_kc};
use super::rfc3962::{self, AES_BLOCK_SIZE, cts_decrypt, cts_encrypt, hmac_sha1_96};
use super::{EType, ETypeDescriptor};
use crate::error::KrbError;
use crate::iana::{chksum_type, etype_id};
use crate::types::EncryptedMessage;

const ZERO_IV: [u8; AES_BLOCK_SIZE] = [0u8; AES_BLOCK_SIZE];

macro_rules! aes_etype {
    ($(#[$meta:meta])* $name:ident, $cipher:ty, $descriptor:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl EType for $name {
            fn descriptor(&self) -> &'static ETypeDescriptor {
                &$descriptor
            }

            fn string_to_key(
                &self,
                secret: &str,
                salt: &str,
                params: &str,
            ) -> Result<Vec<u8>, KrbError> {
                rfc3962::string_to_key(self, secret, salt, params)
            }

            fn random_to_key(&self, seed: &[u8]) -> Vec<u8> {
                seed.to_vec()
            }

            fn derive_random(
                &self,
                protocol_key: &[u8],
                usage: &[u8],
            ) -> Result<Vec<u8>, KrbError> {
                Ok(rfc3961::derive_random(self, protocol_key, usage)?.to_vec())
            }

            fn derive_key(&self, protocol_key: &[u8], usage: &[u8]) -> Result<Vec<u8>, KrbError> {
                Ok(rfc3961::derive_key(self, protocol_key, usage)?.to_vec())
            }

            fn encrypt_data(
                &self,
                key: &[u8],
                data: &[u8],
            ) -> Result<(Vec<u8>, Vec<u8>), KrbError> {
                Ok((cts_encrypt::<$cipher>(key, data)?, ZERO_IV.to_vec()))
            }

            fn decrypt_data(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError> {
                cts_decrypt::<$cipher>(key, data)
            }

            fn encrypt_message(
                &self,
                key: &[u8],
                message: &[u8],
                usage: u32,
            ) -> Result<EncryptedMessage, KrbError> {
                rfc3962::encrypt_message(self, key, message, usage)
            }

            fn decrypt_message(
                &self,
                key: &[u8],
                ciphertext: &[u8],
                usage: u32,
            ) -> Result<Vec<u8>, KrbError> {
                rfc3962::decrypt_message(self, key, ciphertext, usage)
            }

            fn verify_integrity(
                &self,
                protocol_key: &[u8],
                ciphertext: &[u8],
                plaintext: &[u8],
                usage: u32,
            ) -> bool {
                rfc3962::verify_integrity(self, protocol_key, ciphertext, plaintext, usage)
            }

            fn checksum_hash(
                &self,
                protocol_key: &[u8],
                data: &[u8],
                usage: u32,
            ) -> Result<Vec<u8>, KrbError> {
                let kc = rfc3961::derive_key(self, protocol_key, &usage_kc(usage))?;
                hmac_sha1_96(&kc, data)
            }
        }
    };
}

static AES128_DESCRIPTOR: ETypeDescriptor = ETypeDescriptor {
    name: "aes128-cts-hmac-sha1-96",
    etype: etype_id::AES128_CTS_HMAC_SHA1_96,
    checksum_type: chksum_type::HMAC_SHA1_96_AES128,
    key_byte_size: 16,
    key_seed_bit_length: 128,
    message_block_byte_size: 1,
    confounder_byte_size: AES_BLOCK_SIZE,
    hmac_bit_length: 96,
    cypher_block_bit_length: AES_BLOCK_SIZE * 8,
    default_string_to_key_params: "00001000",
};

static AES256_DESCRIPTOR: ETypeDescriptor = ETypeDescriptor {
    name: "aes256-cts-hmac-sha1-96",
    etype: etype_id::AES256_CTS_HMAC_SHA1_96,
    checksum_type: chksum_type::HMAC_SHA1_96_AES256,
    key_byte_size: 32,
    key_seed_bit_length: 256,
    message_block_byte_size: 1,
    confounder_byte_size: AES_BLOCK_SIZE,
    hmac_bit_length: 96,
    cypher_block_bit_length: AES_BLOCK_SIZE * 8,
    default_string_to_key_params: "00001000",
};

aes_etype!(
    /// AES-128 in CTS mode with HMAC-SHA1-96, etype 17.
    Aes128CtsHmacSha196,
    Aes128,
    AES128_DESCRIPTOR
);

aes_etype!(
    /// AES-256 in CTS mode with HMAC-SHA1-96, etype 18.
    Aes256CtsHmacSha196,
    Aes256,
    AES256_DESCRIPTOR
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::rfc3961::{usage_ke, usage_ki};

    const PASSWORD: &str = "password";
    const SALT: &str = "ATHENA.MIT.EDUraeburn";

    #[test]
    fn descriptors() {
        assert_eq!(Aes128CtsHmacSha196.identity(), (17, 15));
        assert_eq!(Aes256CtsHmacSha196.identity(), (18, 16));
        assert_eq!(Aes128CtsHmacSha196.key_byte_size(), 16);
        assert_eq!(Aes256CtsHmacSha196.key_byte_size(), 32);
        assert_eq!(Aes256CtsHmacSha196.key_seed_bit_length(), 256);
        assert_eq!(Aes256CtsHmacSha196.message_block_byte_size(), 1);
        assert_eq!(Aes256CtsHmacSha196.default_string_to_key_params(), "00001000");
    }

    #[test]
    fn string_to_key_rfc3962_vectors() {
        let cases: [(&dyn EType, &str, &str); 4] = [
            (&Aes128CtsHmacSha196, "00000001", "42263c6e89f4fc28b8df68ee09799f15"),
            (&Aes128CtsHmacSha196, "000004b0", "4c01cd46d632d01e6dbe230a01ed642a"),
            (
                &Aes256CtsHmacSha196,
                "00000001",
                "fe697b52bc0d3ce14432ba036a92e65bbb52280990a2fa27883998d72af30161",
            ),
            (
                &Aes256CtsHmacSha196,
                "000004b0",
                "55a6ac740ad17b4846941051e1e8b0a7548d93b0ab30a8bc3ff16280382b8c2a",
            ),
        ];
        for (etype, params, expected) in cases {
            let key = etype.string_to_key(PASSWORD, SALT, params).unwrap();
            assert_eq!(hex::encode(key), expected, "{} {params}", etype.name());
        }
    }

    #[test]
    fn string_to_key_rejects_bad_params() {
        for bad in ["00000000", "xyz", "0000100"] {
            assert!(matches!(
                Aes128CtsHmacSha196.string_to_key(PASSWORD, SALT, bad),
                Err(KrbError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn checksum_key_derivation_known_answer() {
        let base = hex::decode("3c4eefa91060dc4000582c17885aa63a58cd5a57c5cd3e7601a0587e7e05f9d0")
            .unwrap();
        let kc = Aes256CtsHmacSha196.derive_key(&base, &usage_kc(6)).unwrap();
        assert_eq!(
            hex::encode(&kc),
            "14ad9322e8134937815fb995067f8c1859a8237c599e450f2bc1e99330c94232"
        );

        let data = hex::decode(concat!(
            "3067a00703050000810000a20d1b0b4558414d504c452e434f4da3253023a00302",
            "0103a11c301a1b04686f73741b127065707065722e6578616d706c652e636f6da5",
            "11180f32303234313031303230333832335aa7060204769220c1a80b3009020112",
            "020113020114"
        ))
        .unwrap();
        let sum = Aes256CtsHmacSha196.checksum_hash(&base, &data, 6).unwrap();
        assert_eq!(hex::encode(&sum), "351e56f9fa207cdca62a0bdc");
        assert!(Aes256CtsHmacSha196.verify_checksum(&base, &data, &sum, 6));
        assert!(!Aes256CtsHmacSha196.verify_checksum(&base, &data, &sum, 7));
    }

    #[test]
    fn decrypts_known_ciphertext() {
        let key = Aes256CtsHmacSha196
            .string_to_key("test", "test1234", "00001000")
            .unwrap();
        let ct = hex::decode(concat!(
            "3d291c685489e7b75dabdc6e010ad0019db16481b12cb8bfa5136192",
            "42761f990de2c027661c9833bcced3"
        ))
        .unwrap();
        let plain = Aes256CtsHmacSha196.decrypt_message(&key, &ct, 2).unwrap();
        assert_eq!(plain, b"lJ3ftfwxjsR522O");

        let key = Aes256CtsHmacSha196
            .string_to_key("admin", "admin1234", "")
            .unwrap();
        let ct = hex::decode(concat!(
            "29737f3db6bcdfe9990fb2136d3efe6f2100e6c4ac75824299d8d3702f5a2e31",
            "c7a336747dfd734a1ea0165ebb27c0d7ce9b5aec7a"
        ))
        .unwrap();
        let plain = Aes256CtsHmacSha196.decrypt_message(&key, &ct, 1).unwrap();
        assert_eq!(plain, b"3ahwzt9MG9WVEuBVC5j0oi6sI");
    }

    #[test]
    fn usage_keys_are_distinct() {
        let key = [0x11u8; 16];
        let e = Aes128CtsHmacSha196;
        let ke = e.derive_key(&key, &usage_ke(3)).unwrap();
        let ki = e.derive_key(&key, &usage_ki(3)).unwrap();
        let kc = e.derive_key(&key, &usage_kc(3)).unwrap();
        assert_ne!(ke, ki);
        assert_ne!(ki, kc);
        assert_ne!(ke, e.derive_key(&key, &usage_ke(4)).unwrap());
    }

    #[test]
    fn message_lengths_roundtrip() {
        let key = [0x5au8; 32];
        for len in [0, 1, 8, 15, 16, 17, 32, 49] {
            let msg = vec![0xbb; len];
            let out = Aes256CtsHmacSha196.encrypt_message(&key, &msg, 5).unwrap();
            assert_eq!(out.ciphertext.len(), 16 + len + 12);
            assert_eq!(&out.ciphertext[out.ciphertext.len() - 12..], out.checksum.as_slice());
            let back = Aes256CtsHmacSha196
                .decrypt_message(&key, &out.ciphertext, 5)
                .unwrap();
            assert_eq!(back, msg, "len {len}");
        }
    }

    #[test]
    fn wrong_usage_or_tamper_fails_integrity() {
        let key = [0x33u8; 16];
        let out = Aes128CtsHmacSha196
            .encrypt_message(&key, b"ticket body", 2)
            .unwrap();
        assert_eq!(
            Aes128CtsHmacSha196.decrypt_message(&key, &out.ciphertext, 3),
            Err(KrbError::Integrity)
        );
        let mut bad = out.ciphertext.clone();
        bad[0] ^= 0x80;
        assert_eq!(
            Aes128CtsHmacSha196.decrypt_message(&key, &bad, 2),
            Err(KrbError::Integrity)
        );
    }

    #[test]
    fn short_ciphertext_is_an_encoding_error() {
        assert!(matches!(
            Aes128CtsHmacSha196.decrypt_message(&[0u8; 16], &[0u8; 27], 1),
            Err(KrbError::Encoding(_))
        ));
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        assert!(matches!(
            Aes256CtsHmacSha196.encrypt_message(&[0u8; 16], b"x", 1),
            Err(KrbError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
    }
}
