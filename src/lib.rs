//! Kerberos encryption types after RFC 3961 and RFC 3962.
//!
//! Every supported encryption type implements [`crypto::EType`] and is
//! reachable through the registry in [`crypto`]. The helpers re-exported
//! at the crate root bridge [`EncryptionKey`] to the protocol's
//! [`EncryptedData`] and [`Checksum`] structures.

pub mod crypto;
pub mod error;
pub mod iana;
pub mod types;

pub use crate::crypto::{
    EType, ETypeDescriptor, S2kParams, decrypt_enc_part, etypes, get_checksum,
    get_checksum_etype, get_encrypted_data, get_etype, get_etype_by_name, verify_checksum,
};
pub use crate::error::{AlgorithmId, KrbError};
pub use crate::types::{Checksum, EncryptedData, EncryptedMessage, EncryptionKey, Keyset};

/// Derives a key for `etype` from a password and salt.
///
/// An empty `params` selects the etype's default string-to-key parameters.
pub fn string_to_key(
    etype: i32,
    secret: &str,
    salt: &str,
    params: &str,
) -> Result<EncryptionKey, KrbError> {
    let e = get_etype(etype)?;
    let params = if params.is_empty() {
        e.default_string_to_key_params()
    } else {
        params
    };
    let key = e.string_to_key(secret, salt, params)?;
    Ok(EncryptionKey::new(e.etype_id(), key))
}

/// Generates a fresh random key for `etype` from the OS generator.
pub fn random_key(etype: i32) -> Result<EncryptionKey, KrbError> {
    let e = get_etype(etype)?;
    let seed = zeroize::Zeroizing::new(crypto::random_bytes(e.key_seed_bit_length() / 8)?);
    Ok(EncryptionKey::new(e.etype_id(), e.random_to_key(&seed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iana::etype_id;

    #[test]
    fn string_to_key_uses_default_params() {
        let with_default = string_to_key(
            etype_id::AES128_CTS_HMAC_SHA1_96,
            "password",
            "EXAMPLE.COMuser",
            "",
        )
        .unwrap();
        let explicit = string_to_key(
            etype_id::AES128_CTS_HMAC_SHA1_96,
            "password",
            "EXAMPLE.COMuser",
            "00001000",
        )
        .unwrap();
        assert_eq!(with_default, explicit);
        assert_eq!(with_default.key_type(), etype_id::AES128_CTS_HMAC_SHA1_96);
    }

    #[test]
    fn string_to_key_for_des() {
        let key = string_to_key(etype_id::DES_CBC_CRC, "password", "ATHENA.MIT.EDUraeburn", "")
            .unwrap();
        assert_eq!(hex::encode(key.key_value()), "cbc22fae235298e3");
    }

    #[test]
    fn random_key_has_the_etype_size() {
        for e in etypes() {
            let key = random_key(e.etype_id()).unwrap();
            assert_eq!(key.key_value().len(), e.key_byte_size(), "{}", e.name());
        }
        let a = random_key(etype_id::AES256_CTS_HMAC_SHA1_96).unwrap();
        let b = random_key(etype_id::AES256_CTS_HMAC_SHA1_96).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn random_des_key_has_odd_parity() {
        let key = random_key(etype_id::DES_CBC_MD5).unwrap();
        assert!(key.key_value().iter().all(|b| b.count_ones() % 2 == 1));
    }

    #[test]
    fn unknown_etype_is_unsupported() {
        assert_eq!(
            string_to_key(23, "p", "s", "").unwrap_err(),
            KrbError::UnsupportedAlgorithm(AlgorithmId::EncryptionType(23))
        );
    }
}
