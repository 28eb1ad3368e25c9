//! Property tests over every registered encryption type.
//!
//! - `roundtrip`: decrypt(encrypt(m)) returns m (DES up to its zero padding)
//! - `integrity`: any single flipped bit is reported as an integrity failure
//! - `isolation`: AES keys for one usage cannot open data for another

use proptest::prelude::*;

use krbcrypt::iana::{etype_id, key_usage};
use krbcrypt::{
    EType, EncryptedData, KrbError, decrypt_enc_part, etypes, get_checksum, get_encrypted_data,
    random_key, verify_checksum,
};

fn etype_ids() -> Vec<i32> {
    etypes().map(|e| e.etype_id()).collect()
}

fn any_etype() -> impl Strategy<Value = i32> {
    prop::sample::select(etype_ids())
}

fn any_usage() -> impl Strategy<Value = u32> {
    prop::sample::select(key_usage::ALL.to_vec())
}

fn aes_etype() -> impl Strategy<Value = i32> {
    prop::sample::select(vec![
        etype_id::AES128_CTS_HMAC_SHA1_96,
        etype_id::AES256_CTS_HMAC_SHA1_96,
    ])
}

fn is_des(etype: i32) -> bool {
    matches!(etype, etype_id::DES_CBC_CRC | etype_id::DES_CBC_MD5)
}

mod roundtrip {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_decrypt_inverts_encrypt(
            etype in any_etype(),
            usage in any_usage(),
            data in prop::collection::vec(any::<u8>(), 0..300),
        ) {
            let key = random_key(etype).unwrap();
            let ed = get_encrypted_data(&data, &key, usage, Some(1)).unwrap();
            prop_assert_eq!(ed.etype, etype);
            prop_assert_eq!(ed.kvno, Some(1));

            let plain = decrypt_enc_part(&ed, &key, usage).unwrap();
            if is_des(etype) {
                prop_assert!(plain.starts_with(&data));
                let pad = &plain[data.len()..];
                prop_assert!(pad.len() < 8);
                prop_assert!(pad.iter().all(|&b| b == 0));
                prop_assert_eq!(ed.cipher.len() % 8, 0);
            } else {
                prop_assert_eq!(plain, data);
            }
        }

        #[test]
        fn prop_encryption_is_randomized(
            etype in any_etype(),
            data in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let key = random_key(etype).unwrap();
            let a = get_encrypted_data(&data, &key, 1, None).unwrap();
            let b = get_encrypted_data(&data, &key, 1, None).unwrap();
            prop_assert_ne!(a.cipher, b.cipher);
        }

        #[test]
        fn prop_checksum_verifies(
            etype in any_etype(),
            usage in any_usage(),
            data in prop::collection::vec(any::<u8>(), 0..200),
        ) {
            let key = random_key(etype).unwrap();
            let cksum = get_checksum(&data, &key, usage).unwrap();
            let e = krbcrypt::get_etype(etype).unwrap();
            prop_assert_eq!(cksum.cksumtype, e.checksum_type_id());
            prop_assert_eq!(cksum.checksum.len() * 8, e.hmac_bit_length());
            prop_assert!(verify_checksum(&data, &key, usage, &cksum).is_ok());
        }
    }
}

mod integrity {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_bit_flip_is_detected(
            etype in any_etype(),
            usage in any_usage(),
            data in prop::collection::vec(any::<u8>(), 0..128),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let key = random_key(etype).unwrap();
            let mut ed = get_encrypted_data(&data, &key, usage, None).unwrap();
            let i = position.index(ed.cipher.len());
            ed.cipher[i] ^= 1 << bit;
            prop_assert_eq!(decrypt_enc_part(&ed, &key, usage), Err(KrbError::Integrity));
        }

        #[test]
        fn prop_checksum_detects_changed_data(
            etype in any_etype(),
            data in prop::collection::vec(any::<u8>(), 1..128),
            position in any::<prop::sample::Index>(),
        ) {
            let key = random_key(etype).unwrap();
            let cksum = get_checksum(&data, &key, 7).unwrap();
            let mut changed = data.clone();
            let i = position.index(changed.len());
            changed[i] ^= 0x01;
            prop_assert_eq!(
                verify_checksum(&changed, &key, 7, &cksum),
                Err(KrbError::Integrity)
            );
        }

        #[test]
        fn prop_truncated_ciphertext_is_rejected(
            etype in any_etype(),
            data in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let key = random_key(etype).unwrap();
            let e = krbcrypt::get_etype(etype).unwrap();
            let ed = get_encrypted_data(&data, &key, 3, None).unwrap();
            let overhead = e.confounder_byte_size() + e.hmac_bit_length() / 8;
            let short = EncryptedData {
                cipher: ed.cipher[..overhead - 1].to_vec(),
                ..ed
            };
            prop_assert!(matches!(
                decrypt_enc_part(&short, &key, 3),
                Err(KrbError::Encoding(_))
            ));
        }
    }
}

mod isolation {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_other_usage_fails(
            etype in aes_etype(),
            usage in 1u32..1000,
            delta in 1u32..1000,
            data in prop::collection::vec(any::<u8>(), 0..128),
        ) {
            let key = random_key(etype).unwrap();
            let ed = get_encrypted_data(&data, &key, usage, None).unwrap();
            prop_assert_eq!(
                decrypt_enc_part(&ed, &key, usage + delta),
                Err(KrbError::Integrity)
            );
        }

        #[test]
        fn prop_other_key_fails(
            etype in any_etype(),
            data in prop::collection::vec(any::<u8>(), 0..128),
        ) {
            let key = random_key(etype).unwrap();
            let other = random_key(etype).unwrap();
            let ed = get_encrypted_data(&data, &key, 1, None).unwrap();
            prop_assert_eq!(decrypt_enc_part(&ed, &other, 1), Err(KrbError::Integrity));
        }
    }
}
