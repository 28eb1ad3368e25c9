//! Single-DES building blocks shared by des-cbc-crc and des-cbc-md5
//! (RFC 3961 section 6.2).

use cbc::cipher::{KeyIvInit, block_padding::NoPadding};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut};
use des::Des;
use zeroize::Zeroizing;

use super::checksum::{ChecksumHash, constant_time_eq};
use super::zero_pad;
use crate::crypto::{EType, random_bytes};
use crate::error::KrbError;
use crate::types::EncryptedMessage;

/// DES block, key and confounder size in bytes.
pub const BLOCK_SIZE: usize = 8;

type DesCbcEnc = cbc::Encryptor<Des>;
type DesCbcDec = cbc::Decryptor<Des>;

const WEAK_KEYS: [[u8; 8]; 16] = [
    [0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01],
    [0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE],
    [0xE0, 0xE0, 0xE0, 0xE0, 0xF1, 0xF1, 0xF1, 0xF1],
    [0x1F, 0x1F, 0x1F, 0x1F, 0x0E, 0x0E, 0x0E, 0x0E],
    [0x01, 0x1F, 0x01, 0x1F, 0x01, 0x0E, 0x01, 0x0E],
    [0x1F, 0x01, 0x1F, 0x01, 0x0E, 0x01, 0x0E, 0x01],
    [0x01, 0xE0, 0x01, 0xE0, 0x01, 0xF1, 0x01, 0xF1],
    [0xE0, 0x01, 0xE0, 0x01, 0xF1, 0x01, 0xF1, 0x01],
    [0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE],
    [0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01],
    [0x1F, 0xE0, 0x1F, 0xE0, 0x0E, 0xF1, 0x0E, 0xF1],
    [0xE0, 0x1F, 0xE0, 0x1F, 0xF1, 0x0E, 0xF1, 0x0E],
    [0x1F, 0xFE, 0x1F, 0xFE, 0x0E, 0xFE, 0x0E, 0xFE],
    [0xFE, 0x1F, 0xFE, 0x1F, 0xFE, 0x0E, 0xFE, 0x0E],
    [0xE0, 0xFE, 0xE0, 0xFE, 0xF1, 0xFE, 0xF1, 0xFE],
    [0xFE, 0xE0, 0xFE, 0xE0, 0xFE, 0xF1, 0xFE, 0xF1],
];

/// Sets the low bit of each byte so the byte has odd parity.
pub fn fix_parity(key: &mut [u8]) {
    for b in key.iter_mut() {
        let high = *b & 0xFE;
        *b = if high.count_ones() % 2 == 0 { high | 1 } else { high };
    }
}

pub fn is_weak_key(key: &[u8]) -> bool {
    WEAK_KEYS.iter().any(|w| w.as_slice() == key)
}

/// Parity correction followed by the weak-key adjustment.
pub fn key_correction(key: &mut [u8; BLOCK_SIZE]) {
    fix_parity(key);
    if is_weak_key(key) {
        key[7] ^= 0xF0;
    }
}

/// random-to-key for single DES: the seed is taken as a key and corrected.
pub fn random_to_key(seed: &[u8]) -> Vec<u8> {
    let mut key = [0u8; BLOCK_SIZE];
    let n = seed.len().min(BLOCK_SIZE);
    key[..n].copy_from_slice(&seed[..n]);
    key_correction(&mut key);
    key.to_vec()
}

/// Folds the padded string into 56 bits, 7 bits per byte, bit-reversing
/// every second block. Each returned byte holds its 7 bits in the high
/// positions, leaving the low bit for parity.
fn fan_fold(s: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut acc = [0u8; BLOCK_SIZE];
    for (n, block) in s.chunks(BLOCK_SIZE).enumerate() {
        let mut bits: u64 = 0;
        for &b in block {
            bits = (bits << 7) | u64::from(b & 0x7F);
        }
        if n % 2 == 1 {
            bits = bits.reverse_bits() >> 8;
        }
        for (i, a) in acc.iter_mut().enumerate() {
            *a ^= ((bits >> (7 * (7 - i))) & 0x7F) as u8;
        }
    }
    for a in acc.iter_mut() {
        *a <<= 1;
    }
    acc
}

/// mit_des_string_to_key from RFC 3961 section 6.2.
pub fn string_to_key(secret: &str, salt: &str) -> Result<Vec<u8>, KrbError> {
    let mut s = Zeroizing::new(Vec::with_capacity(secret.len() + salt.len() + BLOCK_SIZE));
    s.extend_from_slice(secret.as_bytes());
    s.extend_from_slice(salt.as_bytes());
    let s = Zeroizing::new(zero_pad(std::mem::take(&mut *s), BLOCK_SIZE));

    let mut temp_key = fan_fold(&s);
    key_correction(&mut temp_key);

    // DES-CBC-check: CBC-MAC of the padded string with the key as IV.
    let mac = Zeroizing::new(cbc_encrypt(&temp_key, &temp_key, &s)?);
    let mut key = [0u8; BLOCK_SIZE];
    if let Some(last) = mac.rchunks(BLOCK_SIZE).next() {
        key.copy_from_slice(last);
    }
    key_correction(&mut key);
    temp_key.fill(0);
    Ok(key.to_vec())
}

fn check_key(key: &[u8]) -> Result<(), KrbError> {
    if key.len() != BLOCK_SIZE {
        return Err(KrbError::InvalidKeyLength {
            expected: BLOCK_SIZE,
            actual: key.len(),
        });
    }
    Ok(())
}

fn check_blocks(data: &[u8]) -> Result<(), KrbError> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(KrbError::encoding(format!(
            "length {} is not a multiple of the DES block size",
            data.len()
        )));
    }
    Ok(())
}

/// DES-CBC over whole blocks.
pub fn cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError> {
    check_key(key)?;
    check_blocks(data)?;
    let enc = DesCbcEnc::new_from_slices(key, iv).map_err(|_| KrbError::InvalidKeyLength {
        expected: BLOCK_SIZE,
        actual: iv.len(),
    })?;
    Ok(enc.encrypt_padded_vec_mut::<NoPadding>(data))
}

pub fn cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError> {
    check_key(key)?;
    check_blocks(data)?;
    let dec = DesCbcDec::new_from_slices(key, iv).map_err(|_| KrbError::InvalidKeyLength {
        expected: BLOCK_SIZE,
        actual: iv.len(),
    })?;
    dec.decrypt_padded_vec_mut::<NoPadding>(data)
        .map_err(|_| KrbError::encoding("DES-CBC decryption failed"))
}

/// Builds `confounder | checksum | message | pad` with the checksum taken
/// over the same layout with a zeroed checksum field, then encrypts it with
/// the etype's own `encrypt_data`.
pub fn encrypt_message<E: EType + ?Sized>(
    etype: &E,
    hash: ChecksumHash,
    key: &[u8],
    message: &[u8],
) -> Result<EncryptedMessage, KrbError> {
    check_key(key)?;
    let conf_len = etype.confounder_byte_size();
    let hash_len = hash.size();

    let mut plain = Zeroizing::new(Vec::with_capacity(conf_len + hash_len + message.len() + BLOCK_SIZE));
    plain.extend_from_slice(&random_bytes(conf_len)?);
    plain.resize(conf_len + hash_len, 0);
    plain.extend_from_slice(message);
    let mut plain = Zeroizing::new(zero_pad(std::mem::take(&mut *plain), etype.message_block_byte_size()));

    let cksum = hash.digest(&plain);
    plain[conf_len..conf_len + hash_len].copy_from_slice(&cksum);

    let (ciphertext, _) = etype.encrypt_data(key, &plain)?;
    Ok(EncryptedMessage {
        ciphertext,
        checksum: cksum,
    })
}

/// Inverse of [`encrypt_message`]. The returned plaintext keeps any zero
/// padding that was added on encryption.
pub fn decrypt_message<E: EType + ?Sized>(
    etype: &E,
    hash: ChecksumHash,
    key: &[u8],
    ciphertext: &[u8],
    usage: u32,
) -> Result<Vec<u8>, KrbError> {
    let overhead = etype.confounder_byte_size() + hash.size();
    if ciphertext.len() < overhead {
        return Err(KrbError::encoding(format!(
            "ciphertext of {} bytes is shorter than the {overhead} byte overhead",
            ciphertext.len()
        )));
    }
    let plain = Zeroizing::new(etype.decrypt_data(key, ciphertext)?);
    if !etype.verify_integrity(key, ciphertext, &plain, usage) {
        tracing::debug!(etype = etype.etype_id(), usage, "DES message integrity check failed");
        return Err(KrbError::Integrity);
    }
    Ok(plain[overhead..].to_vec())
}

/// Recomputes the checksum over decrypted `plaintext` with its checksum
/// field zeroed and compares it with the embedded value.
pub fn verify_integrity(hash: ChecksumHash, conf_len: usize, plaintext: &[u8]) -> bool {
    let hash_len = hash.size();
    if plaintext.len() < conf_len + hash_len {
        return false;
    }
    let mut zeroed = Zeroizing::new(plaintext.to_vec());
    zeroed[conf_len..conf_len + hash_len].fill(0);
    let expected = hash.digest(&zeroed);
    constant_time_eq(&expected, &plaintext[conf_len..conf_len + hash_len])
}
