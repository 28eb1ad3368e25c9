//! AES building blocks for the RFC 3962 etypes: CBC with ciphertext
//! stealing, PBKDF2 string-to-key and the simplified-profile framing.

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use zeroize::Zeroizing;

use super::kdf::S2kParams;
use super::rfc3961::checksum::constant_time_eq;
use super::rfc3961::{self, usage_ke, usage_ki};
use super::{EType, random_bytes};
use crate::error::KrbError;
use crate::types::EncryptedMessage;

pub const AES_BLOCK_SIZE: usize = 16;
pub const SHA1_HMAC_LEN: usize = 12;

type HmacSha1 = Hmac<Sha1>;

const IV_ZERO: [u8; AES_BLOCK_SIZE] = [0u8; AES_BLOCK_SIZE];

fn cbc_encrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(key, &IV_ZERO).map_err(|_| {
        KrbError::InvalidKeyLength {
            expected: C::key_size(),
            actual: key.len(),
        }
    })?;
    Ok(enc.encrypt_padded_vec_mut::<NoPadding>(data))
}

fn cbc_decrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, &IV_ZERO).map_err(|_| {
        KrbError::InvalidKeyLength {
            expected: C::key_size(),
            actual: key.len(),
        }
    })?;
    dec.decrypt_padded_vec_mut::<NoPadding>(data)
        .map_err(|_| KrbError::encoding("AES-CBC decryption failed"))
}

/// CBC-CS3 encryption with a zero IV. Inputs of exactly one block are
/// plain ECB; longer inputs have their last two blocks swapped and the
/// final block truncated to the input length.
pub fn cts_encrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let len = data.len();
    if len < AES_BLOCK_SIZE {
        return Err(KrbError::encoding(format!(
            "CTS input of {len} bytes is shorter than one block"
        )));
    }
    if len == AES_BLOCK_SIZE {
        return cbc_encrypt::<C>(key, data);
    }

    let padded = Zeroizing::new(rfc3961::zero_pad(data.to_vec(), AES_BLOCK_SIZE));
    let c = cbc_encrypt::<C>(key, &padded)?;
    let n = c.len() / AES_BLOCK_SIZE;
    let last_len = len - (n - 1) * AES_BLOCK_SIZE;

    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&c[..(n - 2) * AES_BLOCK_SIZE]);
    out.extend_from_slice(&c[(n - 1) * AES_BLOCK_SIZE..]);
    out.extend_from_slice(&c[(n - 2) * AES_BLOCK_SIZE..(n - 2) * AES_BLOCK_SIZE + last_len]);
    Ok(out)
}

pub fn cts_decrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let len = data.len();
    if len < AES_BLOCK_SIZE {
        return Err(KrbError::encoding(format!(
            "CTS input of {len} bytes is shorter than one block"
        )));
    }
    if len == AES_BLOCK_SIZE {
        return cbc_decrypt::<C>(key, data);
    }

    let n = len.div_ceil(AES_BLOCK_SIZE);
    let last_len = len - (n - 1) * AES_BLOCK_SIZE;
    let head = &data[..(n - 2) * AES_BLOCK_SIZE];
    let c_n = &data[(n - 2) * AES_BLOCK_SIZE..(n - 1) * AES_BLOCK_SIZE];
    let c_n1_star = &data[(n - 1) * AES_BLOCK_SIZE..];

    // D = P_n (zero padded) XOR C_{n-1}; its tail is the stolen part of C_{n-1}.
    let d = Zeroizing::new(cbc_decrypt::<C>(key, c_n)?);

    let mut p_n = Zeroizing::new(vec![0u8; last_len]);
    for (i, p) in p_n.iter_mut().enumerate() {
        *p = d[i] ^ c_n1_star[i];
    }

    let mut chain = Vec::with_capacity((n - 1) * AES_BLOCK_SIZE);
    chain.extend_from_slice(head);
    chain.extend_from_slice(c_n1_star);
    chain.extend_from_slice(&d[last_len..]);

    let mut plain = cbc_decrypt::<C>(key, &chain)?;
    plain.extend_from_slice(&p_n);
    Ok(plain)
}

/// PBKDF2-HMAC-SHA1 seed followed by `DK(tkey, "kerberos")`.
pub fn string_to_key<E: EType + ?Sized>(
    etype: &E,
    secret: &str,
    salt: &str,
    params: &str,
) -> Result<Vec<u8>, KrbError> {
    let params = S2kParams::parse(params)?;
    let mut seed = Zeroizing::new(vec![0u8; etype.key_byte_size()]);
    pbkdf2_hmac::<Sha1>(
        secret.as_bytes(),
        salt.as_bytes(),
        params.iterations(),
        &mut seed,
    );
    let tkey = Zeroizing::new(etype.random_to_key(&seed));
    let key = rfc3961::derive_key(etype, &tkey, b"kerberos")?;
    Ok(key.to_vec())
}

/// HMAC-SHA1 truncated to 96 bits.
pub fn hmac_sha1_96(key: &[u8], data: &[u8]) -> Result<Vec<u8>, KrbError> {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(key).map_err(|_| KrbError::InvalidKeyLength {
        expected: 20,
        actual: key.len(),
    })?;
    mac.update(data);
    let full = mac.finalize().into_bytes();
    Ok(full[..SHA1_HMAC_LEN].to_vec())
}

/// `C = E(Ke, confounder | message) | H(Ki, confounder | message)`.
pub fn encrypt_message<E: EType + ?Sized>(
    etype: &E,
    key: &[u8],
    message: &[u8],
    usage: u32,
) -> Result<EncryptedMessage, KrbError> {
    let ke = etype.derive_key(key, &usage_ke(usage))?;
    let ki = etype.derive_key(key, &usage_ki(usage))?;

    let mut plain = Zeroizing::new(random_bytes(etype.confounder_byte_size())?);
    plain.extend_from_slice(message);

    let (mut ciphertext, _) = etype.encrypt_data(&ke, &plain)?;
    let mac = hmac_sha1_96(&ki, &plain)?;
    ciphertext.extend_from_slice(&mac);
    Ok(EncryptedMessage {
        ciphertext,
        checksum: mac,
    })
}

pub fn decrypt_message<E: EType + ?Sized>(
    etype: &E,
    key: &[u8],
    ciphertext: &[u8],
    usage: u32,
) -> Result<Vec<u8>, KrbError> {
    let conf_len = etype.confounder_byte_size();
    let mac_len = etype.hmac_bit_length() / 8;
    if ciphertext.len() < conf_len + mac_len {
        return Err(KrbError::encoding(format!(
            "ciphertext of {} bytes is shorter than the {} byte overhead",
            ciphertext.len(),
            conf_len + mac_len
        )));
    }

    let ke = etype.derive_key(key, &usage_ke(usage))?;
    let plain = Zeroizing::new(etype.decrypt_data(&ke, &ciphertext[..ciphertext.len() - mac_len])?);
    if !etype.verify_integrity(key, ciphertext, &plain, usage) {
        tracing::debug!(etype = etype.etype_id(), usage, "AES message integrity check failed");
        return Err(KrbError::Integrity);
    }
    Ok(plain[conf_len..].to_vec())
}

/// Checks the trailing HMAC of `ciphertext` against decrypted `plaintext`.
pub fn verify_integrity<E: EType + ?Sized>(
    etype: &E,
    protocol_key: &[u8],
    ciphertext: &[u8],
    plaintext: &[u8],
    usage: u32,
) -> bool {
    let mac_len = etype.hmac_bit_length() / 8;
    if ciphertext.len() < mac_len {
        return false;
    }
    let Ok(ki) = etype.derive_key(protocol_key, &usage_ki(usage)) else {
        return false;
    };
    let Ok(expected) = hmac_sha1_96(&ki, plaintext) else {
        return false;
    };
    constant_time_eq(&expected, &ciphertext[ciphertext.len() - mac_len..])
}
