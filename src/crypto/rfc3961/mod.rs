//! The algorithm-independent parts of RFC 3961.

pub mod checksum;
pub mod crc32;
pub mod des;

use zeroize::Zeroizing;

use super::EType;
use crate::error::KrbError;

const KC: u8 = 0x99;
const KE: u8 = 0xAA;
const KI: u8 = 0x55;

/// Well-known constant for the checksum key of `usage`.
pub fn usage_kc(usage: u32) -> [u8; 5] {
    usage_constant(usage, KC)
}

/// Well-known constant for the encryption key of `usage`.
pub fn usage_ke(usage: u32) -> [u8; 5] {
    usage_constant(usage, KE)
}

/// Well-known constant for the integrity key of `usage`.
pub fn usage_ki(usage: u32) -> [u8; 5] {
    usage_constant(usage, KI)
}

fn usage_constant(usage: u32, suffix: u8) -> [u8; 5] {
    let mut out = [0u8; 5];
    out[..4].copy_from_slice(&usage.to_be_bytes());
    out[4] = suffix;
    out
}

/// n-fold from RFC 3961 section 5.1: stretches or compresses `input` to
/// `out_bits` bits. Both lengths must be whole bytes.
pub fn nfold(input: &[u8], out_bits: usize) -> Vec<u8> {
    let in_len = input.len();
    let out_len = out_bits / 8;
    if in_len == 0 || out_len == 0 {
        return vec![0; out_len];
    }

    let lcm = lcm(in_len, out_len);
    let in_bits = in_len * 8;
    let mut out = vec![0u8; out_len];
    let mut carry: u32 = 0;

    for i in (0..lcm).rev() {
        // Index of the most significant bit of the input bit string that
        // lands in output byte i, after rotating by 13 bits per copy.
        let msbit = ((in_bits - 1) + ((in_bits + 13) * (i / in_len)) + ((in_len - (i % in_len)) << 3))
            % in_bits;

        let hi = input[((in_len - 1) - (msbit >> 3)) % in_len] as u32;
        let lo = input[(in_len - (msbit >> 3)) % in_len] as u32;
        carry += (((hi << 8) | lo) >> ((msbit & 7) + 1)) & 0xff;
        carry += out[i % out_len] as u32;
        out[i % out_len] = (carry & 0xff) as u8;
        carry >>= 8;
    }

    // End-around carry.
    if carry != 0 {
        for b in out.iter_mut().rev() {
            carry += *b as u32;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
    }

    out
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

/// Appends zero bytes until `data` is a multiple of `block` bytes.
pub fn zero_pad(mut data: Vec<u8>, block: usize) -> Vec<u8> {
    if block > 1 {
        let rem = data.len() % block;
        if rem != 0 {
            data.resize(data.len() + block - rem, 0);
        }
    }
    data
}

/// DR(protocol key, constant) from RFC 3961 section 5.1.
///
/// The constant is n-folded to one cipher block and repeatedly encrypted
/// with the etype's own `encrypt_data` until the key-seed length is filled.
pub fn derive_random<E: EType + ?Sized>(
    etype: &E,
    protocol_key: &[u8],
    usage: &[u8],
) -> Result<Zeroizing<Vec<u8>>, KrbError> {
    let block_bits = etype.cypher_block_bit_length();
    let seed_len = etype.key_seed_bit_length() / 8;

    let mut block = Zeroizing::new(nfold(usage, block_bits));
    let mut out = Zeroizing::new(Vec::with_capacity(seed_len));
    while out.len() < seed_len {
        let (ciphertext, _) = etype.encrypt_data(protocol_key, &block)?;
        block = Zeroizing::new(ciphertext);
        let take = (seed_len - out.len()).min(block.len());
        out.extend_from_slice(&block[..take]);
    }
    Ok(out)
}

/// DK(protocol key, constant) = random-to-key(DR(protocol key, constant)).
pub fn derive_key<E: EType + ?Sized>(
    etype: &E,
    protocol_key: &[u8],
    usage: &[u8],
) -> Result<Zeroizing<Vec<u8>>, KrbError> {
    let random = derive_random(etype, protocol_key, usage)?;
    Ok(Zeroizing::new(etype.random_to_key(&random)))
}
