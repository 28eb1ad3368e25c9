//! Unkeyed checksum algorithms and constant-time comparison.

use md5::{Digest, Md5};
use subtle::ConstantTimeEq;

use super::crc32;

/// The hash function an etype folds into its confounder framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumHash {
    Crc32,
    Md5,
}

impl ChecksumHash {
    /// Output size in bytes.
    pub fn size(self) -> usize {
        match self {
            ChecksumHash::Crc32 => crc32::SIZE,
            ChecksumHash::Md5 => 16,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            ChecksumHash::Crc32 => crc32::checksum(data).to_vec(),
            ChecksumHash::Md5 => Md5::digest(data).to_vec(),
        }
    }
}

/// Compares two byte strings without short-circuiting on the first difference.
///
/// A length mismatch returns `false`; lengths are public for every checksum type.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
