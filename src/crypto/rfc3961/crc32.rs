//! The modified CRC-32 used by des-cbc-crc (RFC 3961 section 6.2.3).
//!
//! Same polynomial and bit order as ISO CRC-32, but the register starts at
//! zero and the result is not complemented. Output is little-endian.

const POLY: u32 = 0xEDB8_8320;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Size of the checksum in bytes.
pub const SIZE: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.crc = 0;
    }

    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.crc = TABLE[((self.crc as u8) ^ b) as usize] ^ (self.crc >> 8);
        }
    }

    pub fn sum(&self) -> [u8; SIZE] {
        self.crc.to_le_bytes()
    }
}

/// One-shot helper.
pub fn checksum(data: &[u8]) -> [u8; SIZE] {
    let mut h = Crc32::new();
    h.update(data);
    h.sum()
}
