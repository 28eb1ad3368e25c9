use std::fmt;

use thiserror::Error;

/// Identifies the algorithm a failed lookup was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmId {
    EncryptionType(i32),
    ChecksumType(i32),
    Name(String),
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmId::EncryptionType(id) => write!(f, "encryption type {id}"),
            AlgorithmId::ChecksumType(id) => write!(f, "checksum type {id}"),
            AlgorithmId::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Errors returned by the encryption-type engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KrbError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(AlgorithmId),

    #[error("invalid string-to-key parameters: {0}")]
    InvalidParameter(String),

    #[error("integrity verification failed")]
    Integrity,

    #[error("encryption type mismatch: encrypted data uses {data}, key is {key}")]
    AlgorithmMismatch { data: i32, key: i32 },

    #[error("malformed ciphertext: {0}")]
    Encoding(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("no key found in keyset for encryption type {0}")]
    KeyNotFound(i32),

    #[error("OS random generator unavailable")]
    RandomSource,
}

impl KrbError {
    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        KrbError::Encoding(msg.into())
    }
}
