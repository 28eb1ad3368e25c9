use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::KrbError;

/// A Kerberos key: the algorithm it belongs to and its raw bytes.
///
/// The bytes are wiped when the key is dropped and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    #[zeroize(skip)]
    #[serde(rename = "keytype")]
    key_type: i32,
    #[serde(rename = "keyvalue", with = "hex_bytes")]
    key_value: Vec<u8>,
}

impl EncryptionKey {
    pub fn new(key_type: i32, key_value: Vec<u8>) -> Self {
        Self {
            key_type,
            key_value,
        }
    }

    pub fn key_type(&self) -> i32 {
        self.key_type
    }

    pub fn key_value(&self) -> &[u8] {
        &self.key_value
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key_type", &self.key_type)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

/// The encrypted-data envelope exchanged between peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub etype: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kvno: Option<i32>,
    #[serde(with = "hex_bytes")]
    pub cipher: Vec<u8>,
}

/// A checksum tagged with the checksum type that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub cksumtype: i32,
    #[serde(with = "hex_bytes")]
    pub checksum: Vec<u8>,
}

/// Output of an `encrypt_message` call.
///
/// `ciphertext` is the complete wire blob; `checksum` is a copy of the
/// integrity value that was framed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    pub ciphertext: Vec<u8>,
    pub checksum: Vec<u8>,
}

/// A set of keys for one principal, one per encryption type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keyset {
    keys: Vec<EncryptionKey>,
}

impl Keyset {
    pub fn new(keys: Vec<EncryptionKey>) -> Self {
        Self { keys }
    }

    pub fn push(&mut self, key: EncryptionKey) {
        self.keys.push(key);
    }

    /// Adds `key`, replacing any key of the same encryption type in place.
    pub fn insert(&mut self, key: EncryptionKey) {
        match self.keys.iter_mut().find(|k| k.key_type() == key.key_type()) {
            Some(slot) => *slot = key,
            None => self.keys.push(key),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncryptionKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the key for `etype`. An `etype` of zero matches the first key.
    pub fn get_encryption_key(&self, etype: i32) -> Result<&EncryptionKey, KrbError> {
        self.keys
            .iter()
            .find(|k| etype == 0 || k.key_type() == etype)
            .ok_or(KrbError::KeyNotFound(etype))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
