use crate::error::KrbError;

/// RFC 3962 default iteration count, `"00001000"` on the wire.
pub const DEFAULT_ITERATIONS: u32 = 4096;

/// Parsed string-to-key parameters for the PBKDF2-based etypes.
///
/// The wire form is four big-endian octets, written here as eight hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S2kParams {
    iterations: u32,
}

impl Default for S2kParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl S2kParams {
    pub fn new(iterations: u32) -> Result<Self, KrbError> {
        let params = Self { iterations };
        params.validate()?;
        Ok(params)
    }

    /// Parses the hex parameter string. The empty string selects the default.
    pub fn parse(s: &str) -> Result<Self, KrbError> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        if s.len() != 8 {
            return Err(KrbError::InvalidParameter(format!(
                "expected 8 hex digits, got {} characters",
                s.len()
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| KrbError::InvalidParameter(format!("not a hex string: {e}")))?;
        let mut be = [0u8; 4];
        be.copy_from_slice(&bytes);
        Self::new(u32::from_be_bytes(be))
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn validate(&self) -> Result<(), KrbError> {
        if self.iterations == 0 {
            return Err(KrbError::InvalidParameter(
                "iteration count must be >= 1".into(),
            ));
        }
        Ok(())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.iterations.to_be_bytes())
    }
}
