//! Callsign, suffix and repeater module tokens
//!
//! These three types gate every place a raw string could otherwise end up
//! on the wire with the wrong padding or an invalid character. Construction
//! through `new()`/`try_from` validates against the rules in the data
//! model; decoding straight off the wire (`from_wire_bytes`) is permissive,
//! since a misbehaving reflector or repeater is still something we want to
//! log and route rather than reject outright.

use crate::error::WireError;

const CALLSIGN_LEN: usize = 8;
const SUFFIX_LEN: usize = 4;

fn is_callsign_body_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b' '
}

/// A 4-8 character station callsign, space-padded to 8 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Callsign([u8; CALLSIGN_LEN]);

impl Callsign {
    pub const SIZE: usize = CALLSIGN_LEN;

    /// Validates and builds a callsign from a human-typed token.
    pub fn new(s: &str) -> Result<Self, WireError> {
        let upper = s.to_ascii_uppercase();
        let core = upper.as_bytes();

        if core.len() < 4 || core.len() > CALLSIGN_LEN {
            return Err(WireError::InvalidCallsign(format!(
                "\"{s}\" must be 4-8 characters"
            )));
        }
        let prefix = &core[..3];
        if !prefix.iter().all(|&c| c.is_ascii_alphanumeric()) {
            return Err(WireError::InvalidCallsign(format!(
                "\"{s}\" has a non-alphanumeric prefix"
            )));
        }
        if prefix.iter().all(|c| c.is_ascii_digit()) {
            return Err(WireError::InvalidCallsign(format!(
                "\"{s}\" prefix cannot be all digits"
            )));
        }
        if !core[3..].iter().all(|&c| is_callsign_body_char(c)) {
            return Err(WireError::InvalidCallsign(format!(
                "\"{s}\" contains a character outside A-Z0-9 and space"
            )));
        }

        let mut buf = [b' '; CALLSIGN_LEN];
        buf[..core.len()].copy_from_slice(core);
        Ok(Self(buf))
    }

    /// Wraps a raw 8-byte wire field without re-validating it.
    pub fn from_wire_bytes(bytes: [u8; CALLSIGN_LEN]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; CALLSIGN_LEN] {
        self.0
    }

    /// The callsign with trailing padding stripped.
    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.0).trim_end().to_string()
    }
}

impl std::fmt::Display for Callsign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl std::str::FromStr for Callsign {
    type Err = WireError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The up-to-4-character MY suffix, space-padded to 4 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Suffix([u8; SUFFIX_LEN]);

impl Suffix {
    pub const SIZE: usize = SUFFIX_LEN;

    pub fn new(s: &str) -> Result<Self, WireError> {
        let upper = s.to_ascii_uppercase();
        let core = upper.as_bytes();
        if core.len() > SUFFIX_LEN {
            return Err(WireError::InvalidCallsign(format!(
                "suffix \"{s}\" is longer than 4 characters"
            )));
        }
        if !core.iter().all(|&c| is_callsign_body_char(c)) {
            return Err(WireError::InvalidCallsign(format!(
                "suffix \"{s}\" contains a character outside A-Z0-9 and space"
            )));
        }
        let mut buf = [b' '; SUFFIX_LEN];
        buf[..core.len()].copy_from_slice(core);
        Ok(Self(buf))
    }

    pub fn from_wire_bytes(bytes: [u8; SUFFIX_LEN]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; SUFFIX_LEN] {
        self.0
    }

    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.0).trim_end().to_string()
    }
}

impl std::fmt::Display for Suffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A repeater module letter, or space for "no module".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Module(u8);

impl Module {
    /// "no module" — used as a wildcard or an unset disconnect target.
    pub const NONE: Module = Module(b' ');

    pub fn new(s: &str) -> Result<Self, WireError> {
        let upper = s.to_ascii_uppercase();
        let bytes = upper.as_bytes();
        if bytes.len() != 1 {
            return Err(WireError::InvalidCallsign(format!(
                "module \"{s}\" must be exactly one character"
            )));
        }
        let c = bytes[0];
        if !(c.is_ascii_alphabetic() || c == b' ') {
            return Err(WireError::InvalidCallsign(format!(
                "module \"{s}\" must be a letter or a space"
            )));
        }
        Ok(Self(c))
    }

    pub fn from_wire_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub fn to_byte(&self) -> u8 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == b' '
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0 as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callsign_pads_to_eight() {
        let c = Callsign::new("sv9oan").unwrap();
        assert_eq!(c.trimmed(), "SV9OAN");
        assert_eq!(c.to_string().len(), 8);
    }

    #[test]
    fn callsign_rejects_all_digit_prefix() {
        assert!(Callsign::new("123ABCD").is_err());
    }

    #[test]
    fn callsign_rejects_too_short() {
        assert!(Callsign::new("ABC").is_err());
    }

    #[test]
    fn callsign_rejects_bad_char() {
        assert!(Callsign::new("SV9O*N").is_err());
    }

    #[test]
    fn suffix_pads_to_four() {
        let s = Suffix::new("a").unwrap();
        assert_eq!(s.to_bytes(), *b"A   ");
    }

    #[test]
    fn module_none_is_space() {
        assert!(Module::NONE.is_none());
        assert_eq!(Module::new(" ").unwrap(), Module::NONE);
    }

    #[test]
    fn module_rejects_digit() {
        assert!(Module::new("1").is_err());
    }
}
