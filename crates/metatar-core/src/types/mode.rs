//! Octal permission bits.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;

/// Permission bits of an entry, written as octal in metadata documents.
///
/// Documents may spell the mode as a string (`"0644"`, `"644"`, `"0o644"`)
/// or as a plain integer holding the numeric value. It is always written
/// back as a zero-prefixed octal string.
///
/// # Examples
///
/// ```
/// use metatar_core::Mode;
///
/// let mode: Mode = "0755".parse().unwrap();
/// assert_eq!(mode.bits(), 0o755);
/// assert_eq!(mode.to_string(), "0755");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode(u32);

impl Mode {
    /// Wraps raw permission bits.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw permission bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if no mode was given.
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Mode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl std::str::FromStr for Mode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix("0o").unwrap_or(s);
        if digits.is_empty() {
            return Ok(Self(0));
        }
        u32::from_str_radix(digits, 8).map(Self)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ModeVisitor;

        impl de::Visitor<'_> for ModeVisitor {
            type Value = Mode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an octal mode string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Mode, E> {
                v.parse()
                    .map_err(|_| E::custom(format!("invalid octal mode: {v}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Mode, E> {
                u32::try_from(v)
                    .map(Mode)
                    .map_err(|_| E::custom(format!("mode out of range: {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Mode, E> {
                u32::try_from(v)
                    .map(Mode)
                    .map_err(|_| E::custom(format!("mode out of range: {v}")))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Mode, E> {
                Ok(Mode(0))
            }
        }

        deserializer.deserialize_any(ModeVisitor)
    }
}
