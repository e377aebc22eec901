//! Elements of the STARK curve's prime field.
//!
//! A [Felt] is an unsigned integer in `[0, p)` where `p = 2^251 + 17 * 2^192 + 1`. Its canonical
//! external form is a 32-byte little-endian buffer. Decoding never reduces: any buffer whose
//! integer value is `>= p` is rejected with [Error::Overflow], and any buffer that is not exactly
//! 32 bytes long is rejected with [Error::InvalidLength].
//!
//! # Example
//! ```rust
//! use starksig_codec::{Decode, Error, Felt};
//!
//! // Encode and decode a small value
//! let five = Felt::from(5u64);
//! let encoded = five.encode();
//! assert_eq!(encoded[0], 5);
//! assert_eq!(Felt::decode(&encoded[..]).unwrap(), five);
//!
//! // The modulus itself is not a field element
//! let mut modulus = Felt::MAX.encode();
//! modulus[0] += 1;
//! assert_eq!(Felt::decode(&modulus[..]), Err(Error::Overflow));
//! ```

use crate::{EncodeFixed, Error, FixedSize, Read, Write};
use bytes::{Buf, BufMut};
use num_bigint::BigUint;
use num_traits::Num;
use std::fmt::{Debug, Display, LowerHex};

/// Length of an encoded [Felt].
pub const FELT_LENGTH: usize = 32;

/// Limbs of the field modulus `p`, most significant first.
const MODULUS: [u64; 4] = [0x0800_0000_0000_0011, 0, 0, 1];

/// An element of the STARK field.
///
/// Limbs are stored most significant first so the derived ordering is numeric.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt([u64; 4]);

impl Felt {
    /// The additive identity.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// The multiplicative identity.
    pub const ONE: Self = Self([0, 0, 0, 1]);

    /// The largest field element, `p - 1`.
    pub const MAX: Self = Self([MODULUS[0], MODULUS[1], MODULUS[2], MODULUS[3] - 1]);

    /// Returns the field modulus `p` (which is not itself a valid [Felt]).
    pub fn modulus() -> BigUint {
        limbs_to_biguint(&MODULUS)
    }

    /// Interprets 32 little-endian bytes as a field element.
    pub fn from_le_array(bytes: &[u8; FELT_LENGTH]) -> Result<Self, Error> {
        let mut limbs = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            limbs[3 - i] = u64::from_le_bytes(word);
        }
        if limbs >= MODULUS {
            return Err(Error::Overflow);
        }
        Ok(Self(limbs))
    }

    /// Interprets 32 big-endian bytes as a field element.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; FELT_LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidLength {
                expected: FELT_LENGTH,
                found: bytes.len(),
            })?;
        let mut le = bytes;
        le.reverse();
        Self::from_le_array(&le)
    }

    /// Returns the 32-byte little-endian encoding of the element.
    pub fn encode(&self) -> [u8; FELT_LENGTH] {
        self.encode_fixed()
    }

    /// Returns the 32-byte big-endian encoding of the element.
    pub fn to_be_bytes(&self) -> [u8; FELT_LENGTH] {
        let mut bytes = self.encode();
        bytes.reverse();
        bytes
    }

    /// Parses a base-10 string.
    pub fn from_dec_str(value: &str) -> Result<Self, Error> {
        let parsed = BigUint::from_str_radix(value, 10)
            .map_err(|err| Error::InvalidData("Felt", err.to_string()))?;
        Self::try_from(parsed)
    }

    /// Parses a hexadecimal string, with or without a `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, Error> {
        let trimmed = value.strip_prefix("0x").unwrap_or(value);
        let parsed = BigUint::from_str_radix(trimmed, 16)
            .map_err(|err| Error::InvalidData("Felt", err.to_string()))?;
        Self::try_from(parsed)
    }

    /// Returns the element as an arbitrary-precision integer.
    pub fn to_biguint(&self) -> BigUint {
        limbs_to_biguint(&self.0)
    }

    /// Returns true if the element is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

fn limbs_to_biguint(limbs: &[u64; 4]) -> BigUint {
    let digits: Vec<u32> = limbs
        .iter()
        .rev()
        .flat_map(|limb| [*limb as u32, (*limb >> 32) as u32])
        .collect();
    BigUint::new(digits)
}

impl Write for Felt {
    fn write(&self, buf: &mut impl BufMut) {
        for limb in self.0.iter().rev() {
            buf.put_u64_le(*limb);
        }
    }
}

impl Read for Felt {
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        let bytes = <[u8; FELT_LENGTH]>::read(buf)?;
        Self::from_le_array(&bytes)
    }
}

impl FixedSize for Felt {
    const SIZE: usize = FELT_LENGTH;
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self([0, 0, 0, value])
    }
}

impl TryFrom<BigUint> for Felt {
    type Error = Error;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl TryFrom<&BigUint> for Felt {
    type Error = Error;

    fn try_from(value: &BigUint) -> Result<Self, Self::Error> {
        let bytes = value.to_bytes_le();
        if bytes.len() > FELT_LENGTH {
            return Err(Error::Overflow);
        }
        let mut padded = [0u8; FELT_LENGTH];
        padded[..bytes.len()].copy_from_slice(&bytes);
        Self::from_le_array(&padded)
    }
}

impl From<Felt> for BigUint {
    fn from(value: Felt) -> Self {
        value.to_biguint()
    }
}

impl LowerHex for Felt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        LowerHex::fmt(&self.to_biguint(), f)
    }
}

impl Debug for Felt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self)
    }
}

impl Display for Felt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self)
    }
}
