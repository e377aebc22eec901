//! Secret scalars and public points.

use crate::Error;
use bytes::{Buf, BufMut};
use rand::{CryptoRng, RngCore};
use starksig_codec::{Decode, Error as CodecError, Felt, FixedSize, Read, Write, FELT_LENGTH};
use std::{
    fmt::{Debug, Display},
    sync::OnceLock,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Order of the curve's generator (the upper bound of the scalar range).
const ORDER: &str = "0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f";

const PUBLIC_KEY_LENGTH: usize = 2 * FELT_LENGTH; // X || Y

/// Constant-time equality comparison for byte slices.
#[inline]
fn ct_eq_bytes(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// A secret key: a field element in `[1, n)` where `n` is the order of the generator.
///
/// The little-endian bytes are zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Scalar([u8; FELT_LENGTH]);

impl Scalar {
    /// Returns the order of the generator, `n` (a field element since `n < p`).
    pub fn order() -> &'static Felt {
        static ORDER_VALUE: OnceLock<Felt> = OnceLock::new();
        ORDER_VALUE.get_or_init(|| Felt::from_hex(ORDER).expect("invalid curve order"))
    }

    /// Accepts a field element if it lies in the scalar range.
    pub fn from_felt(felt: &Felt) -> Result<Self, Error> {
        if felt.is_zero() || felt >= Self::order() {
            return Err(Error::InvalidScalar);
        }
        Ok(Self(felt.encode()))
    }

    /// Decodes a 32-byte little-endian secret, rejecting malformed or out-of-range values.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let felt = Felt::decode(bytes)?;
        Self::from_felt(&felt)
    }

    /// Samples a uniformly random scalar.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = Zeroizing::new([0u8; FELT_LENGTH]);
        loop {
            rng.fill_bytes(&mut bytes[..]);

            // Keep 252 bits so roughly half of all candidates are accepted.
            bytes[FELT_LENGTH - 1] &= 0x0f;
            let Ok(felt) = Felt::decode(&bytes[..]) else {
                continue;
            };
            if let Ok(scalar) = Self::from_felt(&felt) {
                return scalar;
            }
        }
    }

    /// Returns the 32-byte little-endian encoding of the secret.
    pub fn encode(&self) -> [u8; FELT_LENGTH] {
        self.0
    }

    /// Returns the 32-byte big-endian encoding of the secret.
    pub fn to_be_bytes(&self) -> Zeroizing<[u8; FELT_LENGTH]> {
        let mut bytes = Zeroizing::new(self.0);
        bytes.reverse();
        bytes
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        ct_eq_bytes(&self.0, &other.0)
    }
}

impl Eq for Scalar {}

impl Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// A public key: the affine coordinates of `secret * G`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    x: Felt,
    y: Felt,
}

impl PublicKey {
    /// Creates a [PublicKey] from its coordinates.
    ///
    /// No curve membership check is performed here. Use [crate::Engine::is_on_curve] before
    /// trusting externally supplied coordinates.
    pub fn new(x: Felt, y: Felt) -> Self {
        Self { x, y }
    }

    /// Returns the little-endian encoding of the x coordinate.
    pub fn x(&self) -> [u8; FELT_LENGTH] {
        self.x.encode()
    }

    /// Returns the little-endian encoding of the y coordinate.
    pub fn y(&self) -> [u8; FELT_LENGTH] {
        self.y.encode()
    }

    /// Returns both coordinates as field elements.
    pub fn coordinates(&self) -> (&Felt, &Felt) {
        (&self.x, &self.y)
    }
}

impl Write for PublicKey {
    fn write(&self, buf: &mut impl BufMut) {
        self.x.write(buf);
        self.y.write(buf);
    }
}

impl Read for PublicKey {
    fn read(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let x = Felt::read(buf)?;
        let y = Felt::read(buf)?;
        Ok(Self { x, y })
    }
}

impl FixedSize for PublicKey {
    const SIZE: usize = PUBLIC_KEY_LENGTH;
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.x)
    }
}
