//! ECDSA signatures over the STARK curve.

use bytes::{Buf, BufMut};
use starksig_codec::{Error as CodecError, Felt, FixedSize, Read, Write, FELT_LENGTH};
use std::fmt::{Debug, Display};

const SIGNATURE_LENGTH: usize = 2 * FELT_LENGTH; // R || S

/// A signature `(r, s)`, encoded as `r || s` with each component little-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    r: Felt,
    s: Felt,
}

impl Signature {
    pub fn new(r: Felt, s: Felt) -> Self {
        Self { r, s }
    }

    /// Returns the little-endian encoding of `r`.
    pub fn r(&self) -> [u8; FELT_LENGTH] {
        self.r.encode()
    }

    /// Returns the little-endian encoding of `s`.
    pub fn s(&self) -> [u8; FELT_LENGTH] {
        self.s.encode()
    }

    /// Returns `(r, s)` as field elements.
    pub fn components(&self) -> (&Felt, &Felt) {
        (&self.r, &self.s)
    }
}

impl Write for Signature {
    fn write(&self, buf: &mut impl BufMut) {
        self.r.write(buf);
        self.s.write(buf);
    }
}

impl Read for Signature {
    fn read(buf: &mut impl Buf) -> Result<Self, CodecError> {
        let r = Felt::read(buf)?;
        let s = Felt::read(buf)?;
        Ok(Self { r, s })
    }
}

impl FixedSize for Signature {
    const SIZE: usize = SIGNATURE_LENGTH;
}

impl Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.r, self.s)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#066x}{:064x}", self.r, self.s)
    }
}
