//! Core codec traits and implementations

use crate::error::Error;
use bytes::{Buf, BufMut};

/// Trait for types that can be written (encoded) to a buffer.
pub trait Write {
    /// Encodes this value by writing to a buffer.
    ///
    /// Implementations should panic if the buffer doesn't have enough capacity.
    fn write(&self, buf: &mut impl BufMut);
}

/// Trait for types that can be read (decoded) from a buffer.
pub trait Read: Sized {
    /// Reads a value from the buffer, consuming the necessary bytes.
    ///
    /// Returns an error if the buffer is too short or the bytes do not describe a valid value.
    fn read(buf: &mut impl Buf) -> Result<Self, Error>;
}

/// Trait for types with a known, fixed encoded length.
pub trait FixedSize {
    /// The length of the encoded value.
    const SIZE: usize;
}

/// Trait for types that can be encoded to a fixed-size byte array.
pub trait EncodeFixed: Write + FixedSize {
    /// Encodes a value to a fixed-size byte array.
    ///
    /// The caller MUST ensure `N` is equal to `Self::SIZE`.
    /// Panics if the `write` implementation does not write exactly `N` bytes.
    fn encode_fixed<const N: usize>(&self) -> [u8; N] {
        assert_eq!(
            N,
            Self::SIZE,
            "Can't encode {} bytes into {} bytes",
            Self::SIZE,
            N
        );

        let mut array = [0u8; N];
        let mut buf = &mut array[..];
        self.write(&mut buf);
        assert_eq!(buf.len(), 0);
        array
    }
}

// Automatically implement `EncodeFixed` for types that implement `Write` and `FixedSize`.
impl<T: Write + FixedSize> EncodeFixed for T {}

/// Trait for types that are decoded from a buffer holding exactly one encoded value.
pub trait Decode: Read + FixedSize {
    /// Decodes a value from a buffer, ensuring the buffer is exactly `Self::SIZE` bytes long.
    ///
    /// The length is checked before any byte is interpreted, so a buffer of the wrong length
    /// is always reported as [Error::InvalidLength] regardless of its contents.
    fn decode(mut buf: impl Buf) -> Result<Self, Error> {
        let found = buf.remaining();
        if found != Self::SIZE {
            return Err(Error::InvalidLength {
                expected: Self::SIZE,
                found,
            });
        }

        let result = Self::read(&mut buf)?;

        // Check that the buffer is fully consumed.
        let remaining = buf.remaining();
        if remaining > 0 {
            return Err(Error::ExtraData(remaining));
        }

        Ok(result)
    }
}

// Automatically implement `Decode` for fixed-size types that implement `Read`.
impl<T: Read + FixedSize> Decode for T {}

impl<const N: usize> Write for [u8; N] {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self[..]);
    }
}

impl<const N: usize> Read for [u8; N] {
    #[inline]
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        if buf.remaining() < N {
            return Err(Error::EndOfBuffer);
        }
        let mut dst = [0; N];
        buf.copy_to_slice(&mut dst);
        Ok(dst)
    }
}

impl<const N: usize> FixedSize for [u8; N] {
    const SIZE: usize = N;
}
