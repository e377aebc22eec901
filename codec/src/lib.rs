//! Encode and validate field elements of the STARK curve.
//!
//! # Overview
//!
//! Every value that crosses into the signing engine (keys, message elements, signature
//! components) is a field element of the STARK prime field. This crate provides:
//! - [Felt]: a validated field element with a fixed 32-byte little-endian encoding
//! - [Read], [Write], [FixedSize]: traits for fixed-size binary encodings
//! - [Decode], [EncodeFixed]: provided methods that enforce exact lengths
//!
//! Decoding is strict. A buffer of the wrong length fails with [Error::InvalidLength] and a
//! value that is not below the field modulus fails with [Error::Overflow]. Nothing is ever
//! silently truncated or reduced.

pub mod codec;
pub use codec::{Decode, EncodeFixed, FixedSize, Read, Write};
pub mod error;
pub use error::Error;
pub mod felt;
pub use felt::{Felt, FELT_LENGTH};
