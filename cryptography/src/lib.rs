//! Generate keys, hash field elements, and deterministically sign over the STARK curve.
//!
//! # Overview
//!
//! Curve arithmetic lives behind the [Engine] trait. [Stark] is the engine for the STARK curve
//! and [Signer] is the stateful facade callers use to manage a key and produce [Signature]s.
//! Every key, message element, and signature component crosses the facade boundary as a
//! 32-byte little-endian [starksig_codec::Felt] encoding.
//!
//! # Example
//! ```rust
//! use starksig_codec::Felt;
//! use starksig_cryptography::{Signer, Stark};
//! use std::sync::Arc;
//!
//! let mut signer = Signer::new(Arc::new(Stark));
//! signer.load_secret_key(&Felt::from(5u64).encode()).unwrap();
//!
//! let message = [Felt::from(1u64).encode(), Felt::from(2u64).encode()];
//! let signature = signer.sign(&message).unwrap();
//! assert!(signer.verify(&message, &signature).unwrap());
//! ```

use starksig_codec::Felt;

pub mod error;
pub use error::Error;
mod keys;
pub use keys::{PublicKey, Scalar};
mod signature;
pub use signature::Signature;
mod signer;
pub use signer::Signer;
pub mod stark;
pub use stark::Stark;

/// Elliptic-curve primitives consumed by [Signer].
pub trait Engine: Send + Sync + 'static {
    /// Computes the public point `secret * G`.
    fn derive_public_key(&self, secret: &Scalar) -> PublicKey;

    /// Returns true if `(x, y)` is a point on the curve.
    fn is_on_curve(&self, x: &Felt, y: &Felt) -> bool;

    /// Combines two field elements into one.
    fn pedersen(&self, a: &Felt, b: &Felt) -> Felt;

    /// Deterministically signs a message hash.
    ///
    /// Hashes outside the range accepted by the scheme are rejected with
    /// [Error::MessageOutOfRange].
    fn sign(&self, secret: &Scalar, hash: &Felt) -> Result<Signature, Error>;

    /// Returns true if `signature` is valid for `hash` under `public_key`.
    fn verify(&self, public_key: &PublicKey, hash: &Felt, signature: &Signature) -> bool;

    /// Hashes a sequence of field elements.
    ///
    /// The elements are folded left to right starting from zero and the length of the sequence
    /// is combined last: `pedersen(pedersen(pedersen(0, m[0]), m[1])..., len(m))`.
    fn hash_on_elements(&self, elements: &[Felt]) -> Felt {
        let folded = elements
            .iter()
            .fold(Felt::ZERO, |acc, element| self.pedersen(&acc, element));
        self.pedersen(&folded, &Felt::from(elements.len() as u64))
    }
}
