//! STARK curve implementation of the [Engine] trait.
//!
//! The curve is `y^2 = x^3 + x + beta` over the STARK prime field. Point arithmetic, the Pedersen
//! hash and the ECDSA primitives come from `starknet-crypto` and `starknet-curve`. This module
//! converts between [Felt] and the crates' field elements, derives the signing nonce `k`
//! deterministically as specified in [RFC 6979](https://datatracker.ietf.org/doc/html/rfc6979)
//! (HMAC-SHA-256), and retries with a fresh seed when a nonce yields an unusable signature.
//!
//! # Example
//! ```rust
//! use starksig_codec::Felt;
//! use starksig_cryptography::{Engine, Scalar, Stark};
//!
//! let engine = Stark::default();
//! let secret = Scalar::from_felt(&Felt::from(5u64)).unwrap();
//! let public_key = engine.derive_public_key(&secret);
//!
//! let hash = engine.hash_on_elements(&[Felt::from(1u64), Felt::from(2u64)]);
//! let signature = engine.sign(&secret, &hash).unwrap();
//! assert!(engine.verify(&public_key, &hash, &signature));
//! ```

use crate::{Engine, Error, PublicKey, Scalar, Signature};
use starknet_crypto::{pedersen_hash, FieldElement};
use starknet_curve::{
    curve_params::{ALPHA, BETA, GENERATOR},
    AffinePoint, ProjectivePoint,
};
use starksig_codec::Felt;
use zeroize::Zeroizing;

mod ecdsa;
mod nonce;

fn to_field(felt: &Felt) -> FieldElement {
    FieldElement::from_bytes_be(&felt.to_be_bytes()).expect("felts are below the modulus")
}

fn from_field(element: &FieldElement) -> Felt {
    Felt::from_be_bytes(&element.to_bytes_be()).expect("field elements are below the modulus")
}

fn secret_field(secret: &Scalar) -> FieldElement {
    FieldElement::from_bytes_be(&secret.to_be_bytes()).expect("scalars are below the modulus")
}

fn on_curve(x: &Felt, y: &Felt) -> bool {
    let (x, y) = (to_field(x), to_field(y));
    y * y == x * x * x + ALPHA * x + BETA
}

/// STARK curve engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stark;

impl Engine for Stark {
    fn derive_public_key(&self, secret: &Scalar) -> PublicKey {
        let bits = Zeroizing::new(secret_field(secret).to_bits_le());
        let point = &ProjectivePoint::from_affine_point(&GENERATOR) * &bits[..];
        let point = AffinePoint::from(&point);
        PublicKey::new(from_field(&point.x), from_field(&point.y))
    }

    fn is_on_curve(&self, x: &Felt, y: &Felt) -> bool {
        on_curve(x, y)
    }

    fn pedersen(&self, a: &Felt, b: &Felt) -> Felt {
        from_field(&pedersen_hash(&to_field(a), &to_field(b)))
    }

    fn sign(&self, secret: &Scalar, hash: &Felt) -> Result<Signature, Error> {
        ecdsa::sign(secret, hash)
    }

    fn verify(&self, public_key: &PublicKey, hash: &Felt, signature: &Signature) -> bool {
        ecdsa::verify(public_key, hash, signature)
    }
}
