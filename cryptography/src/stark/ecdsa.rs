//! StarkEx ECDSA signing and verification.
//!
//! Verification checks the public key against the curve and then compares `r` against the
//! x-coordinate of the recovered point. Like StarkEx, it only depends on the public key's
//! x-coordinate, so a signature valid for `(x, y)` is also valid for `(x, -y)`.

use super::{from_field, nonce::generate_k, on_curve, secret_field, to_field};
use crate::{Error, PublicKey, Scalar, Signature};
use starknet_crypto::SignError;
use starksig_codec::Felt;
use tracing::trace;

pub fn sign(secret: &Scalar, hash: &Felt) -> Result<Signature, Error> {
    let private_key = secret_field(secret);
    let message = to_field(hash);

    let mut seed = None;
    loop {
        let k = to_field(&generate_k(secret, hash, seed));
        match starknet_crypto::sign(&private_key, &message, &k) {
            Ok(signature) => {
                return Ok(Signature::new(
                    from_field(&signature.r),
                    from_field(&signature.s),
                ))
            }
            Err(SignError::InvalidMessageHash) => return Err(Error::MessageOutOfRange),
            Err(SignError::InvalidK) => {
                // Fails with negligible probability, retried with a new seed.
                trace!(?seed, "discarded nonce");
                seed = Some(seed.map_or(1, |seed| seed + 1));
            }
        }
    }
}

pub fn verify(public_key: &PublicKey, hash: &Felt, signature: &Signature) -> bool {
    let (x, y) = public_key.coordinates();
    if !on_curve(x, y) {
        return false;
    }
    let (r, s) = signature.components();
    if s >= Scalar::order() {
        return false;
    }
    starknet_crypto::verify(&to_field(x), &to_field(hash), &to_field(r), &to_field(s))
        .unwrap_or(false)
}
