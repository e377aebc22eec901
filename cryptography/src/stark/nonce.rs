//! Deterministic nonce generation as described in
//! [RFC 6979](https://datatracker.ietf.org/doc/html/rfc6979), Section 3.2.
//!
//! The group order has 252 bits, so each 256-bit HMAC-DRBG output is shifted right by 4 before it
//! is compared against the order. The message hash is used as the 32-byte big-endian nonce input
//! and a retry seed (if any) as minimal big-endian additional data.

use crate::Scalar;
use rfc6979::HmacDrbg;
use sha2::Sha256;
use starksig_codec::{Felt, FELT_LENGTH};
use zeroize::Zeroizing;

/// Bits dropped from each 256-bit candidate to match the 252-bit group order.
const SHIFT: u32 = 4;

/// Shifts a big-endian integer right by [SHIFT] bits.
fn shift_right(bytes: &mut [u8; FELT_LENGTH]) {
    for i in (0..FELT_LENGTH).rev() {
        let carry = if i > 0 { bytes[i - 1] << (8 - SHIFT) } else { 0 };
        bytes[i] = (bytes[i] >> SHIFT) | carry;
    }
}

/// Derives the signing nonce `k` in `[1, n)` for a secret and message hash.
///
/// `seed` selects a different nonce for the same inputs and is used when a candidate signature
/// has to be discarded.
pub(crate) fn generate_k(secret: &Scalar, hash: &Felt, seed: Option<u64>) -> Felt {
    let entropy = secret.to_be_bytes();
    let nonce = hash.to_be_bytes();
    let seed = seed.map(u64::to_be_bytes).unwrap_or_default();
    let start = seed.iter().position(|byte| *byte != 0).unwrap_or(seed.len());

    let mut drbg = HmacDrbg::<Sha256>::new(entropy.as_slice(), &nonce, &seed[start..]);
    loop {
        let mut bytes = Zeroizing::new([0u8; FELT_LENGTH]);
        drbg.fill_bytes(bytes.as_mut_slice());
        shift_right(&mut bytes);

        // Candidates at or above the field modulus are also above the order.
        let Ok(k) = Felt::from_be_bytes(bytes.as_slice()) else {
            continue;
        };
        if !k.is_zero() && k < *Scalar::order() {
            return k;
        }
    }
}
