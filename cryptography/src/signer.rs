//! Stateful facade over an [Engine] that holds at most one key.
//!
//! A [Signer] starts without a key. Loading a secret enables every operation, loading only a
//! public key enables verification, and hashing never needs a key. Loading a new key replaces
//! the held one entirely (the previous secret is zeroized on drop) and a failed load leaves the
//! held key untouched.
//!
//! All inputs and outputs are 32-byte little-endian field element encodings.

use crate::{Engine, Error, PublicKey, Scalar, Signature};
use rand::{CryptoRng, RngCore};
use starksig_codec::{Decode, Felt, FELT_LENGTH};
use std::sync::Arc;
use tracing::debug;

/// Key held by a [Signer].
enum Key {
    None,
    Secret { secret: Scalar, public: PublicKey },
    Public(PublicKey),
}

/// Signs and verifies messages with a key held in memory.
///
/// There is no internal lock: operations that change the held key take `&mut self`, so
/// concurrent callers must serialize a load with the signatures that depend on it.
pub struct Signer<E: Engine> {
    engine: Arc<E>,
    key: Key,
}

impl<E: Engine> Signer<E> {
    /// Creates a [Signer] with no key loaded.
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            key: Key::None,
        }
    }

    /// Returns the engine backing this [Signer].
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Returns true if a secret key is loaded.
    pub fn has_secret_key(&self) -> bool {
        matches!(self.key, Key::Secret { .. })
    }

    /// Loads a secret key from its 32-byte little-endian encoding.
    pub fn load_secret_key(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let secret = Scalar::decode(bytes)?;
        self.install(secret);
        Ok(())
    }

    /// Generates a random secret key, loads it, and returns its encoding.
    pub fn generate_secret_key<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
    ) -> [u8; FELT_LENGTH] {
        let secret = Scalar::random(rng);
        let encoded = secret.encode();
        self.install(secret);
        encoded
    }

    fn install(&mut self, secret: Scalar) {
        let public = self.engine.derive_public_key(&secret);
        debug!(public_key = %public, "loaded secret key");
        self.key = Key::Secret { secret, public };
    }

    /// Loads only a public key, disabling signing until a secret key is loaded.
    ///
    /// Returns [Error::InvalidPublicKey] if the coordinates are not a point on the curve.
    pub fn load_public_key(&mut self, x: &[u8], y: &[u8]) -> Result<(), Error> {
        let x = Felt::decode(x)?;
        let y = Felt::decode(y)?;
        if !self.engine.is_on_curve(&x, &y) {
            return Err(Error::InvalidPublicKey);
        }
        let public = PublicKey::new(x, y);
        debug!(public_key = %public, "loaded public key");
        self.key = Key::Public(public);
        Ok(())
    }

    fn secret(&self) -> Result<&Scalar, Error> {
        match &self.key {
            Key::Secret { secret, .. } => Ok(secret),
            Key::None | Key::Public(_) => Err(Error::NoKeyLoaded),
        }
    }

    /// Returns the encoding of the held secret key.
    pub fn private_key(&self) -> Result<[u8; FELT_LENGTH], Error> {
        Ok(self.secret()?.encode())
    }

    /// Returns the held public key.
    pub fn public_key(&self) -> Result<PublicKey, Error> {
        match &self.key {
            Key::Secret { public, .. } | Key::Public(public) => Ok(*public),
            Key::None => Err(Error::NoKeyLoaded),
        }
    }

    /// Decodes every element of a message and hashes the sequence.
    fn hash<M: AsRef<[u8]>>(&self, message: &[M]) -> Result<Felt, Error> {
        let elements = message
            .iter()
            .map(|element| Felt::decode(element.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if elements.is_empty() {
            return Err(Error::EmptyMessage);
        }
        Ok(self.engine.hash_on_elements(&elements))
    }

    /// Hashes a non-empty sequence of field elements and returns the encoded hash.
    ///
    /// The first element that fails to decode is reported.
    pub fn hash_felts<M: AsRef<[u8]>>(&self, message: &[M]) -> Result<[u8; FELT_LENGTH], Error> {
        Ok(self.hash(message)?.encode())
    }

    fn sign_with(&self, secret: &Scalar, hash: &Felt) -> Result<Signature, Error> {
        let signature = self.engine.sign(secret, hash)?;
        debug!(%hash, "signed message");
        Ok(signature)
    }

    /// Signs the hash of a message with the held secret key.
    ///
    /// The key is checked before the message is decoded.
    pub fn sign<M: AsRef<[u8]>>(&self, message: &[M]) -> Result<Signature, Error> {
        let secret = self.secret()?;
        let hash = self.hash(message)?;
        self.sign_with(secret, &hash)
    }

    /// Signs a single pre-hashed field element with the held secret key.
    pub fn sign_hash(&self, hash: &[u8]) -> Result<Signature, Error> {
        let secret = self.secret()?;
        let hash = Felt::decode(hash)?;
        self.sign_with(secret, &hash)
    }

    /// Signs a message with a secret supplied by the caller, leaving the held key untouched.
    ///
    /// The result is identical to loading `secret` and calling [Signer::sign].
    pub fn sign_with_external_secret<M: AsRef<[u8]>>(
        &self,
        secret: &[u8],
        message: &[M],
    ) -> Result<Signature, Error> {
        let secret = Scalar::decode(secret)?;
        let hash = self.hash(message)?;
        self.sign_with(&secret, &hash)
    }

    /// Verifies a signature over a message against the held public key.
    pub fn verify<M: AsRef<[u8]>>(
        &self,
        message: &[M],
        signature: &Signature,
    ) -> Result<bool, Error> {
        let public = self.public_key()?;
        let hash = self.hash(message)?;
        Ok(self.engine.verify(&public, &hash, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stark;
    use num_bigint::BigUint;
    use rand::{rngs::StdRng, SeedableRng};
    use starksig_codec::Error as CodecError;

    fn signer() -> Signer<Stark> {
        Signer::new(Arc::new(Stark))
    }

    fn felt(value: u64) -> [u8; FELT_LENGTH] {
        Felt::from(value).encode()
    }

    fn message(values: &[u64]) -> Vec<[u8; FELT_LENGTH]> {
        values.iter().map(|value| felt(*value)).collect()
    }

    fn encode_biguint(value: &BigUint) -> [u8; FELT_LENGTH] {
        let mut bytes = [0u8; FELT_LENGTH];
        let le = value.to_bytes_le();
        bytes[..le.len()].copy_from_slice(&le);
        bytes
    }

    #[test]
    fn test_no_key_loaded() {
        let signer = signer();
        assert_eq!(signer.private_key(), Err(Error::NoKeyLoaded));
        assert_eq!(signer.public_key(), Err(Error::NoKeyLoaded));
        assert_eq!(signer.sign(&message(&[1])), Err(Error::NoKeyLoaded));
        assert_eq!(signer.sign_hash(&felt(1)), Err(Error::NoKeyLoaded));
        assert_eq!(
            signer.verify(&message(&[1]), &Signature::new(Felt::ONE, Felt::ONE)),
            Err(Error::NoKeyLoaded)
        );
        assert!(!signer.has_secret_key());
    }

    #[test]
    fn test_key_checked_before_message() {
        // A malformed message is not decoded when no key is loaded
        let signer = signer();
        assert_eq!(signer.sign(&[[0xffu8; 32]]), Err(Error::NoKeyLoaded));
    }

    #[test]
    fn test_load_secret_key() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();
        assert!(signer.has_secret_key());
        assert_eq!(signer.private_key().unwrap(), felt(5));

        let public_key = signer.public_key().unwrap();
        assert_eq!(public_key, Stark.derive_public_key(&Scalar::decode(&felt(5)).unwrap()));
        assert!(signer.sign(&message(&[1, 2, 3, 4, 5])).is_ok());
    }

    #[test]
    fn test_replace_secret_key() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();
        let first = signer.public_key().unwrap();
        signer.load_secret_key(&felt(6)).unwrap();
        assert_eq!(signer.private_key().unwrap(), felt(6));
        assert_ne!(signer.public_key().unwrap(), first);
    }

    #[test]
    fn test_failed_load_keeps_key() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();

        assert_eq!(signer.load_secret_key(&felt(0)), Err(Error::InvalidScalar));
        assert_eq!(
            signer.load_secret_key(&Scalar::order().encode()),
            Err(Error::InvalidScalar)
        );
        assert_eq!(
            signer.load_secret_key(&[0xff; 32]),
            Err(Error::Codec(CodecError::Overflow))
        );
        assert_eq!(
            signer.load_secret_key(&[1; 31]),
            Err(Error::Codec(CodecError::InvalidLength {
                expected: 32,
                found: 31
            }))
        );

        assert_eq!(signer.private_key().unwrap(), felt(5));
    }

    #[test]
    fn test_generate_secret_key() {
        let mut signer = signer();
        let mut rng = StdRng::seed_from_u64(0);
        let encoded = signer.generate_secret_key(&mut rng);
        assert_eq!(signer.private_key().unwrap(), encoded);

        let message = message(&[9, 8, 7]);
        let signature = signer.sign(&message).unwrap();
        assert!(signer.verify(&message, &signature).unwrap());
    }

    #[test]
    fn test_hash_felts() {
        let signer = signer();
        let hash = signer.hash_felts(&message(&[1, 2, 3, 4, 5])).unwrap();
        assert_eq!(
            Felt::decode(&hash[..]).unwrap(),
            Felt::from_hex("0x79c2de2c34baea4a6aa66288140b205e075dd05177c3e05222f48fb6808454a")
                .unwrap()
        );
    }

    #[test]
    fn test_hash_felts_empty() {
        let signer = signer();
        let empty: [[u8; FELT_LENGTH]; 0] = [];
        assert_eq!(signer.hash_felts(&empty), Err(Error::EmptyMessage));
    }

    #[test]
    fn test_hash_felts_reports_first_failure() {
        let signer = signer();
        let message: Vec<Vec<u8>> = vec![
            felt(1).to_vec(),
            vec![0u8; 33],
            vec![0xffu8; 32],
        ];
        assert_eq!(
            signer.hash_felts(&message),
            Err(Error::Codec(CodecError::InvalidLength {
                expected: 32,
                found: 33
            }))
        );
    }

    #[test]
    fn test_modulus_rejected() {
        let modulus = BigUint::parse_bytes(
            b"3618502788666131213697322783095070105623107215331596699973092056135872020485",
            10,
        )
        .unwrap();
        assert!(modulus >= Felt::modulus());
        let element = encode_biguint(&modulus);

        let mut signer = signer();
        assert_eq!(
            signer.hash_felts(&[felt(1), element]),
            Err(Error::Codec(CodecError::Overflow))
        );
        signer.load_secret_key(&felt(5)).unwrap();
        assert_eq!(
            signer.sign(&[element, felt(1)]),
            Err(Error::Codec(CodecError::Overflow))
        );

        // The exact modulus is rejected as well
        let exact = encode_biguint(&Felt::modulus());
        assert_eq!(
            signer.hash_felts(&[exact]),
            Err(Error::Codec(CodecError::Overflow))
        );
    }

    #[test]
    fn test_sign_deterministic() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();
        let message = message(&[1, 2, 3, 4, 5]);
        let signature_1 = signer.sign(&message).unwrap();
        let signature_2 = signer.sign(&message).unwrap();
        assert_eq!(signature_1, signature_2);
        assert_eq!(
            signature_1.r(),
            Felt::from_hex("0x7b47652aefb09a03b0edfc1aff087b0a293a09d4d6fe7b6d3b473639f020ff")
                .unwrap()
                .encode()
        );
        assert_eq!(
            signature_1.s(),
            Felt::from_hex("0xfacf0075c26544c57b91311e7d5642b708984be14e45b5ebc89b18e7f10874")
                .unwrap()
                .encode()
        );
    }

    #[test]
    fn test_sign_with_external_secret_equivalence() {
        let message = message(&[1, 2, 3, 4, 5]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let secret = Scalar::random(&mut rng).encode();
            let external = signer().sign_with_external_secret(&secret, &message).unwrap();

            let mut loaded = signer();
            loaded.load_secret_key(&secret).unwrap();
            assert_eq!(loaded.sign(&message).unwrap(), external);
        }
    }

    #[test]
    fn test_sign_with_external_secret_keeps_key() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();
        signer
            .sign_with_external_secret(&felt(6), &message(&[1]))
            .unwrap();
        assert_eq!(signer.private_key().unwrap(), felt(5));

        // Works without a held key and validates the supplied secret
        let fresh = self::signer();
        assert!(fresh.sign_with_external_secret(&felt(6), &message(&[1])).is_ok());
        assert_eq!(
            fresh.sign_with_external_secret(&felt(0), &message(&[1])),
            Err(Error::InvalidScalar)
        );
        assert_eq!(fresh.private_key(), Err(Error::NoKeyLoaded));
    }

    #[test]
    fn test_sign_hash() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();
        let message = message(&[1, 2, 3, 4, 5]);
        let hash = signer.hash_felts(&message).unwrap();
        assert_eq!(
            signer.sign_hash(&hash).unwrap(),
            signer.sign(&message).unwrap()
        );

        // Field elements at or above 2^251 are not signable hashes
        assert_eq!(
            signer.sign_hash(&Felt::MAX.encode()),
            Err(Error::MessageOutOfRange)
        );
    }

    #[test]
    fn test_public_only() {
        let mut source = signer();
        source.load_secret_key(&felt(5)).unwrap();
        let public_key = source.public_key().unwrap();
        let message = message(&[4, 2]);
        let signature = source.sign(&message).unwrap();

        let mut verifier = signer();
        verifier
            .load_public_key(&public_key.x(), &public_key.y())
            .unwrap();
        assert_eq!(verifier.public_key().unwrap(), public_key);
        assert!(verifier.verify(&message, &signature).unwrap());
        assert!(!verifier.verify(&[felt(4)], &signature).unwrap());
        assert!(!verifier.has_secret_key());
        assert_eq!(verifier.private_key(), Err(Error::NoKeyLoaded));
        assert_eq!(verifier.sign(&message), Err(Error::NoKeyLoaded));
    }

    #[test]
    fn test_load_public_key_off_curve() {
        let mut signer = signer();
        signer.load_secret_key(&felt(5)).unwrap();
        assert_eq!(
            signer.load_public_key(&felt(1), &felt(1)),
            Err(Error::InvalidPublicKey)
        );
        assert_eq!(
            signer.load_public_key(&felt(1), &[0u8; 16]),
            Err(Error::Codec(CodecError::InvalidLength {
                expected: 32,
                found: 16
            }))
        );
        assert!(signer.has_secret_key());
    }

    #[test]
    fn test_independent_signers() {
        let engine = Arc::new(Stark);
        let mut a = Signer::new(engine.clone());
        let mut b = Signer::new(engine);
        a.load_secret_key(&felt(5)).unwrap();
        b.load_secret_key(&felt(6)).unwrap();
        assert_eq!(a.private_key().unwrap(), felt(5));
        assert_eq!(b.private_key().unwrap(), felt(6));
    }
}
