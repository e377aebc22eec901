//! Error types for key management and signing.

use starksig_codec::Error as CodecError;
use thiserror::Error;

/// Error type for [crate::Signer] and [crate::Engine] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("no secret key loaded")]
    NoKeyLoaded,
    #[error("secret key is outside the scalar range")]
    InvalidScalar,
    #[error("public key is not a point on the curve")]
    InvalidPublicKey,
    #[error("message is empty")]
    EmptyMessage,
    #[error("message hash is out of range")]
    MessageOutOfRange,
}
