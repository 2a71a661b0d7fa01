//! Error handling

use crate::key::base::{EcCurve, KeyFamily};

/// An error that can occur when dealing with keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A PKCS#8 structure can not be decoded
    #[error("PKCS#8 error: {0}")]
    Pkcs8(#[from] pkcs8::Error),

    /// A SubjectPublicKeyInfo structure can not be decoded
    #[error("SubjectPublicKeyInfo error: {0}")]
    Spki(#[from] pkcs8::spki::Error),

    /// A DER structure can not be decoded
    #[error("DER error: {0}")]
    Der(#[from] pkcs8::der::Error),

    /// A PKCS#1 structure can not be decoded
    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// An RSA key is invalid
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),

    /// Elliptic curve key material is invalid
    #[error("Elliptic curve error: {0}")]
    EllipticCurve(#[from] p256::elliptic_curve::Error),

    /// An Ed25519 key is invalid
    #[error("Ed25519 error: {0}")]
    Ed25519(#[from] ed25519_dalek::SignatureError),

    /// The algorithm of a DER encoded key is not supported
    #[error("The key algorithm {oid} is not supported in {context}")]
    UnsupportedAlgorithm {
        /// The object identifier of the algorithm.
        oid: String,
        /// The context in which the algorithm is encountered.
        context: &'static str,
    },

    /// The named curve of an elliptic curve key is not supported
    #[error("The named curve {oid} is not supported")]
    UnsupportedCurve {
        /// The object identifier of the curve.
        oid: String,
    },

    /// The SEC1 encoded private key is not on any of the supported curves
    #[error("The SEC1 encoded private key is not on a supported curve")]
    UnknownSec1Curve,

    /// Raw key data has the wrong length
    #[error("{context} requires {expected} bytes, but {actual} are provided")]
    InvalidLength {
        /// The context in which the key data is used.
        context: &'static str,
        /// The required length.
        expected: usize,
        /// The provided length.
        actual: usize,
    },

    /// A coordinate does not have the size of the curve's field
    #[error("The coordinates of a {curve} key must be {expected} bytes long")]
    InvalidCoordinate {
        /// The curve of the key.
        curve: EcCurve,
        /// The required size of a coordinate.
        expected: usize,
    },

    /// The private component does not belong to the provided public component
    #[error("The private component of the {family} key does not match its public component")]
    PublicComponentMismatch {
        /// The family of the key.
        family: KeyFamily,
    },

    /// A key has no public component
    #[error("The key has no public component")]
    NoPublicKey,
}
