//! Validation of keys and their identity.

use jose_crypto::KeyFamily;
use log::trace;

use crate::{
    algorithm::Algorithm,
    jwk::{self, JsonWebKey},
};

/// An error that may occur when validating a key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The algorithm is not known
    #[error("The algorithm {algorithm} is not recognized")]
    UnrecognizedAlgorithm {
        /// The name of the algorithm.
        algorithm: String,
    },

    /// The algorithm can not be used with the key
    #[error("The algorithm {algorithm} can not be used with {family} keys")]
    IncompatibleAlgorithm {
        /// The algorithm.
        algorithm: Algorithm,

        /// The family of the key.
        family: KeyFamily,
    },

    /// The declared key ID differs from the requested one
    #[error("The key ID {declared} does not match the requested key ID {requested}")]
    KeyIdMismatch {
        /// The key ID declared by the key.
        declared: String,

        /// The requested key ID.
        requested: String,
    },

    /// The declared key ID differs from the thumbprint of the key
    #[error("The key ID {kid} does not match the thumbprint {thumbprint} of the key")]
    ThumbprintMismatch {
        /// The key ID declared by the key.
        kid: String,

        /// The SHA-256 thumbprint of the key.
        thumbprint: String,
    },

    /// A symmetric key is used without an algorithm
    #[error("missing options, an algorithm is required for symmetric keys")]
    MissingAlgorithm,

    /// The thumbprint of the key can not be calculated
    #[error("Unable to calculate thumbprint: {0}")]
    Thumbprint(#[from] jwk::Error),
}

/// Checks that `algorithm` can be used with keys of `family`.
///
/// Keys with an unknown family (opaque signers without a public key) accept any recognized
/// algorithm.
///
/// # Errors
///
/// Returns an error if `algorithm` is not recognized or can not be used with `family`.
pub fn validate_algorithm(algorithm: &Algorithm, family: Option<KeyFamily>) -> Result<(), Error> {
    if !algorithm.is_recognized() {
        return Err(Error::UnrecognizedAlgorithm {
            algorithm: algorithm.to_string(),
        });
    }
    match family {
        Some(family) if !algorithm.is_compatible(family) => Err(Error::IncompatibleAlgorithm {
            algorithm: algorithm.clone(),
            family,
        }),
        _ => Ok(()),
    }
}

/// Validates the algorithm of `key`.
///
/// A key without an algorithm is valid, unless it is a symmetric key.
///
/// # Errors
///
/// Returns an error if
///
/// - the algorithm is not recognized or does not fit the key family,
/// - or `key` is a symmetric key without an algorithm.
///
/// # Examples
///
/// ```
/// use jose_crypto::{KeyMaterial, SymmetricKey};
/// use jose_keys::{Algorithm, JsonWebKey, validate_key};
///
/// let mut key = JsonWebKey::new(SymmetricKey::new(vec![1; 32]));
/// assert!(validate_key(&key).is_err());
///
/// key.algorithm = Some(Algorithm::Hs256);
/// assert!(validate_key(&key).is_ok());
///
/// key.algorithm = Some(Algorithm::Es256);
/// assert!(validate_key(&key).is_err());
/// ```
pub fn validate_key(key: &JsonWebKey) -> Result<(), Error> {
    match &key.algorithm {
        Some(algorithm) => validate_algorithm(algorithm, key.family()),
        None if key.key.is_symmetric() => Err(Error::MissingAlgorithm),
        None => Ok(()),
    }
}

/// Verifies the key ID of a private `key` against its SHA-256 thumbprint.
///
/// Public keys, symmetric keys and keys without key ID are not checked.
///
/// # Errors
///
/// Returns an error if the key ID of a private key differs from the base64url encoded SHA-256
/// thumbprint of the key.
pub fn validate_key_id(key: &JsonWebKey) -> Result<(), Error> {
    let Some(kid) = key.key_id.as_deref() else {
        return Ok(());
    };
    if !key.key.is_private() {
        return Ok(());
    }
    let thumbprint = key.thumbprint_sha256()?;
    trace!("Comparing key ID {kid} with thumbprint {thumbprint}");
    if thumbprint != kid {
        return Err(Error::ThumbprintMismatch {
            kid: kid.to_string(),
            thumbprint,
        });
    }
    Ok(())
}
