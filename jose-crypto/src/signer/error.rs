//! Contains [`Error`] enum for the opaque signer interface.

use crate::key::KeyFamily;

/// An error that may occur when signing with an opaque signer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The key can not be used for signing
    #[error("A key of family {family} can not be used for signing")]
    UnsupportedSigningKey {
        /// The family of the key.
        family: KeyFamily,
    },

    /// The signer has no key to sign with
    #[error("The signer has no key")]
    MissingKey,

    /// A signing operation failed
    #[error("Signing failed: {0}")]
    Signature(#[from] ed25519_dalek::SignatureError),

    /// An RSA signing operation failed
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),

    /// A signer specific error occurred
    ///
    /// This is meant for implementations backed by hardware tokens or remote services.
    #[error("Signer error while {context}: {source}")]
    Backend {
        /// The context in which the error occurred.
        ///
        /// This is meant to complete the sentence "Signer error while ".
        context: String,
        /// The source error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
