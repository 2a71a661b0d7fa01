//! Error handling.

/// An error that may occur when working with key material.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error related to key material occurred.
    #[error("Key error: {0}")]
    Key(#[from] crate::key::Error),

    /// An error related to PEM decoding occurred.
    #[error("PEM error: {0}")]
    Pem(#[from] crate::pem::Error),

    /// An error related to signing occurred.
    #[error("Signer error: {0}")]
    Signer(#[from] crate::signer::Error),
}
