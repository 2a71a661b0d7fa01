use std::path::PathBuf;

use crate::{fetch, jwe, jwk, options, prompt, source, validate};

/// An error that may occur when resolving keys.
///
/// All variants that concern a specific source name it by its label (a path, a URL or `bytes`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The options are invalid
    #[error("Configuration error: {0}")]
    Configuration(#[from] options::Error),

    /// A key set can not be resolved without a key ID
    #[error("A key ID is required to select a key from {location}")]
    MissingKeyId {
        /// The label of the source.
        location: String,
    },

    /// The location of a source is invalid
    #[error("Invalid location: {0}")]
    Location(#[from] source::Error),

    /// The format of the data can not be determined
    #[error("Unable to resolve {location}: {reason}")]
    Classification {
        /// The label of the source.
        location: String,

        /// The reason for the failure.
        reason: String,
    },

    /// Decryption failed, because the password is wrong or the data has been modified
    #[error("Unable to decrypt {location}: the password is wrong or the data has been modified")]
    AuthenticationFailure {
        /// The label of the source.
        location: String,
    },

    /// No key with the requested key ID is found
    #[error("cannot find key with kid {kid} on {location}")]
    NotFound {
        /// The requested key ID.
        kid: String,

        /// The label of the source.
        location: String,
    },

    /// More than one key with the requested key ID is found
    #[error("multiple keys with kid {kid} have been found on {location}")]
    AmbiguousKey {
        /// The requested key ID.
        kid: String,

        /// The label of the source.
        location: String,
    },

    /// The key is not valid
    #[error("Invalid key from {location}: {reason}")]
    Validation {
        /// The label of the source.
        location: String,

        /// The reason for the failure.
        #[source]
        reason: validate::Error,
    },

    /// Reading a file failed
    #[error("Unable to read {}: {error}", path.display())]
    Io {
        /// The path of the file.
        path: PathBuf,

        /// The I/O error.
        #[source]
        error: std::io::Error,
    },

    /// Fetching a remote location failed
    #[error("Unable to fetch {url}: {error}")]
    Network {
        /// The URL of the remote location.
        url: String,

        /// The fetch error.
        #[source]
        error: fetch::Error,
    },

    /// A JSON Web Key is invalid
    #[error("Invalid JSON Web Key in {location}: {error}")]
    Jwk {
        /// The label of the source.
        location: String,

        /// The JSON Web Key error.
        #[source]
        error: jwk::Error,
    },

    /// A JSON Web Encryption container is invalid
    #[error("Invalid JSON Web Encryption in {location}: {error}")]
    Jwe {
        /// The label of the source.
        location: String,

        /// The JSON Web Encryption error.
        #[source]
        error: jwe::Error,
    },

    /// A PEM encoded key is invalid
    #[error("Invalid PEM key in {location}: {error}")]
    Pem {
        /// The label of the source.
        location: String,

        /// The PEM error.
        #[source]
        error: jose_crypto::pem::Error,
    },

    /// Acquiring a password failed
    #[error("Unable to get the password for {location}: {error}")]
    Prompt {
        /// The label of the source.
        location: String,

        /// The prompt error.
        #[source]
        error: prompt::Error,
    },
}

impl Error {
    /// Creates an [`Error`] for a [`jwe::Error`] of the data at `location`.
    ///
    /// Failed decryption is an [`Error::AuthenticationFailure`].
    pub(crate) fn jwe(location: &str, error: jwe::Error) -> Self {
        match error {
            jwe::Error::Decryption => Self::AuthenticationFailure {
                location: location.to_string(),
            },
            error => Self::Jwe {
                location: location.to_string(),
                error,
            },
        }
    }

    /// Creates an [`Error`] for a [`jose_crypto::pem::Error`] of the data at `location`.
    ///
    /// Failed decryption is an [`Error::AuthenticationFailure`].
    pub(crate) fn pem(location: &str, error: jose_crypto::pem::Error) -> Self {
        match error {
            jose_crypto::pem::Error::Decryption => Self::AuthenticationFailure {
                location: location.to_string(),
            },
            error => Self::Pem {
                location: location.to_string(),
                error,
            },
        }
    }

    /// Creates an [`Error::Jwk`] for the data at `location`.
    pub(crate) fn jwk(location: &str, error: jwk::Error) -> Self {
        Self::Jwk {
            location: location.to_string(),
            error,
        }
    }

    /// Creates an [`Error::Validation`] for the data at `location`.
    pub(crate) fn validation(location: &str, reason: validate::Error) -> Self {
        Self::Validation {
            location: location.to_string(),
            reason,
        }
    }

    /// Creates an [`Error::Classification`] for the data at `location`.
    pub(crate) fn classification(location: &str, reason: impl Into<String>) -> Self {
        Self::Classification {
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}
