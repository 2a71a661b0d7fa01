//! Traits and associated structures for the opaque signer interface.

use std::{fmt::Debug, sync::Arc};

use crate::{key::PublicKeyMaterial, signer::Error};

/// Represents a signing key, which does not expose its private key.
///
/// Implementations are typically backed by hardware tokens or key management services.
pub trait OpaqueSigner: Send + Sync {
    /// Returns the public key of the signer, if it is known.
    fn public(&self) -> Option<PublicKeyMaterial>;

    /// Signs `message`.
    ///
    /// The message is hashed by the signer using the hash function appropriate for its key.
    ///
    /// # Errors
    ///
    /// If the operation fails, the implementation should return an appropriate error.
    /// The [`Error::Backend`] variant is appropriate for forwarding implementation specific
    /// errors.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error>;
}

/// A shareable handle for an [`OpaqueSigner`]
///
/// Two handles are equal, if they refer to the same signer.
#[derive(Clone)]
pub struct OpaqueKey(Arc<dyn OpaqueSigner>);

impl OpaqueKey {
    /// Creates a new [`OpaqueKey`] from an [`OpaqueSigner`] implementation.
    pub fn new(signer: impl OpaqueSigner + 'static) -> Self {
        Self(Arc::new(signer))
    }

    /// Returns the public key of the signer, if it is known.
    pub fn public(&self) -> Option<PublicKeyMaterial> {
        self.0.public()
    }

    /// Signs `message` with the signer.
    ///
    /// # Errors
    ///
    /// Returns an error if the signer fails.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        self.0.sign(message)
    }
}

impl From<Arc<dyn OpaqueSigner>> for OpaqueKey {
    fn from(value: Arc<dyn OpaqueSigner>) -> Self {
        Self(value)
    }
}

impl PartialEq for OpaqueKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for OpaqueKey {}

impl Debug for OpaqueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpaqueKey")
            .field("public", &self.0.public())
            .finish()
    }
}
