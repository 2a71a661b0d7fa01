//! An [`OpaqueSigner`] backed by a private key in memory.

use log::trace;
use p256::ecdsa::signature::Signer;
use rsa::{sha2::Sha256, signature::SignatureEncoding};

use crate::{
    key::{PrivateKeyMaterial, PublicKeyMaterial},
    signer::{Error, OpaqueSigner},
};

/// Signs with a private key held in memory
///
/// Signatures use the algorithm inferred for the key family by default: ECDSA with the hash
/// function matching the curve (fixed size `r || s` encoding), Ed25519 or RSASSA-PKCS1-v1_5
/// with SHA-256.
/// X25519 keys expose their public key, but can not sign.
#[derive(Debug)]
pub struct SoftwareSigner {
    key: PrivateKeyMaterial,
}

impl SoftwareSigner {
    /// Creates a new [`SoftwareSigner`] for `key`.
    pub fn new(key: PrivateKeyMaterial) -> Self {
        Self { key }
    }
}

impl OpaqueSigner for SoftwareSigner {
    fn public(&self) -> Option<PublicKeyMaterial> {
        Some(self.key.public())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        trace!("Signing {} bytes with a {} key", message.len(), self.key.family());
        Ok(match &self.key {
            PrivateKeyMaterial::P256(secret) => {
                let key = p256::ecdsa::SigningKey::from_bytes(&secret.to_bytes())?;
                let signature: p256::ecdsa::Signature = key.try_sign(message)?;
                signature.to_bytes().to_vec()
            }
            PrivateKeyMaterial::P384(secret) => {
                let key = p384::ecdsa::SigningKey::from_bytes(&secret.to_bytes())?;
                let signature: p384::ecdsa::Signature = key.try_sign(message)?;
                signature.to_bytes().to_vec()
            }
            PrivateKeyMaterial::P521(secret) => {
                let key = p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())?;
                let signature: p521::ecdsa::Signature = key.try_sign(message)?;
                signature.to_bytes().to_vec()
            }
            PrivateKeyMaterial::Rsa(private) => {
                let key = rsa::pkcs1v15::SigningKey::<Sha256>::new(private.clone());
                key.try_sign(message)?.to_vec()
            }
            PrivateKeyMaterial::Ed25519(key) => key.try_sign(message)?.to_bytes().to_vec(),
            PrivateKeyMaterial::X25519(_) => {
                return Err(Error::UnsupportedSigningKey {
                    family: self.key.family(),
                });
            }
        })
    }
}
