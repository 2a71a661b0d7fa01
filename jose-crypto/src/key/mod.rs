//! Cryptographic key material.

pub mod base;
pub mod error;
pub mod import;

pub use base::{
    EcCurve,
    KeyFamily,
    KeyMaterial,
    PrivateKeyMaterial,
    PublicKeyMaterial,
    RsaPrivateComponents,
    SymmetricKey,
    X25519SecretKey,
};
pub use error::Error;
