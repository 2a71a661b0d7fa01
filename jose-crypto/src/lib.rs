#![doc = include_str!("../README.md")]

pub mod error;
pub mod key;
pub mod passphrase;
pub mod pem;
pub mod signer;
pub mod thumbprint;

pub use error::Error;
pub use key::{
    EcCurve,
    KeyFamily,
    KeyMaterial,
    PrivateKeyMaterial,
    PublicKeyMaterial,
    RsaPrivateComponents,
    SymmetricKey,
    X25519SecretKey,
};
pub use passphrase::Passphrase;
pub use signer::{OpaqueKey, OpaqueSigner, SoftwareSigner};
