//! Signers, that do not expose their private key.

pub mod error;
pub mod software;
pub mod traits;

pub use error::Error;
pub use software::SoftwareSigner;
pub use traits::{OpaqueKey, OpaqueSigner};
