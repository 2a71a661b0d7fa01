//! Decoding of PEM encoded keys.
//!
//! The label of a PEM block selects the structure of the DER encoded key it contains:
//!
//! | Label                   | Structure                                  |
//! |-------------------------|--------------------------------------------|
//! | `PRIVATE KEY`           | PKCS#8 (EC, RSA, Ed25519, X25519)          |
//! | `ENCRYPTED PRIVATE KEY` | encrypted PKCS#8, requires a passphrase    |
//! | `PUBLIC KEY`            | SubjectPublicKeyInfo (all key families)    |
//! | `EC PRIVATE KEY`        | SEC1 (P-256, P-384, P-521)                 |
//! | `RSA PRIVATE KEY`       | PKCS#1 private key                         |
//! | `RSA PUBLIC KEY`        | PKCS#1 public key                          |
//!
//! Blocks protected with the legacy OpenSSL `Proc-Type: 4,ENCRYPTED` header are not supported.

use log::debug;
use pkcs8::EncryptedPrivateKeyInfo;

use crate::{
    key::{
        self,
        KeyMaterial,
        import::{
            private_key_from_pkcs8_der,
            private_key_from_sec1_der,
            public_key_from_spki_der,
            rsa_private_key_from_pkcs1_der,
            rsa_public_key_from_pkcs1_der,
        },
    },
    passphrase::Passphrase,
};

/// The label of PKCS#8 private keys.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
/// The label of encrypted PKCS#8 private keys.
pub const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
/// The label of SubjectPublicKeyInfo public keys.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
/// The label of SEC1 elliptic curve private keys.
pub const EC_PRIVATE_KEY_LABEL: &str = "EC PRIVATE KEY";
/// The label of PKCS#1 RSA private keys.
pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
/// The label of PKCS#1 RSA public keys.
pub const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

/// The encapsulation boundary starting a PEM block.
const PEM_BEGIN: &[u8] = b"-----BEGIN ";

/// An error that may occur when decoding PEM encoded keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The PEM framing is invalid
    #[error("PEM error: {0}")]
    Pem(#[from] ::pem::PemError),

    /// The label of the PEM block is not supported
    #[error("The PEM label {label} is not supported")]
    UnsupportedLabel {
        /// The label of the PEM block.
        label: String,
    },

    /// The PEM block uses the legacy OpenSSL encryption
    #[error("PEM blocks encrypted using a Proc-Type header are not supported")]
    LegacyEncryption,

    /// The PEM block is encrypted, but no passphrase is provided
    #[error("The PEM block with label {label} is encrypted and requires a passphrase")]
    PassphraseRequired {
        /// The label of the PEM block.
        label: String,
    },

    /// The encrypted private key can not be decrypted with the passphrase
    #[error("The private key can not be decrypted, the passphrase is wrong or the data is corrupt")]
    Decryption,

    /// The key in the PEM block is invalid
    #[error("Key error: {0}")]
    Key(#[from] key::Error),
}

/// Returns whether `data` starts with a PEM encapsulation boundary.
///
/// Leading whitespace is ignored.
pub fn is_pem(data: &[u8]) -> bool {
    data.trim_ascii_start().starts_with(PEM_BEGIN)
}

/// Returns whether decoding the PEM block in `data` requires a passphrase.
///
/// Returns `false` if `data` is not a PEM block, and for blocks using the legacy OpenSSL
/// encryption, which [`decode_pem`] rejects regardless of the passphrase.
pub fn is_encrypted(data: &[u8]) -> bool {
    match ::pem::parse(data) {
        Ok(block) => {
            block.tag() == ENCRYPTED_PRIVATE_KEY_LABEL && !has_legacy_encryption(&block)
        }
        Err(_) => false,
    }
}

/// Returns whether `block` uses the legacy OpenSSL encryption headers.
fn has_legacy_encryption(block: &::pem::Pem) -> bool {
    block
        .headers()
        .get("Proc-Type")
        .is_some_and(|value| value.contains("ENCRYPTED"))
}

/// Decodes the first PEM block in `data` to [`KeyMaterial`].
///
/// A `passphrase` is only required for blocks labeled `ENCRYPTED PRIVATE KEY` and is ignored
/// otherwise.
///
/// # Errors
///
/// Returns an error if
///
/// - `data` is not PEM encoded,
/// - the label is not supported,
/// - the block uses the legacy OpenSSL encryption,
/// - the block is encrypted but no `passphrase` is provided,
/// - the block can not be decrypted using `passphrase` ([`Error::Decryption`]),
/// - or the contained key is invalid.
///
/// # Examples
///
/// ```
/// use jose_crypto::{KeyFamily, passphrase::Passphrase, pem::decode_pem};
///
/// # fn main() -> testresult::TestResult {
/// let data = include_bytes!("../tests/fixtures/ed25519.enc.pem");
/// let key = decode_pem(data, Some(&Passphrase::from("mypassword")))?;
/// assert_eq!(key.family(), Some(KeyFamily::Ed25519));
/// assert!(decode_pem(data, Some(&Passphrase::from("wrong"))).is_err());
/// # Ok(())
/// # }
/// ```
pub fn decode_pem(data: &[u8], passphrase: Option<&Passphrase>) -> Result<KeyMaterial, Error> {
    let block = ::pem::parse(data)?;
    let label = block.tag();
    debug!("Decoding PEM block with label {label}");

    if has_legacy_encryption(&block) {
        return Err(Error::LegacyEncryption);
    }

    let der = block.contents();
    Ok(match label {
        PRIVATE_KEY_LABEL => KeyMaterial::Private(private_key_from_pkcs8_der(der)?),
        ENCRYPTED_PRIVATE_KEY_LABEL => {
            let Some(passphrase) = passphrase else {
                return Err(Error::PassphraseRequired {
                    label: label.to_string(),
                });
            };
            let info = EncryptedPrivateKeyInfo::try_from(der).map_err(key::Error::from)?;
            let document = info
                .decrypt(passphrase.expose_borrowed())
                .map_err(|_| Error::Decryption)?;
            // garbage produced by a wrong passphrase may pass the padding check
            KeyMaterial::Private(
                private_key_from_pkcs8_der(document.as_bytes()).map_err(|_| Error::Decryption)?,
            )
        }
        PUBLIC_KEY_LABEL => KeyMaterial::Public(public_key_from_spki_der(der)?),
        EC_PRIVATE_KEY_LABEL => KeyMaterial::Private(private_key_from_sec1_der(der)?),
        RSA_PRIVATE_KEY_LABEL => KeyMaterial::Private(rsa_private_key_from_pkcs1_der(der)?),
        RSA_PUBLIC_KEY_LABEL => KeyMaterial::Public(rsa_public_key_from_pkcs1_der(der)?),
        _ => {
            return Err(Error::UnsupportedLabel {
                label: label.to_string(),
            });
        }
    })
}
