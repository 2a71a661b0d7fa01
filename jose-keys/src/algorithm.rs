//! JSON Web Algorithms and their inference from key material.

use std::fmt::Display;

use jose_crypto::{EcCurve, KeyFamily, KeyMaterial};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// A JSON Web Algorithm ("alg") of a key
///
/// Algorithm names that are not known are kept verbatim in [`Algorithm::Unrecognized`], so that
/// records can be round-tripped and trusted overrides can carry arbitrary names.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Algorithm {
    /// HMAC using SHA-256
    Hs256,
    /// HMAC using SHA-384
    Hs384,
    /// HMAC using SHA-512
    Hs512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,
    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
    Ps256,
    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
    Ps384,
    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
    Ps512,
    /// ECDSA using P-256 and SHA-256
    Es256,
    /// ECDSA using P-384 and SHA-384
    Es384,
    /// ECDSA using P-521 and SHA-512
    Es512,
    /// EdDSA using Ed25519
    EdDsa,
    /// XEdDSA using X25519
    XEdDsa,
    /// Direct use of a shared symmetric key
    Direct,
    /// AES key wrap with a 128 bit key
    A128Kw,
    /// AES key wrap with a 192 bit key
    A192Kw,
    /// AES key wrap with a 256 bit key
    A256Kw,
    /// AES-GCM key wrap with a 128 bit key
    A128GcmKw,
    /// AES-GCM key wrap with a 192 bit key
    A192GcmKw,
    /// AES-GCM key wrap with a 256 bit key
    A256GcmKw,
    /// RSAES-PKCS1-v1_5
    Rsa1_5,
    /// RSAES OAEP using default parameters
    RsaOaep,
    /// RSAES OAEP using SHA-256 and MGF1 with SHA-256
    RsaOaep256,
    /// Elliptic curve Diffie-Hellman ephemeral static key agreement
    EcdhEs,
    /// ECDH-ES using Concat KDF and AES key wrap with a 128 bit key
    EcdhEsA128Kw,
    /// ECDH-ES using Concat KDF and AES key wrap with a 192 bit key
    EcdhEsA192Kw,
    /// ECDH-ES using Concat KDF and AES key wrap with a 256 bit key
    EcdhEsA256Kw,
    /// PBES2 with HMAC SHA-256 and AES key wrap with a 128 bit key
    Pbes2Hs256A128Kw,
    /// PBES2 with HMAC SHA-384 and AES key wrap with a 192 bit key
    Pbes2Hs384A192Kw,
    /// PBES2 with HMAC SHA-512 and AES key wrap with a 256 bit key
    Pbes2Hs512A256Kw,
    /// An algorithm name that is not known
    Unrecognized(String),
}

impl Algorithm {
    /// Returns the registered name of the algorithm.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
            Self::EdDsa => "EdDSA",
            Self::XEdDsa => "XEdDSA",
            Self::Direct => "dir",
            Self::A128Kw => "A128KW",
            Self::A192Kw => "A192KW",
            Self::A256Kw => "A256KW",
            Self::A128GcmKw => "A128GCMKW",
            Self::A192GcmKw => "A192GCMKW",
            Self::A256GcmKw => "A256GCMKW",
            Self::Rsa1_5 => "RSA1_5",
            Self::RsaOaep => "RSA-OAEP",
            Self::RsaOaep256 => "RSA-OAEP-256",
            Self::EcdhEs => "ECDH-ES",
            Self::EcdhEsA128Kw => "ECDH-ES+A128KW",
            Self::EcdhEsA192Kw => "ECDH-ES+A192KW",
            Self::EcdhEsA256Kw => "ECDH-ES+A256KW",
            Self::Pbes2Hs256A128Kw => "PBES2-HS256+A128KW",
            Self::Pbes2Hs384A192Kw => "PBES2-HS384+A192KW",
            Self::Pbes2Hs512A256Kw => "PBES2-HS512+A256KW",
            Self::Unrecognized(name) => name,
        }
    }

    /// Returns whether the algorithm is a registered one.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Returns whether the algorithm operates on symmetric secrets.
    pub fn is_symmetric(&self) -> bool {
        self.is_compatible(KeyFamily::Symmetric)
    }

    /// Returns whether the algorithm can be used with keys of `family`.
    ///
    /// Unrecognized algorithms are not compatible with any family.
    ///
    /// # Examples
    ///
    /// ```
    /// use jose_crypto::{EcCurve, KeyFamily};
    /// use jose_keys::Algorithm;
    ///
    /// assert!(Algorithm::Es384.is_compatible(KeyFamily::Ec(EcCurve::P384)));
    /// assert!(!Algorithm::Es384.is_compatible(KeyFamily::Ec(EcCurve::P256)));
    /// assert!(Algorithm::EcdhEs.is_compatible(KeyFamily::X25519));
    /// assert!(!Algorithm::from("FOOBAR").is_compatible(KeyFamily::Symmetric));
    /// ```
    pub fn is_compatible(&self, family: KeyFamily) -> bool {
        match self {
            Self::Hs256
            | Self::Hs384
            | Self::Hs512
            | Self::Direct
            | Self::A128Kw
            | Self::A192Kw
            | Self::A256Kw
            | Self::A128GcmKw
            | Self::A192GcmKw
            | Self::A256GcmKw
            | Self::Pbes2Hs256A128Kw
            | Self::Pbes2Hs384A192Kw
            | Self::Pbes2Hs512A256Kw => family == KeyFamily::Symmetric,
            Self::Rs256
            | Self::Rs384
            | Self::Rs512
            | Self::Ps256
            | Self::Ps384
            | Self::Ps512
            | Self::Rsa1_5
            | Self::RsaOaep
            | Self::RsaOaep256 => family == KeyFamily::Rsa,
            Self::Es256 => family == KeyFamily::Ec(EcCurve::P256),
            Self::Es384 => family == KeyFamily::Ec(EcCurve::P384),
            Self::Es512 => family == KeyFamily::Ec(EcCurve::P521),
            Self::EcdhEs | Self::EcdhEsA128Kw | Self::EcdhEsA192Kw | Self::EcdhEsA256Kw => {
                matches!(family, KeyFamily::Ec(_) | KeyFamily::X25519)
            }
            Self::EdDsa => family == KeyFamily::Ed25519,
            Self::XEdDsa => family == KeyFamily::X25519,
            Self::Unrecognized(_) => false,
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Algorithm {
    fn from(value: &str) -> Self {
        match value {
            "HS256" => Self::Hs256,
            "HS384" => Self::Hs384,
            "HS512" => Self::Hs512,
            "RS256" => Self::Rs256,
            "RS384" => Self::Rs384,
            "RS512" => Self::Rs512,
            "PS256" => Self::Ps256,
            "PS384" => Self::Ps384,
            "PS512" => Self::Ps512,
            "ES256" => Self::Es256,
            "ES384" => Self::Es384,
            "ES512" => Self::Es512,
            "EdDSA" => Self::EdDsa,
            "XEdDSA" => Self::XEdDsa,
            "dir" => Self::Direct,
            "A128KW" => Self::A128Kw,
            "A192KW" => Self::A192Kw,
            "A256KW" => Self::A256Kw,
            "A128GCMKW" => Self::A128GcmKw,
            "A192GCMKW" => Self::A192GcmKw,
            "A256GCMKW" => Self::A256GcmKw,
            "RSA1_5" => Self::Rsa1_5,
            "RSA-OAEP" => Self::RsaOaep,
            "RSA-OAEP-256" => Self::RsaOaep256,
            "ECDH-ES" => Self::EcdhEs,
            "ECDH-ES+A128KW" => Self::EcdhEsA128Kw,
            "ECDH-ES+A192KW" => Self::EcdhEsA192Kw,
            "ECDH-ES+A256KW" => Self::EcdhEsA256Kw,
            "PBES2-HS256+A128KW" => Self::Pbes2Hs256A128Kw,
            "PBES2-HS384+A192KW" => Self::Pbes2Hs384A192Kw,
            "PBES2-HS512+A256KW" => Self::Pbes2Hs512A256Kw,
            _ => Self::Unrecognized(value.to_string()),
        }
    }
}

impl From<String> for Algorithm {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Unrecognized(name) => name,
            algorithm => algorithm.as_str().to_string(),
        }
    }
}

/// The intended use of a key ("use")
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    strum::Display,
    EnumString,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyUse {
    /// The key is used for signatures
    Sig,
    /// The key is used for encryption
    Enc,
}

/// Infers the algorithm of `key` from its family and the intended `key_use`.
///
/// | Family     | no use or "sig" | "enc"          |
/// |------------|-----------------|----------------|
/// | oct        | `HS256`         | `A256GCMKW`    |
/// | EC P-256   | `ES256`         | `ECDH-ES`      |
/// | EC P-384   | `ES384`         | `ECDH-ES`      |
/// | EC P-521   | `ES512`         | `ECDH-ES`      |
/// | RSA        | `RS256`         | `RSA-OAEP-256` |
/// | Ed25519    | `EdDSA`         | `EdDSA`        |
/// | X25519     | `XEdDSA`        | `XEdDSA`       |
///
/// Public and private keys infer identically and an opaque signer infers from its public key.
/// Returns [`None`] for an opaque signer without a public key.
///
/// # Examples
///
/// ```
/// use jose_crypto::{KeyMaterial, SymmetricKey};
/// use jose_keys::{Algorithm, KeyUse, infer_algorithm};
///
/// let key = KeyMaterial::Symmetric(SymmetricKey::new(b"secret".to_vec()));
/// assert_eq!(infer_algorithm(&key, None), Some(Algorithm::Hs256));
/// assert_eq!(infer_algorithm(&key, Some(KeyUse::Enc)), Some(Algorithm::A256GcmKw));
/// ```
pub fn infer_algorithm(key: &KeyMaterial, key_use: Option<KeyUse>) -> Option<Algorithm> {
    let encryption = key_use == Some(KeyUse::Enc);
    Some(match key.family()? {
        KeyFamily::Symmetric if encryption => Algorithm::A256GcmKw,
        KeyFamily::Symmetric => Algorithm::Hs256,
        KeyFamily::Ec(_) if encryption => Algorithm::EcdhEs,
        KeyFamily::Ec(EcCurve::P256) => Algorithm::Es256,
        KeyFamily::Ec(EcCurve::P384) => Algorithm::Es384,
        KeyFamily::Ec(EcCurve::P521) => Algorithm::Es512,
        KeyFamily::Rsa if encryption => Algorithm::RsaOaep256,
        KeyFamily::Rsa => Algorithm::Rs256,
        KeyFamily::Ed25519 => Algorithm::EdDsa,
        KeyFamily::X25519 => Algorithm::XEdDsa,
    })
}

/// Returns the signature algorithm used with `key`.
///
/// Returns [`None`] if the algorithm is unknown, which is the case for opaque signers that do
/// not expose a public key.
pub fn signature_algorithm(key: &KeyMaterial) -> Option<Algorithm> {
    infer_algorithm(key, Some(KeyUse::Sig))
}
