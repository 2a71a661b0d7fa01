//! Import of DER encoded key material.
//!
//! Supports PKCS#8 and SEC1 private keys, SubjectPublicKeyInfo public keys and PKCS#1 RSA keys.

use ed25519_dalek::{SigningKey, VerifyingKey};
use log::trace;
use pkcs8::{
    DecodePrivateKey,
    DecodePublicKey,
    ObjectIdentifier,
    PrivateKeyInfo,
    SubjectPublicKeyInfoRef,
    der::{Decode, asn1::OctetStringRef},
};
use rsa::{
    RsaPrivateKey,
    RsaPublicKey,
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
};

use crate::key::{Error, PrivateKeyMaterial, PublicKeyMaterial, X25519SecretKey};

/// The object identifier of elliptic curve public keys (`id-ecPublicKey`).
pub const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
/// The object identifier of the NIST P-256 curve (`secp256r1`).
pub const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
/// The object identifier of the NIST P-384 curve (`secp384r1`).
pub const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
/// The object identifier of the NIST P-521 curve (`secp521r1`).
pub const P521_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");
/// The object identifier of RSA keys (`rsaEncryption`).
pub const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// The object identifier of Ed25519 keys.
pub const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
/// The object identifier of X25519 keys.
pub const X25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.110");

/// The supported algorithms of DER encoded keys.
enum DerAlgorithm {
    P256,
    P384,
    P521,
    Rsa,
    Ed25519,
    X25519,
}

impl DerAlgorithm {
    /// Selects the algorithm from the algorithm and parameter object identifiers.
    fn new(
        oid: ObjectIdentifier,
        parameters: Option<ObjectIdentifier>,
        context: &'static str,
    ) -> Result<Self, Error> {
        if oid == EC_PUBLIC_KEY_OID {
            return match parameters {
                Some(curve) if curve == P256_OID => Ok(Self::P256),
                Some(curve) if curve == P384_OID => Ok(Self::P384),
                Some(curve) if curve == P521_OID => Ok(Self::P521),
                Some(curve) => Err(Error::UnsupportedCurve {
                    oid: curve.to_string(),
                }),
                None => Err(Error::UnsupportedCurve {
                    oid: "none".to_string(),
                }),
            };
        }

        if oid == RSA_ENCRYPTION_OID {
            Ok(Self::Rsa)
        } else if oid == ED25519_OID {
            Ok(Self::Ed25519)
        } else if oid == X25519_OID {
            Ok(Self::X25519)
        } else {
            Err(Error::UnsupportedAlgorithm {
                oid: oid.to_string(),
                context,
            })
        }
    }
}

/// Creates a [`PrivateKeyMaterial`] from a PKCS#8 DER encoded private key.
///
/// The key family is selected using the algorithm identifier of the structure.
///
/// # Errors
///
/// Returns an error if
///
/// - `der` is not a PKCS#8 structure,
/// - the algorithm or named curve is not supported,
/// - or the private key is not valid for its algorithm.
pub fn private_key_from_pkcs8_der(der: &[u8]) -> Result<PrivateKeyMaterial, Error> {
    let info = PrivateKeyInfo::try_from(der)?;
    let algorithm = DerAlgorithm::new(
        info.algorithm.oid,
        info.algorithm.parameters_oid().ok(),
        "PKCS#8 private keys",
    )?;
    trace!("Decoding PKCS#8 private key with algorithm {}", info.algorithm.oid);

    Ok(match algorithm {
        DerAlgorithm::P256 => PrivateKeyMaterial::P256(p256::SecretKey::from_pkcs8_der(der)?),
        DerAlgorithm::P384 => PrivateKeyMaterial::P384(p384::SecretKey::from_pkcs8_der(der)?),
        DerAlgorithm::P521 => PrivateKeyMaterial::P521(p521::SecretKey::from_pkcs8_der(der)?),
        DerAlgorithm::Rsa => {
            let key = RsaPrivateKey::from_pkcs8_der(der)?;
            key.validate()?;
            PrivateKeyMaterial::Rsa(key)
        }
        DerAlgorithm::Ed25519 => PrivateKeyMaterial::Ed25519(SigningKey::from_pkcs8_der(der)?),
        DerAlgorithm::X25519 => {
            // the private key is an OCTET STRING wrapped in the privateKey OCTET STRING
            let secret = OctetStringRef::from_der(info.private_key)?;
            PrivateKeyMaterial::X25519(X25519SecretKey::from_slice(secret.as_bytes())?)
        }
    })
}

/// Creates a [`PublicKeyMaterial`] from a DER encoded SubjectPublicKeyInfo.
///
/// # Errors
///
/// Returns an error if
///
/// - `der` is not a SubjectPublicKeyInfo structure,
/// - the algorithm or named curve is not supported,
/// - or the public key is not valid for its algorithm.
pub fn public_key_from_spki_der(der: &[u8]) -> Result<PublicKeyMaterial, Error> {
    let info = SubjectPublicKeyInfoRef::try_from(der)?;
    let algorithm = DerAlgorithm::new(
        info.algorithm.oid,
        info.algorithm.parameters_oid().ok(),
        "SubjectPublicKeyInfo",
    )?;
    trace!("Decoding public key with algorithm {}", info.algorithm.oid);

    Ok(match algorithm {
        DerAlgorithm::P256 => PublicKeyMaterial::P256(p256::PublicKey::from_public_key_der(der)?),
        DerAlgorithm::P384 => PublicKeyMaterial::P384(p384::PublicKey::from_public_key_der(der)?),
        DerAlgorithm::P521 => PublicKeyMaterial::P521(p521::PublicKey::from_public_key_der(der)?),
        DerAlgorithm::Rsa => PublicKeyMaterial::Rsa(RsaPublicKey::from_public_key_der(der)?),
        DerAlgorithm::Ed25519 => {
            PublicKeyMaterial::Ed25519(VerifyingKey::from_public_key_der(der)?)
        }
        DerAlgorithm::X25519 => {
            PublicKeyMaterial::from_x25519_bytes(info.subject_public_key.raw_bytes())?
        }
    })
}

/// Creates a [`PrivateKeyMaterial`] from a SEC1 DER encoded elliptic curve private key.
///
/// The curve is found by trying P-256, P-384 and P-521 in turn.
///
/// # Errors
///
/// Returns an error if `der` is not a SEC1 private key on any of the supported curves.
pub fn private_key_from_sec1_der(der: &[u8]) -> Result<PrivateKeyMaterial, Error> {
    if let Ok(key) = p256::SecretKey::from_sec1_der(der) {
        return Ok(PrivateKeyMaterial::P256(key));
    }
    if let Ok(key) = p384::SecretKey::from_sec1_der(der) {
        return Ok(PrivateKeyMaterial::P384(key));
    }
    if let Ok(key) = p521::SecretKey::from_sec1_der(der) {
        return Ok(PrivateKeyMaterial::P521(key));
    }
    Err(Error::UnknownSec1Curve)
}

/// Creates a [`PrivateKeyMaterial`] from a PKCS#1 DER encoded RSA private key.
///
/// # Errors
///
/// Returns an error if `der` is not a valid PKCS#1 RSA private key.
pub fn rsa_private_key_from_pkcs1_der(der: &[u8]) -> Result<PrivateKeyMaterial, Error> {
    let key = RsaPrivateKey::from_pkcs1_der(der)?;
    key.validate()?;
    Ok(PrivateKeyMaterial::Rsa(key))
}

/// Creates a [`PublicKeyMaterial`] from a PKCS#1 DER encoded RSA public key.
///
/// # Errors
///
/// Returns an error if `der` is not a valid PKCS#1 RSA public key.
pub fn rsa_public_key_from_pkcs1_der(der: &[u8]) -> Result<PublicKeyMaterial, Error> {
    Ok(PublicKeyMaterial::Rsa(RsaPublicKey::from_pkcs1_der(der)?))
}
