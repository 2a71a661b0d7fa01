//! JSON Web Keys ([RFC 7517]) and JSON Web Key Sets.
//!
//! A [`JsonWebKey`] is the record every resolution produces.
//! Supported key types are `oct`, `EC` (P-256, P-384 and P-521), `RSA` and `OKP` (Ed25519 and
//! X25519).
//! Private components are always checked against the public components declared next to them.
//!
//! [RFC 7517]: https://www.rfc-editor.org/rfc/rfc7517

use std::{fmt::Debug, str::FromStr};

use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use jose_crypto::{
    EcCurve,
    KeyFamily,
    KeyMaterial,
    PrivateKeyMaterial,
    PublicKeyMaterial,
    SymmetricKey,
    key,
    thumbprint::{thumbprint, thumbprint_sha256_base64url},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::algorithm::{Algorithm, KeyUse};

/// An error that may occur when decoding or encoding JSON Web Keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The JSON structure is invalid
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A member is not valid base64
    #[error("The member {member} is not valid base64: {error}")]
    Base64 {
        /// The name of the member.
        member: &'static str,

        /// The decoding error.
        #[source]
        error: base64ct::Error,
    },

    /// A member required by the key type is missing
    #[error("The member {member} is required for keys of type {key_type}")]
    MissingMember {
        /// The name of the member.
        member: &'static str,

        /// The key type ("kty") of the key.
        key_type: &'static str,
    },

    /// A member is empty
    #[error("The member {member} must not be empty")]
    EmptyMember {
        /// The name of the member.
        member: &'static str,
    },

    /// The key type is not supported
    #[error("The key type {key_type} is not supported")]
    UnsupportedKeyType {
        /// The key type ("kty") of the key.
        key_type: String,
    },

    /// The curve is not supported for the key type
    #[error("The curve {curve} is not supported for keys of type {key_type}")]
    UnsupportedCurve {
        /// The name of the curve.
        curve: String,

        /// The key type ("kty") of the key.
        key_type: &'static str,
    },

    /// The key use is neither "sig" nor "enc"
    #[error("The key use {value} is not supported")]
    InvalidKeyUse {
        /// The declared key use.
        value: String,
    },

    /// A certificate thumbprint does not match the first certificate of the chain
    #[error("The certificate thumbprint {member} does not match the first certificate")]
    CertificateThumbprintMismatch {
        /// The name of the thumbprint member.
        member: &'static str,
    },

    /// The key material is invalid
    #[error("Key error: {0}")]
    Key(#[from] key::Error),
}

/// The members of a JSON Web Key as they appear in JSON
///
/// The members are zeroized on drop, as they may contain private components.
#[derive(Default, Deserialize, Serialize, Zeroize, ZeroizeOnDrop)]
struct RawJwk {
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    key_use: Option<String>,
    kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5c: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5t: Option<String>,
    #[serde(default, rename = "x5t#S256", skip_serializing_if = "Option::is_none")]
    x5t_s256: Option<String>,
}

/// Returns the value of the required `member` of a key of type `key_type`.
fn required<'a>(
    member: &'static str,
    value: &'a Option<String>,
    key_type: &'static str,
) -> Result<&'a str, Error> {
    value
        .as_deref()
        .ok_or(Error::MissingMember { member, key_type })
}

/// Decodes the base64url encoded `member`.
fn decode(member: &'static str, value: &str) -> Result<Vec<u8>, Error> {
    Base64UrlUnpadded::decode_vec(value).map_err(|error| Error::Base64 { member, error })
}

/// Decodes the base64url encoded private `member`.
fn decode_secret(member: &'static str, value: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
    decode(member, value).map(Zeroizing::new)
}

/// Returns `value`, unless it is absent or empty.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Ensures that `private` belongs to `public`.
fn check_public(private: &PrivateKeyMaterial, public: &PublicKeyMaterial) -> Result<(), Error> {
    if private.public() != *public {
        return Err(key::Error::PublicComponentMismatch {
            family: private.family(),
        }
        .into());
    }
    Ok(())
}

impl RawJwk {
    /// Decodes the key material described by the members.
    fn key_material(&self) -> Result<KeyMaterial, Error> {
        match self.kty.as_str() {
            "oct" => {
                let secret = decode("k", required("k", &self.k, "oct")?)?;
                if secret.is_empty() {
                    return Err(Error::EmptyMember { member: "k" });
                }
                Ok(KeyMaterial::Symmetric(SymmetricKey::new(secret)))
            }
            "EC" => {
                let crv = required("crv", &self.crv, "EC")?;
                let curve = EcCurve::from_str(crv).map_err(|_| Error::UnsupportedCurve {
                    curve: crv.to_string(),
                    key_type: "EC",
                })?;
                let public = PublicKeyMaterial::from_ec_coordinates(
                    curve,
                    &decode("x", required("x", &self.x, "EC")?)?,
                    &decode("y", required("y", &self.y, "EC")?)?,
                )?;
                let Some(d) = self.d.as_deref() else {
                    return Ok(KeyMaterial::Public(public));
                };
                let private = PrivateKeyMaterial::from_ec_scalar(curve, &decode_secret("d", d)?)?;
                check_public(&private, &public)?;
                Ok(KeyMaterial::Private(private))
            }
            "RSA" => {
                let n = decode("n", required("n", &self.n, "RSA")?)?;
                let e = decode("e", required("e", &self.e, "RSA")?)?;
                let Some(d) = self.d.as_deref() else {
                    return Ok(KeyMaterial::Public(PublicKeyMaterial::from_rsa_components(
                        &n, &e,
                    )?));
                };
                // the CRT parameters are derived from the primes
                Ok(KeyMaterial::Private(PrivateKeyMaterial::from_rsa_components(
                    &n,
                    &e,
                    &decode_secret("d", d)?,
                    &decode_secret("p", required("p", &self.p, "RSA")?)?,
                    &decode_secret("q", required("q", &self.q, "RSA")?)?,
                )?))
            }
            "OKP" => {
                let crv = required("crv", &self.crv, "OKP")?;
                let x = decode("x", required("x", &self.x, "OKP")?)?;
                let public = match crv {
                    "Ed25519" => PublicKeyMaterial::from_ed25519_bytes(&x)?,
                    "X25519" => PublicKeyMaterial::from_x25519_bytes(&x)?,
                    _ => {
                        return Err(Error::UnsupportedCurve {
                            curve: crv.to_string(),
                            key_type: "OKP",
                        });
                    }
                };
                let Some(d) = self.d.as_deref() else {
                    return Ok(KeyMaterial::Public(public));
                };
                let d = decode_secret("d", d)?;
                let private = match public.family() {
                    KeyFamily::Ed25519 => PrivateKeyMaterial::from_ed25519_bytes(&d)?,
                    _ => PrivateKeyMaterial::from_x25519_bytes(&d)?,
                };
                check_public(&private, &public)?;
                Ok(KeyMaterial::Private(private))
            }
            _ => Err(Error::UnsupportedKeyType {
                key_type: self.kty.clone(),
            }),
        }
    }

    /// Writes the members of `public`.
    fn set_public(&mut self, public: &PublicKeyMaterial) {
        self.kty = public.family().key_type().to_string();
        if let Some((curve, x, y)) = public.ec_coordinates() {
            self.crv = Some(curve.to_string());
            self.x = Some(Base64UrlUnpadded::encode_string(&x));
            self.y = Some(Base64UrlUnpadded::encode_string(&y));
        } else if let Some((n, e)) = public.rsa_components() {
            self.n = Some(Base64UrlUnpadded::encode_string(&n));
            self.e = Some(Base64UrlUnpadded::encode_string(&e));
        } else if let Some(x) = public.okp_bytes() {
            self.crv = Some(public.family().to_string());
            self.x = Some(Base64UrlUnpadded::encode_string(&x));
        }
    }

    /// Writes the members of `private`, including its public members.
    fn set_private(&mut self, private: &PrivateKeyMaterial) {
        self.set_public(&private.public());
        if let Some(scalar) = private.ec_scalar() {
            self.d = Some(Base64UrlUnpadded::encode_string(&scalar));
        } else if let Some(components) = private.rsa_components() {
            self.d = Some(Base64UrlUnpadded::encode_string(
                &components.private_exponent,
            ));
            self.p = Some(Base64UrlUnpadded::encode_string(&components.prime_p));
            self.q = Some(Base64UrlUnpadded::encode_string(&components.prime_q));
            self.dp = Some(Base64UrlUnpadded::encode_string(&components.exponent_p));
            self.dq = Some(Base64UrlUnpadded::encode_string(&components.exponent_q));
            self.qi = Some(Base64UrlUnpadded::encode_string(&components.coefficient));
        } else if let Some(d) = private.okp_bytes() {
            self.d = Some(Base64UrlUnpadded::encode_string(&d));
        }
    }
}

/// A JSON Web Key
///
/// Absent certificate members are represented by empty vectors, so that equality of records is
/// total.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JsonWebKey {
    /// The key material.
    pub key: KeyMaterial,

    /// The key identifier ("kid").
    pub key_id: Option<String>,

    /// The algorithm the key is intended for ("alg").
    pub algorithm: Option<Algorithm>,

    /// The intended use of the key ("use").
    pub key_use: Option<KeyUse>,

    /// The DER encoded certificate chain ("x5c").
    pub certificates: Vec<Vec<u8>>,

    /// The SHA-1 thumbprint of the first certificate ("x5t").
    pub certificate_thumbprint_sha1: Vec<u8>,

    /// The SHA-256 thumbprint of the first certificate ("x5t#S256").
    pub certificate_thumbprint_sha256: Vec<u8>,
}

impl JsonWebKey {
    /// Creates a new [`JsonWebKey`] for `key` without any further members.
    pub fn new(key: impl Into<KeyMaterial>) -> Self {
        Self {
            key: key.into(),
            key_id: None,
            algorithm: None,
            key_use: None,
            certificates: Vec::new(),
            certificate_thumbprint_sha1: Vec::new(),
            certificate_thumbprint_sha256: Vec::new(),
        }
    }

    /// Decodes a [`JsonWebKey`] from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - `data` is not a JSON object,
    /// - the key type, curve or key use is not supported,
    /// - a member required by the key type is missing or not valid base64,
    /// - the private components do not match the public components,
    /// - or a certificate thumbprint does not match the first certificate of the chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use jose_keys::{Algorithm, JsonWebKey};
    ///
    /// # fn main() -> testresult::TestResult {
    /// let key = JsonWebKey::from_json(include_bytes!("../tests/fixtures/okp.priv.json"))?;
    /// assert!(key.key.is_private());
    /// assert_eq!(key.algorithm, Some(Algorithm::EdDsa));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(data: &[u8]) -> Result<Self, Error> {
        Self::try_from(&serde_json::from_slice::<RawJwk>(data)?)
    }

    /// Decodes a [`JsonWebKey`] from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`JsonWebKey::from_json`].
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        Self::try_from(&RawJwk::deserialize(value)?)
    }

    /// Encodes the key as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is an opaque signer without public key.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_raw()?)?)
    }

    /// Encodes the key as pretty printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is an opaque signer without public key.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.to_raw()?)?)
    }

    /// Returns a copy of the key without private components.
    ///
    /// All other members are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key has no public component (symmetric secrets and opaque signers
    /// without public key).
    pub fn public(&self) -> Result<Self, Error> {
        Ok(Self {
            key: self.key.to_public()?,
            ..self.clone()
        })
    }

    /// Returns the [`KeyFamily`] of the key material.
    pub fn family(&self) -> Option<KeyFamily> {
        self.key.family()
    }

    /// Computes the [RFC 7638] thumbprint of the key using the digest `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is an opaque signer without public key.
    ///
    /// [RFC 7638]: https://www.rfc-editor.org/rfc/rfc7638
    pub fn thumbprint<D: Digest>(&self) -> Result<Vec<u8>, Error> {
        Ok(thumbprint::<D>(&self.key)?)
    }

    /// Computes the SHA-256 thumbprint of the key, encoded as unpadded base64url.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is an opaque signer without public key.
    pub fn thumbprint_sha256(&self) -> Result<String, Error> {
        Ok(thumbprint_sha256_base64url(&self.key)?)
    }

    /// Converts the key to its JSON members.
    fn to_raw(&self) -> Result<RawJwk, Error> {
        let mut raw = RawJwk::default();
        match &self.key {
            KeyMaterial::Symmetric(secret) => {
                raw.kty = "oct".to_string();
                raw.k = Some(Base64UrlUnpadded::encode_string(secret.as_bytes()));
            }
            KeyMaterial::Public(public) => raw.set_public(public),
            KeyMaterial::Private(private) => raw.set_private(private),
            KeyMaterial::Opaque(signer) => {
                raw.set_public(&signer.public().ok_or(key::Error::NoPublicKey)?)
            }
        }
        raw.key_use = self.key_use.map(|key_use| key_use.to_string());
        raw.kid = self.key_id.clone();
        raw.alg = self.algorithm.as_ref().map(ToString::to_string);
        if !self.certificates.is_empty() {
            raw.x5c = Some(
                self.certificates
                    .iter()
                    .map(|certificate| Base64::encode_string(certificate))
                    .collect(),
            );
        }
        if !self.certificate_thumbprint_sha1.is_empty() {
            raw.x5t = Some(Base64UrlUnpadded::encode_string(
                &self.certificate_thumbprint_sha1,
            ));
        }
        if !self.certificate_thumbprint_sha256.is_empty() {
            raw.x5t_s256 = Some(Base64UrlUnpadded::encode_string(
                &self.certificate_thumbprint_sha256,
            ));
        }
        Ok(raw)
    }
}

impl TryFrom<&RawJwk> for JsonWebKey {
    type Error = Error;

    fn try_from(raw: &RawJwk) -> Result<Self, Self::Error> {
        let key = raw.key_material()?;
        let key_use = match non_empty(&raw.key_use) {
            Some(value) => Some(KeyUse::from_str(value).map_err(|_| Error::InvalidKeyUse {
                value: value.to_string(),
            })?),
            None => None,
        };

        let certificates = raw
            .x5c
            .iter()
            .flatten()
            .map(|certificate| {
                Base64::decode_vec(certificate).map_err(|error| Error::Base64 {
                    member: "x5c",
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let certificate_thumbprint_sha1 = match non_empty(&raw.x5t) {
            Some(value) => decode("x5t", value)?,
            None => Vec::new(),
        };
        let certificate_thumbprint_sha256 = match non_empty(&raw.x5t_s256) {
            Some(value) => decode("x5t#S256", value)?,
            None => Vec::new(),
        };
        if let Some(certificate) = certificates.first() {
            if !certificate_thumbprint_sha1.is_empty()
                && Sha1::digest(certificate)[..] != certificate_thumbprint_sha1[..]
            {
                return Err(Error::CertificateThumbprintMismatch { member: "x5t" });
            }
            if !certificate_thumbprint_sha256.is_empty()
                && Sha256::digest(certificate)[..] != certificate_thumbprint_sha256[..]
            {
                return Err(Error::CertificateThumbprintMismatch { member: "x5t#S256" });
            }
        }

        Ok(Self {
            key,
            key_id: non_empty(&raw.kid).map(ToString::to_string),
            algorithm: non_empty(&raw.alg).map(Algorithm::from),
            key_use,
            certificates,
            certificate_thumbprint_sha1,
            certificate_thumbprint_sha256,
        })
    }
}

impl Serialize for JsonWebKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonWebKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::try_from(&RawJwk::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// A JSON Web Key Set
///
/// The entries of the set are kept as raw JSON and are only decoded when selected, so that
/// entries of unsupported key types do not prevent the use of the others.
/// The set imposes no uniqueness constraint on key identifiers.
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonWebKeySet {
    #[serde(default)]
    keys: Vec<Value>,
}

impl JsonWebKeySet {
    /// Decodes a [`JsonWebKeySet`] from JSON.
    ///
    /// A JSON object without a `keys` member is an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a JSON object or `keys` is not an array.
    pub fn from_json(data: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Creates a [`JsonWebKeySet`] from `keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the keys is an opaque signer without public key.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a JsonWebKey>) -> Result<Self, Error> {
        Ok(Self {
            keys: keys
                .into_iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Encodes the set as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the set can not be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the number of entries in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the key identifiers of all entries, in order.
    pub fn key_ids(&self) -> impl Iterator<Item = Option<&str>> {
        self.keys
            .iter()
            .map(|entry| entry.get("kid").and_then(Value::as_str))
    }

    /// Returns all entries with the key identifier `kid`, in order.
    pub fn entries_with_id(&self, kid: &str) -> Vec<&Value> {
        self.keys
            .iter()
            .filter(|entry| entry.get("kid").and_then(Value::as_str) == Some(kid))
            .collect()
    }
}

impl Debug for JsonWebKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonWebKeySet")
            .field("key_ids", &self.key_ids().collect::<Vec<_>>())
            .finish()
    }
}
