//! Key material of the supported key families.

use std::fmt::{Debug, Display};

use ed25519_dalek::{SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::{
    BigUint,
    RsaPrivateKey,
    RsaPublicKey,
    traits::{PrivateKeyParts, PublicKeyParts},
};
use strum::{EnumIter, EnumString, IntoStaticStr};
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::{key::Error, signer::OpaqueKey};

const REDACTED: &&str = &"[REDACTED]";

/// The length of Ed25519 and X25519 keys in bytes.
pub const CURVE25519_KEY_LENGTH: usize = 32;

/// A NIST elliptic curve, which can be used with keys of type "EC"
#[derive(
    Clone,
    Copy,
    Debug,
    strum::Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    IntoStaticStr,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub enum EcCurve {
    /// NIST P-256
    #[strum(to_string = "P-256")]
    P256,

    /// NIST P-384
    #[strum(to_string = "P-384")]
    P384,

    /// NIST P-521
    #[strum(to_string = "P-521")]
    P521,
}

impl EcCurve {
    /// Returns the size of a field element (and of a coordinate) in bytes.
    pub fn field_size(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

/// The family of a key
///
/// Public and private keys of the same kind share a family.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyFamily {
    /// A symmetric secret
    Symmetric,

    /// An elliptic curve key on a NIST curve
    Ec(EcCurve),

    /// An RSA key
    Rsa,

    /// An Ed25519 key
    Ed25519,

    /// An X25519 key
    X25519,
}

impl KeyFamily {
    /// Returns the JSON Web Key type ("kty") of the family.
    pub fn key_type(&self) -> &'static str {
        match self {
            Self::Symmetric => "oct",
            Self::Ec(_) => "EC",
            Self::Rsa => "RSA",
            Self::Ed25519 | Self::X25519 => "OKP",
        }
    }
}

impl Display for KeyFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symmetric => write!(f, "oct"),
            Self::Ec(curve) => write!(f, "EC {curve}"),
            Self::Rsa => write!(f, "RSA"),
            Self::Ed25519 => write!(f, "Ed25519"),
            Self::X25519 => write!(f, "X25519"),
        }
    }
}

/// Converts `bytes` to an array of [`CURVE25519_KEY_LENGTH`] bytes.
fn curve25519_bytes(
    bytes: &[u8],
    context: &'static str,
) -> Result<[u8; CURVE25519_KEY_LENGTH], Error> {
    bytes.try_into().map_err(|_| Error::InvalidLength {
        context,
        expected: CURVE25519_KEY_LENGTH,
        actual: bytes.len(),
    })
}

/// Splits an uncompressed SEC1 point into its `x` and `y` coordinate.
fn split_uncompressed_point(point: &[u8], curve: EcCurve) -> (Vec<u8>, Vec<u8>) {
    let size = curve.field_size();
    // the first byte is the 0x04 tag of uncompressed points
    let coordinates = point.get(1..).unwrap_or_default();
    let (x, y) = coordinates.split_at(size.min(coordinates.len()));
    (x.to_vec(), y.to_vec())
}

/// A symmetric secret
///
/// The bytes are zeroized on drop and never shown in debug output.
#[derive(Clone, Eq, PartialEq)]
pub struct SymmetricKey(Zeroizing<Vec<u8>>);

impl SymmetricKey {
    /// Creates a new [`SymmetricKey`] from `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SymmetricKey").field(REDACTED).finish()
    }
}

/// An X25519 private key
#[derive(Clone)]
pub struct X25519SecretKey(StaticSecret);

impl X25519SecretKey {
    /// Creates a new [`X25519SecretKey`] from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not exactly [`CURVE25519_KEY_LENGTH`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let bytes = Zeroizing::new(curve25519_bytes(bytes, "An X25519 private key")?);
        Ok(Self(StaticSecret::from(*bytes)))
    }

    /// Returns the raw bytes of the private key.
    pub fn to_bytes(&self) -> Zeroizing<[u8; CURVE25519_KEY_LENGTH]> {
        Zeroizing::new(self.0.to_bytes())
    }

    /// Returns the public key.
    pub fn public_key(&self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(&self.0)
    }

    /// Returns the wrapped [`StaticSecret`].
    pub fn as_static_secret(&self) -> &StaticSecret {
        &self.0
    }
}

impl From<StaticSecret> for X25519SecretKey {
    fn from(value: StaticSecret) -> Self {
        Self(value)
    }
}

impl PartialEq for X25519SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for X25519SecretKey {}

impl Debug for X25519SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("X25519SecretKey").field(REDACTED).finish()
    }
}

/// A public key of one of the supported asymmetric key families
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PublicKeyMaterial {
    /// A NIST P-256 public key
    P256(p256::PublicKey),
    /// A NIST P-384 public key
    P384(p384::PublicKey),
    /// A NIST P-521 public key
    P521(p521::PublicKey),
    /// An RSA public key
    Rsa(RsaPublicKey),
    /// An Ed25519 public key
    Ed25519(VerifyingKey),
    /// An X25519 public key
    X25519(x25519_dalek::PublicKey),
}

impl PublicKeyMaterial {
    /// Creates an elliptic curve public key from its affine coordinates.
    ///
    /// Both coordinates must be big-endian and exactly as long as [`EcCurve::field_size`].
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - `x` or `y` do not have the size of a field element of `curve`,
    /// - or the point is not on `curve`.
    pub fn from_ec_coordinates(curve: EcCurve, x: &[u8], y: &[u8]) -> Result<Self, Error> {
        let expected = curve.field_size();
        if x.len() != expected || y.len() != expected {
            return Err(Error::InvalidCoordinate { curve, expected });
        }

        let mut point = Vec::with_capacity(1 + 2 * expected);
        point.push(0x04);
        point.extend_from_slice(x);
        point.extend_from_slice(y);

        Ok(match curve {
            EcCurve::P256 => Self::P256(p256::PublicKey::from_sec1_bytes(&point)?),
            EcCurve::P384 => Self::P384(p384::PublicKey::from_sec1_bytes(&point)?),
            EcCurve::P521 => Self::P521(p521::PublicKey::from_sec1_bytes(&point)?),
        })
    }

    /// Creates an RSA public key from its big-endian modulus and public exponent.
    ///
    /// # Errors
    ///
    /// Returns an error if the modulus or exponent are not acceptable for an RSA key.
    pub fn from_rsa_components(modulus: &[u8], exponent: &[u8]) -> Result<Self, Error> {
        Ok(Self::Rsa(RsaPublicKey::new(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(exponent),
        )?))
    }

    /// Creates an Ed25519 public key from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a valid Ed25519 public key.
    pub fn from_ed25519_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self::Ed25519(VerifyingKey::from_bytes(&curve25519_bytes(
            bytes,
            "An Ed25519 public key",
        )?)?))
    }

    /// Creates an X25519 public key from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not exactly [`CURVE25519_KEY_LENGTH`] bytes long.
    pub fn from_x25519_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self::X25519(x25519_dalek::PublicKey::from(
            curve25519_bytes(bytes, "An X25519 public key")?,
        )))
    }

    /// Returns the [`KeyFamily`] of the key.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::P256(_) => KeyFamily::Ec(EcCurve::P256),
            Self::P384(_) => KeyFamily::Ec(EcCurve::P384),
            Self::P521(_) => KeyFamily::Ec(EcCurve::P521),
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::Ed25519(_) => KeyFamily::Ed25519,
            Self::X25519(_) => KeyFamily::X25519,
        }
    }

    /// Returns the curve and the big-endian `x` and `y` coordinates of an elliptic curve key.
    ///
    /// Coordinates are left-padded to the size of a field element.
    /// Returns [`None`] for keys of other families.
    pub fn ec_coordinates(&self) -> Option<(EcCurve, Vec<u8>, Vec<u8>)> {
        let (curve, point) = match self {
            Self::P256(key) => (EcCurve::P256, key.to_encoded_point(false).as_bytes().to_vec()),
            Self::P384(key) => (EcCurve::P384, key.to_encoded_point(false).as_bytes().to_vec()),
            Self::P521(key) => (EcCurve::P521, key.to_encoded_point(false).as_bytes().to_vec()),
            _ => return None,
        };
        let (x, y) = split_uncompressed_point(&point, curve);
        Some((curve, x, y))
    }

    /// Returns the big-endian modulus and public exponent of an RSA key.
    ///
    /// Returns [`None`] for keys of other families.
    pub fn rsa_components(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        match self {
            Self::Rsa(key) => Some((key.n().to_bytes_be(), key.e().to_bytes_be())),
            _ => None,
        }
    }

    /// Returns the raw bytes of an Ed25519 or X25519 key.
    ///
    /// Returns [`None`] for keys of other families.
    pub fn okp_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Ed25519(key) => Some(key.to_bytes().to_vec()),
            Self::X25519(key) => Some(key.to_bytes().to_vec()),
            _ => None,
        }
    }
}

/// The private components of an RSA key, as big-endian bytes
///
/// The CRT values are derived from the primes when the key is created and are always present.
pub struct RsaPrivateComponents {
    /// The private exponent `d`.
    pub private_exponent: Zeroizing<Vec<u8>>,
    /// The first prime factor `p`.
    pub prime_p: Zeroizing<Vec<u8>>,
    /// The second prime factor `q`.
    pub prime_q: Zeroizing<Vec<u8>>,
    /// The first factor CRT exponent `d mod (p - 1)`.
    pub exponent_p: Zeroizing<Vec<u8>>,
    /// The second factor CRT exponent `d mod (q - 1)`.
    pub exponent_q: Zeroizing<Vec<u8>>,
    /// The first CRT coefficient `q^-1 mod p`.
    pub coefficient: Zeroizing<Vec<u8>>,
}

impl Debug for RsaPrivateComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateComponents")
            .field("private_exponent", REDACTED)
            .field("prime_p", REDACTED)
            .field("prime_q", REDACTED)
            .field("exponent_p", REDACTED)
            .field("exponent_q", REDACTED)
            .field("coefficient", REDACTED)
            .finish()
    }
}

/// A private key of one of the supported asymmetric key families
#[derive(Clone, Eq, PartialEq)]
pub enum PrivateKeyMaterial {
    /// A NIST P-256 private key
    P256(p256::SecretKey),
    /// A NIST P-384 private key
    P384(p384::SecretKey),
    /// A NIST P-521 private key
    P521(p521::SecretKey),
    /// An RSA private key
    Rsa(RsaPrivateKey),
    /// An Ed25519 private key
    Ed25519(SigningKey),
    /// An X25519 private key
    X25519(X25519SecretKey),
}

impl PrivateKeyMaterial {
    /// Creates an elliptic curve private key from its big-endian scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - `scalar` does not have the size of a field element of `curve`,
    /// - or `scalar` is not a valid private key on `curve`.
    pub fn from_ec_scalar(curve: EcCurve, scalar: &[u8]) -> Result<Self, Error> {
        let expected = curve.field_size();
        if scalar.len() != expected {
            return Err(Error::InvalidLength {
                context: "An elliptic curve private key",
                expected,
                actual: scalar.len(),
            });
        }

        Ok(match curve {
            EcCurve::P256 => Self::P256(p256::SecretKey::from_slice(scalar)?),
            EcCurve::P384 => Self::P384(p384::SecretKey::from_slice(scalar)?),
            EcCurve::P521 => Self::P521(p521::SecretKey::from_slice(scalar)?),
        })
    }

    /// Creates an RSA private key from its big-endian modulus, exponents and two prime factors.
    ///
    /// The CRT values are recomputed from the primes.
    ///
    /// # Errors
    ///
    /// Returns an error if the components do not form a valid RSA key.
    pub fn from_rsa_components(
        modulus: &[u8],
        public_exponent: &[u8],
        private_exponent: &[u8],
        prime_p: &[u8],
        prime_q: &[u8],
    ) -> Result<Self, Error> {
        let key = RsaPrivateKey::from_components(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(public_exponent),
            BigUint::from_bytes_be(private_exponent),
            vec![
                BigUint::from_bytes_be(prime_p),
                BigUint::from_bytes_be(prime_q),
            ],
        )?;
        key.validate()?;
        Ok(Self::Rsa(key))
    }

    /// Creates an Ed25519 private key from its raw 32 byte seed.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not exactly [`CURVE25519_KEY_LENGTH`] bytes long.
    pub fn from_ed25519_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let seed = Zeroizing::new(curve25519_bytes(bytes, "An Ed25519 private key")?);
        Ok(Self::Ed25519(SigningKey::from_bytes(&seed)))
    }

    /// Creates an X25519 private key from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not exactly [`CURVE25519_KEY_LENGTH`] bytes long.
    pub fn from_x25519_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self::X25519(X25519SecretKey::from_slice(bytes)?))
    }

    /// Returns the [`KeyFamily`] of the key.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::P256(_) => KeyFamily::Ec(EcCurve::P256),
            Self::P384(_) => KeyFamily::Ec(EcCurve::P384),
            Self::P521(_) => KeyFamily::Ec(EcCurve::P521),
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::Ed25519(_) => KeyFamily::Ed25519,
            Self::X25519(_) => KeyFamily::X25519,
        }
    }

    /// Derives the public key.
    pub fn public(&self) -> PublicKeyMaterial {
        match self {
            Self::P256(key) => PublicKeyMaterial::P256(key.public_key()),
            Self::P384(key) => PublicKeyMaterial::P384(key.public_key()),
            Self::P521(key) => PublicKeyMaterial::P521(key.public_key()),
            Self::Rsa(key) => PublicKeyMaterial::Rsa(key.to_public_key()),
            Self::Ed25519(key) => PublicKeyMaterial::Ed25519(key.verifying_key()),
            Self::X25519(key) => PublicKeyMaterial::X25519(key.public_key()),
        }
    }

    /// Returns the big-endian private scalar of an elliptic curve key.
    ///
    /// Returns [`None`] for keys of other families.
    pub fn ec_scalar(&self) -> Option<Zeroizing<Vec<u8>>> {
        match self {
            Self::P256(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            Self::P384(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            Self::P521(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            _ => None,
        }
    }

    /// Returns the private components of an RSA key.
    ///
    /// Returns [`None`] for keys of other families and for RSA keys with more than two primes.
    pub fn rsa_components(&self) -> Option<RsaPrivateComponents> {
        let Self::Rsa(key) = self else {
            return None;
        };
        let [prime_p, prime_q] = key.primes() else {
            return None;
        };
        let bytes = |value: &BigUint| Zeroizing::new(value.to_bytes_be());
        Some(RsaPrivateComponents {
            private_exponent: bytes(key.d()),
            prime_p: bytes(prime_p),
            prime_q: bytes(prime_q),
            exponent_p: bytes(key.dp()?),
            exponent_q: bytes(key.dq()?),
            coefficient: bytes(&key.crt_coefficient()?),
        })
    }

    /// Returns the raw private bytes of an Ed25519 or X25519 key.
    ///
    /// Returns [`None`] for keys of other families.
    pub fn okp_bytes(&self) -> Option<Zeroizing<Vec<u8>>> {
        match self {
            Self::Ed25519(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            Self::X25519(key) => Some(Zeroizing::new(key.to_bytes().to_vec())),
            _ => None,
        }
    }
}

impl Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P256(_) => f.debug_tuple("P256").field(REDACTED).finish(),
            Self::P384(_) => f.debug_tuple("P384").field(REDACTED).finish(),
            Self::P521(_) => f.debug_tuple("P521").field(REDACTED).finish(),
            Self::Rsa(key) => f
                .debug_struct("Rsa")
                .field("modulus_bits", &key.n().bits())
                .field("private", REDACTED)
                .finish(),
            Self::Ed25519(_) => f.debug_tuple("Ed25519").field(REDACTED).finish(),
            Self::X25519(_) => f.debug_tuple("X25519").field(REDACTED).finish(),
        }
    }
}

/// Key material of a key record
///
/// Exactly one kind of key material is held at a time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyMaterial {
    /// A symmetric secret
    Symmetric(SymmetricKey),

    /// A public key
    Public(PublicKeyMaterial),

    /// A private key
    Private(PrivateKeyMaterial),

    /// A signer, which does not expose its private key
    Opaque(OpaqueKey),
}

impl KeyMaterial {
    /// Returns the [`KeyFamily`] of the key material.
    ///
    /// Returns [`None`] only for an opaque signer, that does not provide a public key.
    pub fn family(&self) -> Option<KeyFamily> {
        match self {
            Self::Symmetric(_) => Some(KeyFamily::Symmetric),
            Self::Public(key) => Some(key.family()),
            Self::Private(key) => Some(key.family()),
            Self::Opaque(signer) => signer.public().map(|key| key.family()),
        }
    }

    /// Returns whether the key material is a symmetric secret.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Symmetric(_))
    }

    /// Returns whether the key material does not expose any private components.
    ///
    /// Opaque signers keep their private key to themselves and are considered public.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public(_) | Self::Opaque(_))
    }

    /// Returns whether the key material is a private key.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// Returns the public key belonging to the key material.
    ///
    /// Returns [`None`] for symmetric secrets and opaque signers without a public key.
    pub fn public_key(&self) -> Option<PublicKeyMaterial> {
        match self {
            Self::Symmetric(_) => None,
            Self::Public(key) => Some(key.clone()),
            Self::Private(key) => Some(key.public()),
            Self::Opaque(signer) => signer.public(),
        }
    }

    /// Returns a copy of the key material, that contains only public components.
    ///
    /// # Errors
    ///
    /// Returns an error if the key material has no public component (symmetric secrets and
    /// opaque signers without public key).
    pub fn to_public(&self) -> Result<KeyMaterial, Error> {
        self.public_key()
            .map(KeyMaterial::Public)
            .ok_or(Error::NoPublicKey)
    }
}

impl From<PublicKeyMaterial> for KeyMaterial {
    fn from(value: PublicKeyMaterial) -> Self {
        Self::Public(value)
    }
}

impl From<PrivateKeyMaterial> for KeyMaterial {
    fn from(value: PrivateKeyMaterial) -> Self {
        Self::Private(value)
    }
}

impl From<SymmetricKey> for KeyMaterial {
    fn from(value: SymmetricKey) -> Self {
        Self::Symmetric(value)
    }
}

impl From<OpaqueKey> for KeyMaterial {
    fn from(value: OpaqueKey) -> Self {
        Self::Opaque(value)
    }
}
