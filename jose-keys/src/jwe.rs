//! Password based JSON Web Encryption ([RFC 7516]).
//!
//! Keys and key sets are protected using PBES2 key management ([RFC 7518], section 4.8) and
//! AES-GCM content encryption.
//! Both the compact and the JSON serialization (flattened or general with a single recipient)
//! are supported.
//!
//! The PBKDF2 iteration count of a container is bounded to [`MIN_ITERATIONS`] and
//! [`MAX_ITERATIONS`], which limits the work done per decryption attempt.
//!
//! [RFC 7516]: https://www.rfc-editor.org/rfc/rfc7516
//! [RFC 7518]: https://www.rfc-editor.org/rfc/rfc7518

use aes::{
    Aes128,
    Aes192,
    Aes256,
    cipher::{consts::U12, generic_array::GenericArray},
};
use aes_gcm::{
    AesGcm,
    KeyInit,
    aead::{Aead, Payload},
};
use aes_kw::{KekAes128, KekAes192, KekAes256};
use base64ct::{Base64UrlUnpadded, Encoding};
use jose_crypto::Passphrase;
use log::{debug, trace};
use pbkdf2::pbkdf2_hmac;
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::jwk::{self, JsonWebKey, JsonWebKeySet};

/// The smallest accepted PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 1000;

/// The largest accepted PBKDF2 iteration count.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// The default PBKDF2 iteration count used for encryption.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// The smallest accepted PBES2 salt input length in bytes.
pub const MIN_SALT_LENGTH: usize = 8;

/// The PBES2 salt input length in bytes used for encryption.
const SALT_LENGTH: usize = 16;

/// The length of AES-GCM initialization vectors in bytes.
const IV_LENGTH: usize = 12;

/// The length of AES-GCM authentication tags in bytes.
const TAG_LENGTH: usize = 16;

/// The length of the integrity check value added by AES key wrap in bytes.
const KEY_WRAP_OVERHEAD: usize = 8;

/// An error that may occur when encrypting or decrypting JSON Web Encryption containers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The JSON structure is invalid
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A member is not valid base64url
    #[error("The member {member} is not valid base64url: {error}")]
    Base64 {
        /// The name of the member.
        member: &'static str,

        /// The decoding error.
        #[source]
        error: base64ct::Error,
    },

    /// The compact serialization does not consist of five parts
    #[error("The compact serialization has {parts} parts instead of five")]
    InvalidCompact {
        /// The number of parts found.
        parts: usize,
    },

    /// A required member or header parameter is missing
    #[error("The member {name} is missing")]
    MissingMember {
        /// The name of the member or header parameter.
        name: &'static str,
    },

    /// A header parameter occurs in more than one header
    #[error("The header parameter {name} occurs in more than one header")]
    DuplicateHeader {
        /// The name of the header parameter.
        name: String,
    },

    /// Critical header parameters are used
    #[error("The critical header parameters {names:?} are not understood")]
    CriticalHeader {
        /// The names of the critical header parameters.
        names: Vec<String>,
    },

    /// Compression is used
    #[error("The compression algorithm {algorithm} is not supported")]
    Compression {
        /// The compression algorithm.
        algorithm: String,
    },

    /// The number of recipients is not one
    #[error("Only one recipient is supported, but {count} are present")]
    Recipients {
        /// The number of recipients.
        count: usize,
    },

    /// The key management algorithm is not supported
    #[error("The key management algorithm {algorithm} is not supported")]
    UnsupportedKeyManagement {
        /// The key management algorithm ("alg").
        algorithm: String,
    },

    /// The content encryption algorithm is not supported
    #[error("The content encryption algorithm {algorithm} is not supported")]
    UnsupportedContentEncryption {
        /// The content encryption algorithm ("enc").
        algorithm: String,
    },

    /// The PBKDF2 iteration count is out of bounds
    #[error(
        "The iteration count {count} is not between {min} and {max}",
        min = MIN_ITERATIONS,
        max = MAX_ITERATIONS
    )]
    IterationCount {
        /// The iteration count.
        count: u64,
    },

    /// The PBES2 salt input is too short
    #[error(
        "The salt input has {length} bytes, but at least {min} are required",
        min = MIN_SALT_LENGTH
    )]
    SaltLength {
        /// The length of the salt input.
        length: usize,
    },

    /// The length of a member does not fit the algorithms
    #[error("The member {member} has {actual} bytes instead of {expected}")]
    InvalidLength {
        /// The name of the member.
        member: &'static str,

        /// The expected length.
        expected: usize,

        /// The actual length.
        actual: usize,
    },

    /// The container can not be decrypted
    ///
    /// The password is wrong or the container has been tampered with.
    #[error("Decryption failed, the password is wrong or the data has been modified")]
    Decryption,

    /// The content can not be encrypted
    #[error("Encryption failed")]
    Encryption,

    /// The content can not be encoded
    #[error("JSON Web Key error: {0}")]
    Jwk(#[from] jwk::Error),
}

/// A supported PBES2 key management algorithm
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyManagement {
    Pbes2Hs256A128Kw,
    Pbes2Hs384A192Kw,
    Pbes2Hs512A256Kw,
}

impl KeyManagement {
    fn new(name: &str) -> Result<Self, Error> {
        match name {
            "PBES2-HS256+A128KW" => Ok(Self::Pbes2Hs256A128Kw),
            "PBES2-HS384+A192KW" => Ok(Self::Pbes2Hs384A192Kw),
            "PBES2-HS512+A256KW" => Ok(Self::Pbes2Hs512A256Kw),
            _ => Err(Error::UnsupportedKeyManagement {
                algorithm: name.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Pbes2Hs256A128Kw => "PBES2-HS256+A128KW",
            Self::Pbes2Hs384A192Kw => "PBES2-HS384+A192KW",
            Self::Pbes2Hs512A256Kw => "PBES2-HS512+A256KW",
        }
    }

    /// Derives the key encryption key from `passphrase`.
    ///
    /// The salt is the algorithm name, a zero byte and the salt input.
    fn derive_key(
        &self,
        passphrase: &Passphrase,
        salt_input: &[u8],
        iterations: u32,
    ) -> Zeroizing<Vec<u8>> {
        let mut salt = Vec::with_capacity(self.name().len() + 1 + salt_input.len());
        salt.extend_from_slice(self.name().as_bytes());
        salt.push(0);
        salt.extend_from_slice(salt_input);

        let password = passphrase.expose_borrowed();
        match self {
            Self::Pbes2Hs256A128Kw => {
                let mut key = Zeroizing::new(vec![0; 16]);
                pbkdf2_hmac::<Sha256>(password, &salt, iterations, &mut key);
                key
            }
            Self::Pbes2Hs384A192Kw => {
                let mut key = Zeroizing::new(vec![0; 24]);
                pbkdf2_hmac::<Sha384>(password, &salt, iterations, &mut key);
                key
            }
            Self::Pbes2Hs512A256Kw => {
                let mut key = Zeroizing::new(vec![0; 32]);
                pbkdf2_hmac::<Sha512>(password, &salt, iterations, &mut key);
                key
            }
        }
    }

    /// Wraps the content encryption key `cek` using the key encryption key `kek`.
    fn wrap(&self, kek: &[u8], cek: &[u8]) -> Result<Vec<u8>, Error> {
        let mut wrapped = vec![0; cek.len() + KEY_WRAP_OVERHEAD];
        match self {
            Self::Pbes2Hs256A128Kw => {
                KekAes128::new(GenericArray::from_slice(kek)).wrap(cek, &mut wrapped)
            }
            Self::Pbes2Hs384A192Kw => {
                KekAes192::new(GenericArray::from_slice(kek)).wrap(cek, &mut wrapped)
            }
            Self::Pbes2Hs512A256Kw => {
                KekAes256::new(GenericArray::from_slice(kek)).wrap(cek, &mut wrapped)
            }
        }
        .map_err(|_| Error::Encryption)?;
        Ok(wrapped)
    }

    /// Unwraps the content encryption key from `wrapped` using the key encryption key `kek`.
    fn unwrap(&self, kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        let length = wrapped
            .len()
            .checked_sub(KEY_WRAP_OVERHEAD)
            .ok_or(Error::Decryption)?;
        let mut cek = Zeroizing::new(vec![0; length]);
        match self {
            Self::Pbes2Hs256A128Kw => {
                KekAes128::new(GenericArray::from_slice(kek)).unwrap(wrapped, &mut cek)
            }
            Self::Pbes2Hs384A192Kw => {
                KekAes192::new(GenericArray::from_slice(kek)).unwrap(wrapped, &mut cek)
            }
            Self::Pbes2Hs512A256Kw => {
                KekAes256::new(GenericArray::from_slice(kek)).unwrap(wrapped, &mut cek)
            }
        }
        .map_err(|_| Error::Decryption)?;
        Ok(cek)
    }
}

/// A supported AES-GCM content encryption algorithm
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ContentEncryption {
    A128Gcm,
    A192Gcm,
    A256Gcm,
}

impl ContentEncryption {
    fn new(name: &str) -> Result<Self, Error> {
        match name {
            "A128GCM" => Ok(Self::A128Gcm),
            "A192GCM" => Ok(Self::A192Gcm),
            "A256GCM" => Ok(Self::A256Gcm),
            _ => Err(Error::UnsupportedContentEncryption {
                algorithm: name.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::A128Gcm => "A128GCM",
            Self::A192Gcm => "A192GCM",
            Self::A256Gcm => "A256GCM",
        }
    }

    fn key_length(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm => 32,
        }
    }

    /// Encrypts `plaintext` and returns the ciphertext with the authentication tag appended.
    fn seal(&self, cek: &[u8], iv: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, Error> {
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        let nonce = GenericArray::from_slice(iv);
        match self {
            Self::A128Gcm => AesGcm::<Aes128, U12>::new_from_slice(cek)
                .map_err(|_| Error::Encryption)?
                .encrypt(nonce, payload),
            Self::A192Gcm => AesGcm::<Aes192, U12>::new_from_slice(cek)
                .map_err(|_| Error::Encryption)?
                .encrypt(nonce, payload),
            Self::A256Gcm => AesGcm::<Aes256, U12>::new_from_slice(cek)
                .map_err(|_| Error::Encryption)?
                .encrypt(nonce, payload),
        }
        .map_err(|_| Error::Encryption)
    }

    /// Decrypts `ciphertext`, that has the authentication tag appended.
    fn open(
        &self,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        let nonce = GenericArray::from_slice(iv);
        match self {
            Self::A128Gcm => AesGcm::<Aes128, U12>::new_from_slice(cek)
                .map_err(|_| Error::Decryption)?
                .decrypt(nonce, payload),
            Self::A192Gcm => AesGcm::<Aes192, U12>::new_from_slice(cek)
                .map_err(|_| Error::Decryption)?
                .decrypt(nonce, payload),
            Self::A256Gcm => AesGcm::<Aes256, U12>::new_from_slice(cek)
                .map_err(|_| Error::Decryption)?
                .decrypt(nonce, payload),
        }
        .map(Zeroizing::new)
        .map_err(|_| Error::Decryption)
    }
}

/// The header parameters used for password based encryption
#[derive(Debug, Default, Deserialize, Serialize)]
struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p2c: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p2s: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,
}

/// A recipient of the general JSON serialization
#[derive(Deserialize)]
struct RawRecipient {
    #[serde(default)]
    header: Option<Map<String, Value>>,
    #[serde(default)]
    encrypted_key: Option<String>,
}

/// The members of the JSON serialization
#[derive(Deserialize, Serialize)]
struct RawJwe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unprotected: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_key: Option<String>,
    #[serde(default, skip_serializing)]
    recipients: Option<Vec<RawRecipient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aad: Option<String>,
    iv: String,
    ciphertext: String,
    tag: String,
}

/// Decodes the base64url encoded `member`.
fn decode(member: &'static str, value: &str) -> Result<Vec<u8>, Error> {
    Base64UrlUnpadded::decode_vec(value).map_err(|error| Error::Base64 { member, error })
}

/// Decodes the base64url encoded JSON object of the protected header.
fn decode_protected(protected: &str) -> Result<Map<String, Value>, Error> {
    if protected.is_empty() {
        return Ok(Map::new());
    }
    Ok(serde_json::from_slice(&decode("protected", protected)?)?)
}

/// Merges the parameters of `headers`, which must be disjoint.
fn merge_headers<'a>(
    headers: impl IntoIterator<Item = &'a Map<String, Value>>,
) -> Result<Header, Error> {
    let mut merged = Map::new();
    for header in headers {
        for (name, value) in header {
            if merged.insert(name.clone(), value.clone()).is_some() {
                return Err(Error::DuplicateHeader { name: name.clone() });
            }
        }
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// A JSON Web Encryption container
///
/// The container is parsed from either the compact or the JSON serialization.
#[derive(Debug)]
pub struct Jwe {
    /// The base64url encoded protected header, as it is covered by the authentication tag.
    protected: String,
    header: Header,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
    /// The base64url encoded additional authenticated data of the JSON serialization.
    aad: Option<String>,
}

impl Jwe {
    /// Parses a [`Jwe`] from either serialization.
    ///
    /// Data starting with a JSON object is parsed as JSON serialization, everything else as
    /// compact serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a valid JSON Web Encryption container.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let data = data.trim_ascii();
        if data.starts_with(b"{") {
            Self::from_json(data)
        } else {
            Self::from_compact(&String::from_utf8_lossy(data))
        }
    }

    /// Parses a [`Jwe`] from the compact serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - `data` does not consist of five base64url encoded parts,
    /// - or the protected header is not a JSON object.
    pub fn from_compact(data: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = data.trim().split('.').collect();
        let &[protected, encrypted_key, iv, ciphertext, tag] = parts.as_slice() else {
            return Err(Error::InvalidCompact { parts: parts.len() });
        };
        let header = merge_headers([&decode_protected(protected)?])?;
        Ok(Self {
            protected: protected.to_string(),
            header,
            encrypted_key: decode("encrypted_key", encrypted_key)?,
            iv: decode("iv", iv)?,
            ciphertext: decode("ciphertext", ciphertext)?,
            tag: decode("tag", tag)?,
            aad: None,
        })
    }

    /// Parses a [`Jwe`] from the flattened or general JSON serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - `data` is not a JSON object with the members of a JSON Web Encryption container,
    /// - more than one recipient is present,
    /// - or a header parameter occurs in more than one header.
    pub fn from_json(data: &[u8]) -> Result<Self, Error> {
        let mut raw: RawJwe = serde_json::from_slice(data)?;
        let (recipient_header, encrypted_key) = match raw.recipients.take() {
            Some(mut recipients) => {
                if recipients.len() != 1 {
                    return Err(Error::Recipients {
                        count: recipients.len(),
                    });
                }
                let recipient = recipients.remove(0);
                (recipient.header, recipient.encrypted_key)
            }
            None => (raw.header.take(), raw.encrypted_key.take()),
        };

        let protected = raw.protected.unwrap_or_default();
        let header = merge_headers(
            [
                Some(decode_protected(&protected)?),
                raw.unprotected,
                recipient_header,
            ]
            .iter()
            .flatten(),
        )?;

        Ok(Self {
            protected,
            header,
            encrypted_key: match encrypted_key {
                Some(encrypted_key) => decode("encrypted_key", &encrypted_key)?,
                None => Vec::new(),
            },
            iv: decode("iv", &raw.iv)?,
            ciphertext: decode("ciphertext", &raw.ciphertext)?,
            tag: decode("tag", &raw.tag)?,
            aad: raw.aad,
        })
    }

    /// Returns the content type ("cty") of the container.
    pub fn content_type(&self) -> Option<&str> {
        self.header.cty.as_deref()
    }

    /// Decrypts the container using `passphrase`.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - critical header parameters or compression are used,
    /// - the key management or content encryption algorithm is not supported,
    /// - the iteration count or the salt input are out of bounds,
    /// - the initialization vector or authentication tag have an invalid length,
    /// - or the passphrase is wrong or the container has been modified ([`Error::Decryption`]).
    pub fn decrypt(&self, passphrase: &Passphrase) -> Result<Zeroizing<Vec<u8>>, Error> {
        if let Some(names) = &self.header.crit {
            return Err(Error::CriticalHeader {
                names: names.clone(),
            });
        }
        if let Some(algorithm) = &self.header.zip {
            return Err(Error::Compression {
                algorithm: algorithm.clone(),
            });
        }
        let key_management = KeyManagement::new(
            self.header
                .alg
                .as_deref()
                .ok_or(Error::MissingMember { name: "alg" })?,
        )?;
        let content_encryption = ContentEncryption::new(
            self.header
                .enc
                .as_deref()
                .ok_or(Error::MissingMember { name: "enc" })?,
        )?;

        let count = self.header.p2c.ok_or(Error::MissingMember { name: "p2c" })?;
        let iterations = u32::try_from(count)
            .ok()
            .filter(|count| (MIN_ITERATIONS..=MAX_ITERATIONS).contains(count))
            .ok_or(Error::IterationCount { count })?;
        let salt_input = decode(
            "p2s",
            self.header
                .p2s
                .as_deref()
                .ok_or(Error::MissingMember { name: "p2s" })?,
        )?;
        if salt_input.len() < MIN_SALT_LENGTH {
            return Err(Error::SaltLength {
                length: salt_input.len(),
            });
        }
        for (member, value, expected) in [
            ("iv", &self.iv, IV_LENGTH),
            ("tag", &self.tag, TAG_LENGTH),
        ] {
            if value.len() != expected {
                return Err(Error::InvalidLength {
                    member,
                    expected,
                    actual: value.len(),
                });
            }
        }
        trace!(
            "Decrypting {} container with {} and {iterations} iterations",
            content_encryption.name(),
            key_management.name(),
        );

        let kek = key_management.derive_key(passphrase, &salt_input, iterations);
        let cek = key_management.unwrap(&kek, &self.encrypted_key)?;
        if cek.len() != content_encryption.key_length() {
            return Err(Error::Decryption);
        }

        let mut aad = self.protected.clone();
        if let Some(additional) = &self.aad {
            aad.push('.');
            aad.push_str(additional);
        }
        let mut ciphertext = self.ciphertext.clone();
        ciphertext.extend_from_slice(&self.tag);
        content_encryption.open(&cek, &self.iv, &ciphertext, aad.as_bytes())
    }
}

/// The content type of an encrypted payload
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display, strum::IntoStaticStr)]
pub enum ContentType {
    /// A single JSON Web Key
    #[default]
    #[strum(to_string = "jwk+json")]
    Jwk,

    /// A JSON Web Key Set
    #[strum(to_string = "jwk-set+json")]
    JwkSet,
}

/// The serialization of an encrypted container
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Serialization {
    /// The compact serialization (five base64url encoded parts separated by dots)
    #[default]
    Compact,

    /// The flattened JSON serialization
    Json,
}

/// Options for the encryption of keys and key sets
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptOptions {
    /// The PBKDF2 iteration count.
    pub iterations: u32,

    /// The content type of the payload.
    pub content_type: ContentType,

    /// The serialization of the container.
    pub serialization: Serialization,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            content_type: ContentType::default(),
            serialization: Serialization::default(),
        }
    }
}

/// Encrypts `plaintext` using `passphrase`.
///
/// The content encryption key is wrapped using `PBES2-HS256+A128KW` with a random salt input and
/// the content is encrypted using `A256GCM`.
///
/// # Errors
///
/// Returns an error if the iteration count of `options` is out of bounds.
///
/// # Examples
///
/// ```
/// use jose_crypto::Passphrase;
/// use jose_keys::jwe::{EncryptOptions, Jwe, encrypt};
///
/// # fn main() -> testresult::TestResult {
/// let passphrase = Passphrase::from("password");
/// let options = EncryptOptions {
///     iterations: 1000,
///     ..Default::default()
/// };
/// let container = encrypt(b"plaintext", &passphrase, &options)?;
/// let decrypted = Jwe::parse(container.as_bytes())?.decrypt(&passphrase)?;
/// assert_eq!(decrypted.as_slice(), b"plaintext");
/// # Ok(())
/// # }
/// ```
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &Passphrase,
    options: &EncryptOptions,
) -> Result<String, Error> {
    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&options.iterations) {
        return Err(Error::IterationCount {
            count: options.iterations.into(),
        });
    }
    let key_management = KeyManagement::Pbes2Hs256A128Kw;
    let content_encryption = ContentEncryption::A256Gcm;

    let mut salt_input = [0; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt_input);
    let mut cek = Zeroizing::new(vec![0; content_encryption.key_length()]);
    OsRng.fill_bytes(&mut cek);
    let mut iv = [0; IV_LENGTH];
    OsRng.fill_bytes(&mut iv);

    let header = Header {
        alg: Some(key_management.name().to_string()),
        enc: Some(content_encryption.name().to_string()),
        cty: Some(options.content_type.to_string()),
        p2c: Some(options.iterations.into()),
        p2s: Some(Base64UrlUnpadded::encode_string(&salt_input)),
        ..Default::default()
    };
    let protected = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&header)?);
    debug!(
        "Encrypting {} payload with {} iterations",
        options.content_type, options.iterations
    );

    let kek = key_management.derive_key(passphrase, &salt_input, options.iterations);
    let encrypted_key = key_management.wrap(&kek, &cek)?;
    let mut ciphertext = content_encryption.seal(&cek, &iv, plaintext, protected.as_bytes())?;
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LENGTH);

    Ok(match options.serialization {
        Serialization::Compact => [
            protected,
            Base64UrlUnpadded::encode_string(&encrypted_key),
            Base64UrlUnpadded::encode_string(&iv),
            Base64UrlUnpadded::encode_string(&ciphertext),
            Base64UrlUnpadded::encode_string(&tag),
        ]
        .join("."),
        Serialization::Json => serde_json::to_string(&RawJwe {
            protected: Some(protected),
            unprotected: None,
            header: None,
            encrypted_key: Some(Base64UrlUnpadded::encode_string(&encrypted_key)),
            recipients: None,
            aad: None,
            iv: Base64UrlUnpadded::encode_string(&iv),
            ciphertext: Base64UrlUnpadded::encode_string(&ciphertext),
            tag: Base64UrlUnpadded::encode_string(&tag),
        })?,
    })
}

/// Encrypts `key` using `passphrase`.
///
/// The content type of `options` is set to [`ContentType::Jwk`].
///
/// # Errors
///
/// Returns an error if `key` can not be encoded or the iteration count of `options` is out of
/// bounds.
pub fn encrypt_key(
    key: &JsonWebKey,
    passphrase: &Passphrase,
    options: &EncryptOptions,
) -> Result<String, Error> {
    let plaintext = Zeroizing::new(key.to_json()?);
    encrypt(
        plaintext.as_bytes(),
        passphrase,
        &EncryptOptions {
            content_type: ContentType::Jwk,
            ..options.clone()
        },
    )
}

/// Encrypts `set` using `passphrase`.
///
/// The content type of `options` is set to [`ContentType::JwkSet`].
///
/// # Errors
///
/// Returns an error if `set` can not be encoded or the iteration count of `options` is out of
/// bounds.
pub fn encrypt_key_set(
    set: &JsonWebKeySet,
    passphrase: &Passphrase,
    options: &EncryptOptions,
) -> Result<String, Error> {
    let plaintext = Zeroizing::new(set.to_json()?);
    encrypt(
        plaintext.as_bytes(),
        passphrase,
        &EncryptOptions {
            content_type: ContentType::JwkSet,
            ..options.clone()
        },
    )
}
