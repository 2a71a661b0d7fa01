//! Resolution of key data into keys.

use jose_crypto::{
    KeyMaterial,
    SymmetricKey,
    pem::{decode_pem, is_encrypted},
};
use log::{debug, info};
use zeroize::Zeroizing;

use crate::{
    Error,
    classify::{Format, Target, classify},
    jwe::Jwe,
    jwk::{JsonWebKey, JsonWebKeySet},
    keyset::select_key,
    normalize::normalize,
    options::{Context, KeyOption},
    password::acquire_password,
    source::KeySource,
};

/// The number of encryption layers, that are removed from key data.
const MAX_DECRYPTIONS: usize = 1;

/// Resolves a single key from `source`.
///
/// The data of `source` may be a JSON Web Key, a PEM encoded key, a JSON Web Encryption
/// container protecting one of them, or the raw bytes of a symmetric secret (if a symmetric
/// algorithm is set with [`crate::with_alg`]).
/// If the data is a JSON Web Key Set, the key with the key ID set by [`crate::with_kid`] is
/// selected.
///
/// Missing algorithms and key IDs are inferred, unless [`crate::with_no_defaults`] is used.
///
/// # Errors
///
/// Returns an error if
///
/// - `options` are conflicting ([`Error::Configuration`]),
/// - the data can not be read or fetched ([`Error::Io`], [`Error::Network`]),
/// - the format of the data can not be determined ([`Error::Classification`]),
/// - the password is wrong ([`Error::AuthenticationFailure`]),
/// - the key is invalid or does not fit the options ([`Error::Validation`]),
/// - or the data is a key set, from which no single key can be selected.
///
/// # Examples
///
/// ```
/// use jose_keys::{Algorithm, KeySource, resolve_key, with_alg};
///
/// # fn main() -> testresult::TestResult {
/// let data = br#"{"kty":"oct","k":"c2VjcmV0LXNlY3JldC1zZWNyZXQtc2VjcmV0"}"#;
/// let key = resolve_key(KeySource::from(data.as_slice()), [with_alg("HS256")])?;
/// assert_eq!(key.algorithm, Some(Algorithm::Hs256));
/// assert_eq!(key.key_id, None);
///
/// // symmetric keys require an algorithm
/// assert!(resolve_key(KeySource::from(data.as_slice()), []).is_err());
/// # Ok(())
/// # }
/// ```
pub fn resolve_key(
    source: impl Into<KeySource>,
    options: impl IntoIterator<Item = KeyOption>,
) -> Result<JsonWebKey, Error> {
    let context = Context::apply(options)?;
    resolve(source.into(), &context, Target::Key)
}

/// Resolves the key with the key ID set by [`crate::with_kid`] from the key set at `source`.
///
/// The key set may be protected by a JSON Web Encryption container.
///
/// # Errors
///
/// Returns an error if
///
/// - no key ID is set ([`Error::MissingKeyId`]),
/// - no key or more than one key with the key ID exists ([`Error::NotFound`],
///   [`Error::AmbiguousKey`]),
/// - or one of the errors of [`resolve_key`] occurs.
pub fn resolve_key_set(
    source: impl Into<KeySource>,
    options: impl IntoIterator<Item = KeyOption>,
) -> Result<JsonWebKey, Error> {
    let context = Context::apply(options)?;
    let source = source.into();
    if context.key_id().is_none() {
        return Err(Error::MissingKeyId {
            location: label(&source, &context),
        });
    }
    resolve(source, &context, Target::KeySet)
}

/// Returns the label of `source` used in messages.
fn label(source: &KeySource, context: &Context) -> String {
    match context.source_label() {
        Some(label) => label.to_string(),
        None => source.location(),
    }
}

/// Reads the data of `source`.
fn load(source: &KeySource, context: &Context) -> Result<Vec<u8>, Error> {
    match source {
        KeySource::Path(path) => std::fs::read(path).map_err(|error| Error::Io {
            path: path.clone(),
            error,
        }),
        KeySource::Url(url) => {
            let data = context
                .fetcher()
                .fetch(url)
                .map_err(|error| Error::Network {
                    url: url.to_string(),
                    error,
                })?;
            info!("Fetched {} bytes from {url}", data.len());
            Ok(data)
        }
        KeySource::Bytes(bytes) => Ok(bytes.clone()),
    }
}

/// Resolves the data of `source` to a key.
///
/// Data is classified and, if it is encrypted, decrypted and classified again.
fn resolve(source: KeySource, context: &Context, target: Target) -> Result<JsonWebKey, Error> {
    let location = label(&source, context);
    let mut data = Zeroizing::new(load(&source, context)?);
    let mut decryptions = 0;

    loop {
        let format = classify(&data, context, target, &location)?;
        debug!("Found {} data in {location}", <&str>::from(format));

        match (format, target) {
            (Format::Jwe, _) => {
                if decryptions == MAX_DECRYPTIONS {
                    return Err(Error::classification(
                        &location,
                        "encrypted data contains another encrypted container",
                    ));
                }
                let jwe = Jwe::parse(&data).map_err(|error| Error::jwe(&location, error))?;
                let passphrase = acquire_password(context, &location)?;
                data = jwe
                    .decrypt(&passphrase)
                    .map_err(|error| Error::jwe(&location, error))?;
                decryptions += 1;
                debug!("Decrypted {location}");
            }
            (Format::KeySet, _) => {
                let Some(kid) = context.key_id() else {
                    return Err(Error::MissingKeyId { location });
                };
                let set =
                    JsonWebKeySet::from_json(&data).map_err(|error| Error::jwk(&location, error))?;
                return select_key(&set, kid, context, &location);
            }
            (format, Target::KeySet) => {
                return Err(Error::classification(
                    &location,
                    format!(
                        "expected a key set, but found {} data",
                        <&str>::from(format)
                    ),
                ));
            }
            (Format::Jwk, Target::Key) => {
                let key = JsonWebKey::from_json(&data).map_err(|error| Error::jwk(&location, error))?;
                return normalize(key, context, &location);
            }
            (Format::Pem, Target::Key) => {
                let passphrase = if is_encrypted(&data) {
                    Some(acquire_password(context, &location)?)
                } else {
                    None
                };
                let key = decode_pem(&data, passphrase.as_ref())
                    .map_err(|error| Error::pem(&location, error))?;
                return normalize(JsonWebKey::new(key), context, &location);
            }
            (Format::RawSecret, Target::Key) => {
                let key = KeyMaterial::Symmetric(SymmetricKey::new(data.to_vec()));
                return normalize(JsonWebKey::new(key), context, &location);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use jose_crypto::Passphrase;
    use testresult::TestResult;

    use super::*;
    use crate::{
        algorithm::Algorithm,
        jwe::{EncryptOptions, Serialization, encrypt},
        options::{with_alg, with_kid, with_password, with_source_label},
    };

    const OKP: &[u8] = include_bytes!("../tests/fixtures/okp.priv.json");

    #[test]
    fn key_from_bytes() -> TestResult {
        let key = resolve_key(KeySource::from(OKP), [])?;
        assert_eq!(key, JsonWebKey::from_json(OKP)?);
        Ok(())
    }

    #[test]
    fn missing_file() {
        let path = PathBuf::from("/nonexistent/key.json");
        match resolve_key(path.clone(), []) {
            Err(Error::Io { path: actual, .. }) => assert_eq!(actual, path),
            result => panic!("unexpected result: {result:?}"),
        }
    }

    #[test]
    fn key_set_requires_key_id() {
        assert!(matches!(
            resolve_key_set(PathBuf::from("/nonexistent/jwks.json"), []),
            Err(Error::MissingKeyId { location }) if location == "/nonexistent/jwks.json"
        ));
        assert!(matches!(
            resolve_key(KeySource::from(b"{\"keys\":[]}".as_slice()), []),
            Err(Error::MissingKeyId { .. })
        ));
    }

    #[test]
    fn single_key_is_not_a_key_set() {
        assert!(matches!(
            resolve_key_set(KeySource::from(OKP), [with_kid("kid")]),
            Err(Error::Classification { .. })
        ));
    }

    #[test]
    fn source_label_names_source() {
        match resolve_key(
            KeySource::from(b"garbage".as_slice()),
            [with_source_label("vault://key")],
        ) {
            Err(Error::Classification { location, .. }) => assert_eq!(location, "vault://key"),
            result => panic!("unexpected result: {result:?}"),
        }
    }

    #[test]
    fn raw_secret() -> TestResult {
        let key = resolve_key(KeySource::from(b"secret".as_slice()), [with_alg("HS384")])?;
        assert_eq!(key.algorithm, Some(Algorithm::Hs384));
        assert_eq!(key.key_id, None);
        match &key.key {
            KeyMaterial::Symmetric(secret) => assert_eq!(secret.as_bytes(), b"secret"),
            key => panic!("unexpected key material {key:?}"),
        }
        Ok(())
    }

    #[test]
    fn nested_containers_are_rejected() -> TestResult {
        let passphrase = Passphrase::from("password");
        let options = EncryptOptions {
            iterations: 1000,
            serialization: Serialization::Compact,
            ..Default::default()
        };
        let inner = encrypt(OKP, &passphrase, &options)?;
        let outer = encrypt(inner.as_bytes(), &passphrase, &options)?;

        assert!(matches!(
            resolve_key(KeySource::from(outer.into_bytes()), [with_password("password")]),
            Err(Error::Classification { .. })
        ));
        assert_eq!(
            resolve_key(KeySource::from(inner.into_bytes()), [with_password("password")])?,
            JsonWebKey::from_json(OKP)?
        );
        Ok(())
    }
}
