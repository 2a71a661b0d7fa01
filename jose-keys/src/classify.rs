//! Detection of the format of key data.

use base64ct::{Base64UrlUnpadded, Encoding};
use jose_crypto::pem::is_pem;
use serde_json::{Map, Value};
use strum::IntoStaticStr;

use crate::{Error, options::Context};

/// The format of key data
#[derive(Clone, Copy, Debug, Eq, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// A JSON Web Encryption container in compact or JSON serialization
    Jwe,

    /// A JSON Web Key Set
    KeySet,

    /// A single JSON Web Key
    Jwk,

    /// A PEM encoded key
    Pem,

    /// The raw bytes of a symmetric secret
    RawSecret,
}

/// What a resolution is looking for
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    /// A single key
    Key,

    /// A key set, from which a key is selected
    KeySet,
}

/// Returns the members of `data`, if it is a JSON object.
fn json_object(data: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice(data) {
        Ok(Value::Object(members)) => Some(members),
        _ => None,
    }
}

/// Returns whether `data` is a JSON Web Encryption container in compact serialization.
///
/// The data must consist of five base64url parts and the first one must decode to a JSON object
/// with an "enc" member.
fn is_compact_jwe(data: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(data) else {
        return false;
    };
    let parts: Vec<&str> = text.trim().split('.').collect();
    if parts.len() != 5 {
        return false;
    }
    Base64UrlUnpadded::decode_vec(parts[0])
        .ok()
        .and_then(|header| json_object(&header))
        .is_some_and(|header| header.contains_key("enc"))
}

/// Determines the [`Format`] of `data`.
///
/// Checks are done in order and the first match wins:
///
/// 1. a JSON object with a "ciphertext" member, or a compact serialization is a JWE,
/// 2. a JSON object with a "keys" member is a key set,
/// 3. a JSON object with a "kty" member is a key,
/// 4. a JSON object with neither is an empty key set if `target` is [`Target::KeySet`],
/// 5. PEM encoded data is a PEM key,
/// 6. any other non-empty data is a raw secret, if the algorithm of `context` is a symmetric one.
///
/// # Errors
///
/// Returns an [`Error::Classification`] naming `location` if none of the checks matches.
pub fn classify(
    data: &[u8],
    context: &Context,
    target: Target,
    location: &str,
) -> Result<Format, Error> {
    if let Some(members) = json_object(data) {
        return if members.contains_key("ciphertext") {
            Ok(Format::Jwe)
        } else if members.contains_key("keys") {
            Ok(Format::KeySet)
        } else if members.contains_key("kty") {
            Ok(Format::Jwk)
        } else if target == Target::KeySet {
            Ok(Format::KeySet)
        } else {
            Err(Error::classification(
                location,
                "cannot determine key type, the JSON object is neither a key nor a key set",
            ))
        };
    }
    if is_compact_jwe(data) {
        return Ok(Format::Jwe);
    }
    if is_pem(data) {
        return Ok(Format::Pem);
    }
    if data.is_empty() {
        return Err(Error::classification(location, "cannot determine key type, no data"));
    }
    match context.algorithm() {
        Some(algorithm) if algorithm.is_symmetric() => Ok(Format::RawSecret),
        Some(_) => Err(Error::classification(
            location,
            "cannot determine key type, raw data requires a symmetric algorithm",
        )),
        None => Err(Error::classification(
            location,
            "cannot determine key type, missing options",
        )),
    }
}
