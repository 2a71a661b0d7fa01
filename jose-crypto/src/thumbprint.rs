//! JSON Web Key thumbprints ([RFC 7638]).
//!
//! A thumbprint is a digest over the required public members of a key, serialized as JSON with
//! lexicographically ordered member names and without whitespace.
//! Private keys and their public halves therefore share a thumbprint.
//!
//! [RFC 7638]: https://www.rfc-editor.org/rfc/rfc7638

use base64ct::{Base64UrlUnpadded, Encoding};
use digest::Digest;
use sha2::Sha256;

use crate::key::{Error, KeyMaterial, PublicKeyMaterial};

/// Returns the canonical JSON members of `key`, over which its thumbprint is computed.
///
/// The members are
///
/// - `crv`, `kty`, `x` and `y` for elliptic curve keys,
/// - `e`, `kty` and `n` for RSA keys,
/// - `crv`, `kty` and `x` for Ed25519 and X25519 keys,
/// - `k` and `kty` for symmetric secrets.
///
/// # Errors
///
/// Returns an error if `key` is an opaque signer without public key.
pub fn canonical_members(key: &KeyMaterial) -> Result<String, Error> {
    if let KeyMaterial::Symmetric(secret) = key {
        return Ok(format!(
            r#"{{"k":"{}","kty":"oct"}}"#,
            Base64UrlUnpadded::encode_string(secret.as_bytes())
        ));
    }

    let public = key.public_key().ok_or(Error::NoPublicKey)?;
    Ok(match &public {
        PublicKeyMaterial::P256(_) | PublicKeyMaterial::P384(_) | PublicKeyMaterial::P521(_) => {
            let (curve, x, y) = public.ec_coordinates().ok_or(Error::NoPublicKey)?;
            format!(
                r#"{{"crv":"{curve}","kty":"EC","x":"{}","y":"{}"}}"#,
                Base64UrlUnpadded::encode_string(&x),
                Base64UrlUnpadded::encode_string(&y),
            )
        }
        PublicKeyMaterial::Rsa(_) => {
            let (n, e) = public.rsa_components().ok_or(Error::NoPublicKey)?;
            format!(
                r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
                Base64UrlUnpadded::encode_string(&e),
                Base64UrlUnpadded::encode_string(&n),
            )
        }
        PublicKeyMaterial::Ed25519(_) | PublicKeyMaterial::X25519(_) => {
            let crv = public.family().to_string();
            let x = public.okp_bytes().ok_or(Error::NoPublicKey)?;
            format!(
                r#"{{"crv":"{crv}","kty":"OKP","x":"{}"}}"#,
                Base64UrlUnpadded::encode_string(&x),
            )
        }
    })
}

/// Computes the thumbprint of `key` using the digest `D`.
///
/// # Errors
///
/// Returns an error if `key` is an opaque signer without public key.
///
/// # Examples
///
/// ```
/// use jose_crypto::{KeyMaterial, SymmetricKey, thumbprint::thumbprint};
/// use sha2::Sha512;
///
/// # fn main() -> testresult::TestResult {
/// let key = KeyMaterial::Symmetric(SymmetricKey::new(b"secret".to_vec()));
/// assert_eq!(thumbprint::<Sha512>(&key)?.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn thumbprint<D: Digest>(key: &KeyMaterial) -> Result<Vec<u8>, Error> {
    Ok(D::digest(canonical_members(key)?.as_bytes()).to_vec())
}

/// Computes the SHA-256 thumbprint of `key`, encoded as unpadded base64url.
///
/// This is the form used as key identifier.
///
/// # Errors
///
/// Returns an error if `key` is an opaque signer without public key.
pub fn thumbprint_sha256_base64url(key: &KeyMaterial) -> Result<String, Error> {
    Ok(Base64UrlUnpadded::encode_string(&thumbprint::<Sha256>(key)?))
}

#[cfg(test)]
mod tests {
    use sha1::Sha1;
    use testresult::TestResult;

    use super::*;
    use crate::key::{PrivateKeyMaterial, SymmetricKey};

    /// The RSA key of the example in section 3.1 of RFC 7638.
    const RFC7638_N: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

    #[test]
    fn rfc7638_example() -> TestResult {
        let key = KeyMaterial::Public(PublicKeyMaterial::from_rsa_components(
            &Base64UrlUnpadded::decode_vec(RFC7638_N)?,
            &Base64UrlUnpadded::decode_vec("AQAB")?,
        )?);
        assert_eq!(
            canonical_members(&key)?,
            format!(r#"{{"e":"AQAB","kty":"RSA","n":"{RFC7638_N}"}}"#)
        );
        assert_eq!(
            thumbprint_sha256_base64url(&key)?,
            "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs"
        );
        Ok(())
    }

    #[test]
    fn symmetric_members() -> TestResult {
        let key = KeyMaterial::Symmetric(SymmetricKey::new(vec![0xfb, 0xff]));
        assert_eq!(canonical_members(&key)?, r#"{"k":"-_8","kty":"oct"}"#);
        Ok(())
    }

    #[test]
    fn okp_members() -> TestResult {
        let key = KeyMaterial::Private(PrivateKeyMaterial::from_x25519_bytes(&[3; 32])?);
        let members = canonical_members(&key)?;
        assert!(members.starts_with(r#"{"crv":"X25519","kty":"OKP","x":""#));
        assert!(!members.contains(r#""d""#));
        Ok(())
    }

    #[test]
    fn private_and_public_thumbprints_are_equal() -> TestResult {
        let private = KeyMaterial::Private(PrivateKeyMaterial::from_ed25519_bytes(&[5; 32])?);
        let public = private.to_public()?;
        assert_eq!(thumbprint::<Sha1>(&private)?, thumbprint::<Sha1>(&public)?);
        assert_eq!(
            thumbprint_sha256_base64url(&private)?,
            thumbprint_sha256_base64url(&public)?
        );
        Ok(())
    }
}
