//! Completion of parsed keys with overrides and inferred members.

use log::{debug, warn};

use crate::{
    Error,
    algorithm::infer_algorithm,
    jwk::JsonWebKey,
    options::Context,
    validate::{self, validate_algorithm, validate_key_id},
};

/// Applies the overrides of `context` to `key` and infers missing members.
///
/// The following steps are applied in order:
///
/// 1. a key ID of `context` is set, unless `key` declares a different one,
/// 2. a key use of `context` replaces the declared one,
/// 3. an algorithm of `context` replaces the declared one; it must fit the key family unless
///    subtle mode is used, otherwise a missing algorithm of an asymmetric key is inferred,
/// 4. a missing key ID of an asymmetric key is set to its SHA-256 thumbprint,
/// 5. symmetric keys must have an algorithm,
/// 6. the key ID of a private key is verified against its thumbprint, if requested and the key
///    ID is not the one of `context`.
///
/// Inference (steps 3 and 4) is skipped if `context` disables defaults.
///
/// # Errors
///
/// Returns an [`Error::Validation`] naming `location` if one of the checks fails.
pub(crate) fn normalize(
    mut key: JsonWebKey,
    context: &Context,
    location: &str,
) -> Result<JsonWebKey, Error> {
    if let Some(kid) = context.key_id() {
        match key.key_id.as_deref() {
            Some(declared) if declared != kid => {
                return Err(Error::validation(
                    location,
                    validate::Error::KeyIdMismatch {
                        declared: declared.to_string(),
                        requested: kid.to_string(),
                    },
                ));
            }
            _ => key.key_id = Some(kid.to_string()),
        }
    }

    if let Some(key_use) = context.key_use() {
        key.key_use = Some(key_use);
    }

    let defaults = !context.no_defaults() && !key.key.is_symmetric();
    if let Some(algorithm) = context.algorithm() {
        if context.is_subtle() {
            warn!("Using algorithm {algorithm} for the key from {location} without validation");
        } else {
            validate_algorithm(algorithm, key.family())
                .map_err(|reason| Error::validation(location, reason))?;
        }
        key.algorithm = Some(algorithm.clone());
    } else if key.algorithm.is_none() && defaults {
        key.algorithm = infer_algorithm(&key.key, key.key_use);
        if let Some(algorithm) = &key.algorithm {
            debug!("Inferred algorithm {algorithm} for the key from {location}");
        }
    }

    if key.key_id.is_none() && defaults && key.family().is_some() {
        let thumbprint = key
            .thumbprint_sha256()
            .map_err(|error| Error::jwk(location, error))?;
        debug!("Using thumbprint {thumbprint} as key ID for the key from {location}");
        key.key_id = Some(thumbprint);
    }

    if key.key.is_symmetric() && key.algorithm.is_none() {
        return Err(Error::validation(location, validate::Error::MissingAlgorithm));
    }

    if context.verify_key_id() && context.key_id().is_none() {
        validate_key_id(&key).map_err(|reason| Error::validation(location, reason))?;
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use jose_crypto::{KeyMaterial, SymmetricKey};
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;
    use crate::{
        algorithm::{Algorithm, KeyUse},
        options::{
            KeyOption,
            with_alg,
            with_kid,
            with_no_defaults,
            with_subtle,
            with_use,
            with_verify_key_id,
        },
    };

    const P256: &[u8] = include_bytes!("../tests/fixtures/p256.priv.json");
    const P256_KID: &str = "GdvSP0cUY51nMCRO-bm0DMCIp1o5amPQsowNcFl_pcE";

    /// Returns the P-256 fixture without key ID and algorithm.
    fn bare_p256() -> TestResult<JsonWebKey> {
        let mut key = JsonWebKey::from_json(P256)?;
        key.key_id = None;
        key.algorithm = None;
        key.key_use = None;
        Ok(key)
    }

    fn normalize_with(
        key: JsonWebKey,
        options: impl IntoIterator<Item = KeyOption>,
    ) -> Result<JsonWebKey, Error> {
        let context = Context::apply(options)?;
        normalize(key, &context, "test")
    }

    #[test]
    fn infers_algorithm_and_key_id() -> TestResult {
        let key = normalize_with(bare_p256()?, [])?;
        assert_eq!(key.algorithm, Some(Algorithm::Es256));
        assert_eq!(key.key_id.as_deref(), Some(P256_KID));
        Ok(())
    }

    #[test]
    fn infers_from_key_use() -> TestResult {
        let key = normalize_with(bare_p256()?, [with_use("enc")])?;
        assert_eq!(key.key_use, Some(KeyUse::Enc));
        assert_eq!(key.algorithm, Some(Algorithm::EcdhEs));
        Ok(())
    }

    #[test]
    fn no_defaults_keeps_parsed_members() -> TestResult {
        let key = normalize_with(bare_p256()?, [with_no_defaults(true)])?;
        assert_eq!(key, bare_p256()?);

        let key = normalize_with(bare_p256()?, [with_no_defaults(true), with_alg("ES256")])?;
        assert_eq!(key.algorithm, Some(Algorithm::Es256));
        assert_eq!(key.key_id, None);
        Ok(())
    }

    #[test]
    fn declared_algorithm_is_kept() -> TestResult {
        let mut key = bare_p256()?;
        key.algorithm = Some(Algorithm::EcdhEsA128Kw);
        let key = normalize_with(key, [])?;
        assert_eq!(key.algorithm, Some(Algorithm::EcdhEsA128Kw));
        Ok(())
    }

    #[rstest]
    #[case("ES256", false, Some(Algorithm::Es256))]
    #[case("ECDH-ES", false, Some(Algorithm::EcdhEs))]
    #[case("RS256", false, None)]
    #[case("FOO", false, None)]
    #[case("RS256", true, Some(Algorithm::Rs256))]
    #[case("FOO", true, Some(Algorithm::from("FOO")))]
    fn algorithm_override(
        #[case] algorithm: &str,
        #[case] subtle: bool,
        #[case] expected: Option<Algorithm>,
    ) -> TestResult {
        let result = normalize_with(bare_p256()?, [with_alg(algorithm), with_subtle(subtle)]);
        match expected {
            Some(expected) => assert_eq!(result?.algorithm, Some(expected)),
            None => assert!(matches!(result, Err(Error::Validation { .. }))),
        }
        Ok(())
    }

    #[test]
    fn key_id_override() -> TestResult {
        let key = normalize_with(bare_p256()?, [with_kid("my-key")])?;
        assert_eq!(key.key_id.as_deref(), Some("my-key"));

        let mut key = bare_p256()?;
        key.key_id = Some("declared".to_string());
        assert!(matches!(
            normalize_with(key, [with_kid("my-key")]),
            Err(Error::Validation {
                reason: validate::Error::KeyIdMismatch { .. },
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn symmetric_keys_need_an_algorithm() -> TestResult {
        let secret = || JsonWebKey::new(KeyMaterial::Symmetric(SymmetricKey::new(vec![7; 64])));
        match normalize_with(secret(), []) {
            Err(error) => assert!(error.to_string().contains("missing options")),
            Ok(key) => panic!("unexpected key {key:?}"),
        }

        let key = normalize_with(secret(), [with_alg("HS256")])?;
        assert_eq!(key.algorithm, Some(Algorithm::Hs256));
        assert_eq!(key.key_id, None);
        Ok(())
    }

    #[test]
    fn verify_key_id() -> TestResult {
        let mut key = JsonWebKey::from_json(P256)?;
        normalize_with(key.clone(), [with_verify_key_id(true)])?;

        key.key_id = Some("other".to_string());
        assert!(matches!(
            normalize_with(key.clone(), [with_verify_key_id(true)]),
            Err(Error::Validation {
                reason: validate::Error::ThumbprintMismatch { .. },
                ..
            })
        ));

        // a key ID from the options is trusted
        normalize_with(key, [with_verify_key_id(true), with_kid("other")])?;
        Ok(())
    }
}
