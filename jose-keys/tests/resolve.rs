//! Resolution of keys from the fixture files.

mod common;

use std::fs::{read, read_to_string, write};

use common::{fixture_path, fixture_source, init_logger};
use jose_crypto::{KeyFamily, KeyMaterial, Passphrase};
use jose_keys::{
    Algorithm,
    Error,
    JsonWebKey,
    KeySource,
    KeyUse,
    prompt,
    resolve_key,
    resolve_key_set,
    validate_key,
    validate_key_id,
    with_alg,
    with_default_prompter,
    with_kid,
    with_no_defaults,
    with_password,
    with_password_file,
    with_password_prompter,
    with_source_label,
    with_subtle,
    with_use,
};
use rstest::rstest;
use testdir::testdir;
use testresult::TestResult;

const OKP_KID: &str = "o1y3SOX5uTFFpibibFgpqWIKh6Je8O2o_pL3mnqliv4";
const P256_KID: &str = "GdvSP0cUY51nMCRO-bm0DMCIp1o5amPQsowNcFl_pcE";
const RSA_KID: &str = "id7ihiOC3JSnFzGb4a7mb8N34SNGynyUDT1crgaiOeI";
const JWKS_OKP_KID: &str = "qiCJG7r2L80rmWRrZMPfpanQHmZRcncOG7A7MBWn9qM";
const JWKS_P256_KID: &str = "yBMQvwoSqYkYo8skzuL2oF9clwRJKUzCqdt1bV2jXok";

fn expected(name: &str) -> TestResult<JsonWebKey> {
    Ok(JsonWebKey::from_json(&read(fixture_path(name))?)?)
}

#[rstest]
#[case::okp_public("okp.pub.json", OKP_KID, Algorithm::EdDsa, false)]
#[case::okp_private("okp.priv.json", OKP_KID, Algorithm::EdDsa, true)]
#[case::p256_public("p256.pub.json", P256_KID, Algorithm::Es256, false)]
#[case::p256_private("p256.priv.json", P256_KID, Algorithm::Es256, true)]
#[case::rsa_public("rsa.pub.json", RSA_KID, Algorithm::Rs256, false)]
#[case::rsa_private("rsa.priv.json", RSA_KID, Algorithm::Rs256, true)]
fn resolve_json_web_key(
    #[case] name: &str,
    #[case] kid: &str,
    #[case] algorithm: Algorithm,
    #[case] private: bool,
) -> TestResult {
    init_logger();
    let key = resolve_key(fixture_source(name), [])?;
    assert_eq!(key, expected(name)?);
    assert_eq!(key.key_id.as_deref(), Some(kid));
    assert_eq!(key.algorithm, Some(algorithm));
    assert_eq!(key.key_use, Some(KeyUse::Sig));
    assert_eq!(key.key.is_private(), private);
    assert!(key.certificates.is_empty());
    assert!(key.certificate_thumbprint_sha1.is_empty());
    assert!(key.certificate_thumbprint_sha256.is_empty());

    validate_key(&key)?;
    validate_key_id(&key)?;
    assert_eq!(key.thumbprint_sha256()?, kid);
    Ok(())
}

#[rstest]
#[case::okp_json("okp.enc.priv.json", "okp.priv.json")]
#[case::p256_compact("p256.enc.priv.compact", "p256.priv.json")]
fn resolve_encrypted_key(#[case] name: &str, #[case] plain: &str) -> TestResult {
    init_logger();
    let key = resolve_key(fixture_source(name), [with_password("password")])?;
    assert_eq!(key, expected(plain)?);

    let key = resolve_key(
        fixture_source(name),
        [with_password_file(fixture_path("passphrase.txt"))],
    )?;
    assert_eq!(key, expected(plain)?);

    let location = fixture_path(name).display().to_string();
    let key = resolve_key(
        fixture_source(name),
        [with_default_prompter(
            move |message: &str| -> Result<Passphrase, prompt::Error> {
                assert_eq!(
                    message,
                    format!("Please enter the password to decrypt {location}")
                );
                Ok(Passphrase::from("password"))
            },
        )],
    )?;
    assert_eq!(key, expected(plain)?);
    Ok(())
}

#[rstest]
#[case::okp_json("okp.enc.priv.json")]
#[case::p256_compact("p256.enc.priv.compact")]
#[case::key_set("jwks.enc.json")]
fn wrong_password(#[case] name: &str) -> TestResult {
    init_logger();
    let result = resolve_key(
        fixture_source(name),
        [with_password("wrong-password"), with_kid(JWKS_P256_KID)],
    );
    match result {
        Err(Error::AuthenticationFailure { location }) => {
            assert_eq!(location, fixture_path(name).display().to_string())
        }
        result => panic!("unexpected result: {result:?}"),
    }
    Ok(())
}

#[test]
fn cancelled_prompt() -> TestResult {
    init_logger();
    let result = resolve_key(
        fixture_source("okp.enc.priv.json"),
        [with_password_prompter(
            "",
            |_: &str| -> Result<Passphrase, prompt::Error> { Err(prompt::Error::Cancelled) },
        )],
    );
    assert!(matches!(
        result,
        Err(Error::Prompt {
            error: prompt::Error::Cancelled,
            ..
        })
    ));
    Ok(())
}

#[test]
fn password_file_with_newline() -> TestResult {
    init_logger();
    let path = testdir!().join("password");
    write(&path, "password\r\n")?;
    let key = resolve_key(
        fixture_source("okp.enc.priv.json"),
        [with_password_file(&path)],
    )?;
    assert_eq!(key, expected("okp.priv.json")?);
    Ok(())
}

#[test]
fn conflicting_password_sources() {
    assert!(matches!(
        resolve_key(
            fixture_source("okp.enc.priv.json"),
            [
                with_password("password"),
                with_password_file(fixture_path("passphrase.txt"))
            ],
        ),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn symmetric_key() -> TestResult {
    init_logger();
    let key = resolve_key(fixture_source("oct.json"), [with_alg("HS256")])?;
    assert_eq!(key.algorithm, Some(Algorithm::Hs256));
    assert_eq!(key.key_id, None);
    assert_eq!(key.family(), Some(KeyFamily::Symmetric));
    match &key.key {
        KeyMaterial::Symmetric(secret) => assert_eq!(secret.len(), 64),
        key => panic!("unexpected key material {key:?}"),
    }

    match resolve_key(fixture_source("oct.json"), []) {
        Err(error @ Error::Validation { .. }) => {
            assert!(error.to_string().contains("missing options"))
        }
        result => panic!("unexpected result: {result:?}"),
    }
    Ok(())
}

#[test]
fn raw_secret() -> TestResult {
    init_logger();
    let key = resolve_key(
        fixture_source("oct.txt"),
        [with_alg("HS256"), with_use("sig"), with_kid("secret")],
    )?;
    assert_eq!(key.algorithm, Some(Algorithm::Hs256));
    assert_eq!(key.key_use, Some(KeyUse::Sig));
    assert_eq!(key.key_id.as_deref(), Some("secret"));
    match &key.key {
        KeyMaterial::Symmetric(secret) => {
            assert_eq!(secret.as_bytes(), read(fixture_path("oct.txt"))?.as_slice())
        }
        key => panic!("unexpected key material {key:?}"),
    }

    assert!(matches!(
        resolve_key(fixture_source("oct.txt"), []),
        Err(Error::Classification { .. })
    ));
    Ok(())
}

#[test]
fn pem_keys() -> TestResult {
    init_logger();
    let private = resolve_key(fixture_source("ed25519.pem"), [])?;
    assert!(private.key.is_private());
    assert_eq!(private.algorithm, Some(Algorithm::EdDsa));
    assert_eq!(private.key_use, None);
    assert_eq!(private.key_id, Some(private.thumbprint_sha256()?));

    let public = resolve_key(fixture_source("ed25519.pub.pem"), [])?;
    assert!(public.key.is_public());
    assert_eq!(public, private.public()?);
    Ok(())
}

#[test]
fn encrypted_pem_key() -> TestResult {
    init_logger();
    let plain = resolve_key(fixture_source("ed25519.pem"), [])?;

    let key = resolve_key(fixture_source("ed25519.enc.pem"), [with_password("mypassword")])?;
    assert_eq!(key, plain);
    assert_eq!(key.algorithm, Some(Algorithm::EdDsa));

    let key = resolve_key(
        fixture_source("ed25519.enc.pem"),
        [with_password_file(fixture_path("password.txt"))],
    )?;
    assert_eq!(key, plain);

    assert!(matches!(
        resolve_key(fixture_source("ed25519.enc.pem"), [with_password("password")]),
        Err(Error::AuthenticationFailure { .. })
    ));
    Ok(())
}

#[test]
fn unencrypted_data_does_not_prompt() -> TestResult {
    init_logger();
    let prompter = |_: &str| -> Result<Passphrase, prompt::Error> {
        panic!("unencrypted keys must not ask for a password")
    };
    resolve_key(fixture_source("ed25519.pem"), [with_default_prompter(prompter)])?;
    resolve_key(fixture_source("okp.priv.json"), [with_default_prompter(prompter)])?;
    Ok(())
}

#[test]
fn legacy_encrypted_pem_does_not_prompt() {
    init_logger();
    let prompter = |_: &str| -> Result<Passphrase, prompt::Error> {
        panic!("legacy encrypted keys can not be decrypted with a password")
    };
    assert!(matches!(
        resolve_key(
            fixture_source("p256.legacy.enc.pem"),
            [with_default_prompter(prompter)]
        ),
        Err(Error::Pem {
            error: jose_crypto::pem::Error::LegacyEncryption,
            ..
        })
    ));
}

#[rstest]
#[case::okp(JWKS_OKP_KID, Algorithm::EdDsa, KeyFamily::Ed25519)]
#[case::p256(JWKS_P256_KID, Algorithm::Es256, KeyFamily::Ec(jose_crypto::EcCurve::P256))]
fn resolve_from_key_set(
    #[case] kid: &str,
    #[case] algorithm: Algorithm,
    #[case] family: KeyFamily,
) -> TestResult {
    init_logger();
    let key = resolve_key_set(fixture_source("jwks.json"), [with_kid(kid)])?;
    assert_eq!(key.key_id.as_deref(), Some(kid));
    assert_eq!(key.algorithm, Some(algorithm));
    assert_eq!(key.key_use, Some(KeyUse::Sig));
    assert_eq!(key.family(), Some(family));
    assert!(key.certificates.is_empty());

    // resolving a single key from a key set selects the key as well
    assert_eq!(resolve_key(fixture_source("jwks.json"), [with_kid(kid)])?, key);
    Ok(())
}

#[test]
fn resolve_from_encrypted_key_set() -> TestResult {
    init_logger();
    let key = resolve_key_set(
        fixture_source("jwks.enc.json"),
        [with_kid(JWKS_P256_KID), with_password("password")],
    )?;
    assert_eq!(
        key,
        resolve_key_set(fixture_source("jwks.json"), [with_kid(JWKS_P256_KID)])?
    );
    Ok(())
}

#[rstest]
#[case::duplicated(
    "duplicated",
    "multiple keys with kid duplicated have been found on testdata/jwks.json"
)]
#[case::missing("missing", "cannot find key with kid missing on testdata/jwks.json")]
fn key_set_errors(#[case] kid: &str, #[case] message: &str) -> TestResult {
    init_logger();
    let data = read(fixture_path("jwks.json"))?;
    match resolve_key_set(
        KeySource::from(data),
        [with_kid(kid), with_source_label("testdata/jwks.json")],
    ) {
        Err(error @ (Error::AmbiguousKey { .. } | Error::NotFound { .. })) => {
            assert_eq!(error.to_string(), message)
        }
        result => panic!("unexpected result: {result:?}"),
    }
    Ok(())
}

#[test]
fn duplicated_key_id_in_any_order() -> TestResult {
    init_logger();
    let mut set: serde_json::Value = serde_json::from_str(&read_to_string(fixture_path("jwks.json"))?)?;
    if let Some(keys) = set["keys"].as_array_mut() {
        keys.reverse();
    }
    assert!(matches!(
        resolve_key_set(
            KeySource::from(serde_json::to_vec(&set)?),
            [with_kid("duplicated")]
        ),
        Err(Error::AmbiguousKey { .. })
    ));
    Ok(())
}

#[test]
fn key_set_without_key_id() {
    assert!(matches!(
        resolve_key_set(fixture_source("jwks.json"), []),
        Err(Error::MissingKeyId { .. })
    ));
}

#[rstest]
#[case::same_family("ES256", false, Some(Algorithm::Es256))]
#[case::other_family("RS256", false, None)]
#[case::other_family_subtle("RS256", true, Some(Algorithm::Rs256))]
#[case::unknown("ES999", false, None)]
#[case::unknown_subtle("ES999", true, Some(Algorithm::from("ES999")))]
fn algorithm_override(
    #[case] algorithm: &str,
    #[case] subtle: bool,
    #[case] expected: Option<Algorithm>,
) -> TestResult {
    init_logger();
    let result = resolve_key(
        fixture_source("p256.priv.json"),
        [with_alg(algorithm), with_subtle(subtle)],
    );
    match expected {
        Some(expected) => assert_eq!(result?.algorithm, Some(expected)),
        None => assert!(matches!(result, Err(Error::Validation { .. }))),
    }
    Ok(())
}

#[test]
fn overrides_apply_to_key_sets() -> TestResult {
    init_logger();
    let key = resolve_key_set(
        fixture_source("jwks.json"),
        [with_kid(JWKS_P256_KID), with_use("enc"), with_alg("ECDH-ES")],
    )?;
    assert_eq!(key.key_use, Some(KeyUse::Enc));
    assert_eq!(key.algorithm, Some(Algorithm::EcdhEs));
    Ok(())
}

#[test]
fn key_id_override() -> TestResult {
    init_logger();
    let mut bare = expected("p256.priv.json")?;
    bare.key_id = None;
    let data = bare.to_json()?.into_bytes();

    let key = resolve_key(KeySource::from(data.clone()), [with_kid("custom")])?;
    assert_eq!(key.key_id.as_deref(), Some("custom"));

    let key = resolve_key(KeySource::from(data.clone()), [])?;
    assert_eq!(key.key_id.as_deref(), Some(P256_KID));

    let key = resolve_key(KeySource::from(data), [with_no_defaults(true)])?;
    assert_eq!(key.key_id, None);

    assert!(matches!(
        resolve_key(fixture_source("p256.priv.json"), [with_kid("custom")]),
        Err(Error::Validation { .. })
    ));
    Ok(())
}

#[test]
fn unknown_data() {
    init_logger();
    assert!(matches!(
        resolve_key(KeySource::from(b"\x00\x01\x02".as_slice()), []),
        Err(Error::Classification { .. })
    ));
    assert!(matches!(
        resolve_key(fixture_source("empty.json"), []),
        Err(Error::Classification { .. })
    ));
}
