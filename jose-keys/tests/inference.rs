//! Inference of algorithms and key IDs for resolved keys.

mod common;

use common::{fixture_path, fixture_source, init_logger};
use jose_crypto::{
    EcCurve,
    KeyMaterial,
    OpaqueKey,
    OpaqueSigner,
    PrivateKeyMaterial,
    PublicKeyMaterial,
    SoftwareSigner,
    SymmetricKey,
    signer,
};
use jose_keys::{
    Algorithm,
    Error,
    JsonWebKey,
    KeySource,
    KeyUse,
    infer_algorithm,
    resolve_key,
    with_alg,
    with_kid,
    with_no_defaults,
    with_use,
    with_verify_key_id,
};
use rstest::rstest;
use testresult::TestResult;

/// Returns a private key of `family`.
///
/// The RSA key is taken from a fixture.
fn private_key(family: &str) -> TestResult<PrivateKeyMaterial> {
    Ok(match family {
        "P-256" => PrivateKeyMaterial::from_ec_scalar(EcCurve::P256, &[1; 32])?,
        "P-384" => PrivateKeyMaterial::from_ec_scalar(EcCurve::P384, &[1; 48])?,
        "P-521" => PrivateKeyMaterial::from_ec_scalar(EcCurve::P521, &[1; 66])?,
        "RSA" => {
            let key = JsonWebKey::from_json(&std::fs::read(fixture_path("rsa.priv.json"))?)?;
            match key.key {
                KeyMaterial::Private(private) => private,
                key => panic!("unexpected key material {key:?}"),
            }
        }
        "Ed25519" => PrivateKeyMaterial::from_ed25519_bytes(&[7; 32])?,
        "X25519" => PrivateKeyMaterial::from_x25519_bytes(&[9; 32])?,
        family => panic!("unknown family {family}"),
    })
}

/// Serializes `key` without any optional members.
fn bare(key: impl Into<KeyMaterial>) -> TestResult<KeySource> {
    Ok(KeySource::from(JsonWebKey::new(key).to_json()?.into_bytes()))
}

#[rstest]
#[case::p256("P-256", Algorithm::Es256, Algorithm::EcdhEs)]
#[case::p384("P-384", Algorithm::Es384, Algorithm::EcdhEs)]
#[case::p521("P-521", Algorithm::Es512, Algorithm::EcdhEs)]
#[case::rsa("RSA", Algorithm::Rs256, Algorithm::RsaOaep256)]
#[case::ed25519("Ed25519", Algorithm::EdDsa, Algorithm::EdDsa)]
#[case::x25519("X25519", Algorithm::XEdDsa, Algorithm::XEdDsa)]
fn infer_asymmetric_algorithms(
    #[case] family: &str,
    #[case] signature: Algorithm,
    #[case] encryption: Algorithm,
) -> TestResult {
    init_logger();
    let private = private_key(family)?;
    let public = private.public();

    for source in [bare(private.clone())?, bare(public.clone())?] {
        let key = resolve_key(source.clone(), [])?;
        assert_eq!(key.algorithm.as_ref(), Some(&signature));
        assert_eq!(key.key_use, None);

        let key = resolve_key(source.clone(), [with_use("sig")])?;
        assert_eq!(key.algorithm.as_ref(), Some(&signature));
        assert_eq!(key.key_use, Some(KeyUse::Sig));

        let key = resolve_key(source, [with_use("enc")])?;
        assert_eq!(key.algorithm.as_ref(), Some(&encryption));
        assert_eq!(key.key_use, Some(KeyUse::Enc));
    }

    // private and public keys share their key ID
    let private = resolve_key(bare(private)?, [])?;
    let public = resolve_key(bare(public)?, [])?;
    assert_eq!(private.key_id, public.key_id);
    assert_eq!(private.key_id, Some(public.thumbprint_sha256()?));
    Ok(())
}

#[rstest]
#[case::signature(None, Algorithm::Hs256)]
#[case::explicit_signature(Some(KeyUse::Sig), Algorithm::Hs256)]
#[case::encryption(Some(KeyUse::Enc), Algorithm::A256GcmKw)]
fn infer_symmetric_algorithms(#[case] key_use: Option<KeyUse>, #[case] algorithm: Algorithm) {
    let key = KeyMaterial::Symmetric(SymmetricKey::new(b"a true random password".to_vec()));
    assert_eq!(infer_algorithm(&key, key_use), Some(algorithm));
}

#[test]
fn symmetric_keys_are_not_completed() -> TestResult {
    init_logger();
    // an algorithm is never inferred for a symmetric key during resolution
    match resolve_key(fixture_source("oct.json"), [with_use("enc")]) {
        Err(Error::Validation { reason, .. }) => {
            assert!(reason.to_string().starts_with("missing options"))
        }
        result => panic!("unexpected result: {result:?}"),
    }

    let key = resolve_key(fixture_source("oct.json"), [with_alg("A256GCMKW"), with_use("enc")])?;
    assert_eq!(key.algorithm, Some(Algorithm::A256GcmKw));
    assert_eq!(key.key_id, None);
    Ok(())
}

#[rstest]
#[case::p256("P-256", Algorithm::Es256, true)]
#[case::rsa("RSA", Algorithm::Rs256, true)]
#[case::ed25519("Ed25519", Algorithm::EdDsa, true)]
#[case::x25519("X25519", Algorithm::XEdDsa, false)]
fn infer_from_opaque_signer(
    #[case] family: &str,
    #[case] algorithm: Algorithm,
    #[case] signs: bool,
) -> TestResult {
    init_logger();
    let private = private_key(family)?;
    let software = resolve_key(bare(private.clone())?, [])?;

    let signer = OpaqueKey::new(SoftwareSigner::new(private));
    let key = JsonWebKey::new(KeyMaterial::Opaque(signer.clone()));
    assert_eq!(infer_algorithm(&key.key, None), Some(algorithm.clone()));
    assert_eq!(infer_algorithm(&key.key, Some(KeyUse::Sig)), Some(algorithm));
    assert_eq!(key.thumbprint_sha256()?, software.thumbprint_sha256()?);
    assert_eq!(signer.sign(b"message").is_ok(), signs);
    Ok(())
}

/// A signer, that does not reveal its public key.
struct Blind;

impl OpaqueSigner for Blind {
    fn public(&self) -> Option<PublicKeyMaterial> {
        None
    }

    fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, signer::Error> {
        Err(signer::Error::MissingKey)
    }
}

#[test]
fn opaque_signer_without_public_key() {
    let key = KeyMaterial::Opaque(OpaqueKey::new(Blind));
    assert_eq!(key.family(), None);
    assert_eq!(infer_algorithm(&key, None), None);
    assert_eq!(infer_algorithm(&key, Some(KeyUse::Enc)), None);
}

#[test]
fn declared_algorithm_is_kept() -> TestResult {
    init_logger();
    let mut key = JsonWebKey::new(private_key("P-256")?);
    key.algorithm = Some(Algorithm::EcdhEs);
    let key = resolve_key(KeySource::from(key.to_json()?.into_bytes()), [with_use("sig")])?;
    assert_eq!(key.algorithm, Some(Algorithm::EcdhEs));
    assert_eq!(key.key_use, Some(KeyUse::Sig));
    Ok(())
}

#[test]
fn no_defaults() -> TestResult {
    init_logger();
    let source = bare(private_key("Ed25519")?)?;

    let key = resolve_key(source.clone(), [with_no_defaults(true)])?;
    assert_eq!(key.algorithm, None);
    assert_eq!(key.key_id, None);
    assert_eq!(key.key_use, None);

    // overrides are still applied
    let key = resolve_key(
        source,
        [with_no_defaults(true), with_alg("EdDSA"), with_use("sig"), with_kid("ed")],
    )?;
    assert_eq!(key.algorithm, Some(Algorithm::EdDsa));
    assert_eq!(key.key_use, Some(KeyUse::Sig));
    assert_eq!(key.key_id.as_deref(), Some("ed"));
    Ok(())
}

#[test]
fn verify_key_id() -> TestResult {
    init_logger();
    let mut key = JsonWebKey::new(private_key("P-256")?);
    key.key_id = Some("not-a-thumbprint".to_string());
    let data = key.to_json()?.into_bytes();

    // only checked if requested
    resolve_key(KeySource::from(data.clone()), [])?;
    assert!(matches!(
        resolve_key(KeySource::from(data.clone()), [with_verify_key_id(true)]),
        Err(Error::Validation { .. })
    ));

    // a requested key ID is trusted
    let key = resolve_key(
        KeySource::from(data),
        [with_verify_key_id(true), with_kid("not-a-thumbprint")],
    )?;
    assert_eq!(key.key_id.as_deref(), Some("not-a-thumbprint"));

    // fixture keys carry their thumbprint
    resolve_key(fixture_source("p256.priv.json"), [with_verify_key_id(true)])?;
    resolve_key(fixture_source("okp.priv.json"), [with_verify_key_id(true)])?;
    Ok(())
}
