//! TLS configuration for fetching remote keys.

use std::{str::FromStr, sync::Arc, time::Duration};

use log::{debug, error, trace, warn};
use rustls::{
    DigitallySignedStruct,
    SignatureScheme,
    client::{
        ClientConfig,
        danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    },
    crypto::{CryptoProvider, ring as tls_provider},
    pki_types::{CertificateDer, ServerName, UnixTime},
};
use sha2::{Digest, Sha256};
use ureq::{Agent, AgentBuilder};

/// An error that may occur when configuring TLS.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The TLS client configuration can not be created
    #[error("TLS configuration error: {0}")]
    Rustls(#[from] rustls::Error),

    /// The loading of TLS root certificates from the platform's native certificate store failed
    #[error("Loading system TLS certs failed: {0:?}")]
    CertLoading(Vec<rustls_native_certs::Error>),

    /// No TLS root certificates from the platform's native certificate store could be added
    ///
    /// Provides the number certificates that failed to be added
    #[error("Unable to load any system TLS certs ({failed} failed)")]
    NoSystemCertsAdded {
        /// The number of certificates that failed to be added.
        failed: usize,
    },

    /// No valid certificate fingerprint is provided
    #[error("No valid TLS certificate fingerprints detected in {input:?}")]
    InvalidFingerprints {
        /// The input that contains no valid fingerprint.
        input: String,
    },
}

/// The SHA-256 fingerprint of a TLS certificate
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CertFingerprint(Vec<u8>);

impl CertFingerprint {
    /// Returns the raw digest bytes of the fingerprint.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for CertFingerprint {
    type Err = Error;

    /// Creates a [`CertFingerprint`] from 64 hexadecimal characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match hex::decode(s) {
            Ok(digest) if digest.len() == 32 => Ok(Self(digest)),
            _ => Err(Error::InvalidFingerprints {
                input: s.to_string(),
            }),
        }
    }
}

impl From<Vec<u8>> for CertFingerprint {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// The security model of the TLS connection used for fetching remote keys
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum ConnectionSecurity {
    /// Always trust the TLS certificate associated with a host
    Unsafe,

    /// Use the native trust store to evaluate the trust of a host
    #[default]
    Native,

    /// Use a list of SHA-256 checksums (fingerprints) to verify a host's TLS certificate
    Fingerprints(Vec<CertFingerprint>),
}

impl FromStr for ConnectionSecurity {
    type Err = Error;

    /// Create a ConnectionSecurity from string
    ///
    /// Valid inputs are either "Unsafe" (or "unsafe"), "Native" (or "native") or a comma
    /// separated list of "sha256:checksum", where "checksum" denotes 64 ASCII hexadecimal chars.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the input is neither "Unsafe" nor "Native" and also no valid
    /// certificate fingerprint can be derived from the input.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use jose_keys::ConnectionSecurity;
    ///
    /// assert!(ConnectionSecurity::from_str("unsafe").is_ok());
    /// assert!(ConnectionSecurity::from_str("native").is_ok());
    /// assert!(
    ///     ConnectionSecurity::from_str(
    ///         "sha256:324f7bd1530c55cf6812ca6865445de21dfc74cf7a3bb5fae7585e849e3553b7"
    ///     )
    ///     .is_ok()
    /// );
    /// assert!(ConnectionSecurity::from_str("something").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsafe" | "Unsafe" => Ok(Self::Unsafe),
            "native" | "Native" => Ok(Self::Native),
            _ => {
                let fingerprints: Vec<CertFingerprint> = s
                    .split(',')
                    .filter_map(|checksum| {
                        checksum
                            .trim()
                            .strip_prefix("sha256:")
                            .and_then(|checksum| CertFingerprint::from_str(checksum).ok())
                    })
                    .collect();
                if fingerprints.is_empty() {
                    Err(Error::InvalidFingerprints {
                        input: s.to_string(),
                    })
                } else {
                    Ok(Self::Fingerprints(fingerprints))
                }
            }
        }
    }
}

/// A verifier for server certificates, that bypasses the native trust store
///
/// With fingerprints (selected by [`ConnectionSecurity::Fingerprints`]) only end entity
/// certificates with a matching SHA-256 digest are accepted.
/// Without fingerprints (selected by [`ConnectionSecurity::Unsafe`]) every certificate is
/// accepted, which is **unsafe** and should only be used for testing.
/// Handshake signatures are always verified.
#[derive(Debug)]
pub(crate) struct PinningVerifier {
    fingerprints: Option<Vec<CertFingerprint>>,
    provider: CryptoProvider,
}

impl ServerCertVerifier for PinningVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let Some(fingerprints) = &self.fingerprints else {
            return Ok(ServerCertVerified::assertion());
        };
        let digest = Sha256::digest(end_entity.as_ref());
        if fingerprints
            .iter()
            .any(|fingerprint| fingerprint.as_bytes() == digest.as_slice())
        {
            trace!("Certificate fingerprint matches");
            return Ok(ServerCertVerified::assertion());
        }
        Err(rustls::Error::General(
            "Could not verify certificate fingerprint".to_string(),
        ))
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Creates an [`Agent`] for fetching remote keys.
///
/// Takes a [`ConnectionSecurity`] to define the TLS security model for the connection and the
/// `timeout` for a successful socket connection.
///
/// # Errors
///
/// Returns an error if
///
/// - the TLS client configuration can not be created,
/// - [`ConnectionSecurity::Native`] is provided as `security`, but no certification authority
///   certificates are available on the system.
pub(crate) fn create_agent(security: &ConnectionSecurity, timeout: Duration) -> Result<Agent, Error> {
    let tls_conf = ClientConfig::builder_with_provider(Arc::new(CryptoProvider {
        cipher_suites: tls_provider::ALL_CIPHER_SUITES.into(),
        ..tls_provider::default_provider()
    }))
    .with_protocol_versions(rustls::DEFAULT_VERSIONS)?;

    let tls_conf = match security {
        ConnectionSecurity::Unsafe => {
            warn!("Certificates of remote key locations are not verified");
            tls_conf
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(PinningVerifier {
                    fingerprints: None,
                    provider: tls_provider::default_provider(),
                }))
                .with_no_client_auth()
        }
        ConnectionSecurity::Native => {
            let native_certs = rustls_native_certs::load_native_certs();
            if native_certs.certs.is_empty() && !native_certs.errors.is_empty() {
                return Err(Error::CertLoading(native_certs.errors));
            }
            for error in &native_certs.errors {
                warn!("Skipping system TLS certs: {error}");
            }

            let mut roots = rustls::RootCertStore::empty();
            let (added, failed) = roots.add_parsable_certificates(native_certs.certs);
            debug!("Added {added} certificates and failed to parse {failed} certificates");
            if added == 0 {
                error!("Added no native certificates");
                return Err(Error::NoSystemCertsAdded { failed });
            }

            tls_conf.with_root_certificates(roots).with_no_client_auth()
        }
        ConnectionSecurity::Fingerprints(fingerprints) => tls_conf
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(PinningVerifier {
                fingerprints: Some(fingerprints.clone()),
                provider: tls_provider::default_provider(),
            }))
            .with_no_client_auth(),
    };

    Ok(AgentBuilder::new()
        .tls_config(Arc::new(tls_conf))
        .timeout_connect(timeout)
        .build())
}
