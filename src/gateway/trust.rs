//! Server trust evaluation for gateway TLS handshakes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{VerifierBuilderError, WebPkiServerVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use thiserror::Error;
use tracing::{debug, warn};

/// Decides whether a presented certificate chain may be trusted for `host`.
///
/// `chain[0]` is the end-entity certificate, followed by whatever intermediates
/// (and possibly the root) the server sent.
pub trait TrustEvaluator: Send + Sync {
    fn is_trusted(&self, chain: &[CertificateDer<'_>], host: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum TrustError {
    #[error("no pinned certificates configured")]
    NoPinnedCertificates,
    #[error("cannot read pinned certificate '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid pinned certificate: {0}")]
    InvalidCertificate(rustls::Error),
    #[error("cannot build certificate verifier: {0}")]
    Verifier(#[from] VerifierBuilderError),
    #[error("cannot build tls config: {0}")]
    Tls(rustls::Error),
}

/// Trusts only chains that validate against a fixed set of root certificates.
///
/// The platform trust store is never consulted.
pub struct PinnedRootsEvaluator {
    verifier: Arc<WebPkiServerVerifier>,
}

impl PinnedRootsEvaluator {
    pub fn new(roots: Vec<CertificateDer<'static>>) -> Result<Self, TrustError> {
        if roots.is_empty() {
            return Err(TrustError::NoPinnedCertificates);
        }
        let mut store = RootCertStore::empty();
        for root in roots {
            store.add(root).map_err(TrustError::InvalidCertificate)?;
        }
        let verifier =
            WebPkiServerVerifier::builder_with_provider(Arc::new(store), Arc::new(ring::default_provider()))
                .build()?;
        Ok(Self { verifier })
    }

    /// Load DER encoded roots from disk
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, TrustError> {
        let mut roots = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let der = std::fs::read(path).map_err(|source| TrustError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            roots.push(CertificateDer::from(der));
        }
        Self::new(roots)
    }
}

impl TrustEvaluator for PinnedRootsEvaluator {
    fn is_trusted(&self, chain: &[CertificateDer<'_>], host: &str) -> bool {
        let Some((end_entity, intermediates)) = chain.split_first() else {
            return false;
        };
        let Ok(server_name) = ServerName::try_from(host.to_owned()) else {
            return false;
        };
        self.verifier
            .verify_server_cert(end_entity, intermediates, &server_name, &[], UnixTime::now())
            .inspect_err(|e| debug!(host, error = %e, "pinned root validation failed"))
            .is_ok()
    }
}

/// Bridges rustls certificate verification to a [`TrustEvaluator`].
///
/// Handshake signatures are still checked with the ring provider's algorithms.
struct EvaluatingVerifier {
    evaluator: Arc<dyn TrustEvaluator>,
    provider: Arc<CryptoProvider>,
}

impl fmt::Debug for EvaluatingVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatingVerifier").finish_non_exhaustive()
    }
}

impl ServerCertVerifier for EvaluatingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let mut chain = Vec::with_capacity(intermediates.len() + 1);
        chain.push(end_entity.clone());
        chain.extend(intermediates.iter().cloned());

        let host = server_name.to_str();
        if self.evaluator.is_trusted(&chain, &host) {
            Ok(ServerCertVerified::assertion())
        } else {
            warn!(host = %host, "server certificate chain rejected by trust evaluator");
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}

/// TLS client config that consults `evaluator` on every handshake
pub fn tls_config(evaluator: Arc<dyn TrustEvaluator>) -> Result<ClientConfig, TrustError> {
    let provider = Arc::new(ring::default_provider());
    let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(TrustError::Tls)?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(EvaluatingVerifier { evaluator, provider }))
        .with_no_client_auth();
    Ok(config)
}
