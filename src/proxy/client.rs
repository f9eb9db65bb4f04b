//! Pooled upstream HTTP(S) clients.

use std::sync::Arc;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::proxy::error::ProxyError;
use crate::routing::{ProxyRule, TlsVerification};

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// One connection pool per TLS policy, shared by every request.
#[derive(Clone)]
pub struct UpstreamClient {
    verified: HttpsClient,
    unverified: HttpsClient,
}

impl UpstreamClient {
    pub fn new() -> Result<Self, ProxyError> {
        let provider = Arc::new(ring::default_provider());

        let verified = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .with_root_certificates(RootCertStore::from_iter(
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
            ))
            .with_no_client_auth();

        let unverified = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth();

        Ok(Self {
            verified: build_client(verified),
            unverified: build_client(unverified),
        })
    }

    /// Pick the pool matching the rule's certificate policy.
    ///
    /// Plain-http targets always use the verified pool; `secure` cannot change
    /// anything for them.
    pub fn for_rule(&self, rule: &ProxyRule) -> &HttpsClient {
        match rule.tls_verification() {
            TlsVerification::Disabled => &self.unverified,
            TlsVerification::Enforced | TlsVerification::NotApplicable => &self.verified,
        }
    }
}

fn build_client(tls: ClientConfig) -> HttpsClient {
    let https = HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new()).build(https)
}

/// Skips chain and hostname checks for `secure = false` rules. Handshake
/// signatures are still verified.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
