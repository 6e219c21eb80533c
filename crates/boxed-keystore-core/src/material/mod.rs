//! Owned certificate and private-key material.
//!
//! The store persists material as PEM strings and reconstructs it on
//! query, so both wrappers own their encoded form. [`Certificate`]
//! keeps the DER bytes and hands out a borrowed `x509-parser` view on
//! demand; [`PrivateKey`] wraps a P-256 key in PKCS#8 form.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use p256::SecretKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

/// Malformed certificate or key input.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum MaterialError {
    /// The PEM framing was missing or the body was not base64.
    #[error("malformed PEM document")]
    Pem,

    /// The DER bytes did not parse as an X.509 certificate.
    #[error("malformed certificate: {0}")]
    Der(String),

    /// The key bytes did not parse as a PKCS#8 P-256 private key.
    #[error("malformed private key: {0}")]
    Key(String),
}

const CERT_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const CERT_END: &str = "-----END CERTIFICATE-----";

/// An X.509 certificate, stored as validated DER.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Takes ownership of DER bytes, validating that they parse as a
    /// certificate.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::Der`] if the bytes are not a valid
    /// X.509 certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self, MaterialError> {
        X509Certificate::from_der(&der).map_err(|e| MaterialError::Der(e.to_string()))?;
        Ok(Self { der })
    }

    /// Parses a PEM-framed certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM framing or base64 body is invalid,
    /// or the decoded bytes are not a certificate.
    pub fn from_pem(pem: &str) -> Result<Self, MaterialError> {
        let der = decode_pem(pem, CERT_BEGIN, CERT_END)?;
        Self::from_der(der)
    }

    /// Renders the certificate as a PEM document.
    #[must_use]
    pub fn to_pem(&self) -> String {
        encode_pem(&self.der, CERT_BEGIN, CERT_END)
    }

    /// The raw DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Borrowed parsed view of the certificate.
    ///
    /// # Errors
    ///
    /// The DER was validated at construction, so this only fails if
    /// the parser disagrees with itself; the error is still propagated
    /// rather than panicking.
    pub fn parse(&self) -> Result<X509Certificate<'_>, MaterialError> {
        let (_, cert) =
            X509Certificate::from_der(&self.der).map_err(|e| MaterialError::Der(e.to_string()))?;
        Ok(cert)
    }

    /// Whether `key` is the private half of this certificate's public
    /// key. Any structural mismatch (non-EC key, wrong curve point)
    /// counts as not matching.
    #[must_use]
    pub fn matches_key(&self, key: &PrivateKey) -> bool {
        let Ok(cert) = self.parse() else {
            return false;
        };
        let spki = &cert.tbs_certificate.subject_pki;
        spki.subject_public_key.data.as_ref() == key.public_point().as_slice()
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("der_len", &self.der.len())
            .finish()
    }
}

/// A P-256 private key held in memory, persisted as PKCS#8 PEM.
#[derive(Clone)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Parses a PKCS#8 PEM private key.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::Key`] if the document is not a valid
    /// PKCS#8 P-256 key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, MaterialError> {
        SecretKey::from_pkcs8_pem(pem)
            .map(Self)
            .map_err(|e| MaterialError::Key(e.to_string()))
    }

    /// Parses a PKCS#8 DER private key.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::Key`] on malformed input.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, MaterialError> {
        SecretKey::from_pkcs8_der(der)
            .map(Self)
            .map_err(|e| MaterialError::Key(e.to_string()))
    }

    /// Renders the key as a PKCS#8 PEM document.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::Key`] if encoding fails.
    pub fn to_pkcs8_pem(&self) -> Result<String, MaterialError> {
        self.0
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| MaterialError::Key(e.to_string()))
    }

    /// The uncompressed SEC1 encoding of the public point, as it
    /// appears in a certificate's subjectPublicKey.
    #[must_use]
    pub fn public_point(&self) -> Vec<u8> {
        self.0
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        f.write_str("PrivateKey(p256)")
    }
}

fn decode_pem(pem: &str, begin: &str, end: &str) -> Result<Vec<u8>, MaterialError> {
    let start = pem.find(begin).ok_or(MaterialError::Pem)? + begin.len();
    let stop = pem.find(end).ok_or(MaterialError::Pem)?;
    if stop < start {
        return Err(MaterialError::Pem);
    }
    let body: String = pem[start..stop].chars().filter(|c| !c.is_whitespace()).collect();
    BASE64.decode(body).map_err(|_| MaterialError::Pem)
}

fn encode_pem(der: &[u8], begin: &str, end: &str) -> String {
    let body = BASE64.encode(der);
    let mut out = String::with_capacity(body.len() + begin.len() + end.len() + body.len() / 64 + 4);
    out.push_str(begin);
    out.push('\n');
    for chunk in body.as_bytes().chunks(64) {
        // base64 output is always ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(end);
    out.push('\n');
    out
}
