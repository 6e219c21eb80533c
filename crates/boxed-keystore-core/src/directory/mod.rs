//! DCC Boxed SMKI directory client.
//!
//! The directory exposes two XML-over-HTTP services: a certificate
//! search (`services/certificatesearch`) and a single-certificate
//! retrieval (`services/retrievecertificate`). Searches are issued
//! with only the subject criterion in the request body; the usage,
//! status and role criteria are re-checked client side because the
//! directory's own filtering is not exact. Each surviving serial is
//! then fetched individually.
//!
//! The directory serves certificates only, never private keys.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use num_bigint::BigUint;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::material::{Certificate, MaterialError};
use crate::metadata::{self, CertificateMetadata, KeyUsage, MetadataError};


const DEFAULT_PORT: u16 = 8083;
const DEFAULT_API_KEY: &str = "u3bg9gt38htd0j2";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// A remote directory call failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// The directory address could not be turned into a URL.
    #[error("invalid directory address {value:?}: {source}")]
    Address {
        /// The address as given.
        value: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP request itself failed (connect, timeout, io).
    #[error("directory transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The directory rejected the request as malformed (HTTP 401).
    #[error("directory rejected the request as invalid")]
    InvalidRequest,

    /// An unexpected status or content type.
    #[error("unknown directory response: status {status}, content-type {content_type:?}")]
    UnknownResponse {
        /// The HTTP status code.
        status: u16,
        /// The content type, if any was sent.
        content_type: Option<String>,
    },

    /// The request body failed to serialize.
    #[error("failed to encode directory request: {0}")]
    Request(#[from] quick_xml::SeError),

    /// The response body is not the expected XML.
    #[error("malformed directory response: {0}")]
    Response(#[from] quick_xml::DeError),

    /// The certificate body is not valid base64.
    #[error("malformed certificate body: {0}")]
    Body(#[from] base64::DecodeError),

    /// The returned certificate bytes are malformed.
    #[error(transparent)]
    Material(#[from] MaterialError),

    /// A returned certificate does not fit its announced layout.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Directory certificate status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    Pending,
    InUse,
    NotInUse,
    Expired,
    Revoked,
}

impl CertificateStatus {
    /// The directory's wire code for the status.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pending => "P",
            Self::InUse => "I",
            Self::NotInUse => "N",
            Self::Expired => "E",
            Self::Revoked => "R",
        }
    }
}

/// Directory certificate usage codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateUsage {
    DigitalSigning,
    KeyAgreement,
}

impl CertificateUsage {
    /// The directory's wire code for the usage.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DigitalSigning => "DS",
            Self::KeyAgreement => "KA",
        }
    }

    /// Maps a store key usage onto the directory's usage codes.
    /// Only the two single-purpose leaf usages exist remotely.
    #[must_use]
    pub const fn from_key_usage(usage: KeyUsage) -> Option<Self> {
        match usage {
            KeyUsage::DigitalSignature => Some(Self::DigitalSigning),
            KeyUsage::KeyAgreement => Some(Self::KeyAgreement),
            _ => None,
        }
    }
}

/// SEC remote-party role codes as the directory spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateRole {
    Root,
    Recovery,
    Supplier,
    NetworkOperator,
    AccessControlBroker,
    TransitionalCos,
    WanProvider,
    IssuingAuthority,
    LoadController,
    Other,
    XmlSign,
    DspXmlSign,
}

impl CertificateRole {
    /// The directory's wire code for the role.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Root => "0",
            Self::Recovery => "1",
            Self::Supplier => "2",
            Self::NetworkOperator => "3",
            Self::AccessControlBroker => "4",
            Self::TransitionalCos => "5",
            Self::WanProvider => "6",
            Self::IssuingAuthority => "7",
            Self::LoadController => "8",
            Self::Other => "127",
            Self::XmlSign => "135",
            Self::DspXmlSign => "137",
        }
    }
}

/// Which subject field a search matches on. Identities are formatted
/// as hyphen-separated byte pairs, e.g. `00-db-12-34-56-78-90-a4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSubject {
    /// Subject DN match (organisation certificates).
    Name(String),
    /// subjectAltName match (device certificates).
    AltName(String),
}

/// A certificate search.
///
/// Only the subject travels in the request body; `usage`, `status`
/// and `role` are applied client side against the returned matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub subject: SearchSubject,
    pub usage: CertificateUsage,
    pub status: CertificateStatus,
    pub role: Option<CertificateRole>,
}

/// A certificate returned by the directory, with its derived metadata.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub metadata: CertificateMetadata,
    pub certificate: Certificate,
}

/// The remote tier as the caching store sees it.
pub trait Directory {
    /// Searches for certificates matching the request.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, an invalid-request response or a
    /// malformed response body. No match is an empty list.
    fn search(&self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    /// Fetches a single certificate by serial.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, an invalid-request response or a
    /// malformed response body. An unknown serial is `Ok(None)`.
    fn retrieve(&self, serial: &BigUint) -> Result<Option<DirectoryEntry>, DirectoryError>;
}

/// Client tunables. The defaults match a DCC Boxed instance.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// The `apikey` query parameter sent with every call.
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Additional headers, e.g. an authentication header when the
    /// directory sits behind a proxy.
    pub extra_headers: HeaderMap,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_owned(),
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_secs(4),
            extra_headers: HeaderMap::new(),
        }
    }
}

/// Blocking HTTP client against one directory instance.
#[derive(Debug)]
pub struct DirectoryClient {
    search_url: Url,
    retrieve_url: Url,
    config: DirectoryConfig,
    client: Client,
}

impl DirectoryClient {
    /// Connects to the directory at `address` with default tunables.
    ///
    /// # Errors
    ///
    /// Fails if the address does not resolve to a URL or the HTTP
    /// client cannot be built.
    pub fn new(address: &str) -> Result<Self, DirectoryError> {
        Self::with_config(address, DirectoryConfig::default())
    }

    /// Connects with explicit tunables.
    ///
    /// # Errors
    ///
    /// As [`DirectoryClient::new`].
    pub fn with_config(address: &str, config: DirectoryConfig) -> Result<Self, DirectoryError> {
        let base = resolve_address(address)?;
        let join = |path| {
            base.join(path).map_err(|source| DirectoryError::Address {
                value: address.to_owned(),
                source,
            })
        };
        let search_url = join("services/certificatesearch")?;
        let retrieve_url = join("services/retrievecertificate")?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            search_url,
            retrieve_url,
            config,
            client,
        })
    }

    /// Posts an XML body; `Ok(None)` is the directory's not-found
    /// status.
    fn post(&self, url: &Url, body: String) -> Result<Option<String>, DirectoryError> {
        let response = self
            .client
            .post(url.clone())
            .query(&[("apikey", self.config.api_key.as_str())])
            .header(CONTENT_TYPE, "application/xml")
            .headers(self.config.extra_headers.clone())
            .body(body)
            .send()?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        if classify_response(status, content_type.as_deref())? {
            Ok(Some(response.text()?))
        } else {
            Ok(None)
        }
    }

    fn retrieve_raw(&self, serial: &str) -> Result<Option<DirectoryEntry>, DirectoryError> {
        debug!(serial, "directory retrieve");
        let body = render_request(&RetrieveCriteria { serial })?;
        let Some(raw) = self.post(&self.retrieve_url, body)? else {
            return Ok(None);
        };
        let parsed: RetrieveResponse = quick_xml::de::from_str(&raw)?;
        match parsed.response {
            Some(response) => entry_from_response(response),
            None => Ok(None),
        }
    }
}

impl Directory for DirectoryClient {
    fn search(&self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        debug!(subject = ?request.subject, usage = request.usage.code(), "directory search");
        let body = render_request(&SearchCriteria::from(&request.subject))?;
        let Some(raw) = self.post(&self.search_url, body)? else {
            return Ok(Vec::new());
        };
        let parsed: SearchResponse = quick_xml::de::from_str(&raw)?;
        let mut entries = Vec::new();
        for serial in matching_serials(request, &parsed.results) {
            if let Some(entry) = self.retrieve_raw(&serial)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn retrieve(&self, serial: &BigUint) -> Result<Option<DirectoryEntry>, DirectoryError> {
        self.retrieve_raw(&serial.to_str_radix(16))
    }
}

/// Turns a directory address into a base URL: a bare host gains
/// `http://` and the default port, a host:port gains `http://`, and
/// anything with a scheme is used as-is.
///
/// # Errors
///
/// Fails if the completed string is still not a URL.
pub fn resolve_address(address: &str) -> Result<Url, DirectoryError> {
    let full = if !address.contains(':') {
        format!("http://{address}:{DEFAULT_PORT}/")
    } else if address.contains("://") {
        address.to_owned()
    } else {
        format!("http://{address}")
    };
    Url::parse(&full).map_err(|source| DirectoryError::Address {
        value: address.to_owned(),
        source,
    })
}

/// `Ok(true)` for a usable XML response, `Ok(false)` for the
/// directory's not-found status (402); 401 is an invalid request and
/// anything else is unknown.
fn classify_response(status: u16, content_type: Option<&str>) -> Result<bool, DirectoryError> {
    match status {
        402 => return Ok(false),
        401 => return Err(DirectoryError::InvalidRequest),
        _ => {}
    }
    let media_type = content_type
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_ascii_lowercase());
    if status != 200 || media_type.as_deref() != Some("application/xml") {
        return Err(DirectoryError::UnknownResponse {
            status,
            content_type: content_type.map(str::to_owned),
        });
    }
    Ok(true)
}

#[derive(Debug, Serialize)]
#[serde(rename = "CertificateSearchRequest")]
struct SearchCriteria<'a> {
    #[serde(rename = "CertificateSubjectName", skip_serializing_if = "Option::is_none")]
    subject_name: Option<&'a str>,
    #[serde(rename = "CertificateSubjectAltName", skip_serializing_if = "Option::is_none")]
    subject_alt_name: Option<&'a str>,
}

impl<'a> From<&'a SearchSubject> for SearchCriteria<'a> {
    fn from(subject: &'a SearchSubject) -> Self {
        match subject {
            SearchSubject::Name(name) => Self {
                subject_name: Some(name),
                subject_alt_name: None,
            },
            SearchSubject::AltName(name) => Self {
                subject_name: None,
                subject_alt_name: Some(name),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "CertificateDataRequest")]
struct RetrieveCriteria<'a> {
    #[serde(rename = "CertificateSerial")]
    serial: &'a str,
}

fn render_request<T: Serialize>(body: &T) -> Result<String, DirectoryError> {
    let xml = quick_xml::se::to_string(body)?;
    Ok(format!("{XML_DECLARATION}{xml}"))
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Result", default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(rename = "CertificateSerial")]
    serial: Option<String>,
    #[serde(rename = "CertificateUsage")]
    usage: Option<String>,
    #[serde(rename = "CertificateStatus")]
    status: Option<String>,
    #[serde(rename = "CertificateRole")]
    role: Option<String>,
}

/// Re-applies the request criteria to the directory's matches and
/// keeps the surviving serials.
fn matching_serials(request: &SearchRequest, results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .filter(|result| {
            result.usage.as_deref() == Some(request.usage.code())
                && result.status.as_deref() == Some(request.status.code())
                && match request.role {
                    Some(role) => result.role.as_deref() == Some(role.code()),
                    None => true,
                }
        })
        .filter_map(|result| result.serial.clone())
        .collect()
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(rename = "CertificateResponse")]
    response: Option<CertificateResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct CertificateResponse {
    #[serde(rename = "CertificateBody")]
    body: Option<String>,
    #[serde(rename = "CertificateSubjectName")]
    subject_name: Option<String>,
    #[serde(rename = "CertificateSubjectAltName")]
    subject_alt_name: Option<String>,
}

/// Decodes the base64 certificate body and derives metadata according
/// to which subject field the directory populated: SubjectName marks
/// an organisation certificate, SubjectAltName a device certificate.
/// A response carrying neither (or no body) is treated as not found.
fn entry_from_response(
    response: CertificateResponse,
) -> Result<Option<DirectoryEntry>, DirectoryError> {
    let Some(body) = response.body else {
        return Ok(None);
    };
    let der = BASE64.decode(body.split_whitespace().collect::<String>())?;
    let certificate = Certificate::from_der(der)?;
    let metadata = if response.subject_name.is_some() {
        metadata::organisation_metadata(&certificate)?
    } else if response.subject_alt_name.is_some() {
        metadata::device_metadata(&certificate)?
    } else {
        return Ok(None);
    };
    Ok(Some(DirectoryEntry {
        metadata,
        certificate,
    }))
}
