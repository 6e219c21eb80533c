//! Local key-store tier.
//!
//! A [`KeyStoreDb`] owns a JSON document shaped
//! `identity -> usageName -> serialDecimal -> entry`, loaded fully into
//! memory on open and rewritten synchronously on every [`push`]. An
//! entry holds the PEM certificate and/or PKCS8 private key plus the
//! optional role and free-form name.
//!
//! Only single-purpose leaf certificates are indexed: a push whose
//! derived key usage is not exactly one of digitalSignature or
//! keyAgreement is rejected.
//!
//! [`push`]: KeyStoreDb::push

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eui::Eui;
use crate::material::{Certificate, MaterialError, PrivateKey};
use crate::metadata::{self, CertificateMetadata, KeyUsage, MetadataError};

#[cfg(test)]
mod tests;

/// A local-tier operation failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Reading or writing the backing document failed.
    #[error("key store io on {path}: {source}")]
    Io {
        /// The document path.
        path: PathBuf,
        /// The underlying io error.
        #[source]
        source: io::Error,
    },

    /// The backing document is not the expected JSON tree.
    #[error("key store document {path} is malformed: {source}")]
    Document {
        /// The document path.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A serial index key is not a decimal integer.
    #[error("key store holds a non-decimal serial key: {value}")]
    InvalidSerial {
        /// The offending index key.
        value: String,
    },

    /// An identity index key is not a canonical EUI.
    #[error("key store holds an invalid identity key")]
    InvalidIdentity(#[from] crate::eui::InvalidEuiError),

    /// The pushed certificate matches neither the organisation nor the
    /// device layout.
    #[error("unable to extract metadata from certificate")]
    UnrecognizedCertificate(#[source] MetadataError),

    /// The supplied private key does not belong to the certificate.
    #[error("private key does not match certificate public key")]
    KeyMismatch,

    /// The certificate's key usage is not exactly one of
    /// digitalSignature or keyAgreement.
    #[error("unsupported key usage: {usage:?}")]
    UnsupportedKeyUsage {
        /// The key usages the certificate asserts.
        usage: Vec<KeyUsage>,
    },

    /// Stored or supplied certificate/key material is malformed.
    #[error(transparent)]
    Material(#[from] MaterialError),
}

/// Which material a query reconstructs.
///
/// Private keys exist only in local tiers; the remote directory serves
/// certificates alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Certificate,
    PrivateKey,
}

/// The material carried by a query result, matching the requested
/// [`Lookup`].
#[derive(Debug, Clone)]
pub enum Material {
    Certificate(Certificate),
    PrivateKey(PrivateKey),
}

impl Material {
    /// The certificate, if this is certificate material.
    #[must_use]
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Certificate(cert) => Some(cert),
            Self::PrivateKey(_) => None,
        }
    }

    /// The private key, if this is key material.
    #[must_use]
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            Self::Certificate(_) => None,
            Self::PrivateKey(key) => Some(key),
        }
    }
}

/// A reconstructed store entry.
#[derive(Debug, Clone)]
pub struct Record {
    pub eui: Eui,
    pub serial: BigUint,
    /// The single usage under which the entry is indexed.
    pub key_usage: KeyUsage,
    pub role: Option<u8>,
    pub name: Option<String>,
    pub material: Material,
}

/// What to persist.
///
/// The certificate form derives its metadata from the certificate
/// itself; the metadata form is for keys whose certificate is stored
/// separately (or not at all).
#[derive(Debug, Clone)]
pub enum PushOptions {
    /// A certificate, optionally with its private key.
    Certificate {
        certificate: Certificate,
        private_key: Option<PrivateKey>,
        name: Option<String>,
    },
    /// A private key filed under explicitly supplied metadata.
    Metadata {
        metadata: CertificateMetadata,
        private_key: PrivateKey,
        name: Option<String>,
    },
}

impl PushOptions {
    /// A certificate on its own.
    #[must_use]
    pub fn certificate(certificate: Certificate) -> Self {
        Self::Certificate {
            certificate,
            private_key: None,
            name: None,
        }
    }

    /// A certificate together with its private key.
    #[must_use]
    pub fn certificate_with_key(certificate: Certificate, private_key: PrivateKey) -> Self {
        Self::Certificate {
            certificate,
            private_key: Some(private_key),
            name: None,
        }
    }

    /// A private key filed under the given metadata.
    #[must_use]
    pub fn key_with_metadata(metadata: CertificateMetadata, private_key: PrivateKey) -> Self {
        Self::Metadata {
            metadata,
            private_key,
            name: None,
        }
    }

    /// Attaches a free-form name to the entry.
    #[must_use]
    pub fn with_name(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Certificate { name, .. } | Self::Metadata { name, .. } => {
                *name = Some(value.into());
            }
        }
        self
    }
}

/// The store interface shared by the local tier and the caching tier.
pub trait KeyStore {
    type Error: std::error::Error;

    /// Persists certificate/key material, returning the metadata it
    /// was filed under.
    ///
    /// # Errors
    ///
    /// Fails if metadata extraction, key-pair validation or the
    /// durable write fails; nothing is persisted on failure.
    fn push(&mut self, options: PushOptions) -> Result<CertificateMetadata, Self::Error>;

    /// Point lookup by certificate serial.
    ///
    /// # Errors
    ///
    /// Fails only on store corruption or (for caching tiers) remote
    /// errors; an absent serial is `Ok(None)`.
    fn query_by_serial(
        &mut self,
        serial: &BigUint,
        lookup: Lookup,
    ) -> Result<Option<Record>, Self::Error>;

    /// Indexed lookup by identity and usage, optionally filtered by
    /// role. An empty list is a miss.
    ///
    /// # Errors
    ///
    /// Fails only on store corruption or (for caching tiers) remote
    /// errors.
    fn query_by_identity(
        &mut self,
        eui: &Eui,
        key_usage: KeyUsage,
        role: Option<u8>,
        lookup: Lookup,
    ) -> Result<Vec<Record>, Self::Error>;
}

/// A persisted entry. Field names are the document's wire form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Entry {
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<String>,
    #[serde(rename = "privateKey", skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Entry {
    /// Overlays `other` on `self`: populated fields win, absent fields
    /// keep the existing value. Pushing a certificate and its key in
    /// two steps therefore yields one merged entry.
    fn merge(&mut self, other: Entry) {
        if other.certificate.is_some() {
            self.certificate = other.certificate;
        }
        if other.private_key.is_some() {
            self.private_key = other.private_key;
        }
        if other.role.is_some() {
            self.role = other.role;
        }
        if other.name.is_some() {
            self.name = other.name;
        }
    }

    fn material(&self, lookup: Lookup) -> Result<Option<Material>, MaterialError> {
        match lookup {
            Lookup::Certificate => self
                .certificate
                .as_deref()
                .map(|pem| Certificate::from_pem(pem).map(Material::Certificate))
                .transpose(),
            Lookup::PrivateKey => self
                .private_key
                .as_deref()
                .map(|pem| PrivateKey::from_pkcs8_pem(pem).map(Material::PrivateKey))
                .transpose(),
        }
    }
}

type UsageTree = BTreeMap<String, Entry>;
type IdentityTree = BTreeMap<String, UsageTree>;
type Tree = BTreeMap<String, IdentityTree>;

/// The local key-store tier: a JSON document tree indexed by identity,
/// usage name and serial.
#[derive(Debug)]
pub struct KeyStoreDb {
    path: PathBuf,
    tree: Tree,
}

impl KeyStoreDb {
    /// Opens the document at `path`, creating an empty one if absent.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or created, or holds something
    /// other than the expected JSON tree.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tree = match fs::read_to_string(&path) {
            // a freshly created temp file is empty, not "{}"
            Ok(raw) if raw.trim().is_empty() => {
                fs::write(&path, "{}").map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
                Tree::new()
            }
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Document {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::write(&path, "{}").map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
                Tree::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), identities = tree.len(), "key store opened");
        Ok(Self { path, tree })
    }

    /// The document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.tree).map_err(|source| {
            StoreError::Document {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, raw).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn record(
        eui: Eui,
        serial: BigUint,
        key_usage: KeyUsage,
        entry: &Entry,
        lookup: Lookup,
    ) -> Result<Option<Record>, StoreError> {
        let Some(material) = entry.material(lookup)? else {
            return Ok(None);
        };
        Ok(Some(Record {
            eui,
            serial,
            key_usage,
            role: entry.role,
            name: entry.name.clone(),
            material,
        }))
    }
}

impl KeyStore for KeyStoreDb {
    type Error = StoreError;

    fn push(&mut self, options: PushOptions) -> Result<CertificateMetadata, StoreError> {
        let (meta, entry) = match options {
            PushOptions::Certificate {
                certificate,
                private_key,
                name,
            } => {
                let meta = metadata::extract_metadata(&certificate)
                    .map_err(StoreError::UnrecognizedCertificate)?;
                let private_key_pem = match private_key {
                    Some(key) => {
                        if !certificate.matches_key(&key) {
                            return Err(StoreError::KeyMismatch);
                        }
                        Some(key.to_pkcs8_pem()?)
                    }
                    None => None,
                };
                let entry = Entry {
                    certificate: Some(certificate.to_pem()),
                    private_key: private_key_pem,
                    role: meta.role,
                    name,
                };
                (meta, entry)
            }
            PushOptions::Metadata {
                metadata: meta,
                private_key,
                name,
            } => {
                let entry = Entry {
                    certificate: None,
                    private_key: Some(private_key.to_pkcs8_pem()?),
                    role: meta.role,
                    name,
                };
                (meta, entry)
            }
        };

        let usage = match meta.key_usage.as_slice() {
            [usage @ (KeyUsage::DigitalSignature | KeyUsage::KeyAgreement)] => *usage,
            _ => {
                return Err(StoreError::UnsupportedKeyUsage {
                    usage: meta.key_usage.clone(),
                });
            }
        };

        let serial = meta.serial.to_str_radix(10);
        debug!(eui = %meta.eui, usage = %usage, serial = %serial, "key store push");
        self.tree
            .entry(meta.eui.canonical())
            .or_default()
            .entry(usage.name().to_owned())
            .or_default()
            .entry(serial)
            .or_default()
            .merge(entry);
        self.save()?;
        Ok(meta)
    }

    fn query_by_serial(
        &mut self,
        serial: &BigUint,
        lookup: Lookup,
    ) -> Result<Option<Record>, StoreError> {
        let wanted = serial.to_str_radix(10);
        for (eui, usages) in &self.tree {
            for (usage_name, serials) in usages {
                let Some(entry) = serials.get(&wanted) else {
                    continue;
                };
                let Some(usage) = KeyUsage::from_name(usage_name) else {
                    continue;
                };
                let eui = Eui::new(eui)?;
                if let Some(record) = Self::record(eui, serial.clone(), usage, entry, lookup)? {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    fn query_by_identity(
        &mut self,
        eui: &Eui,
        key_usage: KeyUsage,
        role: Option<u8>,
        lookup: Lookup,
    ) -> Result<Vec<Record>, StoreError> {
        let Some(serials) = self
            .tree
            .get(&eui.canonical())
            .and_then(|usages| usages.get(key_usage.name()))
        else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (serial, entry) in serials {
            if let Some(wanted) = role {
                if entry.role != Some(wanted) {
                    continue;
                }
            }
            let serial = serial
                .parse::<BigUint>()
                .map_err(|_| StoreError::InvalidSerial {
                    value: serial.clone(),
                })?;
            if let Some(record) = Self::record(*eui, serial, key_usage, entry, lookup)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
