//! The caching key store: local tier, backing tier, remote directory.
//!
//! Queries walk the chain in order and stop at the first hit. A
//! backing-tier hit is final and is not copied into the local tier;
//! the backing store is a pre-seeded, already-durable source. A remote
//! hit is pushed into the local tier before being returned, so an
//! identical follow-up query is answered locally.
//!
//! Only certificate lookups ever reach the directory. Private keys do
//! not exist remotely, and role-filtered identity lookups are not
//! answerable by the directory's device-oriented search, so both
//! resolve to not-found once the local tiers miss.

use std::io;
use std::path::Path;

use num_bigint::BigUint;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::directory::{
    CertificateStatus, CertificateUsage, Directory, DirectoryClient, DirectoryEntry,
    DirectoryError, SearchRequest, SearchSubject,
};
use crate::eui::Eui;
use crate::metadata::{CertificateMetadata, KeyUsage};
use crate::store::{KeyStore, KeyStoreDb, Lookup, Material, PushOptions, Record, StoreError};


/// A caching-store operation failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BoxedStoreError {
    /// A local or backing tier failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The remote directory failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The temporary local-tier file could not be created.
    #[error("failed to create temporary key store: {0}")]
    TempFile(#[source] io::Error),
}

/// A [`KeyStoreDb`] wrapped with a backing tier and a remote
/// directory.
///
/// Pushes go straight to the local tier; the backing tier is never
/// written. If no local path is given, the local tier lives in a
/// temporary file that is removed on drop.
#[derive(Debug)]
pub struct BoxedKeyStore<D = DirectoryClient> {
    local: KeyStoreDb,
    backing: KeyStoreDb,
    directory: D,
    temp: Option<NamedTempFile>,
}

impl BoxedKeyStore<DirectoryClient> {
    /// Opens a caching store against the directory at `address`.
    ///
    /// `local` is the cache document; pass `None` for a throwaway
    /// temporary file. `backing` is the pre-seeded read-only document.
    ///
    /// # Errors
    ///
    /// Fails if the directory address is invalid or either document
    /// cannot be opened.
    pub fn open(
        address: &str,
        local: Option<&Path>,
        backing: &Path,
    ) -> Result<Self, BoxedStoreError> {
        Self::with_directory(DirectoryClient::new(address)?, local, backing)
    }
}

impl<D: Directory> BoxedKeyStore<D> {
    /// As [`BoxedKeyStore::open`], with an explicit directory.
    ///
    /// # Errors
    ///
    /// Fails if either document cannot be opened.
    pub fn with_directory(
        directory: D,
        local: Option<&Path>,
        backing: &Path,
    ) -> Result<Self, BoxedStoreError> {
        let (local, temp) = match local {
            Some(path) => (KeyStoreDb::open(path)?, None),
            None => {
                let temp = tempfile::Builder::new()
                    .suffix(".json")
                    .tempfile()
                    .map_err(BoxedStoreError::TempFile)?;
                (KeyStoreDb::open(temp.path())?, Some(temp))
            }
        };
        Ok(Self {
            local,
            backing: KeyStoreDb::open(backing)?,
            directory,
            temp,
        })
    }

    /// The temporary local-tier path, when one was created.
    #[must_use]
    pub fn temporary_file(&self) -> Option<&Path> {
        self.temp.as_ref().map(NamedTempFile::path)
    }

    /// Builds the caller-facing record for a directory hit. The entry
    /// has already passed the local push, so its usage list is a
    /// single supported usage.
    fn remote_record(entry: DirectoryEntry) -> Option<Record> {
        let usage = match entry.metadata.key_usage.as_slice() {
            [usage] => *usage,
            _ => return None,
        };
        Some(Record {
            eui: entry.metadata.eui,
            serial: entry.metadata.serial,
            key_usage: usage,
            role: entry.metadata.role,
            name: None,
            material: Material::Certificate(entry.certificate),
        })
    }
}

impl<D: Directory> KeyStore for BoxedKeyStore<D> {
    type Error = BoxedStoreError;

    fn push(&mut self, options: PushOptions) -> Result<CertificateMetadata, BoxedStoreError> {
        Ok(self.local.push(options)?)
    }

    fn query_by_serial(
        &mut self,
        serial: &BigUint,
        lookup: Lookup,
    ) -> Result<Option<Record>, BoxedStoreError> {
        if let Some(record) = self.local.query_by_serial(serial, lookup)? {
            return Ok(Some(record));
        }
        if let Some(record) = self.backing.query_by_serial(serial, lookup)? {
            return Ok(Some(record));
        }
        if lookup != Lookup::Certificate {
            return Ok(None);
        }

        debug!(serial = %serial, "serial missed both tiers, asking directory");
        let Some(entry) = self.directory.retrieve(serial)? else {
            return Ok(None);
        };
        self.local
            .push(PushOptions::certificate(entry.certificate.clone()))?;
        Ok(Self::remote_record(entry))
    }

    fn query_by_identity(
        &mut self,
        eui: &Eui,
        key_usage: KeyUsage,
        role: Option<u8>,
        lookup: Lookup,
    ) -> Result<Vec<Record>, BoxedStoreError> {
        let records = self.local.query_by_identity(eui, key_usage, role, lookup)?;
        if !records.is_empty() {
            return Ok(records);
        }
        let records = self
            .backing
            .query_by_identity(eui, key_usage, role, lookup)?;
        if !records.is_empty() {
            return Ok(records);
        }
        if lookup != Lookup::Certificate {
            return Ok(Vec::new());
        }
        let Some(usage) = CertificateUsage::from_key_usage(key_usage) else {
            return Ok(Vec::new());
        };
        // the directory's search cannot disambiguate organisation
        // certificates by role
        if role.is_some() {
            return Ok(Vec::new());
        }

        debug!(eui = %eui, usage = usage.code(), "identity missed both tiers, asking directory");
        let request = SearchRequest {
            subject: SearchSubject::AltName(eui.hyphenated()),
            usage,
            status: CertificateStatus::InUse,
            role: None,
        };
        let entries = self.directory.search(&request)?;
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            self.local
                .push(PushOptions::certificate(entry.certificate.clone()))?;
            if let Some(record) = Self::remote_record(entry) {
                records.push(record);
            }
        }
        Ok(records)
    }
}
