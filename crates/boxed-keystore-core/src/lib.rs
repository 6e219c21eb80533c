//! Local, queryable store of SMKI certificates and private keys with a
//! read-through cache against a DCC Boxed certificate directory.
//!
//! The store indexes certificate/key material by device or organisation
//! identity ([`Eui`]), certificate usage ([`KeyUsage`]) and serial
//! number. Lookups walk a three-tier chain:
//!
//! | Tier | Backed by | Written by queries |
//! |------|-----------|--------------------|
//! | local | JSON document ([`KeyStoreDb`]) | yes (remote hits) |
//! | backing | pre-seeded JSON document | never |
//! | remote | DCC Boxed SMKI services | n/a |
//!
//! Certificates are classified by which metadata extraction succeeds:
//! organisation certificates encode a role and identity in the subject
//! DN, device certificates encode a hardware identity in the
//! subjectAltName extension. See [`metadata`] for the extraction rules
//! and [`boxed`] for the caching chain.
//!
//! # Example
//!
//! ```no_run
//! use boxed_keystore_core::{BoxedKeyStore, KeyStore, KeyUsage, Lookup};
//!
//! let mut store =
//!     BoxedKeyStore::open("1.2.3.4", None, "keystore.json".as_ref())?;
//! let records = store.query_by_identity(
//!     &"90-b3-d5-1f-30-01-00-00".parse()?,
//!     KeyUsage::DigitalSignature,
//!     None,
//!     Lookup::Certificate,
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod boxed;
pub mod directory;
pub mod eui;
pub mod material;
pub mod metadata;
pub mod store;

#[cfg(test)]
pub(crate) mod testdata;

pub use boxed::{BoxedKeyStore, BoxedStoreError};
pub use directory::{
    CertificateRole, CertificateStatus, CertificateUsage, Directory, DirectoryClient,
    DirectoryConfig, DirectoryEntry, DirectoryError, SearchRequest, SearchSubject,
};
pub use eui::{Eui, InvalidEuiError};
pub use material::{Certificate, MaterialError, PrivateKey};
pub use metadata::{CertificateMetadata, KeyUsage, MetadataError};
pub use store::{KeyStore, KeyStoreDb, Lookup, Material, PushOptions, Record, StoreError};
