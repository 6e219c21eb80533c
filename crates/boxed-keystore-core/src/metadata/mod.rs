//! Certificate metadata extraction.
//!
//! Derives identity, role, serial and key-usage facts from a
//! certificate's DER structure. Two layouts exist in the wild:
//!
//! - **Organisation certificates** carry a remote-party role (2 hex
//!   digits in the organizationalUnit attribute) and a 64-bit identity
//!   (BIT STRING in the uniqueIdentifier attribute) in the subject DN.
//! - **Device certificates** carry the identity in a subjectAltName
//!   otherName of type id-on-hardwareModuleName.
//!
//! There is no type tag: a certificate is classified by which
//! extraction succeeds ([`extract_metadata`] tries organisation first,
//! then device).

use std::fmt;

use num_bigint::BigUint;
use x509_parser::der_parser::asn1_rs::{Any, BitString, Class, FromDer as _, Oid, Sequence, Tag, oid};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::X509Extension;
use x509_parser::x509::X509Name;

use crate::eui::Eui;
use crate::material::Certificate;


const OID_ORGANIZATIONAL_UNIT: Oid<'static> = oid!(2.5.4.11);
const OID_UNIQUE_IDENTIFIER: Oid<'static> = oid!(2.5.4.45);
const OID_KEY_USAGE: Oid<'static> = oid!(2.5.29.15);
const OID_SUBJECT_ALT_NAME: Oid<'static> = oid!(2.5.29.17);
const OID_ECDSA_WITH_SHA256: Oid<'static> = oid!(1.2.840.10045.4.3.2);
const OID_HARDWARE_MODULE_NAME: Oid<'static> = oid!(1.3.6.1.5.5.7.8.4);

/// The certificate does not conform to the expected structure.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum MetadataError {
    /// The keyUsage extension is absent.
    #[error("keyUsage extension not found")]
    KeyUsageNotFound,

    /// The subjectAltName extension is absent.
    #[error("subjectAltName extension not found")]
    SubjectAltNameNotFound,

    /// No hardwareModuleName otherName entry in the subjectAltName.
    #[error("hwSerialNum not found")]
    HardwareSerialNotFound,

    /// Role or identity missing from the subject DN.
    #[error("invalid subject")]
    InvalidSubject,

    /// Only ECDSA with SHA256 certificates are handled.
    #[error("expected ECDSA with SHA256, got {oid}")]
    UnsupportedAlgorithm {
        /// The dotted signature algorithm OID found.
        oid: String,
    },

    /// The DER structure itself was malformed.
    #[error("invalid certificate structure: {0}")]
    Structure(String),

    /// Neither the organisation nor the device extraction succeeded.
    #[error("certificate matches neither organisation nor device layout")]
    Unrecognized,
}

/// The nine X.509 key-usage bits, discriminants matching the bit
/// position in the extension's BIT STRING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KeyUsage {
    DigitalSignature = 0,
    NonRepudiation = 1,
    KeyEncipherment = 2,
    DataEncipherment = 3,
    KeyAgreement = 4,
    KeyCertSign = 5,
    CrlSign = 6,
    EncipherOnly = 7,
    DecipherOnly = 8,
}

impl KeyUsage {
    const ALL: [Self; 9] = [
        Self::DigitalSignature,
        Self::NonRepudiation,
        Self::KeyEncipherment,
        Self::DataEncipherment,
        Self::KeyAgreement,
        Self::KeyCertSign,
        Self::CrlSign,
        Self::EncipherOnly,
        Self::DecipherOnly,
    ];

    /// The usage for a given bit position, if any.
    #[must_use]
    pub fn from_bit(bit: usize) -> Option<Self> {
        Self::ALL.get(bit).copied()
    }

    /// The X.509 name of the usage, also used as the store's index key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DigitalSignature => "digitalSignature",
            Self::NonRepudiation => "nonRepudiation",
            Self::KeyEncipherment => "keyEncipherment",
            Self::DataEncipherment => "dataEncipherment",
            Self::KeyAgreement => "keyAgreement",
            Self::KeyCertSign => "keyCertSign",
            Self::CrlSign => "cRLSign",
            Self::EncipherOnly => "encipherOnly",
            Self::DecipherOnly => "decipherOnly",
        }
    }

    /// Inverse of [`KeyUsage::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|usage| usage.name() == name)
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Facts derived from a certificate.
///
/// `role` is `Some` exactly when the certificate is an organisation
/// certificate; device certificates take their identity from the
/// subjectAltName and carry no role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateMetadata {
    pub eui: Eui,
    pub serial: BigUint,
    pub role: Option<u8>,
    pub key_usage: Vec<KeyUsage>,
}

/// Extracts the key-usage bits asserted by the certificate.
///
/// # Errors
///
/// Returns [`MetadataError::KeyUsageNotFound`] if the extension is
/// absent, or a structure error if its BIT STRING is malformed.
pub fn parse_key_usage(cert: &Certificate) -> Result<Vec<KeyUsage>, MetadataError> {
    let x509 = parse(cert)?;
    key_usage_from_extensions(x509.extensions())
}

pub(crate) fn key_usage_from_extensions(
    extensions: &[X509Extension<'_>],
) -> Result<Vec<KeyUsage>, MetadataError> {
    let ext = find_extension(extensions, &OID_KEY_USAGE).ok_or(MetadataError::KeyUsageNotFound)?;
    let (_, bits) = BitString::from_der(ext.value)
        .map_err(|e| MetadataError::Structure(e.to_string()))?;
    let total_bits = bits
        .data
        .len()
        .saturating_mul(8)
        .saturating_sub(usize::from(bits.unused_bits));
    let mut usage = Vec::new();
    for bit in 0..total_bits.min(KeyUsage::ALL.len()) {
        if bits.data[bit / 8] & (0x80 >> (bit % 8)) != 0 {
            if let Some(u) = KeyUsage::from_bit(bit) {
                usage.push(u);
            }
        }
    }
    Ok(usage)
}

/// Scans the subject DN for the organisation role (organizationalUnit,
/// 2 hex digits) and identity (uniqueIdentifier, 64-bit BIT STRING).
///
/// Attribute order is not guaranteed. A role value that is not exactly
/// 2 hex digits, or an identity that is not exactly 64 bits, is
/// silently skipped; the scan fails only if either fact is still
/// missing at the end.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidSubject`] when role or identity is
/// missing.
pub fn parse_organisation_subject(subject: &X509Name<'_>) -> Result<(Eui, u8), MetadataError> {
    let mut role: Option<u8> = None;
    let mut eui: Option<Eui> = None;

    for rdn in subject.iter() {
        for attr in rdn.iter() {
            if *attr.attr_type() == OID_ORGANIZATIONAL_UNIT {
                if let Ok(value) = attr.as_str() {
                    if value.len() == 2 && value.chars().all(|c| c.is_ascii_hexdigit()) {
                        role = u8::from_str_radix(value, 16).ok();
                    }
                }
            }
            if *attr.attr_type() == OID_UNIQUE_IDENTIFIER {
                let any = attr.attr_value();
                // 64-bit BIT STRING: one unused-bits octet (zero) plus 8 data octets
                if any.tag() == Tag::BitString && any.data.len() == 9 && any.data[0] == 0 {
                    eui = Eui::from_bytes(&any.data[1..]).ok();
                }
            }
        }
    }

    match (eui, role) {
        (Some(eui), Some(role)) => Ok((eui, role)),
        _ => Err(MetadataError::InvalidSubject),
    }
}

/// Extracts the hardware identity from the subjectAltName extension.
///
/// Scans the GeneralNames for an otherName whose type-id is
/// id-on-hardwareModuleName and reads its 8-byte hwSerialNum.
///
/// # Errors
///
/// Returns [`MetadataError::SubjectAltNameNotFound`] if the extension
/// is absent, or [`MetadataError::HardwareSerialNotFound`] if no
/// conforming otherName entry exists.
pub fn parse_device_identity(cert: &Certificate) -> Result<Eui, MetadataError> {
    let x509 = parse(cert)?;
    let ext = find_extension(x509.extensions(), &OID_SUBJECT_ALT_NAME)
        .ok_or(MetadataError::SubjectAltNameNotFound)?;
    let (_, names) =
        Sequence::from_der(ext.value).map_err(|e| MetadataError::Structure(e.to_string()))?;

    let mut rest: &[u8] = &names.content;
    while !rest.is_empty() {
        let (next, name) =
            Any::from_der(rest).map_err(|e| MetadataError::Structure(e.to_string()))?;
        rest = next;
        // otherName is [0] constructed in the GeneralName CHOICE
        if name.class() != Class::ContextSpecific || name.tag() != Tag(0) {
            continue;
        }
        let Ok((after_type, type_id)) = Oid::from_der(name.data) else {
            continue;
        };
        if type_id != OID_HARDWARE_MODULE_NAME {
            continue;
        }
        // [0] EXPLICIT HardwareModuleName ::= SEQUENCE { hwType OID, hwSerialNum OCTET STRING }
        let Ok((_, wrapper)) = Any::from_der(after_type) else {
            continue;
        };
        let Ok((_, hw_module)) = Sequence::from_der(wrapper.data) else {
            continue;
        };
        let Ok((after_hw_type, _hw_type)) = Oid::from_der(hw_module.content.as_ref()) else {
            continue;
        };
        let Ok((_, serial)) = Any::from_der(after_hw_type) else {
            continue;
        };
        if serial.tag() == Tag::OctetString {
            return Eui::from_bytes(serial.data)
                .map_err(|_| MetadataError::HardwareSerialNotFound);
        }
    }
    Err(MetadataError::HardwareSerialNotFound)
}

/// Checks that the certificate is signed with ECDSA-with-SHA256.
///
/// # Errors
///
/// Returns [`MetadataError::UnsupportedAlgorithm`] for any other
/// signature algorithm.
pub fn assert_algorithm(cert: &X509Certificate<'_>) -> Result<(), MetadataError> {
    let oid = &cert.tbs_certificate.signature.algorithm;
    if *oid != OID_ECDSA_WITH_SHA256 {
        return Err(MetadataError::UnsupportedAlgorithm {
            oid: oid.to_id_string(),
        });
    }
    Ok(())
}

/// Builds metadata assuming the organisation layout.
///
/// # Errors
///
/// Propagates the first failing sub-step: algorithm, subject, then key
/// usage.
pub fn organisation_metadata(cert: &Certificate) -> Result<CertificateMetadata, MetadataError> {
    let x509 = parse(cert)?;
    assert_algorithm(&x509)?;
    let serial = x509.tbs_certificate.serial.clone();
    let (eui, role) = parse_organisation_subject(x509.subject())?;
    let key_usage = key_usage_from_extensions(x509.extensions())?;
    Ok(CertificateMetadata {
        eui,
        serial,
        role: Some(role),
        key_usage,
    })
}

/// Builds metadata assuming the device layout.
///
/// # Errors
///
/// Propagates the first failing sub-step: algorithm, subjectAltName,
/// then key usage.
pub fn device_metadata(cert: &Certificate) -> Result<CertificateMetadata, MetadataError> {
    let x509 = parse(cert)?;
    assert_algorithm(&x509)?;
    let serial = x509.tbs_certificate.serial.clone();
    let eui = parse_device_identity(cert)?;
    let key_usage = key_usage_from_extensions(x509.extensions())?;
    Ok(CertificateMetadata {
        eui,
        serial,
        role: None,
        key_usage,
    })
}

/// Classifies a certificate by attempting the organisation extraction
/// first and the device extraction second.
///
/// # Errors
///
/// Returns [`MetadataError::Unrecognized`] only after both extractions
/// have failed.
pub fn extract_metadata(cert: &Certificate) -> Result<CertificateMetadata, MetadataError> {
    organisation_metadata(cert)
        .or_else(|_| device_metadata(cert))
        .map_err(|_| MetadataError::Unrecognized)
}

fn parse<'a>(cert: &'a Certificate) -> Result<X509Certificate<'a>, MetadataError> {
    cert.parse().map_err(|e| MetadataError::Structure(e.to_string()))
}

fn find_extension<'a, 'b>(
    extensions: &'a [X509Extension<'b>],
    oid: &Oid<'static>,
) -> Option<&'a X509Extension<'b>> {
    extensions.iter().find(|ext| ext.oid == *oid)
}
