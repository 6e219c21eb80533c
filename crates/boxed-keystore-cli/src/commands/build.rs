//! `build`: seed a key store document from a DCC Boxed instance.
//!
//! Downloads the organisation crypto bundle (`org-crypto.zip`), pairs
//! each certificate under a `cert/` directory with its key under the
//! sibling `key/` directory and pushes the pairs into a fresh store
//! document. Individual bad bundle entries are warned about and
//! skipped; transport failures abort the build. Explicitly named
//! serials are fetched from the SMKI retrieval service afterwards.

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use num_bigint::BigUint;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{info, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use boxed_keystore_core::{
    Certificate, Directory as _, DirectoryClient, KeyStore as _, KeyStoreDb, PrivateKey,
    PushOptions, StoreError,
};

const BUNDLE_PATH: &str = "assets/crypto/org-crypto.zip";

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Address of the DCC Boxed server.
    boxed_address: String,

    /// Output key store document.
    #[arg(default_value = "keystore.json")]
    output: PathBuf,

    /// Certificate serials (hex) to fetch from the SMKI service.
    #[arg(long, value_name = "SERIAL")]
    serial: Vec<String>,
}

pub fn run(args: &BuildArgs) -> Result<()> {
    if args.output.exists() {
        bail!("output file {} already exists", args.output.display());
    }
    let mut db = KeyStoreDb::open(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    info!(server = %args.boxed_address, "fetching org-crypto.zip");
    let bundle = download_bundle(&args.boxed_address)?;
    let mut archive =
        ZipArchive::new(Cursor::new(bundle)).context("org-crypto.zip is not a zip archive")?;
    let stored = import_bundle(&mut db, &mut archive)?;
    info!(stored, output = %args.output.display(), "bundle imported");

    if !args.serial.is_empty() {
        let directory = DirectoryClient::new(&args.boxed_address)?;
        for serial in &args.serial {
            fetch_serial(&mut db, &directory, serial)?;
        }
    }
    Ok(())
}

/// HEAD then GET of the crypto bundle, verifying content type and
/// length both times.
fn download_bundle(address: &str) -> Result<Vec<u8>> {
    let url = format!("http://{address}/{BUNDLE_PATH}");
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(1))
        .timeout(Duration::from_secs(5))
        .build()
        .context("failed to build http client")?;

    let head = client
        .head(&url)
        .send()
        .with_context(|| format!("HEAD {url} failed"))?;
    if head.status().as_u16() != 200 {
        bail!("server returned {} for {url}", head.status());
    }
    let content_type = head
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .context("server sent no content type")?;
    if media_type(content_type) != "application/zip" {
        bail!("expected a zip file, received {content_type}");
    }
    let expected_length: usize = head
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .context("server sent no usable content length")?;
    if expected_length == 0 {
        bail!("server reports an empty bundle");
    }
    info!(size = expected_length, "found bundle");

    let body = client
        .get(&url)
        .header(ACCEPT_ENCODING, "identity")
        .send()
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()
        .context("bundle download failed")?
        .bytes()
        .context("failed to read bundle body")?;
    if body.len() != expected_length {
        bail!(
            "received {} bytes, expected {expected_length}",
            body.len()
        );
    }
    Ok(body.to_vec())
}

/// Pushes every cert/key pair found in the bundle, returning how many
/// were stored. Entries that cannot be paired or parsed are skipped
/// with a warning.
fn import_bundle<R: Read + Seek>(
    db: &mut KeyStoreDb,
    archive: &mut ZipArchive<R>,
) -> Result<usize> {
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    let mut stored = 0;
    for name in names {
        let Some(key_name) = matching_key_name(&name) else {
            continue;
        };
        info!(entry = %name, "found certificate");
        let cert_pem = read_entry(archive, &name)?;
        let key_pem = match read_optional_entry(archive, &key_name)? {
            Some(data) => data,
            None => {
                warn!(entry = %key_name, "could not find key for certificate");
                continue;
            }
        };

        let parsed = Certificate::from_pem(&String::from_utf8_lossy(&cert_pem))
            .map_err(anyhow::Error::from)
            .and_then(|cert| {
                let key = PrivateKey::from_pkcs8_pem(&String::from_utf8_lossy(&key_pem))?;
                Ok((cert, key))
            });
        let (cert, key) = match parsed {
            Ok(pair) => pair,
            Err(err) => {
                warn!(entry = %name, %err, "skipping unreadable entry");
                continue;
            }
        };

        let options = match entry_stem(&name) {
            Some(stem) => PushOptions::certificate_with_key(cert, key).with_name(stem),
            None => PushOptions::certificate_with_key(cert, key),
        };
        match db.push(options) {
            Ok(meta) => {
                info!(eui = %meta.eui, usage = ?meta.key_usage, "stored key pair");
                stored += 1;
            }
            Err(StoreError::KeyMismatch) => {
                warn!(entry = %name, "failed public/private key check");
            }
            Err(err) => {
                warn!(entry = %name, %err, "bad org certificate");
            }
        }
    }
    Ok(stored)
}

/// Retrieves one certificate by serial and stores it.
fn fetch_serial(db: &mut KeyStoreDb, directory: &DirectoryClient, serial: &str) -> Result<()> {
    let serial_hex = serial.trim_start_matches("0x");
    let Some(value) = BigUint::parse_bytes(serial_hex.as_bytes(), 16) else {
        bail!("{serial} is not a hex serial number");
    };
    match directory.retrieve(&value)? {
        Some(entry) => {
            let meta = db.push(PushOptions::certificate(entry.certificate))?;
            info!(eui = %meta.eui, usage = ?meta.key_usage, "fetched and stored certificate");
        }
        None => warn!(serial, "no certificate with that serial"),
    }
    Ok(())
}

/// The bundle stores pairs as `<dir>/cert/<name>.pem` and
/// `<dir>/key/<name>.key`. Returns the key entry name for a
/// certificate entry, or `None` if the entry is not a certificate.
fn matching_key_name(entry: &str) -> Option<String> {
    let stripped = entry.strip_suffix(".pem")?;
    let dir = Path::new(entry).parent()?.to_str()?;
    if !dir.contains("cert") {
        return None;
    }
    Some(format!("{}.key", stripped.replacen("/cert/", "/key/", 1)))
}

fn entry_stem(entry: &str) -> Option<&str> {
    Path::new(entry).file_stem()?.to_str()
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or(content_type).trim()
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .with_context(|| format!("failed to open {name} in bundle"))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .with_context(|| format!("failed to read {name} from bundle"))?;
    Ok(data)
}

fn read_optional_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .with_context(|| format!("failed to read {name} from bundle"))?;
            Ok(Some(data))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to open {name} in bundle")),
    }
}
