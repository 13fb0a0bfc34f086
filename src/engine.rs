//! The two entry points the surrounding application calls: packaging a
//! source directory into an encrypted container, and restoring a container
//! (or a plain ZIP) into a destination directory.
//!
//! Every call is a self-contained transaction: no state survives between
//! calls, outcomes are plain return values, and logging here is ambient
//! instrumentation only - the returned outcome is the caller's report
//! channel.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::archive;
use crate::container;
use crate::error::PackError;
use crate::manifest::Manifest;

/// What a path's file name says about its archive format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArchiveKind {
    Encrypted,
    Plain,
    Neither,
}

/// Report from one packaging call. A non-empty `missing` list is normal
/// output, not a failure - packaging proceeds with whatever was found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageOutcome {
    pub packed: Vec<String>,
    pub missing: Vec<String>,
}

/// Report from one restore call: extracted entry names in archive order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub extracted: Vec<String>,
}

/// Classify a path by file name, ignoring ASCII case (the legacy system
/// ran on a case-insensitive filesystem). Pure string predicate, no I/O.
pub fn classify(path: &Path) -> ArchiveKind {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy().to_ascii_lowercase(),
        None => return ArchiveKind::Neither,
    };
    if name.ends_with(".zip.enc") || name.ends_with(".enczip") {
        ArchiveKind::Encrypted
    } else if name.ends_with(".zip") {
        ArchiveKind::Plain
    } else {
        ArchiveKind::Neither
    }
}

/// Package the manifest files found directly inside `source_dir`
/// (non-recursive) into an encrypted container at `output_path`.
pub fn package(
    manifest: &Manifest,
    source_dir: &Path,
    output_path: &Path,
    password: &str,
) -> Result<PackageOutcome, PackError> {
    if password.is_empty() {
        return Err(PackError::InvalidInput("password must not be empty".into()));
    }

    // Sorted listing keeps "first match wins" deterministic across
    // platforms; read_dir order is not
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(PackError::io(source_dir))? {
        let entry = entry.map_err(PackError::io(source_dir))?;
        let file_type = entry.file_type().map_err(PackError::io(entry.path()))?;
        if file_type.is_file() {
            candidates.push(entry.path());
        }
    }
    candidates.sort_by_key(|p| p.file_name().map(|f| f.to_os_string()));

    let resolution = manifest.resolve(&candidates);
    if !resolution.missing.is_empty() {
        warn!(
            missing = resolution.missing.len(),
            "packaging with incomplete manifest: {}",
            resolution.missing.join(", ")
        );
    }

    let zip_bytes = archive::build(&resolution.matches)?;
    let sealed = container::seal(&zip_bytes, password)?;
    write_atomic(output_path, &sealed)?;

    info!(
        packed = resolution.matches.len(),
        bytes = sealed.len(),
        "packaged {} into {}",
        source_dir.display(),
        output_path.display()
    );

    Ok(PackageOutcome {
        packed: resolution.matches.iter().map(|m| m.name.clone()).collect(),
        missing: resolution.missing,
    })
}

/// Decrypt the container at `archive_path` and extract its payload under
/// `dest_dir`. `DecryptionFailed` ("wrong password") propagates distinctly
/// from `CorruptArchive` ("password was fine, payload was not a zip").
pub fn restore_encrypted(
    archive_path: &Path,
    dest_dir: &Path,
    password: &str,
) -> Result<RestoreOutcome, PackError> {
    let sealed = fs::read(archive_path).map_err(PackError::io(archive_path))?;
    let zip_bytes = container::open(&sealed, password)?;
    let extracted = archive::extract(&zip_bytes, dest_dir)?;
    info!(entries = extracted.len(), "restored {} into {}", archive_path.display(), dest_dir.display());
    Ok(RestoreOutcome { extracted })
}

/// Extract a plain (unencrypted) ZIP file under `dest_dir`.
pub fn restore_plain(zip_path: &Path, dest_dir: &Path) -> Result<RestoreOutcome, PackError> {
    let zip_bytes = fs::read(zip_path).map_err(PackError::io(zip_path))?;
    let extracted = archive::extract(&zip_bytes, dest_dir)?;
    info!(entries = extracted.len(), "restored {} into {}", zip_path.display(), dest_dir.display());
    Ok(RestoreOutcome { extracted })
}

/// Atomic write: stage to a `.sptmp` sibling, then rename over the target
/// so a failed write never leaves a partial container behind.
fn write_atomic(output_path: &Path, bytes: &[u8]) -> Result<(), PackError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(PackError::io(parent))?;
        }
    }
    let mut tmp_name = output_path.as_os_str().to_os_string();
    tmp_name.push(".sptmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PackError::Io { path: tmp_path, source: e });
    }
    fs::rename(&tmp_path, output_path).map_err(PackError::io(output_path))
}
