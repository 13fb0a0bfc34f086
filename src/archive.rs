//! ZIP building, extraction, and listing for the inner archive payload.
//!
//! Archives here are small (one manifest's worth of config files), so the
//! whole ZIP lives in memory on both paths.

use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::PackError;
use crate::manifest::ResolvedFile;

/// Validate archive entry paths to prevent path traversal attacks (ZipSlip).
/// Rejects entries containing ".." components, absolute paths, or Windows drive prefixes.
fn is_safe_archive_entry(entry_name: &str) -> bool {
    if entry_name.contains("..") {
        return false;
    }
    if entry_name.starts_with('/') {
        return false;
    }
    if entry_name.len() >= 2 && entry_name.as_bytes()[1] == b':' {
        return false;
    }
    if entry_name.starts_with('\\') {
        return false;
    }
    true
}

/// Metadata for a single entry inside an archive
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ZipEntryInfo {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    pub is_dir: bool,
    pub modified: Option<String>,
}

/// Build a ZIP from resolved manifest files, one entry per pair.
///
/// Entry names are the canonical manifest names, not the source files'
/// on-disk names. An unreadable source fails with `Io` carrying its path.
pub fn build(entries: &[ResolvedFile]) -> Result<Vec<u8>, PackError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)
            .map_err(|e| PackError::CorruptArchive(format!("zip write failed: {}", e)))?;
        let mut source =
            File::open(&entry.path).map_err(PackError::io(entry.path.clone()))?;
        std::io::copy(&mut source, &mut zip).map_err(PackError::io(entry.path.clone()))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| PackError::CorruptArchive(format!("zip finalize failed: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Extract every file entry of `zip_bytes` under `dest_dir`, overwriting
/// existing files of the same name. Pure-directory entries are skipped;
/// intermediate directories are created as needed. Returns the extracted
/// relative paths in archive order.
pub fn extract(zip_bytes: &[u8], dest_dir: &Path) -> Result<Vec<String>, PackError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .map_err(|e| PackError::CorruptArchive(format!("failed to read archive: {}", e)))?;

    fs::create_dir_all(dest_dir).map_err(PackError::io(dest_dir))?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| PackError::CorruptArchive(format!("failed to read entry {}: {}", i, e)))?;
        let name = entry.name().to_string();

        if name.ends_with('/') {
            continue;
        }
        if !is_safe_archive_entry(&name) {
            return Err(PackError::CorruptArchive(format!(
                "unsafe archive entry path rejected: {}",
                name
            )));
        }

        let outpath = dest_dir.join(&name);
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(PackError::io(parent))?;
        }
        let mut outfile = File::create(&outpath).map_err(PackError::io(outpath.clone()))?;
        std::io::copy(&mut entry, &mut outfile).map_err(PackError::io(outpath))?;

        extracted.push(name);
    }

    Ok(extracted)
}

/// Metadata-only listing of a ZIP payload. Nothing is decompressed.
pub fn list(zip_bytes: &[u8]) -> Result<Vec<ZipEntryInfo>, PackError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .map_err(|e| PackError::CorruptArchive(format!("failed to read archive: {}", e)))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let raw = archive
            .by_index_raw(i)
            .map_err(|e| PackError::CorruptArchive(format!("failed to read entry {}: {}", i, e)))?;
        let name = raw.name().to_string();
        let is_dir = name.ends_with('/');
        let modified = raw.last_modified().map(|dt| {
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            )
        });

        entries.push(ZipEntryInfo {
            name,
            size: raw.size(),
            compressed_size: raw.compressed_size(),
            is_dir,
            modified,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_fixture(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_build_extract_round_trip() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let a = write_fixture(src.path(), "trace_src.ini", b"[trace]\nlevel=2\n");
        let b = write_fixture(src.path(), "xp_src.dat", &[0u8, 1, 2, 255, 254]);

        let entries = vec![
            ResolvedFile { name: "Trace.ini".into(), path: a },
            ResolvedFile { name: "XP.DAT".into(), path: b },
        ];
        let zip_bytes = build(&entries).unwrap();
        let extracted = extract(&zip_bytes, dest.path()).unwrap();

        // Canonical names in archive order, contents byte-identical
        assert_eq!(extracted, vec!["Trace.ini", "XP.DAT"]);
        assert_eq!(fs::read(dest.path().join("Trace.ini")).unwrap(), b"[trace]\nlevel=2\n");
        assert_eq!(fs::read(dest.path().join("XP.DAT")).unwrap(), vec![0u8, 1, 2, 255, 254]);
    }

    #[test]
    fn test_build_missing_source_reports_path() {
        let entries = vec![ResolvedFile {
            name: "kop.def".into(),
            path: PathBuf::from("/nonexistent/kop.def"),
        }];
        match build(&entries).unwrap_err() {
            PackError::Io { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/kop.def")),
            other => panic!("expected Io, got {}", other),
        }
    }

    #[test]
    fn test_extract_overwrites_existing_files() {
        let dest = tempfile::tempdir().unwrap();
        let src = tempfile::tempdir().unwrap();
        let first = write_fixture(src.path(), "v1", b"first contents");
        let second = write_fixture(src.path(), "v2", b"second");

        let zip1 = build(&[ResolvedFile { name: "port.info".into(), path: first }]).unwrap();
        let zip2 = build(&[ResolvedFile { name: "port.info".into(), path: second }]).unwrap();
        extract(&zip1, dest.path()).unwrap();
        extract(&zip2, dest.path()).unwrap();

        assert_eq!(fs::read(dest.path().join("port.info")).unwrap(), b"second");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let dest = tempfile::tempdir().unwrap();
        let err = extract(b"definitely not a zip stream", dest.path()).unwrap_err();
        assert!(matches!(err, PackError::CorruptArchive(_)));
    }

    #[test]
    fn test_extract_rejects_traversal_entries() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("../evil.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"payload").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let dest = tempfile::tempdir().unwrap();
        let err = extract(&bytes, dest.path()).unwrap_err();
        assert!(matches!(err, PackError::CorruptArchive(_)));
        assert!(!dest.path().parent().unwrap().join("evil.txt").exists());
    }

    #[test]
    fn test_extract_skips_directory_entries() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory("subdir/", SimpleFileOptions::default()).unwrap();
        zip.start_file("subdir/inner.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"nested").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let dest = tempfile::tempdir().unwrap();
        let extracted = extract(&bytes, dest.path()).unwrap();
        assert_eq!(extracted, vec!["subdir/inner.txt"]);
        assert_eq!(fs::read(dest.path().join("subdir/inner.txt")).unwrap(), b"nested");
    }

    #[test]
    fn test_list_metadata() {
        let src = tempfile::tempdir().unwrap();
        let path = write_fixture(src.path(), "srm.log", b"log line\nlog line\n");
        let zip_bytes = build(&[ResolvedFile { name: "SRM.LOG".into(), path }]).unwrap();

        let listing = list(&zip_bytes).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "SRM.LOG");
        assert_eq!(listing[0].size, 18);
        assert!(!listing[0].is_dir);
    }

    #[test]
    fn test_safe_entry_predicate() {
        assert!(is_safe_archive_entry("Simulator.ini"));
        assert!(is_safe_archive_entry("subdir/file.txt"));
        assert!(!is_safe_archive_entry("../escape"));
        assert!(!is_safe_archive_entry("/etc/passwd"));
        assert!(!is_safe_archive_entry("C:\\windows\\system32"));
        assert!(!is_safe_archive_entry("\\\\share\\x"));
    }
}
