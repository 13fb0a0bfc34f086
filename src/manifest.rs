//! The fixed manifest of required site-configuration files and the
//! case-insensitive resolver that matches candidate paths against it.

use std::path::PathBuf;

use serde::Serialize;

/// Core config files every site carries. The siteview pairs are generated
/// separately, so the two sets stay disjoint by construction.
const CORE_FILES: &[&str] = &[
    "VMFUNC.C",
    "iout.cfg",
    "Simulator.ini",
    "Trace.ini",
    "statecolors.ini",
    "BICS.DAT",
    "ED16.DAT",
    "IOT.dat",
    "MMI.DAT",
    "SADAT.DAT",
    "XP.DAT",
    "kop.def",
    "port.info",
    "SRM.LOG",
    "XLOG.LOG",
    "XPARCHANGEO.LOG",
    "report01.html",
    "configNotes.txt",
    "default_Flop_Files.zip",
];

const SITEVIEW_COUNT: u32 = 10;

/// A required file matched to its on-disk source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    /// Canonical manifest name; becomes the archive entry name regardless
    /// of the source file's on-disk casing.
    pub name: String,
    pub path: PathBuf,
}

/// Result of matching a candidate set against the manifest. Both lists
/// keep manifest order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub matches: Vec<ResolvedFile>,
    pub missing: Vec<String>,
}

/// Immutable ordered set of required filenames, built once at startup and
/// passed by reference into every packaging call.
#[derive(Debug, Clone)]
pub struct Manifest {
    names: Vec<String>,
}

impl Manifest {
    /// The standard manifest: the core list plus `siteview1..10.ini` and
    /// `siteview1..10.png` (39 names).
    pub fn standard() -> Self {
        let mut names: Vec<String> = CORE_FILES.iter().map(|s| s.to_string()).collect();
        for i in 1..=SITEVIEW_COUNT {
            names.push(format!("siteview{}.ini", i));
        }
        for i in 1..=SITEVIEW_COUNT {
            names.push(format!("siteview{}.png", i));
        }
        Manifest { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Match `candidates` against the manifest by file-name component,
    /// ignoring ASCII case. First candidate wins on duplicates, so callers
    /// wanting reproducible picks should pass a sorted listing. Pure and
    /// read-only: file contents are never opened here.
    pub fn resolve(&self, candidates: &[PathBuf]) -> Resolution {
        let mut matches = Vec::new();
        let mut missing = Vec::new();

        for name in &self.names {
            let found = candidates.iter().find(|path| {
                path.file_name()
                    .map(|f| f.to_string_lossy().eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            });
            match found {
                Some(path) => matches.push(ResolvedFile {
                    name: name.clone(),
                    path: path.clone(),
                }),
                None => missing.push(name.clone()),
            }
        }

        Resolution { matches, missing }
    }
}
