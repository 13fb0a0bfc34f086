//! Sitepack CLI — package and restore encrypted site-configuration archives
//!
//! Usage:
//!   sitepack-cli pack <source_dir> <output> -p <password>   Package a site directory
//!   sitepack-cli restore <archive> <dest_dir> [-p <pw>]     Restore an archive
//!   sitepack-cli inspect <path>                             Classify and peek at an archive
//!   sitepack-cli manifest                                   Print the required file list
//!
//! The password may also come from the SITEPACK_PASSWORD environment
//! variable; the flag wins when both are set.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use sitepack::{classify, ArchiveKind, Manifest};

#[derive(Parser)]
#[command(
    name = "sitepack-cli",
    about = "Sitepack CLI — encrypted site-configuration archives",
    version
)]
struct Cli {
    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (DEBUG instead of INFO)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the manifest files in a site directory into an encrypted archive
    Pack {
        /// Directory holding the site's config files (scanned non-recursively)
        source_dir: PathBuf,
        /// Output container path (conventionally *.zip.enc)
        output: PathBuf,
        /// Archive password (falls back to SITEPACK_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Restore an archive into a destination directory
    Restore {
        /// Archive path (*.zip.enc / *.enczip for encrypted, *.zip for plain)
        archive: PathBuf,
        /// Destination directory (existing files are overwritten)
        dest_dir: PathBuf,
        /// Archive password, required for encrypted archives
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Classify an archive file and show its header or entry listing
    Inspect {
        /// Archive path
        path: PathBuf,
    },
    /// Print the required file manifest
    Manifest,
}

/// Flag wins over environment; empty values are rejected downstream.
fn resolve_password(flag: Option<String>) -> Option<SecretString> {
    flag.or_else(|| std::env::var("SITEPACK_PASSWORD").ok())
        .map(SecretString::from)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pack { source_dir, output, password } => {
            let password = resolve_password(password)
                .context("no password given (use --password or SITEPACK_PASSWORD)")?;
            let manifest = Manifest::standard();
            let outcome =
                sitepack::package(&manifest, &source_dir, &output, password.expose_secret())?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("Packaged {} file(s) into {}", outcome.packed.len(), output.display());
                if !outcome.missing.is_empty() {
                    println!("Missing {} required file(s):", outcome.missing.len());
                    for name in &outcome.missing {
                        println!("  - {}", name);
                    }
                }
            }
            // Missing files are reportable output, not a failure
            Ok(())
        }
        Commands::Restore { archive, dest_dir, password } => {
            let outcome = match classify(&archive) {
                ArchiveKind::Encrypted => {
                    let password = resolve_password(password).context(
                        "encrypted archive needs a password (--password or SITEPACK_PASSWORD)",
                    )?;
                    sitepack::restore_encrypted(&archive, &dest_dir, password.expose_secret())?
                }
                ArchiveKind::Plain => sitepack::restore_plain(&archive, &dest_dir)?,
                ArchiveKind::Neither => {
                    bail!(
                        "{} is not an archive (expected .zip, .zip.enc or .enczip)",
                        archive.display()
                    )
                }
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "Restored {} file(s) into {}",
                    outcome.extracted.len(),
                    dest_dir.display()
                );
                for name in &outcome.extracted {
                    println!("  {}", name);
                }
            }
            Ok(())
        }
        Commands::Inspect { path } => {
            let kind = classify(&path);
            match kind {
                ArchiveKind::Encrypted => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let info = sitepack::container::inspect(&bytes)?;
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::json!({ "kind": kind, "container": info })
                        );
                    } else {
                        println!("{}: encrypted container", path.display());
                        println!("  total length:      {} bytes", info.total_len);
                        println!("  ciphertext length: {} bytes", info.ciphertext_len);
                        println!("  salt: {}", info.salt);
                        println!("  iv:   {}", info.iv);
                    }
                }
                ArchiveKind::Plain => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let entries = sitepack::archive::list(&bytes)?;
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::json!({ "kind": kind, "entries": entries })
                        );
                    } else {
                        println!("{}: plain zip, {} entries", path.display(), entries.len());
                        for e in &entries {
                            println!(
                                "  {:>10}  {:>10}  {}",
                                e.size,
                                e.modified.as_deref().unwrap_or("-"),
                                e.name
                            );
                        }
                    }
                }
                ArchiveKind::Neither => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "kind": kind }));
                    } else {
                        println!("{}: not an archive this tool handles", path.display());
                    }
                }
            }
            Ok(())
        }
        Commands::Manifest => {
            let manifest = Manifest::standard();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(manifest.names())?);
            } else {
                for name in manifest.names() {
                    println!("{}", name);
                }
            }
            Ok(())
        }
    }
}
