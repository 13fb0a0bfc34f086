// Sitepack - Encrypted site-configuration archive engine
// Packages a fixed manifest of config files into a portable encrypted
// container (salt ‖ IV ‖ AES-256-CBC ciphertext) and restores it later
// into per-site working directories.

pub mod archive;
pub mod container;
pub mod engine;
pub mod error;
pub mod kdf;
pub mod manifest;

pub use archive::ZipEntryInfo;
pub use container::ContainerInfo;
pub use engine::{classify, package, restore_encrypted, restore_plain};
pub use engine::{ArchiveKind, PackageOutcome, RestoreOutcome};
pub use error::PackError;
pub use manifest::{Manifest, Resolution, ResolvedFile};
