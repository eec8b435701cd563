//! Versions, version ranges and target frameworks.
//!
//! Everything here is pure: parsing, ordering and compatibility rules with no
//! I/O. The lock file model lives alongside since its strings are built from
//! these types.

pub mod encode;
pub mod framework;
pub mod version;

pub use encode::{DependencyGroup, LockFile, LOCK_FORMAT_VERSION};
pub use framework::{compatible_frameworks, FrameworkName, UnsupportedFramework};
pub use version::{
    resolve_assembly_file_version, resolve_version, FileVersion, SemanticVersion, VersionError,
    VersionRange,
};
