//! distcheck - pre-upload checks for Python distributions
//!
//! Reads the metadata of wheels, eggs and sdists and verifies that the long
//! description will render on a package index.

pub mod check;
pub mod config;
pub mod dists;
pub mod logging;

pub use check::{
    check, ArchiveLoader, ArtifactReport, CheckError, Checker, PackageLoader, RunSummary, Verdict,
    WarningStream,
};
pub use config::{CheckSettings, ConfigError, EffectiveConfig};
pub use dists::{DistributionLocator, GlobLocator, LocateError};
