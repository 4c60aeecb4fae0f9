//! Core metadata reader for Python distribution artifacts.
//!
//! Opens wheels, eggs and source distributions, finds the metadata file
//! inside the archive and parses it into [`PackageMetadata`].

mod archive;
mod error;
mod format;
mod metadata;
mod package;
mod parser;

pub use archive::read_metadata_file;
pub use error::PackageError;
pub use format::DistFormat;
pub use metadata::{MetadataDictionary, MetadataValue, PackageMetadata};
pub use package::PackageFile;
pub use parser::{parse_metadata, SUPPORTED_METADATA_VERSIONS};
