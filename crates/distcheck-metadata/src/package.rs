use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::archive::read_metadata_file;
use crate::parser::parse_metadata;
use crate::{DistFormat, MetadataDictionary, MetadataValue, PackageError, PackageMetadata};

/// An opened distribution artifact with its parsed metadata.
#[derive(Debug, Clone)]
pub struct PackageFile {
    pub path: PathBuf,
    /// Base name of the artifact.
    pub basefilename: String,
    pub format: DistFormat,
    pub python_version: String,
    pub metadata: PackageMetadata,
    /// Lower-case hex SHA-256 of the artifact bytes.
    pub sha256_digest: String,
}

impl PackageFile {
    /// Open `path`, detect its format and read its core metadata.
    pub fn from_filename(path: &Path) -> Result<Self, PackageError> {
        let format = DistFormat::detect(path)?;
        let basefilename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let raw = read_metadata_file(path, format)?;
        let metadata = parse_metadata(&raw)?;

        Ok(Self {
            path: path.to_path_buf(),
            python_version: format.python_version(&basefilename),
            basefilename,
            format,
            metadata,
            sha256_digest: sha256_file(path)?,
        })
    }

    /// Metadata plus artifact-level fields, keyed by upload form field name.
    pub fn metadata_dictionary(&self) -> MetadataDictionary {
        let mut dict = self.metadata.to_dictionary();
        dict.insert("filetype".to_string(), MetadataValue::from(self.format.filetype()));
        dict.insert("pyversion".to_string(), MetadataValue::from(self.python_version.as_str()));
        dict.insert("sha256_digest".to_string(), MetadataValue::from(self.sha256_digest.as_str()));
        dict
    }
}

fn sha256_file(path: &Path) -> Result<String, PackageError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
