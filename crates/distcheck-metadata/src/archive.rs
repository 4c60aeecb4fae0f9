//! Locating and reading the core metadata file inside an artifact.
//!
//! | Format | Member                         |
//! |--------|--------------------------------|
//! | wheel  | `<name>.dist-info/METADATA`    |
//! | egg    | `EGG-INFO/PKG-INFO`            |
//! | sdist  | `<root>/PKG-INFO`              |

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

use crate::{DistFormat, PackageError};

/// Read the raw metadata file for `path`.
pub fn read_metadata_file(path: &Path, format: DistFormat) -> Result<Vec<u8>, PackageError> {
    match format {
        DistFormat::Wheel => read_zip_member(path, |names| {
            let mut candidates: Vec<&String> = names
                .iter()
                .filter(|name| {
                    let parts = split_member(name);
                    parts.len() == 2 && parts[0].ends_with(".dist-info") && parts[1] == "METADATA"
                })
                .collect();
            candidates.sort();
            candidates
                .first()
                .map(|name| name.to_string())
                .ok_or_else(|| missing("METADATA", path))
        }),
        DistFormat::Egg => read_zip_member(path, |names| {
            names
                .iter()
                .find(|name| split_member(name) == ["EGG-INFO", "PKG-INFO"])
                .cloned()
                .ok_or_else(|| missing("PKG-INFO", path))
        }),
        DistFormat::Sdist if is_zip(path) => {
            read_zip_member(path, |names| sdist_member(path, names.iter().map(String::as_str)))
        }
        DistFormat::Sdist => read_tar_member(path),
    }
}

fn missing(member: &'static str, path: &Path) -> PackageError {
    PackageError::MissingMember {
        member,
        path: path.to_path_buf(),
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "zip")
}

/// Split a member name into its non-empty path components.
fn split_member(name: &str) -> Vec<&str> {
    name.split('/').filter(|part| !part.is_empty() && *part != ".").collect()
}

/// Pick `<root>/PKG-INFO` from sdist member names. All members must share
/// a single top-level directory.
fn sdist_member<'a>(
    path: &Path,
    names: impl Iterator<Item = &'a str>,
) -> Result<String, PackageError> {
    let mut root: Option<&str> = None;
    let mut found = None;
    for name in names {
        let parts = split_member(name);
        let Some(first) = parts.first().copied() else {
            continue;
        };
        match root {
            None => root = Some(first),
            Some(existing) if existing != first => {
                return Err(PackageError::MultipleRoots(path.to_path_buf()));
            }
            Some(_) => {}
        }
        if parts.len() == 2 && parts[1] == "PKG-INFO" {
            found = Some(name.to_string());
        }
    }
    found.ok_or_else(|| missing("PKG-INFO", path))
}

fn read_zip_member<F>(path: &Path, pick: F) -> Result<Vec<u8>, PackageError>
where
    F: FnOnce(&[String]) -> Result<String, PackageError>,
{
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let name = pick(&names)?;

    let mut entry = archive.by_name(&name)?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

fn read_tar_member(path: &Path) -> Result<Vec<u8>, PackageError> {
    let file = File::open(path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut root: Option<PathBuf> = None;
    let mut data = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        let parts: Vec<&std::ffi::OsStr> = entry_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        let Some(first) = parts.first().copied() else {
            continue;
        };

        match &root {
            None => root = Some(PathBuf::from(first)),
            Some(existing) if existing.as_os_str() != first => {
                return Err(PackageError::MultipleRoots(path.to_path_buf()));
            }
            Some(_) => {}
        }

        let is_pkg_info = parts.len() == 2 && parts[1] == "PKG-INFO";
        if data.is_none() && is_pkg_info && entry.header().entry_type().is_file() {
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            data = Some(buf);
        }
    }

    data.ok_or_else(|| missing("PKG-INFO", path))
}
