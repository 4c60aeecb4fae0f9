use std::path::Path;

use serde::Serialize;

use crate::PackageError;

/// Distribution formats recognized by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistFormat {
    Wheel,
    Egg,
    Sdist,
}

impl DistFormat {
    /// Detect the format from the artifact's file name.
    pub fn detect(path: &Path) -> Result<Self, PackageError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PackageError::UnknownFormat(path.to_path_buf()))?;

        if name.ends_with(".whl") {
            Ok(Self::Wheel)
        } else if name.ends_with(".egg") {
            Ok(Self::Egg)
        } else if name.ends_with(".tar.gz") || name.ends_with(".zip") {
            Ok(Self::Sdist)
        } else {
            Err(PackageError::UnknownFormat(path.to_path_buf()))
        }
    }

    /// The `filetype` value an index expects for this format.
    pub fn filetype(&self) -> &'static str {
        match self {
            Self::Wheel => "bdist_wheel",
            Self::Egg => "bdist_egg",
            Self::Sdist => "sdist",
        }
    }

    /// Python tag for the artifact: the wheel or egg file name tag, or
    /// `source` for sdists.
    pub fn python_version(&self, file_name: &str) -> String {
        match self {
            Self::Sdist => "source".to_string(),
            Self::Wheel => {
                let stem = file_name.strip_suffix(".whl").unwrap_or(file_name);
                let parts: Vec<&str> = stem.split('-').collect();
                // name-version[-build]-python-abi-platform
                if parts.len() >= 5 {
                    parts[parts.len() - 3].to_string()
                } else {
                    "any".to_string()
                }
            }
            Self::Egg => {
                let stem = file_name.strip_suffix(".egg").unwrap_or(file_name);
                stem.split('-')
                    .skip(2)
                    .find(|part| {
                        part.strip_prefix("py")
                            .and_then(|rest| rest.chars().next())
                            .map_or(false, |c| c.is_ascii_digit())
                    })
                    .unwrap_or("any")
                    .to_string()
            }
        }
    }
}
