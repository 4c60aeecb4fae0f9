//! The `check` command.
//!
//! For every artifact the locator returns, read its metadata, render the
//! long description with the renderer registered for its content type and
//! print one `Checking <path>: <STATUS>` line. Problems are reported through
//! `tracing`: errors for missing input and broken markup, warnings for
//! missing metadata and renderer diagnostics.

mod stream;
mod verdict;

pub use stream::WarningStream;
pub use verdict::{ArtifactReport, RunSummary, Verdict};

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use distcheck_metadata::{MetadataDictionary, MetadataValue, PackageError, PackageFile};
use distcheck_render::{ContentType, RendererRegistry};
use tracing::{debug, error, warn};

use crate::dists::{DistributionLocator, GlobLocator, LocateError};

/// Content type assumed when the metadata does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/x-rst";

pub const MISSING_CONTENT_TYPE: &str =
    "`long_description_content_type` missing. defaulting to `text/x-rst`.";

pub const MISSING_DESCRIPTION: &str = "`long_description` missing.";

/// Value some build tools write when no description was given.
const DESCRIPTION_PLACEHOLDER: &str = "UNKNOWN";

/// Errors that abort a check run
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("{path}: {source}")]
    Package {
        path: String,
        #[source]
        source: PackageError,
    },

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Reads the metadata dictionary of an artifact.
pub trait PackageLoader {
    fn load(&self, path: &Path) -> Result<MetadataDictionary, PackageError>;
}

/// Loader that opens wheels, eggs and sdists from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveLoader;

impl PackageLoader for ArchiveLoader {
    fn load(&self, path: &Path) -> Result<MetadataDictionary, PackageError> {
        Ok(PackageFile::from_filename(path)?.metadata_dictionary())
    }
}

/// What checking one description produced, before strict mode applies.
struct DescriptionOutcome {
    rendered: bool,
    warnings: Vec<String>,
    diagnostics: String,
}

/// Check orchestrator with injected collaborators.
pub struct Checker<'a> {
    locator: &'a dyn DistributionLocator,
    loader: &'a dyn PackageLoader,
    registry: &'a RendererRegistry,
    index_name: String,
    skip_signatures: bool,
}

impl<'a> Checker<'a> {
    pub fn new(
        locator: &'a dyn DistributionLocator,
        loader: &'a dyn PackageLoader,
        registry: &'a RendererRegistry,
    ) -> Self {
        Self {
            locator,
            loader,
            registry,
            index_name: "PyPI".to_string(),
            skip_signatures: true,
        }
    }

    /// Index named in the render failure message.
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Whether `.asc` signature files are dropped before checking.
    pub fn with_skip_signatures(mut self, skip: bool) -> Self {
        self.skip_signatures = skip;
        self
    }

    /// Run the check and return whether it failed.
    pub fn check(
        &self,
        patterns: &[String],
        strict: bool,
        out: &mut dyn Write,
    ) -> Result<bool, CheckError> {
        Ok(self.run(patterns, strict, out)?.failed)
    }

    /// Run the check, writing report lines to `out`.
    pub fn run(
        &self,
        patterns: &[String],
        strict: bool,
        out: &mut dyn Write,
    ) -> Result<RunSummary, CheckError> {
        let mut summary = RunSummary {
            created_at: Utc::now(),
            strict,
            index_name: self.index_name.clone(),
            failed: false,
            artifacts: Vec::new(),
        };

        let uploads: Vec<PathBuf> = self
            .locator
            .find_distributions(patterns)?
            .into_iter()
            .filter(|path| !(self.skip_signatures && is_signature(path)))
            .collect();

        if uploads.is_empty() {
            error!("No files to check.");
            summary.failed = true;
            return Ok(summary);
        }

        for path in &uploads {
            let display = path.display().to_string();
            let metadata = self.loader.load(path).map_err(|source| CheckError::Package {
                path: display.clone(),
                source,
            })?;

            let outcome = self.check_description(&metadata);
            let verdict = Verdict::classify(outcome.rendered, !outcome.warnings.is_empty(), strict);
            writeln!(out, "Checking {}: {}", display, verdict)?;

            let error_text = if outcome.rendered {
                None
            } else {
                error!(
                    "`long_description` has syntax errors in markup and would not be \
                     rendered on {}.\n{}",
                    self.index_name, outcome.diagnostics
                );
                Some(outcome.diagnostics)
            };
            for message in &outcome.warnings {
                warn!("{}", message);
            }

            summary.failed |= verdict.is_failure();
            summary.artifacts.push(ArtifactReport {
                path: display,
                verdict,
                warnings: outcome.warnings,
                error: error_text,
            });
        }

        Ok(summary)
    }

    fn check_description(&self, metadata: &MetadataDictionary) -> DescriptionOutcome {
        let mut warnings = Vec::new();

        let content_type = match text_field(metadata, "description_content_type") {
            Some(raw) => ContentType::parse(raw),
            None => {
                warnings.push(MISSING_CONTENT_TYPE.to_string());
                ContentType::parse(DEFAULT_CONTENT_TYPE)
            }
        };

        let description = text_field(metadata, "description")
            .filter(|text| !text.is_empty() && text.trim_end() != DESCRIPTION_PLACEHOLDER);
        let Some(description) = description else {
            warnings.push(MISSING_DESCRIPTION.to_string());
            return DescriptionOutcome {
                rendered: true,
                warnings,
                diagnostics: String::new(),
            };
        };

        debug!(content_type = %content_type.mime, "rendering long description");
        let renderer = self.registry.select(Some(&content_type));
        let mut stream = WarningStream::new();
        let rendered = renderer
            .render(description, &content_type.params, &mut stream)
            .is_some();

        if rendered && !stream.is_empty() {
            warnings.push(stream.contents().trim_end().to_string());
        }

        DescriptionOutcome {
            rendered,
            warnings,
            diagnostics: stream.contents().to_string(),
        }
    }
}

fn text_field<'m>(metadata: &'m MetadataDictionary, key: &str) -> Option<&'m str> {
    metadata.get(key).and_then(MetadataValue::as_text)
}

fn is_signature(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "asc")
}

/// Check `patterns` with the filesystem locator, the archive loader and the
/// standard renderer registry, printing report lines to stdout.
///
/// Returns `true` if the check failed.
pub fn check(patterns: &[String], strict: bool) -> Result<bool, CheckError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    Checker::new(&GlobLocator, &ArchiveLoader, RendererRegistry::global())
        .check(patterns, strict, &mut out)
}
