//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use distcheck::{DistributionLocator, LocateError, PackageLoader};
use distcheck_metadata::{MetadataDictionary, MetadataValue, PackageError};
use distcheck_render::{RenderParams, Renderer, WarningSink};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;
use zip::write::SimpleFileOptions;

// =============================================================================
// Log capture
// =============================================================================

/// Layer that records the level and message of every event.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    /// Run `f` with this capture installed as the thread's subscriber.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Messages logged at exactly `level`, in order.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

// =============================================================================
// Collaborator fakes
// =============================================================================

/// Locator returning a fixed list regardless of the patterns.
pub struct FixedLocator(pub Vec<PathBuf>);

impl DistributionLocator for FixedLocator {
    fn find_distributions(&self, _patterns: &[String]) -> Result<Vec<PathBuf>, LocateError> {
        Ok(self.0.clone())
    }
}

/// Loader returning the same metadata for every artifact.
pub struct FixedLoader(pub MetadataDictionary);

impl PackageLoader for FixedLoader {
    fn load(&self, _path: &Path) -> Result<MetadataDictionary, PackageError> {
        Ok(self.0.clone())
    }
}

/// Renderer with a scripted outcome that records the text it was given.
pub struct ScriptedRenderer {
    diagnostics: &'static str,
    succeed: bool,
    sources: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRenderer {
    fn new(diagnostics: &'static str, succeed: bool) -> Self {
        Self {
            diagnostics,
            succeed,
            sources: Arc::default(),
        }
    }

    pub fn clean() -> Self {
        Self::new("", true)
    }

    /// Succeeds after writing `diagnostics` to the sink.
    pub fn warning(diagnostics: &'static str) -> Self {
        Self::new(diagnostics, true)
    }

    pub fn failing(diagnostics: &'static str) -> Self {
        Self::new(diagnostics, false)
    }

    /// Handle to the sources passed to `render`, in call order.
    pub fn sources(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sources)
    }
}

impl Renderer for ScriptedRenderer {
    fn render(
        &self,
        source: &str,
        _params: &RenderParams,
        stream: &mut dyn WarningSink,
    ) -> Option<String> {
        self.sources.lock().unwrap().push(source.to_string());
        if !self.diagnostics.is_empty() {
            stream.write(self.diagnostics);
        }
        self.succeed.then(|| "<p>rendered</p>".to_string())
    }
}

pub fn metadata(description: Option<&str>, content_type: Option<&str>) -> MetadataDictionary {
    let mut dict = MetadataDictionary::new();
    dict.insert("name".to_string(), MetadataValue::from("pkg"));
    dict.insert("version".to_string(), MetadataValue::from("1.0"));
    dict.insert(
        "description".to_string(),
        MetadataValue::Text(description.map(str::to_string)),
    );
    dict.insert(
        "description_content_type".to_string(),
        MetadataValue::Text(content_type.map(str::to_string)),
    );
    dict
}

// =============================================================================
// Artifact builders
// =============================================================================

/// Core metadata text with an optional content type and a body description.
pub fn pkg_info(name: &str, content_type: Option<&str>, body: &str) -> String {
    let mut text = format!("Metadata-Version: 2.1\nName: {}\nVersion: 1.0\n", name);
    if let Some(content_type) = content_type {
        text.push_str(&format!("Description-Content-Type: {}\n", content_type));
    }
    text.push('\n');
    text.push_str(body);
    text
}

/// Write a wheel holding `metadata` as its `METADATA` file.
pub fn write_wheel(dir: &TempDir, name: &str, metadata: &str) -> PathBuf {
    let path = dir.path().join(format!("{}-1.0-py3-none-any.whl", name));
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    zip.start_file(
        format!("{}-1.0.dist-info/METADATA", name),
        SimpleFileOptions::default(),
    )
    .unwrap();
    zip.write_all(metadata.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

/// Write a gzipped tar sdist holding `metadata` as its `PKG-INFO` file.
pub fn write_sdist(dir: &TempDir, name: &str, metadata: &str) -> PathBuf {
    let path = dir.path().join(format!("{}-1.0.tar.gz", name));
    let encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_size(metadata.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, format!("{}-1.0/PKG-INFO", name), metadata.as_bytes())
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap();
    path
}
