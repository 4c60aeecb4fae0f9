//! Content type to renderer mapping.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::{ContentType, MarkdownRenderer, PlainTextRenderer, Renderer, RstRenderer};

/// Content types with a dedicated registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RendererKey {
    Rst,
    Markdown,
    PlainText,
}

impl RendererKey {
    /// Map a lower-cased media type to its key, if it has one.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "text/x-rst" => Some(Self::Rst),
            "text/markdown" => Some(Self::Markdown),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Rst => "text/x-rst",
            Self::Markdown => "text/markdown",
            Self::PlainText => "text/plain",
        }
    }
}

/// Renderer table with a mandatory default entry.
///
/// The default entry plays the role of the "no content type" key: it is used
/// when the content type is absent, or when its media type has no entry of
/// its own.
pub struct RendererRegistry {
    default: Box<dyn Renderer>,
    entries: BTreeMap<RendererKey, Box<dyn Renderer>>,
}

impl RendererRegistry {
    /// A registry holding only the default entry.
    pub fn new(default: Box<dyn Renderer>) -> Self {
        Self {
            default,
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the renderer for `key`.
    pub fn with(mut self, key: RendererKey, renderer: Box<dyn Renderer>) -> Self {
        self.entries.insert(key, renderer);
        self
    }

    /// The standard table: reStructuredText by default, plus markdown and
    /// plain text.
    pub fn standard() -> Self {
        Self::new(Box::new(RstRenderer::default()))
            .with(RendererKey::Rst, Box::new(RstRenderer::default()))
            .with(RendererKey::Markdown, Box::new(MarkdownRenderer))
            .with(RendererKey::PlainText, Box::new(PlainTextRenderer))
    }

    /// Process-wide standard table, built on first use.
    pub fn global() -> &'static RendererRegistry {
        static GLOBAL: OnceLock<RendererRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::standard)
    }

    /// Keys with a dedicated entry, in key order.
    pub fn keys(&self) -> impl Iterator<Item = RendererKey> + '_ {
        self.entries.keys().copied()
    }

    /// Pick the renderer for a parsed content type.
    pub fn select(&self, content_type: Option<&ContentType>) -> &dyn Renderer {
        content_type
            .and_then(|ct| RendererKey::from_mime(&ct.mime))
            .and_then(|key| self.entries.get(&key))
            .map(|r| r.as_ref())
            .unwrap_or_else(|| self.default.as_ref())
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
