//! Long-description renderers keyed by content type.
//!
//! A renderer turns a package's long description into an HTML fragment and
//! writes any diagnostics into a [`WarningSink`]. A `None` result means the
//! markup is broken badly enough that an index would refuse to display it.

mod content_type;
mod html;
mod markdown;
mod plain;
mod registry;
pub mod rst;

pub use content_type::ContentType;
pub use markdown::{MarkdownRenderer, MarkdownVariant};
pub use plain::PlainTextRenderer;
pub use registry::{RendererKey, RendererRegistry};
pub use rst::RstRenderer;

use std::collections::BTreeMap;

/// Parameters carried on the content type (`variant=GFM`, `charset=UTF-8`).
///
/// Keys are lower-cased; values keep their original case.
pub type RenderParams = BTreeMap<String, String>;

/// Destination for diagnostic text produced while rendering.
///
/// Renderers call [`WarningSink::write`] once per diagnostic message.
pub trait WarningSink {
    fn write(&mut self, text: &str);
}

impl WarningSink for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// A markup renderer for one content type.
pub trait Renderer: Send + Sync {
    /// Render `source`, reporting diagnostics to `stream`.
    ///
    /// Returns `None` if the markup has errors that prevent rendering.
    fn render(
        &self,
        source: &str,
        params: &RenderParams,
        stream: &mut dyn WarningSink,
    ) -> Option<String>;
}
