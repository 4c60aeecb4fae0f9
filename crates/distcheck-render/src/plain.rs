use crate::html::escape;
use crate::{RenderParams, Renderer, WarningSink};

/// Renderer for `text/plain`. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    fn render(
        &self,
        source: &str,
        _params: &RenderParams,
        _stream: &mut dyn WarningSink,
    ) -> Option<String> {
        Some(escape(source).replace('\n', "<br>"))
    }
}
