//! Markdown renderer.
//!
//! Markdown has no invalid documents, so rendering only fails when the
//! content type asks for a variant this renderer does not know.

use pulldown_cmark::{html, Options, Parser};

use crate::{RenderParams, Renderer, WarningSink};

/// Supported markdown dialects, selected by the `variant` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkdownVariant {
    #[default]
    Gfm,
    CommonMark,
}

impl MarkdownVariant {
    /// Look up a `variant` parameter value (case-insensitive).
    pub fn from_param(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("gfm") {
            Some(Self::Gfm)
        } else if value.eq_ignore_ascii_case("commonmark") {
            Some(Self::CommonMark)
        } else {
            None
        }
    }

    /// Parser extensions enabled for this dialect.
    pub fn options(&self) -> Options {
        match self {
            Self::Gfm => {
                Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
            }
            Self::CommonMark => Options::empty(),
        }
    }
}

/// Renderer for `text/markdown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(
        &self,
        source: &str,
        params: &RenderParams,
        _stream: &mut dyn WarningSink,
    ) -> Option<String> {
        let variant = match params.get("variant") {
            Some(v) => MarkdownVariant::from_param(v)?,
            None => MarkdownVariant::default(),
        };

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(source, variant.options()));
        Some(out)
    }
}
