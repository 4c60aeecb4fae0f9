//! Content type header parsing.

use crate::RenderParams;

/// A parsed `Description-Content-Type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Lower-cased media type, e.g. `text/markdown`.
    pub mime: String,

    /// `key=value` parameters following the media type.
    pub params: RenderParams,
}

impl ContentType {
    /// Parse a header value such as `text/markdown; charset=UTF-8; variant=GFM`.
    ///
    /// Parameters without `=` are ignored. Quoted values have their quotes
    /// removed.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(';');
        let mime = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

        let mut params = RenderParams::new();
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            params.insert(key, value.to_string());
        }

        Self { mime, params }
    }
}
